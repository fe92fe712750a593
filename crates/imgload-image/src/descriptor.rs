//! Format descriptor returned by a successful sniff.

use std::fmt;

/// Loader format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FormatKind {
    Mclf,
    Srec,
}

impl FormatKind {
    /// Short lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Mclf => "mclf",
            Self::Srec => "srec",
        }
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Processor architecture the image targets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Arch {
    #[default]
    Arm,
    Arm64,
    X86,
    X64,
}

impl Arch {
    /// All supported architectures, in the order offered to a chooser.
    pub const ALL: [Self; 4] = [Self::Arm, Self::Arm64, Self::X86, Self::X64];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Arm => "arm",
            Self::Arm64 => "arm64",
            Self::X86 => "x86",
            Self::X64 => "x64",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Byte order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Endian {
    #[default]
    Little,
    Big,
}

/// How the processor model picks its instruction width.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AddressingMode {
    /// Let the disassembler decide per region.
    #[default]
    Auto,
    FixedWidth,
}

/// Target operating platform.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Platform {
    #[default]
    Unknown,
}

/// Result of a successful sniff.
///
/// The host uses it to pick a processor model before running the full load.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormatDescriptor {
    pub title: String,
    pub kind: FormatKind,
    pub arch: Arch,
    pub endian: Endian,
    pub addressing_mode: AddressingMode,
    pub platform: Platform,
    pub base_address: u64,
}
