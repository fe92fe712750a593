//! MCLF header structures.

use std::fmt::Write as _;

use crate::constants::{
    HEADER_TYPE_V2, HEADER_TYPE_V23, HEADER_TYPE_V24, MC_SERVICE_HEADER_FLAGS_DEBUGGABLE,
    MC_SERVICE_HEADER_FLAGS_EXTENDED_LAYOUT, MC_SERVICE_HEADER_FLAGS_NO_CONTROL_INTERFACE,
    MC_SERVICE_HEADER_FLAGS_PERMANENT, MCLF_HEADER_LEN, MCLF_INTRO_LEN, MCLF_MAGIC,
    MCLF_VERSION_MAJOR, OFF_BSS_LEN, OFF_DATA_LEN, OFF_DATA_START, OFF_DRIVER_ID, OFF_ENTRY,
    OFF_FLAGS, OFF_MAGIC, OFF_MEM_TYPE, OFF_NUM_INSTANCES, OFF_NUM_THREADS, OFF_SERVICE_TYPE,
    OFF_SERVICE_VERSION, OFF_TEXT_LEN, OFF_TEXT_START, OFF_UUID, OFF_VERSION_MAJOR,
    OFF_VERSION_MINOR, UUID_LEN,
};
use crate::{MclfError, Result};

/// Read little-endian u16 from bytes.
#[inline]
fn read_le16(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

/// Read little-endian u32 from bytes.
#[inline]
fn read_le32(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

/// Leading magic and version, present in every MCLF revision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MclfIntro {
    pub magic: u32,
    pub version_minor: u16,
    pub version_major: u16,
}

impl MclfIntro {
    /// Read the intro without validating it.
    ///
    /// # Errors
    ///
    /// [`MclfError::TooSmall`] if `data` is shorter than the intro.
    pub fn read(data: &[u8]) -> Result<Self> {
        if data.len() < MCLF_INTRO_LEN {
            return Err(MclfError::TooSmall);
        }
        Ok(Self {
            magic: read_le32(data, OFF_MAGIC),
            version_minor: read_le16(data, OFF_VERSION_MINOR),
            version_major: read_le16(data, OFF_VERSION_MAJOR),
        })
    }

    /// Read the intro and require an MCLF v2 magic and major version.
    ///
    /// # Errors
    ///
    /// [`MclfError::TooSmall`], [`MclfError::InvalidMagic`] or
    /// [`MclfError::UnsupportedVersion`].
    pub fn parse(data: &[u8]) -> Result<Self> {
        let intro = Self::read(data)?;
        if intro.magic != MCLF_MAGIC {
            return Err(MclfError::InvalidMagic(intro.magic));
        }
        if intro.version_major != MCLF_VERSION_MAJOR {
            return Err(MclfError::UnsupportedVersion {
                major: intro.version_major,
                minor: intro.version_minor,
            });
        }
        Ok(intro)
    }
}

/// Service header flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HeaderFlags(pub u32);

impl HeaderFlags {
    /// Named flag bits, lowest first.
    pub const NAMED: [(u32, &'static str); 4] = [
        (
            MC_SERVICE_HEADER_FLAGS_PERMANENT,
            "MC_SERVICE_HEADER_FLAGS_PERMANENT",
        ),
        (
            MC_SERVICE_HEADER_FLAGS_NO_CONTROL_INTERFACE,
            "MC_SERVICE_HEADER_FLAGS_NO_CONTROL_INTERFACE",
        ),
        (
            MC_SERVICE_HEADER_FLAGS_DEBUGGABLE,
            "MC_SERVICE_HEADER_FLAGS_DEBUGGABLE",
        ),
        (
            MC_SERVICE_HEADER_FLAGS_EXTENDED_LAYOUT,
            "MC_SERVICE_HEADER_FLAGS_EXTENDED_LAYOUT",
        ),
    ];

    #[must_use]
    pub const fn contains(self, bit: u32) -> bool {
        self.0 & bit == bit
    }

    /// Names of the set bits. Unnamed bits are ignored.
    pub fn names(self) -> impl Iterator<Item = &'static str> {
        Self::NAMED
            .into_iter()
            .filter(move |(bit, _)| self.contains(*bit))
            .map(|(_, name)| name)
    }

    /// Raw value plus the OR-list of named bits, e.g. `0xa (A | B)`.
    #[must_use]
    pub fn describe(self) -> String {
        let names: Vec<_> = self.names().collect();
        format!("0x{:x} ({})", self.0, names.join(" | "))
    }
}

/// Memory the service must execute from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemType {
    InternalPreferred,
    Internal,
    External,
    Unknown(u32),
}

impl MemType {
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        match raw {
            0 => Self::InternalPreferred,
            1 => Self::Internal,
            2 => Self::External,
            other => Self::Unknown(other),
        }
    }

    /// Symbolic name, or `None` for an unknown value.
    #[must_use]
    pub const fn name(self) -> Option<&'static str> {
        match self {
            Self::InternalPreferred => Some("MCLF_MEM_TYPE_INTERNAL_PREFERRED"),
            Self::Internal => Some("MCLF_MEM_TYPE_INTERNAL"),
            Self::External => Some("MCLF_MEM_TYPE_EXTERNAL"),
            Self::Unknown(_) => None,
        }
    }
}

/// Kind of executable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ServiceType {
    Illegal,
    Driver,
    SpTrustlet,
    SystemTrustlet,
    Middleware,
    LastEntry,
    Unknown(u32),
}

impl ServiceType {
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        match raw {
            0 => Self::Illegal,
            1 => Self::Driver,
            2 => Self::SpTrustlet,
            3 => Self::SystemTrustlet,
            4 => Self::Middleware,
            5 => Self::LastEntry,
            other => Self::Unknown(other),
        }
    }

    /// Symbolic name, or `None` for an unknown value.
    #[must_use]
    pub const fn name(self) -> Option<&'static str> {
        match self {
            Self::Illegal => Some("SERVICE_TYPE_ILLEGAL"),
            Self::Driver => Some("SERVICE_TYPE_DRIVER"),
            Self::SpTrustlet => Some("SERVICE_TYPE_SP_TRUSTLET"),
            Self::SystemTrustlet => Some("SERVICE_TYPE_SYSTEM_TRUSTLET"),
            Self::Middleware => Some("SERVICE_TYPE_MIDDLEWARE"),
            Self::LastEntry => Some("SERVICE_TYPE_LAST_ENTRY"),
            Self::Unknown(_) => None,
        }
    }
}

/// Header structure revision, selected by the minor version.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeaderLayout {
    /// 2.1 and 2.2.
    V2,
    /// 2.3 adds the permitted SUID and hardware configuration.
    V23,
    /// 2.4 and later add the GP level and attestation offset.
    V24,
}

impl HeaderLayout {
    #[must_use]
    pub const fn from_minor(minor: u16) -> Self {
        match minor {
            0..=2 => Self::V2,
            3 => Self::V23,
            _ => Self::V24,
        }
    }

    /// Data type name applied to the header in the image.
    #[must_use]
    pub const fn type_name(self) -> &'static str {
        match self {
            Self::V2 => HEADER_TYPE_V2,
            Self::V23 => HEADER_TYPE_V23,
            Self::V24 => HEADER_TYPE_V24,
        }
    }
}

/// Virtual segment descriptor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SegmentDescriptor {
    pub start: u32,
    pub len: u32,
}

/// Decoded MCLF v2 header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MclfHeader {
    pub intro: MclfIntro,
    pub flags: HeaderFlags,
    pub mem_type: MemType,
    pub service_type: ServiceType,
    pub num_instances: u32,
    pub uuid: [u8; UUID_LEN],
    pub driver_id: u32,
    pub num_threads: u32,
    pub text: SegmentDescriptor,
    pub data: SegmentDescriptor,
    pub bss_len: u32,
    pub entry: u32,
    pub service_version: u32,
}

impl MclfHeader {
    /// Parse the full header from the start of `data`.
    ///
    /// # Errors
    ///
    /// Intro errors as in [`MclfIntro::parse`], or
    /// [`MclfError::TruncatedHeader`] if the fixed fields do not fit.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let intro = MclfIntro::parse(data)?;
        if data.len() < MCLF_HEADER_LEN {
            return Err(MclfError::TruncatedHeader { len: data.len() });
        }

        let mut uuid = [0u8; UUID_LEN];
        uuid.copy_from_slice(&data[OFF_UUID..OFF_UUID + UUID_LEN]);

        Ok(Self {
            intro,
            flags: HeaderFlags(read_le32(data, OFF_FLAGS)),
            mem_type: MemType::from_raw(read_le32(data, OFF_MEM_TYPE)),
            service_type: ServiceType::from_raw(read_le32(data, OFF_SERVICE_TYPE)),
            num_instances: read_le32(data, OFF_NUM_INSTANCES),
            uuid,
            driver_id: read_le32(data, OFF_DRIVER_ID),
            num_threads: read_le32(data, OFF_NUM_THREADS),
            text: SegmentDescriptor {
                start: read_le32(data, OFF_TEXT_START),
                len: read_le32(data, OFF_TEXT_LEN),
            },
            data: SegmentDescriptor {
                start: read_le32(data, OFF_DATA_START),
                len: read_le32(data, OFF_DATA_LEN),
            },
            bss_len: read_le32(data, OFF_BSS_LEN),
            entry: read_le32(data, OFF_ENTRY),
            service_version: read_le32(data, OFF_SERVICE_VERSION),
        })
    }

    #[must_use]
    pub const fn layout(&self) -> HeaderLayout {
        HeaderLayout::from_minor(self.intro.version_minor)
    }

    /// `major.minor`.
    #[must_use]
    pub fn version(&self) -> String {
        format!("{}.{}", self.intro.version_major, self.intro.version_minor)
    }

    /// UUID as lowercase hex.
    #[must_use]
    pub fn uuid_hex(&self) -> String {
        self.uuid.iter().fold(String::with_capacity(UUID_LEN * 2), |mut s, b| {
            let _ = write!(s, "{b:02x}");
            s
        })
    }
}
