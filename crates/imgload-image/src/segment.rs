//! Segments and region markers.

use std::fmt;

/// Segment access permissions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Permissions {
    pub read: bool,
    pub write: bool,
    pub execute: bool,
}

impl Permissions {
    pub const RX: Self = Self {
        read: true,
        write: false,
        execute: true,
    };
    pub const RW: Self = Self {
        read: true,
        write: true,
        execute: false,
    };
    pub const RWX: Self = Self {
        read: true,
        write: true,
        execute: true,
    };
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = if self.read { 'r' } else { '-' };
        let w = if self.write { 'w' } else { '-' };
        let x = if self.execute { 'x' } else { '-' };
        write!(f, "{r}{w}{x}")
    }
}

/// A contiguous range of the image with uniform permissions.
///
/// `bytes` holds only the file-backed part. `extra_zero_length` bytes of
/// zero-initialized memory follow it (BSS).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    pub name: String,
    pub virtual_offset: u64,
    pub extra_zero_length: u64,
    pub permissions: Permissions,
    pub bytes: Vec<u8>,
}

impl Segment {
    /// Size of file-backed data.
    #[must_use]
    pub const fn file_length(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Total size in memory, including the zero-filled tail.
    #[must_use]
    pub const fn memory_length(&self) -> u64 {
        self.file_length() + self.extra_zero_length
    }

    /// Offset one past the last byte in memory.
    #[must_use]
    pub const fn virtual_end(&self) -> u64 {
        self.virtual_offset.wrapping_add(self.memory_length())
    }
}

/// A labeled range of the input buffer, used for the overview display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegionMarker {
    pub name: String,
    pub file_offset: u64,
    pub length: u64,
}
