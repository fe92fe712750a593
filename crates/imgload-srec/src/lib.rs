//! Motorola S-Record (SREC) loader.
//!
//! Records are parsed one line at a time. Sniffing verifies every line and
//! finds the lowest address; loading coalesces contiguous data records into
//! segments.

mod accumulator;
mod image;
mod record;

pub use accumulator::*;
pub use image::*;
pub use record::*;

use imgload_image::FailureKind;
use thiserror::Error;

/// Errors for a single record line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("line is not an S-Record")]
    Shape,
    #[error("unknown S-Record type {0}")]
    UnknownType(u8),
    #[error("data length mismatch: {declared} != {actual}")]
    LengthMismatch { declared: usize, actual: usize },
    #[error("bad checksum: computed 0x{computed:02x}, stored 0x{stored:02x}")]
    Checksum { computed: u8, stored: u8 },
    #[error("S{record_type} record needs {needed} address bytes, has {available}")]
    MissingAddress {
        record_type: u8,
        needed: usize,
        available: usize,
    },
    #[error("payload of {len} bytes does not fit in one record")]
    PayloadTooLong { len: usize },
}

/// SREC loading errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SrecError {
    #[error("missing leading S0 header record")]
    MissingHeader,
    #[error("S-Record input is not text")]
    NotText,
    #[error("line {line}: {source}: {content}")]
    Record {
        line: usize,
        content: String,
        #[source]
        source: RecordError,
    },
    #[error("no S-Record base address found")]
    NoBaseAddress,
    #[error("architecture selection cancelled")]
    Cancelled,
}

impl SrecError {
    /// Coarse failure category.
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::MissingHeader | Self::NotText | Self::Cancelled => FailureKind::FormatMismatch,
            Self::Record {
                source: RecordError::Checksum { .. },
                ..
            } => FailureKind::ChecksumMismatch,
            Self::Record { .. } => FailureKind::MalformedRecord,
            Self::NoBaseAddress => FailureKind::NoBaseAddress,
        }
    }
}

pub type Result<T> = std::result::Result<T, SrecError>;
