//! `MobiCore` Load Format (MCLF) loader.

mod constants;
mod header;
mod image;

pub use constants::*;
pub use header::*;
pub use image::*;

use imgload_image::FailureKind;
use thiserror::Error;

/// MCLF parsing errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum MclfError {
    #[error("MCLF data too small")]
    TooSmall,
    #[error("Invalid MCLF magic number: 0x{0:08x}")]
    InvalidMagic(u32),
    #[error("Unsupported MCLF version {major}.{minor}")]
    UnsupportedVersion { major: u16, minor: u16 },
    #[error("MCLF header truncated: {len} bytes, need {need}", need = MCLF_HEADER_LEN)]
    TruncatedHeader { len: usize },
    #[error("Segment {segment} ends at {end:#x}, beyond file of {len:#x} bytes")]
    SegmentBeyondFile {
        segment: &'static str,
        end: u64,
        len: usize,
    },
}

impl MclfError {
    /// Coarse failure category.
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::TooSmall | Self::InvalidMagic(_) | Self::UnsupportedVersion { .. } => {
                FailureKind::FormatMismatch
            }
            Self::TruncatedHeader { .. } | Self::SegmentBeyondFile { .. } => FailureKind::Truncated,
        }
    }
}

pub type Result<T> = std::result::Result<T, MclfError>;
