use imgload_image::FailureKind;
use thiserror::Error;

/// Loader errors.
#[derive(Error, Debug)]
pub enum Error {
    #[error("MCLF error: {0}")]
    Mclf(#[from] imgload_mclf::MclfError),
    #[error("SREC error: {0}")]
    Srec(#[from] imgload_srec::SrecError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("No loader recognized the input")]
    Unrecognized,
}

impl Error {
    /// Coarse failure category.
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::Mclf(e) => e.kind(),
            Self::Srec(e) => e.kind(),
            Self::Io(_) => FailureKind::Io,
            Self::Unrecognized => FailureKind::FormatMismatch,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
