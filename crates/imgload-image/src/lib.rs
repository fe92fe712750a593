//! Loaded image model shared by the format loaders.
//!
//! A loader first sniffs a buffer and produces a [`FormatDescriptor`], then
//! builds a [`LoadedImage`] through an [`ImageBuilder`]. Every address that
//! lands in the image goes through the caller's [`LoadContext`].

mod context;
mod descriptor;
mod image;
mod segment;

pub use context::*;
pub use descriptor::*;
pub use image::*;
pub use segment::*;

/// Failure categories shared by every loader.
///
/// Each loader keeps its own error enum; this is the coarse classification
/// callers branch on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    /// The buffer is not this format. The caller should try the next loader.
    FormatMismatch,
    /// A record or header field is lexically or structurally invalid.
    MalformedRecord,
    /// A stored checksum disagrees with the computed one.
    ChecksumMismatch,
    /// Sniffing finished without finding any usable address.
    NoBaseAddress,
    /// The buffer ends before a required structure does.
    Truncated,
    /// Reading the input failed.
    Io,
}
