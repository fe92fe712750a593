//! imgload - binary image loaders
//!
//! Recognizes MCLF and Motorola S-Record inputs and turns them into segment,
//! metadata and entry-point descriptions.
//!
//! # Example
//!
//! ```ignore
//! use imgload::{LoadOptions, LoaderRegistry};
//!
//! let data = std::fs::read("firmware.srec")?;
//! let loaded = LoaderRegistry::default().load(&data, &LoadOptions::default())?;
//! for segment in &loaded.image.segments {
//!     println!("{} {:#x} {}", segment.name, segment.virtual_offset, segment.file_length());
//! }
//! ```

// Re-export from sub-crates
pub use imgload_image::{
    AddressingMode, Arch, BaseRelative, Diagnostic, Endian, EntryKind, EntryPointRequest,
    FailureKind, FormatDescriptor, FormatKind, ImageBuilder, LoadContext, LoadedImage,
    MetadataEntry, MetadataGroup, Permissions, Platform, RegionMarker, Segment, Selection,
    Severity,
};
pub use imgload_mclf::{HeaderFlags, HeaderLayout, MclfError, MclfHeader, MemType, ServiceType};
pub use imgload_srec::{
    FlushedSegment, Record, RecordError, RecordType, SegmentAccumulator, SrecError, parse_records,
};

mod error;
mod registry;

pub use error::{Error, Result};
pub use registry::*;
