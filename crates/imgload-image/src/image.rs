//! Loaded image and the builder that produces it.

use tracing::debug;

use crate::context::LoadContext;
use crate::segment::{Permissions, RegionMarker, Segment};

/// What the analysis queue should do at an entry point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    Function,
    Data,
}

/// Deferred request to analyze at an image offset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryPointRequest {
    pub kind: EntryKind,
    pub offset: u64,
    pub label: String,
    /// Name of the data type to apply, for [`EntryKind::Data`] requests.
    pub declared_type: Option<String>,
}

/// Grouping for metadata shown in the host overview.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MetadataGroup {
    Analysis,
}

/// Free-form key/value describing the loaded file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetadataEntry {
    pub group: MetadataGroup,
    pub title: String,
    pub value: String,
}

/// Everything a loader produced for one buffer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadedImage {
    pub segments: Vec<Segment>,
    pub metadata: Vec<MetadataEntry>,
    pub entry_points: Vec<EntryPointRequest>,
    pub markers: Vec<RegionMarker>,
}

impl LoadedImage {
    /// Find the first segment with the given name.
    #[must_use]
    pub fn segment(&self, name: &str) -> Option<&Segment> {
        self.segments.iter().find(|s| s.name == name)
    }

    /// Find the value of the first metadata entry with the given title.
    #[must_use]
    pub fn metadata_value(&self, title: &str) -> Option<&str> {
        self.metadata
            .iter()
            .find(|m| m.title == title)
            .map(|m| m.value.as_str())
    }

    /// Find the first entry request with the given label.
    #[must_use]
    pub fn entry_point(&self, label: &str) -> Option<&EntryPointRequest> {
        self.entry_points.iter().find(|e| e.label == label)
    }

    /// Sum of file-backed bytes across all segments.
    #[must_use]
    pub fn file_size(&self) -> u64 {
        self.segments.iter().map(Segment::file_length).sum()
    }
}

/// Collects loader output for a single load call.
///
/// Segment offsets and entry offsets are always derived from absolute
/// addresses through the context, so callers never place anything themselves.
pub struct ImageBuilder<'a, C: LoadContext + ?Sized> {
    ctx: &'a C,
    image: LoadedImage,
}

impl<'a, C: LoadContext + ?Sized> ImageBuilder<'a, C> {
    #[must_use]
    pub fn new(ctx: &'a C) -> Self {
        Self {
            ctx,
            image: LoadedImage::default(),
        }
    }

    /// Add a segment placed at `address`.
    pub fn add_segment(
        &mut self,
        name: &str,
        address: u64,
        permissions: Permissions,
        bytes: Vec<u8>,
        extra_zero_length: u64,
    ) {
        let virtual_offset = self.ctx.translate_virtual_to_relative(address);
        debug!(
            name,
            address = format!("{address:#x}"),
            offset = format!("{virtual_offset:#x}"),
            len = bytes.len(),
            bss = extra_zero_length,
            "segment"
        );
        self.image.segments.push(Segment {
            name: name.to_string(),
            virtual_offset,
            extra_zero_length,
            permissions,
            bytes,
        });
    }

    pub fn add_metadata(&mut self, group: MetadataGroup, title: &str, value: impl Into<String>) {
        self.image.metadata.push(MetadataEntry {
            group,
            title: title.to_string(),
            value: value.into(),
        });
    }

    pub fn add_marker(&mut self, name: &str, file_offset: u64, length: u64) {
        self.image.markers.push(RegionMarker {
            name: name.to_string(),
            file_offset,
            length,
        });
    }

    /// Queue a function for analysis at `address`.
    pub fn queue_function(&mut self, address: u64, label: &str) {
        self.queue(EntryKind::Function, address, label, None);
    }

    /// Queue a typed data item for analysis at `address`.
    pub fn queue_data(&mut self, address: u64, label: &str, declared_type: &str) {
        self.queue(EntryKind::Data, address, label, Some(declared_type));
    }

    fn queue(&mut self, kind: EntryKind, address: u64, label: &str, declared_type: Option<&str>) {
        let offset = self.ctx.translate_virtual_to_relative(address);
        debug!(label, ?kind, offset = format!("{offset:#x}"), "queue entry");
        self.image.entry_points.push(EntryPointRequest {
            kind,
            offset,
            label: label.to_string(),
            declared_type: declared_type.map(str::to_string),
        });
    }

    /// Hand the collected image to the caller.
    #[must_use]
    pub fn finish(self) -> LoadedImage {
        self.image
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::BaseRelative;

    #[test]
    fn test_builder_translates_addresses() {
        let ctx = BaseRelative::new(0x8000);
        let mut builder = ImageBuilder::new(&ctx);
        builder.add_segment(".text", 0x8010, Permissions::RX, vec![1, 2, 3], 0);
        builder.queue_function(0x8020, "entry");
        builder.queue_data(0x8000, "header", "hdr_t");
        let image = builder.finish();

        assert_eq!(image.segments[0].virtual_offset, 0x10);
        assert_eq!(image.segments[0].file_length(), 3);
        let entry = image.entry_point("entry").unwrap();
        assert_eq!(entry.kind, EntryKind::Function);
        assert_eq!(entry.offset, 0x20);
        assert_eq!(entry.declared_type, None);
        let header = image.entry_point("header").unwrap();
        assert_eq!(header.kind, EntryKind::Data);
        assert_eq!(header.declared_type.as_deref(), Some("hdr_t"));
    }

    #[test]
    fn test_metadata_preserves_order() {
        let ctx = BaseRelative::new(0);
        let mut builder = ImageBuilder::new(&ctx);
        builder.add_metadata(MetadataGroup::Analysis, "b", "2");
        builder.add_metadata(MetadataGroup::Analysis, "a", "1");
        builder.add_metadata(MetadataGroup::Analysis, "b", "3");
        let image = builder.finish();

        let titles: Vec<_> = image.metadata.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, ["b", "a", "b"]);
        assert_eq!(image.metadata_value("b"), Some("2"));
    }
}
