//! MCLF sniffing and image construction.

use imgload_image::{
    AddressingMode, Arch, Endian, FormatDescriptor, FormatKind, ImageBuilder, LoadContext,
    LoadedImage, MetadataGroup, Permissions, Platform,
};
use tracing::{debug, info};

use crate::constants::{MCLF_HEADER_SIZE_V23, TEXT_HEADER_TYPE};
use crate::header::{MclfHeader, MclfIntro};
use crate::{MclfError, Result};

pub const MCLF_TITLE: &str = "MobiCore Load Format (MCLF)";

/// Check whether `data` starts with an MCLF v2 intro.
///
/// Reads only the first eight bytes.
///
/// # Errors
///
/// [`MclfError::TooSmall`], [`MclfError::InvalidMagic`] or
/// [`MclfError::UnsupportedVersion`] when `data` is not MCLF v2.
pub fn query(data: &[u8]) -> Result<FormatDescriptor> {
    let intro = MclfIntro::parse(data)?;
    debug!(
        major = intro.version_major,
        minor = intro.version_minor,
        "MCLF intro"
    );
    Ok(FormatDescriptor {
        title: MCLF_TITLE.to_string(),
        kind: FormatKind::Mclf,
        arch: Arch::Arm,
        endian: Endian::Little,
        addressing_mode: AddressingMode::Auto,
        platform: Platform::Unknown,
        base_address: 0,
    })
}

/// Decode the header and build the image.
///
/// `.text` is backed by the start of the file (the header lives inside it),
/// `.data` by the bytes that follow, and `.bss` by nothing.
///
/// # Errors
///
/// Header errors as in [`MclfHeader::parse`], or
/// [`MclfError::SegmentBeyondFile`] when the text or data length runs past
/// the end of `data`.
pub fn load<C: LoadContext + ?Sized>(data: &[u8], ctx: &C) -> Result<LoadedImage> {
    let header = MclfHeader::parse(data)?;
    let text_len = u64::from(header.text.len);
    let data_len = u64::from(header.data.len);

    let text_bytes = file_range(data, ".text", 0, text_len)?;
    let data_bytes = file_range(data, ".data", text_len, data_len)?;

    let mut builder = ImageBuilder::new(ctx);
    add_metadata(&mut builder, &header);

    builder.add_marker(".text", 0, text_len);
    builder.add_marker(".data", text_len, data_len);

    let text_start = header.text.start;
    let data_start = header.data.start;
    let bss_start = data_start.wrapping_add(header.data.len);

    builder.add_segment(
        ".text",
        u64::from(text_start),
        Permissions::RX,
        text_bytes.to_vec(),
        0,
    );
    builder.add_segment(
        ".data",
        u64::from(data_start),
        Permissions::RW,
        data_bytes.to_vec(),
        0,
    );
    builder.add_segment(
        ".bss",
        u64::from(bss_start),
        Permissions::RW,
        Vec::new(),
        u64::from(header.bss_len),
    );

    builder.queue_data(
        u64::from(text_start),
        "header",
        header.layout().type_name(),
    );
    // The text header follows the V2.3 header at a fixed offset.
    builder.queue_data(
        u64::from(text_start.wrapping_add(MCLF_HEADER_SIZE_V23)),
        "text_header",
        TEXT_HEADER_TYPE,
    );
    builder.queue_function(u64::from(header.entry), "entry");

    info!(
        version = %header.version(),
        text = text_len,
        data = data_len,
        bss = header.bss_len,
        entry = format!("{:#x}", header.entry),
        "loaded MCLF image"
    );
    Ok(builder.finish())
}

fn add_metadata<C: LoadContext + ?Sized>(builder: &mut ImageBuilder<'_, C>, header: &MclfHeader) {
    builder.add_metadata(MetadataGroup::Analysis, "MCLF Version", header.version());
    builder.add_metadata(MetadataGroup::Analysis, "MCLF Flags", header.flags.describe());

    if let Some(name) = header.mem_type.name() {
        builder.add_metadata(MetadataGroup::Analysis, "MCLF Mem Type", name);
    } else {
        debug!(mem_type = ?header.mem_type, "omitting unknown memory type");
    }

    if let Some(name) = header.service_type.name() {
        builder.add_metadata(MetadataGroup::Analysis, "MCLF Service Type", name);
    } else {
        debug!(service_type = ?header.service_type, "omitting unknown service type");
    }

    builder.add_metadata(MetadataGroup::Analysis, "MCLF UUID", header.uuid_hex());
    builder.add_metadata(
        MetadataGroup::Analysis,
        "MCLF Driver ID",
        format!("0x{:x}", header.driver_id),
    );
}

fn file_range<'d>(data: &'d [u8], segment: &'static str, offset: u64, len: u64) -> Result<&'d [u8]> {
    let end = offset + len;
    let beyond = || MclfError::SegmentBeyondFile {
        segment,
        end,
        len: data.len(),
    };
    let start = usize::try_from(offset).map_err(|_| beyond())?;
    let stop = usize::try_from(end).map_err(|_| beyond())?;
    data.get(start..stop).ok_or_else(beyond)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{
        HEADER_TYPE_V2, HEADER_TYPE_V23, HEADER_TYPE_V24, MCLF_HEADER_LEN, MCLF_MAGIC,
        OFF_BSS_LEN, OFF_DATA_LEN, OFF_DATA_START, OFF_DRIVER_ID, OFF_ENTRY, OFF_FLAGS,
        OFF_MAGIC, OFF_MEM_TYPE, OFF_NUM_INSTANCES, OFF_NUM_THREADS, OFF_SERVICE_TYPE,
        OFF_SERVICE_VERSION, OFF_TEXT_LEN, OFF_TEXT_START, OFF_UUID, OFF_VERSION_MAJOR,
        OFF_VERSION_MINOR, UUID_LEN,
    };
    use imgload_image::{BaseRelative, EntryKind, FailureKind};

    struct HeaderFields {
        minor: u16,
        flags: u32,
        mem_type: u32,
        service_type: u32,
        text_start: u32,
        text_len: u32,
        data_start: u32,
        data_len: u32,
        bss_len: u32,
        entry: u32,
    }

    impl Default for HeaderFields {
        fn default() -> Self {
            Self {
                minor: 3,
                flags: 0,
                mem_type: 1,
                service_type: 2,
                text_start: 0x1000,
                text_len: 0x100,
                data_start: 0x2000,
                data_len: 0x20,
                bss_len: 0x40,
                entry: 0x10a0,
            }
        }
    }

    fn build(fields: &HeaderFields) -> Vec<u8> {
        let body = usize::try_from(fields.text_len + fields.data_len).unwrap();
        let mut data = vec![0u8; body.max(MCLF_HEADER_LEN)];
        let mut put = |offset: usize, value: u32| {
            data[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
        };
        put(OFF_MAGIC, MCLF_MAGIC);
        put(OFF_FLAGS, fields.flags);
        put(OFF_MEM_TYPE, fields.mem_type);
        put(OFF_SERVICE_TYPE, fields.service_type);
        put(OFF_NUM_INSTANCES, 1);
        put(OFF_DRIVER_ID, 0x0004_0101);
        put(OFF_NUM_THREADS, 1);
        put(OFF_TEXT_START, fields.text_start);
        put(OFF_TEXT_LEN, fields.text_len);
        put(OFF_DATA_START, fields.data_start);
        put(OFF_DATA_LEN, fields.data_len);
        put(OFF_BSS_LEN, fields.bss_len);
        put(OFF_ENTRY, fields.entry);
        put(OFF_SERVICE_VERSION, 7);
        data[OFF_VERSION_MINOR..OFF_VERSION_MINOR + 2].copy_from_slice(&fields.minor.to_le_bytes());
        data[OFF_VERSION_MAJOR..OFF_VERSION_MAJOR + 2].copy_from_slice(&2u16.to_le_bytes());
        for (b, value) in data[OFF_UUID..OFF_UUID + UUID_LEN].iter_mut().zip(0xa0u8..) {
            *b = value;
        }
        data
    }

    #[test]
    fn test_query_accepts_v2() {
        let desc = query(&build(&HeaderFields::default())).unwrap();
        assert_eq!(desc.kind, FormatKind::Mclf);
        assert_eq!(desc.arch, Arch::Arm);
        assert_eq!(desc.endian, Endian::Little);
        assert_eq!(desc.addressing_mode, AddressingMode::Auto);
        assert_eq!(desc.base_address, 0);
        assert_eq!(desc.title, MCLF_TITLE);
    }

    #[test]
    fn test_query_rejects_non_mclf() {
        let foreign: [&[u8]; 4] = [b"", b"MCL", b"FLCM\x03\x00\x02\x00", b"S00600004844521B"];
        for data in foreign {
            let err = query(data).unwrap_err();
            assert_eq!(err.kind(), FailureKind::FormatMismatch, "{data:?}");
        }
        let mut v1 = build(&HeaderFields::default());
        v1[OFF_VERSION_MAJOR] = 1;
        assert_eq!(query(&v1).unwrap_err().kind(), FailureKind::FormatMismatch);
    }

    #[test]
    fn test_load_segments() {
        let data = build(&HeaderFields::default());
        let image = load(&data, &BaseRelative::new(0)).unwrap();

        let names: Vec<_> = image.segments.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, [".text", ".data", ".bss"]);

        let text = image.segment(".text").unwrap();
        assert_eq!(text.virtual_offset, 0x1000);
        assert_eq!(text.permissions, Permissions::RX);
        assert_eq!(text.bytes, &data[..0x100]);

        let data_seg = image.segment(".data").unwrap();
        assert_eq!(data_seg.virtual_offset, 0x2000);
        assert_eq!(data_seg.permissions, Permissions::RW);
        assert_eq!(data_seg.bytes, &data[0x100..0x120]);

        let bss = image.segment(".bss").unwrap();
        assert_eq!(bss.virtual_offset, 0x2020);
        assert_eq!(bss.file_length(), 0);
        assert_eq!(bss.extra_zero_length, 0x40);
        assert_eq!(bss.permissions, Permissions::RW);
    }

    #[test]
    fn test_load_metadata() {
        let fields = HeaderFields {
            flags: 0b1010,
            ..HeaderFields::default()
        };
        let image = load(&build(&fields), &BaseRelative::new(0)).unwrap();

        let titles: Vec<_> = image.metadata.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(
            titles,
            [
                "MCLF Version",
                "MCLF Flags",
                "MCLF Mem Type",
                "MCLF Service Type",
                "MCLF UUID",
                "MCLF Driver ID"
            ]
        );
        assert_eq!(image.metadata_value("MCLF Version"), Some("2.3"));
        assert_eq!(
            image.metadata_value("MCLF Mem Type"),
            Some("MCLF_MEM_TYPE_INTERNAL")
        );
        assert_eq!(
            image.metadata_value("MCLF Service Type"),
            Some("SERVICE_TYPE_SP_TRUSTLET")
        );
        assert_eq!(
            image.metadata_value("MCLF UUID"),
            Some("a0a1a2a3a4a5a6a7a8a9aaabacadaeaf")
        );
        assert_eq!(image.metadata_value("MCLF Driver ID"), Some("0x40101"));

        let flags = image.metadata_value("MCLF Flags").unwrap();
        let inner = flags
            .split_once('(')
            .and_then(|(_, rest)| rest.strip_suffix(')'))
            .unwrap();
        let names: Vec<_> = inner.split('|').map(str::trim).collect();
        assert_eq!(
            names,
            [
                "MC_SERVICE_HEADER_FLAGS_NO_CONTROL_INTERFACE",
                "MC_SERVICE_HEADER_FLAGS_EXTENDED_LAYOUT"
            ]
        );
    }

    #[test]
    fn test_unknown_enums_omit_metadata() {
        let fields = HeaderFields {
            mem_type: 9,
            service_type: 6,
            ..HeaderFields::default()
        };
        let image = load(&build(&fields), &BaseRelative::new(0)).unwrap();
        assert_eq!(image.metadata_value("MCLF Mem Type"), None);
        assert_eq!(image.metadata_value("MCLF Service Type"), None);
        assert_eq!(image.metadata.len(), 4);
    }

    #[test]
    fn test_entry_requests() {
        for (minor, expected) in [(2, HEADER_TYPE_V2), (3, HEADER_TYPE_V23), (5, HEADER_TYPE_V24)] {
            let fields = HeaderFields {
                minor,
                ..HeaderFields::default()
            };
            let image = load(&build(&fields), &BaseRelative::new(0)).unwrap();

            let header = image.entry_point("header").unwrap();
            assert_eq!(header.kind, EntryKind::Data);
            assert_eq!(header.offset, 0x1000);
            assert_eq!(header.declared_type.as_deref(), Some(expected));

            let text_header = image.entry_point("text_header").unwrap();
            assert_eq!(text_header.offset, 0x1080);
            assert_eq!(text_header.declared_type.as_deref(), Some(TEXT_HEADER_TYPE));

            let entry = image.entry_point("entry").unwrap();
            assert_eq!(entry.kind, EntryKind::Function);
            assert_eq!(entry.offset, 0x10a0);
        }
    }

    #[test]
    fn test_markers() {
        let image = load(&build(&HeaderFields::default()), &BaseRelative::new(0)).unwrap();
        assert_eq!(image.markers.len(), 2);
        assert_eq!(image.markers[0].name, ".text");
        assert_eq!((image.markers[0].file_offset, image.markers[0].length), (0, 0x100));
        assert_eq!(image.markers[1].name, ".data");
        assert_eq!((image.markers[1].file_offset, image.markers[1].length), (0x100, 0x20));
    }

    #[test]
    fn test_degenerate_zero_lengths() {
        let fields = HeaderFields {
            text_len: 0,
            data_len: 0,
            bss_len: 0,
            entry: 0,
            ..HeaderFields::default()
        };
        let image = load(&build(&fields), &BaseRelative::new(0)).unwrap();
        assert!(image.segments.iter().all(|s| s.memory_length() == 0));
        assert_eq!(image.entry_point("entry").unwrap().offset, 0);
    }

    #[test]
    fn test_segment_beyond_file() {
        let mut data = build(&HeaderFields::default());
        data.truncate(0x110);
        let err = load(&data, &BaseRelative::new(0)).unwrap_err();
        assert_eq!(
            err,
            MclfError::SegmentBeyondFile {
                segment: ".data",
                end: 0x120,
                len: 0x110
            }
        );
        assert_eq!(err.kind(), FailureKind::Truncated);
    }
}
