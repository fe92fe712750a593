//! SREC sniffing and image construction.

use imgload_image::{
    AddressingMode, Arch, Diagnostic, Endian, FormatDescriptor, FormatKind, ImageBuilder,
    LoadContext, LoadedImage, MetadataGroup, Permissions, Platform, Selection,
};
use tracing::{debug, info, warn};

use crate::accumulator::{FlushedSegment, SegmentAccumulator};
use crate::record::{RecordType, parse_records};
use crate::{Result, SrecError};

pub const SREC_TITLE: &str = "Motorola S-Record (SREC)";
pub const ARCH_PROMPT: &str = "Select an architecture to load...";

/// Check whether `data` is an S-Record file and find its base address.
///
/// Every line is verified. The first bad line fails the whole buffer and is
/// reported through the context.
///
/// # Errors
///
/// [`SrecError::MissingHeader`], [`SrecError::NotText`], the first bad line as
/// [`SrecError::Record`], [`SrecError::NoBaseAddress`], or
/// [`SrecError::Cancelled`] when the architecture prompt is cancelled.
pub fn query<C: LoadContext + ?Sized>(data: &[u8], ctx: &C) -> Result<FormatDescriptor> {
    if !data.starts_with(b"S0") {
        return Err(SrecError::MissingHeader);
    }
    let text = std::str::from_utf8(data).map_err(|_| reported(ctx, SrecError::NotText))?;

    let mut base_address: Option<u64> = None;
    let mut records = 0usize;
    for record in parse_records(text) {
        let record = record.map_err(|e| reported(ctx, e))?;
        records += 1;

        if !(record.record_type.is_data() || record.record_type.is_termination()) {
            continue;
        }
        if let Some(address) = record.address.filter(|a| *a != 0).map(u64::from) {
            base_address = Some(base_address.map_or(address, |base| base.min(address)));
        }
    }

    let base_address = base_address.ok_or_else(|| reported(ctx, SrecError::NoBaseAddress))?;

    let arch = choose_arch(ctx)?;
    debug!(records, base = format!("{base_address:#x}"), %arch, "SREC sniffed");

    Ok(FormatDescriptor {
        title: format!("{SREC_TITLE} {arch}"),
        kind: FormatKind::Srec,
        arch,
        endian: Endian::Little,
        addressing_mode: AddressingMode::Auto,
        platform: Platform::Unknown,
        base_address,
    })
}

/// Report `err` through the context and hand it back.
fn reported<C: LoadContext + ?Sized>(ctx: &C, err: SrecError) -> SrecError {
    ctx.report_diagnostic(&Diagnostic::error(err.to_string()));
    err
}

/// The format carries no architecture, so ask the host and default to ARM.
fn choose_arch<C: LoadContext + ?Sized>(ctx: &C) -> Result<Arch> {
    let names = Arch::ALL.map(Arch::name);
    match ctx.choose_from_list(ARCH_PROMPT, &names) {
        Selection::Unavailable => Ok(Arch::default()),
        Selection::Chosen(index) => Arch::ALL.get(index).copied().ok_or(SrecError::Cancelled),
        Selection::Cancelled => Err(SrecError::Cancelled),
    }
}

/// Build the image from every record in `data`.
///
/// Contiguous data records become one RWX `.text` segment. Termination
/// records close the open segment and queue the start address.
///
/// # Errors
///
/// [`SrecError::NotText`] or the first bad line as [`SrecError::Record`].
pub fn load<C: LoadContext + ?Sized>(data: &[u8], ctx: &C) -> Result<LoadedImage> {
    let text = std::str::from_utf8(data).map_err(|_| SrecError::NotText)?;

    let mut builder = ImageBuilder::new(ctx);
    let mut accumulator = SegmentAccumulator::new();

    for record in parse_records(text) {
        let record = record?;
        match record.record_type {
            RecordType::Header => {
                let header: String = record.payload.iter().copied().map(char::from).collect();
                builder.add_metadata(MetadataGroup::Analysis, "S-Record Header", header);
            }
            RecordType::Data16 | RecordType::Data24 | RecordType::Data32 => {
                // Data types always carry an address field.
                let address = u64::from(record.address.unwrap_or_default());
                if let Some(segment) = accumulator.push(address, &record.payload) {
                    emit_segment(&mut builder, ctx, segment);
                }
            }
            RecordType::Start32 | RecordType::Start24 | RecordType::Start16 => {
                if let Some(segment) = accumulator.flush() {
                    emit_segment(&mut builder, ctx, segment);
                }
                if let Some(start) = record.address.filter(|a| *a != 0) {
                    builder.queue_function(u64::from(start), "start");
                }
            }
            RecordType::Reserved | RecordType::Count16 | RecordType::Count24 => {}
        }
    }

    // Input without a termination record still has an open segment.
    if let Some(segment) = accumulator.flush() {
        emit_segment(&mut builder, ctx, segment);
    }

    let image = builder.finish();
    info!(
        segments = image.segments.len(),
        bytes = image.file_size(),
        "loaded SREC image"
    );
    Ok(image)
}

/// Add one `.text` segment, warning when it sits below the load base.
///
/// The base skips address zero, so data at zero translates to a wrapped
/// offset.
fn emit_segment<C: LoadContext + ?Sized>(
    builder: &mut ImageBuilder<'_, C>,
    ctx: &C,
    segment: FlushedSegment,
) {
    let offset = ctx.translate_virtual_to_relative(segment.start);
    if offset > segment.start {
        warn!(
            start = format!("{:#x}", segment.start),
            offset = format!("{offset:#x}"),
            "segment below load base"
        );
        ctx.report_diagnostic(&Diagnostic::warning(format!(
            "segment at {:#x} lies below the load base and wraps to offset {offset:#x}",
            segment.start
        )));
    }
    builder.add_segment(".text", segment.start, Permissions::RWX, segment.bytes, 0);
}
