//! Command implementations.
//!
//! Each submodule handles a specific CLI command.

mod load;
mod records;
mod sniff;

use std::path::Path;

use tracing::error;

use crate::cli::{Cli, Commands, OutputFormat};
use crate::terminal;

/// Dispatch CLI command to the appropriate handler.
pub fn run_command(cli: &Cli) -> i32 {
    match &cli.command {
        Commands::Sniff { input, arch } => sniff::cmd_sniff(input, arch.map(Into::into)),
        Commands::Load {
            input,
            format,
            arch,
            output,
        } => load::cmd_load(
            input,
            format.map(Into::into),
            arch.map(Into::into),
            *output,
        ),
        Commands::Records { input } => records::cmd_records(input),
    }
}

/// Read an input file, reporting the failure.
fn read_input(path: &Path) -> Option<Vec<u8>> {
    match std::fs::read(path) {
        Ok(data) => Some(data),
        Err(e) => {
            report_failure(path, &imgload::Error::from(e));
            None
        }
    }
}

/// Report a loader failure on the terminal.
fn report_failure(path: &Path, err: &imgload::Error) {
    terminal::error(&format!("{}: {err}", path.display()));
    error!(path = %path.display(), kind = ?err.kind(), "load failed");
}

// ============================================================================
// Output formatting helpers
// ============================================================================

/// Print the format descriptor of a recognized input.
pub fn print_descriptor(format: OutputFormat, descriptor: &imgload::FormatDescriptor) {
    match format {
        OutputFormat::Text => {
            terminal::header(&descriptor.title);
            terminal::indent(&format!("Format: {}", descriptor.kind));
            terminal::indent(&format!("Arch: {}", descriptor.arch));
            terminal::indent(&format!("Endian: {:?}", descriptor.endian));
            terminal::indent(&format!("Base: {:#x}", descriptor.base_address));
        }
        OutputFormat::Raw => {
            println!("format: {}", descriptor.kind);
            println!("arch: {}", descriptor.arch);
            println!("base: {:#x}", descriptor.base_address);
        }
    }
}

/// Print segments, markers, metadata and entry points of a loaded image.
pub fn print_image(format: OutputFormat, image: &imgload::LoadedImage) {
    match format {
        OutputFormat::Text => {
            terminal::header("Segments");
            for segment in &image.segments {
                terminal::indent(&format!(
                    "{:<8} {} {:#010x}..{:#010x} file {:#x} zero {:#x}",
                    segment.name,
                    segment.permissions,
                    segment.virtual_offset,
                    segment.virtual_end(),
                    segment.file_length(),
                    segment.extra_zero_length,
                ));
            }
            if !image.markers.is_empty() {
                terminal::header("Regions");
                for marker in &image.markers {
                    terminal::indent(&format!(
                        "{:<8} file {:#x}+{:#x}",
                        marker.name, marker.file_offset, marker.length
                    ));
                }
            }
            if !image.metadata.is_empty() {
                terminal::header("Metadata");
                for entry in &image.metadata {
                    terminal::indent(&format!("{}: {}", entry.title, entry.value));
                }
            }
            if !image.entry_points.is_empty() {
                terminal::header("Entry points");
                for entry in &image.entry_points {
                    let line = entry.declared_type.as_ref().map_or_else(
                        || format!("{:#010x} {}", entry.offset, entry.label),
                        |ty| format!("{:#010x} {} ({ty})", entry.offset, entry.label),
                    );
                    terminal::dim(&line);
                }
            }
        }
        OutputFormat::Raw => {
            for segment in &image.segments {
                println!(
                    "segment: {} {:#x} {:#x} {:#x} {}",
                    segment.name,
                    segment.virtual_offset,
                    segment.file_length(),
                    segment.extra_zero_length,
                    segment.permissions,
                );
            }
            for marker in &image.markers {
                println!(
                    "marker: {} {:#x} {:#x}",
                    marker.name, marker.file_offset, marker.length
                );
            }
            for entry in &image.metadata {
                println!("metadata: {}={}", entry.title, entry.value);
            }
            for entry in &image.entry_points {
                println!("entry: {} {:#x}", entry.label, entry.offset);
            }
        }
    }
}
