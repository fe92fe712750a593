//! Load command.

use std::path::Path;

use imgload::{Arch, FormatKind, LoadOptions, LoaderRegistry};

use crate::cli::{EXIT_FAILURE, EXIT_SUCCESS, OutputFormat};
use crate::commands::{print_descriptor, print_image, read_input, report_failure};
use crate::terminal;

/// Handle the `load` command.
pub fn cmd_load(
    input: &Path,
    format: Option<FormatKind>,
    arch: Option<Arch>,
    output: OutputFormat,
) -> i32 {
    let Some(data) = read_input(input) else {
        return EXIT_FAILURE;
    };

    let options = LoadOptions { format, arch };
    let loaded = match LoaderRegistry::default().load(&data, &options) {
        Ok(loaded) => loaded,
        Err(e) => {
            report_failure(input, &e);
            return EXIT_FAILURE;
        }
    };

    if loaded.image.segments.is_empty() {
        terminal::warning("image has no segments");
    }
    print_descriptor(output, &loaded.descriptor);
    print_image(output, &loaded.image);
    EXIT_SUCCESS
}
