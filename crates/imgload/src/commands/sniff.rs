//! Sniff command.

use std::path::Path;

use imgload::{Arch, LoadOptions, LoaderRegistry};

use crate::cli::{EXIT_FAILURE, EXIT_SUCCESS, OutputFormat};
use crate::commands::{print_descriptor, read_input, report_failure};
use crate::terminal;

/// Handle the `sniff` command.
pub fn cmd_sniff(input: &Path, arch: Option<Arch>) -> i32 {
    let Some(data) = read_input(input) else {
        return EXIT_FAILURE;
    };

    let options = LoadOptions { format: None, arch };
    let registry = LoaderRegistry::default();
    match registry.sniff(&data, &options.sniff_context()) {
        Ok(sniffed) => {
            terminal::success(&format!(
                "{}: {}",
                input.display(),
                sniffed.loader.description()
            ));
            print_descriptor(OutputFormat::Text, &sniffed.descriptor);
            EXIT_SUCCESS
        }
        Err(e) => {
            report_failure(input, &e);
            EXIT_FAILURE
        }
    }
}
