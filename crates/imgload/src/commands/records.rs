//! Records command.

use std::path::Path;

use tracing::error;

use crate::cli::{EXIT_FAILURE, EXIT_SUCCESS};
use crate::commands::read_input;
use crate::terminal;

/// Handle the `records` command.
pub fn cmd_records(input: &Path) -> i32 {
    let Some(data) = read_input(input) else {
        return EXIT_FAILURE;
    };
    let Ok(text) = std::str::from_utf8(&data) else {
        terminal::error(&format!("{}: not a text file", input.display()));
        return EXIT_FAILURE;
    };

    for (index, record) in imgload::parse_records(text).enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                error!(error = %e, "bad record");
                terminal::error(&e.to_string());
                return EXIT_FAILURE;
            }
        };
        let address = record
            .address
            .map_or_else(|| "-".to_string(), |address| format!("{address:#x}"));
        println!(
            "{:>5} S{} {:>10} {:>3} bytes  checksum {:02X}",
            index + 1,
            record.record_type.digit(),
            address,
            record.payload.len(),
            record.checksum(),
        );
    }
    EXIT_SUCCESS
}
