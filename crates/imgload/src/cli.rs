//! CLI definitions and argument types.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use imgload::{Arch, FormatKind};

/// Exit code for success.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code for failure.
pub const EXIT_FAILURE: i32 = 1;

#[derive(Parser)]
#[command(name = "imgload")]
#[command(about = "Sniff and load MCLF and S-Record binaries")]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (sets `RUST_LOG=debug`)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress output (only show errors)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub silent: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Report which loader recognizes a file
    Sniff {
        /// Input file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Architecture to pick when the format does not encode one
        #[arg(long, value_enum)]
        arch: Option<ArchArg>,
    },
    /// Load a file and print its segments, metadata and entry points
    Load {
        /// Input file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Only try this format
        #[arg(long, value_enum)]
        format: Option<FormatArg>,

        /// Architecture to pick when the format does not encode one
        #[arg(long, value_enum)]
        arch: Option<ArchArg>,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        output: OutputFormat,
    },
    /// Dump every record of an S-Record file
    Records {
        /// Input file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },
}

/// Loader format argument.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum FormatArg {
    /// MCLF trusted application
    Mclf,
    /// Motorola S-Record
    Srec,
}

impl From<FormatArg> for FormatKind {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Mclf => Self::Mclf,
            FormatArg::Srec => Self::Srec,
        }
    }
}

/// Architecture argument.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ArchArg {
    Arm,
    Arm64,
    X86,
    X64,
}

impl From<ArchArg> for Arch {
    fn from(arg: ArchArg) -> Self {
        match arg {
            ArchArg::Arm => Self::Arm,
            ArchArg::Arm64 => Self::Arm64,
            ArchArg::X86 => Self::X86,
            ArchArg::X64 => Self::X64,
        }
    }
}

/// Output format for results.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Text,
    /// Raw key-value output (for scripting)
    Raw,
}
