//! Styled output helpers for CLI commands.

use console::style;

/// Print a success message to stderr.
pub fn success(message: &str) {
    eprintln!("{} {}", style("✓").green().bold(), message);
}

/// Print an error message to stderr.
pub fn error(message: &str) {
    eprintln!("{} {}", style("✗").red().bold(), message);
}

/// Print a warning message to stderr.
pub fn warning(message: &str) {
    eprintln!("{} {}", style("!").yellow().bold(), message);
}

/// Print a section title to stdout.
pub fn header(message: &str) {
    println!("\n{}", style(message).bold());
}

/// Print an indented line to stdout.
pub fn indent(message: &str) {
    println!("  {message}");
}

/// Print an indented, dimmed line to stdout.
pub fn dim(message: &str) {
    println!("  {}", style(message).dim());
}
