//! Host capabilities passed into every sniff and load call.

use std::fmt;

use tracing::{error, warn};

/// Answer from [`LoadContext::choose_from_list`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selection {
    /// No interactive collaborator exists. The loader keeps its default.
    Unavailable,
    /// Index into the offered options.
    Chosen(usize),
    /// A collaborator exists but declined to choose.
    Cancelled,
}

/// Diagnostic severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// Observational message about malformed input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

impl Diagnostic {
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Capabilities a loader borrows from its host.
///
/// Only address translation is mandatory. Without an interactive chooser the
/// loader falls back to its default, and diagnostics go to `tracing`.
pub trait LoadContext {
    /// Map an absolute (virtual) address to an offset within the image.
    fn translate_virtual_to_relative(&self, address: u64) -> u64;

    /// Let a human pick one of `options`.
    fn choose_from_list(&self, prompt: &str, options: &[&str]) -> Selection {
        let _ = (prompt, options);
        Selection::Unavailable
    }

    /// Report malformed input. Never affects control flow.
    fn report_diagnostic(&self, diagnostic: &Diagnostic) {
        match diagnostic.severity {
            Severity::Warning => warn!(message = %diagnostic.message, "loader diagnostic"),
            Severity::Error => error!(message = %diagnostic.message, "loader diagnostic"),
        }
    }
}

/// Context that places the image relative to a fixed base address.
///
/// Translation wraps, matching the host's `va - base` arithmetic.
#[derive(Clone, Debug, Default)]
pub struct BaseRelative {
    base_address: u64,
    preselected: Option<String>,
}

impl BaseRelative {
    #[must_use]
    pub const fn new(base_address: u64) -> Self {
        Self {
            base_address,
            preselected: None,
        }
    }

    /// Answer every chooser prompt with the option named `choice`.
    ///
    /// A prompt whose options do not contain `choice` is cancelled.
    #[must_use]
    pub fn with_choice(mut self, choice: impl Into<String>) -> Self {
        self.preselected = Some(choice.into());
        self
    }

    #[must_use]
    pub const fn base_address(&self) -> u64 {
        self.base_address
    }
}

impl LoadContext for BaseRelative {
    fn translate_virtual_to_relative(&self, address: u64) -> u64 {
        address.wrapping_sub(self.base_address)
    }

    fn choose_from_list(&self, _prompt: &str, options: &[&str]) -> Selection {
        let Some(choice) = self.preselected.as_deref() else {
            return Selection::Unavailable;
        };
        options
            .iter()
            .position(|option| *option == choice)
            .map_or(Selection::Cancelled, Selection::Chosen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_relative_translation() {
        let ctx = BaseRelative::new(0x1000);
        assert_eq!(ctx.translate_virtual_to_relative(0x1000), 0);
        assert_eq!(ctx.translate_virtual_to_relative(0x1234), 0x234);
        assert_eq!(BaseRelative::new(0).translate_virtual_to_relative(0x80), 0x80);
    }

    #[test]
    fn test_base_relative_choice() {
        let options = ["arm", "x86"];
        assert_eq!(
            BaseRelative::new(0).choose_from_list("pick", &options),
            Selection::Unavailable
        );
        assert_eq!(
            BaseRelative::new(0)
                .with_choice("x86")
                .choose_from_list("pick", &options),
            Selection::Chosen(1)
        );
        assert_eq!(
            BaseRelative::new(0)
                .with_choice("mips")
                .choose_from_list("pick", &options),
            Selection::Cancelled
        );
    }
}
