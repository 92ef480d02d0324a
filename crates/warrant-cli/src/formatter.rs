//! Output format selection.

use serde::Serialize;

/// Output format mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OutputFormat {
    /// Colored, human-readable.
    Pretty,
    /// One JSON document on stdout.
    Json,
}

impl OutputFormat {
    /// Anything but `json` means pretty output.
    pub(crate) fn from_flag(flag: &str) -> Self {
        if flag.eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Pretty
        }
    }
}

/// Print `value` as pretty JSON on stdout.
pub(crate) fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
