//! Terminal styling for command output.

use colored::Colorize;

/// Styles shared by the commands.
pub(crate) struct Theme;

impl Theme {
    /// Section title.
    pub(crate) fn header(text: &str) -> String {
        text.bold().cyan().to_string()
    }

    /// A positive outcome, prefixed with a check mark.
    pub(crate) fn success(text: &str) -> String {
        format!("{} {text}", "✓".green())
    }

    /// A negative outcome or a problem, in red.
    pub(crate) fn error(text: &str) -> String {
        format!("{} {}", "✗".red(), text.red())
    }

    /// Neutral information.
    pub(crate) fn info(text: &str) -> String {
        format!("{} {text}", "i".blue())
    }

    /// Secondary detail.
    pub(crate) fn dimmed(text: &str) -> String {
        text.dimmed().to_string()
    }

    /// A permission set; the empty set reads as "(none)".
    pub(crate) fn permissions(symbols: &str) -> String {
        if symbols.is_empty() {
            "(none)".red().to_string()
        } else {
            symbols.bold().green().to_string()
        }
    }

    /// Rule under a table header.
    pub(crate) fn separator() -> String {
        "─".repeat(80).dimmed().to_string()
    }
}
