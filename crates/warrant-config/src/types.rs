//! Configuration struct definitions.
//!
//! Enumerated settings are kept as strings here and checked in
//! [`validate`](crate::validate); the CLI converts them to the domain types
//! of the rights and telemetry crates.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the rule file lives and how it is reloaded.
    pub rights: RightsSection,
    /// Log output.
    pub logging: LoggingSection,
}

/// `[rights]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RightsSection {
    /// Path to the rule file. Relative paths resolve against the working
    /// directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// `"always"` or `"on_change"`.
    pub reload: String,
}

impl Default for RightsSection {
    fn default() -> Self {
        Self {
            file: None,
            reload: "always".to_owned(),
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Global log level filter (`"trace"`, `"debug"`, `"info"`, `"warn"`,
    /// `"error"`).
    pub level: String,
    /// Output format: `"pretty"`, `"compact"`, `"json"` or `"full"`.
    pub format: String,
    /// Per-crate tracing directives (e.g. `["warrant_rights=debug"]`).
    pub directives: Vec<String>,
    /// Directory for rolling log files; stderr when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: "compact".to_owned(),
            directives: Vec::new(),
            directory: None,
        }
    }
}
