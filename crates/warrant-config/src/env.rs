//! Environment variable fallbacks.
//!
//! Variables only fill fields that no configuration file set; a value in
//! any file wins over the environment.

use std::collections::HashMap;
use std::hash::BuildHasher;

use tracing::debug;

use crate::merge::{ConfigLayer, FieldSources};

struct EnvMapping {
    var_name: &'static str,
    field_path: &'static str,
}

const ENV_MAPPINGS: &[EnvMapping] = &[
    EnvMapping {
        var_name: "WARRANT_RIGHTS_FILE",
        field_path: "rights.file",
    },
    EnvMapping {
        var_name: "WARRANT_RIGHTS_RELOAD",
        field_path: "rights.reload",
    },
    EnvMapping {
        var_name: "WARRANT_LOG_LEVEL",
        field_path: "logging.level",
    },
    EnvMapping {
        var_name: "WARRANT_LOG_FORMAT",
        field_path: "logging.format",
    },
];

/// Names of the environment variables consulted as fallbacks.
#[must_use]
pub fn env_var_names() -> Vec<&'static str> {
    ENV_MAPPINGS.iter().map(|m| m.var_name).collect()
}

/// Apply environment fallbacks to fields that no file layer set. Fields
/// that only carry a built-in default count as unset.
///
/// Returns the number of variables applied.
pub fn apply_env_fallbacks<S: BuildHasher>(
    merged: &mut toml::Value,
    sources: &mut FieldSources,
    env_vars: &HashMap<String, String, S>,
) -> usize {
    let mut count: usize = 0;

    for mapping in ENV_MAPPINGS {
        let set_by_file = sources
            .get(mapping.field_path)
            .is_some_and(|layer| *layer != ConfigLayer::Defaults);
        if set_by_file {
            continue;
        }

        if let Some(val) = env_vars.get(mapping.var_name) {
            debug!(
                var = mapping.var_name,
                field = mapping.field_path,
                "applying env var fallback"
            );
            set_field(merged, mapping.field_path, val);
            sources.insert(mapping.field_path.to_owned(), ConfigLayer::Environment);
            count = count.saturating_add(1);
        }
    }

    count
}

/// Set a dotted string field, creating intermediate tables.
fn set_field(root: &mut toml::Value, path: &str, val: &str) {
    let mut current = root;
    let mut segments = path.split('.').peekable();

    while let Some(segment) = segments.next() {
        let Some(table) = current.as_table_mut() else {
            return;
        };
        if segments.peek().is_none() {
            table.insert(segment.to_owned(), toml::Value::String(val.to_owned()));
            return;
        }
        current = table
            .entry(segment)
            .or_insert(toml::Value::Table(toml::map::Map::new()));
    }
}

/// Collect all current environment variables into a map.
#[must_use]
pub fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars().collect()
}
