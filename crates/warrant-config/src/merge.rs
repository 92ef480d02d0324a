//! Deep merge of TOML layers with per-field source tracking.
//!
//! Layers are merged as raw [`toml::Value`] trees, so a key that a layer
//! leaves out never overrides the value beneath it.

use std::collections::HashMap;
use std::fmt;

/// Which configuration layer a value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigLayer {
    /// Compiled-in defaults (`defaults.toml`).
    Defaults,
    /// System-wide configuration (`/etc/warrant/config.toml`).
    System,
    /// User-level configuration (`~/.warrant/config.toml`).
    User,
    /// A file named on the command line.
    Explicit,
    /// Environment variable fallback.
    Environment,
}

impl fmt::Display for ConfigLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Defaults => write!(f, "defaults"),
            Self::System => write!(f, "system"),
            Self::User => write!(f, "user"),
            Self::Explicit => write!(f, "explicit"),
            Self::Environment => write!(f, "env"),
        }
    }
}

/// Dotted field path → layer that last set it.
pub type FieldSources = HashMap<String, ConfigLayer>;

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_owned()
    } else {
        format!("{prefix}.{key}")
    }
}

/// Deep-merge `overlay` into `base`, recording `layer` for every leaf the
/// overlay sets.
///
/// Tables merge per key; scalars and arrays replace the base value.
pub fn deep_merge_tracking(
    base: &mut toml::Value,
    overlay: &toml::Value,
    prefix: &str,
    layer: &ConfigLayer,
    sources: &mut FieldSources,
) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let path = join(prefix, key);
                match base_table.get_mut(key) {
                    Some(base_val) if overlay_val.is_table() => {
                        deep_merge_tracking(base_val, overlay_val, &path, layer, sources);
                    },
                    Some(base_val) => {
                        *base_val = overlay_val.clone();
                        sources.insert(path, layer.clone());
                    },
                    None => {
                        base_table.insert(key.clone(), overlay_val.clone());
                        record_leaves(overlay_val, &path, layer, sources);
                    },
                }
            }
        },
        (base, overlay) => {
            *base = overlay.clone();
            record_leaves(overlay, prefix, layer, sources);
        },
    }
}

/// Record every leaf under `val` as set by `layer`.
pub fn record_leaves(
    val: &toml::Value,
    prefix: &str,
    layer: &ConfigLayer,
    sources: &mut FieldSources,
) {
    if let toml::Value::Table(table) = val {
        for (key, child) in table {
            record_leaves(child, &join(prefix, key), layer, sources);
        }
    } else {
        sources.insert(prefix.to_owned(), layer.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> toml::Value {
        toml::from_str(text).unwrap()
    }

    #[test]
    fn test_overlay_replaces_scalars_only_where_set() {
        let mut base = parse("[logging]\nlevel = \"info\"\nformat = \"compact\"\n");
        let overlay = parse("[logging]\nlevel = \"debug\"\n");
        let mut sources = FieldSources::new();

        deep_merge_tracking(&mut base, &overlay, "", &ConfigLayer::User, &mut sources);

        assert_eq!(base["logging"]["level"].as_str().unwrap(), "debug");
        assert_eq!(base["logging"]["format"].as_str().unwrap(), "compact");
        assert_eq!(sources.get("logging.level"), Some(&ConfigLayer::User));
        assert!(!sources.contains_key("logging.format"));
    }

    #[test]
    fn test_new_keys_are_recorded() {
        let mut base = parse("[rights]\nreload = \"always\"\n");
        let overlay = parse("[rights]\nfile = \"/srv/rights\"\n[logging]\nlevel = \"warn\"\n");
        let mut sources = FieldSources::new();

        deep_merge_tracking(&mut base, &overlay, "", &ConfigLayer::System, &mut sources);

        assert_eq!(base["rights"]["file"].as_str().unwrap(), "/srv/rights");
        assert_eq!(sources.get("rights.file"), Some(&ConfigLayer::System));
        assert_eq!(sources.get("logging.level"), Some(&ConfigLayer::System));
    }

    #[test]
    fn test_arrays_are_replaced_not_appended() {
        let mut base = parse("[logging]\ndirectives = [\"a=debug\"]\n");
        let overlay = parse("[logging]\ndirectives = [\"b=trace\"]\n");
        let mut sources = FieldSources::new();

        deep_merge_tracking(&mut base, &overlay, "", &ConfigLayer::Explicit, &mut sources);

        let directives = base["logging"]["directives"].as_array().unwrap();
        assert_eq!(directives.len(), 1);
        assert_eq!(directives[0].as_str().unwrap(), "b=trace");
    }

    #[test]
    fn test_later_layer_wins_source() {
        let mut base = parse("[logging]\nlevel = \"info\"\n");
        let mut sources = FieldSources::new();
        record_leaves(&base, "", &ConfigLayer::Defaults, &mut sources);

        for layer in [ConfigLayer::System, ConfigLayer::User] {
            deep_merge_tracking(
                &mut base,
                &parse("[logging]\nlevel = \"warn\"\n"),
                "",
                &layer,
                &mut sources,
            );
        }

        assert_eq!(sources.get("logging.level"), Some(&ConfigLayer::User));
    }
}
