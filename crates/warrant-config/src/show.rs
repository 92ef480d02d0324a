//! Source-annotated display for `config show`.

use std::fmt::{self, Write as _};

use crate::merge::FieldSources;
use crate::types::Config;

/// A resolved configuration together with source annotations.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// The final merged configuration.
    pub config: Config,
    /// Dotted field path → which layer set the value.
    pub field_sources: FieldSources,
    /// Config file paths that were loaded (in precedence order).
    pub loaded_files: Vec<String>,
}

/// Output format for `config show`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowFormat {
    /// TOML with a trailing comment naming each value's layer.
    Toml,
    /// JSON, without annotations.
    Json,
}

impl ResolvedConfig {
    /// Render the configuration, optionally a single section of it.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or `section` does not exist.
    pub fn show(&self, format: ShowFormat, section: Option<&str>) -> Result<String, fmt::Error> {
        match format {
            ShowFormat::Toml => self.show_toml(section),
            ShowFormat::Json => self.show_json(section),
        }
    }

    fn section_value(&self, name: &str) -> Result<toml::Value, fmt::Error> {
        let value = toml::Value::try_from(&self.config).map_err(|_| fmt::Error)?;
        value
            .as_table()
            .and_then(|table| table.get(name))
            .cloned()
            .ok_or(fmt::Error)
    }

    fn show_toml(&self, section: Option<&str>) -> Result<String, fmt::Error> {
        let toml_str = match section {
            Some(name) => {
                let mut wrapper = toml::map::Map::new();
                wrapper.insert(name.to_owned(), self.section_value(name)?);
                toml::to_string_pretty(&wrapper).map_err(|_| fmt::Error)?
            },
            None => toml::to_string_pretty(&self.config).map_err(|_| fmt::Error)?,
        };

        let mut output = String::new();
        output.push_str("# Resolved Warrant configuration\n");
        output.push_str("# Source annotations: [defaults] [system] [user] [explicit] [env]\n");

        if !self.loaded_files.is_empty() {
            output.push_str("#\n# Loaded files (in precedence order):\n");
            for (i, path) in self.loaded_files.iter().enumerate() {
                writeln!(output, "#   {}. {path}", i.saturating_add(1))?;
            }
        }
        output.push('\n');

        let mut table = String::new();
        for line in toml_str.lines() {
            let trimmed = line.trim();
            if let Some(header) = trimmed
                .strip_prefix('[')
                .and_then(|rest| rest.strip_suffix(']'))
            {
                header.clone_into(&mut table);
            }

            match self.annotate_line(trimmed, &table) {
                Some(layer) => writeln!(output, "{line}  # [{layer}]")?,
                None => writeln!(output, "{line}")?,
            }
        }

        Ok(output)
    }

    fn show_json(&self, section: Option<&str>) -> Result<String, fmt::Error> {
        match section {
            Some(name) => {
                serde_json::to_string_pretty(&self.section_value(name)?).map_err(|_| fmt::Error)
            },
            None => serde_json::to_string_pretty(&self.config).map_err(|_| fmt::Error),
        }
    }

    fn annotate_line(&self, trimmed: &str, table: &str) -> Option<String> {
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('[') {
            return None;
        }

        let key = trimmed.split('=').next()?.trim();
        let field_path = if table.is_empty() {
            key.to_owned()
        } else {
            format!("{table}.{key}")
        };

        self.field_sources
            .get(&field_path)
            .map(ToString::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::ConfigLayer;

    fn resolved() -> ResolvedConfig {
        let mut config = Config::default();
        config.rights.file = Some("/srv/rights".to_owned());

        let mut field_sources = FieldSources::new();
        field_sources.insert("rights.file".to_owned(), ConfigLayer::User);
        field_sources.insert("rights.reload".to_owned(), ConfigLayer::Defaults);
        field_sources.insert("logging.level".to_owned(), ConfigLayer::Environment);

        ResolvedConfig {
            config,
            field_sources,
            loaded_files: vec!["/home/alice/.warrant/config.toml".to_owned()],
        }
    }

    #[test]
    fn test_show_toml_annotates_sources() {
        let output = resolved().show(ShowFormat::Toml, None).unwrap();
        assert!(output.contains("Resolved Warrant configuration"));
        assert!(output.contains("1. /home/alice/.warrant/config.toml"));
        assert!(output.contains("file = \"/srv/rights\"  # [user]"));
        assert!(output.contains("reload = \"always\"  # [defaults]"));
        assert!(output.contains("level = \"info\"  # [env]"));
    }

    #[test]
    fn test_show_json() {
        let output = resolved().show(ShowFormat::Json, None).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["rights"]["file"], "/srv/rights");
        assert_eq!(value["logging"]["format"], "compact");
    }

    #[test]
    fn test_show_section() {
        let output = resolved().show(ShowFormat::Toml, Some("logging")).unwrap();
        assert!(output.contains("[logging]"));
        assert!(output.contains("level = \"info\"  # [env]"));
        assert!(!output.contains("reload"));
    }

    #[test]
    fn test_show_unknown_section() {
        assert!(resolved().show(ShowFormat::Json, Some("nope")).is_err());
    }
}
