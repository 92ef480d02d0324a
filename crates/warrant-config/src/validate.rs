//! Post-merge configuration validation.

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;

const RELOAD_POLICIES: &[&str] = &["always", "on_change"];
const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: &[&str] = &["pretty", "compact", "json", "full"];

/// Validate a fully merged and deserialized configuration.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_rights(config)?;
    validate_logging(config)?;
    Ok(())
}

fn invalid(field: &str, message: String) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_owned(),
        message,
    }
}

fn one_of(field: &str, value: &str, allowed: &[&str]) -> ConfigResult<()> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(invalid(
            field,
            format!(
                "unsupported value '{value}'; expected one of: {}",
                allowed.join(", ")
            ),
        ))
    }
}

fn validate_rights(config: &Config) -> ConfigResult<()> {
    let r = &config.rights;

    if r.file.as_deref().is_some_and(|f| f.trim().is_empty()) {
        return Err(invalid(
            "rights.file",
            "rule file path must not be empty".to_owned(),
        ));
    }

    one_of("rights.reload", &r.reload, RELOAD_POLICIES)
}

fn validate_logging(config: &Config) -> ConfigResult<()> {
    let l = &config.logging;

    one_of("logging.level", &l.level.to_ascii_lowercase(), LOG_LEVELS)?;
    one_of("logging.format", &l.format.to_ascii_lowercase(), LOG_FORMATS)?;

    if let Some(directive) = l.directives.iter().find(|d| d.trim().is_empty()) {
        return Err(invalid(
            "logging.directives",
            format!("empty directive {directive:?}"),
        ));
    }

    if l.directory.as_deref().is_some_and(|d| d.trim().is_empty()) {
        return Err(invalid(
            "logging.directory",
            "log directory must not be empty".to_owned(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(err: ConfigError) -> String {
        match err {
            ConfigError::ValidationError { field, .. } => field,
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_reload_policy() {
        let mut config = Config::default();
        config.rights.reload = "on_change".to_owned();
        assert!(validate(&config).is_ok());

        config.rights.reload = "hourly".to_owned();
        assert_eq!(field_of(validate(&config).unwrap_err()), "rights.reload");
    }

    #[test]
    fn test_empty_rights_file() {
        let mut config = Config::default();
        config.rights.file = Some("  ".to_owned());
        assert_eq!(field_of(validate(&config).unwrap_err()), "rights.file");
    }

    #[test]
    fn test_log_level_case_insensitive() {
        let mut config = Config::default();
        config.logging.level = "DEBUG".to_owned();
        assert!(validate(&config).is_ok());

        config.logging.level = "verbose".to_owned();
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("verbose"));
        assert_eq!(field_of(err), "logging.level");
    }

    #[test]
    fn test_log_format() {
        let mut config = Config::default();
        config.logging.format = "xml".to_owned();
        assert_eq!(field_of(validate(&config).unwrap_err()), "logging.format");
    }

    #[test]
    fn test_empty_directive() {
        let mut config = Config::default();
        config.logging.directives = vec!["warrant_rights=debug".to_owned(), String::new()];
        assert_eq!(
            field_of(validate(&config).unwrap_err()),
            "logging.directives"
        );
    }
}
