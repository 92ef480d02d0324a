//! Bridge from `warrant_config::Config` to rights and telemetry types.

use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow, bail};
use warrant_config::Config;
use warrant_rights::ReloadPolicy;
use warrant_telemetry::{FileRotation, LogConfig, LogFormat};

/// Convert config to [`LogConfig`].
#[must_use]
pub fn to_log_config(cfg: &Config) -> LogConfig {
    let format = cfg
        .logging
        .format
        .parse::<LogFormat>()
        .unwrap_or_default();

    let mut log_config = LogConfig::new(cfg.logging.level.to_ascii_lowercase()).with_format(format);

    for directive in &cfg.logging.directives {
        log_config = log_config.with_directive(directive);
    }

    if let Some(directory) = &cfg.logging.directory {
        log_config = log_config.with_file_logging(directory, FileRotation::Daily);
    }

    log_config
}

/// The configured reload policy.
///
/// # Errors
///
/// Returns an error if `rights.reload` names no known policy.
pub fn reload_policy(cfg: &Config) -> Result<ReloadPolicy> {
    cfg.rights
        .reload
        .parse()
        .map_err(|e: String| anyhow!("rights.reload: {e}"))
}

/// The rule file to use: `override_path` if given, else `rights.file`.
///
/// # Errors
///
/// Returns an error if neither names a file.
pub fn rights_file(cfg: &Config, override_path: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = override_path {
        return Ok(path.to_path_buf());
    }
    match &cfg.rights.file {
        Some(file) => Ok(PathBuf::from(file)),
        None => bail!(
            "no rights file configured; pass --rules, set rights.file, or set WARRANT_RIGHTS_FILE"
        ),
    }
}
