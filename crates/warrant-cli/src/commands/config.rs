//! CLI handlers for the `warrant config` subcommand.

use std::path::Path;

use anyhow::Result;
use warrant_config::{ConfigPaths, ConfigResult, ResolvedConfig, ShowFormat, env::env_var_names};

use crate::formatter::OutputFormat;
use crate::theme::Theme;

/// Show the resolved configuration with source annotations.
pub(crate) fn show_config(
    resolved: &ResolvedConfig,
    format: OutputFormat,
    section: Option<&str>,
) -> Result<()> {
    let show_format = match format {
        OutputFormat::Json => ShowFormat::Json,
        OutputFormat::Pretty => ShowFormat::Toml,
    };

    let output = resolved
        .show(show_format, section)
        .map_err(|e| anyhow::anyhow!("failed to format config: {e}"))?;

    println!("{output}");
    Ok(())
}

/// Report whether the configuration loaded.
pub(crate) fn validate_config(loaded: ConfigResult<ResolvedConfig>) -> Result<()> {
    let resolved = loaded?;
    println!("{}", Theme::success("Configuration is valid."));
    if !resolved.loaded_files.is_empty() {
        println!("\nLoaded files:");
        for path in &resolved.loaded_files {
            println!("  - {path}");
        }
    }
    Ok(())
}

/// Show all config file paths that are checked.
pub(crate) fn show_paths(explicit: Option<&Path>) -> Result<()> {
    let paths = ConfigPaths::discover(explicit, None)?;

    println!("Configuration files checked (in precedence order):\n");
    for (i, path) in paths.all().iter().enumerate() {
        let status = if path.exists() { "found" } else { "not found" };
        println!(
            "  {}. {}  {}",
            i.saturating_add(1),
            path.display(),
            Theme::dimmed(&format!("[{status}]"))
        );
    }

    println!("\nEnvironment variable fallbacks:");
    for name in env_var_names() {
        println!("  {name}");
    }

    Ok(())
}
