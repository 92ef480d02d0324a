//! Config file discovery and layered loading.
//!
//! `Config::load()` runs these steps:
//! 1. Parse `defaults.toml` → base
//! 2. Merge `/etc/warrant/config.toml` (system)
//! 3. Merge `~/.warrant/config.toml` (user)
//! 4. Merge the file named with `--config`, which must exist (explicit)
//! 5. Apply env var fallbacks for fields no file set
//! 6. Deserialize and validate

use std::collections::HashMap;
use std::hash::BuildHasher;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::env::{apply_env_fallbacks, collect_env_vars};
use crate::error::{ConfigError, ConfigResult};
use crate::merge::{ConfigLayer, FieldSources, deep_merge_tracking, record_leaves};
use crate::show::ResolvedConfig;
use crate::types::Config;
use crate::validate;

/// Embedded default configuration.
const DEFAULTS_TOML: &str = include_str!("defaults.toml");

/// Maximum allowed config file size (1 MiB).
const MAX_CONFIG_FILE_SIZE: u64 = 1_048_576;

/// System-wide configuration file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/warrant/config.toml";

/// Per-user configuration directory, relative to the home directory.
pub const USER_CONFIG_DIR: &str = ".warrant";

/// Where each file layer is looked for.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    /// System layer; skipped when absent.
    pub system: PathBuf,
    /// User layer; skipped when absent.
    pub user: PathBuf,
    /// Explicit layer; an error when absent.
    pub explicit: Option<PathBuf>,
}

impl ConfigPaths {
    /// Standard locations. `home_override` is treated as the `.warrant`
    /// directory itself.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoHomeDir`] if no override is given and the
    /// home directory cannot be determined.
    pub fn discover(explicit: Option<&Path>, home_override: Option<&Path>) -> ConfigResult<Self> {
        let user_dir = match home_override {
            Some(dir) => dir.to_path_buf(),
            None => home_directory()?.join(USER_CONFIG_DIR),
        };
        Ok(Self {
            system: PathBuf::from(SYSTEM_CONFIG_PATH),
            user: user_dir.join("config.toml"),
            explicit: explicit.map(Path::to_path_buf),
        })
    }

    /// All paths in precedence order, lowest first.
    #[must_use]
    pub fn all(&self) -> Vec<&Path> {
        let mut paths = vec![self.system.as_path(), self.user.as_path()];
        if let Some(explicit) = &self.explicit {
            paths.push(explicit);
        }
        paths
    }
}

/// Load the configuration from the standard locations.
///
/// # Errors
///
/// Returns a [`ConfigError`] if a file is unreadable or malformed, the
/// explicit file is missing, or the merged configuration fails validation.
pub fn load(explicit: Option<&Path>, home_override: Option<&Path>) -> ConfigResult<ResolvedConfig> {
    let paths = ConfigPaths::discover(explicit, home_override)?;
    load_from(&paths, &collect_env_vars())
}

/// Load the configuration from the given locations and environment.
///
/// # Errors
///
/// See [`load`].
pub fn load_from<S: BuildHasher>(
    paths: &ConfigPaths,
    env_vars: &HashMap<String, String, S>,
) -> ConfigResult<ResolvedConfig> {
    let mut merged: toml::Value =
        toml::from_str(DEFAULTS_TOML).map_err(|e| ConfigError::ParseError {
            path: "<embedded defaults>".to_owned(),
            source: e,
        })?;

    let mut field_sources = FieldSources::new();
    let mut loaded_files = Vec::new();
    record_leaves(&merged, "", &ConfigLayer::Defaults, &mut field_sources);

    let mut layers = vec![
        (ConfigLayer::System, paths.system.as_path(), false),
        (ConfigLayer::User, paths.user.as_path(), false),
    ];
    if let Some(explicit) = &paths.explicit {
        layers.push((ConfigLayer::Explicit, explicit.as_path(), true));
    }

    for (layer, path, required) in layers {
        let overlay = match try_load_file(path)? {
            Some(overlay) => overlay,
            None if required => {
                return Err(ConfigError::ReadError {
                    path: path.display().to_string(),
                    source: io::Error::from(io::ErrorKind::NotFound),
                });
            },
            None => continue,
        };
        deep_merge_tracking(&mut merged, &overlay, "", &layer, &mut field_sources);
        loaded_files.push(path.display().to_string());
        info!(path = %path.display(), layer = %layer, "loaded config");
    }

    let env_count = apply_env_fallbacks(&mut merged, &mut field_sources, env_vars);
    if env_count > 0 {
        debug!(count = env_count, "applied environment variable fallbacks");
    }

    let config: Config =
        merged
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::ParseError {
                path: "<merged config>".to_owned(),
                source: e,
            })?;

    validate::validate(&config)?;

    Ok(ResolvedConfig {
        config,
        field_sources,
        loaded_files,
    })
}

/// Load a config from a single file (no layering, no environment).
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read, parsed or
/// validated.
pub fn load_file(path: &Path) -> ConfigResult<Config> {
    let value = try_load_file(path)?.ok_or_else(|| ConfigError::ReadError {
        path: path.display().to_string(),
        source: io::Error::from(io::ErrorKind::NotFound),
    })?;

    let config: Config = value
        .try_into()
        .map_err(|e: toml::de::Error| ConfigError::ParseError {
            path: path.display().to_string(),
            source: e,
        })?;

    validate::validate(&config)?;
    Ok(config)
}

/// Read and parse a file, returning `None` if it doesn't exist.
fn try_load_file(path: &Path) -> ConfigResult<Option<toml::Value>> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "config file not found, skipping");
            return Ok(None);
        },
        Err(e) => {
            return Err(ConfigError::ReadError {
                path: path.display().to_string(),
                source: e,
            });
        },
    };

    let size = u64::try_from(content.len()).unwrap_or(u64::MAX);
    if size > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::ValidationError {
            field: path.display().to_string(),
            message: format!(
                "config file is {size} bytes, exceeding the {MAX_CONFIG_FILE_SIZE} byte limit"
            ),
        });
    }

    toml::from_str(&content)
        .map(Some)
        .map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            source: e,
        })
}

/// Determine the user's home directory.
fn home_directory() -> ConfigResult<PathBuf> {
    directories::BaseDirs::new()
        .map(|d| d.home_dir().to_path_buf())
        .ok_or(ConfigError::NoHomeDir)
}
