#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
//! Layered configuration for the Warrant rights service.
//!
//! # Usage
//!
//! ```rust,no_run
//! use warrant_config::Config;
//!
//! // defaults → system → user → explicit file → env fallbacks
//! let resolved = Config::load(None).unwrap();
//! println!("rights file: {:?}", resolved.config.rights.file);
//! ```
//!
//! # Configuration Precedence
//!
//! From highest to lowest priority:
//!
//! 1. **Explicit** (`--config FILE`), which must exist
//! 2. **User** (`~/.warrant/config.toml`)
//! 3. **System** (`/etc/warrant/config.toml`)
//! 4. **Environment variables** (`WARRANT_*`), only for fields no file set
//! 5. **Embedded defaults** (`defaults.toml` compiled into binary)
//!
//! This crate does not depend on the other warrant crates; the CLI converts
//! these plain values into rights and telemetry types.

/// Environment variable fallback resolution.
pub mod env;
/// Configuration error types.
pub mod error;
/// Configuration file discovery and loading.
pub mod loader;
/// Layered configuration merging with source tracking.
pub mod merge;
/// Resolved configuration display.
pub mod show;
/// Configuration struct definitions.
pub mod types;
/// Configuration validation rules.
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigPaths;
pub use merge::{ConfigLayer, FieldSources};
pub use show::{ResolvedConfig, ShowFormat};
pub use types::*;

impl Config {
    /// Load configuration with the full precedence chain.
    ///
    /// See [`loader::load`] for the algorithm.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any config file is malformed, the
    /// explicit file is missing, or the final configuration fails validation.
    pub fn load(explicit: Option<&std::path::Path>) -> ConfigResult<ResolvedConfig> {
        loader::load(explicit, None)
    }

    /// Load configuration with `home_dir` standing in for `~/.warrant`.
    ///
    /// # Errors
    ///
    /// Same as [`Config::load`].
    pub fn load_with_home(
        explicit: Option<&std::path::Path>,
        home_dir: &std::path::Path,
    ) -> ConfigResult<ResolvedConfig> {
        loader::load(explicit, Some(home_dir))
    }

    /// Load configuration from a single file (no layering).
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read, parsed, or fails
    /// validation.
    pub fn load_file(path: &std::path::Path) -> ConfigResult<Self> {
        loader::load_file(path)
    }
}
