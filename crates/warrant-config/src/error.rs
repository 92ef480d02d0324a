use std::io;
use thiserror::Error;

/// Why the configuration could not be produced.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A config file exists but could not be read, or a file named on the
    /// command line is missing.
    #[error("cannot read config file {path}: {source}")]
    ReadError {
        /// File that was being read.
        path: String,
        /// What the filesystem reported.
        #[source]
        source: io::Error,
    },

    /// A layer is not valid TOML, or the merged tree does not fit [`Config`](crate::Config).
    #[error("invalid TOML in {path}: {source}")]
    ParseError {
        /// File that was parsed, or a `<...>` label for built-in sources.
        path: String,
        /// Parser diagnostic, including the location.
        #[source]
        source: toml::de::Error,
    },

    /// A value parsed but is outside what the service accepts.
    #[error("config field '{field}' is invalid: {message}")]
    ValidationError {
        /// Dotted field path, or the file path for file-level limits.
        field: String,
        /// What is wrong and what would be accepted.
        message: String,
    },

    /// The user layer needs a home directory and none could be found.
    #[error("no home directory; pass an explicit config home")]
    NoHomeDir,
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
