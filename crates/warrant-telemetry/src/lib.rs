//! Warrant Telemetry - logging setup for the Warrant rights service.
//!
//! Library crates in the workspace only emit `tracing` events; this crate
//! installs the subscriber that formats and writes them.
//!
//! # Example
//!
//! ```rust,no_run
//! use warrant_telemetry::{LogConfig, LogFormat, setup_logging};
//!
//! # fn main() -> Result<(), warrant_telemetry::TelemetryError> {
//! let config = LogConfig::new("info")
//!     .with_format(LogFormat::Compact)
//!     .with_directive("warrant_rights=debug");
//!
//! setup_logging(&config)?;
//! tracing::info!("ready");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod error;
mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{
    FileLogConfig, FileRotation, LogConfig, LogFormat, LogTarget, setup_default_logging,
    setup_logging,
};
