//! Warrant CLI - query and inspect regex rule files.
//!
//! Loads the layered configuration, sets up logging from it, then asks the
//! configured rule file for decisions or reports on its content.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;
use warrant_config::Config;

mod commands;
pub mod config_bridge;
mod formatter;
mod theme;

use commands::{check, config, rules};
use formatter::OutputFormat;

/// Warrant - regex rule-file authorization
#[derive(Parser)]
#[command(name = "warrant")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format: pretty (default) or json
    #[arg(long, global = true, default_value = "pretty")]
    format: String,

    /// Configuration file applied over the system and user files
    #[arg(short, long, global = true, value_name = "FILE", env = "WARRANT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show which of the requested permissions a user holds on a path
    Check {
        /// Collection path, e.g. /alice/calendar/
        path: String,

        /// User to check; omit for an anonymous request
        #[arg(short, long)]
        user: Option<String>,

        /// Requested permission symbols
        #[arg(short, long, default_value = "rw")]
        permissions: String,

        /// Rule file to use instead of the configured one
        #[arg(long, value_name = "FILE")]
        rules: Option<PathBuf>,
    },

    /// Inspect the rule file
    Rules {
        #[command(subcommand)]
        command: RulesCommands,
    },

    /// View and validate configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum RulesCommands {
    /// List rules in evaluation order
    List {
        /// Rule file to use instead of the configured one
        #[arg(long, value_name = "FILE")]
        rules: Option<PathBuf>,
    },
    /// Load the rule file and check every rule's patterns
    Validate {
        /// Rule file to use instead of the configured one
        #[arg(long, value_name = "FILE")]
        rules: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the resolved configuration and where each value came from
    Show {
        /// Only show one section (e.g. "rights")
        #[arg(long)]
        section: Option<String>,
    },
    /// Load the configuration and report errors
    Validate,
    /// List the configuration files that are consulted
    Paths,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let explicit = cli.config.as_deref();

    let loaded = Config::load(explicit);

    // Set up logging from config, with --verbose override.
    let logging = match &loaded {
        Ok(resolved) => {
            let mut lc = config_bridge::to_log_config(&resolved.config);
            if cli.verbose {
                "debug".clone_into(&mut lc.level);
            }
            warrant_telemetry::setup_logging(&lc)
        },
        Err(_) if cli.verbose => {
            warrant_telemetry::setup_logging(&warrant_telemetry::LogConfig::new("debug"))
        },
        Err(_) => warrant_telemetry::setup_default_logging(),
    };
    if let Err(e) = logging {
        eprintln!("Failed to initialize logging: {e}");
    }

    if let Ok(resolved) = &loaded {
        debug!(
            rights_file = resolved.config.rights.file.as_deref().unwrap_or("<unset>"),
            reload = %resolved.config.rights.reload,
            "configuration loaded"
        );
    }

    let format = OutputFormat::from_flag(&cli.format);

    match cli.command {
        Commands::Check {
            path,
            user,
            permissions,
            rules,
        } => {
            let resolved = loaded?;
            check::run_check(
                &resolved.config,
                rules.as_deref(),
                user.as_deref(),
                &path,
                &permissions,
                format,
            )?;
        },
        Commands::Rules { command } => {
            let resolved = loaded?;
            match command {
                RulesCommands::List { rules } => {
                    rules::list_rules(&resolved.config, rules.as_deref(), format)?;
                },
                RulesCommands::Validate { rules } => {
                    rules::validate_rules(&resolved.config, rules.as_deref(), format)?;
                },
            }
        },
        Commands::Config { command } => match command {
            ConfigCommands::Show { section } => {
                config::show_config(&loaded?, format, section.as_deref())?;
            },
            ConfigCommands::Validate => config::validate_config(loaded)?,
            ConfigCommands::Paths => config::show_paths(explicit)?,
        },
    }

    Ok(())
}
