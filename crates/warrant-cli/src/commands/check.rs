//! Check command - ask the rule file for a decision.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use warrant_config::Config;
use warrant_rights::{Permissions, open_backend};

use crate::config_bridge;
use crate::formatter::{OutputFormat, print_json};
use crate::theme::Theme;

/// Outcome of one authorization request.
#[derive(Debug, Serialize)]
pub(crate) struct Decision {
    /// Identity asked about; `None` for anonymous.
    pub(crate) user: Option<String>,
    /// Path as given on the command line.
    pub(crate) path: String,
    /// Rule file consulted.
    pub(crate) rules: String,
    pub(crate) requested: Permissions,
    pub(crate) granted: Permissions,
}

/// Evaluate one request against the configured rule file.
pub(crate) fn decide(
    cfg: &Config,
    rules: Option<&Path>,
    user: Option<&str>,
    path: &str,
    permissions: &str,
) -> Result<Decision> {
    let rights_path = config_bridge::rights_file(cfg, rules)?;
    let backend = open_backend(&rights_path, config_bridge::reload_policy(cfg)?);

    let requested = Permissions::parse(permissions);
    let granted = backend
        .authorized(user, path, &requested)
        .with_context(|| format!("cannot decide access to '{path}'"))?;

    Ok(Decision {
        user: user.map(str::to_owned),
        path: path.to_owned(),
        rules: rights_path.display().to_string(),
        requested,
        granted,
    })
}

/// Run `warrant check`.
pub(crate) fn run_check(
    cfg: &Config,
    rules: Option<&Path>,
    user: Option<&str>,
    path: &str,
    permissions: &str,
    format: OutputFormat,
) -> Result<()> {
    let decision = decide(cfg, rules, user, path, permissions)?;

    if format == OutputFormat::Json {
        return print_json(&decision);
    }

    let who = decision
        .user
        .as_deref()
        .filter(|u| !u.is_empty())
        .unwrap_or("anonymous");
    let granted = decision.granted.to_string();

    if decision.granted.is_empty() {
        println!(
            "{}",
            Theme::error(&format!("{who} holds none of the requested permissions on {path}"))
        );
    } else {
        println!("{}", Theme::success(&format!("{who} may access {path}")));
    }
    println!(
        "  granted: {}  {}",
        Theme::permissions(&granted),
        Theme::dimmed(&format!(
            "(requested {}, rules {})",
            decision.requested, decision.rules
        ))
    );
    Ok(())
}
