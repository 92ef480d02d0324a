//! Rules commands - inspect and validate the rule file.

use std::path::Path;

use anyhow::{Context, Result, bail};
use colored::Colorize;
use serde::Serialize;
use warrant_config::Config;
use warrant_rights::RuleSet;

use crate::config_bridge;
use crate::formatter::{OutputFormat, print_json};
use crate::theme::Theme;

#[derive(Debug, Serialize)]
struct RuleEntry<'a> {
    position: usize,
    name: &'a str,
    user: &'a str,
    collection: &'a str,
    permissions: &'a str,
}

#[derive(Debug, Serialize)]
struct ValidationReport {
    rules_file: String,
    rules: usize,
    problems: Vec<String>,
}

fn load(cfg: &Config, rules: Option<&Path>) -> Result<RuleSet> {
    let path = config_bridge::rights_file(cfg, rules)?;
    RuleSet::load(&path).with_context(|| format!("cannot load rules from {}", path.display()))
}

/// List rules in evaluation order.
pub(crate) fn list_rules(cfg: &Config, rules: Option<&Path>, format: OutputFormat) -> Result<()> {
    let rule_set = load(cfg, rules)?;

    let entries: Vec<RuleEntry<'_>> = rule_set
        .iter()
        .enumerate()
        .map(|(i, rule)| RuleEntry {
            position: i.saturating_add(1),
            name: rule.name(),
            user: rule.user_pattern(),
            collection: rule.collection_pattern(),
            permissions: rule.permissions(),
        })
        .collect();

    if format == OutputFormat::Json {
        return print_json(&entries);
    }

    if entries.is_empty() {
        println!(
            "{}",
            Theme::info(&format!("No rules in {}; every request is denied", rule_set.origin()))
        );
        return Ok(());
    }

    println!("\n{}", Theme::header(&format!("Rules in {}", rule_set.origin())));
    println!(
        "{:>4} {:<20} {:<20} {:<30} {}",
        "#".dimmed(),
        "NAME".dimmed(),
        "USER".dimmed(),
        "COLLECTION".dimmed(),
        "PERMS".dimmed()
    );
    println!("{}", Theme::separator());

    for entry in &entries {
        println!(
            "{:>4} {:<20} {:<20} {:<30} {}",
            entry.position,
            entry.name.bold(),
            entry.user,
            entry.collection,
            Theme::permissions(entry.permissions)
        );
    }

    println!();
    Ok(())
}

fn validate(cfg: &Config, rules: Option<&Path>) -> Result<ValidationReport> {
    let rule_set = load(cfg, rules)?;
    let problems = rule_set
        .check()
        .into_iter()
        .map(|err| err.to_string())
        .collect();

    Ok(ValidationReport {
        rules_file: rule_set.origin().to_owned(),
        rules: rule_set.len(),
        problems,
    })
}

/// Load the rule file and check every rule's patterns.
pub(crate) fn validate_rules(
    cfg: &Config,
    rules: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let report = validate(cfg, rules)?;

    if format == OutputFormat::Json {
        print_json(&report)?;
    } else if report.problems.is_empty() {
        println!(
            "{}",
            Theme::success(&format!(
                "{} rule(s) in {} are valid",
                report.rules, report.rules_file
            ))
        );
    } else {
        for problem in &report.problems {
            println!("{}", Theme::error(problem));
        }
    }

    if !report.problems.is_empty() {
        bail!(
            "{} of {} rule(s) in {} cannot be evaluated",
            report.problems.len(),
            report.rules,
            report.rules_file
        );
    }
    Ok(())
}
