//! List, tag and search commands over the version log

use colored::Colorize;
use serde_json::json;
use tailor_core::JobTags;
use tailor_core::reconcile;

use super::{entry_line, parse_selector};
use crate::context::Context;
use crate::error::{CliError, Result};

/// Print every log entry followed by desync warnings.
///
/// The revision check is advisory: when it cannot run, the local log is
/// still listed and the failure becomes a warning.
pub async fn run_list(ctx: &Context, json: bool) -> Result<()> {
    let entries = ctx.log.read();
    let (desync, unchecked) =
        match reconcile::check(&ctx.service, ctx.document_id(), &ctx.log).await {
            Ok(report) => (Some(report), None),
            Err(e) => {
                tracing::warn!(error = %e, "revision check failed");
                (None, Some(format!("revisions could not be checked: {}", e)))
            }
        };

    if json {
        let entries: Vec<_> = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| json!({ "index": index, "entry": entry }))
            .collect();
        let output = json!({ "entries": entries, "desync": desync });
        println!("{}", serde_json::to_string_pretty(&output)?);
        if let Some(warning) = unchecked {
            eprintln!("{} {}", "warning:".yellow().bold(), warning);
        }
        return Ok(());
    }

    if entries.is_empty() {
        println!("{}", "No log entries yet.".dimmed());
    }
    for (index, entry) in entries.iter().enumerate() {
        println!("{}", entry_line(index, entry));
        for change in &entry.changes {
            println!("       {}", change.dimmed());
        }
    }

    let warnings = desync.map(|d| d.warnings()).unwrap_or_default();
    for warning in warnings.into_iter().chain(unchecked) {
        println!("{} {}", "warning:".yellow().bold(), warning);
    }
    Ok(())
}

/// Correct job metadata on one entry.
pub fn run_tag(ctx: &Context, target: &str, tags: JobTags) -> Result<()> {
    if tags.is_empty() {
        return Err(CliError::user(
            "nothing to change: pass --company, --title or --url",
        ));
    }

    let selector = parse_selector(target);
    let (index, _) = ctx.log.resolve(&selector)?;
    let entry = ctx.log.patch(&selector, &tags)?;

    println!("{} Updated entry", "OK".green().bold());
    println!("{}", entry_line(index, &entry));
    Ok(())
}

/// Print entries matching `term`.
pub fn run_search(ctx: &Context, term: &str) -> Result<()> {
    let hits = ctx.log.search(term);
    if hits.is_empty() {
        println!("{} '{}'", "No entries match".dimmed(), term);
        return Ok(());
    }
    for (index, entry) in &hits {
        println!("{}", entry_line(*index, entry));
    }
    println!("{} {} match(es)", "Total:".dimmed(), hits.len());
    Ok(())
}
