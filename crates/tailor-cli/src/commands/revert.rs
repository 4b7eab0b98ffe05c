//! Revert and export commands

use std::path::Path;

use colored::Colorize;
use tailor_core::{DocumentService, RevertCoordinator};

use super::parse_selector;
use crate::context::Context;
use crate::error::Result;

/// Restore the document to a logged revision.
pub async fn run_revert(ctx: &Context, target: &str) -> Result<()> {
    let selector = parse_selector(target);
    let outcome = RevertCoordinator::new(&ctx.service, &ctx.log, ctx.document_id())
        .revert(&selector)
        .await?;

    for warning in &outcome.warnings {
        eprintln!("{} {}", "warning:".yellow().bold(), warning);
    }
    println!(
        "{} Reverted to entry {} (revision {}); new revision {}, log entry {}",
        "OK".green().bold(),
        outcome.target_index,
        outcome.target_revision_id.dimmed(),
        outcome.new_revision_id.dimmed(),
        outcome.entry_index
    );
    Ok(())
}

/// Write a logged revision's text to `output`, or stdout.
pub async fn run_export(ctx: &Context, target: &str, output: Option<&Path>) -> Result<()> {
    let (_, entry) = ctx.log.resolve(&parse_selector(target))?;
    let content = ctx
        .service
        .get_revision_content(ctx.document_id(), &entry.revision_id)
        .await?;

    if content.is_fallback() {
        eprintln!(
            "{} revision {} is unavailable; exporting current content instead",
            "warning:".yellow().bold(),
            entry.revision_id
        );
    }

    match output {
        Some(path) => {
            tailor_fs::io::write_text(&path.into(), content.text())?;
            eprintln!(
                "{} Exported revision {} to {}",
                "OK".green().bold(),
                entry.revision_id.dimmed(),
                path.display()
            );
        }
        None => print!("{}", content.text()),
    }
    Ok(())
}
