//! Update command implementation

use std::path::Path;

use colored::Colorize;
use tailor_core::{JobTags, UpdateCoordinator, UpdateOutcome, UpdateRequest};

use crate::context::Context;
use crate::error::{CliError, Result};

pub(crate) fn read_job_description(path: &Path) -> Result<String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::user(format!("cannot read {}: {}", path.display(), e)))?;
    if text.trim().is_empty() {
        return Err(CliError::user(format!(
            "job description {} is empty",
            path.display()
        )));
    }
    Ok(text)
}

/// Run one update cycle for the job description in `job`.
pub async fn run_update(ctx: &Context, job: &Path, tags: JobTags, dry_run: bool) -> Result<()> {
    let description = read_job_description(job)?;
    let generator = ctx.generator()?;

    let coordinator = UpdateCoordinator::new(&ctx.service, &generator, &ctx.log, ctx.document_id())
        .with_validator(ctx.settings.validator())
        .with_max_attempts(ctx.settings.generator.max_attempts);

    let request = UpdateRequest::new(description, tags).dry_run(dry_run);
    let outcome = coordinator.run(&request).await?;

    print_outcome(&request.label(), &outcome);
    Ok(())
}

pub(crate) fn print_outcome(label: &str, outcome: &UpdateOutcome) {
    println!("{} {}", "=>".blue().bold(), label.bold());

    for line in &outcome.summary {
        println!("   {}", line);
    }
    for accepted in &outcome.validation.accepted {
        println!("   {} {}", "+".green(), accepted.describe());
    }
    for rejection in &outcome.validation.rejected {
        println!(
            "   {} {} ({})",
            "-".yellow(),
            rejection.candidate.describe(),
            rejection.reason.to_string().dimmed()
        );
    }

    match &outcome.applied {
        Some(applied) => println!(
            "   {} {} occurrence(s) changed, revision {}, log entry {}",
            "OK".green().bold(),
            applied.occurrences,
            applied.revision_id.dimmed(),
            applied.entry_index
        ),
        None => println!("   {} no changes applied", "dry run:".yellow().bold()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_job_description_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.txt");
        std::fs::write(&path, "  \n").unwrap();

        let err = read_job_description(&path).unwrap_err();
        assert!(err.to_string().contains("is empty"));
    }

    #[test]
    fn job_description_is_read_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.txt");
        std::fs::write(&path, "Rust, Kubernetes\n").unwrap();

        assert_eq!(read_job_description(&path).unwrap(), "Rust, Kubernetes\n");
    }
}
