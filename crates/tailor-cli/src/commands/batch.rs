//! Batch command implementation

use std::path::{Path, PathBuf};

use colored::Colorize;
use serde::Deserialize;
use tailor_core::{JobTags, UpdateCoordinator, UpdateRequest};

use crate::commands::update::{print_outcome, read_job_description};
use crate::context::Context;
use crate::error::{CliError, Result};

/// One item of a batch file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchSpec {
    /// Job description file, relative to the batch file
    job_file: Option<PathBuf>,
    /// Inline job description
    description: Option<String>,
    company: Option<String>,
    job_title: Option<String>,
    job_url: Option<String>,
}

impl BatchSpec {
    fn into_request(self, base: &Path) -> Result<UpdateRequest> {
        let description = match (self.description, self.job_file) {
            (Some(text), None) => text,
            (None, Some(file)) => read_job_description(&base.join(file))?,
            (Some(_), Some(_)) => {
                return Err(CliError::user(
                    "batch item has both `description` and `jobFile`",
                ));
            }
            (None, None) => {
                return Err(CliError::user(
                    "batch item needs `description` or `jobFile`",
                ));
            }
        };
        let tags = JobTags::new(self.company, self.job_title, self.job_url);
        Ok(UpdateRequest::new(description, tags))
    }
}

fn load_requests(file: &Path) -> Result<Vec<UpdateRequest>> {
    let content = std::fs::read_to_string(file)
        .map_err(|e| CliError::user(format!("cannot read {}: {}", file.display(), e)))?;
    let specs: Vec<BatchSpec> = serde_json::from_str(&content)?;
    let base = file.parent().unwrap_or(Path::new("."));

    specs
        .into_iter()
        .enumerate()
        .map(|(n, spec)| {
            spec.into_request(base)
                .map_err(|e| CliError::user(format!("batch item {}: {}", n, e)))
        })
        .collect()
}

/// Run every item of a batch file, one full cycle at a time.
pub async fn run_batch(ctx: &Context, file: &Path) -> Result<()> {
    let requests = load_requests(file)?;
    let generator = ctx.generator()?;

    let coordinator = UpdateCoordinator::new(&ctx.service, &generator, &ctx.log, ctx.document_id())
        .with_validator(ctx.settings.validator())
        .with_max_attempts(ctx.settings.generator.max_attempts);

    let report = coordinator.run_batch(&requests).await;

    for item in &report.items {
        match &item.result {
            Ok(outcome) => print_outcome(&item.label, outcome),
            Err(e) => println!("{} {}: {}", "FAILED".red().bold(), item.label.bold(), e),
        }
    }
    println!(
        "{} {} succeeded, {} failed",
        "Batch:".bold(),
        report.succeeded().to_string().green(),
        report.failed().to_string().red()
    );

    report.ensure_any_succeeded()?;
    Ok(())
}
