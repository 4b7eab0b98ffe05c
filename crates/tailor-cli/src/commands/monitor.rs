//! Monitor command implementation

use std::path::Path;
use std::sync::Arc;

use colored::Colorize;
use serde::Deserialize;
use tailor_core::{
    JobQueueEntry, Liveness, TcpProbe, UpdateCoordinator, discover, process_queue,
};

use crate::commands::update::print_outcome;
use crate::context::Context;
use crate::error::{CliError, Result};

/// One posting in a discovery feed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeedItem {
    company: String,
    url: String,
    job_title: String,
}

fn load_feed(path: &Path) -> Result<Vec<JobQueueEntry>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| CliError::user(format!("cannot read {}: {}", path.display(), e)))?;
    let items: Vec<FeedItem> = serde_json::from_str(&content)?;
    Ok(items
        .into_iter()
        .map(|item| JobQueueEntry::new(item.company, item.url, item.job_title))
        .collect())
}

/// Merge a discovery feed into the queue and optionally process the queue.
///
/// Without a feed or `--process` this only prints the queue.
pub async fn run_monitor(ctx: &Context, feed: Option<&Path>, process: bool) -> Result<()> {
    let queue = ctx.queue();

    if let Some(feed) = feed {
        let discovered = load_feed(feed)?;
        let report = discover(
            &queue,
            discovered,
            Arc::new(TcpProbe),
            ctx.settings.probe_config(),
        )
        .await?;

        for result in &report.probed {
            let status = match result.liveness {
                Liveness::Live => "live".green(),
                Liveness::Dead => "dead".red(),
                Liveness::TimedOut => "timed out".yellow(),
            };
            println!("   {:<10} {}", status, result.url);
        }
        println!(
            "{} {} new posting(s) queued",
            "=>".blue().bold(),
            report.added
        );
    }

    if process {
        let generator = ctx.generator()?;
        let source = ctx.job_source()?;
        let coordinator =
            UpdateCoordinator::new(&ctx.service, &generator, &ctx.log, ctx.document_id())
                .with_validator(ctx.settings.validator())
                .with_max_attempts(ctx.settings.generator.max_attempts);

        let report = process_queue(&coordinator, &queue, &source).await;
        for item in &report.items {
            match &item.result {
                Ok(outcome) => print_outcome(&item.label, outcome),
                Err(e) => println!("{} {}: {}", "FAILED".red().bold(), item.label.bold(), e),
            }
        }
        println!(
            "{} {} processed, {} left queued",
            "Queue:".bold(),
            report.succeeded().to_string().green(),
            report.failed().to_string().yellow()
        );
        report.ensure_any_succeeded()?;
        return Ok(());
    }

    if feed.is_none() {
        let entries = queue.read();
        if entries.is_empty() {
            println!("{}", "Queue is empty.".dimmed());
        }
        for entry in entries {
            println!(
                "   {} at {}  {}",
                entry.job_title.cyan(),
                entry.company,
                entry.url.dimmed()
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tailor_test_utils::TestProject;

    #[test]
    fn feed_items_become_queue_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feed.json");
        std::fs::write(
            &path,
            r#"[{"company": "Acme", "url": "https://acme.test/1", "jobTitle": "Engineer"}]"#,
        )
        .unwrap();

        let entries = load_feed(&path).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].company, "Acme");
        assert_eq!(entries[0].job_title, "Engineer");
    }

    #[tokio::test]
    async fn dead_postings_are_not_queued() {
        let project = TestProject::new().init("Jane Doe");
        let ctx = Context::load(project.root(), None).unwrap();
        project.write_file(
            "feed.json",
            r#"[{"company": "Acme", "url": "ftp://acme.test/1", "jobTitle": "Engineer"}]"#,
        );

        run_monitor(&ctx, Some(&project.root().join("feed.json")), false)
            .await
            .unwrap();

        assert!(ctx.queue().read().is_empty());
    }

    #[tokio::test]
    async fn process_without_describe_command_is_a_config_error() {
        let project = TestProject::new()
            .with_generator(&["true"])
            .init("Jane Doe");
        let ctx = Context::load(project.root(), None).unwrap();

        let err = run_monitor(&ctx, None, true).await.unwrap_err();
        assert!(err.to_string().contains("describe_command"));
    }
}
