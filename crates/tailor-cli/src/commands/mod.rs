//! Command implementations for tailor-cli

pub mod batch;
pub mod history;
pub mod init;
pub mod monitor;
pub mod revert;
pub mod update;

pub use batch::run_batch;
pub use history::{run_list, run_search, run_tag};
pub use init::run_init;
pub use monitor::run_monitor;
pub use revert::{run_export, run_revert};
pub use update::run_update;

use colored::Colorize;
use tailor_core::{JobTags, Selector, VersionLogEntry};

use crate::cli::TagArgs;

impl From<TagArgs> for JobTags {
    fn from(args: TagArgs) -> Self {
        JobTags::new(args.company, args.title, args.url)
    }
}

fn parse_selector(token: &str) -> Selector {
    match token.parse() {
        Ok(selector) => selector,
        Err(never) => match never {},
    }
}

/// One-line rendering of a log entry.
fn entry_line(index: usize, entry: &VersionLogEntry) -> String {
    let mut line = format!(
        "{:>3}  {}  {}",
        index,
        entry.timestamp.format("%Y-%m-%d %H:%M"),
        entry.revision_id.dimmed()
    );
    if entry.is_revert() {
        line.push_str(&format!("  {}", "[revert]".magenta()));
    }
    let job = match (&entry.job_title, &entry.company) {
        (Some(title), Some(company)) => format!("{} at {}", title, company),
        (Some(title), None) => title.clone(),
        (None, Some(company)) => company.clone(),
        (None, None) => String::new(),
    };
    if !job.is_empty() {
        line.push_str(&format!("  {}", job.cyan()));
    }
    line
}
