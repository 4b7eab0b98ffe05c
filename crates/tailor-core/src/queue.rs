//! Queue of discovered, not yet processed job postings
//!
//! Same persistence discipline as the version log: a JSON array rewritten
//! atomically on every change. Entries are unique by `url`. The queue only
//! grows through [`JobQueue::merge`] and only shrinks through
//! [`JobQueue::consume`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tailor_fs::{NormalizedPath, RobustnessConfig, io};

use crate::Result;
use crate::history::JobTags;

/// A discovered posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobQueueEntry {
    pub company: String,
    pub url: String,
    pub job_title: String,
    pub discovered_at: DateTime<Utc>,
}

impl JobQueueEntry {
    pub fn new(
        company: impl Into<String>,
        url: impl Into<String>,
        job_title: impl Into<String>,
    ) -> Self {
        Self {
            company: company.into(),
            url: url.into(),
            job_title: job_title.into(),
            discovered_at: Utc::now(),
        }
    }

    /// Log entry tags for an update driven by this posting.
    pub fn tags(&self) -> JobTags {
        JobTags::new(
            Some(self.company.clone()),
            Some(self.job_title.clone()),
            Some(self.url.clone()),
        )
    }
}

#[derive(Debug, Clone)]
pub struct JobQueue {
    path: NormalizedPath,
    robustness: RobustnessConfig,
}

impl JobQueue {
    pub fn new(path: impl Into<NormalizedPath>) -> Self {
        Self {
            path: path.into(),
            robustness: RobustnessConfig::default(),
        }
    }

    /// Queued postings in discovery order. Missing or corrupt reads as empty.
    pub fn read(&self) -> Vec<JobQueueEntry> {
        match io::read_text_if_exists(&self.path) {
            Ok(Some(content)) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!(path = %self.path, error = %e, "job queue corrupt, treating as empty");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(path = %self.path, error = %e, "job queue unreadable, treating as empty");
                Vec::new()
            }
        }
    }

    /// Append postings whose URL is not queued yet. Returns how many were added.
    pub fn merge(&self, discovered: Vec<JobQueueEntry>) -> Result<usize> {
        let mut entries = self.read();
        let mut known: HashSet<String> = entries.iter().map(|e| e.url.clone()).collect();

        let before = entries.len();
        for entry in discovered {
            if known.insert(entry.url.clone()) {
                entries.push(entry);
            }
        }

        let added = entries.len() - before;
        if added > 0 {
            self.persist(&entries)?;
        }
        tracing::debug!(added, total = entries.len(), "merged job queue");
        Ok(added)
    }

    /// Remove the posting with `url`. Returns whether one was removed.
    pub fn consume(&self, url: &str) -> Result<bool> {
        let mut entries = self.read();
        let before = entries.len();
        entries.retain(|e| e.url != url);
        if entries.len() == before {
            return Ok(false);
        }
        self.persist(&entries)?;
        Ok(true)
    }

    fn persist(&self, entries: &[JobQueueEntry]) -> Result<()> {
        let content = serde_json::to_string_pretty(entries)?;
        io::write_atomic(&self.path, content.as_bytes(), self.robustness)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_deduplicates_by_url() {
        let dir = tempfile::tempdir().unwrap();
        let queue = JobQueue::new(dir.path().join("queue.json"));

        let added = queue
            .merge(vec![
                JobQueueEntry::new("Acme", "https://acme.test/jobs/1", "Engineer"),
                JobQueueEntry::new("Acme", "https://acme.test/jobs/1", "Engineer II"),
            ])
            .unwrap();
        assert_eq!(added, 1);

        let added = queue
            .merge(vec![
                JobQueueEntry::new("Acme", "https://acme.test/jobs/1", "Engineer"),
                JobQueueEntry::new("Globex", "https://globex.test/careers/7", "SRE"),
            ])
            .unwrap();
        assert_eq!(added, 1);

        let urls: Vec<String> = queue.read().into_iter().map(|e| e.url).collect();
        assert_eq!(
            urls,
            vec!["https://acme.test/jobs/1", "https://globex.test/careers/7"]
        );
    }

    #[test]
    fn consume_removes_only_named_url() {
        let dir = tempfile::tempdir().unwrap();
        let queue = JobQueue::new(dir.path().join("queue.json"));
        queue
            .merge(vec![
                JobQueueEntry::new("Acme", "https://acme.test/1", "A"),
                JobQueueEntry::new("Acme", "https://acme.test/2", "B"),
            ])
            .unwrap();

        assert!(queue.consume("https://acme.test/1").unwrap());
        assert!(!queue.consume("https://acme.test/1").unwrap());
        assert_eq!(queue.read().len(), 1);
    }
}
