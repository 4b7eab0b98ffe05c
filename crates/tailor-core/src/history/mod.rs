//! Local version log
//!
//! The version log is the tool's own annotated history of the document: one
//! entry per successful update or revert, each pointing at the remote
//! revision it produced. It is persisted as a JSON array and rewritten
//! wholesale (atomically) on every append or patch.
//!
//! The store assumes a single writer. The advisory lock taken by
//! [`tailor_fs::io::write_atomic`] prevents torn files but not lost updates
//! between two concurrent read-modify-write cycles.

mod entry;

pub use entry::{JobTags, Selector, VersionLogEntry};

use tailor_fs::{NormalizedPath, RobustnessConfig, io};

use crate::{Error, Result};

/// Durable, append-only sequence of [`VersionLogEntry`].
#[derive(Debug, Clone)]
pub struct VersionLog {
    path: NormalizedPath,
    robustness: RobustnessConfig,
}

impl VersionLog {
    /// Open the log stored at `path`. The file need not exist yet.
    pub fn new(path: impl Into<NormalizedPath>) -> Self {
        Self {
            path: path.into(),
            robustness: RobustnessConfig::default(),
        }
    }

    pub fn path(&self) -> &NormalizedPath {
        &self.path
    }

    /// All entries in append order.
    ///
    /// A missing log reads as empty history. So does an unreadable or corrupt
    /// one: that case is logged as a warning, and the next append will
    /// replace the corrupt file.
    pub fn read(&self) -> Vec<VersionLogEntry> {
        let content = match io::read_text_if_exists(&self.path) {
            Ok(Some(content)) => content,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(path = %self.path, error = %e, "version log unreadable, treating as empty");
                return Vec::new();
            }
        };

        match serde_json::from_str(&content) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(path = %self.path, error = %e, "version log corrupt, treating as empty");
                Vec::new()
            }
        }
    }

    /// Append one entry and persist the whole sequence.
    ///
    /// Returns the index of the new entry.
    pub fn append(&self, entry: VersionLogEntry) -> Result<usize> {
        let mut entries = self.read();
        tracing::debug!(revision = %entry.revision_id, revert = entry.is_revert(), "appending log entry");
        entries.push(entry);
        self.persist(&entries)?;
        Ok(entries.len() - 1)
    }

    /// Resolve a selector to its position and entry.
    pub fn resolve(&self, selector: &Selector) -> Result<(usize, VersionLogEntry)> {
        let mut entries = self.read();
        let idx = selector
            .resolve_in(&entries)
            .ok_or_else(|| Error::NotFound {
                selector: selector.to_string(),
            })?;
        Ok((idx, entries.swap_remove(idx)))
    }

    /// Correct the denormalized job metadata of one entry.
    ///
    /// Only `company`, `job_title` and `job_url` can change; fields left as
    /// `None` in `patch` keep their current value. Returns the patched entry.
    pub fn patch(&self, selector: &Selector, patch: &JobTags) -> Result<VersionLogEntry> {
        let mut entries = self.read();
        let idx = selector
            .resolve_in(&entries)
            .ok_or_else(|| Error::NotFound {
                selector: selector.to_string(),
            })?;

        entries[idx].apply_tags(patch);
        self.persist(&entries)?;
        tracing::debug!(index = idx, revision = %entries[idx].revision_id, "patched log entry tags");
        Ok(entries.swap_remove(idx))
    }

    /// Entries matching `term` (case-insensitive), with their positions.
    pub fn search(&self, term: &str) -> Vec<(usize, VersionLogEntry)> {
        self.read()
            .into_iter()
            .enumerate()
            .filter(|(_, entry)| entry.matches(term))
            .collect()
    }

    fn persist(&self, entries: &[VersionLogEntry]) -> Result<()> {
        let content = serde_json::to_string_pretty(entries)?;
        io::write_atomic(&self.path, content.as_bytes(), self.robustness)?;
        Ok(())
    }
}
