//! Version log entry and selector types

use std::convert::Infallible;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Human-facing job metadata denormalized onto a log entry.
///
/// Also used as the partial-update payload of [`super::VersionLog::patch`],
/// where `None` means "leave unchanged".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobTags {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_url: Option<String>,
}

impl JobTags {
    pub fn new(
        company: Option<String>,
        job_title: Option<String>,
        job_url: Option<String>,
    ) -> Self {
        Self {
            company,
            job_title,
            job_url,
        }
    }

    /// True if no field is set.
    pub fn is_empty(&self) -> bool {
        self.company.is_none() && self.job_title.is_none() && self.job_url.is_none()
    }
}

/// One tool-driven update or revert of the document.
///
/// Entries are append-only. Only the [`JobTags`] fields may be corrected
/// after the fact; `is_revert` is fixed at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionLogEntry {
    /// Remote revision this entry produced (a reference, not owned)
    pub revision_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_url: Option<String>,
    /// Ordered, human-readable description of what changed
    #[serde(default)]
    pub changes: Vec<String>,
    #[serde(default)]
    is_revert: bool,
}

impl VersionLogEntry {
    /// Entry for an ordinary update cycle.
    pub fn update(revision_id: impl Into<String>, tags: JobTags, changes: Vec<String>) -> Self {
        Self {
            revision_id: revision_id.into(),
            timestamp: Utc::now(),
            job_title: tags.job_title,
            company: tags.company,
            job_url: tags.job_url,
            changes,
            is_revert: false,
        }
    }

    /// Entry recording a restoration of `target_revision_id`.
    pub fn revert(revision_id: impl Into<String>, target_revision_id: &str) -> Self {
        Self {
            revision_id: revision_id.into(),
            timestamp: Utc::now(),
            job_title: None,
            company: None,
            job_url: None,
            changes: vec![format!("Reverted to revision {}", target_revision_id)],
            is_revert: true,
        }
    }

    /// Override the timestamp (fixtures and imports).
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn is_revert(&self) -> bool {
        self.is_revert
    }

    /// Overwrite the tag fields present in `patch`.
    pub(crate) fn apply_tags(&mut self, patch: &JobTags) {
        if let Some(company) = &patch.company {
            self.company = Some(company.clone());
        }
        if let Some(job_title) = &patch.job_title {
            self.job_title = Some(job_title.clone());
        }
        if let Some(job_url) = &patch.job_url {
            self.job_url = Some(job_url.clone());
        }
    }

    /// Case-insensitive match against metadata, revision id, and changes.
    pub fn matches(&self, term: &str) -> bool {
        let needle = term.to_lowercase();
        let hit = |s: &str| s.to_lowercase().contains(&needle);

        hit(&self.revision_id)
            || self.company.as_deref().is_some_and(hit)
            || self.job_title.as_deref().is_some_and(hit)
            || self.job_url.as_deref().is_some_and(hit)
            || self.changes.iter().any(|c| hit(c))
    }
}

/// How a caller names a log entry: by 0-based position or by revision id.
///
/// Tokens made only of ASCII digits are treated as indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Index(usize),
    RevisionId(String),
}

impl Selector {
    /// Position of the selected entry within `entries`.
    pub fn resolve_in(&self, entries: &[VersionLogEntry]) -> Option<usize> {
        match self {
            Self::Index(idx) => (*idx < entries.len()).then_some(*idx),
            Self::RevisionId(id) => entries.iter().position(|e| &e.revision_id == id),
        }
    }
}

impl FromStr for Selector {
    type Err = Infallible;

    fn from_str(token: &str) -> std::result::Result<Self, Self::Err> {
        let token = token.trim();
        if !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(idx) = token.parse() {
                return Ok(Self::Index(idx));
            }
        }
        Ok(Self::RevisionId(token.to_string()))
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Index(idx) => write!(f, "{}", idx),
            Self::RevisionId(id) => write!(f, "{}", id),
        }
    }
}
