//! Document service collaborator
//!
//! The document service owns the authoritative document and its immutable
//! revision sequence. The core only talks to it through [`DocumentService`];
//! [`LocalDocumentService`] is a filesystem-backed implementation.

mod local;

pub use local::LocalDocumentService;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, ServiceErrorKind};

/// An immutable, service-assigned snapshot of the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Revision {
    pub id: String,
    pub modified_time: DateTime<Utc>,
    pub mime_type: String,
}

/// Document text as of some revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevisionContent {
    /// The text the revision actually captured
    Historical(String),
    /// The service cannot serve this revision's content, so this is the
    /// current live text instead
    CurrentFallback(String),
}

impl RevisionContent {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::CurrentFallback(_))
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Historical(text) | Self::CurrentFallback(text) => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Self::Historical(text) | Self::CurrentFallback(text) => text,
        }
    }
}

/// Capability interface of the external document service.
#[async_trait]
pub trait DocumentService: Send + Sync {
    /// Full plain text of the live document.
    async fn export_text(&self, document_id: &str) -> Result<String>;

    /// Every revision, oldest first. The last one is current.
    async fn list_revisions(&self, document_id: &str) -> Result<Vec<Revision>>;

    /// Document text as of `revision_id`, best-effort.
    async fn get_revision_content(
        &self,
        document_id: &str,
        revision_id: &str,
    ) -> Result<RevisionContent>;

    /// Replace every occurrence of each `original` with its replacement in one
    /// atomic, formatting-preserving batch. Returns occurrences changed.
    async fn apply_text_substitutions(
        &self,
        document_id: &str,
        pairs: &[(String, String)],
    ) -> Result<usize>;

    /// Replace the whole body. Discards formatting; used only by revert.
    async fn overwrite_body(&self, document_id: &str, text: &str) -> Result<()>;

    /// The current revision.
    async fn latest_revision(&self, document_id: &str) -> Result<Revision> {
        self.list_revisions(document_id)
            .await?
            .pop()
            .ok_or_else(|| {
                Error::document(
                    ServiceErrorKind::Request,
                    format!("document '{}' has no revisions", document_id),
                )
            })
    }
}
