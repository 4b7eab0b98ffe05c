//! Filesystem-backed document service
//!
//! Layout under the store root, one directory per document:
//!
//! ```text
//! <root>/<document_id>/body.txt            live text
//! <root>/<document_id>/revisions.json      ordered revision list
//! <root>/<document_id>/revisions/<id>.txt  snapshot per revision
//! ```

use async_trait::async_trait;
use chrono::Utc;
use tailor_fs::{ConfigStore, NormalizedPath, io};
use uuid::Uuid;

use super::{DocumentService, Revision, RevisionContent};
use crate::{Error, Result, ServiceErrorKind};

const MIME_TYPE: &str = "text/plain";

/// Document service that keeps documents and their revisions on disk.
///
/// Every successful mutation records a new revision with a full snapshot.
/// A revision whose snapshot file has gone missing is served as
/// [`RevisionContent::CurrentFallback`].
#[derive(Debug)]
pub struct LocalDocumentService {
    root: NormalizedPath,
    store: ConfigStore,
}

impl LocalDocumentService {
    pub fn new(root: impl Into<NormalizedPath>) -> Self {
        Self {
            root: root.into(),
            store: ConfigStore::new(),
        }
    }

    /// Create a document and record its baseline revision.
    pub fn create(&self, document_id: &str, text: &str) -> Result<Revision> {
        validate_id(document_id)?;
        if self.body_path(document_id).exists() {
            return Err(Error::document(
                ServiceErrorKind::Request,
                format!("document '{}' already exists", document_id),
            ));
        }
        let revision = self.commit(document_id, text)?;
        tracing::info!(document = document_id, revision = %revision.id, "created document baseline");
        Ok(revision)
    }

    fn doc_dir(&self, document_id: &str) -> NormalizedPath {
        self.root.join(document_id)
    }

    fn body_path(&self, document_id: &str) -> NormalizedPath {
        self.doc_dir(document_id).join("body.txt")
    }

    fn manifest_path(&self, document_id: &str) -> NormalizedPath {
        self.doc_dir(document_id).join("revisions.json")
    }

    fn snapshot_path(&self, document_id: &str, revision_id: &str) -> NormalizedPath {
        self.doc_dir(document_id)
            .join("revisions")
            .join(&format!("{}.txt", revision_id))
    }

    fn read_body(&self, document_id: &str) -> Result<String> {
        validate_id(document_id)?;
        io::read_text_if_exists(&self.body_path(document_id))?.ok_or_else(|| {
            Error::document(
                ServiceErrorKind::Request,
                format!("document '{}' not found", document_id),
            )
        })
    }

    fn read_revisions(&self, document_id: &str) -> Result<Vec<Revision>> {
        Ok(self
            .store
            .load_if_exists(&self.manifest_path(document_id))?
            .unwrap_or_default())
    }

    /// Record a revision for `text`, then make it the live body.
    ///
    /// The snapshot and manifest are written first. If the body write fails
    /// the previous manifest is restored, so no revision outlives a failed
    /// mutation and no mutation lands without one.
    fn commit(&self, document_id: &str, text: &str) -> Result<Revision> {
        let previous = self.read_revisions(document_id)?;
        let revision = Revision {
            id: Uuid::new_v4().to_string(),
            modified_time: Utc::now(),
            mime_type: MIME_TYPE.to_string(),
        };
        io::write_text(&self.snapshot_path(document_id, &revision.id), text)?;

        let mut revisions = previous.clone();
        revisions.push(revision.clone());
        self.store.save(&self.manifest_path(document_id), &revisions)?;

        if let Err(e) = io::write_text(&self.body_path(document_id), text) {
            if let Err(restore) = self.store.save(&self.manifest_path(document_id), &previous) {
                tracing::warn!(error = %restore, "could not restore revision list after failed write");
            }
            return Err(e.into());
        }
        Ok(revision)
    }
}

#[async_trait]
impl DocumentService for LocalDocumentService {
    async fn export_text(&self, document_id: &str) -> Result<String> {
        self.read_body(document_id)
    }

    async fn list_revisions(&self, document_id: &str) -> Result<Vec<Revision>> {
        self.read_body(document_id)?;
        self.read_revisions(document_id)
    }

    async fn get_revision_content(
        &self,
        document_id: &str,
        revision_id: &str,
    ) -> Result<RevisionContent> {
        let body = self.read_body(document_id)?;
        let known = self
            .read_revisions(document_id)?
            .iter()
            .any(|r| r.id == revision_id);
        if !known {
            return Err(Error::document(
                ServiceErrorKind::Request,
                format!("revision '{}' not found", revision_id),
            ));
        }

        match io::read_text_if_exists(&self.snapshot_path(document_id, revision_id))? {
            Some(text) => Ok(RevisionContent::Historical(text)),
            None => {
                tracing::warn!(revision = revision_id, "snapshot missing, serving current content");
                Ok(RevisionContent::CurrentFallback(body))
            }
        }
    }

    async fn apply_text_substitutions(
        &self,
        document_id: &str,
        pairs: &[(String, String)],
    ) -> Result<usize> {
        let mut body = self.read_body(document_id)?;
        let mut changed = 0;
        for (original, replacement) in pairs {
            if original.is_empty() {
                continue;
            }
            let count = body.matches(original.as_str()).count();
            if count > 0 {
                body = body.replace(original.as_str(), replacement);
                changed += count;
            }
        }

        let revision = self.commit(document_id, &body)?;
        tracing::debug!(revision = %revision.id, changed, "applied substitutions");
        Ok(changed)
    }

    async fn overwrite_body(&self, document_id: &str, text: &str) -> Result<()> {
        self.read_body(document_id)?;
        let revision = self.commit(document_id, text)?;
        tracing::debug!(revision = %revision.id, "overwrote document body");
        Ok(())
    }
}

fn validate_id(document_id: &str) -> Result<()> {
    let valid = !document_id.is_empty()
        && document_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        && !document_id.starts_with('.');
    if valid {
        Ok(())
    } else {
        Err(Error::document(
            ServiceErrorKind::Request,
            format!("invalid document id '{}'", document_id),
        ))
    }
}
