//! Desync detection between the version log and the remote revisions
//!
//! Reconciliation is advisory. It reports divergence and never repairs it:
//! an entry whose revision has vanished upstream stays in the log.

use std::collections::HashSet;

use serde::Serialize;

use crate::Result;
use crate::history::{VersionLog, VersionLogEntry};
use crate::service::{DocumentService, Revision};

/// Divergence between local entries and remote revisions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DesyncReport {
    /// Local revision ids with no remote revision, in log order
    pub extra: Vec<String>,
    /// Remote revisions after the baseline with no local entry, oldest first
    pub missing: Vec<Revision>,
}

impl DesyncReport {
    pub fn is_in_sync(&self) -> bool {
        self.extra.is_empty() && self.missing.is_empty()
    }

    /// One human-readable warning per divergent revision.
    pub fn warnings(&self) -> Vec<String> {
        let extra = self.extra.iter().map(|id| {
            format!(
                "log entry references revision {} which no longer exists upstream",
                id
            )
        });
        let missing = self.missing.iter().map(|rev| {
            format!(
                "revision {} ({}) has no log entry",
                rev.id,
                rev.modified_time.to_rfc3339()
            )
        });
        extra.chain(missing).collect()
    }
}

/// Compare local entries with the remote revision sequence.
///
/// The oldest remote revision is the pre-tool baseline and is never reported
/// as missing.
pub fn reconcile(entries: &[VersionLogEntry], revisions: &[Revision]) -> DesyncReport {
    let remote: HashSet<&str> = revisions.iter().map(|r| r.id.as_str()).collect();
    let local: HashSet<&str> = entries.iter().map(|e| e.revision_id.as_str()).collect();

    let mut seen = HashSet::new();
    let extra = entries
        .iter()
        .map(|e| e.revision_id.as_str())
        .filter(|id| !remote.contains(id) && seen.insert(*id))
        .map(str::to_string)
        .collect();

    let missing = revisions
        .iter()
        .skip(1)
        .filter(|r| !local.contains(r.id.as_str()))
        .cloned()
        .collect();

    DesyncReport { extra, missing }
}

/// Fetch the current revision list and reconcile it with the log.
///
/// Revisions are fetched on every call, never cached.
pub async fn check(
    service: &dyn DocumentService,
    document_id: &str,
    log: &VersionLog,
) -> Result<DesyncReport> {
    let revisions = service.list_revisions(document_id).await?;
    let report = reconcile(&log.read(), &revisions);
    if !report.is_in_sync() {
        tracing::warn!(
            extra = report.extra.len(),
            missing = report.missing.len(),
            "version log is out of sync with document revisions"
        );
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::JobTags;
    use chrono::Utc;

    fn rev(id: &str) -> Revision {
        Revision {
            id: id.to_string(),
            modified_time: Utc::now(),
            mime_type: "text/plain".to_string(),
        }
    }

    fn entry(id: &str) -> VersionLogEntry {
        VersionLogEntry::update(id, JobTags::default(), vec![])
    }

    #[test]
    fn reports_unlogged_remote_revision() {
        let report = reconcile(
            &[entry("r1"), entry("r2")],
            &[rev("r0"), rev("r1"), rev("r2"), rev("r3")],
        );
        assert!(report.extra.is_empty());
        let missing: Vec<&str> = report.missing.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(missing, vec!["r3"]);
    }

    #[test]
    fn reports_vanished_revision_once() {
        let report = reconcile(&[entry("gone"), entry("gone")], &[rev("r0")]);
        assert_eq!(report.extra, vec!["gone".to_string()]);
        assert!(report.missing.is_empty());
        assert_eq!(report.warnings().len(), 1);
    }

    #[test]
    fn baseline_only_is_in_sync() {
        assert!(reconcile(&[], &[rev("r0")]).is_in_sync());
        assert!(reconcile(&[], &[]).is_in_sync());
    }
}
