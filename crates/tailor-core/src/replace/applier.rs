//! Batch submission of validated replacements

use super::WordReplacement;
use crate::Result;
use crate::service::DocumentService;

/// What one apply call did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyOutcome {
    /// Occurrences changed across all pairs, as reported by the service
    pub occurrences: usize,
    /// One narrative line per submitted pair
    pub changes: Vec<String>,
}

/// Submits a validated replacement set as one atomic batch.
///
/// The service substitutes against the live document at call time. If the
/// document changed since the text was validated, some pairs may match
/// nothing; the returned count reflects what actually changed.
pub struct ReplacementApplier<'a> {
    service: &'a dyn DocumentService,
    document_id: &'a str,
}

impl<'a> ReplacementApplier<'a> {
    pub fn new(service: &'a dyn DocumentService, document_id: &'a str) -> Self {
        Self {
            service,
            document_id,
        }
    }

    /// Apply all pairs. An empty set is a no-op that makes no service call.
    pub async fn apply(&self, accepted: &[WordReplacement]) -> Result<ApplyOutcome> {
        if accepted.is_empty() {
            tracing::debug!(document = self.document_id, "no replacements to apply");
            return Ok(ApplyOutcome::default());
        }

        let pairs: Vec<(String, String)> = accepted
            .iter()
            .map(|r| (r.original.clone(), r.replacement.clone()))
            .collect();

        let occurrences = self
            .service
            .apply_text_substitutions(self.document_id, &pairs)
            .await?;

        if occurrences == 0 {
            tracing::warn!(
                document = self.document_id,
                pairs = pairs.len(),
                "batch applied but matched no occurrences; document may have changed since export"
            );
        }

        Ok(ApplyOutcome {
            occurrences,
            changes: accepted.iter().map(WordReplacement::describe).collect(),
        })
    }
}
