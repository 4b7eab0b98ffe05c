//! Ordinary update cycles and batch runs
//!
//! One cycle: export text, ask the generator for replacements, validate
//! them, apply the accepted set, then log the revision the apply produced.
//! A log entry is written if and only if the apply call returned.
//!
//! Cycles against one document never overlap. A batch awaits each full cycle
//! before starting the next, since the service has no lock primitive and two
//! interleaved cycles would silently lose one cycle's changes.

use crate::generate::{DEFAULT_MAX_ATTEMPTS, Generator, suggest_with_retry};
use crate::history::{JobTags, VersionLog, VersionLogEntry};
use crate::replace::{ReplacementApplier, ReplacementValidator, ValidationReport};
use crate::service::DocumentService;
use crate::{Error, Result};

/// Input of one update cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateRequest {
    pub job_description: String,
    pub tags: JobTags,
    /// Stop after validation without mutating anything
    pub dry_run: bool,
}

impl UpdateRequest {
    pub fn new(job_description: impl Into<String>, tags: JobTags) -> Self {
        Self {
            job_description: job_description.into(),
            tags,
            dry_run: false,
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Short human label built from the tags.
    pub fn label(&self) -> String {
        match (&self.tags.company, &self.tags.job_title) {
            (Some(company), Some(title)) => format!("{} ({})", title, company),
            (Some(company), None) => company.clone(),
            (None, Some(title)) => title.clone(),
            (None, None) => self
                .tags
                .job_url
                .clone()
                .unwrap_or_else(|| "untitled job".to_string()),
        }
    }
}

/// What an applied (non-dry-run) cycle changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedUpdate {
    pub occurrences: usize,
    pub revision_id: String,
    pub entry_index: usize,
}

/// Result of one update cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub validation: ValidationReport,
    /// Generator's summary of its suggestions
    pub summary: Vec<String>,
    /// `None` for a dry run
    pub applied: Option<AppliedUpdate>,
}

/// Per-item result of a batch run.
#[derive(Debug)]
pub struct BatchItem {
    pub label: String,
    pub result: Result<UpdateOutcome>,
}

/// Results of a batch run, in submission order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub items: Vec<BatchItem>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.items.iter().filter(|i| i.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.items.len() - self.succeeded()
    }

    /// Error only if there were items and every one failed.
    pub fn ensure_any_succeeded(&self) -> Result<()> {
        if !self.items.is_empty() && self.succeeded() == 0 {
            Err(Error::BatchFailed {
                failed: self.items.len(),
            })
        } else {
            Ok(())
        }
    }
}

/// Orchestrates update cycles for one document.
pub struct UpdateCoordinator<'a> {
    service: &'a dyn DocumentService,
    generator: &'a dyn Generator,
    log: &'a VersionLog,
    document_id: &'a str,
    validator: ReplacementValidator,
    max_attempts: u32,
}

impl<'a> UpdateCoordinator<'a> {
    pub fn new(
        service: &'a dyn DocumentService,
        generator: &'a dyn Generator,
        log: &'a VersionLog,
        document_id: &'a str,
    ) -> Self {
        Self {
            service,
            generator,
            log,
            document_id,
            validator: ReplacementValidator::default(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_validator(mut self, validator: ReplacementValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Run one full update cycle.
    pub async fn run(&self, request: &UpdateRequest) -> Result<UpdateOutcome> {
        let text = self.service.export_text(self.document_id).await?;

        let suggestion = suggest_with_retry(
            self.generator,
            &text,
            &request.job_description,
            self.max_attempts,
        )
        .await?;

        let validation = self.validator.validate(&text, &suggestion.replacements);
        tracing::debug!(
            accepted = validation.accepted.len(),
            rejected = validation.rejected.len(),
            "validated suggestions"
        );

        if request.dry_run {
            return Ok(UpdateOutcome {
                validation,
                summary: suggestion.summary,
                applied: None,
            });
        }

        let applied = ReplacementApplier::new(self.service, self.document_id)
            .apply(&validation.accepted)
            .await?;

        let latest = self.service.latest_revision(self.document_id).await?;

        let mut changes = suggestion.summary.clone();
        changes.extend(applied.changes);
        let entry_index = self.log.append(VersionLogEntry::update(
            &latest.id,
            request.tags.clone(),
            changes,
        ))?;

        tracing::info!(
            job = %request.label(),
            revision = %latest.id,
            occurrences = applied.occurrences,
            "update applied"
        );

        Ok(UpdateOutcome {
            validation,
            summary: suggestion.summary,
            applied: Some(AppliedUpdate {
                occurrences: applied.occurrences,
                revision_id: latest.id,
                entry_index,
            }),
        })
    }

    /// Run requests one at a time, isolating failures per item.
    pub async fn run_batch(&self, requests: &[UpdateRequest]) -> BatchReport {
        let mut report = BatchReport::default();
        for (n, request) in requests.iter().enumerate() {
            let label = request.label();
            tracing::debug!(item = n, job = %label, "starting batch item");
            let result = self.run(request).await;
            if let Err(e) = &result {
                tracing::warn!(item = n, job = %label, error = %e, "batch item failed");
            }
            report.items.push(BatchItem { label, result });
        }
        report
    }
}
