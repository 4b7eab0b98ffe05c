//! Revert to a logged document state
//!
//! A revert is a forward event: the historical text is written back as a new
//! revision and recorded as a new log entry. Neither the remote history nor
//! existing log entries are rewound.
//!
//! ```text
//! SelectTarget -> FetchSnapshot -> Overwrite -> AppendLog -> Done
//!       \______________\_______________\____________\______-> Failed
//! ```

use std::ops::ControlFlow;

use crate::Result;
use crate::history::{Selector, VersionLog, VersionLogEntry};
use crate::service::DocumentService;

/// Observable states of a revert run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevertState {
    SelectTarget,
    FetchSnapshot,
    Overwrite,
    AppendLog,
    Done,
    Failed,
}

/// Result of a completed revert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevertOutcome {
    /// Position of the reverted-to entry in the log
    pub target_index: usize,
    pub target_revision_id: String,
    /// Revision created by the overwrite
    pub new_revision_id: String,
    /// Position of the appended revert entry
    pub entry_index: usize,
    /// Non-fatal problems the caller must surface, e.g. a content fallback
    pub warnings: Vec<String>,
    /// States visited, in order
    pub trace: Vec<RevertState>,
}

/// Per-state data carried between transitions.
enum Step {
    SelectTarget,
    FetchSnapshot {
        index: usize,
        target: VersionLogEntry,
    },
    Overwrite {
        index: usize,
        target: VersionLogEntry,
        text: String,
    },
    AppendLog {
        index: usize,
        target: VersionLogEntry,
    },
}

impl Step {
    fn state(&self) -> RevertState {
        match self {
            Self::SelectTarget => RevertState::SelectTarget,
            Self::FetchSnapshot { .. } => RevertState::FetchSnapshot,
            Self::Overwrite { .. } => RevertState::Overwrite,
            Self::AppendLog { .. } => RevertState::AppendLog,
        }
    }
}

/// Data of the terminal `Done` state.
struct Completed {
    index: usize,
    target: VersionLogEntry,
    new_revision_id: String,
    entry_index: usize,
}

/// Drives the revert state machine for one document.
pub struct RevertCoordinator<'a> {
    service: &'a dyn DocumentService,
    log: &'a VersionLog,
    document_id: &'a str,
}

impl<'a> RevertCoordinator<'a> {
    pub fn new(service: &'a dyn DocumentService, log: &'a VersionLog, document_id: &'a str) -> Self {
        Self {
            service,
            log,
            document_id,
        }
    }

    /// Restore the document to the state recorded by `selector`'s entry.
    ///
    /// An unresolvable selector fails before any service call.
    pub async fn revert(&self, selector: &Selector) -> Result<RevertOutcome> {
        let mut step = Step::SelectTarget;
        let mut trace = Vec::new();
        let mut warnings = Vec::new();

        loop {
            let state = step.state();
            trace.push(state);
            tracing::debug!(?state, document = self.document_id, "revert transition");

            match self.advance(step, selector, &mut warnings).await {
                Ok(ControlFlow::Continue(next)) => step = next,
                Ok(ControlFlow::Break(done)) => {
                    trace.push(RevertState::Done);
                    tracing::info!(
                        target_revision = %done.target.revision_id,
                        new_revision = %done.new_revision_id,
                        "revert complete"
                    );
                    return Ok(RevertOutcome {
                        target_index: done.index,
                        target_revision_id: done.target.revision_id,
                        new_revision_id: done.new_revision_id,
                        entry_index: done.entry_index,
                        warnings,
                        trace,
                    });
                }
                Err(e) => {
                    trace.push(RevertState::Failed);
                    tracing::warn!(from = ?state, ?trace, error = %e, "revert failed");
                    return Err(e);
                }
            }
        }
    }

    async fn advance(
        &self,
        step: Step,
        selector: &Selector,
        warnings: &mut Vec<String>,
    ) -> Result<ControlFlow<Completed, Step>> {
        let next = match step {
            Step::SelectTarget => {
                let (index, target) = self.log.resolve(selector)?;
                Step::FetchSnapshot { index, target }
            }
            Step::FetchSnapshot { index, target } => {
                let content = self
                    .service
                    .get_revision_content(self.document_id, &target.revision_id)
                    .await?;
                if content.is_fallback() {
                    let warning = format!(
                        "historical content for revision {} is unavailable; current content was used instead",
                        target.revision_id
                    );
                    tracing::warn!("{}", warning);
                    warnings.push(warning);
                }
                Step::Overwrite {
                    index,
                    target,
                    text: content.into_text(),
                }
            }
            Step::Overwrite {
                index,
                target,
                text,
            } => {
                self.service.overwrite_body(self.document_id, &text).await?;
                Step::AppendLog { index, target }
            }
            Step::AppendLog { index, target } => {
                let latest = self.service.latest_revision(self.document_id).await?;
                let entry_index = self
                    .log
                    .append(VersionLogEntry::revert(&latest.id, &target.revision_id))?;
                return Ok(ControlFlow::Break(Completed {
                    index,
                    target,
                    new_revision_id: latest.id,
                    entry_index,
                }));
            }
        };
        Ok(ControlFlow::Continue(next))
    }
}
