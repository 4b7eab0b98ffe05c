//! Core orchestration layer for resume-tailor
//!
//! Keeps one remotely hosted resume aligned with job postings while keeping
//! a local, append-only version log in step with the document service's own
//! revision history:
//!
//! - **Version log**: JSON-array history of every update and revert
//! - **Guarded edits**: suggestions are validated before any mutation
//! - **Revert**: restore a prior revision without rewriting history
//! - **Reconciliation**: detect log and service revisions that drifted apart
//! - **Monitoring**: queue newly found postings and process them one by one
//!
//! # Architecture
//!
//! ```text
//!                 tailor-cli
//!                     |
//!                tailor-core
//!          /          |           \
//!   DocumentService Generator  JobSource / LinkProbe
//!                     |
//!                 tailor-fs
//! ```
//!
//! Collaborators are traits; [`LocalDocumentService`], [`CommandGenerator`],
//! [`CommandJobSource`] and [`TcpProbe`] are the shipped implementations.

pub mod error;
pub mod generate;
pub mod history;
pub mod monitor;
pub mod probe;
mod process;
pub mod queue;
pub mod reconcile;
pub mod replace;
pub mod revert;
pub mod service;
pub mod settings;
pub mod source;
pub mod update;

pub use error::{Error, Result, ServiceErrorKind};
pub use generate::{CommandGenerator, Generator, Suggestion, decode_suggestion, suggest_with_retry};
pub use history::{JobTags, Selector, VersionLog, VersionLogEntry};
pub use monitor::{DiscoverReport, discover, process_queue};
pub use probe::{LinkProbe, Liveness, ProbeConfig, ProbeResult, TcpProbe, probe_all};
pub use queue::{JobQueue, JobQueueEntry};
pub use reconcile::{DesyncReport, reconcile};
pub use replace::{
    ApplyOutcome, Rejection, RejectionReason, ReplacementApplier, ReplacementValidator,
    ValidationReport, WordReplacement,
};
pub use revert::{RevertCoordinator, RevertOutcome, RevertState};
pub use service::{DocumentService, LocalDocumentService, Revision, RevisionContent};
pub use settings::Settings;
pub use source::{CommandJobSource, JobSource};
pub use update::{
    AppliedUpdate, BatchItem, BatchReport, UpdateCoordinator, UpdateOutcome, UpdateRequest,
};
