//! Guarded text substitution
//!
//! Generated replacements are untrusted. [`ReplacementValidator`] narrows
//! them to a safe set for one text snapshot, and [`ReplacementApplier`]
//! submits that set to the document service as a single batch.

mod applier;
mod validator;

pub use applier::{ApplyOutcome, ReplacementApplier};
pub use validator::{
    DEFAULT_MAX_TOKEN_DELTA, Rejection, RejectionReason, ReplacementValidator, ValidationReport,
    token_count,
};

use serde::{Deserialize, Serialize};

/// One `(original, replacement)` pair proposed for a single update cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordReplacement {
    pub original: String,
    pub replacement: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

impl WordReplacement {
    pub fn new(original: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            original: original.into(),
            replacement: replacement.into(),
            rationale: None,
        }
    }

    /// The line recorded in a log entry's `changes` for this pair.
    pub fn describe(&self) -> String {
        format!("'{}' -> '{}'", self.original, self.replacement)
    }
}
