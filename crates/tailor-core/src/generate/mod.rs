//! Generation collaborator
//!
//! The generator proposes replacements that align the resume with a job
//! description. Its output is free-form text that should contain a JSON
//! [`Suggestion`]; see [`decode_suggestion`] for how it is recovered.

mod command;
mod decode;

pub use command::CommandGenerator;
pub use decode::decode_suggestion;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::replace::WordReplacement;

/// Default number of attempts for one suggestion request.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Decoded generator output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub replacements: Vec<WordReplacement>,
    #[serde(default)]
    pub summary: Vec<String>,
}

/// Capability interface of the generation collaborator.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn suggest(&self, resume_text: &str, job_description: &str) -> Result<Suggestion>;
}

/// Ask for a suggestion, retrying transient decode failures.
///
/// Makes at most `max_attempts` calls (at least one). Authentication, quota
/// and request errors are returned on first occurrence.
pub async fn suggest_with_retry(
    generator: &dyn Generator,
    resume_text: &str,
    job_description: &str,
    max_attempts: u32,
) -> Result<Suggestion> {
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match generator.suggest(resume_text, job_description).await {
            Ok(suggestion) => return Ok(suggestion),
            Err(e) if e.is_retryable() && attempt < max_attempts => {
                tracing::warn!(attempt, max_attempts, error = %e, "generator output unusable, retrying");
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
