//! Subprocess-backed generator
//!
//! Runs a configured command, writes a JSON request to its stdin and decodes
//! its stdout. The exit code classifies failures:
//!
//! | code  | meaning                               |
//! |-------|---------------------------------------|
//! | 0     | output on stdout                      |
//! | 2     | authentication failure (not retried)  |
//! | 3     | quota exhausted (not retried)         |
//! | other | request failure (not retried)         |

use async_trait::async_trait;
use serde::Serialize;

use super::{Generator, Suggestion, decode_suggestion};
use crate::process::run_command;
use crate::{Error, Result, ServiceErrorKind};

const EXIT_AUTHENTICATION: i32 = 2;
const EXIT_QUOTA: i32 = 3;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SuggestRequest<'a> {
    resume_text: &'a str,
    job_description: &'a str,
}

/// Generator that delegates to an external program.
#[derive(Debug, Clone)]
pub struct CommandGenerator {
    argv: Vec<String>,
}

impl CommandGenerator {
    pub fn new(argv: Vec<String>) -> Result<Self> {
        if argv.is_empty() {
            return Err(Error::config(
                "generator.command must name a program to run",
            ));
        }
        Ok(Self { argv })
    }
}

#[async_trait]
impl Generator for CommandGenerator {
    async fn suggest(&self, resume_text: &str, job_description: &str) -> Result<Suggestion> {
        let request = serde_json::to_vec(&SuggestRequest {
            resume_text,
            job_description,
        })?;

        let output = run_command(&self.argv, Some(&request)).await.map_err(|e| match e {
            Error::Io(io) => Error::generator(ServiceErrorKind::Request, io.to_string()),
            other => other,
        })?;

        if output.success() {
            return decode_suggestion(&output.stdout);
        }

        let kind = match output.code {
            Some(EXIT_AUTHENTICATION) => ServiceErrorKind::Authentication,
            Some(EXIT_QUOTA) => ServiceErrorKind::Quota,
            _ => ServiceErrorKind::Request,
        };
        let message = if output.stderr.is_empty() {
            format!("exited with status {:?}", output.code)
        } else {
            output.stderr
        };
        Err(Error::generator(kind, message))
    }
}
