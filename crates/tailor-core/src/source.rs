//! Job description source
//!
//! Queued postings carry only a URL. Before a queued posting can drive an
//! update its description has to be fetched; that is delegated to a
//! [`JobSource`].

use async_trait::async_trait;

use crate::process::run_command;
use crate::{Error, Result, ServiceErrorKind};

#[async_trait]
pub trait JobSource: Send + Sync {
    /// Plain-text description of the posting at `url`.
    async fn describe(&self, url: &str) -> Result<String>;
}

/// Job source that runs a configured command with the URL appended and
/// reads the description from stdout.
#[derive(Debug, Clone)]
pub struct CommandJobSource {
    argv: Vec<String>,
}

impl CommandJobSource {
    pub fn new(argv: Vec<String>) -> Result<Self> {
        if argv.is_empty() {
            return Err(Error::config(
                "monitor.describe_command must name a program to run",
            ));
        }
        Ok(Self { argv })
    }
}

#[async_trait]
impl JobSource for CommandJobSource {
    async fn describe(&self, url: &str) -> Result<String> {
        let mut argv = self.argv.clone();
        argv.push(url.to_string());

        let output = run_command(&argv, None).await.map_err(|e| match e {
            Error::Io(io) => Error::job_source(ServiceErrorKind::Request, io.to_string()),
            other => other,
        })?;

        if !output.success() {
            return Err(Error::job_source(
                ServiceErrorKind::Request,
                format!("{} (status {:?})", output.stderr, output.code),
            ));
        }

        let description = output.stdout.trim();
        if description.is_empty() {
            return Err(Error::job_source(
                ServiceErrorKind::Request,
                format!("empty description for {}", url),
            ));
        }
        Ok(description.to_string())
    }
}
