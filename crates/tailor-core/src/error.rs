//! Error types for tailor-core

/// Result type for tailor-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Classification of a collaborator failure.
///
/// Only [`ServiceErrorKind::Transient`] failures are ever retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceErrorKind {
    /// The collaborator answered but its output could not be decoded
    Transient,
    /// Credentials were rejected
    Authentication,
    /// Rate limit or quota exhausted
    Quota,
    /// The request was malformed or referred to something that does not exist
    Request,
}

impl std::fmt::Display for ServiceErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Transient => "transient",
            Self::Authentication => "authentication",
            Self::Quota => "quota",
            Self::Request => "request",
        };
        write!(f, "{}", label)
    }
}

/// Errors that can occur in tailor-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A revert, tag, or export target did not resolve to a log entry
    #[error("No version log entry matches '{selector}'")]
    NotFound { selector: String },

    /// A document or generation collaborator call failed
    #[error("{service} {kind} error: {message}")]
    ExternalService {
        service: &'static str,
        kind: ServiceErrorKind,
        message: String,
    },

    /// Generation output could not be decoded by any strategy
    #[error("Could not decode generation output (tried {strategies}): {message}")]
    Parse { strategies: String, message: String },

    /// Invalid settings
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    /// Every item of a batch run failed
    #[error("All {failed} batch item(s) failed")]
    BatchFailed { failed: usize },

    /// Filesystem error from tailor-fs
    #[error(transparent)]
    Fs(#[from] tailor_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// TOML deserialization error
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),
}

impl Error {
    /// A failure reported by the document service.
    pub fn document(kind: ServiceErrorKind, message: impl Into<String>) -> Self {
        Self::ExternalService {
            service: "document service",
            kind,
            message: message.into(),
        }
    }

    /// A failure reported by the generation collaborator.
    pub fn generator(kind: ServiceErrorKind, message: impl Into<String>) -> Self {
        Self::ExternalService {
            service: "generator",
            kind,
            message: message.into(),
        }
    }

    /// A failure reported by the job description source.
    pub fn job_source(kind: ServiceErrorKind, message: impl Into<String>) -> Self {
        Self::ExternalService {
            service: "job source",
            kind,
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether a retry of the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Parse { .. }
                | Self::ExternalService {
                    kind: ServiceErrorKind::Transient,
                    ..
                }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_transient_and_parse_failures_retry() {
        assert!(Error::generator(ServiceErrorKind::Transient, "bad json").is_retryable());
        assert!(
            Error::Parse {
                strategies: "direct".into(),
                message: "eof".into()
            }
            .is_retryable()
        );
        assert!(!Error::generator(ServiceErrorKind::Authentication, "401").is_retryable());
        assert!(!Error::generator(ServiceErrorKind::Quota, "429").is_retryable());
        assert!(!Error::document(ServiceErrorKind::Request, "400").is_retryable());
    }

    #[test]
    fn not_found_displays_selector() {
        let err = Error::NotFound {
            selector: "rev-9".into(),
        };
        assert!(err.to_string().contains("rev-9"));
    }
}
