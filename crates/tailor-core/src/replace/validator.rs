//! Candidate replacement filtering

use super::WordReplacement;

/// Default bound on the whitespace-token count difference of a pair.
pub const DEFAULT_MAX_TOKEN_DELTA: usize = 5;

/// Why a candidate was excluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    /// `original` is not an exact substring of the source text
    NotFoundInSource,
    /// `original` and `replacement` are equal after trimming
    NoOp,
    /// The pair rewrites rather than rewords
    RewriteTooLarge {
        original_tokens: usize,
        replacement_tokens: usize,
    },
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFoundInSource => write!(f, "not found in source"),
            Self::NoOp => write!(f, "replacement is identical to original"),
            Self::RewriteTooLarge {
                original_tokens,
                replacement_tokens,
            } => write!(
                f,
                "rewrite too large ({} -> {} words)",
                original_tokens, replacement_tokens
            ),
        }
    }
}

/// A candidate that did not pass, with the first filter it failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub candidate: WordReplacement,
    pub reason: RejectionReason,
}

/// Result of one validation pass. Both lists keep input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub accepted: Vec<WordReplacement>,
    pub rejected: Vec<Rejection>,
}

/// Whitespace-separated token count.
pub fn token_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Filters generated candidates against one immutable text snapshot.
///
/// Each candidate is judged on its own; accepting one never affects another,
/// and overlapping originals are not deduplicated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplacementValidator {
    max_token_delta: usize,
}

impl Default for ReplacementValidator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TOKEN_DELTA)
    }
}

impl ReplacementValidator {
    pub fn new(max_token_delta: usize) -> Self {
        Self { max_token_delta }
    }

    pub fn max_token_delta(&self) -> usize {
        self.max_token_delta
    }

    pub fn validate(&self, text: &str, candidates: &[WordReplacement]) -> ValidationReport {
        let mut report = ValidationReport::default();

        for candidate in candidates {
            match self.check(text, candidate) {
                Ok(()) => report.accepted.push(candidate.clone()),
                Err(reason) => {
                    tracing::debug!(original = %candidate.original, %reason, "rejected replacement");
                    report.rejected.push(Rejection {
                        candidate: candidate.clone(),
                        reason,
                    });
                }
            }
        }

        report
    }

    fn check(&self, text: &str, candidate: &WordReplacement) -> Result<(), RejectionReason> {
        if candidate.original.is_empty() || !text.contains(candidate.original.as_str()) {
            return Err(RejectionReason::NotFoundInSource);
        }

        if candidate.original.trim() == candidate.replacement.trim() {
            return Err(RejectionReason::NoOp);
        }

        let original_tokens = token_count(&candidate.original);
        let replacement_tokens = token_count(&candidate.replacement);
        if original_tokens.abs_diff(replacement_tokens) > self.max_token_delta {
            return Err(RejectionReason::RewriteTooLarge {
                original_tokens,
                replacement_tokens,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = "Built two full-stack applications.";

    #[test]
    fn accepts_small_rewording() {
        let candidate = WordReplacement::new(TEXT, "Built and scaled two full-stack AI applications.");
        let report = ReplacementValidator::default().validate(TEXT, &[candidate.clone()]);
        assert_eq!(report.accepted, vec![candidate]);
        assert!(report.rejected.is_empty());
    }

    #[test]
    fn rejects_missing_original() {
        let report = ReplacementValidator::default()
            .validate(TEXT, &[WordReplacement::new("Led a team of ten", "Led a team")]);
        assert!(report.accepted.is_empty());
        assert_eq!(report.rejected[0].reason, RejectionReason::NotFoundInSource);
    }

    #[test]
    fn match_is_case_sensitive() {
        let report = ReplacementValidator::default()
            .validate(TEXT, &[WordReplacement::new("built two", "shipped two")]);
        assert_eq!(report.rejected[0].reason, RejectionReason::NotFoundInSource);
    }

    #[test]
    fn rejects_whitespace_only_change() {
        let report = ReplacementValidator::default()
            .validate(TEXT, &[WordReplacement::new("two ", " two")]);
        assert_eq!(report.rejected[0].reason, RejectionReason::NoOp);
    }

    #[test]
    fn rejects_large_rewrite() {
        let report = ReplacementValidator::new(2).validate(
            TEXT,
            &[WordReplacement::new(
                "two",
                "two production-grade, revenue generating, highly available",
            )],
        );
        assert_eq!(
            report.rejected[0].reason,
            RejectionReason::RewriteTooLarge {
                original_tokens: 1,
                replacement_tokens: 6
            }
        );
    }

    #[test]
    fn empty_original_is_not_found() {
        let report = ReplacementValidator::default().validate(TEXT, &[WordReplacement::new("", "x")]);
        assert_eq!(report.rejected[0].reason, RejectionReason::NotFoundInSource);
    }
}
