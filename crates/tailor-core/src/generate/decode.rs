//! Recovery of a [`Suggestion`] from free-form generator output
//!
//! Strategies are tried in order. Each one proposes candidate JSON texts;
//! the first candidate that deserializes into a [`Suggestion`] wins.

use super::Suggestion;
use crate::{Error, Result};

type Extractor = fn(&str) -> Vec<&str>;

const STRATEGIES: &[(&str, Extractor)] = &[
    ("direct", direct),
    ("fenced block", fenced_blocks),
    ("brace-matched object", brace_matched_objects),
];

/// Decode generator output into a schema-valid [`Suggestion`].
///
/// Fails with [`Error::Parse`] when no strategy yields a valid object.
pub fn decode_suggestion(raw: &str) -> Result<Suggestion> {
    let mut last_error = String::from("no JSON object found");

    for (name, extract) in STRATEGIES {
        for candidate in extract(raw) {
            match serde_json::from_str::<Suggestion>(candidate.trim()) {
                Ok(suggestion) => {
                    tracing::debug!(strategy = *name, "decoded generator output");
                    return Ok(suggestion);
                }
                Err(e) => last_error = e.to_string(),
            }
        }
    }

    Err(Error::Parse {
        strategies: STRATEGIES
            .iter()
            .map(|(name, _)| *name)
            .collect::<Vec<_>>()
            .join(", "),
        message: last_error,
    })
}

fn direct(raw: &str) -> Vec<&str> {
    vec![raw]
}

/// Bodies of ``` fenced blocks, with any language tag line dropped.
fn fenced_blocks(raw: &str) -> Vec<&str> {
    let mut blocks = Vec::new();
    let mut rest = raw;

    while let Some(open) = rest.find("```") {
        let after_fence = &rest[open + 3..];
        let body_start = match after_fence.find('\n') {
            Some(nl) => nl + 1,
            None => break,
        };
        let body = &after_fence[body_start..];
        match body.find("```") {
            Some(close) => {
                blocks.push(&body[..close]);
                rest = &body[close + 3..];
            }
            None => break,
        }
    }

    blocks
}

/// Every balanced `{...}` span, outermost first, skipping braces that
/// appear inside JSON string literals.
///
/// One pass with a stack of open positions. Quotes are only tracked inside
/// a brace, so stray quotes in surrounding prose do not swallow the object.
fn brace_matched_objects(raw: &str) -> Vec<&str> {
    let mut open = Vec::new();
    let mut spans = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &byte) in raw.as_bytes().iter().enumerate() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match byte {
            b'"' if !open.is_empty() => in_string = true,
            b'{' => open.push(offset),
            b'}' => {
                if let Some(start) = open.pop() {
                    spans.push((start, offset));
                }
            }
            _ => {}
        }
    }

    spans.sort_unstable_by_key(|&(start, _)| start);
    spans
        .into_iter()
        .map(|(start, end)| &raw[start..=end])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const BODY: &str = r#"{"replacements":[{"original":"Go","replacement":"Rust"}],"summary":["Lead with Rust"]}"#;

    fn expected() -> Suggestion {
        serde_json::from_str(BODY).unwrap()
    }

    #[test]
    fn parses_plain_json() {
        assert_eq!(decode_suggestion(BODY).unwrap(), expected());
    }

    #[test]
    fn extracts_fenced_block() {
        let raw = format!("Here you go:\n```json\n{}\n```\nGood luck!", BODY);
        assert_eq!(decode_suggestion(&raw).unwrap(), expected());
    }

    #[test]
    fn extracts_object_from_prose() {
        let raw = format!("Sure {{thinking}} -- result: {} (end)", BODY);
        assert_eq!(decode_suggestion(&raw).unwrap(), expected());
    }

    #[test]
    fn braces_inside_strings_do_not_confuse_matching() {
        let raw = r#"note: {"replacements":[{"original":"a } b","replacement":"a { b"}]} trailing"#;
        let suggestion = decode_suggestion(raw).unwrap();
        assert_eq!(suggestion.replacements[0].original, "a } b");
        assert!(suggestion.summary.is_empty());
    }

    #[test]
    fn schema_invalid_object_is_parse_error() {
        let err = decode_suggestion(r#"{"summary": ["no replacements key"]}"#).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
        assert!(err.is_retryable());
    }

    #[test]
    fn nested_object_is_found_inside_a_wrapper() {
        let raw = format!(r#"{{"result": {}, "note": "wrapped"}}"#, BODY);
        assert_eq!(decode_suggestion(&raw).unwrap(), expected());
    }

    #[test]
    fn brace_heavy_output_still_decodes() {
        let noise = "{}".repeat(20_000);
        let raw = format!("{} {{ {} {}", noise, BODY, noise);
        assert_eq!(decode_suggestion(&raw).unwrap(), expected());
    }

    #[test]
    fn unterminated_fence_falls_through() {
        let raw = format!("```json\n{}", BODY);
        assert_eq!(decode_suggestion(&raw).unwrap(), expected());
    }
}
