//! Property tests for replacement validation

use proptest::prelude::*;
use tailor_core::replace::token_count;
use tailor_core::{ReplacementValidator, WordReplacement};

fn phrase() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-z]{1,8}", 1..10).prop_map(|words| words.join(" "))
}

fn candidates(text: String) -> impl Strategy<Value = (String, Vec<WordReplacement>)> {
    let words: Vec<String> = text.split_whitespace().map(str::to_string).collect();
    let n = words.len();
    let from_text = (0..n, 1..=n, phrase()).prop_map(move |(start, len, replacement)| {
        let end = (start + len).min(n);
        WordReplacement::new(words[start..end].join(" "), replacement)
    });
    let arbitrary = (phrase(), phrase()).prop_map(|(o, r)| WordReplacement::new(o, r));
    let candidate = prop_oneof![from_text, arbitrary];
    prop::collection::vec(candidate, 0..8).prop_map(move |c| (text.clone(), c))
}

fn text_and_candidates() -> impl Strategy<Value = (String, Vec<WordReplacement>)> {
    phrase().prop_flat_map(candidates)
}

proptest! {
    #[test]
    fn validation_is_idempotent(
        (text, candidates) in text_and_candidates(),
        delta in 0usize..8,
    ) {
        let validator = ReplacementValidator::new(delta);
        prop_assert_eq!(
            validator.validate(&text, &candidates),
            validator.validate(&text, &candidates)
        );
    }

    #[test]
    fn accepted_pairs_occur_in_text_within_bound(
        (text, candidates) in text_and_candidates(),
        delta in 0usize..8,
    ) {
        let report = ReplacementValidator::new(delta).validate(&text, &candidates);

        prop_assert_eq!(report.accepted.len() + report.rejected.len(), candidates.len());
        for accepted in &report.accepted {
            prop_assert!(text.contains(accepted.original.as_str()));
            prop_assert!(
                token_count(&accepted.original).abs_diff(token_count(&accepted.replacement)) <= delta
            );
            prop_assert_ne!(accepted.original.trim(), accepted.replacement.trim());
        }
    }
}
