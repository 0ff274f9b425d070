//! Assertions for generation outcomes.

use crate::core::{FragmentKind, GenerationOutcome, SUCCESS_MESSAGE};

/// Asserts a successful outcome and returns its content.
///
/// # Panics
///
/// Panics if the outcome is not a success with non-empty content.
#[must_use]
pub fn assert_outcome_succeeded(outcome: &GenerationOutcome) -> &str {
    assert!(outcome.success, "expected success, got: {}", outcome.message);
    assert_eq!(outcome.message, SUCCESS_MESSAGE);
    let content = outcome
        .content
        .as_deref()
        .unwrap_or_else(|| panic!("successful outcome carries no content"));
    assert!(!content.trim().is_empty(), "successful outcome has blank content");
    content
}

/// Asserts a failed outcome whose message contains `needle`.
///
/// # Panics
///
/// Panics if the outcome succeeded, carries content, or has another message.
pub fn assert_outcome_failed(outcome: &GenerationOutcome, needle: &str) {
    assert!(!outcome.success, "expected failure");
    assert!(outcome.content.is_none(), "failed outcome leaked content");
    assert!(
        outcome.message.contains(needle),
        "message {:?} does not contain {needle:?}",
        outcome.message
    );
}

/// Asserts that the document holds exactly these fragments, in this order.
///
/// # Panics
///
/// Panics if a fragment is missing, extra, or out of order.
pub fn assert_fragment_order(html: &str, expected: &[FragmentKind]) {
    let found: Vec<&str> = html
        .match_indices("data-fragment=\"")
        .filter_map(|(idx, marker)| {
            let rest = &html[idx + marker.len()..];
            rest.find('"').map(|end| &rest[..end])
        })
        .collect();
    let expected: Vec<&str> = expected.iter().map(|k| k.slug()).collect();
    assert_eq!(found, expected, "fragment order mismatch");
}
