//! FAQ block shape checks.
//!
//! FAQ fragments are bare `<dt>`/`<dd>` pairs: the enclosing `<dl>` is added by
//! whoever embeds the page, so the fragment itself must not carry a list
//! wrapper of any kind.

use super::inspect::{check_well_formed, tags};

/// Fewest question/answer pairs a FAQ block may contain.
pub const MIN_FAQ_PAIRS: usize = 3;
/// Most question/answer pairs a FAQ block may contain.
pub const MAX_FAQ_PAIRS: usize = 5;

const WRAPPER_TAGS: &[&str] = &["dl", "ul", "ol"];

/// Result of inspecting a FAQ fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FaqShape {
    /// Number of complete question/answer pairs.
    pub pairs: usize,
    /// Structural problems found.
    pub violations: Vec<String>,
}

impl FaqShape {
    /// True when the block is well-shaped and has an allowed number of pairs.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty() && (MIN_FAQ_PAIRS..=MAX_FAQ_PAIRS).contains(&self.pairs)
    }
}

/// Inspects a FAQ fragment.
#[must_use]
pub fn inspect_faq(html: &str) -> FaqShape {
    let mut shape = FaqShape::default();

    if let Err(problem) = check_well_formed(html) {
        shape.violations.push(format!("markup is not balanced: {problem}"));
    }

    let mut expect_question = true;
    for tag in tags(html).into_iter().filter(|t| !t.closing) {
        if WRAPPER_TAGS.contains(&tag.name.as_str()) {
            shape
                .violations
                .push(format!("pairs must not be wrapped in <{}>", tag.name));
            continue;
        }
        match (tag.name.as_str(), expect_question) {
            ("dt", true) => expect_question = false,
            ("dd", false) => {
                shape.pairs += 1;
                expect_question = true;
            }
            ("dt", false) => shape.violations.push("question without an answer".to_string()),
            ("dd", true) => shape.violations.push("answer without a question".to_string()),
            _ => {}
        }
    }
    if !expect_question {
        shape.violations.push("last question has no answer".to_string());
    }
    if !(MIN_FAQ_PAIRS..=MAX_FAQ_PAIRS).contains(&shape.pairs) {
        shape.violations.push(format!(
            "expected {MIN_FAQ_PAIRS}-{MAX_FAQ_PAIRS} question/answer pairs, found {}",
            shape.pairs
        ));
    }

    shape.violations.dedup();
    shape
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(n: usize) -> String {
        (1..=n)
            .map(|i| format!("<dt>Question {i}?</dt>\n<dd>Answer {i}.</dd>\n"))
            .collect()
    }

    #[test]
    fn test_valid_faq() {
        let shape = inspect_faq(&pairs(4));
        assert_eq!(shape.pairs, 4);
        assert!(shape.is_valid(), "{:?}", shape.violations);
    }

    #[test]
    fn test_pair_count_bounds() {
        assert!(!inspect_faq(&pairs(2)).is_valid());
        assert!(inspect_faq(&pairs(3)).is_valid());
        assert!(inspect_faq(&pairs(5)).is_valid());
        assert!(!inspect_faq(&pairs(6)).is_valid());
    }

    #[test]
    fn test_wrapper_rejected() {
        let shape = inspect_faq(&format!("<dl>{}</dl>", pairs(3)));
        assert_eq!(shape.pairs, 3);
        assert!(!shape.is_valid());
        assert!(shape.violations[0].contains("<dl>"));
    }

    #[test]
    fn test_unbalanced_pairs_rejected() {
        let html = format!("{}<dt>Dangling?</dt>", pairs(3));
        let shape = inspect_faq(&html);
        assert!(shape.violations.iter().any(|v| v.contains("no answer")));

        let html = format!("<dd>Orphan</dd>{}", pairs(3));
        assert!(inspect_faq(&html)
            .violations
            .iter()
            .any(|v| v.contains("answer without a question")));
    }

    #[test]
    fn test_answers_may_contain_markup() {
        let html = "<dt>What is APR?</dt><dd><p>The <strong>annual</strong> rate.</p></dd>\
                    <dt>Fees?</dt><dd>None.</dd><dt>Miles?</dt><dd>Yes.</dd>";
        assert!(inspect_faq(html).is_valid());
    }
}
