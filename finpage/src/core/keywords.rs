//! Keyword input submitted by the caller.

use serde::{Deserialize, Serialize};

/// The two user-supplied inputs every stage consumes.
///
/// Field names serialize in camelCase because prompt templates interpolate
/// them by those names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordInput {
    /// The topic phrase the page targets.
    pub primary_keyword: String,
    /// Comma-separated supporting phrases.
    pub secondary_keywords: String,
}

impl KeywordInput {
    /// Creates a keyword input, trimming surrounding whitespace.
    ///
    /// No validation happens here; stage contracts decide what is acceptable.
    #[must_use]
    pub fn new(primary_keyword: impl AsRef<str>, secondary_keywords: impl AsRef<str>) -> Self {
        Self {
            primary_keyword: primary_keyword.as_ref().trim().to_string(),
            secondary_keywords: secondary_keywords.as_ref().trim().to_string(),
        }
    }

    /// Returns the secondary keywords as a list, dropping empty entries.
    #[must_use]
    pub fn secondary_list(&self) -> Vec<&str> {
        self.secondary_keywords
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_trims() {
        let input = KeywordInput::new("  best credit cards for travel ", " travel rewards ");
        assert_eq!(input.primary_keyword, "best credit cards for travel");
        assert_eq!(input.secondary_keywords, "travel rewards");
    }

    #[test]
    fn test_secondary_list() {
        let input = KeywordInput::new("home loan", "low emi, , fixed rate ,floating rate,");
        assert_eq!(input.secondary_list(), vec!["low emi", "fixed rate", "floating rate"]);
    }

    #[test]
    fn test_serializes_camel_case() {
        let input = KeywordInput::new("a", "b");
        let value = serde_json::to_value(&input).unwrap();
        assert_eq!(value["primaryKeyword"], "a");
        assert_eq!(value["secondaryKeywords"], "b");
    }
}
