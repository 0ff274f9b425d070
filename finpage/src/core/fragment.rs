//! Fragment kinds and fragments.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The slot a fragment occupies in the assembled document.
///
/// Declaration order is assembly order: main content first, FAQ last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FragmentKind {
    /// The structured main article.
    MainContent,
    /// Official-source references, disclaimer and author bio.
    OfficialSources,
    /// Call-to-action block.
    CallsToAction,
    /// FAQ question/answer pairs.
    Faq,
    /// A complete page produced in one call.
    FullPage,
}

impl FragmentKind {
    /// The four fragments of a staged run, in assembly order.
    pub const STAGED: [Self; 4] = [
        Self::MainContent,
        Self::OfficialSources,
        Self::CallsToAction,
        Self::Faq,
    ];

    /// Stable identifier used in markup and logs.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::MainContent => "main-content",
            Self::OfficialSources => "official-sources",
            Self::CallsToAction => "calls-to-action",
            Self::Faq => "faq",
            Self::FullPage => "full-page",
        }
    }
}

impl fmt::Display for FragmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// A validated HTML block produced by one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    /// Where the fragment goes.
    pub kind: FragmentKind,
    /// The stage that produced it.
    pub stage: String,
    /// The markup.
    pub html: String,
}

impl Fragment {
    /// Creates a new fragment.
    #[must_use]
    pub fn new(kind: FragmentKind, stage: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            kind,
            stage: stage.into(),
            html: html.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_order_matches_assembly_order() {
        let mut kinds = vec![
            FragmentKind::Faq,
            FragmentKind::MainContent,
            FragmentKind::CallsToAction,
            FragmentKind::OfficialSources,
        ];
        kinds.sort();
        assert_eq!(kinds, FragmentKind::STAGED.to_vec());
    }

    #[test]
    fn test_slug_and_serde_agree() {
        for kind in FragmentKind::STAGED {
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, serde_json::json!(kind.slug()));
        }
        assert_eq!(FragmentKind::FullPage.to_string(), "full-page");
    }
}
