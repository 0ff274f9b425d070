//! The `StageContract` trait and the shared keyword input schema.

use super::{FieldSpec, SchemaSpec};
use crate::core::{FragmentKind, SeoMetadata};
use crate::errors::FieldViolation;
use crate::prompts::PromptTemplate;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

/// Minimum trimmed length of either keyword field.
pub const KEYWORD_MIN: usize = 3;
/// Maximum trimmed length of the primary keyword.
pub const PRIMARY_KEYWORD_MAX: usize = 200;
/// Maximum trimmed length of the secondary keyword list.
pub const SECONDARY_KEYWORDS_MAX: usize = 1000;

/// Input schema shared by every stage.
pub const KEYWORD_INPUT: SchemaSpec = SchemaSpec::new(
    "KeywordInput",
    "Keywords the generated page targets.",
    &[
        FieldSpec::text(
            "primaryKeyword",
            "Primary keyword",
            KEYWORD_MIN,
            Some(PRIMARY_KEYWORD_MAX),
            "The main topic phrase the page should rank for.",
        ),
        FieldSpec::text(
            "secondaryKeywords",
            "Secondary keywords",
            KEYWORD_MIN,
            Some(SECONDARY_KEYWORDS_MAX),
            "Comma-separated supporting phrases to weave into the content.",
        ),
    ],
);

/// Static description of one generation stage.
///
/// Implementors are zero-sized marker types; everything lives in associated
/// items so a stage's shape is fixed at compile time.
pub trait StageContract: Send + Sync + 'static {
    /// Unique stage name.
    const NAME: &'static str;
    /// The document slot this stage fills.
    const FRAGMENT: FragmentKind;
    /// Input schema.
    const INPUT: SchemaSpec;
    /// Output schema.
    const OUTPUT: SchemaSpec;
    /// Canonical prompt template.
    const TEMPLATE: PromptTemplate;

    /// Typed input; must serialize to an object matching `INPUT`.
    type Input: Serialize + Send + Sync;
    /// Typed output; deserialized from a payload that matched `OUTPUT`.
    type Output: DeserializeOwned + Serialize + Debug + Send;

    /// Checks that go beyond field shape. Runs after schema validation.
    fn check_output(_input: &Self::Input, _output: &Self::Output) -> Vec<FieldViolation> {
        Vec::new()
    }

    /// Page-level SEO metadata carried by the output, if the stage owns it.
    fn seo_metadata(_output: &Self::Output) -> Option<SeoMetadata> {
        None
    }

    /// Extracts the HTML fragment the stage contributes.
    fn into_fragment(output: Self::Output) -> String;
}
