//! Official-source integration stage.

use crate::contracts::{FieldSpec, SchemaSpec, StageContract, KEYWORD_INPUT};
use crate::core::{FragmentKind, KeywordInput};
use crate::errors::FieldViolation;
use crate::html::count_tag;
use crate::prompts::{PromptTemplate, OFFICIAL_SOURCES};
use serde::{Deserialize, Serialize};

const FIELD: &str = "sourcesSection";

/// Output of [`IntegrateOfficialSources`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfficialSources {
    /// References, disclaimer and author bio markup.
    pub sources_section: String,
}

/// Adds official-source references, a disclaimer and an author bio.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegrateOfficialSources;

impl StageContract for IntegrateOfficialSources {
    const NAME: &'static str = "integrate_official_sources";
    const FRAGMENT: FragmentKind = FragmentKind::OfficialSources;
    const INPUT: SchemaSpec = KEYWORD_INPUT;
    const OUTPUT: SchemaSpec = SchemaSpec::new(
        "IntegrateOfficialSourcesOutput",
        "Trust signals for the webpage.",
        &[FieldSpec::html(
            FIELD,
            "Official sources",
            "HTML with links to official regulator, bank or government sources, a financial \
             information disclaimer and an author-bio snippet.",
        )],
    );
    const TEMPLATE: PromptTemplate = OFFICIAL_SOURCES;

    type Input = KeywordInput;
    type Output = OfficialSources;

    fn check_output(_input: &KeywordInput, output: &OfficialSources) -> Vec<FieldViolation> {
        let html = &output.sources_section;
        let mut violations = Vec::new();
        if count_tag(html, "a") == 0 {
            violations.push(FieldViolation::new(FIELD, "links to no sources"));
        }
        if count_tag(html, "h1") > 0 {
            violations.push(FieldViolation::new(FIELD, "must not contain an <h1>"));
        }
        violations
    }

    fn into_fragment(output: OfficialSources) -> String {
        output.sources_section
    }
}
