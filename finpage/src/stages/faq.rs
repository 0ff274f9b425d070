//! FAQ stage.

use crate::contracts::{FieldSpec, SchemaSpec, StageContract, KEYWORD_INPUT};
use crate::core::{FragmentKind, KeywordInput};
use crate::errors::FieldViolation;
use crate::html::inspect_faq;
use crate::prompts::{PromptTemplate, FAQ_SECTION};
use serde::{Deserialize, Serialize};

const FIELD: &str = "faqSection";

/// Output of [`GenerateFaqSection`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaqSection {
    /// Bare `<dt>`/`<dd>` pairs.
    pub faq_section: String,
}

/// Writes 3-5 question/answer pairs.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenerateFaqSection;

impl StageContract for GenerateFaqSection {
    const NAME: &'static str = "generate_faq_section";
    const FRAGMENT: FragmentKind = FragmentKind::Faq;
    const INPUT: SchemaSpec = KEYWORD_INPUT;
    const OUTPUT: SchemaSpec = SchemaSpec::new(
        "GenerateFaqSectionOutput",
        "The FAQ block of the webpage.",
        &[FieldSpec::html(
            FIELD,
            "FAQ section",
            "The generated FAQ section in HTML format: each question in a <dt> tag followed \
             by its answer in a <dd> tag, with no enclosing <dl> tag.",
        )],
    );
    const TEMPLATE: PromptTemplate = FAQ_SECTION;

    type Input = KeywordInput;
    type Output = FaqSection;

    fn check_output(_input: &KeywordInput, output: &FaqSection) -> Vec<FieldViolation> {
        inspect_faq(&output.faq_section)
            .violations
            .into_iter()
            .map(|problem| FieldViolation::new(FIELD, problem))
            .collect()
    }

    fn into_fragment(output: FaqSection) -> String {
        output.faq_section
    }
}
