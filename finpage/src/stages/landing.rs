//! Single-shot landing page stage.

use super::structure::{check_headline, check_seo, META_DESCRIPTION, META_TITLE};
use crate::contracts::{FieldSpec, SchemaSpec, StageContract, KEYWORD_INPUT};
use crate::core::{FragmentKind, KeywordInput, SeoMetadata};
use crate::errors::FieldViolation;
use crate::html::{ad_slots, count_tag, MAX_FAQ_PAIRS, MIN_FAQ_PAIRS};
use crate::prompts::{PromptTemplate, LANDING_PAGE};
use serde::{Deserialize, Serialize};

const FIELD: &str = "webpageContent";

/// Output of [`GenerateLandingPage`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LandingPage {
    /// The whole page body.
    pub webpage_content: String,
    /// Page title.
    pub meta_title: String,
    /// Meta description.
    pub meta_description: String,
}

/// Writes the whole page, FAQ and CTAs included, in one call.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenerateLandingPage;

impl StageContract for GenerateLandingPage {
    const NAME: &'static str = "generate_landing_page";
    const FRAGMENT: FragmentKind = FragmentKind::FullPage;
    const INPUT: SchemaSpec = KEYWORD_INPUT;
    const OUTPUT: SchemaSpec = SchemaSpec::new(
        "GenerateLandingPageOutput",
        "A complete financial webpage.",
        &[
            FieldSpec::html(
                FIELD,
                "Webpage content",
                "The complete HTML page body: article with ad slot markers, official sources, \
                 disclaimer, author bio, FAQ as <dt>/<dd> pairs and calls to action.",
            ),
            META_TITLE,
            META_DESCRIPTION,
        ],
    );
    const TEMPLATE: PromptTemplate = LANDING_PAGE;

    type Input = KeywordInput;
    type Output = LandingPage;

    fn check_output(input: &KeywordInput, output: &LandingPage) -> Vec<FieldViolation> {
        let html = &output.webpage_content;
        let mut violations = check_headline(FIELD, html, &input.primary_keyword);
        violations.extend(check_seo(input, &output.meta_title, &output.meta_description));

        if ad_slots(html).is_empty() {
            violations.push(FieldViolation::new(FIELD, "contains no <!-- AD_SLOT_n --> marker"));
        }

        let questions = count_tag(html, "dt");
        let answers = count_tag(html, "dd");
        if questions != answers {
            violations.push(FieldViolation::new(
                FIELD,
                format!("FAQ has {questions} questions but {answers} answers"),
            ));
        } else if !(MIN_FAQ_PAIRS..=MAX_FAQ_PAIRS).contains(&questions) {
            violations.push(FieldViolation::new(
                FIELD,
                format!("FAQ has {questions} pairs, expected {MIN_FAQ_PAIRS}-{MAX_FAQ_PAIRS}"),
            ));
        }
        if count_tag(html, "dl") > 0 {
            violations.push(FieldViolation::new(FIELD, "FAQ pairs must not be wrapped in <dl>"));
        }
        violations
    }

    fn seo_metadata(output: &LandingPage) -> Option<SeoMetadata> {
        Some(SeoMetadata::new(&output.meta_title, &output.meta_description))
    }

    fn into_fragment(output: LandingPage) -> String {
        output.webpage_content
    }
}
