//! Main article stage.

use crate::contracts::{FieldSpec, SchemaSpec, StageContract, KEYWORD_INPUT};
use crate::core::{FragmentKind, KeywordInput, SeoMetadata};
use crate::errors::FieldViolation;
use crate::html::{ad_slots, count_tag, first_heading};
use crate::prompts::{PromptTemplate, STRUCTURED_CONTENT};
use serde::{Deserialize, Serialize};

const FIELD: &str = "webpageContent";

/// Output field holding the page title.
pub(crate) const META_TITLE_FIELD: &str = "metaTitle";
/// Output field holding the meta description.
pub(crate) const META_DESCRIPTION_FIELD: &str = "metaDescription";

/// Schema for the page title shared by the main-content and landing outputs.
pub(crate) const META_TITLE: FieldSpec = FieldSpec::text(
    META_TITLE_FIELD,
    "Meta title",
    10,
    Some(70),
    "Plain-text <title> for the page, starting with the primary keyword.",
);

/// Schema for the meta description shared by the main-content and landing outputs.
pub(crate) const META_DESCRIPTION: FieldSpec = FieldSpec::text(
    META_DESCRIPTION_FIELD,
    "Meta description",
    50,
    Some(160),
    "Plain-text meta description mentioning the primary and secondary keywords.",
);

const STOPWORDS: &[&str] = &["best", "from", "what", "when", "where", "which", "with", "your"];

/// Output of [`StructureFinancialContent`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredContent {
    /// The main article markup.
    pub webpage_content: String,
    /// Page title.
    pub meta_title: String,
    /// Meta description.
    pub meta_description: String,
}

/// Writes the keyword-sniped main article with ad-slot markers.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructureFinancialContent;

impl StageContract for StructureFinancialContent {
    const NAME: &'static str = "structure_financial_content";
    const FRAGMENT: FragmentKind = FragmentKind::MainContent;
    const INPUT: SchemaSpec = KEYWORD_INPUT;
    const OUTPUT: SchemaSpec = SchemaSpec::new(
        "StructureFinancialContentOutput",
        "The structured main article of the webpage.",
        &[
            FieldSpec::html(
                FIELD,
                "Main content",
                "The structured HTML content of the webpage, including headings, paragraphs, \
                 lists, tables and <!-- AD_SLOT_n --> markers. No FAQ, CTA or disclaimer.",
            ),
            META_TITLE,
            META_DESCRIPTION,
        ],
    );
    const TEMPLATE: PromptTemplate = STRUCTURED_CONTENT;

    type Input = KeywordInput;
    type Output = StructuredContent;

    fn check_output(input: &KeywordInput, output: &StructuredContent) -> Vec<FieldViolation> {
        let html = &output.webpage_content;
        let mut violations = check_headline(FIELD, html, &input.primary_keyword);
        violations.extend(check_seo(input, &output.meta_title, &output.meta_description));

        if ad_slots(html).is_empty() {
            violations.push(FieldViolation::new(FIELD, "contains no <!-- AD_SLOT_n --> marker"));
        }
        if count_tag(html, "dt") + count_tag(html, "dd") > 0 {
            violations.push(FieldViolation::new(
                FIELD,
                "contains FAQ markup, which belongs to a later stage",
            ));
        }
        violations
    }

    fn seo_metadata(output: &StructuredContent) -> Option<SeoMetadata> {
        Some(SeoMetadata::new(&output.meta_title, &output.meta_description))
    }

    fn into_fragment(output: StructuredContent) -> String {
        output.webpage_content
    }
}

/// Checks that the first heading is an `<h1>` naming the primary keyword.
pub(crate) fn check_headline(field: &str, html: &str, primary_keyword: &str) -> Vec<FieldViolation> {
    match first_heading(html) {
        None => vec![FieldViolation::new(field, "has no headings")],
        Some(heading) if heading.level != 1 => vec![FieldViolation::new(
            field,
            format!("first heading is <h{}>, expected <h1>", heading.level),
        )],
        Some(heading) if !mentions_keyword(&heading.text, primary_keyword) => {
            vec![FieldViolation::new(
                field,
                format!("<h1> '{}' does not mention '{primary_keyword}'", heading.text),
            )]
        }
        Some(_) => Vec::new(),
    }
}

/// Checks that the title names the primary keyword and the description names
/// the primary keyword and at least one secondary keyword.
pub(crate) fn check_seo(
    input: &KeywordInput,
    title: &str,
    description: &str,
) -> Vec<FieldViolation> {
    let mut violations = Vec::new();
    if !mentions_keyword(title, &input.primary_keyword) {
        violations.push(FieldViolation::new(
            META_TITLE_FIELD,
            format!("'{title}' does not mention '{}'", input.primary_keyword),
        ));
    }
    if !mentions_keyword(description, &input.primary_keyword) {
        violations.push(FieldViolation::new(
            META_DESCRIPTION_FIELD,
            format!("does not mention '{}'", input.primary_keyword),
        ));
    }
    let secondary = input.secondary_list();
    if !secondary.is_empty() && !secondary.iter().any(|kw| mentions_keyword(description, kw)) {
        violations.push(FieldViolation::new(
            META_DESCRIPTION_FIELD,
            "mentions none of the secondary keywords",
        ));
    }
    violations
}

/// True if the text contains every distinctive word of the keyword.
///
/// A trailing plural `s` is optional. Falls back to the whole phrase when the
/// keyword has no distinctive words.
fn mentions_keyword(text: &str, keyword: &str) -> bool {
    let text = text.to_lowercase();
    let keyword = keyword.to_lowercase();
    let terms: Vec<&str> = keyword
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= 4 && !STOPWORDS.contains(w))
        .collect();

    if terms.is_empty() {
        return text.contains(keyword.trim());
    }
    terms
        .iter()
        .all(|term| text.contains(term.strip_suffix('s').unwrap_or(term)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    fn check(html: &str) -> Vec<FieldViolation> {
        StructureFinancialContent::check_output(
            &fixtures::travel_cards_input(),
            &StructuredContent {
                webpage_content: html.to_string(),
                meta_title: fixtures::META_TITLE.to_string(),
                meta_description: fixtures::META_DESCRIPTION.to_string(),
            },
        )
    }

    #[test]
    fn test_fixture_passes() {
        assert!(check(fixtures::MAIN_CONTENT).is_empty());
    }

    #[test]
    fn test_requires_h1_first() {
        let violations = check("<h2>Credit cards</h2><p>x</p><!-- AD_SLOT_1 -->");
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("expected <h1>"));
    }

    #[test]
    fn test_requires_keyword_in_h1() {
        let violations = check("<h1>Savings accounts</h1><!-- AD_SLOT_1 -->");
        assert!(violations[0].message.contains("does not mention"));
    }

    #[test]
    fn test_requires_ad_slot() {
        let violations = check("<h1>Top Travel Credit Cards</h1><p>Body</p>");
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("AD_SLOT"));
    }

    #[test]
    fn test_rejects_faq_markup() {
        let violations =
            check("<h1>Travel Credit Cards</h1><!-- AD_SLOT_1 --><dt>Q?</dt><dd>A.</dd>");
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("FAQ"));
    }

    #[test]
    fn test_requires_every_keyword_term_in_h1() {
        let violations = check("<h1>Travel Insurance Guide</h1><!-- AD_SLOT_1 -->");
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("does not mention"));
    }

    #[test]
    fn test_mentions_keyword() {
        let keyword = "best credit cards for travel";
        assert!(mentions_keyword("Best Credit Cards for Travel in 2026", keyword));
        assert!(mentions_keyword("Top Travel Credit Card Picks", keyword));
        assert!(!mentions_keyword("The 7 Best Credit Cards of 2026", keyword));
        assert!(!mentions_keyword("Travel Insurance Guide", keyword));
        assert!(mentions_keyword("Your EMI guide", "EMI"));
        assert!(!mentions_keyword("Loan guide", "EMI"));
    }

    #[test]
    fn test_seo_checks() {
        let input = fixtures::travel_cards_input();
        assert!(check_seo(&input, fixtures::META_TITLE, fixtures::META_DESCRIPTION).is_empty());

        let violations = check_seo(
            &input,
            "Travel Insurance Guide 2026",
            "Everything about credit cards and how they work for everyday spending.",
        );
        let fields: Vec<&str> = violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec![META_TITLE_FIELD, META_DESCRIPTION_FIELD, META_DESCRIPTION_FIELD]);
        assert!(violations[2].message.contains("secondary"));
    }

    #[test]
    fn test_meta_fields_are_bounded() {
        let payload = serde_json::json!({
            "webpageContent": fixtures::MAIN_CONTENT,
            "metaTitle": "x".repeat(71),
            "metaDescription": "too short",
        });
        let violations = StructureFinancialContent::OUTPUT.validate(&payload).unwrap_err();
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].field, "metaTitle");
        assert_eq!(violations[0].message, "must be at most 70 characters");
        assert_eq!(violations[1].field, "metaDescription");
        assert_eq!(violations[1].message, "must be at least 50 characters");
    }

    #[test]
    fn test_seo_metadata_from_output() {
        let output = StructuredContent {
            webpage_content: fixtures::MAIN_CONTENT.to_string(),
            meta_title: fixtures::META_TITLE.to_string(),
            meta_description: fixtures::META_DESCRIPTION.to_string(),
        };
        let seo = StructureFinancialContent::seo_metadata(&output).unwrap();
        assert_eq!(seo.title, fixtures::META_TITLE);
    }
}
