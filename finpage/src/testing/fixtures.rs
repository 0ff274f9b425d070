//! Valid stage outputs for `best credit cards for travel`.

use crate::contracts::StageContract;
use crate::core::KeywordInput;
use crate::stages::{
    GenerateFaqSection, GenerateLandingPage, InsertRelevantCtas, IntegrateOfficialSources,
    StructureFinancialContent,
};
use serde_json::{json, Value};

/// Primary keyword of the worked example.
pub const PRIMARY_KEYWORD: &str = "best credit cards for travel";
/// Secondary keywords of the worked example.
pub const SECONDARY_KEYWORDS: &str = "travel rewards, airline miles";

/// Page title for the example keywords.
pub const META_TITLE: &str = "Best Credit Cards for Travel in 2026: Top Picks Compared";

/// Meta description for the example keywords.
pub const META_DESCRIPTION: &str = "Compare the best credit cards for travel in 2026: earn travel rewards and airline miles, cut forex fees and find the right card for your trips.";

/// Main article.
pub const MAIN_CONTENT: &str = r#"<h1>Best Credit Cards for Travel in 2026</h1>
<p>Choosing among the best credit cards for travel comes down to how you earn travel rewards and how easily you can redeem airline miles.</p>
<!-- AD_SLOT_1 -->
<h2>How travel rewards work</h2>
<p>Most cards return points per rupee spent, with bonus categories for flights and hotels.</p>
<h3>Airline miles versus flexible points</h3>
<p>Co-branded cards earn airline miles directly; flexible points transfer to several partners.</p>
<table>
<tr><th>Card type</th><th>Typical reward rate</th></tr>
<tr><td>Co-branded airline</td><td>4 miles per 100 spent</td></tr>
<tr><td>Flexible points</td><td>2-5 points per 100 spent</td></tr>
</table>
<!-- AD_SLOT_2 -->
<h2>Fees and foreign transaction charges</h2>
<p>Compare the annual fee with the value of lounge access and the forex mark-up.</p>"#;

/// Official sources, disclaimer and author bio.
pub const OFFICIAL_SOURCES: &str = r#"<h2>Official sources</h2>
<ul>
<li><a href="https://www.rbi.org.in">Reserve Bank of India</a>: rules on card fees and billing.</li>
<li><a href="https://www.npci.org.in">NPCI</a>: RuPay network information.</li>
</ul>
<p><em>Disclaimer: this article is for general guidance. Rates and terms change; verify details with the card issuer.</em></p>
<p>Written by a certified financial planner with ten years of experience in consumer credit.</p>"#;

/// Call-to-action block.
pub const CALLS_TO_ACTION: &str = r##"<h2>Ready to pick a card?</h2>
<p>See which cards match your travel pattern. <a href="#cta-compare-offers" class="cta">Compare offers</a></p>
<p>Check eligibility without affecting your score. <a href="#cta-check-rates" class="cta">Check rates</a></p>"##;

/// FAQ pairs.
pub const FAQ_SECTION: &str = r"<dt>Which credit card is best for airline miles?</dt>
<dd>A co-branded airline card usually earns the most miles with that carrier.</dd>
<dt>Do travel credit cards charge forex fees?</dt>
<dd>Many do; premium travel cards often reduce the mark-up to around 2%.</dd>
<dt>Can I transfer travel rewards to partners?</dt>
<dd>Flexible points programs let you transfer to several airline and hotel partners.</dd>";

/// The example keyword input.
#[must_use]
pub fn travel_cards_input() -> KeywordInput {
    KeywordInput::new(PRIMARY_KEYWORD, SECONDARY_KEYWORDS)
}

/// A full page as the single-shot stage would return it.
#[must_use]
pub fn landing_page() -> String {
    [MAIN_CONTENT, OFFICIAL_SOURCES, FAQ_SECTION, CALLS_TO_ACTION].join("\n")
}

/// A valid payload for every built-in output schema, keyed by schema name.
#[must_use]
pub fn valid_outputs() -> Vec<(&'static str, Value)> {
    vec![
        (
            StructureFinancialContent::OUTPUT.name,
            json!({
                "webpageContent": MAIN_CONTENT,
                "metaTitle": META_TITLE,
                "metaDescription": META_DESCRIPTION,
            }),
        ),
        (
            IntegrateOfficialSources::OUTPUT.name,
            json!({ "sourcesSection": OFFICIAL_SOURCES }),
        ),
        (
            InsertRelevantCtas::OUTPUT.name,
            json!({ "ctaSection": CALLS_TO_ACTION, "primaryAction": "compare_offers" }),
        ),
        (
            GenerateFaqSection::OUTPUT.name,
            json!({ "faqSection": FAQ_SECTION }),
        ),
        (
            GenerateLandingPage::OUTPUT.name,
            json!({
                "webpageContent": landing_page(),
                "metaTitle": META_TITLE,
                "metaDescription": META_DESCRIPTION,
            }),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::check_well_formed;

    #[test]
    fn test_fixtures_conform_to_schemas() {
        let schemas = [
            StructureFinancialContent::OUTPUT,
            IntegrateOfficialSources::OUTPUT,
            InsertRelevantCtas::OUTPUT,
            GenerateFaqSection::OUTPUT,
            GenerateLandingPage::OUTPUT,
        ];
        for (schema, (name, payload)) in schemas.iter().zip(valid_outputs()) {
            assert_eq!(schema.name, name);
            assert!(schema.validate(&payload).is_ok(), "{name}");
        }
    }

    #[test]
    fn test_landing_page_is_well_formed() {
        assert_eq!(check_well_formed(&landing_page()), Ok(()));
    }
}
