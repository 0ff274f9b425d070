//! Call-to-action stage.

use crate::contracts::{FieldSpec, SchemaSpec, StageContract, KEYWORD_INPUT};
use crate::core::{FragmentKind, KeywordInput};
use crate::errors::FieldViolation;
use crate::html::count_tag;
use crate::prompts::{PromptTemplate, RELEVANT_CTAS};
use serde::{Deserialize, Serialize};
use std::fmt;

const FIELD: &str = "ctaSection";

const ACTIONS: &[&str] = &["check_rates", "use_calculator", "apply_now", "compare_offers"];

/// The most prominent action a CTA block drives toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryAction {
    /// "Check rates".
    CheckRates,
    /// "Use EMI calculator".
    UseCalculator,
    /// "Apply now".
    ApplyNow,
    /// "Compare offers".
    CompareOffers,
}

impl PrimaryAction {
    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CheckRates => "check_rates",
            Self::UseCalculator => "use_calculator",
            Self::ApplyNow => "apply_now",
            Self::CompareOffers => "compare_offers",
        }
    }
}

impl fmt::Display for PrimaryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of [`InsertRelevantCtas`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallsToAction {
    /// CTA block markup.
    pub cta_section: String,
    /// The headline action.
    pub primary_action: PrimaryAction,
}

/// Writes the call-to-action block.
#[derive(Debug, Clone, Copy, Default)]
pub struct InsertRelevantCtas;

impl StageContract for InsertRelevantCtas {
    const NAME: &'static str = "insert_relevant_ctas";
    const FRAGMENT: FragmentKind = FragmentKind::CallsToAction;
    const INPUT: SchemaSpec = KEYWORD_INPUT;
    const OUTPUT: SchemaSpec = SchemaSpec::new(
        "InsertRelevantCtasOutput",
        "Calls to action for the webpage.",
        &[
            FieldSpec::html(
                FIELD,
                "Calls to action",
                "HTML block of persuasive calls to action, each with a button-style link \
                 placeholder.",
            ),
            FieldSpec::one_of(
                "primaryAction",
                "Primary action",
                ACTIONS,
                "The most prominent call to action in the block.",
            ),
        ],
    );
    const TEMPLATE: PromptTemplate = RELEVANT_CTAS;

    type Input = KeywordInput;
    type Output = CallsToAction;

    fn check_output(_input: &KeywordInput, output: &CallsToAction) -> Vec<FieldViolation> {
        let html = &output.cta_section;
        if count_tag(html, "a") + count_tag(html, "button") == 0 {
            vec![FieldViolation::new(FIELD, "contains no link or button")]
        } else {
            Vec::new()
        }
    }

    fn into_fragment(output: CallsToAction) -> String {
        output.cta_section
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[test]
    fn test_action_names_match_schema() {
        for action in [
            PrimaryAction::CheckRates,
            PrimaryAction::UseCalculator,
            PrimaryAction::ApplyNow,
            PrimaryAction::CompareOffers,
        ] {
            assert!(ACTIONS.contains(&action.as_str()));
            assert_eq!(
                serde_json::to_value(action).unwrap(),
                serde_json::json!(action.as_str())
            );
        }
    }

    #[test]
    fn test_requires_actionable_element() {
        let input = fixtures::travel_cards_input();
        let ok = CallsToAction {
            cta_section: fixtures::CALLS_TO_ACTION.to_string(),
            primary_action: PrimaryAction::CompareOffers,
        };
        assert!(InsertRelevantCtas::check_output(&input, &ok).is_empty());

        let bare = CallsToAction {
            cta_section: "<p>Apply today!</p>".to_string(),
            primary_action: PrimaryAction::ApplyNow,
        };
        assert_eq!(InsertRelevantCtas::check_output(&input, &bare).len(), 1);
    }
}
