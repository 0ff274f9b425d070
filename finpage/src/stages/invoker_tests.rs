use super::*;
use crate::core::TokenUsage;
use crate::errors::{CapabilityError, ErrorKind};
use crate::generation::{CompletionResponse, MockGenerationCapability};
use crate::testing::{fixtures, ScriptedCapability};
use pretty_assertions::assert_eq;
use serde_json::json;

fn faq_invoker(capability: impl GenerationCapability + 'static) -> StageInvoker<GenerateFaqSection> {
    StageInvoker::new(Arc::new(capability))
}

#[tokio::test]
async fn test_invalid_input_makes_no_call() {
    let mut mock = MockGenerationCapability::new();
    mock.expect_complete().times(0);
    let invoker = faq_invoker(mock);

    let err = invoker
        .invoke(&KeywordInput::new("", "travel rewards"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ContractViolation);
    assert_eq!(err.stage(), Some("generate_faq_section"));
    match err {
        FinpageError::ContractViolation(violation) => {
            assert_eq!(violation.violations.len(), 1);
            assert_eq!(violation.violations[0].field, "primaryKeyword");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_request_carries_prompt_and_schema() {
    let mut mock = MockGenerationCapability::new();
    mock.expect_complete()
        .times(1)
        .withf(|req| {
            req.stage == "generate_faq_section"
                && req.schema_name == "GenerateFaqSectionOutput"
                && req.prompt.contains("\"best credit cards for travel\"")
                && req.prompt.contains("travel rewards, airline miles")
                && req.schema["required"] == json!(["faqSection"])
        })
        .returning(|_| {
            Ok(CompletionResponse::new(
                json!({ "faqSection": fixtures::FAQ_SECTION }),
                "gemini-2.0-flash",
                "mock",
            )
            .with_usage(TokenUsage::new(10, 20)))
        });

    let result = faq_invoker(mock)
        .invoke(&fixtures::travel_cards_input())
        .await
        .unwrap();

    assert_eq!(result.stage, "generate_faq_section");
    assert_eq!(result.value.faq_section, fixtures::FAQ_SECTION);
    assert_eq!(result.model, "gemini-2.0-flash");
    assert_eq!(result.usage.total(), 30);
    assert_eq!(result.template_version, "v1");
    assert_eq!(result.template_fingerprint, GenerateFaqSection::TEMPLATE.fingerprint());
    assert!(result.ended_at >= result.started_at);
}

#[tokio::test]
async fn test_capability_failure_names_stage() {
    let capability = ScriptedCapability::new().with_failure(
        "GenerateFaqSectionOutput",
        CapabilityError::new("scripted", "quota exhausted").with_status(429),
    );
    let err = faq_invoker(capability)
        .invoke(&fixtures::travel_cards_input())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::CapabilityUnavailable);
    assert_eq!(err.stage(), Some("generate_faq_section"));
    assert_eq!(err.error_info().context.get("status"), Some(&"429".to_string()));
}

#[tokio::test]
async fn test_missing_output_field_rejected() {
    let capability = ScriptedCapability::new()
        .with_output("GenerateFaqSectionOutput", json!({ "faq": fixtures::FAQ_SECTION }));
    let err = faq_invoker(capability)
        .invoke(&fixtures::travel_cards_input())
        .await
        .unwrap_err();

    match err {
        FinpageError::OutputValidationFailed(rejected) => {
            assert_eq!(rejected.schema, "GenerateFaqSectionOutput");
            let fields: Vec<&str> = rejected.violations.iter().map(|v| v.field.as_str()).collect();
            assert_eq!(fields, vec!["faqSection", "faq"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_plain_text_output_rejected() {
    let capability = ScriptedCapability::new()
        .with_output("GenerateFaqSectionOutput", json!("Here is your FAQ!"));
    let err = faq_invoker(capability)
        .invoke(&fixtures::travel_cards_input())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OutputValidationFailed);
}

#[tokio::test]
async fn test_semantic_check_rejects_short_faq() {
    let capability = ScriptedCapability::new().with_output(
        "GenerateFaqSectionOutput",
        json!({ "faqSection": "<dt>One?</dt><dd>Yes.</dd>" }),
    );
    let err = faq_invoker(capability)
        .invoke(&fixtures::travel_cards_input())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OutputValidationFailed);
    assert!(err.to_string().contains("found 1"));
}

#[tokio::test]
async fn test_enum_field_rejected_outside_set() {
    let capability = ScriptedCapability::new().with_output(
        "InsertRelevantCtasOutput",
        json!({ "ctaSection": fixtures::CALLS_TO_ACTION, "primaryAction": "buy_now" }),
    );
    let invoker: StageInvoker<InsertRelevantCtas> = StageInvoker::new(Arc::new(capability));
    let err = invoker
        .invoke(&fixtures::travel_cards_input())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("primaryAction"));
}

#[tokio::test]
async fn test_template_override_is_used() {
    let capability = Arc::new(ScriptedCapability::with_valid_outputs());
    let template = PromptTemplate::custom(
        "generate_faq_section",
        "v2",
        "FAQ about {{primaryKeyword}} only, 3-5 <dt>/<dd> pairs.",
    );
    let invoker = StageInvoker::<GenerateFaqSection>::new(capability.clone())
        .with_template(template.clone())
        .unwrap();

    let result = invoker.invoke(&fixtures::travel_cards_input()).await.unwrap();
    assert_eq!(result.template_version, "v2");
    assert_eq!(result.template_fingerprint, template.fingerprint());
    assert_eq!(
        capability.requests()[0].prompt,
        "FAQ about best credit cards for travel only, 3-5 <dt>/<dd> pairs."
    );
}

#[test]
fn test_render_does_not_call() {
    let capability = Arc::new(ScriptedCapability::new());
    let invoker = StageInvoker::<StructureFinancialContent>::new(capability.clone());
    let prompt = invoker.render(&fixtures::travel_cards_input()).unwrap();
    assert!(prompt.contains("Target the primary keyword: \"best credit cards for travel\""));
    assert!(!prompt.contains("{{"));
    assert_eq!(capability.call_count(), 0);
}
