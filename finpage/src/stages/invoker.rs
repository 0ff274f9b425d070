//! Binds a stage contract to the generation capability.

use super::StageResult;
use crate::contracts::{ContractEntry, StageContract};
use crate::errors::{
    ContractViolation, FieldViolation, FinpageError, OutputValidationError,
    PipelineValidationError,
};
use crate::generation::{CompletionRequest, GenerationCapability};
use crate::observability::SpanTimer;
use crate::prompts::PromptTemplate;
use chrono::Utc;
use serde_json::{Map, Value};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, warn};

/// Invokes one stage: validate input, render, call, validate output.
pub struct StageInvoker<C: StageContract> {
    capability: Arc<dyn GenerationCapability>,
    template: PromptTemplate,
    fingerprint: String,
    _contract: PhantomData<fn() -> C>,
}

impl<C: StageContract> fmt::Debug for StageInvoker<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageInvoker")
            .field("stage", &C::NAME)
            .field("template_version", &self.template.version())
            .field("fingerprint", &self.fingerprint)
            .finish_non_exhaustive()
    }
}

impl<C: StageContract> Clone for StageInvoker<C> {
    fn clone(&self) -> Self {
        Self {
            capability: Arc::clone(&self.capability),
            template: self.template.clone(),
            fingerprint: self.fingerprint.clone(),
            _contract: PhantomData,
        }
    }
}

impl<C: StageContract> StageInvoker<C> {
    /// Creates an invoker using the contract's canonical template.
    #[must_use]
    pub fn new(capability: Arc<dyn GenerationCapability>) -> Self {
        let template = C::TEMPLATE;
        Self {
            capability,
            fingerprint: template.fingerprint(),
            template,
            _contract: PhantomData,
        }
    }

    /// Replaces the template after checking it against the input schema.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the template is blank or names a field
    /// the input schema does not declare.
    pub fn with_template(mut self, template: PromptTemplate) -> Result<Self, PipelineValidationError> {
        ContractEntry::of::<C>().check_template(&template)?;
        self.fingerprint = template.fingerprint();
        self.template = template;
        Ok(self)
    }

    /// The template in use.
    #[must_use]
    pub fn template(&self) -> &PromptTemplate {
        &self.template
    }

    /// Checks an input against the contract's input schema.
    ///
    /// # Errors
    ///
    /// Returns `ContractViolation` listing every offending field.
    pub fn validate_input(input: &C::Input) -> Result<Map<String, Value>, ContractViolation> {
        let value = serde_json::to_value(input).map_err(|e| {
            ContractViolation::new(C::NAME, vec![FieldViolation::new("$", e.to_string())])
        })?;
        C::INPUT
            .validate(&value)
            .map_err(|violations| ContractViolation::new(C::NAME, violations))?;
        match value {
            Value::Object(fields) => Ok(fields),
            _ => Err(ContractViolation::new(
                C::NAME,
                vec![FieldViolation::new("$", "expected an object")],
            )),
        }
    }

    /// Renders the prompt for an input without calling the capability.
    ///
    /// # Errors
    ///
    /// Returns `ContractViolation` for bad input or `Template` if rendering
    /// fails.
    pub fn render(&self, input: &C::Input) -> Result<String, FinpageError> {
        let fields = Self::validate_input(input)?;
        Ok(self.template.render(&fields)?)
    }

    /// Runs the stage.
    ///
    /// Makes exactly one capability call when the input is valid and none
    /// otherwise.
    ///
    /// # Errors
    ///
    /// - `ContractViolation` if the input fails the input schema
    /// - `CapabilityUnavailable` if the capability call fails
    /// - `OutputValidationFailed` if the response breaks the output schema or
    ///   a semantic check
    pub async fn invoke(&self, input: &C::Input) -> Result<StageResult<C::Output>, FinpageError> {
        let prompt = self.render(input)?;
        let request = CompletionRequest {
            stage: C::NAME.to_string(),
            prompt,
            schema_name: C::OUTPUT.name.to_string(),
            schema: C::OUTPUT.to_json_schema(),
        };

        debug!(
            stage = C::NAME,
            template_version = %self.template.version(),
            template_fingerprint = %self.fingerprint,
            "Invoking generation capability"
        );

        let started_at = Utc::now();
        let timer = SpanTimer::start(C::NAME);
        let response = self
            .capability
            .complete(request)
            .await
            .map_err(|e| e.for_stage(C::NAME))?;

        let reject = |violations: Vec<FieldViolation>| {
            warn!(
                stage = C::NAME,
                schema = C::OUTPUT.name,
                violations = violations.len(),
                "Capability output rejected"
            );
            OutputValidationError::new(C::NAME, C::OUTPUT.name, violations)
        };

        C::OUTPUT.validate(&response.output).map_err(reject)?;
        let output: C::Output = serde_json::from_value(response.output)
            .map_err(|e| reject(vec![FieldViolation::new("$", e.to_string())]))?;

        let semantic = C::check_output(input, &output);
        if !semantic.is_empty() {
            return Err(reject(semantic).into());
        }

        debug!(
            stage = C::NAME,
            model = %response.model,
            duration_ms = timer.elapsed_ms(),
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "Stage output accepted"
        );

        Ok(StageResult {
            stage: C::NAME.to_string(),
            value: output,
            model: response.model,
            provider: response.provider,
            usage: response.usage,
            started_at,
            ended_at: Utc::now(),
            template_version: self.template.version().to_string(),
            template_fingerprint: self.fingerprint.clone(),
        })
    }
}
