//! The single-call entry point used by callers outside the library.

use crate::config::GeneratorConfig;
use crate::contracts::{ContractCatalog, KEYWORD_INPUT};
use crate::core::{GenerationOutcome, KeywordInput, WebpageDocument};
use crate::errors::{
    codes, ContractErrorInfo, ContractViolation, ErrorKind, FinpageError, PipelineValidationError,
};
use crate::events::{EventSink, LoggingEventSink};
use crate::generation::GenerationCapability;
use crate::pipeline::{
    single_shot_pipeline, standard_pipeline, PipelineStrategy, TemplateOverrides, WebpagePipeline,
};
use std::sync::Arc;
use tracing::{error, info, warn};

const CAPABILITY_MESSAGE: &str =
    "The content service is unavailable right now. Please try again later.";
const OUTPUT_MESSAGE: &str =
    "The generated content did not pass validation. Please try again.";
const MISCONFIGURED_MESSAGE: &str = "The webpage generator is not configured correctly.";
const INPUT_MESSAGE: &str = "The keywords could not be used.";

/// Generates financial webpages from keywords.
///
/// Owns one validated pipeline; every call is an independent run.
#[derive(Debug)]
pub struct WebpageGenerator {
    config: GeneratorConfig,
    pipeline: WebpagePipeline,
}

impl WebpageGenerator {
    /// Creates a generator that reports pipeline events to the log.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration, the contract catalog or a
    /// template override is invalid.
    pub fn new(
        config: GeneratorConfig,
        capability: Arc<dyn GenerationCapability>,
    ) -> Result<Self, FinpageError> {
        Self::with_event_sink(config, capability, Arc::new(LoggingEventSink::default()))
    }

    /// Creates a generator with a custom event sink.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration, the contract catalog or a
    /// template override is invalid.
    pub fn with_event_sink(
        config: GeneratorConfig,
        capability: Arc<dyn GenerationCapability>,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self, FinpageError> {
        config.validate()?;
        Self::assemble(config, capability, sink)
    }

    fn assemble(
        config: GeneratorConfig,
        capability: Arc<dyn GenerationCapability>,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self, FinpageError> {
        let catalog = ContractCatalog::standard();
        catalog.validate()?;

        let mut overrides = TemplateOverrides::new();
        for stage in config.prompts.keys() {
            if catalog.lookup(stage).is_none() {
                return Err(PipelineValidationError::new(format!(
                    "Prompt override names unknown stage '{stage}'"
                ))
                .with_stages(vec![stage.clone()])
                .with_error_info(
                    ContractErrorInfo::new(codes::CONFIG, "Unknown stage in prompt overrides")
                        .with_fix_hint(format!("Known stages: {}", catalog.names().join(", "))),
                )
                .into());
            }
        }
        for name in catalog.names() {
            if let Some(template) = config.prompt_override(name)? {
                info!(
                    stage = name,
                    template_version = %template.version(),
                    template_fingerprint = %template.fingerprint(),
                    "Using prompt override"
                );
                overrides.insert(name.to_string(), template);
            }
        }

        let builder = match config.pipeline.strategy {
            PipelineStrategy::Staged => standard_pipeline(capability, &overrides)?,
            PipelineStrategy::SingleShot => single_shot_pipeline(capability, &overrides)?,
        };
        let pipeline = builder
            .with_mode(config.pipeline.execution)
            .with_event_sink(sink)
            .build()?;

        Ok(Self { config, pipeline })
    }

    /// Creates a generator backed by the OpenAI-compatible HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is missing, the client cannot be
    /// built, or the configuration is invalid.
    #[cfg(feature = "http")]
    pub fn from_config(config: GeneratorConfig) -> Result<Self, FinpageError> {
        config.validate()?;
        let api_key = config.resolve_api_key()?;
        let client = crate::generation::OpenAiCompatibleClient::new(&config.provider, api_key)?;
        Self::assemble(config, Arc::new(client), Arc::new(LoggingEventSink::default()))
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// The pipeline in use.
    #[must_use]
    pub fn pipeline(&self) -> &WebpagePipeline {
        &self.pipeline
    }

    /// Runs the pipeline and returns the document or the first error.
    ///
    /// # Errors
    ///
    /// Returns the first input, capability, validation or assembly error.
    pub async fn generate(&self, input: &KeywordInput) -> Result<WebpageDocument, FinpageError> {
        self.pipeline.run(input).await
    }

    /// Generates a webpage and folds any failure into the outcome.
    ///
    /// Never returns an error: callers get a success flag, the markup on
    /// success, and a short message. Error details go to the log only.
    pub async fn generate_webpage(
        &self,
        primary_keyword: &str,
        secondary_keywords: &str,
    ) -> GenerationOutcome {
        let input = KeywordInput::new(primary_keyword, secondary_keywords);
        match self.generate(&input).await {
            Ok(document) => GenerationOutcome::success(document.into_html()),
            Err(err) => {
                let info = err.error_info();
                match err.kind() {
                    ErrorKind::Misconfigured => error!(
                        code = %info.code,
                        error = %err,
                        "Webpage generation failed"
                    ),
                    _ => warn!(
                        code = %info.code,
                        stage = err.stage().unwrap_or("-"),
                        error = %err,
                        "Webpage generation failed"
                    ),
                }
                GenerationOutcome::failure(failure_message(&err))
            }
        }
    }
}

/// The user-facing summary of an error.
#[must_use]
pub fn failure_message(err: &FinpageError) -> String {
    match (err.kind(), err) {
        (ErrorKind::ContractViolation, FinpageError::ContractViolation(violation)) => {
            input_message(violation)
        }
        (ErrorKind::ContractViolation, _) => INPUT_MESSAGE.to_string(),
        (ErrorKind::CapabilityUnavailable, _) => CAPABILITY_MESSAGE.to_string(),
        (ErrorKind::OutputValidationFailed, _) => OUTPUT_MESSAGE.to_string(),
        (ErrorKind::Misconfigured, _) => MISCONFIGURED_MESSAGE.to_string(),
    }
}

fn input_message(violation: &ContractViolation) -> String {
    let Some(first) = violation.first() else {
        return INPUT_MESSAGE.to_string();
    };
    let Some(field) = KEYWORD_INPUT.field(&first.field) else {
        return INPUT_MESSAGE.to_string();
    };
    match first.message.as_str() {
        "is required" | "must not be empty" => format!("{} is required.", field.label),
        message => format!("{} {message}.", field.label),
    }
}
