//! Pipeline builder with validation.

use super::{ExecutionMode, StageSpec, WebpagePipeline};
use crate::core::{FragmentKind, KeywordInput};
use crate::errors::{codes, ContractErrorInfo, PipelineValidationError};
use crate::events::{EventSink, NoOpEventSink};
use crate::generation::GenerationCapability;
use crate::prompts::PromptTemplate;
use crate::stages::{
    ContractStage, GenerateFaqSection, GenerateLandingPage, InsertRelevantCtas,
    IntegrateOfficialSources, Stage, StructureFinancialContent,
};
use crate::contracts::StageContract;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Template replacements keyed by stage name.
pub type TemplateOverrides = HashMap<String, PromptTemplate>;

/// Builder for creating validated pipelines.
#[derive(Clone)]
pub struct PipelineBuilder {
    name: String,
    stages: Vec<StageSpec>,
    mode: ExecutionMode,
    sink: Arc<dyn EventSink>,
}

impl fmt::Debug for PipelineBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineBuilder")
            .field("name", &self.name)
            .field("stages", &self.stage_names())
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl PipelineBuilder {
    /// Creates a new pipeline builder.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stages: Vec::new(),
            mode: ExecutionMode::default(),
            sink: Arc::new(NoOpEventSink),
        }
    }

    /// Adds a stage to the pipeline.
    ///
    /// # Errors
    ///
    /// Returns an error if the stage name or fragment slot is already taken,
    /// or if a full-page stage would be mixed with fragment stages.
    pub fn stage(mut self, runner: Arc<dyn Stage>) -> Result<Self, PipelineValidationError> {
        self.add_stage_spec(StageSpec::new(runner))?;
        Ok(self)
    }

    /// Adds a stage with a specification.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails.
    pub fn add_stage_spec(&mut self, spec: StageSpec) -> Result<(), PipelineValidationError> {
        if spec.name.trim().is_empty() {
            return Err(PipelineValidationError::new("Stage name cannot be empty")
                .with_error_info(ContractErrorInfo::new(codes::EMPTY, "Unnamed stage")));
        }

        if let Some(existing) = self.stages.iter().find(|s| s.name == spec.name) {
            return Err(PipelineValidationError::new(format!(
                "Stage '{}' is already part of pipeline '{}'",
                spec.name, self.name
            ))
            .with_stages(vec![existing.name.clone()])
            .with_error_info(
                ContractErrorInfo::new(codes::DUPLICATE, "Duplicate stage name")
                    .with_fix_hint("Give every stage a unique name."),
            ));
        }

        if let Some(existing) = self.stages.iter().find(|s| s.fragment == spec.fragment) {
            return Err(PipelineValidationError::new(format!(
                "Stages '{}' and '{}' both produce the '{}' fragment",
                existing.name, spec.name, spec.fragment
            ))
            .with_stages(vec![existing.name.clone(), spec.name.clone()])
            .with_error_info(
                ContractErrorInfo::new(codes::DUPLICATE, "Duplicate fragment slot")
                    .with_context_entry("fragment", spec.fragment.slug()),
            ));
        }

        let full_page = |s: &StageSpec| s.fragment == FragmentKind::FullPage;
        if !self.stages.is_empty()
            && (full_page(&spec) || self.stages.iter().any(full_page))
        {
            return Err(PipelineValidationError::new(format!(
                "Stage '{}' cannot be combined with the other stages: a full-page stage must run alone",
                spec.name
            ))
            .with_stages(self.stage_names().into_iter().chain([spec.name.clone()]).collect())
            .with_error_info(
                ContractErrorInfo::new(codes::DUPLICATE, "Full page mixed with fragments")
                    .with_fix_hint("Use either the single-shot stage or the fragment stages."),
            ));
        }

        self.stages.push(spec);
        Ok(())
    }

    /// Sets the execution mode.
    #[must_use]
    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the event sink.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Returns the pipeline name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Returns the stage names in insertion order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<String> {
        self.stages.iter().map(|s| s.name.clone()).collect()
    }

    /// Builds the pipeline.
    ///
    /// # Errors
    ///
    /// Returns an error if the builder has no stages.
    pub fn build(mut self) -> Result<WebpagePipeline, PipelineValidationError> {
        if self.stages.is_empty() {
            return Err(PipelineValidationError::new("Pipeline has no stages").with_error_info(
                ContractErrorInfo::new(codes::EMPTY, "Cannot build an empty pipeline")
                    .with_fix_hint("Add at least one stage to the pipeline before building."),
            ));
        }

        self.stages.sort_by_key(|s| s.fragment);
        Ok(WebpagePipeline::new(self.name, self.stages, self.mode, self.sink))
    }
}

fn contract_stage<C: StageContract<Input = KeywordInput>>(
    capability: &Arc<dyn GenerationCapability>,
    overrides: &TemplateOverrides,
) -> Result<Arc<dyn Stage>, PipelineValidationError> {
    let stage = ContractStage::<C>::with_template(
        Arc::clone(capability),
        overrides.get(C::NAME).cloned(),
    )?;
    Ok(Arc::new(stage))
}

/// The four fragment stages: main content, official sources, CTAs, FAQ.
///
/// # Errors
///
/// Returns an error if a template override does not fit its stage.
pub fn standard_pipeline(
    capability: Arc<dyn GenerationCapability>,
    overrides: &TemplateOverrides,
) -> Result<PipelineBuilder, PipelineValidationError> {
    PipelineBuilder::new("financial-webpage")
        .stage(contract_stage::<StructureFinancialContent>(&capability, overrides)?)?
        .stage(contract_stage::<IntegrateOfficialSources>(&capability, overrides)?)?
        .stage(contract_stage::<InsertRelevantCtas>(&capability, overrides)?)?
        .stage(contract_stage::<GenerateFaqSection>(&capability, overrides)?)
}

/// A single full-page stage.
///
/// # Errors
///
/// Returns an error if a template override does not fit the stage.
pub fn single_shot_pipeline(
    capability: Arc<dyn GenerationCapability>,
    overrides: &TemplateOverrides,
) -> Result<PipelineBuilder, PipelineValidationError> {
    PipelineBuilder::new("financial-landing-page")
        .stage(contract_stage::<GenerateLandingPage>(&capability, overrides)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FinpageError;
    use crate::stages::StageOutput;
    use crate::testing::ScriptedCapability;
    use async_trait::async_trait;

    #[derive(Debug)]
    struct NamedStage {
        name: &'static str,
        fragment: FragmentKind,
    }

    #[async_trait]
    impl Stage for NamedStage {
        fn name(&self) -> &str {
            self.name
        }

        fn fragment(&self) -> FragmentKind {
            self.fragment
        }

        async fn execute(&self, _input: &KeywordInput) -> Result<StageOutput, FinpageError> {
            unreachable!("builder tests never run stages")
        }
    }

    fn named(name: &'static str, fragment: FragmentKind) -> Arc<dyn Stage> {
        Arc::new(NamedStage { name, fragment })
    }

    fn capability() -> Arc<dyn GenerationCapability> {
        Arc::new(ScriptedCapability::new())
    }

    #[test]
    fn test_builder_add_stage() {
        let builder = PipelineBuilder::new("test")
            .stage(named("faq", FragmentKind::Faq))
            .unwrap()
            .stage(named("main", FragmentKind::MainContent))
            .unwrap();
        assert_eq!(builder.name(), "test");
        assert_eq!(builder.stage_count(), 2);

        let pipeline = builder.build().unwrap();
        assert_eq!(pipeline.stage_names(), vec!["main", "faq"]);
    }

    #[test]
    fn test_builder_duplicate_name() {
        let err = PipelineBuilder::new("test")
            .stage(named("faq", FragmentKind::Faq))
            .unwrap()
            .stage(named("faq", FragmentKind::CallsToAction))
            .unwrap_err();
        assert_eq!(err.error_info.unwrap().code, codes::DUPLICATE);
        assert!(err.message.contains("already part of pipeline"));
    }

    #[test]
    fn test_builder_duplicate_fragment() {
        let err = PipelineBuilder::new("test")
            .stage(named("faq-a", FragmentKind::Faq))
            .unwrap()
            .stage(named("faq-b", FragmentKind::Faq))
            .unwrap_err();
        assert_eq!(err.stages, vec!["faq-a", "faq-b"]);
        assert!(err.message.contains("'faq' fragment"));
    }

    #[test]
    fn test_builder_rejects_full_page_mix() {
        let err = PipelineBuilder::new("test")
            .stage(named("main", FragmentKind::MainContent))
            .unwrap()
            .stage(named("page", FragmentKind::FullPage))
            .unwrap_err();
        assert!(err.message.contains("full-page stage must run alone"));

        assert!(PipelineBuilder::new("test")
            .stage(named("page", FragmentKind::FullPage))
            .unwrap()
            .stage(named("faq", FragmentKind::Faq))
            .is_err());
    }

    #[test]
    fn test_builder_empty_build() {
        let err = PipelineBuilder::new("test").build().unwrap_err();
        assert_eq!(err.error_info.unwrap().code, codes::EMPTY);
    }

    #[test]
    fn test_standard_pipeline_order() {
        let pipeline = standard_pipeline(capability(), &TemplateOverrides::new())
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(
            pipeline.stage_names(),
            vec![
                "structure_financial_content",
                "integrate_official_sources",
                "insert_relevant_ctas",
                "generate_faq_section",
            ]
        );
        assert_eq!(pipeline.mode(), ExecutionMode::Sequential);
    }

    #[test]
    fn test_single_shot_pipeline() {
        let pipeline = single_shot_pipeline(capability(), &TemplateOverrides::new())
            .unwrap()
            .with_mode(ExecutionMode::Concurrent)
            .build()
            .unwrap();
        assert_eq!(pipeline.stage_names(), vec!["generate_landing_page"]);
        assert_eq!(pipeline.mode(), ExecutionMode::Concurrent);
    }

    #[test]
    fn test_standard_pipeline_rejects_bad_override() {
        let mut overrides = TemplateOverrides::new();
        overrides.insert(
            "insert_relevant_ctas".to_string(),
            PromptTemplate::custom("insert_relevant_ctas", "v2", "CTAs for {{product}}"),
        );
        let err = standard_pipeline(capability(), &overrides).unwrap_err();
        assert_eq!(err.stages, vec!["insert_relevant_ctas"]);
    }
}
