//! Stage trait and the built-in stage contracts.
//!
//! Every stage receives the original [`KeywordInput`] and contributes one
//! independent fragment; no stage reads another stage's output.

mod cta;
mod faq;
mod invoker;
mod landing;
mod result;
mod sources;
mod structure;

pub use cta::{CallsToAction, InsertRelevantCtas, PrimaryAction};
pub use faq::{FaqSection, GenerateFaqSection};
pub use invoker::StageInvoker;
pub use landing::{GenerateLandingPage, LandingPage};
pub use result::StageResult;
pub use sources::{IntegrateOfficialSources, OfficialSources};
pub use structure::{StructureFinancialContent, StructuredContent};

use crate::contracts::StageContract;
use crate::core::{Fragment, FragmentKind, KeywordInput, SeoMetadata, StageReport};
use crate::errors::{FinpageError, PipelineValidationError};
use crate::generation::GenerationCapability;
use crate::prompts::PromptTemplate;
use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

/// What a stage hands back to the composer.
#[derive(Debug, Clone)]
pub struct StageOutput {
    /// The validated fragment.
    pub fragment: Fragment,
    /// Invocation summary.
    pub report: StageReport,
    /// Title and meta description, from the stage that owns them.
    pub seo: Option<SeoMetadata>,
}

/// Trait for pipeline stages.
///
/// Object-safe so the composer can hold heterogeneous stages.
#[async_trait]
pub trait Stage: Send + Sync + Debug {
    /// Returns the name of the stage.
    fn name(&self) -> &str;

    /// Returns the fragment slot the stage fills.
    fn fragment(&self) -> FragmentKind;

    /// Runs the stage for the given keywords.
    async fn execute(&self, input: &KeywordInput) -> Result<StageOutput, FinpageError>;
}

/// Adapts a keyword-driven [`StageContract`] to [`Stage`].
pub struct ContractStage<C: StageContract<Input = KeywordInput>> {
    invoker: StageInvoker<C>,
}

impl<C: StageContract<Input = KeywordInput>> Debug for ContractStage<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContractStage")
            .field("invoker", &self.invoker)
            .finish()
    }
}

impl<C: StageContract<Input = KeywordInput>> Clone for ContractStage<C> {
    fn clone(&self) -> Self {
        Self {
            invoker: self.invoker.clone(),
        }
    }
}

impl<C: StageContract<Input = KeywordInput>> ContractStage<C> {
    /// Creates a stage using the contract's canonical template.
    #[must_use]
    pub fn new(capability: Arc<dyn GenerationCapability>) -> Self {
        Self {
            invoker: StageInvoker::new(capability),
        }
    }

    /// Creates a stage with an optional template override.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the override does not fit the contract.
    pub fn with_template(
        capability: Arc<dyn GenerationCapability>,
        template: Option<PromptTemplate>,
    ) -> Result<Self, PipelineValidationError> {
        let invoker = StageInvoker::new(capability);
        let invoker = match template {
            Some(template) => invoker.with_template(template)?,
            None => invoker,
        };
        Ok(Self { invoker })
    }

    /// The underlying invoker.
    #[must_use]
    pub fn invoker(&self) -> &StageInvoker<C> {
        &self.invoker
    }
}

#[async_trait]
impl<C: StageContract<Input = KeywordInput>> Stage for ContractStage<C> {
    fn name(&self) -> &str {
        C::NAME
    }

    fn fragment(&self) -> FragmentKind {
        C::FRAGMENT
    }

    async fn execute(&self, input: &KeywordInput) -> Result<StageOutput, FinpageError> {
        let result = self.invoker.invoke(input).await?;
        let report = result.report(C::FRAGMENT);
        let seo = C::seo_metadata(&result.value);
        let html = C::into_fragment(result.value);
        Ok(StageOutput {
            fragment: Fragment::new(C::FRAGMENT, C::NAME, html),
            report,
            seo,
        })
    }
}

#[cfg(test)]
mod invoker_tests;
