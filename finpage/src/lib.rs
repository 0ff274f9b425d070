//! # finpage
//!
//! Generates SEO-structured financial webpages from a primary keyword and a
//! list of secondary keywords.
//!
//! A run is a short pipeline of schema-validated generation stages:
//!
//! - **Stage contracts**: every stage declares its input and output schema,
//!   its prompt template and the fragment it fills
//! - **Stage invoker**: validates input, renders the prompt, calls the
//!   generation capability and validates the structured output
//! - **Pipeline composer**: runs the stages sequentially or concurrently and
//!   assembles the fragments in a fixed order
//! - **Entry facade**: folds every failure into a `{success, content, message}`
//!   outcome
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use finpage::prelude::*;
//!
//! let config = GeneratorConfig::load(Path::new("finpage.toml"))?;
//! let generator = WebpageGenerator::from_config(config)?;
//!
//! let outcome = generator
//!     .generate_webpage("best credit cards for travel", "travel rewards, airline miles")
//!     .await;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod config;
pub mod contracts;
pub mod core;
pub mod errors;
pub mod events;
pub mod facade;
pub mod generation;
pub mod html;
pub mod observability;
pub mod pipeline;
pub mod prompts;
pub mod stages;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{GeneratorConfig, PipelineConfig, PromptOverride, ProviderConfig};
    pub use crate::contracts::{ContractCatalog, SchemaSpec, StageContract};
    pub use crate::core::{
        Fragment, FragmentKind, GenerationOutcome, KeywordInput, StageReport, TokenUsage,
        WebpageDocument,
    };
    pub use crate::errors::{
        CapabilityError, ContractErrorInfo, ContractViolation, ErrorKind, FinpageError,
        OutputValidationError, PipelineValidationError,
    };
    pub use crate::events::{EventSink, LoggingEventSink, NoOpEventSink, PipelineEvent};
    pub use crate::facade::WebpageGenerator;
    #[cfg(feature = "http")]
    pub use crate::generation::OpenAiCompatibleClient;
    pub use crate::generation::{CompletionRequest, CompletionResponse, GenerationCapability};
    pub use crate::observability::{init_tracing, LogFormat};
    pub use crate::pipeline::{
        ExecutionMode, PipelineBuilder, PipelineStrategy, WebpagePipeline,
    };
    pub use crate::prompts::PromptTemplate;
    pub use crate::stages::{ContractStage, Stage};
}
