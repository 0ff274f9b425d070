//! Pipeline building and execution.
//!
//! This module provides:
//! - Stage specifications, execution modes and strategies
//! - Pipeline builder with validation
//! - The composer that runs stages and assembles the document

mod builder;
mod composer;
mod spec;


pub use builder::{single_shot_pipeline, standard_pipeline, PipelineBuilder, TemplateOverrides};
pub use composer::WebpagePipeline;
pub use spec::{ExecutionMode, PipelineStrategy, StageSpec};
