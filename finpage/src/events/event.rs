//! Typed pipeline events.

use crate::errors::ContractErrorInfo;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A lifecycle event emitted by the pipeline composer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PipelineEvent {
    /// A run began.
    #[serde(rename = "pipeline.started")]
    PipelineStarted {
        /// Run identifier.
        run_id: Uuid,
        /// Pipeline name.
        pipeline: String,
        /// Stage names in assembly order.
        stages: Vec<String>,
        /// Execution mode.
        execution: String,
    },
    /// A stage was dispatched.
    #[serde(rename = "stage.started")]
    StageStarted {
        /// Run identifier.
        run_id: Uuid,
        /// Stage name.
        stage: String,
    },
    /// A stage produced a validated fragment.
    #[serde(rename = "stage.completed")]
    StageCompleted {
        /// Run identifier.
        run_id: Uuid,
        /// Stage name.
        stage: String,
        /// Stage duration.
        duration_ms: f64,
        /// Template version used.
        template_version: String,
        /// Tokens consumed.
        total_tokens: u64,
    },
    /// A stage failed.
    #[serde(rename = "stage.failed")]
    StageFailed {
        /// Run identifier.
        run_id: Uuid,
        /// Stage name.
        stage: String,
        /// Stage duration.
        duration_ms: f64,
        /// Failure details.
        error: ContractErrorInfo,
    },
    /// The document was assembled.
    #[serde(rename = "pipeline.completed")]
    PipelineCompleted {
        /// Run identifier.
        run_id: Uuid,
        /// Run duration.
        duration_ms: f64,
        /// Number of fragments assembled.
        fragments: usize,
        /// Tokens consumed across stages.
        total_tokens: u64,
    },
    /// The run was aborted.
    #[serde(rename = "pipeline.failed")]
    PipelineFailed {
        /// Run identifier.
        run_id: Uuid,
        /// The stage that failed first, if any.
        #[serde(skip_serializing_if = "Option::is_none")]
        stage: Option<String>,
        /// Run duration.
        duration_ms: f64,
        /// Failure details.
        error: ContractErrorInfo,
    },
}

impl PipelineEvent {
    /// Dotted event type (e.g., `stage.completed`).
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::PipelineStarted { .. } => "pipeline.started",
            Self::StageStarted { .. } => "stage.started",
            Self::StageCompleted { .. } => "stage.completed",
            Self::StageFailed { .. } => "stage.failed",
            Self::PipelineCompleted { .. } => "pipeline.completed",
            Self::PipelineFailed { .. } => "pipeline.failed",
        }
    }

    /// The run the event belongs to.
    #[must_use]
    pub const fn run_id(&self) -> Uuid {
        match self {
            Self::PipelineStarted { run_id, .. }
            | Self::StageStarted { run_id, .. }
            | Self::StageCompleted { run_id, .. }
            | Self::StageFailed { run_id, .. }
            | Self::PipelineCompleted { run_id, .. }
            | Self::PipelineFailed { run_id, .. } => *run_id,
        }
    }

    /// The stage the event concerns, if any.
    #[must_use]
    pub fn stage(&self) -> Option<&str> {
        match self {
            Self::StageStarted { stage, .. }
            | Self::StageCompleted { stage, .. }
            | Self::StageFailed { stage, .. } => Some(stage),
            Self::PipelineFailed { stage, .. } => stage.as_deref(),
            Self::PipelineStarted { .. } | Self::PipelineCompleted { .. } => None,
        }
    }

    /// Converts to a JSON payload.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
