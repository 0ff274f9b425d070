//! Stage specifications and execution settings.

use crate::core::FragmentKind;
use crate::stages::Stage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// How the composer schedules stages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// One stage at a time, in assembly order; stop at the first failure.
    #[default]
    Sequential,
    /// All stages at once; the first failure drops the rest.
    Concurrent,
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sequential => write!(f, "sequential"),
            Self::Concurrent => write!(f, "concurrent"),
        }
    }
}

/// Which set of stages builds the page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStrategy {
    /// Four independent fragment stages.
    #[default]
    Staged,
    /// One full-page call.
    SingleShot,
}

impl fmt::Display for PipelineStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Staged => write!(f, "staged"),
            Self::SingleShot => write!(f, "single_shot"),
        }
    }
}

/// A stage registered with a pipeline.
#[derive(Debug, Clone)]
pub struct StageSpec {
    /// The unique name of the stage.
    pub name: String,
    /// The slot the stage fills.
    pub fragment: FragmentKind,
    /// The stage implementation.
    pub runner: Arc<dyn Stage>,
}

impl StageSpec {
    /// Captures a stage's name and fragment slot.
    #[must_use]
    pub fn new(runner: Arc<dyn Stage>) -> Self {
        Self {
            name: runner.name().to_string(),
            fragment: runner.fragment(),
            runner,
        }
    }
}
