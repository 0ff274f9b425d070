//! Runs a validated set of stages and assembles the document.

use super::{ExecutionMode, StageSpec};
use crate::contracts::KEYWORD_INPUT;
use crate::core::{Fragment, KeywordInput, StageReport, WebpageDocument};
use crate::errors::{ContractViolation, FieldViolation, FinpageError};
use crate::events::{EventSink, PipelineEvent};
use crate::observability::SpanTimer;
use crate::stages::StageOutput;
use futures::stream::{FuturesUnordered, StreamExt};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

/// A built pipeline. Create one with [`super::PipelineBuilder`].
///
/// Stages never see each other's output, so a run is free to schedule them in
/// any order; the document is always assembled in fragment order.
pub struct WebpagePipeline {
    name: String,
    stages: Vec<StageSpec>,
    mode: ExecutionMode,
    sink: Arc<dyn EventSink>,
}

impl fmt::Debug for WebpagePipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebpagePipeline")
            .field("name", &self.name)
            .field("stages", &self.stage_names())
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl WebpagePipeline {
    pub(super) fn new(
        name: String,
        stages: Vec<StageSpec>,
        mode: ExecutionMode,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            name,
            stages,
            mode,
            sink,
        }
    }

    /// Returns the pipeline name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the execution mode.
    #[must_use]
    pub const fn mode(&self) -> ExecutionMode {
        self.mode
    }

    /// Returns the stage names in assembly order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name.as_str()).collect()
    }

    /// Returns the number of stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Returns true if the pipeline has no stages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Generates a document for one keyword set.
    ///
    /// The keywords are checked once before any stage runs, so bad input never
    /// reaches the capability. The first stage failure aborts the run and no
    /// partial document is produced.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by input validation, a stage, or
    /// assembly.
    pub async fn run(&self, input: &KeywordInput) -> Result<WebpageDocument, FinpageError> {
        let run_id = Uuid::now_v7();
        let span = info_span!("pipeline", pipeline = %self.name, %run_id, mode = %self.mode);
        self.run_inner(run_id, input).instrument(span).await
    }

    async fn run_inner(
        &self,
        run_id: Uuid,
        input: &KeywordInput,
    ) -> Result<WebpageDocument, FinpageError> {
        let timer = SpanTimer::start(self.name.clone());
        self.sink.emit(&PipelineEvent::PipelineStarted {
            run_id,
            pipeline: self.name.clone(),
            stages: self.stages.iter().map(|s| s.name.clone()).collect(),
            execution: self.mode.to_string(),
        });
        info!(stages = self.stages.len(), "Pipeline started");

        if let Err(err) = self.check_input(input) {
            return Err(self.fail(run_id, &timer, err));
        }

        let outputs = match self.mode {
            ExecutionMode::Sequential => self.run_sequential(run_id, input).await,
            ExecutionMode::Concurrent => self.run_concurrent(run_id, input).await,
        };
        let outputs = match outputs {
            Ok(outputs) => outputs,
            Err(err) => return Err(self.fail(run_id, &timer, err)),
        };

        let mut seo = None;
        let mut fragments: Vec<Fragment> = Vec::with_capacity(outputs.len());
        let mut reports: Vec<StageReport> = Vec::with_capacity(outputs.len());
        for output in outputs {
            seo = seo.or(output.seo);
            fragments.push(output.fragment);
            reports.push(output.report);
        }
        reports.sort_by_key(|r| r.fragment);

        let document = match WebpageDocument::assemble(run_id, fragments, reports) {
            Ok(document) => document,
            Err(err) => return Err(self.fail(run_id, &timer, err)),
        };
        let document = match seo {
            Some(seo) => document.with_seo(seo),
            None => document,
        };

        let duration_ms = timer.elapsed_ms();
        self.sink.emit(&PipelineEvent::PipelineCompleted {
            run_id,
            duration_ms,
            fragments: document.fragments().len(),
            total_tokens: document.usage().total(),
        });
        info!(
            duration_ms,
            fragments = document.fragments().len(),
            total_tokens = document.usage().total(),
            "Pipeline completed"
        );
        Ok(document)
    }

    fn check_input(&self, input: &KeywordInput) -> Result<(), FinpageError> {
        let value = serde_json::to_value(input).map_err(|e| {
            ContractViolation::new(&self.name, vec![FieldViolation::new("$", e.to_string())])
        })?;
        KEYWORD_INPUT
            .validate(&value)
            .map_err(|violations| ContractViolation::new(&self.name, violations))?;
        Ok(())
    }

    async fn run_sequential(
        &self,
        run_id: Uuid,
        input: &KeywordInput,
    ) -> Result<Vec<StageOutput>, FinpageError> {
        let mut outputs = Vec::with_capacity(self.stages.len());
        for spec in &self.stages {
            outputs.push(self.run_stage(run_id, spec, input).await?);
        }
        Ok(outputs)
    }

    async fn run_concurrent(
        &self,
        run_id: Uuid,
        input: &KeywordInput,
    ) -> Result<Vec<StageOutput>, FinpageError> {
        let mut pending: FuturesUnordered<_> = self
            .stages
            .iter()
            .map(|spec| self.run_stage(run_id, spec, input))
            .collect();

        let mut outputs = Vec::with_capacity(self.stages.len());
        while let Some(result) = pending.next().await {
            match result {
                Ok(output) => outputs.push(output),
                Err(err) => {
                    if !pending.is_empty() {
                        debug!(abandoned = pending.len(), "Dropping in-flight stages");
                    }
                    return Err(err);
                }
            }
        }
        Ok(outputs)
    }

    async fn run_stage(
        &self,
        run_id: Uuid,
        spec: &StageSpec,
        input: &KeywordInput,
    ) -> Result<StageOutput, FinpageError> {
        let timer = SpanTimer::start(spec.name.clone());
        self.sink.emit(&PipelineEvent::StageStarted {
            run_id,
            stage: spec.name.clone(),
        });

        let result = spec
            .runner
            .execute(input)
            .instrument(info_span!("stage", stage = %spec.name))
            .await;
        let duration_ms = timer.elapsed_ms();

        match &result {
            Ok(output) => {
                self.sink.emit(&PipelineEvent::StageCompleted {
                    run_id,
                    stage: spec.name.clone(),
                    duration_ms,
                    template_version: output.report.template_version.clone(),
                    total_tokens: output.report.usage.total(),
                });
                debug!(stage = %spec.name, duration_ms, "Stage completed");
            }
            Err(err) => {
                self.sink.emit(&PipelineEvent::StageFailed {
                    run_id,
                    stage: spec.name.clone(),
                    duration_ms,
                    error: err.error_info(),
                });
                warn!(stage = %spec.name, kind = %err.kind(), error = %err, "Stage failed");
            }
        }
        result
    }

    fn fail(&self, run_id: Uuid, timer: &SpanTimer, err: FinpageError) -> FinpageError {
        let duration_ms = timer.elapsed_ms();
        let stage = err
            .stage()
            .filter(|stage| self.stages.iter().any(|s| s.name == *stage))
            .map(str::to_string);
        self.sink.emit(&PipelineEvent::PipelineFailed {
            run_id,
            stage: stage.clone(),
            duration_ms,
            error: err.error_info(),
        });
        warn!(
            stage = stage.as_deref().unwrap_or("-"),
            kind = %err.kind(),
            duration_ms,
            error = %err,
            "Pipeline failed"
        );
        err
    }
}
