//! Pipeline runner that executes stages in sequence.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::models::StageResult as StageRecord;

use super::errors::{PipelineError, PipelineResult, StageError};
use super::step::PipelineStep;
use super::types::{Context, JobState, StepOutcome};

/// Pipeline that runs a sequence of stages.
///
/// Stages run in order. Before each stage the pipeline checks for
/// cancellation and verifies the stage's required input artifacts
/// exist. A failure on a required stage aborts the job immediately; a
/// failure on an optional stage degrades it to skipped. Every stage
/// leaves a record in `JobState::stage_results`.
pub struct Pipeline {
    /// Stages to execute in order.
    steps: Vec<Box<dyn PipelineStep>>,
    /// Cancellation flag.
    cancelled: Arc<AtomicBool>,
}

impl Pipeline {
    /// Create a new empty pipeline.
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Add a stage to the pipeline.
    pub fn add_step<S: PipelineStep + 'static>(&mut self, step: S) -> &mut Self {
        self.steps.push(Box::new(step));
        self
    }

    /// Add a stage (builder pattern).
    pub fn with_step<S: PipelineStep + 'static>(mut self, step: S) -> Self {
        self.add_step(step);
        self
    }

    /// Get a cancellation handle.
    ///
    /// Call `cancel()` on the returned handle to stop the pipeline at
    /// the next stage boundary.
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            flag: Arc::clone(&self.cancelled),
        }
    }

    /// Share cancellation state with an externally created handle.
    pub fn set_cancel_handle(&mut self, handle: CancelHandle) {
        self.cancelled = handle.flag;
    }

    /// Check if the pipeline has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Run the pipeline with the given context and state.
    ///
    /// On success every required stage completed (optional stages may
    /// be skipped). On failure the state holds the stage results
    /// accumulated up to the failing stage.
    pub fn run(&self, ctx: &Context, state: &mut JobState) -> PipelineResult<()> {
        let total_steps = self.steps.len();

        for (i, step) in self.steps.iter().enumerate() {
            if self.is_cancelled() {
                ctx.logger
                    .warn(&format!("Pipeline cancelled before stage '{}'", step.name()));
                tracing::warn!(job_id = %ctx.job_id, stage = step.name(), "job cancelled");
                return Err(PipelineError::cancelled(&ctx.job_id));
            }

            let stage = step.name();
            ctx.logger.stage(stage);
            tracing::info!(job_id = %ctx.job_id, stage, "starting stage");

            let percent = ((i as f64 / total_steps as f64) * 100.0) as u32;
            ctx.report_progress(stage, percent, &format!("Starting {}", stage));
            ctx.logger.progress(percent);

            // Gate on required input artifacts.
            if let Some(missing) = step
                .required_inputs()
                .iter()
                .find(|kind| !state.has_artifact(**kind))
            {
                let err = StageError::MissingInput { artifact: *missing };
                if step.is_optional() {
                    ctx.logger
                        .info(&format!("{} skipped: {}", stage, err));
                    state
                        .stage_results
                        .push(StageRecord::skipped(stage, Some(err.to_string())));
                    continue;
                }
                ctx.logger.error(&err.to_string());
                state
                    .stage_results
                    .push(StageRecord::failed(stage, err.to_string()));
                return Err(PipelineError::stage_failed(&ctx.job_id, stage, err));
            }

            match step.execute(ctx, state) {
                Ok(StepOutcome::Completed { engine, fallback }) => {
                    ctx.logger
                        .success(&format!("{} completed via {}", stage, engine));
                    tracing::info!(
                        job_id = %ctx.job_id,
                        stage,
                        engine = %engine,
                        fallback,
                        "stage completed"
                    );
                    state
                        .stage_results
                        .push(StageRecord::ok(stage, engine, fallback));
                }
                Ok(StepOutcome::Skipped(reason)) => {
                    ctx.logger.info(&format!("{} skipped: {}", stage, reason));
                    tracing::info!(job_id = %ctx.job_id, stage, %reason, "stage skipped");
                    state.stage_results.push(StageRecord::skipped(stage, None));
                }
                Err(e) if step.is_optional() => {
                    // Optional stage failure degrades to skipped.
                    ctx.logger
                        .warn(&format!("{} failed, continuing without it: {}", stage, e));
                    tracing::warn!(
                        job_id = %ctx.job_id,
                        stage,
                        error = %e,
                        "optional stage degraded to skipped"
                    );
                    state
                        .stage_results
                        .push(StageRecord::skipped(stage, Some(e.to_string())));
                }
                Err(e) => {
                    ctx.logger.error(&format!("{} failed: {}", stage, e));
                    tracing::error!(job_id = %ctx.job_id, stage, error = %e, "stage failed");
                    state
                        .stage_results
                        .push(StageRecord::failed(stage, e.to_string()));
                    return Err(PipelineError::stage_failed(&ctx.job_id, stage, e));
                }
            }
        }

        ctx.report_progress("Complete", 100, "Pipeline finished");
        ctx.logger.progress(100);
        ctx.logger.success("Pipeline completed");
        tracing::info!(job_id = %ctx.job_id, "pipeline completed");

        Ok(())
    }

    /// Get the number of stages in the pipeline.
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Get stage names in order.
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle for cancelling a running pipeline.
#[derive(Clone)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl Default for CancelHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelHandle {
    /// Create a standalone handle, to be attached to a pipeline with
    /// `Pipeline::set_cancel_handle`.
    pub fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Cancel the pipeline.
    ///
    /// The pipeline will stop at the next stage boundary.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Check if cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
