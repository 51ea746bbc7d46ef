//! One-job driver: directory and logger setup, pipeline run, metadata.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use uuid::Uuid;

use crate::config::Settings;
use crate::logging::{JobLogger, LogCallback, LogConfig};
use crate::metadata::JobDescriptor;
use crate::models::{JobOutcome, JobRequest};

use super::errors::{PipelineError, PipelineResult};
use super::pipeline::CancelHandle;
use super::types::{Context, JobState, ProgressCallback};
use super::{create_standard_pipeline, Pipeline};

/// Optional overrides and hooks for a job run.
#[derive(Default)]
pub struct JobOptions {
    /// Job identifier override. Defaults to a fresh short token.
    pub job_id: Option<String>,
    /// Output directory override. Defaults to `<assets_root>/<job_id>`.
    pub output_dir: Option<PathBuf>,
    /// Receives each formatted log line.
    pub log_callback: Option<LogCallback>,
    /// Receives (stage, percent, message) progress updates.
    pub progress_callback: Option<ProgressCallback>,
    /// External cancellation handle, checked between stages.
    pub cancel: Option<CancelHandle>,
}

/// Generate an opaque short job identifier.
pub fn new_job_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

/// Run one job through the standard pipeline.
///
/// Returns `Ok` with a `JobOutcome` for both completed and failed jobs;
/// a failed outcome carries the failing stage and the stage results
/// accumulated up to it. `Err` is reserved for setup problems that
/// prevent the pipeline from starting at all.
pub fn run_job(
    request: JobRequest,
    settings: Settings,
    options: JobOptions,
) -> PipelineResult<JobOutcome> {
    run_job_with_pipeline(request, settings, options, build_pipeline)
}

/// Run one job with a caller-supplied pipeline builder.
///
/// External cancellation is wired into whatever pipeline the builder
/// returns.
pub fn run_job_with_pipeline(
    request: JobRequest,
    settings: Settings,
    options: JobOptions,
    build: impl FnOnce() -> Pipeline,
) -> PipelineResult<JobOutcome> {
    let job_id = options.job_id.unwrap_or_else(new_job_id);
    let output_dir = options
        .output_dir
        .unwrap_or_else(|| PathBuf::from(&settings.paths.assets_root).join(&job_id));

    fs::create_dir_all(&output_dir)
        .map_err(|e| PipelineError::setup_failed(&job_id, e.to_string()))?;

    let log_config = LogConfig::from(&settings.logging);
    let logger = JobLogger::new(
        &job_id,
        &settings.paths.logs_folder,
        log_config,
        options.log_callback,
    )
    .map_err(|e| PipelineError::setup_failed(&job_id, e.to_string()))?;

    let mut ctx = Context::new(request, settings, &job_id, output_dir, Arc::new(logger));
    if let Some(progress) = options.progress_callback {
        ctx = ctx.with_progress_callback(progress);
    }

    ctx.logger.info(&format!("Job {} starting", job_id));
    ctx.logger.info(&format!("Prompt: {}", ctx.request.prompt));
    ctx.logger
        .info(&format!("Output: {}", ctx.output_dir.display()));
    tracing::info!(
        job_id = %job_id,
        prompt = %ctx.request.prompt,
        style = %ctx.request.video_style,
        "job starting"
    );

    let mut pipeline = build();
    if let Some(cancel) = options.cancel {
        pipeline.set_cancel_handle(cancel);
    }

    let mut state = JobState::new(&job_id);

    match pipeline.run(&ctx, &mut state) {
        Ok(()) => {
            let descriptor = JobDescriptor::from_state(&ctx.request, &state, &ctx.output_dir);
            let descriptor_path = descriptor
                .write(&ctx.output_dir)
                .map_err(|e| PipelineError::setup_failed(&job_id, e.to_string()))?;
            ctx.logger
                .info(&format!("Descriptor written: {}", descriptor_path.display()));

            Ok(JobOutcome {
                success: true,
                job_id,
                output_dir: ctx.output_dir,
                artifacts: state.artifacts().cloned().collect(),
                stage_results: state.stage_results,
                warnings: state.warnings,
                failed_stage: None,
                error: None,
            })
        }
        Err(e) => {
            ctx.logger.error(&format!("Job failed: {}", e));
            Ok(JobOutcome {
                success: false,
                job_id,
                output_dir: ctx.output_dir,
                artifacts: state.artifacts().cloned().collect(),
                stage_results: state.stage_results,
                warnings: state.warnings,
                failed_stage: e.stage().map(|s| s.to_string()),
                error: Some(e.to_string()),
            })
        }
    }
}

fn build_pipeline() -> Pipeline {
    create_standard_pipeline()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_ids_are_short_and_unique() {
        let a = new_job_id();
        let b = new_job_id();
        assert_eq!(a.len(), 8);
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
