//! Pipeline orchestrator for coordinating job execution.
//!
//! This module provides the infrastructure for running the generation
//! pipeline. Each job consists of a sequence of stages that gate on
//! earlier artifacts, execute a provider chain or component, and record
//! their results.
//!
//! # Architecture
//!
//! ```text
//! Pipeline
//!     ├── Stage: Melody    (required)
//!     ├── Stage: Render    (required, needs melody-midi)
//!     ├── Stage: Texture   (required)
//!     ├── Stage: Vocals    (optional, lyrics-gated)
//!     ├── Stage: Mix       (required, needs >= 1 stem)
//!     └── Stage: Video     (required, needs mix-audio)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use musewave_core::config::Settings;
//! use musewave_core::models::JobRequest;
//! use musewave_core::orchestrator::{run_job, JobOptions};
//!
//! let request = JobRequest::new("dreamy synthwave");
//! let outcome = run_job(request, Settings::default(), JobOptions::default())?;
//! println!("audio: {:?}", outcome.audio_path());
//! ```

pub mod errors;
mod job;
mod pipeline;
mod step;
pub mod steps;
pub mod types;

pub use errors::{PipelineError, PipelineResult, StageError};
pub use job::{new_job_id, run_job, run_job_with_pipeline, JobOptions};
pub use pipeline::{CancelHandle, Pipeline};
pub use step::PipelineStep;
pub use steps::{MelodyStep, MixStep, RenderStep, TextureStep, VideoStep, VocalsStep};
pub use types::{Context, JobState, ProgressCallback, StepOutcome};

/// Create the standard pipeline with all stages in the fixed order.
pub fn create_standard_pipeline() -> Pipeline {
    Pipeline::new()
        .with_step(MelodyStep::new())
        .with_step(RenderStep::new())
        .with_step(TextureStep::new())
        .with_step(VocalsStep::new())
        .with_step(MixStep::new())
        .with_step(VideoStep::new())
}
