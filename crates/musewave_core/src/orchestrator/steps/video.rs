//! Video stage - renders the visualizer from the mix.

use crate::models::ArtifactKind;
use crate::orchestrator::errors::StepResult;
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, JobState, StepOutcome};
use crate::video::VideoSynthesizer;

/// Renders the visualizer video for the requested style.
pub struct VideoStep;

impl VideoStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for VideoStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for VideoStep {
    fn name(&self) -> &str {
        "Video"
    }

    fn description(&self) -> &str {
        "Render visualizer video from the mix"
    }

    fn required_inputs(&self) -> &[ArtifactKind] {
        &[ArtifactKind::MixAudio]
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome> {
        let mut warnings = Vec::new();
        let artifact = VideoSynthesizer.render(ctx, state, &mut warnings)?;
        state.warnings.extend(warnings);
        state.record_artifact(artifact);
        Ok(StepOutcome::Completed {
            engine: format!("ffmpeg:{}", ctx.request.video_style),
            fallback: false,
        })
    }
}
