//! Visualizer video synthesis.
//!
//! Renders the mixed audio into a video with one of three deterministic
//! visualization transforms. `-shortest` keeps the video track from
//! outliving the audio, so output duration equals mix duration.

use std::path::Path;

use crate::config::VideoSettings;
use crate::models::{Artifact, ArtifactKind, VideoStyle};
use crate::orchestrator::errors::{StageError, StepResult};
use crate::orchestrator::types::{Context, JobState};
use crate::validation::ValidationGate;

/// Visualization filter for a style at the given frame size.
pub fn style_filter(style: VideoStyle, width: u32, height: u32) -> String {
    match style {
        VideoStyle::Spectrum => format!(
            "showspectrum=s={}x{}:color=rainbow:legend=disabled",
            width, height
        ),
        VideoStyle::Waveform => {
            format!("showwaves=s={}x{}:mode=cline:colors=cyan", width, height)
        }
        VideoStyle::Volumeter => {
            format!("avectorscope=s={}x{}:zoom=1.5:draw=line", width, height)
        }
    }
}

/// Full ffmpeg argument vector for rendering the visualizer.
pub fn build_args(
    mix: &Path,
    output: &Path,
    style: VideoStyle,
    video: &VideoSettings,
) -> Vec<String> {
    vec![
        "-y".to_string(),
        "-i".to_string(),
        mix.display().to_string(),
        "-filter_complex".to_string(),
        style_filter(style, video.width, video.height),
        "-r".to_string(),
        video.fps.to_string(),
        "-pix_fmt".to_string(),
        "yuv420p".to_string(),
        "-c:v".to_string(),
        "libx264".to_string(),
        "-preset".to_string(),
        "medium".to_string(),
        "-crf".to_string(),
        "23".to_string(),
        "-shortest".to_string(),
        output.display().to_string(),
    ]
}

/// Renders the visualizer from the mix artifact.
pub struct VideoSynthesizer;

impl VideoSynthesizer {
    /// Render the video for the requested style.
    ///
    /// Requires the mix artifact to exist.
    pub fn render(
        &self,
        ctx: &Context,
        state: &JobState,
        warnings: &mut Vec<String>,
    ) -> StepResult<Artifact> {
        let Some(mix) = state.artifact(ArtifactKind::MixAudio) else {
            return Err(StageError::MissingInput {
                artifact: ArtifactKind::MixAudio,
            });
        };

        let style = ctx.request.video_style;
        let output = ctx.artifact_path(ArtifactKind::Video);
        let args = build_args(&mix.path, &output, style, &ctx.settings.video);

        ctx.logger
            .info(&format!("Rendering {} visualizer", style));
        ctx.runner.run(
            &ctx.logger,
            &ctx.settings.tools.ffmpeg,
            &args,
            "render video visualizer",
        )?;

        let gate = ValidationGate::from_settings(&ctx.settings);
        gate.validate(ArtifactKind::Video, &output, warnings)
    }
}
