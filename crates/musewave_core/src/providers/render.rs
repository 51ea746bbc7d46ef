//! Melody-to-audio rendering through the instrument bank.
//!
//! This chain has no procedural fallback on purpose: rendering requires
//! the soundfont resource, and its absence must fail the job rather
//! than degrade it.

use std::path::Path;

use crate::io::binary_available;
use crate::models::ArtifactKind;
use crate::orchestrator::errors::StepResult;
use crate::orchestrator::types::Context;

use super::chain::{ProviderChain, Strategy};

/// Renders the symbolic melody to audio with fluidsynth.
pub struct FluidsynthStrategy;

impl Strategy for FluidsynthStrategy {
    fn name(&self) -> &str {
        "fluidsynth"
    }

    fn check_available(&self, ctx: &Context) -> Result<(), String> {
        let soundfont = Path::new(&ctx.settings.paths.soundfont);
        if !soundfont.exists() {
            return Err(format!("soundfont not found: {}", soundfont.display()));
        }
        if !binary_available(&ctx.settings.tools.fluidsynth) {
            return Err(format!(
                "{} is not runnable",
                ctx.settings.tools.fluidsynth
            ));
        }
        Ok(())
    }

    fn generate(&self, ctx: &Context, output: &Path) -> StepResult<()> {
        let midi_path = ctx.artifact_path(ArtifactKind::MelodyMidi);

        let args = vec![
            "-ni".to_string(),
            ctx.settings.paths.soundfont.clone(),
            midi_path.display().to_string(),
            "-F".to_string(),
            output.display().to_string(),
            "-r".to_string(),
            ctx.settings.audio.sample_rate.to_string(),
        ];

        ctx.runner.run(
            &ctx.logger,
            &ctx.settings.tools.fluidsynth,
            &args,
            "render melody to audio",
        )?;
        Ok(())
    }
}

/// Render chain: fluidsynth only.
pub fn render_chain() -> ProviderChain {
    ProviderChain::new("render", ArtifactKind::MelodyAudio).with_strategy(FluidsynthStrategy)
}
