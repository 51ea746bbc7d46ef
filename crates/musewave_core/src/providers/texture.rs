//! Texture stage strategies: diffusion bridge, ffmpeg pad, procedural pad.

use std::path::Path;

use crate::io::binary_available;
use crate::models::ArtifactKind;
use crate::orchestrator::errors::{StageError, StepResult};
use crate::orchestrator::types::Context;
use crate::synthesis::wav;

use super::chain::{ProviderChain, Strategy};

/// Shells out to the configured texture diffusion bridge.
///
/// The bridge contract: `<command> --prompt <text> --duration <secs>
/// --output <path>` writes a WAV file and exits zero.
pub struct TextureBridgeStrategy;

impl Strategy for TextureBridgeStrategy {
    fn name(&self) -> &str {
        "texture-bridge"
    }

    fn check_available(&self, ctx: &Context) -> Result<(), String> {
        let command = &ctx.settings.tools.texture_command;
        let Some(program) = command.first() else {
            return Err("texture bridge command not configured".to_string());
        };
        if !binary_available(program) {
            return Err(format!("{} is not runnable", program));
        }
        Ok(())
    }

    fn generate(&self, ctx: &Context, output: &Path) -> StepResult<()> {
        let command = &ctx.settings.tools.texture_command;
        let program = &command[0];

        let mut args: Vec<String> = command[1..].to_vec();
        args.extend([
            "--prompt".to_string(),
            ctx.request.prompt.clone(),
            "--duration".to_string(),
            ctx.settings.audio.duration_secs.to_string(),
            "--output".to_string(),
            output.display().to_string(),
        ]);

        ctx.runner.run(
            &ctx.logger,
            program,
            &args,
            "generate texture with diffusion bridge",
        )?;
        Ok(())
    }
}

/// Warm layered-sine pad rendered by ffmpeg's lavfi source.
pub struct LavfiPadStrategy;

impl Strategy for LavfiPadStrategy {
    fn name(&self) -> &str {
        "lavfi-pad"
    }

    fn check_available(&self, ctx: &Context) -> Result<(), String> {
        if !binary_available(&ctx.settings.tools.ffmpeg) {
            return Err(format!("{} is not runnable", ctx.settings.tools.ffmpeg));
        }
        Ok(())
    }

    fn generate(&self, ctx: &Context, output: &Path) -> StepResult<()> {
        let duration = ctx.settings.audio.duration_secs;
        let sample_rate = ctx.settings.audio.sample_rate;

        // Three detuned sines mixed into a slow warm pad.
        let filter = format!(
            "[0][1][2]amix=inputs=3:normalize=0,volume=0.3,asetrate={rate}*0.99,aresample={rate}",
            rate = sample_rate
        );

        let mut args: Vec<String> = vec!["-y".to_string()];
        for freq in ["220", "329.63", "440"] {
            args.extend([
                "-f".to_string(),
                "lavfi".to_string(),
                "-i".to_string(),
                format!("sine=frequency={}:duration={}", freq, duration),
            ]);
        }
        args.extend([
            "-filter_complex".to_string(),
            filter,
            "-ar".to_string(),
            sample_rate.to_string(),
            "-ac".to_string(),
            ctx.settings.audio.channels.to_string(),
            output.display().to_string(),
        ]);

        ctx.runner.run(
            &ctx.logger,
            &ctx.settings.tools.ffmpeg,
            &args,
            "generate fallback texture",
        )?;
        Ok(())
    }
}

/// Dependency-free terminal strategy: procedural pad written in-process.
pub struct ProceduralPadStrategy;

impl Strategy for ProceduralPadStrategy {
    fn name(&self) -> &str {
        "procedural-pad"
    }

    fn check_available(&self, _ctx: &Context) -> Result<(), String> {
        Ok(())
    }

    fn generate(&self, ctx: &Context, output: &Path) -> StepResult<()> {
        wav::write_pad_wav(
            output,
            &ctx.request.prompt,
            ctx.settings.audio.duration_secs,
            ctx.settings.audio.sample_rate,
            ctx.settings.audio.channels as u16,
        )
        .map_err(|e| StageError::Generation {
            description: "writing procedural pad".to_string(),
            exit_code: None,
            stderr: e.to_string(),
        })
    }
}

/// Standard texture chain: bridge, ffmpeg pad, then procedural pad.
pub fn texture_chain() -> ProviderChain {
    ProviderChain::new("texture", ArtifactKind::TextureAudio)
        .with_strategy(TextureBridgeStrategy)
        .with_strategy(LavfiPadStrategy)
        .with_strategy(ProceduralPadStrategy)
}
