//! Vocal stage strategies: TTS tool, then procedural robotic voice.

use std::path::Path;

use crate::io::binary_available;
use crate::models::ArtifactKind;
use crate::orchestrator::errors::{StageError, StepResult};
use crate::orchestrator::types::Context;
use crate::synthesis::wav;

use super::chain::{ProviderChain, Strategy};

/// Fixed speaker used with multi-speaker TTS models.
const TTS_SPEAKER: &str = "p231";

/// Shells out to the configured text-to-speech tool.
pub struct TtsVocalsStrategy;

impl Strategy for TtsVocalsStrategy {
    fn name(&self) -> &str {
        "tts"
    }

    fn check_available(&self, ctx: &Context) -> Result<(), String> {
        let command = &ctx.settings.tools.vocals_command;
        let Some(program) = command.first() else {
            return Err("vocals command not configured".to_string());
        };
        if !binary_available(program) {
            return Err(format!("{} is not runnable", program));
        }
        Ok(())
    }

    fn generate(&self, ctx: &Context, output: &Path) -> StepResult<()> {
        let command = &ctx.settings.tools.vocals_command;
        let program = &command[0];

        let mut args: Vec<String> = command[1..].to_vec();
        args.extend([
            "--text".to_string(),
            ctx.request.lyrics.clone(),
            "--out_path".to_string(),
            output.display().to_string(),
            "--speaker_idx".to_string(),
            TTS_SPEAKER.to_string(),
            "--language_idx".to_string(),
            ctx.request.language.clone(),
        ]);

        ctx.runner
            .run(&ctx.logger, program, &args, "generate vocals with TTS")?;
        Ok(())
    }
}

/// Terminal strategy: carrier-tone voice shaped by the lyrics.
pub struct RoboticVoiceStrategy;

impl Strategy for RoboticVoiceStrategy {
    fn name(&self) -> &str {
        "robotic-voice"
    }

    fn check_available(&self, _ctx: &Context) -> Result<(), String> {
        Ok(())
    }

    fn generate(&self, ctx: &Context, output: &Path) -> StepResult<()> {
        wav::write_voice_wav(output, &ctx.request.lyrics, ctx.settings.audio.sample_rate)
            .map_err(|e| StageError::Generation {
                description: "writing robotic voice".to_string(),
                exit_code: None,
                stderr: e.to_string(),
            })
    }
}

/// Standard vocals chain: TTS first, robotic voice last.
pub fn vocals_chain() -> ProviderChain {
    ProviderChain::new("vocals", ArtifactKind::VocalsAudio)
        .with_strategy(TtsVocalsStrategy)
        .with_strategy(RoboticVoiceStrategy)
}
