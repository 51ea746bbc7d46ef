//! Melody stage strategies: external model bridge, then procedural MIDI.

use std::path::Path;

use crate::io::binary_available;
use crate::models::ArtifactKind;
use crate::orchestrator::errors::{StageError, StepResult};
use crate::orchestrator::types::Context;
use crate::synthesis::midi;

use super::chain::{ProviderChain, Strategy};

/// Tempo handed to both melody strategies.
const MELODY_BPM: u32 = 120;

/// Shells out to the configured melody model bridge.
///
/// The bridge contract: `<command> --duration <secs> --bpm <bpm>
/// --output <path>` writes a Standard MIDI File and exits zero.
pub struct MelodyBridgeStrategy;

impl Strategy for MelodyBridgeStrategy {
    fn name(&self) -> &str {
        "melody-bridge"
    }

    fn check_available(&self, ctx: &Context) -> Result<(), String> {
        let command = &ctx.settings.tools.melody_command;
        let Some(program) = command.first() else {
            return Err("melody bridge command not configured".to_string());
        };
        if !binary_available(program) {
            return Err(format!("{} is not runnable", program));
        }
        Ok(())
    }

    fn generate(&self, ctx: &Context, output: &Path) -> StepResult<()> {
        let command = &ctx.settings.tools.melody_command;
        let program = &command[0];

        let mut args: Vec<String> = command[1..].to_vec();
        args.extend([
            "--duration".to_string(),
            ctx.settings.audio.duration_secs.to_string(),
            "--bpm".to_string(),
            MELODY_BPM.to_string(),
            "--output".to_string(),
            output.display().to_string(),
        ]);

        ctx.runner
            .run(&ctx.logger, program, &args, "generate melody with bridge model")?;
        Ok(())
    }
}

/// Dependency-free terminal strategy: a fixed chord-progression MIDI
/// sequence written in-process.
pub struct ProgressionMidiStrategy;

impl Strategy for ProgressionMidiStrategy {
    fn name(&self) -> &str {
        "progression-midi"
    }

    fn check_available(&self, _ctx: &Context) -> Result<(), String> {
        Ok(())
    }

    fn generate(&self, ctx: &Context, output: &Path) -> StepResult<()> {
        midi::write_progression_midi(output, ctx.settings.audio.duration_secs, MELODY_BPM, "C")
            .map_err(|e| StageError::io("writing procedural MIDI", e))
    }
}

/// Standard melody chain: bridge model first, procedural MIDI last.
pub fn melody_chain() -> ProviderChain {
    ProviderChain::new("melody", ArtifactKind::MelodyMidi)
        .with_strategy(MelodyBridgeStrategy)
        .with_strategy(ProgressionMidiStrategy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_ends_with_dependency_free_strategy() {
        let chain = melody_chain();
        assert_eq!(chain.kind(), ArtifactKind::MelodyMidi);
        assert_eq!(
            chain.strategy_names(),
            vec!["melody-bridge", "progression-midi"]
        );
    }
}
