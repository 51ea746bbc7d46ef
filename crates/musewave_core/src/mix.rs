//! Stem mixing.
//!
//! Collects whichever audio stems the job produced and builds an
//! N-input ffmpeg mix graph sized to the stem count. The arity always
//! equals the number of stems present at mix time, and mixing with zero
//! stems is an error: those two rules are load-bearing.

use std::path::{Path, PathBuf};

use crate::config::AudioSettings;
use crate::models::{Artifact, ArtifactKind};
use crate::orchestrator::errors::{StageError, StepResult};
use crate::orchestrator::types::{Context, JobState};
use crate::validation::ValidationGate;

/// Stems in mix input order.
pub const STEM_ORDER: [ArtifactKind; 3] = [
    ArtifactKind::TextureAudio,
    ArtifactKind::MelodyAudio,
    ArtifactKind::VocalsAudio,
];

/// Collect the stems present in the job state, in mix order.
pub fn collect_stems(state: &JobState) -> Vec<&Artifact> {
    STEM_ORDER
        .iter()
        .filter_map(|kind| state.artifact(*kind))
        .collect()
}

/// Mix filter graph for the given stem count: equal-weight combination,
/// limiting, resample to the target rate, and a small gain lift.
pub fn build_filter(stem_count: usize, sample_rate: u32) -> String {
    format!(
        "amix=inputs={}:normalize=0,alimiter,aresample={},volume=1.2",
        stem_count, sample_rate
    )
}

/// Full ffmpeg argument vector for mixing the given stems.
pub fn build_args(stems: &[&Path], output: &Path, audio: &AudioSettings) -> Vec<String> {
    let mut args = vec!["-y".to_string()];
    for stem in stems {
        args.push("-i".to_string());
        args.push(stem.display().to_string());
    }
    args.extend([
        "-filter_complex".to_string(),
        build_filter(stems.len(), audio.sample_rate),
        "-ar".to_string(),
        audio.sample_rate.to_string(),
        "-ac".to_string(),
        audio.channels.to_string(),
        output.display().to_string(),
    ]);
    args
}

/// Mixes available stems into the final audio track.
pub struct Mixer;

impl Mixer {
    /// Mix all available stems into the mix artifact.
    ///
    /// Fails with `NoStems` when the job produced no audio stem at all.
    pub fn mix(
        &self,
        ctx: &Context,
        state: &JobState,
        warnings: &mut Vec<String>,
    ) -> StepResult<(Artifact, usize)> {
        let stems = collect_stems(state);
        if stems.is_empty() {
            return Err(StageError::NoStems);
        }

        ctx.logger
            .info(&format!("Mixing {} audio stems:", stems.len()));
        for stem in &stems {
            ctx.logger.info(&format!("  - {}", stem.path.display()));
        }

        let paths: Vec<&Path> = stems.iter().map(|a| a.path.as_path()).collect();
        let output: PathBuf = ctx.artifact_path(ArtifactKind::MixAudio);
        let args = build_args(&paths, &output, &ctx.settings.audio);

        ctx.runner.run(
            &ctx.logger,
            &ctx.settings.tools.ffmpeg,
            &args,
            "mix audio stems",
        )?;

        let gate = ValidationGate::from_settings(&ctx.settings);
        let artifact = gate.validate(ArtifactKind::MixAudio, &output, warnings)?;
        Ok((artifact, stems.len()))
    }
}
