//! Per-stage and per-job result records.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::artifacts::{Artifact, ArtifactKind};

/// Outcome of one pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageOutcome {
    /// The first strategy in the stage's chain produced the artifact.
    OkPrimary,
    /// A fallback strategy produced the artifact.
    OkFallback,
    /// The stage did not run (missing inputs, or degraded failure on an
    /// optional stage).
    Skipped,
    /// The stage failed and aborted the job.
    Failed,
}

impl StageOutcome {
    /// Whether the stage produced its artifact.
    pub fn is_ok(&self) -> bool {
        matches!(self, StageOutcome::OkPrimary | StageOutcome::OkFallback)
    }
}

/// Record of one stage's execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageResult {
    pub stage: String,
    pub outcome: StageOutcome,
    /// Engine identifier that actually produced the artifact.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,
    /// Failure detail, also kept on degraded (skipped) optional stages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StageResult {
    /// Record a successful stage.
    pub fn ok(stage: impl Into<String>, engine: impl Into<String>, fallback: bool) -> Self {
        Self {
            stage: stage.into(),
            outcome: if fallback {
                StageOutcome::OkFallback
            } else {
                StageOutcome::OkPrimary
            },
            engine: Some(engine.into()),
            error: None,
        }
    }

    /// Record a skipped stage, keeping the error that caused a
    /// degradation if there was one.
    pub fn skipped(stage: impl Into<String>, error: Option<String>) -> Self {
        Self {
            stage: stage.into(),
            outcome: StageOutcome::Skipped,
            engine: None,
            error,
        }
    }

    /// Record a fatal stage failure.
    pub fn failed(stage: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            outcome: StageOutcome::Failed,
            engine: None,
            error: Some(error.into()),
        }
    }
}

/// Final result handed to the pipeline's caller.
///
/// Either a complete job with all artifact paths, or a failed job
/// carrying the stage it failed at and the stage results accumulated up
/// to that point. Never a partial silent success.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobOutcome {
    pub success: bool,
    pub job_id: String,
    pub output_dir: PathBuf,
    pub artifacts: Vec<Artifact>,
    pub stage_results: Vec<StageResult>,
    /// Non-fatal findings (format mismatches, probe failures).
    pub warnings: Vec<String>,
    /// Stage the job failed at, when `success` is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_stage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobOutcome {
    /// Look up an artifact by kind.
    pub fn artifact(&self, kind: ArtifactKind) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.kind == kind)
    }

    /// Path to the final mixed audio, if produced.
    pub fn audio_path(&self) -> Option<&PathBuf> {
        self.artifact(ArtifactKind::MixAudio).map(|a| &a.path)
    }

    /// Path to the final video, if produced.
    pub fn video_path(&self) -> Option<&PathBuf> {
        self.artifact(ArtifactKind::Video).map(|a| &a.path)
    }

    /// Result for a named stage.
    pub fn stage(&self, name: &str) -> Option<&StageResult> {
        self.stage_results.iter().find(|r| r.stage == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_outcome_tracks_fallback_flag() {
        let primary = StageResult::ok("Melody", "melody-bridge", false);
        assert_eq!(primary.outcome, StageOutcome::OkPrimary);

        let fallback = StageResult::ok("Melody", "progression-midi", true);
        assert_eq!(fallback.outcome, StageOutcome::OkFallback);
        assert!(fallback.outcome.is_ok());
    }

    #[test]
    fn skipped_keeps_degradation_error() {
        let result = StageResult::skipped("Vocals", Some("all providers failed".into()));
        assert_eq!(result.outcome, StageOutcome::Skipped);
        assert!(!result.outcome.is_ok());
        assert!(result.error.is_some());
    }

    #[test]
    fn outcome_finds_artifacts_by_kind() {
        let outcome = JobOutcome {
            success: true,
            job_id: "ab12cd34".into(),
            output_dir: PathBuf::from("/tmp/ab12cd34"),
            artifacts: vec![Artifact::new(
                ArtifactKind::MixAudio,
                "/tmp/ab12cd34/mix.wav",
                20_000,
            )],
            stage_results: Vec::new(),
            warnings: Vec::new(),
            failed_stage: None,
            error: None,
        };

        assert!(outcome.audio_path().is_some());
        assert!(outcome.video_path().is_none());
    }
}
