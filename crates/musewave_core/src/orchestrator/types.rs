//! Core types for the generation pipeline.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::io::CommandRunner;
use crate::logging::JobLogger;
use crate::models::{Artifact, ArtifactKind, JobRequest, StageResult};

/// Progress callback type for reporting pipeline progress.
///
/// Arguments: (stage_name, percent_complete, message)
pub type ProgressCallback = Box<dyn Fn(&str, u32, &str) + Send + Sync>;

/// Read-only context passed to pipeline steps.
///
/// Carries the job's inputs and shared resources that steps can read
/// but not modify. Mutable state goes in `JobState`.
pub struct Context {
    /// Job inputs (prompt, lyrics, language, style).
    pub request: JobRequest,
    /// Application settings.
    pub settings: Settings,
    /// Job identifier.
    pub job_id: String,
    /// Output directory for this job's artifacts.
    pub output_dir: PathBuf,
    /// Per-job logger.
    pub logger: Arc<JobLogger>,
    /// External command runner with the configured timeout.
    pub runner: CommandRunner,
    /// Optional progress callback.
    progress_callback: Option<ProgressCallback>,
}

impl Context {
    /// Create a new context for a job.
    pub fn new(
        request: JobRequest,
        settings: Settings,
        job_id: impl Into<String>,
        output_dir: PathBuf,
        logger: Arc<JobLogger>,
    ) -> Self {
        let runner = CommandRunner::new(settings.tools.timeout_secs);
        Self {
            request,
            settings,
            job_id: job_id.into(),
            output_dir,
            logger,
            runner,
            progress_callback: None,
        }
    }

    /// Set the progress callback.
    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Report progress to the callback (if set).
    pub fn report_progress(&self, stage_name: &str, percent: u32, message: &str) {
        if let Some(ref callback) = self.progress_callback {
            callback(stage_name, percent, message);
        }
    }

    /// Fixed path of an artifact inside this job's output directory.
    pub fn artifact_path(&self, kind: ArtifactKind) -> PathBuf {
        self.output_dir.join(kind.file_name())
    }
}

/// Mutable job state that accumulates results from pipeline stages.
///
/// Steps add artifacts and stage results as they complete; nothing is
/// overwritten. The state is immutable once the pipeline returns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobState {
    /// Unique job identifier.
    pub job_id: String,
    /// When the job started.
    pub started_at: Option<String>,
    /// Validated artifacts, keyed by kind.
    artifacts: BTreeMap<ArtifactKind, Artifact>,
    /// Per-stage results in execution order.
    pub stage_results: Vec<StageResult>,
    /// Non-fatal findings (format mismatches, probe failures).
    pub warnings: Vec<String>,
}

impl JobState {
    /// Create a new job state with the given ID.
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            started_at: Some(chrono::Local::now().to_rfc3339()),
            ..Default::default()
        }
    }

    /// Record a validated artifact.
    pub fn record_artifact(&mut self, artifact: Artifact) {
        self.artifacts.insert(artifact.kind, artifact);
    }

    /// Check whether an artifact kind has been produced.
    pub fn has_artifact(&self, kind: ArtifactKind) -> bool {
        self.artifacts.contains_key(&kind)
    }

    /// Look up a produced artifact.
    pub fn artifact(&self, kind: ArtifactKind) -> Option<&Artifact> {
        self.artifacts.get(&kind)
    }

    /// All produced artifacts in kind order.
    pub fn artifacts(&self) -> impl Iterator<Item = &Artifact> {
        self.artifacts.values()
    }

    /// Engine identifiers per completed stage, for the job descriptor.
    pub fn engines(&self) -> BTreeMap<String, String> {
        self.stage_results
            .iter()
            .filter_map(|r| {
                r.engine
                    .as_ref()
                    .map(|engine| (r.stage.clone(), engine.clone()))
            })
            .collect()
    }
}

/// Result of executing a pipeline step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Step produced its artifact.
    Completed {
        /// Engine identifier that produced the artifact.
        engine: String,
        /// Whether a fallback strategy (not the primary) produced it.
        fallback: bool,
    },
    /// Step was skipped (preconditions not met, but not an error).
    Skipped(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_state_tracks_artifacts() {
        let mut state = JobState::new("ab12cd34");
        assert!(!state.has_artifact(ArtifactKind::MixAudio));

        state.record_artifact(Artifact::new(
            ArtifactKind::MixAudio,
            "/tmp/ab12cd34/mix.wav",
            20_000,
        ));

        assert!(state.has_artifact(ArtifactKind::MixAudio));
        assert_eq!(state.artifacts().count(), 1);
    }

    #[test]
    fn job_state_serializes() {
        let state = JobState::new("ab12cd34");
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"job_id\":\"ab12cd34\""));
    }

    #[test]
    fn engines_map_skips_stages_without_one() {
        let mut state = JobState::new("ab12cd34");
        state
            .stage_results
            .push(StageResult::ok("Melody", "progression-midi", true));
        state.stage_results.push(StageResult::skipped("Vocals", None));

        let engines = state.engines();
        assert_eq!(engines.len(), 1);
        assert_eq!(engines.get("Melody").map(String::as_str), Some("progression-midi"));
    }
}
