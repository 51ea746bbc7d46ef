//! Mix stage - combines available stems into the final audio track.

use crate::mix::Mixer;
use crate::orchestrator::errors::StepResult;
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, JobState, StepOutcome};

/// Mixes whichever stems the earlier stages produced.
///
/// The mix graph arity follows the stem count; zero stems is fatal.
pub struct MixStep;

impl MixStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MixStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for MixStep {
    fn name(&self) -> &str {
        "Mix"
    }

    fn description(&self) -> &str {
        "Mix audio stems into the final track"
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome> {
        let mut warnings = Vec::new();
        let (artifact, stem_count) = Mixer.mix(ctx, state, &mut warnings)?;
        state.warnings.extend(warnings);
        state.record_artifact(artifact);
        Ok(StepOutcome::Completed {
            engine: format!("amix:{}", stem_count),
            fallback: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::logging::{JobLogger, LogConfig};
    use crate::models::JobRequest;
    use crate::orchestrator::errors::StageError;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn zero_stems_is_fatal() {
        let dir = TempDir::new().unwrap();
        let logger = JobLogger::new(
            "mix_test",
            dir.path().join("logs"),
            LogConfig::default(),
            None,
        )
        .unwrap();
        let ctx = Context::new(
            JobRequest::new("dreamy synthwave"),
            Settings::default(),
            "mix_test",
            dir.path().join("out"),
            Arc::new(logger),
        );
        let mut state = JobState::new("mix_test");

        let err = MixStep::new().execute(&ctx, &mut state).unwrap_err();
        assert!(matches!(err, StageError::NoStems));
    }
}
