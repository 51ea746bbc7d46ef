//! Render stage - renders the symbolic melody to audio.

use crate::models::ArtifactKind;
use crate::orchestrator::errors::StepResult;
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, JobState, StepOutcome};
use crate::providers::{render_chain, ProviderChain};

/// Renders the melody through the instrument bank.
///
/// Required stage: a missing soundfont exhausts the render chain and
/// aborts the job.
pub struct RenderStep {
    chain: ProviderChain,
}

impl RenderStep {
    pub fn new() -> Self {
        Self {
            chain: render_chain(),
        }
    }

    /// Use a custom provider chain.
    pub fn with_chain(chain: ProviderChain) -> Self {
        Self { chain }
    }
}

impl Default for RenderStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for RenderStep {
    fn name(&self) -> &str {
        "Render"
    }

    fn description(&self) -> &str {
        "Render melody through the instrument bank"
    }

    fn required_inputs(&self) -> &[ArtifactKind] {
        &[ArtifactKind::MelodyMidi]
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome> {
        let mut warnings = Vec::new();
        let outcome = self.chain.run(ctx, &mut warnings)?;
        state.warnings.extend(warnings);
        state.record_artifact(outcome.artifact);
        Ok(StepOutcome::Completed {
            engine: outcome.engine,
            fallback: outcome.fallback,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_step_requires_melody_midi() {
        let step = RenderStep::new();
        assert_eq!(step.required_inputs(), &[ArtifactKind::MelodyMidi]);
        assert!(!step.is_optional());
    }
}
