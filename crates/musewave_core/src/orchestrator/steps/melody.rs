//! Melody stage - generates the symbolic melody.

use crate::orchestrator::errors::StepResult;
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, JobState, StepOutcome};
use crate::providers::{melody_chain, ProviderChain};

/// Generates the symbolic melody through the melody provider chain.
pub struct MelodyStep {
    chain: ProviderChain,
}

impl MelodyStep {
    pub fn new() -> Self {
        Self {
            chain: melody_chain(),
        }
    }

    /// Use a custom provider chain.
    pub fn with_chain(chain: ProviderChain) -> Self {
        Self { chain }
    }
}

impl Default for MelodyStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for MelodyStep {
    fn name(&self) -> &str {
        "Melody"
    }

    fn description(&self) -> &str {
        "Generate symbolic melody"
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
    fn melody_step_has_no_input_requirements() {
        let step = MelodyStep::new();
        assert_eq!(step.name(), "Melody");
        assert!(step.required_inputs().is_empty());
        assert!(!step.is_optional());
    }
}
