//! Texture stage - generates background audio keyed off the prompt.

use crate::orchestrator::errors::StepResult;
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, JobState, StepOutcome};
use crate::providers::{texture_chain, ProviderChain};

/// Generates the background texture through the texture provider chain.
pub struct TextureStep {
    chain: ProviderChain,
}

impl TextureStep {
    pub fn new() -> Self {
        Self {
            chain: texture_chain(),
        }
    }

    /// Use a custom provider chain.
    pub fn with_chain(chain: ProviderChain) -> Self {
        Self { chain }
    }
}

impl Default for TextureStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for TextureStep {
    fn name(&self) -> &str {
        "Texture"
    }

    fn description(&self) -> &str {
        "Generate background texture from the prompt"
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
    fn texture_step_is_required() {
        let step = TextureStep::new();
        assert_eq!(step.name(), "Texture");
        assert!(!step.is_optional());
    }
}
