//! Vocals stage - optional, keyed off lyrics and language.

use crate::orchestrator::errors::StepResult;
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, JobState, StepOutcome};
use crate::providers::{vocals_chain, ProviderChain};

/// Synthesizes vocals when lyrics are present.
///
/// Optional stage: absent lyrics short-circuit to skipped before the
/// chain runs, and chain exhaustion degrades to skipped instead of
/// aborting the job.
pub struct VocalsStep {
    chain: ProviderChain,
}

impl VocalsStep {
    pub fn new() -> Self {
        Self {
            chain: vocals_chain(),
        }
    }

    /// Use a custom provider chain.
    pub fn with_chain(chain: ProviderChain) -> Self {
        Self { chain }
    }
}

impl Default for VocalsStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for VocalsStep {
    fn name(&self) -> &str {
        "Vocals"
    }

    fn description(&self) -> &str {
        "Synthesize vocals from lyrics"
    }

    fn is_optional(&self) -> bool {
        true
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome> {
        if !ctx.request.has_lyrics() {
            return Ok(StepOutcome::Skipped("no lyrics provided".to_string()));
        }

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
