//! Pipeline step trait definition.
//!
//! Each stage implements this trait. Sequencing and fatality rules are
//! data: the pipeline reads `required_inputs` to gate execution and
//! `is_optional` to decide whether a failure aborts the job or degrades
//! the stage to skipped.

use crate::models::ArtifactKind;

use super::errors::StepResult;
use super::types::{Context, JobState, StepOutcome};

/// Trait for pipeline stages.
///
/// # Example
///
/// ```ignore
/// struct TextureStep { chain: ProviderChain }
///
/// impl PipelineStep for TextureStep {
///     fn name(&self) -> &str { "Texture" }
///
///     fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome> {
///         let mut warnings = Vec::new();
///         let outcome = self.chain.run(ctx, &mut warnings)?;
///         state.warnings.extend(warnings);
///         state.record_artifact(outcome.artifact);
///         Ok(StepOutcome::Completed { engine: outcome.engine, fallback: outcome.fallback })
///     }
/// }
/// ```
pub trait PipelineStep: Send + Sync {
    /// Get the stage name (for logging and stage results).
    fn name(&self) -> &str;

    /// Human-readable description of what this stage does.
    fn description(&self) -> &str {
        self.name()
    }

    /// Whether a failure degrades to skipped instead of aborting.
    ///
    /// Default is `false` (stage is required).
    fn is_optional(&self) -> bool {
        false
    }

    /// Artifacts that must exist before this stage can run.
    ///
    /// The pipeline checks these and fails the stage with
    /// `MissingInput` (or skips it, when optional) if any is absent.
    fn required_inputs(&self) -> &[ArtifactKind] {
        &[]
    }

    /// Execute the stage's work.
    ///
    /// Records produced artifacts and warnings in `state`. Returns
    /// `StepOutcome::Completed` with the engine used, or
    /// `StepOutcome::Skipped` when the stage decided not to run (not an
    /// error).
    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockStep {
        name: &'static str,
        should_skip: bool,
    }

    impl PipelineStep for MockStep {
        fn name(&self) -> &str {
            self.name
        }

        fn execute(&self, _ctx: &Context, _state: &mut JobState) -> StepResult<StepOutcome> {
            if self.should_skip {
                Ok(StepOutcome::Skipped("test skip".to_string()))
            } else {
                Ok(StepOutcome::Completed {
                    engine: "mock".to_string(),
                    fallback: false,
                })
            }
        }
    }

    #[test]
    fn step_trait_object_works() {
        let step: Box<dyn PipelineStep> = Box::new(MockStep {
            name: "TestStep",
            should_skip: false,
        });

        assert_eq!(step.name(), "TestStep");
        assert!(!step.is_optional());
        assert!(step.required_inputs().is_empty());
    }
}
