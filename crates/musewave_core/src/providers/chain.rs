//! Ordered strategy list with automatic fallback.

use std::fs;
use std::path::Path;

use crate::models::{Artifact, ArtifactKind};
use crate::orchestrator::errors::{AttemptFailure, StageError, StepResult};
use crate::orchestrator::types::Context;
use crate::validation::ValidationGate;

/// One interchangeable generation strategy for a stage.
///
/// Each attempt is independent and leaves no partial artifact behind:
/// the chain removes a failed attempt's output file before moving on.
pub trait Strategy: Send + Sync {
    /// Engine identifier, recorded on the stage result.
    fn name(&self) -> &str;

    /// Probe whether this strategy's dependency is usable.
    ///
    /// Returns the reason it is not, which becomes the attempt record.
    fn check_available(&self, ctx: &Context) -> Result<(), String>;

    /// Generate the stage's artifact at the given output path.
    fn generate(&self, ctx: &Context, output: &Path) -> StepResult<()>;
}

/// Result of a successful chain run.
#[derive(Debug, Clone)]
pub struct ChainOutcome {
    pub artifact: Artifact,
    /// Strategy that produced the artifact.
    pub engine: String,
    /// True when a non-primary strategy produced it.
    pub fallback: bool,
}

/// Ordered list of generator strategies for one stage.
pub struct ProviderChain {
    stage: &'static str,
    kind: ArtifactKind,
    strategies: Vec<Box<dyn Strategy>>,
}

impl ProviderChain {
    /// Create an empty chain for a stage.
    pub fn new(stage: &'static str, kind: ArtifactKind) -> Self {
        Self {
            stage,
            kind,
            strategies: Vec::new(),
        }
    }

    /// Append a strategy (builder pattern).
    pub fn with_strategy<S: Strategy + 'static>(mut self, strategy: S) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    /// The artifact kind this chain produces.
    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    /// Strategy names in attempt order.
    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Attempt each strategy in order and return the first validated
    /// artifact.
    ///
    /// A strategy whose dependency probe fails, whose invocation fails,
    /// or whose output does not pass the validation gate advances the
    /// chain. Exhausting all strategies is `AllProvidersFailed`.
    pub fn run(&self, ctx: &Context, warnings: &mut Vec<String>) -> StepResult<ChainOutcome> {
        let output = ctx.artifact_path(self.kind);
        let gate = ValidationGate::from_settings(&ctx.settings);
        let mut attempts: Vec<AttemptFailure> = Vec::new();

        for (index, strategy) in self.strategies.iter().enumerate() {
            if let Err(reason) = strategy.check_available(ctx) {
                ctx.logger.warn(&format!(
                    "{} unavailable for {}: {}",
                    strategy.name(),
                    self.stage,
                    reason
                ));
                tracing::debug!(
                    job_id = %ctx.job_id,
                    stage = self.stage,
                    strategy = strategy.name(),
                    %reason,
                    "strategy unavailable"
                );
                attempts.push(AttemptFailure {
                    strategy: strategy.name().to_string(),
                    reason: format!("dependency missing: {}", reason),
                });
                continue;
            }

            ctx.logger.info(&format!(
                "Generating {} with {}",
                self.stage,
                strategy.name()
            ));

            let result = strategy
                .generate(ctx, &output)
                .and_then(|()| gate.validate(self.kind, &output, warnings));

            match result {
                Ok(artifact) => {
                    ctx.logger.validation(&format!(
                        "{} ({} bytes) accepted from {}",
                        artifact.path.display(),
                        artifact.size_bytes,
                        strategy.name()
                    ));
                    return Ok(ChainOutcome {
                        artifact,
                        engine: strategy.name().to_string(),
                        fallback: index > 0,
                    });
                }
                Err(e) => {
                    ctx.logger.warn(&format!(
                        "{} failed for {}: {}",
                        strategy.name(),
                        self.stage,
                        e
                    ));
                    tracing::warn!(
                        job_id = %ctx.job_id,
                        stage = self.stage,
                        strategy = strategy.name(),
                        error = %e,
                        "strategy failed, advancing"
                    );
                    discard_partial(&output);
                    attempts.push(AttemptFailure {
                        strategy: strategy.name().to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        Err(StageError::AllProvidersFailed {
            stage: self.stage.to_string(),
            attempts,
        })
    }
}

/// A failed attempt's output, if partially written, must be treated as
/// absent by the next attempt.
fn discard_partial(path: &Path) {
    if path.exists() {
        let _ = fs::remove_file(path);
    }
}
