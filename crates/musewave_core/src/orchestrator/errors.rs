//! Error types for the generation pipeline.
//!
//! Errors carry context that chains through layers:
//! Job → Stage → Provider attempt → Detail
//!
//! Format mismatches are deliberately absent here: they are recorded as
//! warnings on the job state and never fail an attempt.

use std::fmt;
use std::io;

use thiserror::Error;

use crate::io::RunError;
use crate::models::ArtifactKind;

/// Top-level pipeline error with job context.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A required stage failed.
    #[error("Job '{job_id}' failed at stage '{stage}': {source}")]
    StageFailed {
        job_id: String,
        stage: String,
        #[source]
        source: StageError,
    },

    /// The job was cancelled between stages.
    #[error("Job '{job_id}' was cancelled")]
    Cancelled { job_id: String },

    /// Failed to set up the job (create directories, open the log).
    #[error("Job '{job_id}' setup failed: {message}")]
    SetupFailed { job_id: String, message: String },
}

impl PipelineError {
    /// Create a stage failed error.
    pub fn stage_failed(
        job_id: impl Into<String>,
        stage: impl Into<String>,
        source: StageError,
    ) -> Self {
        Self::StageFailed {
            job_id: job_id.into(),
            stage: stage.into(),
            source,
        }
    }

    /// Create a setup failed error.
    pub fn setup_failed(job_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SetupFailed {
            job_id: job_id.into(),
            message: message.into(),
        }
    }

    /// Create a cancelled error.
    pub fn cancelled(job_id: impl Into<String>) -> Self {
        Self::Cancelled {
            job_id: job_id.into(),
        }
    }

    /// The stage this error is attributed to, if any.
    pub fn stage(&self) -> Option<&str> {
        match self {
            PipelineError::StageFailed { stage, .. } => Some(stage),
            _ => None,
        }
    }
}

/// One failed provider attempt inside a chain.
#[derive(Debug, Clone)]
pub struct AttemptFailure {
    /// Strategy that was attempted.
    pub strategy: String,
    /// Why it did not produce a validated artifact.
    pub reason: String,
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.strategy, self.reason)
    }
}

/// Error from one pipeline stage.
#[derive(Error, Debug)]
pub enum StageError {
    /// A strategy's required tool or resource is absent. Recovered
    /// inside the provider chain by advancing to the next strategy.
    #[error("dependency missing for {tool}: {detail}")]
    DependencyMissing { tool: String, detail: String },

    /// An external generator ran but did not succeed.
    #[error("{}: {stderr}", generation_context(.description, .exit_code))]
    Generation {
        description: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    /// The produced artifact is missing or undersized.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Every strategy in a chain was exhausted without a validated
    /// artifact. Fatal for required stages, degrades optional stages.
    #[error("all providers failed for stage '{stage}': [{}]", format_attempts(.attempts))]
    AllProvidersFailed {
        stage: String,
        attempts: Vec<AttemptFailure>,
    },

    /// The mix was attempted with zero audio stems.
    #[error("no audio stems available for mixing")]
    NoStems,

    /// A prerequisite artifact for this stage is absent.
    #[error("missing input artifact: {artifact}")]
    MissingInput { artifact: ArtifactKind },

    /// File I/O error.
    #[error("I/O error in {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: io::Error,
    },
}

fn generation_context(description: &str, exit_code: &Option<i32>) -> String {
    match exit_code {
        Some(code) => format!("{} failed with exit code {}", description, code),
        None => format!("{} failed", description),
    }
}

fn format_attempts(attempts: &[AttemptFailure]) -> String {
    attempts
        .iter()
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl StageError {
    /// Create an I/O error with context.
    pub fn io(operation: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }

    /// Create a validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

impl From<RunError> for StageError {
    fn from(err: RunError) -> Self {
        match err {
            RunError::Spawn { program, source } => StageError::DependencyMissing {
                tool: program,
                detail: source.to_string(),
            },
            RunError::NonZeroExit {
                description,
                exit_code,
                stderr,
            } => StageError::Generation {
                description,
                exit_code: Some(exit_code),
                stderr,
            },
            RunError::TimedOut { description, secs } => StageError::Generation {
                description,
                exit_code: None,
                stderr: format!("timed out after {}s", secs),
            },
            RunError::Io {
                description,
                source,
            } => StageError::io(description, source),
        }
    }
}

/// Result type for stage operations.
pub type StepResult<T> = Result<T, StageError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
