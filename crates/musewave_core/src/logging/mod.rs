//! Per-job logging.
//!
//! Each job writes its own log file. Progress reporting and external
//! tool output go through the job logger rather than stdout; structured
//! events additionally flow through `tracing` keyed by job id and stage.

mod job_logger;
mod types;

pub use job_logger::JobLogger;
pub use types::{LogCallback, LogConfig, LogLevel, MessagePrefix};
