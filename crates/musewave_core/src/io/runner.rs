//! Command runner for external process execution.
//!
//! Runs one external command to completion, captures stdout/stderr on
//! reader threads, and enforces a per-invocation timeout so a hung tool
//! cannot hang the whole job. Retry policy belongs to the caller.

use std::io::Read;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::logging::JobLogger;

/// How often the runner polls a child for completion.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Errors from running an external command.
#[derive(Error, Debug)]
pub enum RunError {
    /// The program could not be started at all.
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The program ran but exited non-zero.
    #[error("{description} failed with exit code {exit_code}: {stderr}")]
    NonZeroExit {
        description: String,
        exit_code: i32,
        stderr: String,
    },

    /// The program exceeded the invocation timeout and was killed.
    #[error("{description} timed out after {secs}s")]
    TimedOut { description: String, secs: u64 },

    /// I/O failure while supervising the child.
    #[error("I/O error while running {description}: {source}")]
    Io {
        description: String,
        #[source]
        source: std::io::Error,
    },
}

/// Captured output of a successful run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Executes external commands with output capture and a timeout.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    timeout: Duration,
}

impl CommandRunner {
    /// Create a runner with the given per-invocation timeout.
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Run a command to completion.
    ///
    /// The command line is logged before spawning; captured output lines
    /// are streamed into the logger's tail buffer. Non-zero exit is
    /// always a failure, and the tail is replayed into the log when that
    /// happens.
    pub fn run(
        &self,
        logger: &JobLogger,
        program: &str,
        args: &[String],
        description: &str,
    ) -> Result<RunOutput, RunError> {
        logger.command(&format!("{} {}", program, args.join(" ")));
        tracing::debug!(program, description, "running external command");

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| RunError::Spawn {
                program: program.to_string(),
                source: e,
            })?;

        let mut stdout_pipe = child.stdout.take().ok_or_else(|| RunError::Io {
            description: description.to_string(),
            source: std::io::Error::other("failed to capture stdout"),
        })?;
        let mut stderr_pipe = child.stderr.take().ok_or_else(|| RunError::Io {
            description: description.to_string(),
            source: std::io::Error::other("failed to capture stderr"),
        })?;

        let stdout_handle = thread::spawn(move || {
            let mut buf = String::new();
            let _ = stdout_pipe.read_to_string(&mut buf);
            buf
        });
        let stderr_handle = thread::spawn(move || {
            let mut buf = String::new();
            let _ = stderr_pipe.read_to_string(&mut buf);
            buf
        });

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if Instant::now() >= deadline {
                        let _ = child.kill();
                        let _ = child.wait();
                        let _ = stdout_handle.join();
                        let _ = stderr_handle.join();
                        logger.error(&format!(
                            "{} timed out after {}s, killed",
                            description,
                            self.timeout.as_secs()
                        ));
                        return Err(RunError::TimedOut {
                            description: description.to_string(),
                            secs: self.timeout.as_secs(),
                        });
                    }
                    thread::sleep(POLL_INTERVAL);
                }
                Err(e) => {
                    return Err(RunError::Io {
                        description: description.to_string(),
                        source: e,
                    });
                }
            }
        };

        let stdout = stdout_handle.join().unwrap_or_default();
        let stderr = stderr_handle.join().unwrap_or_default();

        for line in stdout.lines() {
            logger.output_line(line, false);
        }
        for line in stderr.lines() {
            logger.output_line(line, true);
        }

        if !status.success() {
            let exit_code = status.code().unwrap_or(-1);
            logger.show_tail(description);
            return Err(RunError::NonZeroExit {
                description: description.to_string(),
                exit_code,
                stderr,
            });
        }

        Ok(RunOutput { stdout, stderr })
    }

    /// The configured per-invocation timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Check whether a tool can be invoked at all.
///
/// Runs `<program> --version` with output discarded, the same probe the
/// dependency checks use for ffmpeg, ffprobe, and fluidsynth.
pub fn binary_available(program: &str) -> bool {
    Command::new(program)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogConfig;
    use tempfile::tempdir;

    fn test_logger(dir: &std::path::Path) -> JobLogger {
        JobLogger::new("runner_test", dir, LogConfig::default(), None).unwrap()
    }

    #[test]
    fn captures_stdout() {
        let dir = tempdir().unwrap();
        let logger = test_logger(dir.path());
        let runner = CommandRunner::new(10);

        let output = runner
            .run(&logger, "echo", &["hello".to_string()], "echo test")
            .unwrap();
        assert_eq!(output.stdout.trim(), "hello");
    }

    #[test]
    fn nonzero_exit_is_an_error() {
        let dir = tempdir().unwrap();
        let logger = test_logger(dir.path());
        let runner = CommandRunner::new(10);

        let err = runner
            .run(
                &logger,
                "sh",
                &["-c".to_string(), "exit 3".to_string()],
                "failing command",
            )
            .unwrap_err();

        match err {
            RunError::NonZeroExit { exit_code, .. } => assert_eq!(exit_code, 3),
            other => panic!("expected NonZeroExit, got {:?}", other),
        }
    }

    #[test]
    fn missing_program_fails_to_spawn() {
        let dir = tempdir().unwrap();
        let logger = test_logger(dir.path());
        let runner = CommandRunner::new(10);

        let err = runner
            .run(&logger, "/nonexistent/tool", &[], "missing tool")
            .unwrap_err();
        assert!(matches!(err, RunError::Spawn { .. }));
    }

    #[test]
    fn hung_command_times_out() {
        let dir = tempdir().unwrap();
        let logger = test_logger(dir.path());
        let runner = CommandRunner::new(1);

        let start = Instant::now();
        let err = runner
            .run(&logger, "sleep", &["30".to_string()], "hung tool")
            .unwrap_err();

        assert!(matches!(err, RunError::TimedOut { secs: 1, .. }));
        assert!(start.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn probes_binary_availability() {
        assert!(!binary_available("/nonexistent/tool"));
    }
}
