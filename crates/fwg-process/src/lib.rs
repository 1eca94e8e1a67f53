//! Process management: spawning, concurrent output draining, and the soft
//! slow-process watchdog.

mod command_line;
mod drain;

pub use command_line::{join_command_line, split_command_line};

use anyhow::{Context, Result};
use fwg_core::AppError;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::warn;

use drain::{StreamKind, drain_stream};

/// Everything needed to spawn one process. Built fresh for every spawn.
#[derive(Debug, Clone)]
pub struct ExecutionDescriptor {
    pub program: PathBuf,
    /// Arguments as a single command-line string.
    pub arguments: String,
    pub working_dir: PathBuf,
    /// Redirect stdin away from the terminal (the child reads EOF).
    pub redirect_stdin: bool,
}

impl ExecutionDescriptor {
    pub fn new(program: impl Into<PathBuf>, arguments: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            arguments: arguments.into(),
            working_dir: PathBuf::from("."),
            redirect_stdin: false,
        }
    }

    pub fn in_dir(mut self, working_dir: impl Into<PathBuf>) -> Self {
        self.working_dir = working_dir.into();
        self
    }

    pub fn with_redirected_stdin(mut self) -> Self {
        self.redirect_stdin = true;
        self
    }

    /// `program arguments`, for log lines.
    pub fn display_line(&self) -> String {
        if self.arguments.is_empty() {
            self.program.display().to_string()
        } else {
            format!("{} {}", self.program.display(), self.arguments)
        }
    }
}

/// Result of executing a process.
#[derive(Debug, Clone, Default)]
pub struct ExecutionResult {
    /// Native exit code (1 if signal-killed).
    pub exit_code: i32,
    /// Start of the drained stdout, up to 64 KiB. Empty when output was not
    /// captured.
    pub stdout: String,
    /// Start of the drained stderr, up to 64 KiB. Empty when output was not
    /// captured.
    pub stderr: String,
}

/// Spawns processes and waits for them, warning about slow ones.
#[derive(Debug, Clone, Copy)]
pub struct ProcessRunner {
    slow_warning: Duration,
}

impl ProcessRunner {
    pub fn new(slow_warning: Duration) -> Self {
        Self { slow_warning }
    }

    /// Run `descriptor` to completion.
    ///
    /// With `capture_output`, stdout and stderr are drained concurrently with
    /// the exit wait and forwarded to the logger and console. Without it both
    /// streams are discarded.
    ///
    /// If the process outlives the warning delay a warning is logged; the
    /// process is never killed and the call keeps waiting for it.
    pub async fn run(
        &self,
        descriptor: &ExecutionDescriptor,
        capture_output: bool,
    ) -> Result<ExecutionResult> {
        if !descriptor.program.is_file() {
            return Err(AppError::MissingExecutable(descriptor.program.clone()).into());
        }

        let mut cmd = Command::new(&descriptor.program);
        command_line::apply_arguments(&mut cmd, &descriptor.arguments);
        cmd.current_dir(&descriptor.working_dir);
        if descriptor.redirect_stdin {
            cmd.stdin(Stdio::null());
        }
        if capture_output {
            cmd.stdout(Stdio::piped());
            cmd.stderr(Stdio::piped());
        } else {
            cmd.stdout(Stdio::null());
            cmd.stderr(Stdio::null());
        }

        let mut child = spawn_with_retry(&mut cmd)
            .await
            .with_context(|| format!("Failed to spawn {}", descriptor.program.display()))?;
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let completion = async {
            tokio::join!(
                child.wait(),
                drain_stream(stdout, StreamKind::Stdout),
                drain_stream(stderr, StreamKind::Stderr),
            )
        };
        tokio::pin!(completion);

        let (status, stdout, stderr) = tokio::select! {
            done = &mut completion => done,
            () = tokio::time::sleep(self.slow_warning) => {
                warn!("Process taking a long time: {}", descriptor.display_line());
                completion.await
            }
        };

        let status = status
            .with_context(|| format!("Failed to wait for {}", descriptor.program.display()))?;
        let exit_code = status.code().unwrap_or_else(|| {
            warn!("Process terminated by signal, using exit code 1");
            1
        });

        Ok(ExecutionResult {
            exit_code,
            stdout,
            stderr,
        })
    }
}

/// ETXTBSY: a freshly written hook can still be held open for writing by a
/// concurrently forked child for a brief moment.
const EXECUTABLE_FILE_BUSY: i32 = 26;
const SPAWN_ATTEMPTS: u32 = 5;

async fn spawn_with_retry(cmd: &mut Command) -> std::io::Result<tokio::process::Child> {
    let mut attempt = 1;
    loop {
        match cmd.spawn() {
            Err(e)
                if cfg!(unix)
                    && e.raw_os_error() == Some(EXECUTABLE_FILE_BUSY)
                    && attempt < SPAWN_ATTEMPTS =>
            {
                tracing::debug!(attempt, "Executable busy, retrying spawn");
                tokio::time::sleep(Duration::from_millis(20 * u64::from(attempt))).await;
                attempt += 1;
            }
            other => return other,
        }
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
