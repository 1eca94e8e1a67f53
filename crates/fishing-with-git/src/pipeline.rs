//! The per-invocation pipeline: rewrite, pre-hooks, real git, post-hooks.

use anyhow::Result;
use chrono::Local;
use fwg_args::{classify, process_args};
use fwg_config::{Settings, resolve_real_git};
use fwg_hooks::{HookFirer, HookSet};
use fwg_process::{ExecutionDescriptor, ProcessRunner, join_command_line};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

use crate::logging::LogControl;

/// Token that runs all hooks but never spawns the real git.
pub const DRY_RUN_SENTINEL: &str = "-NO_PASSING_FISH";

/// One wrapped git invocation.
pub struct Invocation {
    args: Vec<String>,
    cwd: PathBuf,
    settings: Settings,
}

impl Invocation {
    pub fn new(args: Vec<String>, cwd: impl Into<PathBuf>, settings: Settings) -> Self {
        Self {
            args,
            cwd: cwd.into(),
            settings,
        }
    }

    /// Run the whole pipeline and return the exit code for the caller.
    ///
    /// Hook vetoes and git failures are exit codes, not errors. Errors are
    /// force-logged to file before being returned.
    pub async fn run(mut self, log: &dyn LogControl) -> Result<i32> {
        let started = Instant::now();
        let mut git_elapsed = Duration::ZERO;

        let result = self.run_steps(log, &mut git_elapsed).await;
        if let Err(e) = &result {
            log.force_file_logging();
            error!("Unexpected failure: {e:#}");
        }

        let overall = started.elapsed();
        info!(
            "Command overall took {}ms. Actual git command took {}ms. Fishing with git overhead {}ms",
            overall.as_millis(),
            git_elapsed.as_millis(),
            overall.saturating_sub(git_elapsed).as_millis()
        );
        info!("----- call done");
        log.finish();
        result
    }

    async fn run_steps(
        &mut self,
        log: &dyn LogControl,
        git_elapsed: &mut Duration,
    ) -> Result<i32> {
        self.log_invocation();

        let initial = classify(&self.args);
        info!("Command: {}", initial.kind);
        let rewritten = process_args(
            initial.token.as_deref(),
            &mut self.args,
            self.settings.clean_c_arguments,
        );
        info!("Arguments going in: {}", self.args.join(" "));
        rewritten?;

        let classification = classify(&self.args);
        let real_git = resolve_real_git(&self.settings)?;

        let hook_set = classification
            .index
            .and_then(|index| HookSet::for_command(classification.kind, &self.args, index));
        let silent = hook_set
            .as_ref()
            .map_or(self.settings.console_silent_default, HookSet::silent);
        log.set_console_silent(silent);
        log.activate_and_flush(self.settings.should_log);

        let runner = ProcessRunner::new(self.settings.process_timeout_warning());
        let mut firer = HookFirer::new(&self.cwd, runner).with_shared_folder(
            self.settings
                .active_shared_hook_folder()
                .map(|folder| folder.to_path_buf()),
        );
        firer.set_capture_output(!silent);

        let hooks = match &hook_set {
            Some(set) if self.settings.fire_hook_logic => Some(set),
            Some(_) => {
                info!("Hook firing disabled");
                None
            }
            None => {
                info!("No hooks for command {}", classification.kind);
                None
            }
        };

        if let Some(set) = hooks {
            let code = set.pre_command(&firer).await?;
            if code != 0 {
                warn!(
                    "Pre-{} hooks failed with exit code {code}, git not run",
                    set.family().command_token()
                );
                return Ok(code);
            }
        }

        let code = if self.is_dry_run() {
            info!("Dry run requested with {DRY_RUN_SENTINEL}, git not run");
            0
        } else {
            let descriptor = ExecutionDescriptor::new(real_git, join_command_line(&self.args))
                .in_dir(&self.cwd)
                .with_redirected_stdin();
            info!("Running {}", descriptor.display_line());
            let git_started = Instant::now();
            let result = runner.run(&descriptor, true).await;
            *git_elapsed = git_started.elapsed();
            result?.exit_code
        };
        if code != 0 {
            info!("git exited with code {code}, post hooks skipped");
            return Ok(code);
        }

        if let Some(set) = hooks {
            let code = set.post_command(&firer).await?;
            if code != 0 {
                warn!(
                    "Post-{} hooks failed with exit code {code}",
                    set.family().command_token()
                );
                return Ok(code);
            }
        }
        Ok(0)
    }

    fn log_invocation(&self) {
        info!("----- {} fwg call", Local::now().format("%Y-%m-%d %H:%M:%S%.3f"));
        info!("Working directory: {}", self.cwd.display());
        if self.settings.print_separate_args {
            for (i, arg) in self.args.iter().enumerate() {
                info!("Arg {i}: {arg}");
            }
        } else {
            info!("Arguments: {}", self.args.join(" "));
        }
    }

    fn is_dry_run(&self) -> bool {
        self.args.iter().any(|arg| arg == DRY_RUN_SENTINEL)
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
