//! The five-stage hook firing cascade.

use anyhow::{Context, Result};
use fwg_core::{AppError, HookLocation, HookPoint};
use fwg_process::{ExecutionDescriptor, ProcessRunner, join_command_line};
use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

use crate::location::{
    EXECUTABLE_EXTENSION, hook_folder, is_recognized_hook_name, named_executable_path,
    named_script_path,
};

/// One stage of a cascade, in firing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    NamedScript,
    UnnamedScripts,
    NamedExecutable,
    UnnamedExecutables,
    SharedExecutables,
}

/// Every stage. Used where git has no native support for the hook point.
pub const FULL_CASCADE: &[Stage] = &[
    Stage::NamedScript,
    Stage::UnnamedScripts,
    Stage::NamedExecutable,
    Stage::UnnamedExecutables,
    Stage::SharedExecutables,
];

/// Every stage but the named script, which git already runs itself for
/// native hook points.
pub const REDUCED_CASCADE: &[Stage] = &[
    Stage::UnnamedScripts,
    Stage::NamedExecutable,
    Stage::UnnamedExecutables,
    Stage::SharedExecutables,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HookFileKind {
    Script,
    Executable,
}

impl HookFileKind {
    fn matches(self, path: &Path) -> bool {
        match (self, path.extension()) {
            (Self::Script, None) => true,
            (Self::Executable, Some(ext)) => ext.eq_ignore_ascii_case(EXECUTABLE_EXTENSION),
            _ => false,
        }
    }
}

/// File names fired by the unnamed-executable stage of one cascade run.
/// The shared stage skips these so a hook installed both per-repo and
/// shared fires once.
#[derive(Debug, Default)]
struct FiredHookRegistry {
    names: HashSet<OsString>,
}

impl FiredHookRegistry {
    fn record(&mut self, path: &Path) {
        if let Some(name) = path.file_name() {
            self.names.insert(name.to_os_string());
        }
    }

    fn contains(&self, path: &Path) -> bool {
        path.file_name().is_some_and(|name| self.names.contains(name))
    }
}

/// Resolves and runs hooks for a working directory.
#[derive(Debug, Clone)]
pub struct HookFirer {
    cwd: PathBuf,
    runner: ProcessRunner,
    shared_folder: Option<PathBuf>,
    capture_output: bool,
}

impl HookFirer {
    pub fn new(cwd: impl Into<PathBuf>, runner: ProcessRunner) -> Self {
        Self {
            cwd: cwd.into(),
            runner,
            shared_folder: None,
            capture_output: false,
        }
    }

    /// Enable the shared-executables stage with `folder`.
    pub fn with_shared_folder(mut self, folder: Option<PathBuf>) -> Self {
        self.shared_folder = folder;
        self
    }

    /// Forward hook output to the console and log (verbose hook sets).
    pub fn set_capture_output(&mut self, capture_output: bool) {
        self.capture_output = capture_output;
    }

    /// Run every stage for `point` at `location`.
    pub async fn fire_full(
        &self,
        point: HookPoint,
        location: HookLocation,
        args: &[String],
    ) -> Result<i32> {
        self.fire(point, location, FULL_CASCADE, args).await
    }

    /// Run every stage except the named script.
    pub async fn fire_reduced(
        &self,
        point: HookPoint,
        location: HookLocation,
        args: &[String],
    ) -> Result<i32> {
        self.fire(point, location, REDUCED_CASCADE, args).await
    }

    /// Run `stages` in order, stopping at the first nonzero exit code.
    pub async fn fire(
        &self,
        point: HookPoint,
        location: HookLocation,
        stages: &[Stage],
        args: &[String],
    ) -> Result<i32> {
        let folder = hook_folder(&self.cwd, location);
        let mut fired = FiredHookRegistry::default();
        for &stage in stages {
            let code = self
                .run_stage(stage, point, location, &folder, args, &mut fired)
                .await?;
            if code != 0 {
                debug!(?stage, %point, %location, code, "Cascade stopped");
                return Ok(code);
            }
        }
        Ok(0)
    }

    async fn run_stage(
        &self,
        stage: Stage,
        point: HookPoint,
        location: HookLocation,
        folder: &Path,
        args: &[String],
        fired: &mut FiredHookRegistry,
    ) -> Result<i32> {
        let plain = join_command_line(args);
        match stage {
            Stage::NamedScript => {
                let path = named_script_path(folder, point);
                self.fire_named("Named Script", &path, point, location, &plain)
                    .await
            }
            Stage::UnnamedScripts => {
                for path in unnamed_hooks(folder, HookFileKind::Script)? {
                    let code = self
                        .fire_one("Unnamed Script", &path, point, location, &plain)
                        .await?;
                    if code != 0 {
                        return Ok(code);
                    }
                }
                Ok(0)
            }
            Stage::NamedExecutable => {
                let path = named_executable_path(folder, point);
                self.fire_named("Named Exe", &path, point, location, &plain)
                    .await
            }
            Stage::UnnamedExecutables => {
                let augmented = augmented_arguments(point, args);
                for path in unnamed_hooks(folder, HookFileKind::Executable)? {
                    let code = self
                        .fire_one("Unnamed Exe", &path, point, location, &augmented)
                        .await?;
                    if code != 0 {
                        return Ok(code);
                    }
                    fired.record(&path);
                }
                Ok(0)
            }
            Stage::SharedExecutables => {
                let Some(shared) = self.shared_folder.as_deref() else {
                    return Ok(0);
                };
                if shared.exists() && !shared.is_dir() {
                    return Err(AppError::InvalidHookFolder(shared.to_path_buf()).into());
                }
                let augmented = augmented_arguments(point, args);
                for path in unnamed_hooks(shared, HookFileKind::Executable)? {
                    if fired.contains(&path) {
                        debug!(hook = %path.display(), "Already fired from repository, skipping");
                        continue;
                    }
                    let code = self
                        .fire_one("Shared Exe", &path, point, location, &augmented)
                        .await?;
                    if code != 0 {
                        return Ok(code);
                    }
                }
                Ok(0)
            }
        }
    }

    /// Fire an exactly named hook. Absence is not an error.
    async fn fire_named(
        &self,
        label: &str,
        path: &Path,
        point: HookPoint,
        location: HookLocation,
        arguments: &str,
    ) -> Result<i32> {
        if !path.is_file() {
            return Ok(0);
        }
        if !is_runnable(path) {
            tracing::warn!(
                "{label} Hook {} is not executable, skipping",
                path.display()
            );
            return Ok(0);
        }
        self.fire_one(label, path, point, location, arguments).await
    }

    async fn fire_one(
        &self,
        label: &str,
        path: &Path,
        point: HookPoint,
        location: HookLocation,
        arguments: &str,
    ) -> Result<i32> {
        let file_name = path.file_name().unwrap_or_default().to_string_lossy();
        info!("Firing {label} Hook {location} {point} {file_name} with args: {arguments}");
        let started = Instant::now();

        let descriptor = ExecutionDescriptor::new(path, arguments)
            .in_dir(&self.cwd)
            .with_redirected_stdin();
        let result = self
            .runner
            .run(&descriptor, self.capture_output)
            .await
            .with_context(|| format!("Failed to fire hook {}", path.display()))?;

        info!(
            "Fired {label} Hook {location} {point} {file_name}. Took {}ms (exit {})",
            started.elapsed().as_millis(),
            result.exit_code
        );
        Ok(result.exit_code)
    }
}

/// `<hook-name> <command> <args...>` for hooks that cannot tell the hook
/// point from their own file name.
fn augmented_arguments(point: HookPoint, args: &[String]) -> String {
    let mut parts = Vec::with_capacity(args.len() + 2);
    parts.push(point.invocation_token());
    parts.push(point.family.command_token().to_string());
    parts.extend(args.iter().cloned());
    join_command_line(&parts)
}

/// Runnable hook files of `kind` in `folder` whose stem is not a recognized
/// hook name, sorted by file name. A missing folder yields nothing.
fn unnamed_hooks(folder: &Path, kind: HookFileKind) -> Result<Vec<PathBuf>> {
    if !folder.is_dir() {
        return Ok(Vec::new());
    }
    let entries = std::fs::read_dir(folder)
        .with_context(|| format!("Failed to read hook folder {}", folder.display()))?;

    let mut hooks = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("Failed to read hook folder {}", folder.display()))?
            .path();
        if !path.is_file() || !kind.matches(&path) {
            continue;
        }
        let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
            continue;
        };
        if stem.starts_with('.') || is_recognized_hook_name(&stem) {
            continue;
        }
        if !is_runnable(&path) {
            debug!(hook = %path.display(), "Not executable, skipping");
            continue;
        }
        hooks.push(path);
    }
    hooks.sort();
    Ok(hooks)
}

#[cfg(unix)]
fn is_runnable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|meta| meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_runnable(_path: &Path) -> bool {
    true
}

#[cfg(test)]
#[path = "cascade_tests.rs"]
mod tests;
