//! Wrapper settings loaded with 4-tier priority:
//! 1. Environment overrides (`FWG_REAL_GIT`, `FWG_SHARED_HOOK_FOLDER`) (highest)
//! 2. Project file (`{cwd}/.fwg.toml`)
//! 3. Global file (`~/.config/fishing-with-git/settings.toml`)
//! 4. Built-in defaults (lowest)

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Project-level settings file name, looked up in the working directory.
pub const PROJECT_SETTINGS_FILE: &str = ".fwg.toml";

const ENV_REAL_GIT: &str = "FWG_REAL_GIT";
const ENV_SHARED_HOOK_FOLDER: &str = "FWG_SHARED_HOOK_FOLDER";

const DEFAULT_TIMEOUT_WARNING_MS: u64 = 5000;
const DEFAULT_WIPE_LOGS_DAYS: u64 = 7;

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Master switch for firing hooks around the real command.
    pub fire_hook_logic: bool,
    /// Strip every `-c <value>` pair before forwarding to git.
    pub clean_c_arguments: bool,
    /// Fire executables from `shared_hook_folder` after the per-repo ones.
    pub run_shared_hooks: bool,
    pub shared_hook_folder: Option<PathBuf>,
    /// Delay after which a still-running process is reported as slow.
    pub process_timeout_warning_ms: u64,
    /// Persist the invocation log to disk.
    pub should_log: bool,
    /// Log files older than this are deleted at startup. 0 keeps everything.
    pub wipe_logs_older_than_days: u64,
    pub print_separate_args: bool,
    /// Explicit path of the real git executable. `None` searches `PATH`.
    pub real_git: Option<PathBuf>,
    /// Console verbosity used when no hook set exists for the command.
    pub console_silent_default: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fire_hook_logic: true,
            clean_c_arguments: false,
            run_shared_hooks: false,
            shared_hook_folder: None,
            process_timeout_warning_ms: DEFAULT_TIMEOUT_WARNING_MS,
            should_log: false,
            wipe_logs_older_than_days: DEFAULT_WIPE_LOGS_DAYS,
            print_separate_args: false,
            real_git: None,
            console_silent_default: true,
        }
    }
}

/// One partially specified layer as it appears on disk.
///
/// `None` means "no opinion": the value from a lower-priority layer is kept.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsLayer {
    #[serde(default)]
    pub fire_hook_logic: Option<bool>,
    #[serde(default)]
    pub clean_c_arguments: Option<bool>,
    #[serde(default)]
    pub run_shared_hooks: Option<bool>,
    #[serde(default)]
    pub shared_hook_folder: Option<PathBuf>,
    #[serde(default)]
    pub process_timeout_warning_ms: Option<u64>,
    #[serde(default)]
    pub should_log: Option<bool>,
    #[serde(default)]
    pub wipe_logs_older_than_days: Option<u64>,
    #[serde(default)]
    pub print_separate_args: Option<bool>,
    #[serde(default)]
    pub real_git: Option<PathBuf>,
    #[serde(default)]
    pub console_silent_default: Option<bool>,
}

impl SettingsLayer {
    /// Load a layer from a TOML file. A missing file yields an empty layer.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse settings: {}", path.display()))
    }

    /// Layer built from `FWG_*` environment variables.
    pub fn from_env() -> Self {
        let non_empty = |key: &str| {
            std::env::var_os(key)
                .filter(|value| !value.is_empty())
                .map(PathBuf::from)
        };
        Self {
            real_git: non_empty(ENV_REAL_GIT),
            shared_hook_folder: non_empty(ENV_SHARED_HOOK_FOLDER),
            ..Self::default()
        }
    }
}

impl Settings {
    /// Load settings for an invocation made from `cwd`.
    pub fn load(cwd: &Path) -> Result<Self> {
        let global_path = crate::paths::global_settings_path();
        Self::load_layers(global_path.as_deref(), &cwd.join(PROJECT_SETTINGS_FILE))
    }

    /// Load with explicit global/project file paths, then apply env overrides.
    pub fn load_layers(global_path: Option<&Path>, project_path: &Path) -> Result<Self> {
        let mut settings = Self::default();
        if let Some(path) = global_path {
            settings.merge_with(SettingsLayer::load_from_file(path)?);
        }
        settings.merge_with(SettingsLayer::load_from_file(project_path)?);
        settings.merge_with(SettingsLayer::from_env());
        tracing::debug!(?settings, "Settings resolved");
        Ok(settings)
    }

    /// Apply a higher-priority layer on top of self.
    pub fn merge_with(&mut self, layer: SettingsLayer) {
        fn apply<T>(slot: &mut T, value: Option<T>) {
            if let Some(value) = value {
                *slot = value;
            }
        }
        apply(&mut self.fire_hook_logic, layer.fire_hook_logic);
        apply(&mut self.clean_c_arguments, layer.clean_c_arguments);
        apply(&mut self.run_shared_hooks, layer.run_shared_hooks);
        apply(
            &mut self.process_timeout_warning_ms,
            layer.process_timeout_warning_ms,
        );
        apply(&mut self.should_log, layer.should_log);
        apply(
            &mut self.wipe_logs_older_than_days,
            layer.wipe_logs_older_than_days,
        );
        apply(&mut self.print_separate_args, layer.print_separate_args);
        apply(&mut self.console_silent_default, layer.console_silent_default);
        if layer.shared_hook_folder.is_some() {
            self.shared_hook_folder = layer.shared_hook_folder;
        }
        if layer.real_git.is_some() {
            self.real_git = layer.real_git;
        }
    }

    pub fn process_timeout_warning(&self) -> Duration {
        Duration::from_millis(self.process_timeout_warning_ms)
    }

    /// Shared hook folder, only when shared hooks are enabled and configured.
    pub fn active_shared_hook_folder(&self) -> Option<&Path> {
        if !self.run_shared_hooks {
            return None;
        }
        self.shared_hook_folder.as_deref()
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
