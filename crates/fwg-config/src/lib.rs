//! Settings loading for fishing-with-git (global + project TOML layers).

pub mod git;
pub mod paths;
pub mod settings;

pub use git::resolve_real_git;
pub use settings::{PROJECT_SETTINGS_FILE, Settings, SettingsLayer};
