use std::path::PathBuf;

/// Canonical XDG app name used for config and state directories.
pub const APP_NAME: &str = "fishing-with-git";

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("", "", APP_NAME)
}

/// Directory holding the global `settings.toml`.
pub fn config_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().to_path_buf())
}

/// Path of the global settings file.
pub fn global_settings_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("settings.toml"))
}

/// State directory. Falls back to the data-local dir on platforms without
/// an XDG state dir (macOS, Windows).
pub fn state_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| {
        dirs.state_dir()
            .unwrap_or_else(|| dirs.data_local_dir())
            .to_path_buf()
    })
}

pub fn state_dir_fallback() -> PathBuf {
    std::env::temp_dir().join(format!("{APP_NAME}-state"))
}

/// Directory where log files are written.
pub fn log_dir() -> PathBuf {
    state_dir()
        .unwrap_or_else(state_dir_fallback)
        .join("logs")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_dir_ends_with_logs() {
        assert!(log_dir().ends_with("logs"));
    }

    #[test]
    fn test_state_dir_fallback_in_temp() {
        let fallback = state_dir_fallback();
        assert!(fallback.starts_with(std::env::temp_dir()));
        assert!(
            fallback
                .file_name()
                .is_some_and(|name| name.to_string_lossy().contains(APP_NAME))
        );
    }

    #[test]
    fn test_global_settings_file_name() {
        if let Some(path) = global_settings_path() {
            assert!(path.ends_with("settings.toml"));
        }
    }
}
