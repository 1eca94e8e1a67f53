use super::*;
use serial_test::serial;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_toml(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{content}").unwrap();
    file.flush().unwrap();
    file
}

fn clear_env() {
    // SAFETY: tests touching the environment are #[serial].
    unsafe {
        std::env::remove_var(ENV_REAL_GIT);
        std::env::remove_var(ENV_SHARED_HOOK_FOLDER);
    }
}

#[test]
#[serial]
fn test_defaults_when_no_files() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings::load_layers(None, &dir.path().join(PROJECT_SETTINGS_FILE)).unwrap();
    assert_eq!(settings, Settings::default());
    assert!(settings.fire_hook_logic);
    assert!(settings.console_silent_default);
    assert_eq!(settings.process_timeout_warning(), Duration::from_secs(5));
}

#[test]
#[serial]
fn test_project_overrides_global() {
    clear_env();
    let global = write_toml(
        r#"
clean_c_arguments = true
should_log = true
process_timeout_warning_ms = 100
"#,
    );
    let project = write_toml(
        r#"
should_log = false
"#,
    );

    let settings = Settings::load_layers(Some(global.path()), project.path()).unwrap();
    assert!(settings.clean_c_arguments, "global value should survive");
    assert!(!settings.should_log, "project value should win");
    assert_eq!(settings.process_timeout_warning_ms, 100);
}

#[test]
#[serial]
fn test_env_overrides_files() {
    clear_env();
    let project = write_toml(
        r#"
real_git = "/from/file/git"
"#,
    );
    // SAFETY: serialized test.
    unsafe {
        std::env::set_var(ENV_REAL_GIT, "/from/env/git");
    }
    let settings = Settings::load_layers(None, project.path()).unwrap();
    clear_env();
    assert_eq!(settings.real_git, Some(PathBuf::from("/from/env/git")));
}

#[test]
#[serial]
fn test_malformed_file_is_an_error() {
    clear_env();
    let project = write_toml("fire_hook_logic = \"yes\"");
    let err = Settings::load_layers(None, project.path()).unwrap_err();
    assert!(
        format!("{err:#}").contains("Failed to parse settings"),
        "got: {err:#}"
    );
}

#[test]
#[serial]
fn test_unknown_key_is_rejected() {
    clear_env();
    let project = write_toml("fire_hooks = false");
    assert!(Settings::load_layers(None, project.path()).is_err());
}

#[test]
fn test_shared_folder_requires_flag() {
    let mut settings = Settings {
        shared_hook_folder: Some(PathBuf::from("/shared/hooks")),
        ..Settings::default()
    };
    assert!(settings.active_shared_hook_folder().is_none());

    settings.run_shared_hooks = true;
    assert_eq!(
        settings.active_shared_hook_folder(),
        Some(Path::new("/shared/hooks"))
    );

    settings.shared_hook_folder = None;
    assert!(settings.active_shared_hook_folder().is_none());
}

#[test]
fn test_merge_keeps_values_for_none() {
    let mut settings = Settings {
        real_git: Some(PathBuf::from("/usr/bin/git")),
        ..Settings::default()
    };
    settings.merge_with(SettingsLayer::default());
    assert_eq!(settings.real_git, Some(PathBuf::from("/usr/bin/git")));
}
