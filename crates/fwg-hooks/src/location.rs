//! Hook folder resolution and hook file naming.

use fwg_core::{HookLocation, HookPoint};
use std::path::{Path, PathBuf};

/// Extension carried by executable hooks. Script hooks have none.
pub const EXECUTABLE_EXTENSION: &str = "exe";

const NATIVE_HOOK_SUBPATH: &str = ".git/hooks";
const VERSIONED_HOOK_SUBPATH: &str = "hooks";

/// Hook names git runs itself that have no wrapper hook point. Files with
/// these names are never fired as unnamed hooks.
const OTHER_NATIVE_HOOK_NAMES: &[&str] = &[
    "applypatch-msg",
    "pre-applypatch",
    "post-applypatch",
    "prepare-commit-msg",
    "pre-merge-commit",
    "post-rewrite",
    "pre-auto-gc",
    "push-to-checkout",
    "pre-receive",
    "update",
    "proc-receive",
    "post-receive",
    "post-update",
    "reference-transaction",
    "fsmonitor-watchman",
    "sendemail-validate",
    "post-index-change",
];

/// Folder searched for hooks at `location`, relative to the working directory.
pub fn hook_folder(cwd: &Path, location: HookLocation) -> PathBuf {
    match location {
        HookLocation::Native => cwd.join(NATIVE_HOOK_SUBPATH),
        HookLocation::Versioned => cwd.join(VERSIONED_HOOK_SUBPATH),
    }
}

/// Whether `name` (a file stem) is a recognized hook name.
pub fn is_recognized_hook_name(name: &str) -> bool {
    OTHER_NATIVE_HOOK_NAMES.contains(&name) || HookPoint::all().any(|p| p.hook_name() == name)
}

pub(crate) fn named_script_path(folder: &Path, point: HookPoint) -> PathBuf {
    folder.join(point.hook_name())
}

pub(crate) fn named_executable_path(folder: &Path, point: HookPoint) -> PathBuf {
    folder.join(format!("{}.{EXECUTABLE_EXTENSION}", point.hook_name()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fwg_core::HookFamily;

    #[test]
    fn test_hook_folders() {
        let cwd = Path::new("/work/repo");
        assert_eq!(
            hook_folder(cwd, HookLocation::Native),
            PathBuf::from("/work/repo/.git/hooks")
        );
        assert_eq!(
            hook_folder(cwd, HookLocation::Versioned),
            PathBuf::from("/work/repo/hooks")
        );
    }

    #[test]
    fn test_recognized_names() {
        assert!(is_recognized_hook_name("pre-commit"));
        assert!(is_recognized_hook_name("post-checkout"));
        assert!(is_recognized_hook_name("commit-msg"));
        assert!(is_recognized_hook_name("prepare-commit-msg"));
        assert!(!is_recognized_hook_name("lint"));
        assert!(!is_recognized_hook_name("pre-commit.sample"));
    }

    #[test]
    fn test_named_paths() {
        let folder = Path::new("/hooks");
        let point = HookPoint::pre(HookFamily::Rebase);
        assert_eq!(
            named_script_path(folder, point),
            PathBuf::from("/hooks/pre-rebase")
        );
        assert_eq!(
            named_executable_path(folder, point),
            PathBuf::from("/hooks/pre-rebase.exe")
        );
    }
}
