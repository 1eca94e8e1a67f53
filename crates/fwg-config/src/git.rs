//! Locating the real git executable the wrapper forwards to.

use anyhow::Result;
use fwg_core::AppError;
use std::path::{Path, PathBuf};

use crate::Settings;

/// Resolve the real git executable.
///
/// An explicit `real_git` setting must exist. Otherwise the first `git` on
/// `PATH` that is not the running wrapper itself is used, so installing the
/// wrapper as `git` does not recurse into itself.
pub fn resolve_real_git(settings: &Settings) -> Result<PathBuf> {
    if let Some(path) = &settings.real_git {
        if !path.is_file() {
            return Err(AppError::MissingExecutable(path.clone()).into());
        }
        return Ok(path.clone());
    }

    let self_exe = std::env::current_exe().ok();
    let candidates = which::which_all("git").map_err(|_| AppError::RealGitNotFound)?;
    first_foreign(candidates, self_exe.as_deref()).ok_or_else(|| AppError::RealGitNotFound.into())
}

/// First candidate that does not resolve to `self_exe`.
fn first_foreign(
    candidates: impl IntoIterator<Item = PathBuf>,
    self_exe: Option<&Path>,
) -> Option<PathBuf> {
    let self_canonical = self_exe.and_then(|p| p.canonicalize().ok());
    candidates.into_iter().find(|candidate| {
        let Some(own) = &self_canonical else {
            return true;
        };
        candidate
            .canonicalize()
            .map(|resolved| &resolved != own)
            .unwrap_or(true)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_missing_path_is_missing_executable() {
        let settings = Settings {
            real_git: Some(PathBuf::from("/nonexistent/fwg/git_abc123")),
            ..Settings::default()
        };
        let err = resolve_real_git(&settings).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AppError>(),
            Some(AppError::MissingExecutable(_))
        ));
    }

    #[test]
    fn test_explicit_existing_path_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let git = dir.path().join("git");
        std::fs::write(&git, "").unwrap();
        let settings = Settings {
            real_git: Some(git.clone()),
            ..Settings::default()
        };
        assert_eq!(resolve_real_git(&settings).unwrap(), git);
    }

    #[test]
    fn test_first_foreign_skips_self() {
        let dir = tempfile::tempdir().unwrap();
        let wrapper = dir.path().join("wrapper-git");
        let real = dir.path().join("real-git");
        std::fs::write(&wrapper, "").unwrap();
        std::fs::write(&real, "").unwrap();

        let picked = first_foreign(vec![wrapper.clone(), real.clone()], Some(&wrapper));
        assert_eq!(picked, Some(real));
    }

    #[test]
    fn test_first_foreign_without_self_takes_first() {
        let picked = first_foreign(
            vec![PathBuf::from("/a/git"), PathBuf::from("/b/git")],
            None,
        );
        assert_eq!(picked, Some(PathBuf::from("/a/git")));
    }

    #[test]
    fn test_first_foreign_only_self_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let wrapper = dir.path().join("git");
        std::fs::write(&wrapper, "").unwrap();
        assert!(first_foreign(vec![wrapper.clone()], Some(&wrapper)).is_none());
    }
}
