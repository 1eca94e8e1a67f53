use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("File does not exist: {}", .0.display())]
    MissingExecutable(PathBuf),

    #[error("'{command}' command had no target files (missing '--' separator)")]
    MissingSeparator { command: String },

    #[error("Real git executable not found on PATH")]
    RealGitNotFound,

    #[error("Hook folder is not a directory: {}", .0.display())]
    InvalidHookFolder(PathBuf),
}
