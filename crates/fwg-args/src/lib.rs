//! Command classification and argument rewriting.
//!
//! Two passes run over every invocation before anything is spawned:
//! - generic rewrites (`-c` stripping, `--format=` quoting)
//! - an optional per-command strategy keyed on the command token
//!
//! The command token's index can shift during rewriting, so callers must
//! re-run [`locate_command_token`] afterwards.

pub mod classify;
pub mod generic;
pub mod quote;
pub mod strategy;

pub use classify::{Classification, classify, classify_command, locate_command_token};
pub use generic::{ensure_format_is_quoted, generic_rewrite, strip_c_arguments};
pub use strategy::{ArgRewriter, strategy_for};

use fwg_core::AppError;

/// Run the generic rewrites, then the strategy registered for `token`.
pub fn process_args(
    token: Option<&str>,
    args: &mut Vec<String>,
    clean_c_arguments: bool,
) -> Result<(), AppError> {
    generic_rewrite(args, clean_c_arguments);
    if let Some(rewriter) = token.and_then(strategy_for) {
        rewriter.rewrite(args)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_process_args_generic_then_strategy() {
        let mut list = args(&["-c", "core.quotepath=off", "add", "--", "a b.txt"]);
        process_args(Some("add"), &mut list, true).unwrap();
        assert_eq!(list, args(&["add", "--", "\"a b.txt\""]));
    }

    #[test]
    fn test_process_args_strategy_error_surfaces() {
        let mut list = args(&["add", "file.txt"]);
        let err = process_args(Some("add"), &mut list, false).unwrap_err();
        assert!(matches!(err, AppError::MissingSeparator { .. }));
    }

    #[test]
    fn test_process_args_without_token() {
        let mut list = args(&["--version"]);
        process_args(None, &mut list, true).unwrap();
        assert_eq!(list, args(&["--version"]));
    }
}
