//! Per-command argument rewriting.
//!
//! Each strategy makes sure tokens that may contain whitespace survive being
//! joined into a single command line and split again by the real git.

use fwg_core::AppError;

use crate::quote::add_quotes_if_necessary;

const SEPARATOR: &str = "--";

/// A command-specific rewrite of the full argument list.
pub trait ArgRewriter: Sync {
    fn rewrite(&self, args: &mut Vec<String>) -> Result<(), AppError>;
}

/// Strategy registered for a command token, if any.
pub fn strategy_for(token: &str) -> Option<&'static dyn ArgRewriter> {
    match token {
        "add" => Some(&TargetFilesRewriter { command: "add" }),
        "commit" | "tag" => Some(&MessageRewriter),
        "checkout" | "reset" => Some(&PathspecRewriter),
        _ => None,
    }
}

/// `add`-like commands: a `--` separator is mandatory and every file after
/// it is quoted.
struct TargetFilesRewriter {
    command: &'static str,
}

impl ArgRewriter for TargetFilesRewriter {
    fn rewrite(&self, args: &mut Vec<String>) -> Result<(), AppError> {
        let Some(separator) = args.iter().position(|arg| arg == SEPARATOR) else {
            return Err(AppError::MissingSeparator {
                command: self.command.to_string(),
            });
        };
        quote_from(args, separator + 1);
        Ok(())
    }
}

/// `commit`/`tag`: quote the value of `-m` / `--message`.
struct MessageRewriter;

impl ArgRewriter for MessageRewriter {
    fn rewrite(&self, args: &mut Vec<String>) -> Result<(), AppError> {
        let mut i = 0;
        while i + 1 < args.len() {
            if args[i] == "-m" || args[i] == "--message" {
                args[i + 1] = add_quotes_if_necessary(&args[i + 1]);
                i += 2;
            } else {
                i += 1;
            }
        }
        Ok(())
    }
}

/// `checkout`/`reset`: quote the paths after an optional `--`.
struct PathspecRewriter;

impl ArgRewriter for PathspecRewriter {
    fn rewrite(&self, args: &mut Vec<String>) -> Result<(), AppError> {
        if let Some(separator) = args.iter().position(|arg| arg == SEPARATOR) {
            quote_from(args, separator + 1);
        }
        Ok(())
    }
}

fn quote_from(args: &mut [String], start: usize) {
    for arg in args.iter_mut().skip(start) {
        *arg = add_quotes_if_necessary(arg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn rewrite(token: &str, raw: &[&str]) -> Result<Vec<String>, AppError> {
        let mut list = args(raw);
        strategy_for(token)
            .expect("strategy registered")
            .rewrite(&mut list)?;
        Ok(list)
    }

    #[test]
    fn test_add_requires_separator() {
        let err = rewrite("add", &["add", "file.txt"]).unwrap_err();
        assert!(matches!(err, AppError::MissingSeparator { command } if command == "add"));
    }

    #[test]
    fn test_add_quotes_after_separator() {
        let list = rewrite("add", &["add", "-v", "--", "my file.txt", "\"done.txt\""]).unwrap();
        assert_eq!(
            list,
            args(&["add", "-v", "--", "\"my file.txt\"", "\"done.txt\""])
        );
    }

    #[test]
    fn test_add_empty_file_list_is_fine() {
        let list = rewrite("add", &["add", "--"]).unwrap();
        assert_eq!(list, args(&["add", "--"]));
    }

    #[test]
    fn test_commit_message_quoted() {
        let list = rewrite("commit", &["commit", "-q", "-m", "fix the bug"]).unwrap();
        assert_eq!(list, args(&["commit", "-q", "-m", "\"fix the bug\""]));
    }

    #[test]
    fn test_tag_long_message_quoted() {
        let list = rewrite("tag", &["tag", "v1", "--message", "first release"]).unwrap();
        assert_eq!(list, args(&["tag", "v1", "--message", "\"first release\""]));
    }

    #[test]
    fn test_commit_trailing_flag_untouched() {
        let list = rewrite("commit", &["commit", "-m"]).unwrap();
        assert_eq!(list, args(&["commit", "-m"]));
    }

    #[test]
    fn test_checkout_without_separator_untouched() {
        let list = rewrite("checkout", &["checkout", "main"]).unwrap();
        assert_eq!(list, args(&["checkout", "main"]));
    }

    #[test]
    fn test_reset_paths_quoted() {
        let list = rewrite("reset", &["reset", "HEAD", "--", "a b.txt"]).unwrap();
        assert_eq!(list, args(&["reset", "HEAD", "--", "\"a b.txt\""]));
    }

    #[test]
    fn test_unregistered_command_has_no_strategy() {
        assert!(strategy_for("log").is_none());
        assert!(strategy_for("status").is_none());
    }
}
