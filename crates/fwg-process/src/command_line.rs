//! Moving an argument vector through a single command-line string.

use std::borrow::Cow;
use tokio::process::Command;

/// Join `args` into one command line that splits back into the same tokens.
///
/// Tokens already wrapped in double quotes were quoted on purpose by an
/// argument rewrite and pass through as-is. Every other token is quoted only
/// when it would not survive splitting on its own.
pub fn join_command_line<S: AsRef<str>>(args: &[S]) -> String {
    args.iter()
        .map(|arg| quote_token(arg.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

fn quote_token(token: &str) -> Cow<'_, str> {
    if is_wrapped_in_quotes(token) {
        return Cow::Borrowed(token);
    }
    platform_quote(token)
}

fn is_wrapped_in_quotes(token: &str) -> bool {
    token.len() >= 2 && token.starts_with('"') && token.ends_with('"')
}

#[cfg(not(windows))]
fn platform_quote(token: &str) -> Cow<'_, str> {
    shell_words::quote(token)
}

#[cfg(windows)]
fn platform_quote(token: &str) -> Cow<'_, str> {
    if !token.is_empty() && !token.contains(|c: char| c.is_whitespace() || c == '"') {
        return Cow::Borrowed(token);
    }
    Cow::Owned(format!("\"{}\"", token.replace('"', "\\\"")))
}

/// Append `arguments` to `cmd`.
///
/// Windows receives the string verbatim so the child's own parser sees the
/// quoting untouched. Elsewhere it is split with POSIX shell-word rules.
pub(crate) fn apply_arguments(cmd: &mut Command, arguments: &str) {
    #[cfg(windows)]
    {
        if !arguments.is_empty() {
            cmd.raw_arg(arguments);
        }
    }
    #[cfg(not(windows))]
    {
        cmd.args(split_command_line(arguments));
    }
}

/// Split a command line with shell-word rules, falling back to plain
/// whitespace splitting when the quoting is unbalanced.
pub fn split_command_line(arguments: &str) -> Vec<String> {
    match shell_words::split(arguments) {
        Ok(words) => words,
        Err(e) => {
            tracing::warn!("Unbalanced quoting in '{arguments}' ({e}), splitting on whitespace");
            arguments.split_whitespace().map(str::to_string).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_split_plain() {
        assert_eq!(
            split_command_line("log -n 3 --oneline"),
            vec!["log", "-n", "3", "--oneline"]
        );
    }

    #[test]
    fn test_split_strips_wrapping_quotes() {
        assert_eq!(
            split_command_line("log \"--format=%H %s\""),
            vec!["log", "--format=%H %s"]
        );
    }

    #[test]
    fn test_split_empty() {
        assert!(split_command_line("").is_empty());
        assert!(split_command_line("   ").is_empty());
    }

    #[test]
    fn test_split_unbalanced_falls_back_to_whitespace() {
        assert_eq!(
            split_command_line("commit -m don't"),
            vec!["commit", "-m", "don't"]
        );
    }

    #[test]
    fn test_join_leaves_simple_tokens_bare() {
        assert_eq!(
            join_command_line(&args(&["checkout", "-b", "topic", "--quiet"])),
            "checkout -b topic --quiet"
        );
    }

    #[test]
    fn test_join_keeps_rewritten_quotes() {
        assert_eq!(
            join_command_line(&args(&["commit", "-m", "\"fix the bug\""])),
            "commit -m \"fix the bug\""
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_join_then_split_preserves_tokens_with_spaces() {
        let list = args(&[
            "commit",
            "-am",
            "fix the bug",
            "--message=second line",
            "-mthird one",
            "don't",
            "",
        ]);
        assert_eq!(split_command_line(&join_command_line(&list)), list);
    }

    #[cfg(unix)]
    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_join_then_split_is_identity(
                list in proptest::collection::vec("[a-z =%'$;*\"\\\\-]{0,8}", 0..8)
                    .prop_filter("rewritten tokens keep their quotes", |list| {
                        list.iter().all(|arg| !is_wrapped_in_quotes(arg))
                    }),
            ) {
                prop_assert_eq!(split_command_line(&join_command_line(&list)), list);
            }
        }
    }
}
