use fwg_core::CommandKind;

/// Find the git subcommand among the raw arguments.
///
/// Scans left to right: `--long` options are skipped, and a `-x` option is
/// skipped together with the token after it (its value). The first remaining
/// token is the command. Returns `(index, token)`.
pub fn locate_command_token(args: &[String]) -> Option<(usize, &str)> {
    let mut i = 0;
    while i < args.len() {
        let arg = args[i].as_str();
        if arg.starts_with("--") {
            i += 1;
        } else if arg.starts_with('-') {
            i += 2;
        } else {
            return Some((i, arg));
        }
    }
    None
}

/// Map a command token to its kind. Unmapped tokens are `Unknown`.
pub fn classify_command(token: &str) -> CommandKind {
    CommandKind::from_token(token)
}

/// Outcome of classifying one argument list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub kind: CommandKind,
    pub token: Option<String>,
    pub index: Option<usize>,
}

/// Locate and classify the command in one step.
pub fn classify(args: &[String]) -> Classification {
    match locate_command_token(args) {
        Some((index, token)) => {
            let kind = classify_command(token);
            if kind == CommandKind::Unknown {
                tracing::info!("Unknown command: {token}");
            }
            Classification {
                kind,
                token: Some(token.to_string()),
                index: Some(index),
            }
        }
        None => {
            tracing::info!("No command found");
            Classification {
                kind: CommandKind::Unknown,
                token: None,
                index: None,
            }
        }
    }
}
