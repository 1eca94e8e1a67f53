//! Rewrites applied to every invocation regardless of command.

const FORMAT_PREFIX: &str = "--format=";

/// Apply both generic rewrites. `-c` stripping is opt-in.
pub fn generic_rewrite(args: &mut Vec<String>, clean_c_arguments: bool) {
    if clean_c_arguments {
        strip_c_arguments(args);
    }
    ensure_format_is_quoted(args);
}

/// Remove every adjacent `-c <value>` pair until none remain.
///
/// A trailing `-c` without a value has no partner and is kept.
pub fn strip_c_arguments(args: &mut Vec<String>) {
    while let Some(index) = find_c_pair(args) {
        args.drain(index..=index + 1);
    }
}

fn find_c_pair(args: &[String]) -> Option<usize> {
    args.iter()
        .take(args.len().saturating_sub(1))
        .position(|arg| arg == "-c")
}

/// Wrap `--format=<value>` tokens in quotes so the format string survives
/// being re-split as part of a command line. Already quoted values and a
/// bare `--format=` are left alone.
pub fn ensure_format_is_quoted(args: &mut [String]) {
    for arg in args.iter_mut() {
        let Some(value) = arg.strip_prefix(FORMAT_PREFIX) else {
            continue;
        };
        if value.is_empty() || value.starts_with('"') || arg.ends_with('"') {
            continue;
        }
        *arg = format!("\"{arg}\"");
    }
}
