use anyhow::{Context, Result};
use fwg_config::Settings;
use std::ffi::OsString;

mod logging;
mod pipeline;

use logging::{LogControl, Logging};
use pipeline::Invocation;

#[tokio::main]
async fn main() -> Result<()> {
    let logging = Logging::init(fwg_config::paths::log_dir());

    // Every argument is git's. Nothing is parsed as an fwg flag.
    let args = collect_args(std::env::args_os().skip(1));

    let prepared = std::env::current_dir()
        .context("Failed to determine current directory")
        .and_then(|cwd| Settings::load(&cwd).map(|settings| (cwd, settings)));
    let (cwd, settings) = match prepared {
        Ok(prepared) => prepared,
        Err(e) => {
            logging.force_file_logging();
            tracing::error!("Failed to start: {e:#}");
            logging.finish();
            return Err(e);
        }
    };

    if let Err(e) =
        logging::wipe_logs_older_than(logging.log_dir(), settings.wipe_logs_older_than_days)
    {
        tracing::warn!("Failed to wipe old logs: {e:#}");
    }

    let exit_code = Invocation::new(args, cwd, settings).run(&logging).await?;
    std::process::exit(exit_code);
}

/// Convert raw argv to strings. Arguments that are not valid UTF-8 are
/// converted lossily and reported, since git will see replacement characters.
fn collect_args(raw: impl IntoIterator<Item = OsString>) -> Vec<String> {
    raw.into_iter()
        .enumerate()
        .map(|(index, arg)| {
            arg.into_string().unwrap_or_else(|arg| {
                let lossy = arg.to_string_lossy().into_owned();
                tracing::warn!(
                    index,
                    "Argument is not valid UTF-8, passing it on as '{lossy}'"
                );
                lossy
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_args_passes_utf8_through() {
        let raw = ["commit", "-m", "café crème"].map(OsString::from);
        assert_eq!(collect_args(raw), vec!["commit", "-m", "café crème"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_collect_args_replaces_invalid_bytes() {
        use std::os::unix::ffi::OsStringExt;
        let raw = vec![
            OsString::from("add"),
            OsString::from_vec(vec![b'a', 0xff, b'.', b't', b'x', b't']),
        ];
        assert_eq!(collect_args(raw), vec!["add", "a\u{FFFD}.txt"]);
    }
}
