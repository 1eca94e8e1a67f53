//! Console + deferred file logging.
//!
//! Whether an invocation is quiet is only known once its command has been
//! classified, so the file sink starts out buffering in memory. The pipeline
//! activates it once the hook set is known; the buffer is discarded if file
//! logging stays off and no fault forced it on.

use anyhow::{Context, Result};
use chrono::Local;
use std::collections::VecDeque;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::filter::{FilterExt, LevelFilter, filter_fn};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, reload};

const LOG_FILE_PREFIX: &str = "fwg-";
const LOG_FILE_SUFFIX: &str = ".log";

/// Target used for forwarded child output. Already shown on the console by
/// the process runner, so only the file sink records it.
const CHILD_OUTPUT_TARGET: &str = "fwg::output";

/// Controls the pipeline needs over logging once an invocation is underway.
pub trait LogControl {
    /// Quiet console (warnings only) or verbose console (info).
    fn set_console_silent(&self, silent: bool);
    /// Start writing to the log file if `enabled`, flushing what was buffered.
    fn activate_and_flush(&self, enabled: bool);
    /// A fault occurred: make sure this invocation ends up in the log file.
    fn force_file_logging(&self);
    /// Write out anything still pending and close the file.
    fn finish(&self);
}

/// Bytes kept in memory while the sink waits for activation.
const BUFFER_LIMIT: usize = 1024 * 1024;

/// Pre-activation log bounded to a byte budget.
///
/// The first half of the budget keeps the start of the run. The second half
/// keeps the most recent writes, evicting the oldest, so a fault logged at
/// the end is never lost behind a large child output.
struct LogBuffer {
    head: Vec<u8>,
    tail: VecDeque<Vec<u8>>,
    tail_len: usize,
    half: usize,
    dropped: usize,
}

impl LogBuffer {
    fn new(limit: usize) -> Self {
        Self {
            head: Vec::new(),
            tail: VecDeque::new(),
            tail_len: 0,
            half: limit / 2,
            dropped: 0,
        }
    }

    fn push(&mut self, bytes: &[u8]) {
        let head_open = self.tail.is_empty() && self.dropped == 0;
        if head_open && self.head.len() + bytes.len() <= self.half {
            self.head.extend_from_slice(bytes);
            return;
        }
        if bytes.len() > self.half {
            self.dropped += bytes.len();
            return;
        }
        self.tail.push_back(bytes.to_vec());
        self.tail_len += bytes.len();
        while self.tail_len > self.half {
            let Some(evicted) = self.tail.pop_front() else {
                break;
            };
            self.tail_len -= evicted.len();
            self.dropped += evicted.len();
        }
    }

    fn write_to(&self, out: &mut impl Write) -> io::Result<()> {
        out.write_all(&self.head)?;
        if self.dropped > 0 {
            writeln!(out, "... {} bytes of log dropped while buffering ...", self.dropped)?;
        }
        for chunk in &self.tail {
            out.write_all(chunk)?;
        }
        Ok(())
    }
}

enum SinkState {
    Buffering(LogBuffer),
    Active {
        writer: NonBlocking,
        _guard: WorkerGuard,
    },
    Closed,
}

/// File sink that buffers until activated.
#[derive(Clone)]
pub struct DeferredSink {
    state: Arc<Mutex<SinkState>>,
}

impl Default for DeferredSink {
    fn default() -> Self {
        Self::with_buffer_limit(BUFFER_LIMIT)
    }
}

impl DeferredSink {
    fn with_buffer_limit(limit: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(SinkState::Buffering(LogBuffer::new(limit)))),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SinkState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_buffering(&self) -> bool {
        matches!(*self.lock(), SinkState::Buffering(_))
    }

    /// Switch to writing into a dated file under `log_dir`.
    fn activate(&self, log_dir: &Path) -> Result<()> {
        let mut state = self.lock();
        let SinkState::Buffering(buffer) = &*state else {
            return Ok(());
        };
        let (mut writer, guard) = create_log_writer(log_dir)?;
        buffer
            .write_to(&mut writer)
            .context("Failed to flush buffered log")?;
        *state = SinkState::Active {
            writer,
            _guard: guard,
        };
        Ok(())
    }

    /// Drop the buffer or the file writer. Dropping the worker guard flushes.
    fn close(&self) {
        *self.lock() = SinkState::Closed;
    }
}

pub struct DeferredWriter {
    sink: DeferredSink,
}

impl Write for DeferredWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &mut *self.sink.lock() {
            SinkState::Buffering(buffer) => {
                buffer.push(buf);
                Ok(buf.len())
            }
            SinkState::Active { writer, .. } => writer.write(buf),
            SinkState::Closed => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut *self.sink.lock() {
            SinkState::Active { writer, .. } => writer.flush(),
            _ => Ok(()),
        }
    }
}

impl<'a> MakeWriter<'a> for DeferredSink {
    type Writer = DeferredWriter;

    fn make_writer(&'a self) -> Self::Writer {
        DeferredWriter { sink: self.clone() }
    }
}

/// Create the non-blocking writer for today's log file in `log_dir`.
///
/// Log files are named `fwg-YYYYMMDD.log`; runs on the same day append.
pub fn create_log_writer(log_dir: &Path) -> Result<(NonBlocking, WorkerGuard)> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log dir {}", log_dir.display()))?;
    let file_name = format!(
        "{LOG_FILE_PREFIX}{}{LOG_FILE_SUFFIX}",
        Local::now().format("%Y%m%d")
    );
    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    Ok(tracing_appender::non_blocking(file_appender))
}

/// Global logging state for one `fwg` run.
pub struct Logging {
    sink: DeferredSink,
    console: reload::Handle<LevelFilter, Registry>,
    log_dir: PathBuf,
    forced: AtomicBool,
}

impl Logging {
    /// Install the global subscriber. The console starts quiet.
    pub fn init(log_dir: PathBuf) -> Self {
        let sink = DeferredSink::default();
        let (console_level, console) = reload::Layer::new(LevelFilter::WARN);

        let console_filter =
            console_level.and(filter_fn(|meta| meta.target() != CHILD_OUTPUT_TARGET));
        let console_layer = tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .without_time()
            .with_target(false)
            .with_filter(console_filter);

        let file_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(sink.clone())
            .with_ansi(false)
            .with_target(false)
            .with_filter(file_filter);

        tracing_subscriber::registry()
            .with(console_layer)
            .with(file_layer)
            .try_init()
            .ok();

        Self {
            sink,
            console,
            log_dir,
            forced: AtomicBool::new(false),
        }
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    fn activate(&self) {
        if let Err(e) = self.sink.activate(&self.log_dir) {
            eprintln!("fwg: file logging unavailable: {e:#}");
            self.sink.close();
        }
    }
}

impl LogControl for Logging {
    fn set_console_silent(&self, silent: bool) {
        let level = if silent {
            LevelFilter::WARN
        } else {
            LevelFilter::INFO
        };
        if let Err(e) = self.console.modify(|filter| *filter = level) {
            eprintln!("fwg: failed to change console log level: {e}");
        }
    }

    fn activate_and_flush(&self, enabled: bool) {
        if enabled {
            self.activate();
        }
    }

    fn force_file_logging(&self) {
        self.forced.store(true, Ordering::SeqCst);
    }

    fn finish(&self) {
        if self.forced.load(Ordering::SeqCst) && self.sink.is_buffering() {
            self.activate();
        }
        self.sink.close();
    }
}

/// Delete `fwg-*.log` files in `log_dir` last modified more than `days` ago.
/// `0` disables wiping. Returns the number of files removed.
pub fn wipe_logs_older_than(log_dir: &Path, days: u64) -> Result<usize> {
    if days == 0 || !log_dir.is_dir() {
        return Ok(0);
    }
    let max_age = Duration::from_secs(days * 24 * 60 * 60);
    let now = SystemTime::now();

    let mut removed = 0;
    for entry in std::fs::read_dir(log_dir)
        .with_context(|| format!("Failed to read log dir {}", log_dir.display()))?
    {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if !name.starts_with(LOG_FILE_PREFIX) || !name.ends_with(LOG_FILE_SUFFIX) {
            continue;
        }
        let modified = entry.metadata()?.modified()?;
        let age = now.duration_since(modified).unwrap_or_default();
        if age > max_age {
            std::fs::remove_file(entry.path())
                .with_context(|| format!("Failed to remove old log {name}"))?;
            removed += 1;
        }
    }
    if removed > 0 {
        tracing::debug!(removed, "Wiped old log files");
    }
    Ok(removed)
}
