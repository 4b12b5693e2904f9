use once_cell::sync::Lazy;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Current log file writer. Swapped by every call to [`init`], so the global
/// subscriber only has to be installed once.
static FILE_SINK: Lazy<Mutex<Option<NonBlocking>>> = Lazy::new(|| Mutex::new(None));
static FILE_GUARD: Lazy<Mutex<Option<WorkerGuard>>> = Lazy::new(|| Mutex::new(None));

#[derive(Clone, Copy)]
struct FileSink;

enum SinkWriter {
    File(NonBlocking),
    Discard,
}

impl io::Write for SinkWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            SinkWriter::File(w) => w.write(buf),
            SinkWriter::Discard => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            SinkWriter::File(w) => w.flush(),
            SinkWriter::Discard => Ok(()),
        }
    }
}

impl<'a> MakeWriter<'a> for FileSink {
    type Writer = SinkWriter;

    fn make_writer(&'a self) -> Self::Writer {
        FILE_SINK
            .lock()
            .ok()
            .and_then(|sink| sink.clone())
            .map(SinkWriter::File)
            .unwrap_or(SinkWriter::Discard)
    }
}

fn open_log_file(path: &PathBuf) -> io::Result<std::fs::File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
}

/// Initialise logging. Without `debug` the level is fixed at `info`; with it
/// the default is `debug` and `RUST_LOG` may override it.
///
/// When `log_file` is given every event is also appended to that file;
/// `None` detaches the file set by an earlier call.
pub fn init(debug: bool, log_file: Option<PathBuf>) {
    let (sink, guard) = match log_file.as_ref().map(open_log_file) {
        Some(Ok(file)) => {
            let (writer, guard) = tracing_appender::non_blocking(file);
            (Some(writer), Some(guard))
        }
        Some(Err(e)) => {
            eprintln!("failed to open log file: {e}");
            (None, None)
        }
        None => (None, None),
    };
    if let Ok(mut slot) = FILE_SINK.lock() {
        *slot = sink;
    }
    // Dropping the previous guard flushes and closes the old file.
    let previous = FILE_GUARD
        .lock()
        .ok()
        .and_then(|mut slot| std::mem::replace(&mut *slot, guard));
    drop(previous);

    let level = if debug { "debug" } else { "info" };
    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new(level)
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(FileSink),
        )
        .try_init();
    if let Some(path) = log_file {
        tracing::debug!(path = %path.display(), "logging to file");
    }
}
