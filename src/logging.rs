// Logging - stdout plus an append-only log file
// Lines look like "[12:34:56] [kai] Created todo ..."

use std::fmt::Write as _;
use std::fs::OpenOptions;
use std::io::{self, LineWriter};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "kai_sdk=info,kai_cli=info";

/// Prefixes every line with the wall-clock time and a `[kai]` tag
#[derive(Clone)]
pub struct KaiTimer;

impl FormatTime for KaiTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let now = chrono::Utc::now();
        write!(w, "[{}] [kai]", now.format("%H:%M:%S"))
    }
}

/// Install the global subscriber. Keep the returned guard alive for the
/// lifetime of the process or buffered file lines are lost.
pub fn init(log_file: &str) -> io::Result<WorkerGuard> {
    // flushed per line
    let file = OpenOptions::new().create(true).append(true).open(log_file)?;
    let (non_blocking, guard) = tracing_appender::non_blocking(LineWriter::new(file));

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()))
        // terminal
        .with(
            fmt::layer()
                .with_timer(KaiTimer)
                .with_target(false)
                .with_level(false)
                .with_ansi(true),
        )
        // log file, plain text
        .with(
            fmt::layer()
                .with_timer(KaiTimer)
                .with_target(false)
                .with_level(false)
                .with_ansi(false)
                .with_writer(non_blocking),
        )
        .init();

    Ok(guard)
}
