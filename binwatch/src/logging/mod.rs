//! Logging setup.
//!
//! Logs go to two places: a compact console layer for the operator and a
//! non-blocking file layer for later inspection. `RUST_LOG` overrides the
//! default level.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use time::macros::format_description;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Keeps the file writer alive. Logs written after the guard is dropped
/// may be lost, so hold it for the lifetime of the program.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
    log_path: PathBuf,
}

impl LoggingGuard {
    /// Full path of the log file.
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }
}

/// Default filter directive.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "binwatch=debug,info"
    } else {
        "info"
    }
}

/// Install the global subscriber.
///
/// Creates `directory` if needed. Fails if the directory cannot be created
/// or a global subscriber is already set.
pub fn init_logging(directory: &Path, file_name: &str, verbose: bool) -> io::Result<LoggingGuard> {
    fs::create_dir_all(directory)?;

    let appender = tracing_appender::rolling::never(directory, file_name);
    let (file_writer, file_guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let console = fmt::layer()
        .with_target(false)
        .with_timer(LocalTime::new(format_description!(
            "[hour]:[minute]:[second]"
        )));

    let file = fmt::layer()
        .with_ansi(false)
        .with_writer(file_writer)
        .with_timer(LocalTime::new(format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]"
        )));

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    Ok(LoggingGuard {
        _file_guard: file_guard,
        log_path: directory.join(file_name),
    })
}
