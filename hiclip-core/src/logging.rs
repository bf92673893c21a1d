//! Logging infrastructure for hiclip
//!
//! Logs go to a daily file `hiclip.log.<date>` in `$XDG_STATE_HOME/hiclip/`.
//! stdout stays reserved for timecodes and results, and stderr for the
//! download spinner and errors.
//!
//! The level comes from `RUST_LOG` if set, else from `-v` on the command line,
//! else from `[logging] level` in the config.

use crate::config::{Config, LoggingConfig};
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log file name prefix; the appender adds the date.
const LOG_FILE_PREFIX: &str = "hiclip.log";

/// Filter directive for a configured level raised by `-v` flags.
///
/// One `-v` means debug and two or more mean trace, for hiclip's own crates
/// only; dependencies stay at the configured level.
pub fn filter_directive(level: &str, verbose: u8) -> String {
    match verbose {
        0 => level.to_string(),
        1 => format!("{level},hiclip=debug,hiclip_core=debug"),
        _ => format!("{level},hiclip=trace,hiclip_core=trace"),
    }
}

/// Initialize the logging system
pub fn init(config: &LoggingConfig, verbose: u8) -> crate::error::Result<LoggingGuard> {
    let log_dir = Config::state_dir();
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let directive = filter_directive(&config.level, verbose);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&directive));

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .init();

    tracing::info!(
        log_dir = %log_dir.display(),
        filter = %directive,
        version = env!("CARGO_PKG_VERSION"),
        "Logging initialized"
    );

    Ok(LoggingGuard {
        log_dir,
        _guard: guard,
    })
}

/// Initialize logging for tests (logs to the test writer)
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Keeps the background log writer alive; pending lines are flushed on drop.
pub struct LoggingGuard {
    log_dir: PathBuf,
    _guard: tracing_appender::non_blocking::WorkerGuard,
}

impl LoggingGuard {
    /// Directory holding the dated log files.
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directive_quiet() {
        assert_eq!(filter_directive("info", 0), "info");
        assert_eq!(filter_directive("warn", 0), "warn");
    }

    #[test]
    fn test_filter_directive_verbose_raises_own_crates() {
        assert_eq!(
            filter_directive("info", 1),
            "info,hiclip=debug,hiclip_core=debug"
        );
        assert_eq!(
            filter_directive("warn", 3),
            "warn,hiclip=trace,hiclip_core=trace"
        );
    }

    #[test]
    fn test_filter_directive_parses() {
        for verbose in 0..3 {
            assert!(EnvFilter::try_new(filter_directive("info", verbose)).is_ok());
        }
    }
}
