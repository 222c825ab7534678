use std::fmt;

use error_stack::{IntoReport, ResultExt};
use fern::colors::{Color, ColoredLevelConfig};
use log::LevelFilter;

#[derive(Debug)]
pub struct LoggingError;

impl fmt::Display for LoggingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Logging error")
    }
}

impl std::error::Error for LoggingError {}

pub type LoggingResult<T> = error_stack::Result<T, LoggingError>;

/// `-v` count to level. Warnings are always shown.
pub fn level_for_verbosity(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Logs go to stderr so they don't mix with the listings on stdout.
pub fn init_logging(verbosity: u8) -> LoggingResult<()> {
    let colors = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Cyan)
        .trace(Color::BrightBlack);
    let level = level_for_verbosity(verbosity);

    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{} {}] {}",
                colors.color(record.level()),
                record.target(),
                message
            ))
        })
        .level(level)
        .level_for("hyper", LevelFilter::Warn)
        .level_for("reqwest", LevelFilter::Warn)
        .chain(std::io::stderr())
        .apply()
        .into_report()
        .change_context(LoggingError)
}
