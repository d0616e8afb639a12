// ./src/logging.rs

use log::{LevelFilter, Metadata, SetLoggerError};

/// Console logger that integrates with the `log` crate.
pub struct ConsoleLogger;

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            println!(
                "[{}] {}: {}",
                record.level(),
                record.target(),
                record.args()
            );
        }
    }

    fn flush(&self) {}
}

/// Initializes the console logger with the given level filter.
///
/// Safe to call more than once; only the first call installs the logger.
pub fn init_logger(level_filter: LevelFilter) -> Result<(), SetLoggerError> {
    static INIT: std::sync::Once = std::sync::Once::new();
    let mut result = Ok(());
    INIT.call_once(|| {
        result = log::set_logger(&ConsoleLogger).map(|()| log::set_max_level(level_filter));
    });
    result
}

/// Maps a configuration string to a level filter, defaulting to `Info`.
pub fn level_from_str(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}
