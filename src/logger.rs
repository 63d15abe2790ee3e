// A minimal `log` implementation for the `recur` binary. Records go to
// stderr as `timestamp|level|file:line: message`. Filtering is left to
// `log::set_max_level`.

use std::{
    path::{Path, PathBuf},
    sync::{LazyLock, Mutex},
};

use {
    jiff::{Timestamp, tz::TimeZone},
    log::Log,
};

use crate::style::Theme;

#[derive(Debug)]
pub struct Logger {
    /// The time zone used for timestamps. When absent, UTC is used.
    tz: Mutex<Option<TimeZone>>,
}

impl Logger {
    /// Installs a new stderr logger as the global logger and returns it.
    pub fn init() -> Result<&'static Logger, log::SetLoggerError> {
        let logger = Box::leak(Box::new(Logger { tz: Mutex::new(None) }));
        log::set_logger(logger)?;
        Ok(logger)
    }

    pub fn set_time_zone(&self, tz: TimeZone) {
        let mut guard = self.tz.lock().unwrap_or_else(|e| e.into_inner());
        *guard = Some(tz);
    }

    /// Renders the current time for a log record.
    ///
    /// `Zoned::now()` is avoided here since finding the system time zone
    /// may log, and that would recurse back into this logger.
    fn now(&self) -> String {
        let ts = Timestamp::now();
        let tz = self.tz.lock().unwrap_or_else(|e| e.into_inner()).clone();
        match tz {
            None => ts.to_string(),
            Some(tz) => ts.to_zoned(tz).to_string(),
        }
    }
}

impl Log for Logger {
    fn enabled(&self, _: &log::Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &log::Record<'_>) {
        let now = Theme::stderr().highlight(self.now());
        let level = record.level();
        let target = record.target();
        match (record.file(), record.line()) {
            (Some(file), Some(line)) => {
                eprintln!(
                    "{now}|{level}|{}:{line}: {}",
                    relative(file),
                    record.args(),
                );
            }
            (Some(file), None) => {
                eprintln!(
                    "{now}|{level}|{}: {}",
                    relative(file),
                    record.args(),
                );
            }
            _ => {
                eprintln!("{now}|{level}|{target}: {}", record.args());
            }
        }
    }

    fn flush(&self) {}
}

/// Strips the current directory from a source path, if possible.
fn relative(path: &str) -> &str {
    static CWD: LazyLock<Option<PathBuf>> =
        LazyLock::new(|| std::env::current_dir().ok());
    let Some(ref cwd) = *CWD else { return path };
    Path::new(path)
        .strip_prefix(cwd)
        .ok()
        .and_then(|p| p.to_str())
        .unwrap_or(path)
}
