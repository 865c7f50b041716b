//! Console Logger
//!
//! `log` backend for wasm frontends.
//! Records go to the browser console (stderr on native targets) and the
//! most recent lines are kept in a circular buffer for diagnostics.

use std::collections::VecDeque;
use std::sync::{Mutex, OnceLock};

use chrono::{SecondsFormat, Utc};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

/// Number of formatted lines kept by the global logger
pub const DEFAULT_CAPACITY: usize = 200;

static LOGGER: OnceLock<ConsoleLogger> = OnceLock::new();

/// Console sink with a bounded history of formatted records
pub struct ConsoleLogger {
    level: LevelFilter,
    capacity: usize,
    buffer: Mutex<VecDeque<String>>,
}

impl ConsoleLogger {
    pub fn new(level: LevelFilter, capacity: usize) -> Self {
        Self {
            level,
            capacity,
            buffer: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Snapshot of buffered lines, oldest first
    pub fn recent(&self) -> Vec<String> {
        match self.buffer.lock() {
            Ok(buffer) => buffer.iter().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }

    fn push(&self, line: String) {
        if self.capacity == 0 {
            return;
        }
        let Ok(mut buffer) = self.buffer.lock() else {
            return;
        };
        while buffer.len() >= self.capacity {
            buffer.pop_front();
        }
        buffer.push_back(line);
    }
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_record(record);
        write_console(record.level(), &line);
        self.push(line);
    }

    fn flush(&self) {}
}

fn format_record(record: &Record) -> String {
    format!(
        "{} {:<5} {}",
        Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        record.level(),
        record.args()
    )
}

#[cfg(target_arch = "wasm32")]
fn write_console(level: Level, line: &str) {
    let value = wasm_bindgen::JsValue::from_str(line);
    match level {
        Level::Error => web_sys::console::error_1(&value),
        Level::Warn => web_sys::console::warn_1(&value),
        Level::Info => web_sys::console::info_1(&value),
        Level::Debug | Level::Trace => web_sys::console::debug_1(&value),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn write_console(_level: Level, line: &str) {
    eprintln!("{}", line);
}

/// Install the global logger with the default history size
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    init_with_capacity(level, DEFAULT_CAPACITY)
}

/// Install the global logger.
///
/// Only the first call configures level and capacity; later calls return
/// the `SetLoggerError` from `log`.
pub fn init_with_capacity(level: LevelFilter, capacity: usize) -> Result<(), SetLoggerError> {
    let logger = LOGGER.get_or_init(|| ConsoleLogger::new(level, capacity));
    log::set_logger(logger)?;
    log::set_max_level(level);
    Ok(())
}

/// Buffered lines of the global logger (empty before `init`)
pub fn recent() -> Vec<String> {
    LOGGER.get().map(ConsoleLogger::recent).unwrap_or_default()
}
