#![deny(missing_docs)]
//! Shared logging utilities for the scraper workspace.
//!
//! This crate provides the `scrape_*` logging macros used across the codebase,
//! a JSON-lines logger for operators and automation, and a minimal test
//! initializer for the global logger.
//!
//! Contextual fields travel as `log` key-values:
//!
//! ```ignore
//! scrape_warn!(url = url, error_code = 1003u16; "HTTP error fetching {}", url);
//! ```

use std::io::{self, Write};

use chrono::{Local, SecondsFormat};
use log::kv::{self, Key, Value, VisitSource};
use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};
use serde_json::{Map, Number};

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! scrape_trace {
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! scrape_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! scrape_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! scrape_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! scrape_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Writes one JSON object per record to stdout.
///
/// Every object carries `timestamp`, `level`, `target`, `thread` and `message`,
/// followed by the record's key-value fields.
pub struct JsonLogger {
    level: LevelFilter,
}

impl JsonLogger {
    /// Creates a logger that drops records above `level`.
    pub fn new(level: LevelFilter) -> Self {
        Self { level }
    }
}

impl Log for JsonLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = render_record(record);
        // One locked write per line keeps lines from different workers whole.
        let stdout = io::stdout();
        let mut out = stdout.lock();
        let _ = writeln!(out, "{line}");
    }

    fn flush(&self) {
        let _ = io::stdout().flush();
    }
}

/// Installs [`JsonLogger`] as the global logger.
pub fn init_json_logger(level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_boxed_logger(Box::new(JsonLogger::new(level)))?;
    log::set_max_level(level);
    Ok(())
}

/// Renders a record as a single-line JSON object.
pub fn render_record(record: &Record) -> String {
    let mut fields = Map::new();
    fields.insert(
        "timestamp".into(),
        Local::now()
            .to_rfc3339_opts(SecondsFormat::Millis, false)
            .into(),
    );
    fields.insert("level".into(), record.level().as_str().into());
    fields.insert("target".into(), record.target().into());
    if let Some(name) = std::thread::current().name() {
        fields.insert("thread".into(), name.into());
    }
    fields.insert("message".into(), record.args().to_string().into());

    let mut collector = FieldCollector {
        fields: &mut fields,
    };
    // Only the visitor can fail and it never does.
    let _ = record.key_values().visit(&mut collector);

    serde_json::Value::Object(fields).to_string()
}

struct FieldCollector<'a> {
    fields: &'a mut Map<String, serde_json::Value>,
}

impl<'kvs> VisitSource<'kvs> for FieldCollector<'_> {
    fn visit_pair(&mut self, key: Key<'kvs>, value: Value<'kvs>) -> Result<(), kv::Error> {
        self.fields
            .insert(key.as_str().to_string(), json_value(&value));
        Ok(())
    }
}

fn json_value(value: &Value) -> serde_json::Value {
    if let Some(n) = value.to_u64() {
        return serde_json::Value::Number(Number::from(n));
    }
    if let Some(n) = value.to_i64() {
        return serde_json::Value::Number(Number::from(n));
    }
    if let Some(b) = value.to_bool() {
        return serde_json::Value::Bool(b);
    }
    serde_json::Value::String(value.to_string())
}

/// Installs a `simplelog` terminal logger for tests.
///
/// `SCRAPE_TEST_LOG` (for example `trace`) overrides the default debug level.
/// A no-op when a logger is already installed.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, ConfigBuilder, TermLogger, TerminalMode};

    let level = std::env::var("SCRAPE_TEST_LOG")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(LevelFilter::Debug);
    let config = ConfigBuilder::new()
        .set_thread_level(LevelFilter::Error)
        .set_target_level(LevelFilter::Off)
        .build();
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        config,
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
