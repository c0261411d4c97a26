//! In-memory log capture for integration tests.

use std::sync::{Mutex, OnceLock};

use log::{Level, LevelFilter, Log, Metadata, Record};

struct CaptureLogger {
    records: Mutex<Vec<(Level, String)>>,
}

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        self.records
            .lock()
            .unwrap()
            .push((record.level(), record.args().to_string()));
    }

    fn flush(&self) {}
}

static LOGGER: OnceLock<CaptureLogger> = OnceLock::new();

/// Install the capturing logger for this test binary. Safe to call from
/// every test.
pub fn capture_logs() {
    let logger = LOGGER.get_or_init(|| CaptureLogger {
        records: Mutex::new(Vec::new()),
    });
    if log::set_logger(logger).is_ok() {
        log::set_max_level(LevelFilter::Debug);
    }
}

/// Warnings logged so far whose message contains `needle`. Tests run in
/// parallel, so pick a needle unique to the test.
pub fn warnings_containing(needle: &str) -> usize {
    LOGGER.get().map_or(0, |logger| {
        logger
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|(level, message)| *level == Level::Warn && message.contains(needle))
            .count()
    })
}
