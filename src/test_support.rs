//! Log capture for tests
//!
//! Records are kept per thread, so parallel tests only see their own logs.

use std::cell::RefCell;
use std::sync::Once;

use log::{Level, LevelFilter, Log, Metadata, Record};

thread_local! {
    static CAPTURED: RefCell<Vec<(Level, String)>> = const { RefCell::new(Vec::new()) };
}

struct CaptureLogger;

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        let message = record.args().to_string();
        CAPTURED.with(|logs| logs.borrow_mut().push((record.level(), message)));
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger;
static INIT: Once = Once::new();

/// Handle over this thread's captured log records
pub struct LogCapture;

/// Install the capturing logger and clear this thread's records
pub fn capture_logs() -> LogCapture {
    INIT.call_once(|| {
        let _ = log::set_logger(&LOGGER);
        log::set_max_level(LevelFilter::Trace);
    });
    CAPTURED.with(|logs| logs.borrow_mut().clear());
    LogCapture
}

impl LogCapture {
    pub fn errors(&self) -> Vec<String> {
        CAPTURED.with(|logs| {
            logs.borrow()
                .iter()
                .filter(|(level, _)| *level == Level::Error)
                .map(|(_, message)| message.clone())
                .collect()
        })
    }

    pub fn has_error(&self, needle: &str) -> bool {
        self.errors().iter().any(|message| message.contains(needle))
    }
}
