//! Logging service and logger backends
//!
//! Console output always goes to stderr: stdout is reserved for the token
//! dump when no destination file is given.

use super::codes::Code;
use super::config;
use super::events::{LogEvent, LogLevel};
use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard};

/// Sink for events that already passed the service's level filter
pub trait Logger: Send + Sync {
    fn log(&self, event: &LogEvent);
}

/// Level filter in front of a single backend
pub struct LoggingService {
    logger: Arc<dyn Logger>,
    min_level: LogLevel,
}

impl LoggingService {
    pub fn new(logger: Arc<dyn Logger>, min_level: LogLevel) -> Self {
        Self { logger, min_level }
    }

    /// Backend and level chosen from the installed logging preferences
    pub fn with_config() -> Self {
        let logger: Arc<dyn Logger> = match (
            config::use_console_logging(),
            config::use_structured_logging(),
        ) {
            (false, _) => Arc::new(NullLogger),
            (true, true) => Arc::new(StructuredLogger),
            (true, false) => Arc::new(ConsoleLogger),
        };

        Self::new(logger, config::get_min_log_level())
    }

    pub fn should_log(&self, level: LogLevel) -> bool {
        level <= self.min_level
    }

    pub fn log_event(&self, event: LogEvent) {
        if self.should_log(event.level) {
            self.logger.log(&event);
        }
    }
}

// ============================================================================
// BACKENDS
// ============================================================================

fn write_stderr(line: &str) {
    // Nowhere left to report a failed diagnostic write
    let _ = writeln!(io::stderr().lock(), "{}", line);
}

/// `[LEVEL] CODE - message` lines on stderr
pub struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn log(&self, event: &LogEvent) {
        write_stderr(&event.format());
    }
}

/// One JSON object per line on stderr
pub struct StructuredLogger;

impl Logger for StructuredLogger {
    fn log(&self, event: &LogEvent) {
        match event.format_json() {
            Ok(json) => write_stderr(&json),
            Err(_) => write_stderr(&event.format()),
        }
    }
}

/// Used when console logging is disabled
pub struct NullLogger;

impl Logger for NullLogger {
    fn log(&self, _event: &LogEvent) {}
}

/// Bounded in-memory capture, oldest events dropped first
pub struct MemoryLogger {
    events: Mutex<VecDeque<LogEvent>>,
    capacity: usize,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::with_capacity(config::get_error_buffer_size())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Mutex::new(VecDeque::new()),
            capacity: capacity.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<LogEvent>> {
        // A poisoned buffer still holds valid events
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn events(&self) -> Vec<LogEvent> {
        self.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Events at `level` carrying `code`
    pub fn find(&self, level: LogLevel, code: Code) -> Vec<LogEvent> {
        self.lock()
            .iter()
            .filter(|e| e.level == level && e.code == code)
            .cloned()
            .collect()
    }

    pub fn contains(&self, level: LogLevel, code: Code) -> bool {
        self.lock()
            .iter()
            .any(|e| e.level == level && e.code == code)
    }
}

impl Default for MemoryLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger for MemoryLogger {
    fn log(&self, event: &LogEvent) {
        let mut events = self.lock();
        while events.len() >= self.capacity {
            events.pop_front();
        }
        events.push_back(event.clone());
    }
}

/// Service built from the installed preferences
pub fn create_configured_service() -> LoggingService {
    LoggingService::with_config()
}
