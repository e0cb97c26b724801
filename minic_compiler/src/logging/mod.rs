//! Global logging module for the minic compiler
//!
//! Provides thread-safe global logging with per-thread source file context
//! and a macro interface. Nothing is emitted until a global service is
//! installed, so library users who never initialize logging pay only for a
//! `OnceLock` check per event.

pub mod codes;
pub mod config;
pub mod events;
pub mod macros;
pub mod service;

use std::cell::RefCell;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

pub use codes::Code;
pub use events::{LogEvent, LogLevel};
pub use service::{ConsoleLogger, Logger, LoggingService, MemoryLogger, StructuredLogger};

// ============================================================================
// GLOBAL STATE
// ============================================================================

static GLOBAL_LOGGER: OnceLock<Arc<LoggingService>> = OnceLock::new();

/// Source file currently being processed on this thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContext {
    pub file_path: PathBuf,
}

thread_local! {
    static FILE_CONTEXT: RefCell<Option<FileContext>> = const { RefCell::new(None) };
}

// ============================================================================
// INITIALIZATION
// ============================================================================

/// Initialize global logging from the installed preferences
pub fn init_global_logging() -> Result<(), String> {
    config::validate_config().map_err(|e| format!("Configuration validation failed: {}", e))?;

    let logging_service = Arc::new(service::create_configured_service());

    GLOBAL_LOGGER
        .set(logging_service.clone())
        .map_err(|_| "Global logger already initialized")?;

    logging_service.log_event(LogEvent::success(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Global logging system initialized",
    ));

    Ok(())
}

/// Initialize with custom service (primarily for testing)
pub fn init_global_logging_with_service(service: Arc<LoggingService>) -> Result<(), String> {
    GLOBAL_LOGGER
        .set(service)
        .map_err(|_| "Global logger already initialized".to_string())
}

/// Safe access to global logger
pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get().map(|service| service.as_ref())
}

/// True when an installed service would accept a debug event
pub fn debug_enabled() -> bool {
    try_get_global_logger().is_some_and(|logger| logger.should_log(LogLevel::Debug))
}

// ============================================================================
// FILE CONTEXT MANAGEMENT
// ============================================================================

pub fn set_file_context(file_path: PathBuf) {
    FILE_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = Some(FileContext { file_path });
    });
}

pub fn clear_file_context() {
    FILE_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = None;
    });
}

/// Run `f` with `file_path` attached to every event logged on this thread
pub fn with_file_context<F, R>(file_path: PathBuf, f: F) -> R
where
    F: FnOnce() -> R,
{
    let previous = get_current_file_context();
    set_file_context(file_path);
    let result = f();
    match previous {
        Some(context) => set_file_context(context.file_path),
        None => clear_file_context(),
    }
    result
}

pub fn get_current_file_context() -> Option<FileContext> {
    FILE_CONTEXT.with(|ctx| ctx.borrow().clone())
}

// ============================================================================
// MACRO SUPPORT FUNCTIONS
// ============================================================================

/// Attach the thread's file context and hand the event to the global logger
pub fn dispatch_with_file_context(mut event: LogEvent) {
    let Some(logger) = try_get_global_logger() else {
        return;
    };

    if let Some(file_ctx) = get_current_file_context() {
        event = event.with_file_path(&file_ctx.file_path.display().to_string());
    }

    logger.log_event(event);
}

fn with_details(
    mut event: LogEvent,
    span: Option<crate::utils::Span>,
    context: Vec<(&str, &str)>,
) -> LogEvent {
    if let Some(s) = span {
        event = event.with_span(s);
    }
    for (key, value) in context {
        event = event.with_context(key, value);
    }
    event
}

/// Log error with context (used by log_error! macro)
pub fn log_error_with_context(
    code: Code,
    message: &str,
    span: Option<crate::utils::Span>,
    context: Vec<(&str, &str)>,
) {
    dispatch_with_file_context(with_details(LogEvent::error(code, message), span, context));
}

/// Log warning with context (used by log_warning! macro)
pub fn log_warning_with_context(
    code: Code,
    message: &str,
    span: Option<crate::utils::Span>,
    context: Vec<(&str, &str)>,
) {
    dispatch_with_file_context(with_details(
        LogEvent::warning_with_code(code, message),
        span,
        context,
    ));
}

/// Log success with context (used by log_success! macro)
pub fn log_success_with_context(code: Code, message: &str, context: Vec<(&str, &str)>) {
    dispatch_with_file_context(with_details(LogEvent::success(code, message), None, context));
}

/// Log info with context (used by log_info! macro)
pub fn log_info_with_context(message: &str, context: Vec<(&str, &str)>) {
    dispatch_with_file_context(with_details(LogEvent::info(message), None, context));
}

// ============================================================================
// SAFE FALLBACK LOGGING
// ============================================================================

/// Safe error logging (won't panic if uninitialized)
pub fn safe_log_error(code: Code, message: &str) {
    if let Some(logger) = try_get_global_logger() {
        logger.log_event(LogEvent::error(code, message));
    } else {
        eprintln!("[ERROR] FALLBACK: [{}] {}", code.as_str(), message);
    }
}

// ============================================================================
// TEST CAPTURE
// ============================================================================

/// Debug-level memory capture installed as the global service for this test
/// binary. Tests share it, so filter with [`captured_in`].
#[cfg(test)]
pub(crate) fn capture_events() -> Arc<MemoryLogger> {
    static CAPTURE: OnceLock<Arc<MemoryLogger>> = OnceLock::new();
    CAPTURE
        .get_or_init(|| {
            let logger = Arc::new(MemoryLogger::with_capacity(100_000));
            let service = LoggingService::new(logger.clone(), LogLevel::Debug);
            // Nothing else installs a global service under test
            let _ = init_global_logging_with_service(Arc::new(service));
            logger
        })
        .clone()
}

/// Captured events logged under the file context `file`
#[cfg(test)]
pub(crate) fn captured_in(file: &str) -> Vec<LogEvent> {
    capture_events()
        .events()
        .into_iter()
        .filter(|e| e.context.get("file").map(String::as_str) == Some(file))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{log_debug, log_info};

    #[test]
    fn test_file_context_management() {
        let file_path = PathBuf::from("test.mc");

        assert!(get_current_file_context().is_none());

        set_file_context(file_path.clone());
        assert_eq!(
            get_current_file_context().map(|c| c.file_path),
            Some(file_path)
        );

        clear_file_context();
        assert!(get_current_file_context().is_none());
    }

    #[test]
    fn test_with_file_context_restores_previous() {
        let outer = PathBuf::from("outer.mc");
        let inner = PathBuf::from("inner.mc");

        let result = with_file_context(outer.clone(), || {
            with_file_context(inner.clone(), || {
                assert_eq!(
                    get_current_file_context().map(|c| c.file_path),
                    Some(inner.clone())
                );
            });
            assert_eq!(
                get_current_file_context().map(|c| c.file_path),
                Some(outer.clone())
            );
            42
        });

        assert_eq!(result, 42);
        assert!(get_current_file_context().is_none());
    }

    #[test]
    fn test_safe_logging_reaches_installed_service() {
        let capture = capture_events();
        safe_log_error(codes::system::INITIALIZATION_FAILURE, "Logger setup failed in test");

        assert!(capture
            .find(LogLevel::Error, codes::system::INITIALIZATION_FAILURE)
            .iter()
            .any(|e| e.message == "Logger setup failed in test"));
    }

    #[test]
    fn test_macros_carry_file_context() {
        capture_events();
        with_file_context(PathBuf::from("context-macros.mc"), || {
            log_info!("Starting", "stage" => "lexing");
            log_debug!("Detail", "count" => 3);
        });

        let events = captured_in("context-macros.mc");
        assert!(events.iter().any(|e| {
            e.level == LogLevel::Info && e.context.get("stage").map(String::as_str) == Some("lexing")
        }));
        assert!(events.iter().any(|e| e.level == LogLevel::Debug && e.message == "Detail"));
        assert!(debug_enabled());
    }
}
