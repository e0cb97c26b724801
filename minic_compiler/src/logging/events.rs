//! Event system for minic logging

use super::codes::{self, Code, ErrorMetadata};
use crate::utils::Span;
use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::BTreeMap;

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }
}

const FILE_KEY: &str = "file";

/// A single diagnostic or progress event
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub code: Code,
    pub message: String,
    pub span: Option<Span>,
    pub context: BTreeMap<String, String>,
}

impl LogEvent {
    fn at_level(level: LogLevel, code: Code, message: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            code,
            message: message.to_string(),
            span: None,
            context: BTreeMap::new(),
        }
    }

    /// Create a new error event
    pub fn error(error_code: Code, message: &str) -> Self {
        Self::at_level(LogLevel::Error, error_code, message)
    }

    /// Create warning with specific code
    pub fn warning_with_code(warning_code: Code, message: &str) -> Self {
        Self::at_level(LogLevel::Warning, warning_code, message)
    }

    /// Create an info event with a generic code
    pub fn info(message: &str) -> Self {
        Self::at_level(LogLevel::Info, Code::new("I000"), message)
    }

    /// Create a success event (info with success code)
    pub fn success(success_code: Code, message: &str) -> Self {
        Self::at_level(LogLevel::Info, success_code, message)
    }

    /// Create a debug event
    pub fn debug(message: &str) -> Self {
        Self::at_level(LogLevel::Debug, Code::new("D000"), message)
    }

    /// Add span information
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Add context data
    pub fn with_context(mut self, key: &str, value: &str) -> Self {
        self.context.insert(key.to_string(), value.to_string());
        self
    }

    /// Tag with the source file being processed
    pub fn with_file_path(self, path: &str) -> Self {
        self.with_context(FILE_KEY, path)
    }

    pub fn is_error(&self) -> bool {
        self.level == LogLevel::Error
    }

    /// Registry entry for this event's code, if one exists
    pub fn metadata(&self) -> Option<&'static ErrorMetadata> {
        codes::get_error_metadata(self.code.as_str())
    }

    /// One-line rendering: `[LEVEL] CODE - message at line:col (key=value) in file`
    pub fn format(&self) -> String {
        let mut line = format!(
            "[{}] {} - {}",
            self.level.as_str(),
            self.code,
            truncate_message(&self.message)
        );

        if let Some(span) = self.span {
            line.push_str(&format!(" at {}", span.start()));
        }

        let details: Vec<String> = self
            .context
            .iter()
            .filter(|(key, _)| key.as_str() != FILE_KEY)
            .map(|(key, value)| format!("{}={}", key, value))
            .collect();
        if !details.is_empty() {
            line.push_str(&format!(" ({})", details.join(", ")));
        }

        if let Some(file) = self.context.get(FILE_KEY) {
            line.push_str(&format!(" in {}", file));
        }

        line
    }

    /// [`format`](Self::format) followed by registry metadata
    pub fn format_detailed(&self) -> String {
        let mut output = self.format();

        if let Some(meta) = self.metadata() {
            output.push_str(&format!(
                "\n  {} / {}",
                meta.category,
                meta.severity.as_str()
            ));
            if self.is_error() {
                output.push_str(&format!(
                    "\n  recoverable={} halt={}",
                    meta.recoverable, meta.requires_halt
                ));
            }
            output.push_str(&format!("\n  {}", meta.description));
            output.push_str(&format!("\n  Action: {}", meta.recommended_action));
        }

        output
    }

    /// Single JSON object for structured logging
    pub fn format_json(&self) -> Result<String, serde_json::Error> {
        let mut json = serde_json::json!({
            "timestamp": self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            "level": self.level.as_str(),
            "code": self.code.as_str(),
            "message": truncate_message(&self.message),
        });

        if let Some(meta) = self.metadata() {
            json["category"] = meta.category.into();
            json["severity"] = meta.severity.as_str().into();
            if self.is_error() {
                json["recoverable"] = meta.recoverable.into();
                json["requires_halt"] = meta.requires_halt.into();
            }
        }

        if let Some(span) = &self.span {
            json["span"] = serde_json::to_value(span)?;
        }

        if !self.context.is_empty() {
            json["context"] = serde_json::to_value(&self.context)?;
        }

        serde_json::to_string(&json)
    }
}

/// Cap message length at the configured maximum, on a char boundary
fn truncate_message(message: &str) -> &str {
    let limit = super::config::get_max_log_message_length();
    if message.len() <= limit {
        return message;
    }
    let mut end = limit;
    while !message.is_char_boundary(end) {
        end -= 1;
    }
    &message[..end]
}
