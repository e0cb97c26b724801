// RUNTIME PREFERENCES (User Experience)

use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// How comments and whitespace are skipped before each token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriviaMode {
    /// Skip to a fixed point; unterminated block comments become ILLEGAL
    #[default]
    Strict,
    /// One whitespace/comment pass per token; unterminated block comments
    /// silently run to end of input
    Compatible,
}

impl TriviaMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriviaMode::Strict => "strict",
            TriviaMode::Compatible => "compatible",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "strict" => Some(TriviaMode::Strict),
            "compatible" | "compat" => Some(TriviaMode::Compatible),
            _ => None,
        }
    }
}

/// Token dump output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `Type: <KIND> | Literal: <text>` lines
    #[default]
    Text,
    /// One JSON object per line
    #[serde(alias = "jsonlines")]
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "text" => Some(OutputFormat::Text),
            "json" | "jsonl" | "jsonlines" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerPreferences {
    /// Comment/whitespace skipping policy
    pub trivia_mode: TriviaMode,

    /// Whether to collect per-token metrics while scanning
    pub collect_metrics: bool,

    /// Whether to emit a warning event for each ILLEGAL token
    pub log_illegal_tokens: bool,
}

impl Default for ScannerPreferences {
    fn default() -> Self {
        Self {
            trivia_mode: env::var(env_vars::SCANNER_TRIVIA_MODE)
                .ok()
                .and_then(|v| TriviaMode::parse(&v))
                .unwrap_or_default(),
            collect_metrics: env::var(env_vars::SCANNER_COLLECT_METRICS)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            log_illegal_tokens: env::var(env_vars::SCANNER_LOG_ILLEGAL)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverPreferences {
    /// Output format for dumped tokens
    pub output_format: OutputFormat,

    /// Whether to append token start positions to each dumped line
    pub include_positions: bool,

    /// Whether a dump containing ILLEGAL tokens counts as a failure
    pub fail_on_illegal: bool,
}

impl Default for DriverPreferences {
    fn default() -> Self {
        Self {
            output_format: env::var(env_vars::DRIVER_OUTPUT_FORMAT)
                .ok()
                .and_then(|v| OutputFormat::parse(&v))
                .unwrap_or_default(),
            include_positions: env::var(env_vars::DRIVER_INCLUDE_POSITIONS)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            fail_on_illegal: env::var(env_vars::DRIVER_FAIL_ON_ILLEGAL)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingPreferences {
    /// Whether to use structured JSON logging (user preference)
    pub use_structured_logging: bool,

    /// Whether to enable console output (user preference)
    pub enable_console_logging: bool,

    /// User preferred minimum log level
    pub min_log_level: LogLevel,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env::var(env_vars::LOGGING_USE_STRUCTURED)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            enable_console_logging: env::var(env_vars::LOGGING_ENABLE_CONSOLE)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            min_log_level: env::var(env_vars::LOGGING_MIN_LEVEL)
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Warning),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error = 0,
    #[serde(alias = "warn")]
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

    /// Convert to events::LogLevel for compatibility
    pub fn to_events_log_level(&self) -> crate::logging::events::LogLevel {
        match self {
            LogLevel::Error => crate::logging::events::LogLevel::Error,
            LogLevel::Warning => crate::logging::events::LogLevel::Warning,
            LogLevel::Info => crate::logging::events::LogLevel::Info,
            LogLevel::Debug => crate::logging::events::LogLevel::Debug,
        }
    }

    /// Parse a user-supplied level name
    pub fn parse(level: &str) -> Option<Self> {
        parse_log_level(level)
    }
}

/// Parse log level from string (used for environment variables)
fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

/// Failures while loading a configuration file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {source}")]
    Parse {
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            ConfigError::Read { .. } => crate::logging::codes::config::CONFIG_READ_FAILED,
            ConfigError::Parse { .. } => crate::logging::codes::config::CONFIG_INVALID,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub scanner: ScannerPreferences,
    pub driver: DriverPreferences,
    pub logging: LoggingPreferences,
}

impl RuntimeConfig {
    /// Parse a TOML document; absent tables and keys keep their defaults
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse { source })
    }

    /// Load a TOML configuration file
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

/// Environment variable names for configuration
pub mod env_vars {
    // Scanner
    pub const SCANNER_TRIVIA_MODE: &str = "MINIC_SCANNER_TRIVIA_MODE";
    pub const SCANNER_COLLECT_METRICS: &str = "MINIC_SCANNER_COLLECT_METRICS";
    pub const SCANNER_LOG_ILLEGAL: &str = "MINIC_SCANNER_LOG_ILLEGAL";

    // Driver
    pub const DRIVER_OUTPUT_FORMAT: &str = "MINIC_DRIVER_OUTPUT_FORMAT";
    pub const DRIVER_INCLUDE_POSITIONS: &str = "MINIC_DRIVER_INCLUDE_POSITIONS";
    pub const DRIVER_FAIL_ON_ILLEGAL: &str = "MINIC_DRIVER_FAIL_ON_ILLEGAL";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "MINIC_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "MINIC_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "MINIC_LOGGING_MIN_LEVEL";
}
