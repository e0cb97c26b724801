//! Configuration module for the minic compiler
//!
//! Compile-time constants live in [`constants`]; user preferences that may
//! change between runs live in [`runtime`].

pub mod constants;
pub mod runtime;

pub use constants::compile_time;
pub use runtime::{
    ConfigError, DriverPreferences, LogLevel, LoggingPreferences, OutputFormat, RuntimeConfig,
    ScannerPreferences, TriviaMode,
};

/// Build information and configuration metadata
pub mod build_info {
    /// Package version baked in at compile time
    pub fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}
