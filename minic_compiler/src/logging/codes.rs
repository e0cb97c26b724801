//! Consolidated diagnostic codes and classification system
//!
//! Single source of truth for every code the compiler logs, together with
//! the behavioral metadata attached to it.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for a code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl ErrorMetadata {
    pub fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        requires_halt: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            requires_halt,
            description,
            recommended_action,
        }
    }
}

// ============================================================================
// ERROR CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
}

/// Source input error codes
pub mod source {
    use super::Code;

    pub const SOURCE_OPEN_FAILED: Code = Code::new("E005");
    pub const SOURCE_READ_FAILED: Code = Code::new("E006");
    pub const INVALID_ENCODING: Code = Code::new("E007");
}

/// Lexical analysis codes; ILLEGAL tokens are reported as warnings
pub mod lexical {
    use super::Code;

    pub const ILLEGAL_CHARACTER: Code = Code::new("W020");
    pub const UNTERMINATED_STRING: Code = Code::new("W021");
    pub const UNTERMINATED_COMMENT: Code = Code::new("W022");
}

/// Token dump destination codes
pub mod driver {
    use super::Code;

    pub const DESTINATION_CREATE_FAILED: Code = Code::new("E040");
    pub const DESTINATION_WRITE_FAILED: Code = Code::new("E041");
    pub const SERIALIZATION_FAILED: Code = Code::new("E042");
    pub const ILLEGAL_TOKENS_PRESENT: Code = Code::new("E043");
}

/// Configuration codes
pub mod config {
    use super::Code;

    pub const CONFIG_READ_FAILED: Code = Code::new("E060");
    pub const CONFIG_INVALID: Code = Code::new("E061");
}

// ============================================================================
// SUCCESS CODE CONSTANTS
// ============================================================================

/// Success codes
pub mod success {
    use super::Code;

    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");
    pub const SOURCE_OPENED: Code = Code::new("I006");
    pub const TOKENIZATION_COMPLETE: Code = Code::new("I020");
    pub const TOKEN_DUMP_COMPLETE: Code = Code::new("I040");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        let entries = [
            // System errors
            ErrorMetadata::new(
                "ERR001",
                "System",
                Severity::Critical,
                false,
                true,
                "Critical internal error",
                "File a bug report with the input that triggered it",
            ),
            ErrorMetadata::new(
                "ERR002",
                "System",
                Severity::Critical,
                false,
                true,
                "Initialization failure",
                "Check configuration and environment variables",
            ),
            // Source input errors
            ErrorMetadata::new(
                "E005",
                "Source",
                Severity::High,
                false,
                true,
                "Source file could not be opened",
                "Check the path exists and is readable",
            ),
            ErrorMetadata::new(
                "E006",
                "Source",
                Severity::High,
                false,
                true,
                "I/O error while reading source text",
                "Check the file system and retry",
            ),
            ErrorMetadata::new(
                "E007",
                "Source",
                Severity::High,
                false,
                true,
                "Source text is not valid UTF-8",
                "Convert the file to UTF-8",
            ),
            // Lexical warnings
            ErrorMetadata::new(
                "W020",
                "Lexical",
                Severity::Low,
                true,
                false,
                "Character is not part of any token",
                "Remove the character or check for a typo such as a bare '!'",
            ),
            ErrorMetadata::new(
                "W021",
                "Lexical",
                Severity::Low,
                true,
                false,
                "String literal not terminated before end of input",
                "Add the closing double quote",
            ),
            ErrorMetadata::new(
                "W022",
                "Lexical",
                Severity::Low,
                true,
                false,
                "Block comment not terminated before end of input",
                "Add the closing '*/'",
            ),
            // Driver errors
            ErrorMetadata::new(
                "E040",
                "Driver",
                Severity::High,
                false,
                true,
                "Token dump destination could not be created",
                "Check the destination directory exists and is writable",
            ),
            ErrorMetadata::new(
                "E041",
                "Driver",
                Severity::High,
                false,
                true,
                "Writing to the token dump destination failed",
                "Check disk space and permissions",
            ),
            ErrorMetadata::new(
                "E042",
                "Driver",
                Severity::Medium,
                false,
                true,
                "Token could not be serialized",
                "Switch to text output and file a bug report",
            ),
            ErrorMetadata::new(
                "E043",
                "Driver",
                Severity::Medium,
                true,
                false,
                "Source contains ILLEGAL tokens",
                "Inspect the dump for ILLEGAL entries and fix the source",
            ),
            // Configuration errors
            ErrorMetadata::new(
                "E060",
                "Config",
                Severity::Medium,
                false,
                true,
                "Configuration file could not be read",
                "Check the --config path",
            ),
            ErrorMetadata::new(
                "E061",
                "Config",
                Severity::Medium,
                false,
                true,
                "Configuration file is not valid",
                "Fix the TOML syntax or the offending key",
            ),
        ];

        entries.into_iter().map(|meta| (meta.code, meta)).collect()
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

/// Get metadata for a specific code
pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}
