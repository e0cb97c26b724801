// Internal modules
pub mod config;
pub mod driver;
pub mod lexical;
#[macro_use]
pub mod logging;
pub mod tokens;
pub mod utils;

// Re-export key types for library consumers
pub use driver::{DriverError, DumpSummary};
pub use lexical::{tokenize, LexicalMetrics, ScanError, Scanner};
pub use tokens::{Token, TokenKind};
