//! Lexical analysis for minic source text
//!
//! [`Scanner`] turns a character stream into tokens one at a time. The free
//! functions here cover the common whole-input cases.

pub mod error;
pub mod scanner;
pub mod source;

use crate::config::runtime::ScannerPreferences;
use crate::logging::codes;
use crate::tokens::Token;

pub use error::ScanError;
pub use scanner::{LexicalMetrics, Scanner};
pub use source::CharSource;

// ============================================================================
// WHOLE-INPUT API
// ============================================================================

/// Tokenize in-memory text. The returned vector always ends with EOF.
pub fn tokenize(text: &str) -> Result<Vec<Token>, ScanError> {
    tokenize_with_preferences(text, ScannerPreferences::default())
}

pub fn tokenize_with_preferences(
    text: &str,
    preferences: ScannerPreferences,
) -> Result<Vec<Token>, ScanError> {
    let mut scanner = Scanner::from_text_with_preferences(text, preferences);
    let mut tokens = Vec::new();

    loop {
        let token = scanner.next_token()?;
        let eof = token.is_eof();
        tokens.push(token);
        if eof {
            return Ok(tokens);
        }
    }
}

// ============================================================================
// MODULE INITIALIZATION AND VALIDATION
// ============================================================================

/// Check that every lexical and source code is registered (for system startup)
pub fn init_lexical_analysis_logging() -> Result<(), String> {
    let required = [
        codes::lexical::ILLEGAL_CHARACTER,
        codes::lexical::UNTERMINATED_STRING,
        codes::lexical::UNTERMINATED_COMMENT,
        codes::source::SOURCE_OPEN_FAILED,
        codes::source::SOURCE_READ_FAILED,
        codes::source::INVALID_ENCODING,
    ];

    for code in &required {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!(
                "Lexical error code {} not found in metadata registry",
                code.as_str()
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::runtime::TriviaMode;
    use crate::tokens::TokenKind;

    fn preferences(trivia_mode: TriviaMode) -> ScannerPreferences {
        ScannerPreferences {
            trivia_mode,
            collect_metrics: true,
            log_illegal_tokens: true,
        }
    }

    #[test]
    fn test_tokenize_ends_with_single_eof() {
        let tokens = tokenize_with_preferences("let x = 5;", preferences(TriviaMode::Strict)).unwrap();
        assert_eq!(tokens.len(), 6);
        assert!(tokens[5].is_eof());
        assert_eq!(tokens.iter().filter(|t| t.is_eof()).count(), 1);
    }

    #[test]
    fn test_tokenize_empty_input() {
        // Identical in every trivia mode
        assert_eq!(tokenize("").unwrap(), vec![Token::eof()]);
    }

    #[test]
    fn test_trivia_modes_differ_on_unterminated_comment() {
        let strict = preferences(TriviaMode::Strict);
        let compatible = preferences(TriviaMode::Compatible);

        let kinds = |prefs| {
            tokenize_with_preferences("a /* b", prefs)
                .unwrap()
                .iter()
                .map(Token::kind)
                .collect::<Vec<_>>()
        };

        assert_eq!(
            kinds(strict),
            vec![TokenKind::Identifier, TokenKind::Illegal, TokenKind::Eof]
        );
        assert_eq!(kinds(compatible), vec![TokenKind::Identifier, TokenKind::Eof]);
    }

    #[test]
    fn test_lexical_codes_registered() {
        assert!(init_lexical_analysis_logging().is_ok());
    }
}
