//! Reserved word table
//!
//! Built once per process from [`TokenKind::KEYWORDS`] and shared read-only
//! by every scanner.
use super::token::TokenKind;
use std::collections::HashMap;
use std::sync::OnceLock;

static GLOBAL_KEYWORDS: OnceLock<KeywordTable> = OnceLock::new();

/// Immutable map from reserved spelling to keyword kind
#[derive(Debug, Clone)]
pub struct KeywordTable {
    entries: HashMap<&'static str, TokenKind>,
}

impl KeywordTable {
    pub fn new() -> Self {
        let entries = TokenKind::KEYWORDS
            .iter()
            .filter_map(|kind| kind.keyword_spelling().map(|spelling| (spelling, *kind)))
            .collect();
        Self { entries }
    }

    /// Process-wide table, initialized on first use
    pub fn global() -> &'static KeywordTable {
        GLOBAL_KEYWORDS.get_or_init(KeywordTable::new)
    }

    /// Exact, case-sensitive lookup
    pub fn lookup(&self, word: &str) -> Option<TokenKind> {
        self.entries.get(word).copied()
    }

    /// Keyword kind for reserved words, IDENTIFIER otherwise
    pub fn classify(&self, word: &str) -> TokenKind {
        self.lookup(word).unwrap_or(TokenKind::Identifier)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for KeywordTable {
    fn default() -> Self {
        Self::new()
    }
}
