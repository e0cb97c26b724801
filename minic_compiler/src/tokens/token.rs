//! Token kinds and the immutable token value produced by the scanner
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed taxonomy of token kinds.
///
/// Serialized names are the upper-case forms used in the token dump
/// (`IDENTIFIER`, `GTEQ`, `EOF`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TokenKind {
    // === LITERALS AND NAMES ===
    Identifier,
    Number,
    String,

    // === KEYWORDS ===
    Let,
    Function,
    For,
    While,
    If,
    Else,
    Void,
    True,
    False,
    Return,
    Continue,
    Break,
    Print,
    Input,

    // === OPERATORS ===
    Plus,   // +
    Minus,  // -
    Assign, // =
    Incre,  // ++
    Decre,  // --
    Eq,     // ==
    NotEq,  // !=
    Gt,     // >
    Lt,     // <
    GtEq,   // >=
    LtEq,   // <=

    // === DELIMITERS ===
    LParen,
    RParen,
    LBrace,
    RBrace,
    Comma,
    Semicolon,

    // === SENTINELS ===
    Illegal,
    Eof,
}

/// Token family used for metrics and downstream dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenClass {
    Literal,
    Keyword,
    Operator,
    Delimiter,
    Sentinel,
}

impl TokenKind {
    /// Every keyword kind, in taxonomy order
    pub const KEYWORDS: [TokenKind; 14] = [
        TokenKind::Let,
        TokenKind::Function,
        TokenKind::For,
        TokenKind::While,
        TokenKind::If,
        TokenKind::Else,
        TokenKind::Void,
        TokenKind::True,
        TokenKind::False,
        TokenKind::Return,
        TokenKind::Continue,
        TokenKind::Break,
        TokenKind::Print,
        TokenKind::Input,
    ];

    /// Upper-case taxonomy name used in the textual token rendering
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Identifier => "IDENTIFIER",
            Self::Number => "NUMBER",
            Self::String => "STRING",

            Self::Let => "LET",
            Self::Function => "FUNCTION",
            Self::For => "FOR",
            Self::While => "WHILE",
            Self::If => "IF",
            Self::Else => "ELSE",
            Self::Void => "VOID",
            Self::True => "TRUE",
            Self::False => "FALSE",
            Self::Return => "RETURN",
            Self::Continue => "CONTINUE",
            Self::Break => "BREAK",
            Self::Print => "PRINT",
            Self::Input => "INPUT",

            Self::Plus => "PLUS",
            Self::Minus => "MINUS",
            Self::Assign => "ASSIGN",
            Self::Incre => "INCRE",
            Self::Decre => "DECRE",
            Self::Eq => "EQ",
            Self::NotEq => "NOTEQ",
            Self::Gt => "GT",
            Self::Lt => "LT",
            Self::GtEq => "GTEQ",
            Self::LtEq => "LTEQ",

            Self::LParen => "LPAREN",
            Self::RParen => "RPAREN",
            Self::LBrace => "LBRACE",
            Self::RBrace => "RBRACE",
            Self::Comma => "COMMA",
            Self::Semicolon => "SEMICOLON",

            Self::Illegal => "ILLEGAL",
            Self::Eof => "EOF",
        }
    }

    /// Reserved source spelling, for keyword kinds only
    pub fn keyword_spelling(&self) -> Option<&'static str> {
        let spelling = match self {
            Self::Let => "let",
            Self::Function => "function",
            Self::For => "for",
            Self::While => "while",
            Self::If => "if",
            Self::Else => "else",
            Self::Void => "void",
            Self::True => "true",
            Self::False => "false",
            Self::Return => "return",
            Self::Continue => "continue",
            Self::Break => "break",
            Self::Print => "print",
            Self::Input => "input",
            _ => return None,
        };
        Some(spelling)
    }

    pub fn class(&self) -> TokenClass {
        match self {
            Self::Identifier | Self::Number | Self::String => TokenClass::Literal,

            Self::Let
            | Self::Function
            | Self::For
            | Self::While
            | Self::If
            | Self::Else
            | Self::Void
            | Self::True
            | Self::False
            | Self::Return
            | Self::Continue
            | Self::Break
            | Self::Print
            | Self::Input => TokenClass::Keyword,

            Self::Plus
            | Self::Minus
            | Self::Assign
            | Self::Incre
            | Self::Decre
            | Self::Eq
            | Self::NotEq
            | Self::Gt
            | Self::Lt
            | Self::GtEq
            | Self::LtEq => TokenClass::Operator,

            Self::LParen
            | Self::RParen
            | Self::LBrace
            | Self::RBrace
            | Self::Comma
            | Self::Semicolon => TokenClass::Delimiter,

            Self::Illegal | Self::Eof => TokenClass::Sentinel,
        }
    }

    pub fn is_keyword(&self) -> bool {
        self.class() == TokenClass::Keyword
    }

    pub fn is_operator(&self) -> bool {
        self.class() == TokenClass::Operator
    }

    pub fn is_delimiter(&self) -> bool {
        self.class() == TokenClass::Delimiter
    }

    pub fn is_literal(&self) -> bool {
        self.class() == TokenClass::Literal
    }

    pub fn is_sentinel(&self) -> bool {
        self.class() == TokenClass::Sentinel
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified lexical unit: kind plus literal text.
///
/// Fields are private so a token cannot change after the scanner hands it
/// out.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    kind: TokenKind,
    text: String,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    /// End-of-input token with empty text
    pub fn eof() -> Self {
        Self::new(TokenKind::Eof, "")
    }

    pub fn illegal(text: impl Into<String>) -> Self {
        Self::new(TokenKind::Illegal, text)
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    pub fn is_illegal(&self) -> bool {
        self.kind == TokenKind::Illegal
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Type: {} | Literal: {}", self.kind.as_str(), self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_rendering() {
        let token = Token::new(TokenKind::GtEq, ">=");
        assert_eq!(token.to_string(), "Type: GTEQ | Literal: >=");
        assert_eq!(Token::eof().to_string(), "Type: EOF | Literal: ");
    }

    #[test]
    fn test_keyword_spellings_cover_keyword_class() {
        for kind in TokenKind::KEYWORDS {
            assert!(kind.is_keyword());
            let spelling = kind.keyword_spelling().unwrap();
            assert_eq!(spelling.to_uppercase(), kind.as_str());
        }
        assert_eq!(TokenKind::Identifier.keyword_spelling(), None);
        assert_eq!(TokenKind::Plus.keyword_spelling(), None);
    }

    #[test]
    fn test_classes() {
        assert_eq!(TokenKind::Number.class(), TokenClass::Literal);
        assert!(TokenKind::Decre.is_operator());
        assert!(TokenKind::Semicolon.is_delimiter());
        assert!(TokenKind::Illegal.is_sentinel());
        assert!(TokenKind::String.is_literal());
        assert!(!TokenKind::Identifier.is_keyword());
    }

    #[test]
    fn test_serde_uses_dump_names() {
        let json = serde_json::to_string(&Token::new(TokenKind::NotEq, "!=")).unwrap();
        assert_eq!(json, r#"{"kind":"NOTEQ","text":"!="}"#);

        let back: Token = serde_json::from_str(&json).unwrap();
        assert_eq!(back.kind(), TokenKind::NotEq);
        assert_eq!(back.into_text(), "!=");
    }

    #[test]
    fn test_constructors() {
        let illegal = Token::illegal("@");
        assert!(illegal.is_illegal());
        assert_eq!(illegal.text(), "@");
        assert!(Token::eof().is_eof());
        assert_eq!(Token::eof().text(), "");
    }
}
