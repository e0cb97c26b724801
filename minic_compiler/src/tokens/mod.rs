//! Token system for minic lexical analysis
//!
//! - **[`Token`]** - immutable kind + literal text pair
//! - **[`TokenKind`]** - the closed kind taxonomy (literals, keywords,
//!   operators, delimiters, sentinels)
//! - **[`KeywordTable`]** - process-wide reserved word lookup used to
//!   reclassify identifiers
//!
//! Tokens carry no location of their own; [`Spanned<Token>`] pairs one with
//! the source span it was scanned from.

pub mod keywords;
pub mod token;

pub use keywords::KeywordTable;
pub use token::{Token, TokenClass, TokenKind};

pub use crate::utils::{Position, Span, Spanned};
