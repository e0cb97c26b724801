//! Token production state machine
//!
//! Each call to [`Scanner::next_token`] skips trivia, dispatches on the
//! current character and returns exactly one token. Dispatch yields a
//! [`ScanState`]: `Emit` tokens still have their last inspected character
//! under the cursor and are advanced past exactly once more, while `Direct`
//! sub-scans (identifier, number, string, EOF) have already consumed their
//! own content.

use super::error::ScanError;
use super::source::CharSource;
use crate::config::runtime::{ScannerPreferences, TriviaMode};
use crate::logging::codes;
use crate::tokens::{KeywordTable, Token, TokenKind};
use crate::utils::{Position, Span, Spanned};
use crate::{log_debug, log_error, log_success, log_warning};
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Cursor};
use std::iter::FusedIterator;
use std::path::{Path, PathBuf};

use crate::config::constants::compile_time::source::READ_BUFFER_SIZE;

// ============================================================================
// METRICS
// ============================================================================

/// Per-scanner token statistics
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LexicalMetrics {
    /// Tokens produced, excluding EOF
    pub total_tokens: usize,
    pub keyword_tokens: usize,
    pub identifier_tokens: usize,
    pub number_tokens: usize,
    pub string_tokens: usize,
    pub operator_tokens: usize,
    pub delimiter_tokens: usize,
    pub illegal_tokens: usize,
    pub comment_count: usize,
    pub max_string_length: usize,
    /// Highest line number reached
    pub lines_seen: u32,
}

impl LexicalMetrics {
    pub(crate) fn record_token(&mut self, token: &Token, end: Position) {
        self.lines_seen = self.lines_seen.max(end.line);

        match token.kind() {
            TokenKind::Eof => return,
            TokenKind::Identifier => self.identifier_tokens += 1,
            TokenKind::Number => self.number_tokens += 1,
            TokenKind::String => {
                self.string_tokens += 1;
                self.max_string_length = self.max_string_length.max(token.text().chars().count());
            }
            TokenKind::Illegal => self.illegal_tokens += 1,
            kind if kind.is_keyword() => self.keyword_tokens += 1,
            kind if kind.is_operator() => self.operator_tokens += 1,
            _ => self.delimiter_tokens += 1,
        }

        self.total_tokens += 1;
    }

    pub(crate) fn record_comment(&mut self) {
        self.comment_count += 1;
    }
}

// ============================================================================
// DISPATCH STATE
// ============================================================================

/// Result of dispatching on the current character
#[derive(Debug, Clone, PartialEq, Eq)]
enum ScanState {
    /// The last inspected character is still current; advance once more
    Emit(Token),
    /// The sub-scan consumed everything it inspected
    Direct(Token),
}

/// Outcome of skipping one block comment
enum BlockComment {
    Closed,
    Unterminated,
}

/// First read failure, replayed on every later call
struct ReadFailure {
    position: Position,
    kind: io::ErrorKind,
    reason: String,
}

impl ReadFailure {
    fn to_error(&self) -> ScanError {
        ScanError::Read {
            line: self.position.line,
            column: self.position.column,
            source: io::Error::new(self.kind, self.reason.clone()),
        }
    }
}

fn is_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r')
}

fn is_identifier_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_'
}

fn is_identifier_continue(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

// ============================================================================
// SCANNER
// ============================================================================

/// Stateful cursor over a character source producing tokens on demand.
///
/// A scanner owns its source exclusively and is not meant to be shared
/// between threads; independent scanners are fully independent.
pub struct Scanner<R> {
    source: CharSource<R>,
    keywords: &'static KeywordTable,
    preferences: ScannerPreferences,
    metrics: LexicalMetrics,
    origin: Option<PathBuf>,
    failure: Option<ReadFailure>,
    done: bool,
    fused: bool,
}

impl Scanner<BufReader<File>> {
    /// Open a source file with default preferences
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ScanError> {
        Self::open_with_preferences(path, ScannerPreferences::default())
    }

    pub fn open_with_preferences(
        path: impl AsRef<Path>,
        preferences: ScannerPreferences,
    ) -> Result<Self, ScanError> {
        let path = path.as_ref();

        let file = File::open(path).map_err(|source| {
            let error = ScanError::Open {
                path: path.to_path_buf(),
                source,
            };
            log_error!(error.error_code(), "Failed to open source file",
                "path" => path.display(),
                "reason" => error.io_error()
            );
            error
        })?;

        // On a priming failure the reader is dropped with the error, closing the file
        let mut scanner =
            Self::with_preferences(BufReader::with_capacity(READ_BUFFER_SIZE, file), preferences)?;
        scanner.origin = Some(path.to_path_buf());

        log_debug!("Opened source file",
            "path" => path.display(),
            "trivia_mode" => scanner.preferences.trivia_mode.as_str()
        );

        Ok(scanner)
    }
}

impl Scanner<Cursor<String>> {
    /// Scan in-memory text with default preferences
    pub fn from_text(text: &str) -> Self {
        Self::from_text_with_preferences(text, ScannerPreferences::default())
    }

    pub fn from_text_with_preferences(text: &str, preferences: ScannerPreferences) -> Self {
        Self::from_source(CharSource::from_text(text), preferences)
    }
}

impl<R: BufRead> Scanner<R> {
    /// Scan any buffered reader with default preferences
    pub fn from_reader(reader: R) -> Result<Self, ScanError> {
        Self::with_preferences(reader, ScannerPreferences::default())
    }

    pub fn with_preferences(reader: R, preferences: ScannerPreferences) -> Result<Self, ScanError> {
        let mut source = CharSource::unprimed(reader);
        if let Err(source_error) = source.prime() {
            let position = source.read_position();
            let error = ScanError::Read {
                line: position.line,
                column: position.column,
                source: source_error,
            };
            log_error!(error.error_code(), "Failed to read start of source",
                span = Span::point(position),
                "reason" => error.io_error()
            );
            return Err(error);
        }
        Ok(Self::from_source(source, preferences))
    }

    fn from_source(source: CharSource<R>, preferences: ScannerPreferences) -> Self {
        Self {
            source,
            keywords: KeywordTable::global(),
            preferences,
            metrics: LexicalMetrics::default(),
            origin: None,
            failure: None,
            done: false,
            fused: false,
        }
    }

    /// Produce the next token; EOF repeats forever once reached
    pub fn next_token(&mut self) -> Result<Token, ScanError> {
        self.next_spanned().map(Spanned::into_inner)
    }

    /// Produce the next token together with its source span.
    ///
    /// A read failure is fatal: the same error is returned on every later call.
    pub fn next_spanned(&mut self) -> Result<Spanned<Token>, ScanError> {
        if let Some(failure) = &self.failure {
            return Err(failure.to_error());
        }
        if self.done {
            return Ok(Spanned::new(
                Token::eof(),
                Span::point(self.source.position()),
            ));
        }

        let spanned = match self.skip_trivia()? {
            Some(illegal) => illegal,
            None => {
                let start = self.source.position();
                let token = match self.dispatch()? {
                    ScanState::Emit(token) => {
                        self.advance()?;
                        token
                    }
                    ScanState::Direct(token) => token,
                };
                Spanned::new(token, Span::new(start, self.source.position()))
            }
        };

        self.record(&spanned);
        Ok(spanned)
    }

    /// Position of the next unconsumed character
    pub fn position(&self) -> Position {
        self.source.position()
    }

    pub fn metrics(&self) -> &LexicalMetrics {
        &self.metrics
    }

    pub fn preferences(&self) -> &ScannerPreferences {
        &self.preferences
    }

    /// File this scanner was opened on, if any
    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }

    /// True once EOF has been returned or the scanner was closed
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Release the underlying source. Idempotent; later calls return EOF.
    pub fn close(&mut self) {
        if !self.source.is_closed() {
            log_debug!("Closing source",
                "path" => self.origin_display(),
                "position" => self.source.position()
            );
        }
        self.source.close();
        self.done = true;
    }

    // ========================================================================
    // Trivia
    // ========================================================================

    fn skip_trivia(&mut self) -> Result<Option<Spanned<Token>>, ScanError> {
        match self.preferences.trivia_mode {
            TriviaMode::Strict => self.skip_trivia_to_fixed_point(),
            TriviaMode::Compatible => {
                self.skip_trivia_single_pass()?;
                Ok(None)
            }
        }
    }

    /// Skip whitespace and comments until neither applies
    fn skip_trivia_to_fixed_point(&mut self) -> Result<Option<Spanned<Token>>, ScanError> {
        loop {
            self.skip_whitespace()?;

            if self.at_pair('/', '*') {
                let start = self.source.position();
                if let BlockComment::Unterminated = self.skip_block_comment()? {
                    let span = Span::new(start, self.source.position());
                    return Ok(Some(Spanned::new(Token::illegal("/*"), span)));
                }
            } else if self.at_pair('/', '/') {
                self.skip_line_comment()?;
            } else {
                return Ok(None);
            }
        }
    }

    /// Whitespace, then one block comment, then one line comment, each
    /// followed by whitespace. Unterminated block comments run to end of
    /// input without complaint.
    fn skip_trivia_single_pass(&mut self) -> Result<(), ScanError> {
        self.skip_whitespace()?;

        if self.at_pair('/', '*') {
            self.skip_block_comment()?;
            self.skip_whitespace()?;
        }

        if self.at_pair('/', '/') {
            self.skip_line_comment()?;
            self.skip_whitespace()?;
        }

        Ok(())
    }

    fn skip_whitespace(&mut self) -> Result<(), ScanError> {
        while self.source.current().is_some_and(is_whitespace) {
            self.advance()?;
        }
        Ok(())
    }

    /// Cursor is on `//`; consume through the newline or to end of input
    fn skip_line_comment(&mut self) -> Result<(), ScanError> {
        self.metrics.record_comment();
        self.advance()?;
        self.advance()?;

        while let Some(ch) = self.advance()? {
            if ch == '\n' {
                break;
            }
        }
        Ok(())
    }

    /// Cursor is on `/*`; consume through the closing `*/`
    fn skip_block_comment(&mut self) -> Result<BlockComment, ScanError> {
        self.metrics.record_comment();
        self.advance()?;
        self.advance()?;

        loop {
            if self.at_pair('*', '/') {
                self.advance()?;
                self.advance()?;
                return Ok(BlockComment::Closed);
            }
            if self.advance()?.is_none() {
                return Ok(BlockComment::Unterminated);
            }
        }
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    fn dispatch(&mut self) -> Result<ScanState, ScanError> {
        let Some(ch) = self.source.current() else {
            return Ok(ScanState::Direct(Token::eof()));
        };

        let state = match ch {
            '{' => ScanState::Emit(Token::new(TokenKind::LBrace, "{")),
            '}' => ScanState::Emit(Token::new(TokenKind::RBrace, "}")),
            '(' => ScanState::Emit(Token::new(TokenKind::LParen, "(")),
            ')' => ScanState::Emit(Token::new(TokenKind::RParen, ")")),
            ';' => ScanState::Emit(Token::new(TokenKind::Semicolon, ";")),
            ',' => ScanState::Emit(Token::new(TokenKind::Comma, ",")),

            '+' => self.one_or_two('+', '+', TokenKind::Incre, TokenKind::Plus)?,
            '-' => self.one_or_two('-', '-', TokenKind::Decre, TokenKind::Minus)?,
            '=' => self.one_or_two('=', '=', TokenKind::Eq, TokenKind::Assign)?,
            '<' => self.one_or_two('<', '=', TokenKind::LtEq, TokenKind::Lt)?,
            '>' => self.one_or_two('>', '=', TokenKind::GtEq, TokenKind::Gt)?,
            // A bare '!' is not a token in this language
            '!' => self.one_or_two('!', '=', TokenKind::NotEq, TokenKind::Illegal)?,

            '"' => self.scan_string()?,
            c if is_identifier_start(c) => self.scan_identifier()?,
            c if c.is_ascii_digit() => self.scan_number()?,

            other => ScanState::Emit(Token::illegal(other.to_string())),
        };

        Ok(state)
    }

    /// Two-character operator when `second` follows, else the one-character kind.
    /// Consumes the first character only when the pair matches.
    fn one_or_two(
        &mut self,
        first: char,
        second: char,
        pair: TokenKind,
        single: TokenKind,
    ) -> Result<ScanState, ScanError> {
        if self.source.peek() == Some(second) {
            self.advance()?;
            Ok(ScanState::Emit(Token::new(
                pair,
                format!("{}{}", first, second),
            )))
        } else {
            Ok(ScanState::Emit(Token::new(single, first.to_string())))
        }
    }

    fn scan_identifier(&mut self) -> Result<ScanState, ScanError> {
        let mut word = String::new();
        while let Some(ch) = self.source.current().filter(|c| is_identifier_continue(*c)) {
            word.push(ch);
            self.advance()?;
        }

        let kind = self.keywords.classify(&word);
        Ok(ScanState::Direct(Token::new(kind, word)))
    }

    fn scan_number(&mut self) -> Result<ScanState, ScanError> {
        let mut digits = String::new();
        while let Some(ch) = self.source.current().filter(char::is_ascii_digit) {
            digits.push(ch);
            self.advance()?;
        }

        Ok(ScanState::Direct(Token::new(TokenKind::Number, digits)))
    }

    /// Body is taken verbatim up to the closing quote, newlines included
    fn scan_string(&mut self) -> Result<ScanState, ScanError> {
        self.advance()?; // opening quote

        let mut body = String::new();
        loop {
            match self.advance()? {
                Some('"') => return Ok(ScanState::Direct(Token::new(TokenKind::String, body))),
                Some(ch) => body.push(ch),
                None => return Ok(ScanState::Direct(Token::illegal("\""))),
            }
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn at_pair(&self, first: char, second: char) -> bool {
        self.source.current() == Some(first) && self.source.peek() == Some(second)
    }

    /// Consume the current character; a read failure closes the source
    fn advance(&mut self) -> Result<Option<char>, ScanError> {
        let source_error = match self.source.advance() {
            Ok(consumed) => return Ok(consumed),
            Err(e) => e,
        };

        // The failed read left the source untouched
        let pending = self.source.read_position();

        let failure = ReadFailure {
            position: pending,
            kind: source_error.kind(),
            reason: source_error.to_string(),
        };
        let error = ScanError::Read {
            line: pending.line,
            column: pending.column,
            source: source_error,
        };
        log_error!(error.error_code(), "Failed to read source",
            span = Span::point(pending),
            "path" => self.origin_display(),
            "reason" => error.io_error()
        );

        self.source.close();
        self.failure = Some(failure);
        Err(error)
    }

    fn record(&mut self, spanned: &Spanned<Token>) {
        let token = &spanned.value;

        if self.preferences.collect_metrics {
            self.metrics.record_token(token, spanned.span.end());
        }

        if token.is_eof() {
            self.done = true;
            log_success!(codes::success::TOKENIZATION_COMPLETE, "Lexical analysis completed",
                "path" => self.origin_display(),
                "tokens" => self.metrics.total_tokens,
                "illegal" => self.metrics.illegal_tokens,
                "comments" => self.metrics.comment_count,
                "lines" => spanned.span.end().line
            );
            return;
        }

        if token.is_illegal() && self.preferences.log_illegal_tokens {
            let code = match token.text() {
                "\"" => codes::lexical::UNTERMINATED_STRING,
                "/*" => codes::lexical::UNTERMINATED_COMMENT,
                _ => codes::lexical::ILLEGAL_CHARACTER,
            };
            log_warning!(code, "Illegal token",
                span = spanned.span,
                "text" => token.text().escape_debug()
            );
        }
    }

    fn origin_display(&self) -> String {
        self.origin
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<memory>".to_string())
    }
}

impl<R: BufRead> fmt::Debug for Scanner<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scanner")
            .field("origin", &self.origin)
            .field("position", &self.source.position())
            .field("preferences", &self.preferences)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

/// Yields every token before EOF; an I/O error is yielded once and ends
/// iteration.
impl<R: BufRead> Iterator for Scanner<R> {
    type Item = Result<Token, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.fused {
            return None;
        }

        match self.next_token() {
            Ok(token) if token.is_eof() => {
                self.fused = true;
                None
            }
            Ok(token) => Some(Ok(token)),
            Err(error) => {
                self.fused = true;
                Some(Err(error))
            }
        }
    }
}

impl<R: BufRead> FusedIterator for Scanner<R> {}
