//! Token dump driver
//!
//! Scans a source and writes one line per token, in production order, to a
//! destination file or any writer. EOF is never written.

mod error;

pub use error::DriverError;

use crate::config::constants::compile_time::driver::{LINE_SEPARATOR, WRITE_BUFFER_SIZE};
use crate::config::runtime::{DriverPreferences, OutputFormat, ScannerPreferences};
use crate::lexical::Scanner;
use crate::logging::{self, codes};
use crate::tokens::{Token, TokenKind};
use crate::utils::Spanned;
use crate::{log_debug, log_error, log_info, log_success};
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufWriter, Write};
use std::path::Path;
use std::time::{Duration, Instant};

/// Outcome of a completed dump
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpSummary {
    pub tokens_written: usize,
    pub illegal_tokens: usize,
    pub lines_scanned: u32,
    pub elapsed: Duration,
}

/// One JSON line per token
#[derive(Serialize)]
struct TokenRecord<'a> {
    kind: TokenKind,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    column: Option<u32>,
}

// ============================================================================
// FILE API
// ============================================================================

/// Dump `source` to `destination` with default scanner preferences
pub fn dump_file(
    source: &Path,
    destination: &Path,
    preferences: &DriverPreferences,
) -> Result<DumpSummary, DriverError> {
    dump_file_with_preferences(source, destination, preferences, ScannerPreferences::default())
}

/// Dump `source` to `destination`, creating or truncating it.
///
/// The source is opened first so a missing input never leaves an empty
/// destination behind. The scanner is closed on every path.
pub fn dump_file_with_preferences(
    source: &Path,
    destination: &Path,
    preferences: &DriverPreferences,
    scanner_preferences: ScannerPreferences,
) -> Result<DumpSummary, DriverError> {
    logging::with_file_context(source.to_path_buf(), || -> Result<DumpSummary, DriverError> {
        let mut scanner = Scanner::open_with_preferences(source, scanner_preferences)?;

        log_success!(codes::success::SOURCE_OPENED, "Source opened for token dump",
            "path" => source.display(),
            "destination" => destination.display()
        );

        let file = match File::create(destination) {
            Ok(file) => file,
            Err(error) => {
                scanner.close();
                log_error!(codes::driver::DESTINATION_CREATE_FAILED, "Cannot create destination",
                    "path" => destination.display(),
                    "reason" => error
                );
                return Err(DriverError::CreateDestination {
                    path: destination.to_path_buf(),
                    source: error,
                });
            }
        };

        let writer = BufWriter::with_capacity(WRITE_BUFFER_SIZE, file);
        let result = dump_to_writer(&mut scanner, writer, preferences);
        scanner.close();
        result
    })
}

// ============================================================================
// WRITER API
// ============================================================================

/// Drain `scanner` into `writer`, flushing before returning.
///
/// With `fail_on_illegal`, a dump that saw ILLEGAL tokens is still written
/// in full and then reported as [`DriverError::IllegalTokens`].
pub fn dump_to_writer<R: BufRead, W: Write>(
    scanner: &mut Scanner<R>,
    mut writer: W,
    preferences: &DriverPreferences,
) -> Result<DumpSummary, DriverError> {
    log_info!("Starting token dump",
        "format" => preferences.output_format.as_str(),
        "positions" => preferences.include_positions
    );

    let started = Instant::now();
    let mut tokens_written = 0;
    let mut illegal_tokens = 0;

    let lines_scanned = loop {
        let spanned = scanner.next_spanned()?;
        if spanned.value.is_eof() {
            break spanned.span.end().line;
        }

        if spanned.value.is_illegal() {
            illegal_tokens += 1;
        }

        write_token(&mut writer, &spanned, preferences)?;
        tokens_written += 1;
    };

    writer.flush().map_err(write_failed)?;

    let summary = DumpSummary {
        tokens_written,
        illegal_tokens,
        lines_scanned,
        elapsed: started.elapsed(),
    };

    log_success!(codes::success::TOKEN_DUMP_COMPLETE, "Token dump completed",
        "tokens" => summary.tokens_written,
        "illegal" => summary.illegal_tokens,
        "lines" => summary.lines_scanned,
        "format" => preferences.output_format.as_str(),
        "duration_ms" => summary.elapsed.as_millis()
    );

    if preferences.fail_on_illegal && illegal_tokens > 0 {
        return Err(DriverError::IllegalTokens {
            count: illegal_tokens,
        });
    }

    Ok(summary)
}

/// Render one token as a dump line, without the line separator
pub fn render_token(
    spanned: &Spanned<Token>,
    preferences: &DriverPreferences,
) -> Result<String, DriverError> {
    let token = &spanned.value;
    let start = spanned.span.start();

    match preferences.output_format {
        OutputFormat::Text if preferences.include_positions => {
            Ok(format!("{} @ {}:{}", token, start.line, start.column))
        }
        OutputFormat::Text => Ok(token.to_string()),
        OutputFormat::Json => {
            let (line, column) = if preferences.include_positions {
                (Some(start.line), Some(start.column))
            } else {
                (None, None)
            };
            let record = TokenRecord {
                kind: token.kind(),
                text: token.text(),
                line,
                column,
            };
            serde_json::to_string(&record).map_err(|source| DriverError::Serialize { source })
        }
    }
}

fn write_token<W: Write>(
    writer: &mut W,
    spanned: &Spanned<Token>,
    preferences: &DriverPreferences,
) -> Result<(), DriverError> {
    let line = render_token(spanned, preferences)?;
    log_debug!("Token", "kind" => spanned.value.kind(), "at" => spanned.span);

    writer
        .write_all(line.as_bytes())
        .and_then(|_| writer.write_all(LINE_SEPARATOR.as_bytes()))
        .map_err(write_failed)
}

fn write_failed(source: std::io::Error) -> DriverError {
    log_error!(codes::driver::DESTINATION_WRITE_FAILED, "Failed to write token dump",
        "reason" => source
    );
    DriverError::WriteDestination { source }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::runtime::TriviaMode;
    use crate::logging::LogLevel;
    use crate::utils::{Position, Span};
    use assert_matches::assert_matches;
    use std::fs;
    use crate::lexical::ScanError;
    use std::io;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn text_prefs() -> DriverPreferences {
        DriverPreferences {
            output_format: OutputFormat::Text,
            include_positions: false,
            fail_on_illegal: false,
        }
    }

    fn scanner_prefs() -> ScannerPreferences {
        ScannerPreferences {
            trivia_mode: TriviaMode::Strict,
            collect_metrics: true,
            log_illegal_tokens: true,
        }
    }

    fn scan(text: &str) -> Scanner<std::io::Cursor<String>> {
        Scanner::from_text_with_preferences(text, scanner_prefs())
    }

    fn lines(bytes: &[u8]) -> Vec<String> {
        String::from_utf8(bytes.to_vec())
            .unwrap()
            .split(LINE_SEPARATOR)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect()
    }

    struct FullDisk;

    impl Write for FullDisk {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "no space left"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_dump_file_text_format() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("prog.mc");
        let destination = dir.path().join("tokens.txt");
        fs::write(&source, "let x = 5;\nx++;").unwrap();

        // Scans the same in every trivia mode
        let summary = dump_file(&source, &destination, &text_prefs()).unwrap();
        assert_eq!(summary.tokens_written, 8);
        assert_eq!(summary.illegal_tokens, 0);
        assert_eq!(summary.lines_scanned, 2);

        let written = lines(&fs::read(&destination).unwrap());
        assert_eq!(
            written,
            vec![
                "Type: LET | Literal: let",
                "Type: IDENTIFIER | Literal: x",
                "Type: ASSIGN | Literal: =",
                "Type: NUMBER | Literal: 5",
                "Type: SEMICOLON | Literal: ;",
                "Type: IDENTIFIER | Literal: x",
                "Type: INCRE | Literal: ++",
                "Type: SEMICOLON | Literal: ;",
            ]
        );
    }

    #[test]
    fn test_dump_file_truncates_existing_destination() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("prog.mc");
        let destination = dir.path().join("tokens.txt");
        fs::write(&source, "x").unwrap();
        fs::write(&destination, "stale content\nmore stale content\n").unwrap();

        dump_file_with_preferences(&source, &destination, &text_prefs(), scanner_prefs()).unwrap();
        assert_eq!(
            lines(&fs::read(&destination).unwrap()),
            vec!["Type: IDENTIFIER | Literal: x"]
        );
    }

    #[test]
    fn test_empty_source_writes_nothing() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("empty.mc");
        let destination = dir.path().join("tokens.txt");
        fs::write(&source, "// only a comment\n").unwrap();

        let summary =
            dump_file_with_preferences(&source, &destination, &text_prefs(), scanner_prefs())
                .unwrap();
        assert_eq!(summary.tokens_written, 0);
        assert!(fs::read(&destination).unwrap().is_empty());
    }

    #[test]
    fn test_missing_source_does_not_create_destination() {
        let dir = tempdir().unwrap();
        let destination = dir.path().join("tokens.txt");

        let result = dump_file_with_preferences(
            &dir.path().join("absent.mc"),
            &destination,
            &text_prefs(),
            scanner_prefs(),
        );
        assert_matches!(result, Err(DriverError::OpenSource { .. }));
        assert!(!destination.exists());
    }

    #[test]
    fn test_uncreatable_destination() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("prog.mc");
        fs::write(&source, "x").unwrap();

        let destination = dir.path().join("no_such_dir").join("tokens.txt");
        let result =
            dump_file_with_preferences(&source, &destination, &text_prefs(), scanner_prefs());
        assert_matches!(result, Err(DriverError::CreateDestination { ref path, .. }) if *path == destination);
    }

    #[test]
    fn test_positions_suffix() {
        let mut scanner = scan("a\n  b");
        let preferences = DriverPreferences {
            include_positions: true,
            ..text_prefs()
        };

        let mut out = Vec::new();
        dump_to_writer(&mut scanner, &mut out, &preferences).unwrap();
        assert_eq!(
            lines(&out),
            vec![
                "Type: IDENTIFIER | Literal: a @ 1:1",
                "Type: IDENTIFIER | Literal: b @ 2:3",
            ]
        );
    }

    #[test]
    fn test_json_lines_format() {
        let mut scanner = scan("print(\"hi\") !=");
        let preferences = DriverPreferences {
            output_format: OutputFormat::Json,
            ..text_prefs()
        };

        let mut out = Vec::new();
        dump_to_writer(&mut scanner, &mut out, &preferences).unwrap();
        let written = lines(&out);
        assert_eq!(written.len(), 5);

        let first: serde_json::Value = serde_json::from_str(&written[0]).unwrap();
        assert_eq!(first["kind"], "PRINT");
        assert_eq!(first["text"], "print");
        assert!(first.get("line").is_none());

        let string: serde_json::Value = serde_json::from_str(&written[2]).unwrap();
        assert_eq!(string["kind"], "STRING");
        assert_eq!(string["text"], "hi");

        let not_eq: serde_json::Value = serde_json::from_str(&written[4]).unwrap();
        assert_eq!(not_eq["kind"], "NOTEQ");
    }

    #[test]
    fn test_json_with_positions() {
        let spanned = Spanned::new(
            Token::new(TokenKind::Number, "42"),
            Span::new(Position::new(4, 2, 3), Position::new(6, 2, 5)),
        );
        let preferences = DriverPreferences {
            output_format: OutputFormat::Json,
            include_positions: true,
            fail_on_illegal: false,
        };

        let line = render_token(&spanned, &preferences).unwrap();
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["line"], 2);
        assert_eq!(value["column"], 3);
    }

    #[test]
    fn test_fail_on_illegal_after_full_dump() {
        let mut scanner = scan("a @ b # c");
        let preferences = DriverPreferences {
            fail_on_illegal: true,
            ..text_prefs()
        };

        let mut out = Vec::new();
        let result = dump_to_writer(&mut scanner, &mut out, &preferences);
        assert_matches!(result, Err(DriverError::IllegalTokens { count: 2 }));
        assert_eq!(lines(&out).len(), 5);
    }

    #[test]
    fn test_illegal_tokens_counted_without_failing() {
        let mut scanner = scan("a @");
        let summary = dump_to_writer(&mut scanner, Vec::new(), &text_prefs()).unwrap();
        assert_eq!(summary.illegal_tokens, 1);
        assert_eq!(summary.tokens_written, 2);
    }

    #[test]
    fn test_write_failure() {
        let mut scanner = scan("let x;");
        let result = dump_to_writer(&mut scanner, FullDisk, &text_prefs());
        assert_matches!(result, Err(DriverError::WriteDestination { .. }));
    }

    #[test]
    fn test_scan_failure_is_read_source() {
        let bytes: &[u8] = b"x y \xfe z";
        let mut scanner = Scanner::with_preferences(bytes, scanner_prefs()).unwrap();
        let result = dump_to_writer(&mut scanner, Vec::new(), &text_prefs());
        assert_matches!(result, Err(DriverError::ReadSource { .. }));
    }

    fn start_of(event: &logging::LogEvent) -> Option<(u32, u32)> {
        event.span.map(|span| (span.start().line, span.start().column))
    }

    #[test]
    fn test_dump_emits_diagnostics() {
        logging::capture_events();
        let dir = tempdir().unwrap();
        let source = dir.path().join("diagnostics.mc");
        let destination = dir.path().join("tokens.txt");
        fs::write(&source, "a @ \"x").unwrap();

        dump_file_with_preferences(&source, &destination, &text_prefs(), scanner_prefs()).unwrap();

        let events = logging::captured_in(&source.display().to_string());
        let find = |level: LogLevel, code: logging::Code| {
            events.iter().find(|e| e.level == level && e.code == code)
        };

        let illegal = find(LogLevel::Warning, codes::lexical::ILLEGAL_CHARACTER).unwrap();
        assert_eq!(start_of(illegal), Some((1, 3)));
        assert_eq!(illegal.context.get("text").map(String::as_str), Some("@"));

        let unterminated = find(LogLevel::Warning, codes::lexical::UNTERMINATED_STRING).unwrap();
        assert_eq!(start_of(unterminated), Some((1, 5)));

        assert!(find(LogLevel::Info, codes::success::SOURCE_OPENED).is_some());
        assert!(find(LogLevel::Info, codes::success::TOKENIZATION_COMPLETE).is_some());
        let dumped = find(LogLevel::Info, codes::success::TOKEN_DUMP_COMPLETE).unwrap();
        assert_eq!(dumped.context.get("illegal").map(String::as_str), Some("2"));

        assert!(events
            .iter()
            .any(|e| e.level == LogLevel::Info && e.message == "Starting token dump"));
        let token_events = events
            .iter()
            .filter(|e| e.level == LogLevel::Debug && e.message == "Token")
            .count();
        assert_eq!(token_events, 3);
    }

    #[test]
    fn test_read_failure_is_logged_at_undecodable_character() {
        logging::capture_events();
        let bytes: &[u8] = b"ab\xff";

        let result = logging::with_file_context(PathBuf::from("read-failure.mc"), || {
            let mut scanner = Scanner::with_preferences(bytes, scanner_prefs()).unwrap();
            dump_to_writer(&mut scanner, Vec::new(), &text_prefs())
        });
        assert_matches!(
            result,
            Err(DriverError::ReadSource { source: ScanError::Read { line: 1, column: 3, .. } })
        );

        let events = logging::captured_in("read-failure.mc");
        let failure = events
            .iter()
            .find(|e| e.level == LogLevel::Error && e.code == codes::source::INVALID_ENCODING)
            .unwrap();
        assert_eq!(start_of(failure), Some((1, 3)));
        assert!(failure.context.contains_key("reason"));
        assert!(failure.format().contains("reason="));
    }
}
