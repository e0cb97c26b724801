//! Character source with one character of lookahead
//!
//! Decodes UTF-8 from any [`BufRead`] one `char` at a time. End of input is
//! `None`; there is no in-band sentinel, so a NUL byte in the input is an
//! ordinary character.

use crate::utils::Position;
use std::io::{self, BufRead, Cursor};

pub struct CharSource<R> {
    reader: Option<R>,
    current: Option<char>,
    lookahead: Option<char>,
    position: Position,
}

impl<R: BufRead> CharSource<R> {
    /// Wrap a reader and prime the current and lookahead characters
    pub fn new(reader: R) -> io::Result<Self> {
        let mut source = Self::unprimed(reader);
        source.prime()?;
        Ok(source)
    }

    /// Wrap a reader without decoding anything; call [`prime`](Self::prime) before use
    pub fn unprimed(reader: R) -> Self {
        Self {
            reader: Some(reader),
            current: None,
            lookahead: None,
            position: Position::start(),
        }
    }

    /// Decode the current and lookahead characters.
    ///
    /// On failure the characters decoded so far are kept, so
    /// [`read_position`](Self::read_position) names the undecodable one.
    pub fn prime(&mut self) -> io::Result<()> {
        if self.current.is_none() {
            self.current = self.read_char()?;
        }
        if self.current.is_some() {
            self.lookahead = self.read_char()?;
        }
        Ok(())
    }

    /// Character under the cursor
    pub fn current(&self) -> Option<char> {
        self.current
    }

    /// Character after the current one; repeated calls return the same value
    pub fn peek(&self) -> Option<char> {
        self.lookahead
    }

    /// Position of the current character
    pub fn position(&self) -> Position {
        self.position
    }

    /// Position the next character decoded from the reader will occupy
    pub fn read_position(&self) -> Position {
        [self.current, self.lookahead]
            .into_iter()
            .flatten()
            .fold(self.position, Position::advance)
    }

    /// Consume and return the current character.
    ///
    /// Position moves according to the consumed character. Returns `None`
    /// without side effects once the input is exhausted. A failed read
    /// leaves the source unchanged.
    pub fn advance(&mut self) -> io::Result<Option<char>> {
        let Some(consumed) = self.current else {
            return Ok(None);
        };

        let next = self.read_char()?;
        self.position = self.position.advance(consumed);
        self.current = self.lookahead;
        self.lookahead = next;
        Ok(Some(consumed))
    }

    pub fn is_exhausted(&self) -> bool {
        self.current.is_none()
    }

    /// Release the reader; the source then behaves as exhausted
    pub fn close(&mut self) {
        self.reader = None;
        self.current = None;
        self.lookahead = None;
    }

    pub fn is_closed(&self) -> bool {
        self.reader.is_none()
    }

    fn read_char(&mut self) -> io::Result<Option<char>> {
        match self.reader.as_mut() {
            Some(reader) => decode_char(reader),
            None => Ok(None),
        }
    }
}

impl CharSource<Cursor<String>> {
    /// In-memory source; priming cannot fail
    pub fn from_text(text: &str) -> Self {
        let mut chars = text.chars();
        let current = chars.next();
        let lookahead = chars.next();
        let primed = current.map_or(0, char::len_utf8) + lookahead.map_or(0, char::len_utf8);

        let mut reader = Cursor::new(text.to_owned());
        reader.set_position(primed as u64);

        Self {
            reader: Some(reader),
            current,
            lookahead,
            position: Position::start(),
        }
    }
}

// ============================================================================
// UTF-8 DECODING
// ============================================================================

fn decode_char<R: BufRead>(reader: &mut R) -> io::Result<Option<char>> {
    let Some(lead) = read_byte(reader)? else {
        return Ok(None);
    };

    let width = utf8_width(lead).ok_or_else(|| {
        invalid_data(format!("invalid UTF-8 lead byte 0x{:02x}", lead))
    })?;

    let mut bytes = [lead, 0, 0, 0];
    for slot in bytes.iter_mut().take(width).skip(1) {
        *slot = read_byte(reader)?
            .ok_or_else(|| invalid_data("truncated UTF-8 sequence at end of input".to_string()))?;
    }

    let decoded = std::str::from_utf8(&bytes[..width])
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    Ok(decoded.chars().next())
}

fn read_byte<R: BufRead>(reader: &mut R) -> io::Result<Option<u8>> {
    loop {
        match reader.fill_buf() {
            Ok([]) => return Ok(None),
            Ok(buf) => {
                let byte = buf[0];
                reader.consume(1);
                return Ok(Some(byte));
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

fn utf8_width(lead: u8) -> Option<usize> {
    match lead {
        0x00..=0x7F => Some(1),
        0xC2..=0xDF => Some(2),
        0xE0..=0xEF => Some(3),
        0xF0..=0xF4 => Some(4),
        _ => None,
    }
}

fn invalid_data(message: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::compile_time::source::TAB_WIDTH;
    use std::io::{BufReader, Read};

    /// Reader that yields `good` bytes and then fails
    struct FailingReader {
        good: Vec<u8>,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.good.is_empty() {
                return Err(io::Error::new(io::ErrorKind::Other, "device unplugged"));
            }
            let n = buf.len().min(self.good.len());
            buf[..n].copy_from_slice(&self.good[..n]);
            self.good.drain(..n);
            Ok(n)
        }
    }

    fn collect(source: &mut CharSource<impl BufRead>) -> String {
        let mut out = String::new();
        while let Some(ch) = source.advance().unwrap() {
            out.push(ch);
        }
        out
    }

    #[test]
    fn test_peek_has_no_side_effects() {
        let source = CharSource::from_text("ab");
        assert_eq!(source.current(), Some('a'));
        assert_eq!(source.peek(), Some('b'));
        assert_eq!(source.peek(), Some('b'));
        assert_eq!(source.current(), Some('a'));
        assert_eq!(source.position(), Position::start());
    }

    #[test]
    fn test_reader_and_text_sources_agree() {
        let text = "let ü = \"π\";\n\tx++";
        let mut from_text = CharSource::from_text(text);
        let mut from_reader = CharSource::new(BufReader::new(text.as_bytes())).unwrap();

        assert_eq!(collect(&mut from_text), text);
        assert_eq!(collect(&mut from_reader), text);
        assert_eq!(from_text.position(), from_reader.position());
        assert_eq!(from_text.position().offset, text.len());
    }

    #[test]
    fn test_position_rules_apply_to_consumed_character() {
        let mut source = CharSource::from_text("a\tb\r\nc");
        source.advance().unwrap(); // a
        assert_eq!(source.position().column, 2);
        source.advance().unwrap(); // tab
        assert_eq!(source.position().column, 2 + TAB_WIDTH);
        source.advance().unwrap(); // b
        source.advance().unwrap(); // \r
        assert_eq!(source.position().line, 1);
        assert_eq!(source.position().column, 1);
        source.advance().unwrap(); // \n
        assert_eq!(source.position().line, 2);
        assert_eq!(source.position().column, 1);
        assert_eq!(source.current(), Some('c'));
    }

    #[test]
    fn test_exhaustion_is_stable() {
        let mut source = CharSource::from_text("x");
        assert_eq!(source.peek(), None);
        assert_eq!(source.advance().unwrap(), Some('x'));
        assert!(source.is_exhausted());
        let end = source.position();
        assert_eq!(source.advance().unwrap(), None);
        assert_eq!(source.advance().unwrap(), None);
        assert_eq!(source.position(), end);
    }

    #[test]
    fn test_nul_is_an_ordinary_character() {
        let mut source = CharSource::from_text("a\0b");
        assert_eq!(collect(&mut source), "a\0b");
    }

    #[test]
    fn test_invalid_utf8_is_invalid_data() {
        let bytes: &[u8] = &[b'a', b'b', 0xFF, b'c'];
        let mut source = CharSource::new(bytes).unwrap();
        // 'a' and 'b' are primed; consuming 'a' decodes the bad byte
        let err = source.advance().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_failed_read_leaves_state_unchanged() {
        let bytes: &[u8] = &[b'a', b'b', 0xFF, b'c'];
        let mut source = CharSource::new(bytes).unwrap();

        assert!(source.advance().is_err());
        assert_eq!(source.current(), Some('a'));
        assert_eq!(source.peek(), Some('b'));
        assert_eq!(source.position(), Position::start());
        assert_eq!(source.read_position().column, 3);
    }

    #[test]
    fn test_read_position_during_priming() {
        let mut source = CharSource::unprimed(&[b'x', 0xC3][..]);
        assert_eq!(source.read_position(), Position::start());

        let err = source.prime().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert_eq!(source.current(), Some('x'));
        assert_eq!(source.read_position().column, 2);
    }

    #[test]
    fn test_truncated_sequence_is_invalid_data() {
        let bytes: &[u8] = &[0xE2, 0x82];
        let err = CharSource::new(bytes).err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_reader_failure_surfaces() {
        let reader = BufReader::new(FailingReader {
            good: b"abc".to_vec(),
        });
        let mut source = CharSource::new(reader).unwrap();
        assert_eq!(source.advance().unwrap(), Some('a'));
        let err = source.advance().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Other);
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut source = CharSource::from_text("abc");
        source.close();
        assert!(source.is_closed());
        assert!(source.is_exhausted());
        source.close();
        assert_eq!(source.advance().unwrap(), None);
    }
}
