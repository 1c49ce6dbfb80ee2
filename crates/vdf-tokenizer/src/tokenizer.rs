//! Tokenizer for VDF text.

use std::io::{self, BufRead, BufReader, Read};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use tracing::trace;

use crate::{LexError, Position, PositionReader, Token, TokenKind};

/// A tokenizer that produces tokens from a byte source.
///
/// Runs as an iterator; the sequence ends at end of input or right after the
/// first [`TokenKind::Error`] token.
pub struct Tokenizer<R> {
    reader: PositionReader<R>,
    /// File identifier stamped on every token position.
    file: Option<Arc<str>>,
    /// Set once end of input or an error has been produced.
    done: bool,
}

/// How a string scan stopped.
enum StringEnd {
    /// Closing quote, or a delimiter that was pushed back.
    Delimited,
    /// End of input.
    EndOfInput,
    /// End of input right after a backslash.
    DanglingEscape,
}

impl<R: Read> Tokenizer<BufReader<R>> {
    /// Create a tokenizer over an unbuffered reader.
    pub fn from_reader(reader: R) -> Self {
        Self::new(BufReader::new(reader))
    }
}

impl<R: BufRead> Tokenizer<R> {
    /// Create a tokenizer over a buffered reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader: PositionReader::new(reader),
            file: None,
            done: false,
        }
    }

    /// Name the source; the name shows up in every token position.
    pub fn with_file(mut self, file: Option<Arc<str>>) -> Self {
        self.file = file;
        self
    }

    /// Treat the input as ended once `flag` is set.
    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.reader = self.reader.with_cancel(flag);
        self
    }

    /// The file identifier, if any.
    pub fn file(&self) -> Option<&Arc<str>> {
        self.file.as_ref()
    }

    /// The current read position.
    pub fn current_position(&self) -> Position {
        self.reader.position(self.file.as_ref())
    }

    /// Get the next token, or `None` once the input is exhausted.
    pub fn next_token(&mut self) -> Option<Token> {
        if self.done {
            return None;
        }

        let token = match self.lex() {
            Ok(Some(token)) => token,
            Ok(None) => {
                self.done = true;
                return None;
            }
            Err(e) => Token::error(LexError::from(e), self.current_position()),
        };

        if token.kind == TokenKind::Error {
            self.done = true;
        }
        trace!(
            "Token {:?} at {}: {:?}",
            token.kind, token.position, token.text
        );
        Some(token)
    }

    fn lex(&mut self) -> io::Result<Option<Token>> {
        let Some(first) = self.skip_whitespace()? else {
            return Ok(None);
        };
        let start = self.current_position();

        let token = match first {
            b'"' => {
                self.reader.read_byte()?;
                let mut buf = Vec::new();
                match self.read_string(&mut buf, is_quote)? {
                    StringEnd::Delimited => Token::new(TokenKind::String, decode(buf), start),
                    StringEnd::EndOfInput | StringEnd::DanglingEscape => {
                        Token::error(LexError::UnterminatedString, start)
                    }
                }
            }
            b'{' => {
                self.reader.read_byte()?;
                Token::new(TokenKind::OpenBrace, String::new(), start)
            }
            b'}' => {
                self.reader.read_byte()?;
                Token::new(TokenKind::CloseBrace, String::new(), start)
            }
            b'/' => {
                self.reader.read_byte()?;
                let line = self.reader.read_line()?.unwrap_or_default();
                Token::new(TokenKind::Comment, decode(line), start)
            }
            _ => {
                let mut buf = Vec::new();
                match self.read_string(&mut buf, is_unquoted_delimiter)? {
                    StringEnd::Delimited => {
                        self.unread()?;
                        Token::new(TokenKind::String, decode(buf), start)
                    }
                    StringEnd::EndOfInput => Token::new(TokenKind::String, decode(buf), start),
                    StringEnd::DanglingEscape => Token::error(LexError::DanglingEscape, start),
                }
            }
        };
        Ok(Some(token))
    }

    /// Skip whitespace and return the next byte without consuming it.
    fn skip_whitespace(&mut self) -> io::Result<Option<u8>> {
        loop {
            match self.reader.read_byte()? {
                None => return Ok(None),
                Some(b) if is_whitespace(b) => continue,
                Some(b) => {
                    self.unread()?;
                    return Ok(Some(b));
                }
            }
        }
    }

    /// Read string content into `buf` until `is_end` matches an unescaped byte.
    ///
    /// The terminating byte is consumed; unquoted callers push it back.
    fn read_string(&mut self, buf: &mut Vec<u8>, is_end: fn(u8) -> bool) -> io::Result<StringEnd> {
        let mut escaped = false;
        loop {
            let Some(b) = self.reader.read_byte()? else {
                return Ok(if escaped {
                    StringEnd::DanglingEscape
                } else {
                    StringEnd::EndOfInput
                });
            };

            if escaped {
                escaped = false;
                buf.push(unescape(b));
                continue;
            }

            if b == b'\\' {
                escaped = true;
                continue;
            }

            if is_end(b) {
                return Ok(StringEnd::Delimited);
            }

            buf.push(b);
        }
    }

    fn unread(&mut self) -> io::Result<()> {
        self.reader.unread_byte().map_err(io::Error::other)
    }
}

impl<R: BufRead> Iterator for Tokenizer<R> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

impl<R: BufRead> std::iter::FusedIterator for Tokenizer<R> {}

/// Byte produced by a backslash escape.
fn unescape(b: u8) -> u8 {
    match b {
        b'n' => b'\n',
        b'r' => b'\r',
        b't' => b'\t',
        other => other,
    }
}

fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

fn is_quote(b: u8) -> bool {
    b == b'"'
}

fn is_unquoted_delimiter(b: u8) -> bool {
    is_whitespace(b) || matches!(b, b'{' | b'}' | b'/' | b'"')
}

fn decode(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}
