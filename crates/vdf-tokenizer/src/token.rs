//! Token types for the VDF tokenizer.

use std::fmt;
use std::io;
use std::sync::Arc;

use crate::Position;

/// The kind of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "facet", derive(facet::Facet))]
#[repr(u8)]
pub enum TokenKind {
    /// Quoted or unquoted string, after escape processing.
    String,
    /// `{`
    OpenBrace,
    /// `}`
    CloseBrace,
    /// Everything after a `/` up to the end of the line.
    Comment,
    /// Lexing failed; the token carries a [`LexError`].
    Error,
}

impl TokenKind {
    /// Human readable name, used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::String => "string",
            TokenKind::OpenBrace => "`{`",
            TokenKind::CloseBrace => "`}`",
            TokenKind::Comment => "comment",
            TokenKind::Error => "error",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Why the tokenizer stopped early.
#[derive(Debug, Clone)]
pub enum LexError {
    /// The byte source failed.
    Io(Arc<io::Error>),
    /// Input ended inside a quoted string.
    UnterminatedString,
    /// Input ended right after a backslash.
    DanglingEscape,
}

impl PartialEq for LexError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (LexError::Io(a), LexError::Io(b)) => a.kind() == b.kind(),
            (LexError::UnterminatedString, LexError::UnterminatedString) => true,
            (LexError::DanglingEscape, LexError::DanglingEscape) => true,
            _ => false,
        }
    }
}

impl Eq for LexError {}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexError::Io(e) => write!(f, "read failed: {}", e),
            LexError::UnterminatedString => write!(f, "unterminated quoted string"),
            LexError::DanglingEscape => write!(f, "input ends after `\\`"),
        }
    }
}

impl std::error::Error for LexError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LexError::Io(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<io::Error> for LexError {
    fn from(e: io::Error) -> Self {
        LexError::Io(Arc::new(e))
    }
}

/// A token with its kind, payload and position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// String or comment payload. Empty for braces and errors.
    pub text: String,
    /// Where the token starts.
    pub position: Position,
    /// Set for [`TokenKind::Error`] tokens.
    pub error: Option<LexError>,
}

impl Token {
    /// Create a new token.
    pub fn new(kind: TokenKind, text: String, position: Position) -> Self {
        Self {
            kind,
            text,
            position,
            error: None,
        }
    }

    /// Create an error token.
    pub fn error(error: LexError, position: Position) -> Self {
        Self {
            kind: TokenKind::Error,
            text: String::new(),
            position,
            error: Some(error),
        }
    }

    /// Whether this token carries no meaning for the tree.
    #[inline]
    pub fn is_trivia(&self) -> bool {
        self.kind == TokenKind::Comment
    }
}
