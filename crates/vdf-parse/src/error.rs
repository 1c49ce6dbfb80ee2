//! Parse error kinds.

use std::fmt;

use vdf_tokenizer::{LexError, TokenKind};

use crate::IncludeError;

/// What went wrong while parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    /// The tokenizer failed (I/O error or unfinished string).
    Lex(LexError),
    /// A key was expected.
    UnexpectedToken {
        /// The kind of token found instead.
        found: TokenKind,
    },
    /// A `}` with no matching `{`.
    DanglingCloseBrace,
    /// Input ended inside a block.
    UnclosedBlock,
    /// Input ended after a key.
    MissingValue,
    /// Blocks and includes nested deeper than the configured limit.
    NestingTooDeep {
        /// The configured limit.
        limit: usize,
    },
    /// An include could not be followed.
    Include(IncludeError),
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrorKind::Lex(e) => write!(f, "{}", e),
            ParseErrorKind::UnexpectedToken { found } => {
                write!(f, "unexpected token {}, expected string", found)
            }
            ParseErrorKind::DanglingCloseBrace => write!(f, "unexpected closing brace"),
            ParseErrorKind::UnclosedBlock => write!(f, "unclosed block"),
            ParseErrorKind::MissingValue => write!(f, "key has no value"),
            ParseErrorKind::NestingTooDeep { limit } => {
                write!(f, "nesting deeper than {} levels", limit)
            }
            ParseErrorKind::Include(e) => write!(f, "{}", e),
        }
    }
}
