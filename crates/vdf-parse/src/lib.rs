#![doc = include_str!("../README.md")]

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::sync::Arc;

pub use vdf_tokenizer::{LexError, Position, Token, TokenKind};
pub use vdf_tree::{Document, KeyValue, Payload};

mod diagnostic;
pub use diagnostic::ParseError;

mod error;
pub use error::ParseErrorKind;

mod include;
pub use include::{
    FileIncluder, INCLUDE_KEYS, IncludeError, Includer, MemoryIncluder, Resolved, is_include_key,
};

mod options;
pub use options::{DEFAULT_MAX_DEPTH, ParseOptions, Pipeline};

mod parser;
pub use parser::Parser;

/// Parse a document from `reader` with default options and no include resolution.
///
/// `#base` and `#include` entries are kept as plain values.
pub fn parse<R: Read + Send>(reader: R) -> Result<Document, ParseError> {
    parse_with(reader, &ParseOptions::default(), None)
}

/// Parse a document from `reader`.
///
/// When `includer` is set, `#base` and `#include` entries are replaced by the
/// top-level nodes of the documents they name.
pub fn parse_with<R: Read + Send>(
    reader: R,
    options: &ParseOptions,
    includer: Option<&dyn Includer>,
) -> Result<Document, ParseError> {
    parser::parse_source(reader, options.file_name.clone(), options, includer, 0)
}

/// Parse a document held in memory.
pub fn parse_str(source: &str) -> Result<Document, ParseError> {
    parse(source.as_bytes())
}

/// Parse the file at `path`, resolving includes relative to its directory.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Document, ParseError> {
    parse_file_with(path, &ParseOptions::default())
}

/// Parse the file at `path` with the given options.
///
/// Positions are stamped with `options.file_name`, or with the path when unset.
pub fn parse_file_with(
    path: impl AsRef<Path>,
    options: &ParseOptions,
) -> Result<Document, ParseError> {
    let path = path.as_ref();
    let name: Arc<str> = match &options.file_name {
        Some(name) => name.clone(),
        None => Arc::from(path.display().to_string()),
    };
    let open_error = |e: io::Error| {
        ParseError::new(
            ParseErrorKind::Lex(LexError::from(e)),
            Position::new(0, 1, 0).with_file(Some(name.clone())),
        )
    };

    let file = File::open(path).map_err(open_error)?;
    let includer = FileIncluder::for_file(path).map_err(open_error)?;
    tracing::debug!(file = %name, root = %includer.root().display(), "parsing file");
    parser::parse_source(file, Some(name.clone()), options, Some(&includer), 0)
}

#[cfg(test)]
mod proptests;
