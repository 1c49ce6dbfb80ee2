//! Recursive-descent parser building a [`Document`] from tokens.

use std::io::{BufReader, Read};
use std::sync::Arc;
use std::thread;

use tracing::{debug, warn};
use vdf_tokenizer::{LexError, Position, Token, TokenKind, Tokenizer, spawn_tokenizer};
use vdf_tree::{Document, KeyValue};

use crate::include::is_include_key;
use crate::{IncludeError, Includer, ParseError, ParseErrorKind, ParseOptions, Pipeline};

/// How a block ended without error.
enum BlockEnd {
    /// The token stream ran out.
    EndOfInput,
    /// A `}` at the given position.
    CloseBrace(Position),
}

/// Parser over a token stream.
///
/// One `parse_block` frame per nesting level; each frame alternates between
/// expecting a key and expecting a value or block.
pub struct Parser<'a, I> {
    tokens: I,
    includer: Option<&'a dyn Includer>,
    options: &'a ParseOptions,
    /// Nesting level of the document being parsed; non-zero for includes.
    base_depth: usize,
}

impl<'a, I> Parser<'a, I>
where
    I: Iterator<Item = Token>,
{
    /// Create a parser reading from `tokens`.
    pub fn new(tokens: I, includer: Option<&'a dyn Includer>, options: &'a ParseOptions) -> Self {
        Self {
            tokens,
            includer,
            options,
            base_depth: 0,
        }
    }

    fn at_depth(mut self, depth: usize) -> Self {
        self.base_depth = depth;
        self
    }

    /// Parse the whole token stream.
    pub fn parse_document(mut self) -> Result<Document, ParseError> {
        let mut entries = Vec::new();
        match self.parse_block(&mut entries, self.base_depth) {
            Ok(BlockEnd::EndOfInput) => Ok(Document::new(entries)),
            Ok(BlockEnd::CloseBrace(position)) => {
                Err(ParseError::new(ParseErrorKind::DanglingCloseBrace, position)
                    .with_partial(entries))
            }
            Err(e) => Err(e.with_partial(entries)),
        }
    }

    /// Next token that is not a comment.
    fn next_significant(&mut self) -> Option<Token> {
        self.tokens.by_ref().find(|t| !t.is_trivia())
    }

    /// Parse entries into `entries` until the input ends or a `}` closes the block.
    fn parse_block(
        &mut self,
        entries: &mut Vec<KeyValue>,
        depth: usize,
    ) -> Result<BlockEnd, ParseError> {
        loop {
            // Expect a key.
            let Some(key) = self.next_significant() else {
                return Ok(BlockEnd::EndOfInput);
            };
            match key.kind {
                TokenKind::String => {}
                TokenKind::CloseBrace => return Ok(BlockEnd::CloseBrace(key.position)),
                TokenKind::Error => return Err(lex_error(key)),
                found => {
                    return Err(ParseError::new(
                        ParseErrorKind::UnexpectedToken { found },
                        key.position,
                    ));
                }
            }

            // Expect a value or a block.
            let Some(token) = self.next_significant() else {
                entries.push(KeyValue::block(key.text, Vec::new()));
                return Err(ParseError::new(ParseErrorKind::MissingValue, key.position));
            };
            match token.kind {
                TokenKind::String => match self.includer {
                    Some(includer) if is_include_key(&key.text) => {
                        self.include(includer, key, token, entries, depth)?;
                    }
                    _ => entries.push(KeyValue::leaf(key.text, token.text)),
                },
                TokenKind::OpenBrace => {
                    if depth >= self.options.max_depth {
                        entries.push(KeyValue::block(key.text, Vec::new()));
                        return Err(ParseError::new(
                            ParseErrorKind::NestingTooDeep {
                                limit: self.options.max_depth,
                            },
                            token.position,
                        ));
                    }
                    let mut children = Vec::new();
                    let end = self.parse_block(&mut children, depth + 1);
                    entries.push(KeyValue::block(key.text, children));
                    match end? {
                        BlockEnd::CloseBrace(_) => {}
                        BlockEnd::EndOfInput => {
                            return Err(ParseError::new(
                                ParseErrorKind::UnclosedBlock,
                                token.position,
                            ));
                        }
                    }
                }
                TokenKind::CloseBrace => {
                    entries.push(KeyValue::block(key.text, Vec::new()));
                    return Err(ParseError::new(
                        ParseErrorKind::DanglingCloseBrace,
                        token.position,
                    ));
                }
                TokenKind::Error => {
                    entries.push(KeyValue::block(key.text, Vec::new()));
                    return Err(lex_error(token));
                }
                found @ TokenKind::Comment => {
                    return Err(ParseError::new(
                        ParseErrorKind::UnexpectedToken { found },
                        token.position,
                    ));
                }
            }
        }
    }

    /// Splice the document named by `value` into `entries`.
    ///
    /// Unresolvable names are kept as a plain leaf; cycles are fatal.
    fn include(
        &mut self,
        includer: &dyn Includer,
        key: Token,
        value: Token,
        entries: &mut Vec<KeyValue>,
        depth: usize,
    ) -> Result<(), ParseError> {
        match includer.resolve(&value.text) {
            Ok(resolved) => {
                debug!(name = %value.text, file = ?resolved.file, "including");
                if depth >= self.options.max_depth {
                    return Err(ParseError::new(
                        ParseErrorKind::NestingTooDeep {
                            limit: self.options.max_depth,
                        },
                        value.position,
                    ));
                }
                let included = parse_source(
                    resolved.reader,
                    resolved.file,
                    self.options,
                    Some(resolved.includer.as_ref()),
                    depth + 1,
                )?;
                entries.extend(included.into_entries());
                Ok(())
            }
            Err(IncludeError::NotFound { name, source }) => {
                warn!(
                    %name,
                    error = ?source,
                    position = %value.position,
                    "include not found, keeping directive as a value"
                );
                entries.push(KeyValue::leaf(key.text, value.text));
                Ok(())
            }
            Err(e @ IncludeError::Cycle { .. }) => {
                Err(ParseError::new(ParseErrorKind::Include(e), value.position))
            }
        }
    }
}

fn lex_error(token: Token) -> ParseError {
    let error = token.error.unwrap_or(LexError::UnterminatedString);
    ParseError::new(ParseErrorKind::Lex(error), token.position)
}

/// Tokenize and parse `reader` with the configured pipeline.
pub(crate) fn parse_source<R>(
    reader: R,
    file: Option<Arc<str>>,
    options: &ParseOptions,
    includer: Option<&dyn Includer>,
    depth: usize,
) -> Result<Document, ParseError>
where
    R: Read + Send,
{
    let tokenizer = Tokenizer::new(BufReader::new(reader)).with_file(file.clone());
    match options.pipeline {
        Pipeline::Inline => Parser::new(tokenizer, includer, options)
            .at_depth(depth)
            .parse_document(),
        Pipeline::Threaded { capacity } => thread::scope(|scope| {
            let tokens = spawn_tokenizer(scope, tokenizer, capacity).map_err(|e| {
                ParseError::new(
                    ParseErrorKind::Lex(LexError::from(e)),
                    Position::new(0, 1, 0).with_file(file.clone()),
                )
            })?;
            Parser::new(tokens, includer, options)
                .at_depth(depth)
                .parse_document()
        }),
    }
}
