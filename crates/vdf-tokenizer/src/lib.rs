#![doc = include_str!("../README.md")]

mod position;
pub use position::Position;

mod reader;
pub use reader::{PositionReader, UnreadError};

mod token;
pub use token::{LexError, Token, TokenKind};

mod tokenizer;
pub use tokenizer::Tokenizer;

mod pipeline;
pub use pipeline::{DEFAULT_QUEUE_CAPACITY, TokenStream, spawn_tokenizer};
