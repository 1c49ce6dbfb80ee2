//! Parser configuration.

use std::sync::Arc;

use vdf_tokenizer::DEFAULT_QUEUE_CAPACITY;

/// Default limit on block nesting.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// How tokens get from the tokenizer to the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pipeline {
    /// Tokenize on a separate thread, buffering at most `capacity` tokens.
    Threaded {
        /// Queue size between tokenizer and parser.
        capacity: usize,
    },
    /// Pull tokens on demand on the parsing thread.
    Inline,
}

impl Default for Pipeline {
    fn default() -> Self {
        Pipeline::Threaded {
            capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

/// Options for parsing.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Identifier stamped on positions of the top-level source (default: none).
    pub file_name: Option<Arc<str>>,

    /// Token pipeline (default: threaded, 32 tokens).
    pub pipeline: Pipeline,

    /// Maximum block nesting, counting each include as one level (default: 256).
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            file_name: None,
            pipeline: Pipeline::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParseOptions {
    /// Create new default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Name the top-level source.
    pub fn file_name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    /// Tokenize on the parsing thread.
    pub fn inline(mut self) -> Self {
        self.pipeline = Pipeline::Inline;
        self
    }

    /// Tokenize on a separate thread with the given queue size.
    pub fn threaded(mut self, capacity: usize) -> Self {
        self.pipeline = Pipeline::Threaded { capacity };
        self
    }

    /// Set the nesting limit.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }
}
