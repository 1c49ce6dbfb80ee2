//! Source positions for tokens and errors.

use std::fmt;
use std::sync::Arc;

/// A location in a byte source.
///
/// Lines are 1-based. `offset` and `column` are byte counts, so `column` is the
/// number of bytes consumed on the current line before this position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Position {
    /// Identifier of the source (usually a path), if it has one.
    pub file: Option<Arc<str>>,
    /// Absolute byte offset from the start of the source.
    pub offset: u64,
    /// Line number, starting at 1.
    pub line: u64,
    /// Byte offset within the line, starting at 0.
    pub column: u64,
}

impl Position {
    /// Create a position without a file identifier.
    pub fn new(offset: u64, line: u64, column: u64) -> Self {
        Self {
            file: None,
            offset,
            line,
            column,
        }
    }

    /// Attach a file identifier.
    pub fn with_file(mut self, file: Option<Arc<str>>) -> Self {
        self.file = file;
        self
    }

    /// The file identifier, if any.
    #[inline]
    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    /// Byte range of length one starting at this position, for diagnostics.
    pub fn range(&self) -> std::ops::Range<usize> {
        let start = self.offset as usize;
        start..start + 1
    }
}

impl fmt::Display for Position {
    /// Formats as `file:line:column` with a 1-based column, like compilers do.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(file) = &self.file {
            write!(f, "{}:", file)?;
        }
        write!(f, "{}:{}", self.line, self.column + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_testhelpers::test;

    #[test]
    fn test_display_without_file() {
        assert_eq!(Position::new(10, 2, 4).to_string(), "2:5");
    }

    #[test]
    fn test_display_with_file() {
        let pos = Position::new(0, 1, 0).with_file(Some(Arc::from("items.vdf")));
        assert_eq!(pos.to_string(), "items.vdf:1:1");
        assert_eq!(pos.file(), Some("items.vdf"));
    }

    #[test]
    fn test_range_covers_one_byte() {
        assert_eq!(Position::new(7, 2, 3).range(), 7..8);
    }
}
