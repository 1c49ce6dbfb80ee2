//! Parse errors and their rendering.

use ariadne::{Color, Label, Report, ReportKind, Source};
use vdf_tokenizer::{LexError, Position};
use vdf_tree::{Document, KeyValue};

use crate::ParseErrorKind;

/// Name used in reports for sources without a file identifier.
const ANONYMOUS: &str = "<input>";

/// A parse error with source location.
#[derive(Debug, Clone)]
pub struct ParseError {
    /// The kind of error.
    pub kind: ParseErrorKind,
    /// Where the error occurred.
    pub position: Position,
    /// Nodes parsed before the failure.
    partial: Vec<KeyValue>,
}

impl ParseError {
    /// Create a new parse error.
    pub fn new(kind: ParseErrorKind, position: Position) -> Self {
        Self {
            kind,
            position,
            partial: Vec::new(),
        }
    }

    /// Attach the top-level nodes parsed before the failure.
    pub(crate) fn with_partial(mut self, partial: Vec<KeyValue>) -> Self {
        self.partial = partial;
        self
    }

    /// The kind of error.
    pub fn kind(&self) -> &ParseErrorKind {
        &self.kind
    }

    /// Where the error occurred.
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Top-level nodes parsed before the failure, including the node that was
    /// being built when it happened (as an empty block if its value was never
    /// read). For diagnostics only.
    pub fn partial(&self) -> &[KeyValue] {
        &self.partial
    }

    /// Take the partial tree.
    pub fn into_partial(self) -> Document {
        Document::new(self.partial)
    }

    /// Render this error with ariadne.
    ///
    /// `source` must be the text of the file the error points into.
    pub fn render(&self, source: &str) -> String {
        let mut output = Vec::new();
        self.write_report(source, &mut output);
        String::from_utf8(output).unwrap_or_else(|_| format!("{}", self))
    }

    /// Write the error report to a writer.
    pub fn write_report<W: std::io::Write>(&self, source: &str, writer: W) {
        let filename = self.position.file().unwrap_or(ANONYMOUS);
        let report = self.build_report(filename, source.len());
        let _ = report
            .finish()
            .write((filename, Source::from(source)), writer);
    }

    fn build_report<'a>(
        &self,
        filename: &'a str,
        source_len: usize,
    ) -> ariadne::ReportBuilder<'static, (&'a str, std::ops::Range<usize>)> {
        let range = self.position.range();
        let start = range.start.min(source_len.saturating_sub(1));
        let range = start..range.end.min(source_len);

        let label = |message: &str| {
            Label::new((filename, range.clone()))
                .with_message(message.to_string())
                .with_color(Color::Red)
        };
        let report = Report::build(ReportKind::Error, (filename, range.clone()))
            .with_message(self.kind.to_string());

        match &self.kind {
            ParseErrorKind::Lex(LexError::UnterminatedString) => report
                .with_label(label("string starts here"))
                .with_help("add a closing '\"'"),
            ParseErrorKind::Lex(LexError::DanglingEscape) => report
                .with_label(label("escape has nothing to escape"))
                .with_help("write '\\\\' for a literal backslash"),
            ParseErrorKind::Lex(LexError::Io(_)) => {
                report.with_label(label("reading stopped here"))
            }
            ParseErrorKind::UnexpectedToken { .. } => report
                .with_label(label("expected a key here"))
                .with_help("every entry starts with a quoted or unquoted key"),
            ParseErrorKind::DanglingCloseBrace => report
                .with_label(label("no block to close"))
                .with_help("remove this '}' or add the matching '{'"),
            ParseErrorKind::UnclosedBlock => report
                .with_label(label("block opened here"))
                .with_help("add a closing '}'"),
            ParseErrorKind::MissingValue => report
                .with_label(label("this key has no value"))
                .with_help("follow the key with a value or a '{ ... }' block"),
            ParseErrorKind::NestingTooDeep { .. } => {
                report.with_label(label("too deep"))
            }
            ParseErrorKind::Include(_) => report
                .with_label(label("included here"))
                .with_help("a file cannot include itself, directly or through other files"),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at {}", self.kind, self.position)
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            ParseErrorKind::Lex(e) => Some(e),
            ParseErrorKind::Include(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_testhelpers::test;
    use std::sync::Arc;

    fn render_stripped(error: &ParseError, source: &str) -> String {
        let rendered = error.render(source);
        String::from_utf8(strip_ansi_escapes::strip(rendered.as_bytes())).unwrap()
    }

    #[test]
    fn test_display_has_provenance() {
        let err = ParseError::new(
            ParseErrorKind::DanglingCloseBrace,
            Position::new(4, 1, 4).with_file(Some(Arc::from("game.vdf"))),
        );
        assert_eq!(err.to_string(), "unexpected closing brace at game.vdf:1:5");
    }

    #[test]
    fn test_render_dangling_close_brace() {
        let source = "\"x\" }";
        let err = ParseError::new(ParseErrorKind::DanglingCloseBrace, Position::new(4, 1, 4));
        let output = render_stripped(&err, source);
        assert!(output.contains("unexpected closing brace"), "{}", output);
        assert!(output.contains("<input>"), "{}", output);
        assert!(output.contains("no block to close"), "{}", output);
    }

    #[test]
    fn test_render_position_at_end_of_input() {
        let source = "\"a\"";
        let err = ParseError::new(ParseErrorKind::MissingValue, Position::new(3, 1, 3));
        let output = render_stripped(&err, source);
        assert!(output.contains("key has no value"), "{}", output);
    }

    #[test]
    fn test_render_position_past_end_of_source() {
        let err = ParseError::new(ParseErrorKind::UnclosedBlock, Position::new(40, 3, 0));
        let output = render_stripped(&err, "\"a\" {");
        assert!(output.contains("block opened here"), "{}", output);
    }

    #[test]
    fn test_source_chain() {
        use std::error::Error;
        let err = ParseError::new(
            ParseErrorKind::Lex(LexError::UnterminatedString),
            Position::default(),
        );
        assert!(err.source().is_some());
        let err = ParseError::new(ParseErrorKind::UnclosedBlock, Position::default());
        assert!(err.source().is_none());
    }

    #[test]
    fn test_partial_tree() {
        let err = ParseError::new(ParseErrorKind::UnclosedBlock, Position::default())
            .with_partial(vec![KeyValue::leaf("a", "1")]);
        assert_eq!(err.partial().len(), 1);
        assert_eq!(err.into_partial().root().and_then(|kv| kv.value()), Some("1"));
    }
}
