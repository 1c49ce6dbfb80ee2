//! Text output for KeyValues trees.
//!
//! Keys and values are written between double quotes exactly as stored, with
//! no escaping. A value holding `"`, `\` or control characters will therefore
//! not read back unchanged.

use std::fmt;
use std::io;

use crate::{Document, KeyValue, Payload};

/// Write `nodes` at the given depth, one tab of indentation per level.
fn write_nodes<W: fmt::Write>(out: &mut W, nodes: &[KeyValue], depth: usize) -> fmt::Result {
    for kv in nodes {
        indent(out, depth)?;
        write!(out, "\"{}\"", kv.key)?;
        match &kv.payload {
            Payload::Value(value) => writeln!(out, " \"{}\"", value)?,
            Payload::Block(children) => {
                out.write_char('\n')?;
                indent(out, depth)?;
                out.write_str("{\n")?;
                write_nodes(out, children, depth + 1)?;
                indent(out, depth)?;
                out.write_str("}\n")?;
            }
        }
    }
    Ok(())
}

fn indent<W: fmt::Write>(out: &mut W, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        out.write_char('\t')?;
    }
    Ok(())
}

/// Forwards formatted text to an `io::Write`, counting bytes and keeping the
/// first I/O error.
struct IoAdapter<'a, W: ?Sized> {
    inner: &'a mut W,
    written: u64,
    error: Option<io::Error>,
}

impl<W: io::Write + ?Sized> fmt::Write for IoAdapter<'_, W> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        match self.inner.write_all(s.as_bytes()) {
            Ok(()) => {
                self.written += s.len() as u64;
                Ok(())
            }
            Err(e) => {
                self.error = Some(e);
                Err(fmt::Error)
            }
        }
    }
}

fn write_io<W: io::Write + ?Sized>(nodes: &[KeyValue], sink: &mut W) -> io::Result<u64> {
    let mut adapter = IoAdapter {
        inner: sink,
        written: 0,
        error: None,
    };
    match write_nodes(&mut adapter, nodes, 0) {
        Ok(()) => Ok(adapter.written),
        Err(fmt::Error) => Err(adapter
            .error
            .unwrap_or_else(|| io::Error::other("formatter error"))),
    }
}

impl KeyValue {
    /// Write this node and its children to `sink`, returning the number of
    /// bytes written.
    pub fn write_to<W: io::Write + ?Sized>(&self, sink: &mut W) -> io::Result<u64> {
        write_io(std::slice::from_ref(self), sink)
    }
}

impl Document {
    /// Write every top-level node to `sink`, returning the number of bytes
    /// written.
    pub fn write_to<W: io::Write + ?Sized>(&self, sink: &mut W) -> io::Result<u64> {
        write_io(&self.entries, sink)
    }
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_nodes(f, std::slice::from_ref(self), 0)
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_nodes(f, &self.entries, 0)
    }
}
