//! Byte reader that keeps track of where it is.

use std::fmt;
use std::io::{self, BufRead, ErrorKind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::Position;

/// Returned by [`PositionReader::unread_byte`] when there is no byte to put back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnreadError;

impl fmt::Display for UnreadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no byte to unread")
    }
}

impl std::error::Error for UnreadError {}

/// A buffered byte reader with one byte of pushback that counts bytes, lines
/// and bytes within the current line.
pub struct PositionReader<R> {
    inner: R,
    /// Byte handed back by `unread_byte`, returned by the next read.
    pushback: Option<u8>,
    /// The byte most recently returned by `read_byte`, if it may be unread.
    last: Option<u8>,
    offset: u64,
    line: u64,
    column: u64,
    /// Column before the most recent newline, restored when it is unread.
    prev_column: u64,
    /// Once set, the source is treated as exhausted.
    cancel: Option<Arc<AtomicBool>>,
}

impl<R: BufRead> PositionReader<R> {
    /// Wrap a buffered reader. Counting starts at line 1, column 0.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            pushback: None,
            last: None,
            offset: 0,
            line: 1,
            column: 0,
            prev_column: 0,
            cancel: None,
        }
    }

    /// Stop reading from the source once `flag` is set. Reads after that
    /// report end of input.
    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Total bytes consumed so far.
    #[inline]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Current line, starting at 1.
    #[inline]
    pub fn line(&self) -> u64 {
        self.line
    }

    /// Bytes consumed on the current line.
    #[inline]
    pub fn column(&self) -> u64 {
        self.column
    }

    /// Snapshot the counters as a [`Position`] in `file`.
    pub fn position(&self, file: Option<&Arc<str>>) -> Position {
        Position::new(self.offset, self.line, self.column).with_file(file.cloned())
    }

    /// Read one byte. Returns `Ok(None)` at end of input.
    pub fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let byte = match self.pushback.take() {
            Some(b) => b,
            None => match self.next_from_inner()? {
                Some(b) => b,
                None => {
                    self.last = None;
                    return Ok(None);
                }
            },
        };

        self.offset += 1;
        if byte == b'\n' {
            self.line += 1;
            self.prev_column = self.column;
            self.column = 0;
        } else {
            self.column += 1;
        }
        self.last = Some(byte);
        Ok(Some(byte))
    }

    /// Put the byte returned by the last `read_byte` back, rolling every
    /// counter back by one step.
    pub fn unread_byte(&mut self) -> Result<(), UnreadError> {
        let byte = self.last.take().ok_or(UnreadError)?;
        self.pushback = Some(byte);
        self.offset -= 1;
        if byte == b'\n' {
            self.line -= 1;
            self.column = self.prev_column;
        } else {
            self.column -= 1;
        }
        Ok(())
    }

    /// Read up to and including the next newline. The newline is not part of
    /// the returned bytes. Returns `Ok(None)` if the input was already exhausted.
    ///
    /// Bytes consumed before a read error are counted, so the position points
    /// past them.
    pub fn read_line(&mut self) -> io::Result<Option<Vec<u8>>> {
        self.last = None;
        let mut line = Vec::new();
        if let Some(b) = self.pushback.take() {
            self.count_line_bytes(&[b]);
            if b == b'\n' {
                return Ok(Some(line));
            }
            line.push(b);
        }

        loop {
            if self.is_cancelled() {
                break;
            }
            let buf = match self.inner.fill_buf() {
                Ok(buf) => buf,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            if buf.is_empty() {
                break;
            }
            let (len, found_newline) = match buf.iter().position(|&b| b == b'\n') {
                Some(i) => (i + 1, true),
                None => (buf.len(), false),
            };
            let start = line.len();
            line.extend_from_slice(&buf[..len]);
            self.inner.consume(len);
            self.count_line_bytes(&line[start..]);
            if found_newline {
                line.pop();
                return Ok(Some(line));
            }
        }

        if line.is_empty() {
            Ok(None)
        } else {
            Ok(Some(line))
        }
    }

    /// Advance the counters over `bytes`, which hold no newline except
    /// possibly the last byte.
    fn count_line_bytes(&mut self, bytes: &[u8]) {
        self.offset += bytes.len() as u64;
        match bytes.split_last() {
            Some((&b'\n', rest)) => {
                self.line += 1;
                self.prev_column = self.column + rest.len() as u64;
                self.column = 0;
            }
            _ => self.column += bytes.len() as u64,
        }
    }

    fn next_from_inner(&mut self) -> io::Result<Option<u8>> {
        loop {
            if self.is_cancelled() {
                return Ok(None);
            }
            let buf = match self.inner.fill_buf() {
                Ok(buf) => buf,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            let Some(&byte) = buf.first() else {
                return Ok(None);
            };
            self.inner.consume(1);
            return Ok(Some(byte));
        }
    }
}
