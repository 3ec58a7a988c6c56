//! Character sources feeding the tokenizer.
//!
//! A source is a cursor over a document with one character of lookahead
//! and mark/reset. Two implementations are provided:
//!
//! - [`StrSource`] - an in-memory `&str`, zero-copy
//! - [`ReadSource`] - any `Read + Seek` (typically a `File`), decoded as
//!   UTF-8 on the fly
//!
//! Offsets are always byte offsets into the document.

use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom};

use crate::span::Location;

/// Saved cursor position, restored with [`CharSource::reset`].
///
/// A mark is only meaningful for the source that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Mark {
    offset: usize,
}

impl Mark {
    #[inline]
    pub fn offset(self) -> usize {
        self.offset
    }
}

/// Pull-style character cursor.
pub trait CharSource {
    /// Look at the next character without consuming it.
    fn peek_char(&mut self) -> io::Result<Option<char>>;

    /// Consume and return the next character.
    fn next_char(&mut self) -> io::Result<Option<char>>;

    /// Remember the current position.
    fn mark(&self) -> Mark;

    /// Rewind (or fast-forward) to a previously taken mark.
    fn reset(&mut self, mark: Mark) -> io::Result<()>;

    /// Byte offset of the next character.
    fn offset(&self) -> usize;

    /// Translate a byte offset into a line/column location.
    fn locate(&mut self, offset: usize) -> Location;
}

impl<S: CharSource + ?Sized> CharSource for &mut S {
    fn peek_char(&mut self) -> io::Result<Option<char>> {
        (**self).peek_char()
    }

    fn next_char(&mut self) -> io::Result<Option<char>> {
        (**self).next_char()
    }

    fn mark(&self) -> Mark {
        (**self).mark()
    }

    fn reset(&mut self, mark: Mark) -> io::Result<()> {
        (**self).reset(mark)
    }

    fn offset(&self) -> usize {
        (**self).offset()
    }

    fn locate(&mut self, offset: usize) -> Location {
        (**self).locate(offset)
    }
}

// ============================================================================
// StrSource
// ============================================================================

/// Source over an in-memory string.
#[derive(Debug, Clone)]
pub struct StrSource<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> StrSource<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// The unconsumed remainder of the input.
    pub fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }
}

impl CharSource for StrSource<'_> {
    #[inline]
    fn peek_char(&mut self) -> io::Result<Option<char>> {
        Ok(self.rest().chars().next())
    }

    #[inline]
    fn next_char(&mut self) -> io::Result<Option<char>> {
        let c = self.rest().chars().next();
        if let Some(c) = c {
            self.pos += c.len_utf8();
        }
        Ok(c)
    }

    #[inline]
    fn mark(&self) -> Mark {
        Mark { offset: self.pos }
    }

    fn reset(&mut self, mark: Mark) -> io::Result<()> {
        if mark.offset > self.input.len() || !self.input.is_char_boundary(mark.offset) {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "mark outside of source"));
        }
        self.pos = mark.offset;
        Ok(())
    }

    #[inline]
    fn offset(&self) -> usize {
        self.pos
    }

    fn locate(&mut self, offset: usize) -> Location {
        locate_in(self.input.as_bytes(), offset)
    }
}

/// Line/column of `offset` within `bytes`.
fn locate_in(bytes: &[u8], offset: usize) -> Location {
    let before = &bytes[..offset.min(bytes.len())];
    let line = memchr::memchr_iter(b'\n', before).count() + 1;
    let line_start = memchr::memrchr(b'\n', before).map_or(0, |i| i + 1);
    Location::new(line, char_count(&before[line_start..]) + 1)
}

/// Count UTF-8 characters by skipping continuation bytes.
fn char_count(bytes: &[u8]) -> usize {
    bytes.iter().filter(|&&b| (b & 0xC0) != 0x80).count()
}

// ============================================================================
// ReadSource
// ============================================================================

/// Source over a seekable byte stream, decoded as UTF-8.
///
/// The source owns the reader; it is closed when the source is dropped.
/// Invalid UTF-8 is reported as an `InvalidData` I/O error.
#[derive(Debug)]
pub struct ReadSource<R> {
    reader: BufReader<R>,
    /// Offset of the next character to hand out.
    pos: usize,
    /// Decoded lookahead and its encoded length.
    peeked: Option<(char, usize)>,
    /// Offsets of every newline consumed so far, ascending.
    newlines: Vec<usize>,
    /// Bytes already scanned for newlines.
    scanned: usize,
}

impl<R: Read + Seek> ReadSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            pos: 0,
            peeked: None,
            newlines: Vec::new(),
            scanned: 0,
        }
    }

    /// Give the reader back.
    pub fn into_inner(self) -> R {
        self.reader.into_inner()
    }

    /// Decode one character from the reader.
    fn decode(&mut self) -> io::Result<Option<(char, usize)>> {
        let lead = match self.reader.fill_buf()?.first() {
            Some(&b) => b,
            None => return Ok(None),
        };
        self.reader.consume(1);

        let width = match lead {
            0x00..=0x7F => return Ok(Some((lead as char, 1))),
            0xC2..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF4 => 4,
            _ => return Err(invalid_utf8(self.pos)),
        };

        let mut buf = [lead, 0, 0, 0];
        self.reader.read_exact(&mut buf[1..width]).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => invalid_utf8(self.pos),
            _ => e,
        })?;

        match std::str::from_utf8(&buf[..width]).ok().and_then(|s| s.chars().next()) {
            Some(c) => Ok(Some((c, width))),
            None => Err(invalid_utf8(self.pos)),
        }
    }

    /// Byte position of the underlying reader.
    fn reader_pos(&self) -> usize {
        self.pos + self.peeked.map_or(0, |(_, len)| len)
    }

    /// Count characters in `start..end` by re-reading them, then restore
    /// the reader.
    fn count_chars_between(&mut self, start: usize, end: usize) -> io::Result<usize> {
        let restore = self.reader_pos();
        self.reader.seek(SeekFrom::Start(start as u64))?;
        let mut bytes = vec![0; end - start];
        let read = self.reader.read_exact(&mut bytes);
        self.reader.seek(SeekFrom::Start(restore as u64))?;
        read?;
        Ok(char_count(&bytes))
    }
}

fn invalid_utf8(offset: usize) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, format!("invalid UTF-8 at offset {}", offset))
}

impl<R: Read + Seek> CharSource for ReadSource<R> {
    fn peek_char(&mut self) -> io::Result<Option<char>> {
        if self.peeked.is_none() {
            self.peeked = self.decode()?;
        }
        Ok(self.peeked.map(|(c, _)| c))
    }

    fn next_char(&mut self) -> io::Result<Option<char>> {
        let next = match self.peeked.take() {
            Some(p) => Some(p),
            None => self.decode()?,
        };
        let Some((c, len)) = next else {
            return Ok(None);
        };

        if self.pos >= self.scanned {
            if c == '\n' {
                self.newlines.push(self.pos);
            }
            self.scanned = self.pos + len;
        }
        self.pos += len;
        Ok(Some(c))
    }

    fn mark(&self) -> Mark {
        Mark { offset: self.pos }
    }

    fn reset(&mut self, mark: Mark) -> io::Result<()> {
        if mark.offset == self.pos {
            return Ok(());
        }
        if mark.offset > self.scanned {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "mark outside of source"));
        }
        self.reader.seek(SeekFrom::Start(mark.offset as u64))?;
        self.pos = mark.offset;
        self.peeked = None;
        Ok(())
    }

    fn offset(&self) -> usize {
        self.pos
    }

    fn locate(&mut self, offset: usize) -> Location {
        let offset = offset.min(self.scanned);
        // Number of newlines strictly before `offset`.
        let line_index = self.newlines.partition_point(|&nl| nl < offset);
        let line_start = match line_index {
            0 => 0,
            n => self.newlines[n - 1] + 1,
        };
        let column = self
            .count_chars_between(line_start, offset)
            .unwrap_or(offset - line_start);
        Location::new(line_index + 1, column + 1)
    }
}
