//! Line-oriented access over a gap buffer.
//!
//! The iterator finds line boundaries by scanning for `\n`, and each `next()`
//! step advances using the byte length of the line it just produced — never a
//! rescan from offset 0. Stepping through a document is therefore O(line
//! length) amortized per line, not O(document size).

use crate::gap_buffer::GapBuffer;

/// One logical line of the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line {
    /// 0-based row index.
    pub row: usize,
    /// Byte offset of the first byte of the line.
    pub offset: usize,
    /// Byte length of the line, excluding the trailing newline.
    pub len: usize,
}

impl Line {
    /// Byte offset one past the last content byte (the newline position for
    /// all lines except the last).
    pub fn end(&self) -> usize {
        self.offset + self.len
    }
}

/// Iterator over the logical lines of a [`GapBuffer`].
///
/// A buffer always yields at least one line; a trailing newline yields a
/// final empty line. This matches the line count reported by
/// [`GapBuffer::stats`].
pub struct LineIter<'a> {
    buf: &'a GapBuffer,
    offset: usize,
    row: usize,
    finished: bool,
}

impl<'a> Iterator for LineIter<'a> {
    type Item = Line;

    fn next(&mut self) -> Option<Line> {
        if self.finished {
            return None;
        }

        let start = self.offset;
        let mut len = 0;
        let mut saw_newline = false;
        let total = self.buf.count();

        while start + len < total {
            if self.buf.byte_at(start + len) == Some(b'\n') {
                saw_newline = true;
                break;
            }
            len += 1;
        }

        let line = Line {
            row: self.row,
            offset: start,
            len,
        };

        if saw_newline {
            self.offset = start + len + 1;
            self.row += 1;
        } else {
            self.finished = true;
        }

        Some(line)
    }
}

impl GapBuffer {
    /// Returns an iterator over all logical lines.
    pub fn lines(&self) -> LineIter<'_> {
        LineIter {
            buf: self,
            offset: 0,
            row: 0,
            finished: false,
        }
    }

    /// Returns an iterator starting at the given 0-based row.
    ///
    /// Rows before `row` are skipped by stepping the iterator, so the cost is
    /// proportional to the byte offset of `row`, paid once at construction.
    pub fn lines_from(&self, row: usize) -> LineIter<'_> {
        let mut it = self.lines();
        for _ in 0..row {
            if it.next().is_none() {
                break;
            }
        }
        it
    }

    /// Returns the byte offset where the given line starts.
    ///
    /// `line_no` is 1-based — the number shown in an editor gutter. Values
    /// past the last line clamp to the final line's offset; 0 is treated
    /// as line 1.
    pub fn line_to_offset(&self, line_no: usize) -> usize {
        let row = line_no.saturating_sub(1);
        let mut offset = 0;
        for line in self.lines() {
            offset = line.offset;
            if line.row == row {
                break;
            }
        }
        offset
    }

    /// Returns the content of the given 0-based row, without its newline.
    ///
    /// Out-of-range rows yield an empty string.
    pub fn get_line(&self, row: usize) -> String {
        match self.lines_from(row).next() {
            Some(line) if line.row == row => self.slice(line.offset, line.end()),
            _ => String::new(),
        }
    }

    /// Maps a byte offset to a 0-based (row, byte column) pair.
    ///
    /// Offsets past the end clamp to the end of the last line.
    pub fn offset_to_line_col(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.count());
        let mut last = Line {
            row: 0,
            offset: 0,
            len: 0,
        };
        for line in self.lines() {
            // The newline byte itself belongs to the line it terminates.
            if offset <= line.end() {
                return (line.row, offset - line.offset);
            }
            last = line;
        }
        (last.row, offset.saturating_sub(last.offset))
    }
}
