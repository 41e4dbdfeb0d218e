//! Visual-line projection: maps logical (newline-delimited) lines onto the
//! possibly-wrapped rows the viewport actually shows.
//!
//! The projection is recomputed in full whenever the buffer's version counter
//! changes or the viewport width changes — never patched incrementally. That
//! is a deliberate simplicity/throughput tradeoff for interactive document
//! sizes.
//!
//! Columns are counted in characters. Tab expansion to the next tab stop
//! affects only how much viewport width a character consumes when deciding
//! where to wrap.

use crate::gap_buffer::GapBuffer;

/// Line wrapping mode for a viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapMode {
    /// Visual lines equal logical lines 1:1.
    None,
    /// A logical line splits into a new visual line whenever accumulated
    /// visual width (with tab expansion) would exceed the viewport width.
    Char,
}

/// One rendered row of text: a sub-segment of a logical line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisualLine {
    /// Index of the logical line this row belongs to.
    pub line: usize,
    /// Byte offset of the logical line's first byte.
    pub line_offset: usize,
    /// Byte column within the logical line where this row starts.
    pub start_col: usize,
    /// Byte offset of the row's first byte.
    pub offset: usize,
    /// Byte length of the row.
    pub len: usize,
}

impl VisualLine {
    /// Byte offset one past the row's last content byte.
    pub fn end(&self) -> usize {
        self.offset + self.len
    }
}

/// Cached projection of a buffer into visual rows for one viewport.
#[derive(Debug)]
pub struct VisualLineMap {
    rows: Vec<VisualLine>,
    wrap: WrapMode,
    viewport_cols: usize,
    tab_width: usize,
    /// Buffer version at the last recompute; None before the first one.
    buffer_version: Option<u64>,
    dirty: bool,
}

impl VisualLineMap {
    /// Creates an empty map. Call [`refresh`](Self::refresh) before reading.
    pub fn new(wrap: WrapMode, viewport_cols: usize, tab_width: usize) -> Self {
        Self {
            rows: Vec::new(),
            wrap,
            viewport_cols: viewport_cols.max(1),
            tab_width: tab_width.max(1),
            buffer_version: None,
            dirty: true,
        }
    }

    /// Updates the viewport width in character cells, marking the map dirty
    /// if it changed.
    pub fn set_viewport_cols(&mut self, cols: usize) {
        let cols = cols.max(1);
        if cols != self.viewport_cols {
            self.viewport_cols = cols;
            self.dirty = true;
        }
    }

    /// Changes the wrap mode, marking the map dirty if it changed.
    pub fn set_wrap(&mut self, wrap: WrapMode) {
        if wrap != self.wrap {
            self.wrap = wrap;
            self.dirty = true;
        }
    }

    /// Returns the configured viewport width in character cells.
    pub fn viewport_cols(&self) -> usize {
        self.viewport_cols
    }

    /// Recomputes the projection if the buffer changed since the last
    /// refresh or the viewport was resized. Cheap when clean.
    pub fn refresh(&mut self, buf: &GapBuffer) {
        if !self.dirty && self.buffer_version == Some(buf.version()) {
            return;
        }

        self.rows.clear();
        for line in buf.lines() {
            match self.wrap {
                WrapMode::None => self.rows.push(VisualLine {
                    line: line.row,
                    line_offset: line.offset,
                    start_col: 0,
                    offset: line.offset,
                    len: line.len,
                }),
                WrapMode::Char => self.wrap_line(buf, line.row, line.offset, line.len),
            }
        }

        self.buffer_version = Some(buf.version());
        self.dirty = false;
    }

    /// Splits one logical line into rows under `WrapMode::Char`.
    fn wrap_line(&mut self, buf: &GapBuffer, row: usize, line_offset: usize, line_len: usize) {
        let line_end = line_offset + line_len;
        let mut row_start = line_offset;
        let mut cursor = line_offset;
        let mut width = 0usize;

        while cursor < line_end {
            let ch_width = if buf.byte_at(cursor) == Some(b'\t') {
                self.tab_width - (width % self.tab_width)
            } else {
                1
            };
            let next = buf.next_char_offset(cursor).min(line_end);

            if width + ch_width > self.viewport_cols && cursor > row_start {
                self.push_row(row, line_offset, row_start, cursor);
                row_start = cursor;
                width = 0;
                continue;
            }

            width += ch_width;
            cursor = next;
        }

        // Final (possibly empty) row of the line.
        self.push_row(row, line_offset, row_start, line_end);
    }

    fn push_row(&mut self, line: usize, line_offset: usize, start: usize, end: usize) {
        self.rows.push(VisualLine {
            line,
            line_offset,
            start_col: start - line_offset,
            offset: start,
            len: end - start,
        });
    }

    /// Returns the number of visual rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns the row at the given index.
    pub fn row(&self, idx: usize) -> Option<&VisualLine> {
        self.rows.get(idx)
    }

    /// Returns all rows.
    pub fn rows(&self) -> &[VisualLine] {
        &self.rows
    }

    /// Returns the index of the row containing the given byte offset.
    ///
    /// An offset at a wrapped-row boundary belongs to the row starting
    /// there; the end of the buffer belongs to the final row.
    pub fn row_of_offset(&self, offset: usize) -> usize {
        if self.rows.is_empty() {
            return 0;
        }
        let idx = self.rows.partition_point(|r| r.offset <= offset);
        idx.saturating_sub(1)
    }

    /// Returns the character count of the given row.
    pub fn row_char_len(&self, buf: &GapBuffer, idx: usize) -> usize {
        let Some(row) = self.rows.get(idx) else {
            return 0;
        };
        let mut count = 0;
        let mut cursor = row.offset;
        while cursor < row.end() {
            cursor = buf.next_char_offset(cursor).min(row.end());
            count += 1;
        }
        count
    }

    /// Returns the byte offset of the given character column within a row,
    /// clamped to the row's end.
    pub fn offset_at(&self, buf: &GapBuffer, idx: usize, col: usize) -> usize {
        let Some(row) = self.rows.get(idx) else {
            return buf.count();
        };
        let mut cursor = row.offset;
        for _ in 0..col {
            if cursor >= row.end() {
                break;
            }
            cursor = buf.next_char_offset(cursor).min(row.end());
        }
        cursor
    }

    /// Returns the character column of a byte offset within a row.
    pub fn col_of_offset(&self, buf: &GapBuffer, idx: usize, offset: usize) -> usize {
        let Some(row) = self.rows.get(idx) else {
            return 0;
        };
        let target = offset.clamp(row.offset, row.end());
        let mut col = 0;
        let mut cursor = row.offset;
        while cursor < target {
            cursor = buf.next_char_offset(cursor).min(row.end());
            col += 1;
        }
        col
    }
}
