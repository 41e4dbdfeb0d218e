//! Caret: cursor position, selection, and motion commands.
//!
//! The caret's `byte_offset` and `selection_offset` are authoritative; `line`
//! and `column` are a cached projection onto visual rows, recomputed through
//! the [`VisualLineMap`]. `preferred_column` persists the desired column
//! across vertical moves even through lines shorter than it — it is restored,
//! not recalculated, once a long-enough line is reached.
//!
//! Selection is an (offset, anchor) pair with no ordering constraint;
//! operations needing an ordered span sort the pair explicitly.

use crate::gap_buffer::GapBuffer;
use crate::visual_line::VisualLineMap;

/// Cursor state for one editable buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Caret {
    /// Byte offset of the caret.
    pub byte_offset: usize,
    /// Byte offset of the selection anchor. Equal to `byte_offset` when no
    /// selection is active. May be before or after `byte_offset`.
    pub selection_offset: usize,
    /// Cached visual row index of the caret.
    pub line: usize,
    /// Cached character column within the visual row.
    pub column: usize,
    /// Sticky target column for vertical motion.
    pub preferred_column: usize,
}

impl Caret {
    /// Creates a caret at the start of the buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if a non-empty selection is active.
    pub fn has_selection(&self) -> bool {
        self.byte_offset != self.selection_offset
    }

    /// Returns the selection as an ordered (start, end) byte span.
    pub fn selection_span(&self) -> (usize, usize) {
        if self.byte_offset <= self.selection_offset {
            (self.byte_offset, self.selection_offset)
        } else {
            (self.selection_offset, self.byte_offset)
        }
    }

    /// Returns the selected text, or None if the selection is empty.
    pub fn selected_text(&self, buf: &GapBuffer) -> Option<String> {
        if !self.has_selection() {
            return None;
        }
        let (start, end) = self.selection_span();
        Some(buf.slice(start, end))
    }

    /// Recomputes the cached (line, column) projection from `byte_offset`.
    fn reproject(&mut self, buf: &GapBuffer, map: &mut VisualLineMap) {
        map.refresh(buf);
        self.byte_offset = self.byte_offset.min(buf.count());
        self.selection_offset = self.selection_offset.min(buf.count());
        self.line = map.row_of_offset(self.byte_offset);
        self.column = map.col_of_offset(buf, self.line, self.byte_offset);
    }

    /// Places the caret at a byte offset. When `select` is false the
    /// selection collapses to the new position.
    pub fn set_offset(
        &mut self,
        buf: &GapBuffer,
        map: &mut VisualLineMap,
        offset: usize,
        select: bool,
    ) {
        self.byte_offset = offset.min(buf.count());
        if !select {
            self.selection_offset = self.byte_offset;
        }
        self.reproject(buf, map);
        self.preferred_column = self.column;
    }

    /// Places the caret at a (visual row, character column) position,
    /// clamping the column to the row's length.
    pub fn set_line_col(
        &mut self,
        buf: &GapBuffer,
        map: &mut VisualLineMap,
        row: usize,
        col: usize,
        select: bool,
    ) {
        map.refresh(buf);
        let row = row.min(map.row_count().saturating_sub(1));
        let offset = map.offset_at(buf, row, col);
        self.set_offset(buf, map, offset, select);
    }

    // ==================== Horizontal motion ====================

    /// Moves one character left, crossing to the previous visual line at
    /// boundaries. With an active selection and `select == false`, collapses
    /// to the selection's start instead of moving.
    pub fn move_left(&mut self, buf: &GapBuffer, map: &mut VisualLineMap, select: bool) {
        if !select && self.has_selection() {
            let (start, _) = self.selection_span();
            self.set_offset(buf, map, start, false);
            return;
        }
        let target = buf.prev_char_offset(self.byte_offset);
        self.apply_horizontal(buf, map, target, select);
    }

    /// Moves one character right, crossing to the next visual line at
    /// boundaries. With an active selection and `select == false`, collapses
    /// to the selection's end instead of moving.
    pub fn move_right(&mut self, buf: &GapBuffer, map: &mut VisualLineMap, select: bool) {
        if !select && self.has_selection() {
            let (_, end) = self.selection_span();
            self.set_offset(buf, map, end, false);
            return;
        }
        let target = buf.next_char_offset(self.byte_offset);
        self.apply_horizontal(buf, map, target, select);
    }

    /// Moves to the previous word boundary.
    pub fn move_word_left(&mut self, buf: &mut GapBuffer, map: &mut VisualLineMap, select: bool) {
        let target = buf.prev_word_boundary(self.byte_offset);
        self.apply_horizontal(buf, map, target, select);
    }

    /// Moves to the next word boundary.
    pub fn move_word_right(&mut self, buf: &mut GapBuffer, map: &mut VisualLineMap, select: bool) {
        let target = buf.next_word_boundary(self.byte_offset);
        self.apply_horizontal(buf, map, target, select);
    }

    /// Moves to the start of the current visual row.
    pub fn move_home(&mut self, buf: &GapBuffer, map: &mut VisualLineMap, select: bool) {
        map.refresh(buf);
        let row = map.row_of_offset(self.byte_offset);
        let target = map.row(row).map_or(0, |r| r.offset);
        self.apply_horizontal(buf, map, target, select);
    }

    /// Moves past the last character of the current visual row.
    pub fn move_end(&mut self, buf: &GapBuffer, map: &mut VisualLineMap, select: bool) {
        map.refresh(buf);
        let row = map.row_of_offset(self.byte_offset);
        let target = map.row(row).map_or(buf.count(), |r| r.end());
        self.apply_horizontal(buf, map, target, select);
    }

    fn apply_horizontal(
        &mut self,
        buf: &GapBuffer,
        map: &mut VisualLineMap,
        target: usize,
        select: bool,
    ) {
        self.byte_offset = target;
        if !select {
            self.selection_offset = target;
        }
        self.reproject(buf, map);
        self.preferred_column = self.column;
    }

    // ==================== Vertical motion ====================

    /// Moves up one visual row, clamping the displayed column to the target
    /// row's length while retaining `preferred_column`.
    pub fn move_up(&mut self, buf: &GapBuffer, map: &mut VisualLineMap, select: bool) {
        self.move_vertical(buf, map, -1, select);
    }

    /// Moves down one visual row; sticky-column counterpart of `move_up`.
    pub fn move_down(&mut self, buf: &GapBuffer, map: &mut VisualLineMap, select: bool) {
        self.move_vertical(buf, map, 1, select);
    }

    fn move_vertical(
        &mut self,
        buf: &GapBuffer,
        map: &mut VisualLineMap,
        delta: isize,
        select: bool,
    ) {
        if !select && self.has_selection() {
            self.selection_offset = self.byte_offset;
        }
        self.reproject(buf, map);

        let last = map.row_count().saturating_sub(1);
        let target_row = if delta < 0 {
            self.line.saturating_sub(delta.unsigned_abs())
        } else {
            (self.line + delta as usize).min(last)
        };

        // Clamp the displayed column, but leave preferred_column untouched so
        // a later move through a longer line restores it.
        let col = self.preferred_column.min(map.row_char_len(buf, target_row));
        self.byte_offset = map.offset_at(buf, target_row, col);
        if !select {
            self.selection_offset = self.byte_offset;
        }
        self.line = target_row;
        self.column = col;
    }

    // ==================== Editing ====================

    /// Inserts text at the caret. A non-empty selection is deleted first
    /// (replace-selection-on-type), then both offsets advance past the
    /// inserted text.
    pub fn insert(&mut self, buf: &mut GapBuffer, map: &mut VisualLineMap, text: &str) {
        if self.has_selection() {
            self.delete(buf, map);
        }
        buf.insert(text, self.byte_offset);
        self.byte_offset += text.len();
        self.selection_offset = self.byte_offset;
        self.reproject(buf, map);
        self.preferred_column = self.column;
    }

    /// Deletes the selection, or the character before the caret when the
    /// selection is empty.
    pub fn delete_backward(&mut self, buf: &mut GapBuffer, map: &mut VisualLineMap) {
        if self.has_selection() {
            self.delete(buf, map);
            return;
        }
        let prev = buf.prev_char_offset(self.byte_offset);
        if prev == self.byte_offset {
            return;
        }
        buf.delete(self.byte_offset - prev, prev);
        self.byte_offset = prev;
        self.selection_offset = prev;
        self.reproject(buf, map);
        self.preferred_column = self.column;
    }

    /// Deletes the selection, or the character after the caret when the
    /// selection is empty.
    pub fn delete_forward(&mut self, buf: &mut GapBuffer, map: &mut VisualLineMap) {
        if self.has_selection() {
            self.delete(buf, map);
            return;
        }
        let next = buf.next_char_offset(self.byte_offset);
        if next == self.byte_offset {
            return;
        }
        buf.delete(next - self.byte_offset, self.byte_offset);
        self.reproject(buf, map);
        self.preferred_column = self.column;
    }

    /// Deletes the current selection span (normalized to document order) and
    /// collapses the caret to the deletion point. No-op without a selection.
    pub fn delete(&mut self, buf: &mut GapBuffer, map: &mut VisualLineMap) {
        if !self.has_selection() {
            return;
        }
        let (start, end) = self.selection_span();
        buf.delete(end - start, start);
        self.byte_offset = start;
        self.selection_offset = start;
        self.reproject(buf, map);
        self.preferred_column = self.column;
    }

    /// Selects the whole buffer, caret at the end.
    pub fn select_all(&mut self, buf: &GapBuffer, map: &mut VisualLineMap) {
        self.selection_offset = 0;
        self.byte_offset = buf.count();
        self.reproject(buf, map);
        self.preferred_column = self.column;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visual_line::WrapMode;

    fn fixture(text: &str) -> (GapBuffer, VisualLineMap, Caret) {
        let buf = GapBuffer::from_str(text);
        let mut map = VisualLineMap::new(WrapMode::None, 80, 4);
        map.refresh(&buf);
        (buf, map, Caret::new())
    }

    #[test]
    fn test_move_right_crosses_line_boundary() {
        let (buf, mut map, mut caret) = fixture("ab\ncd");
        caret.set_offset(&buf, &mut map, 2, false); // end of "ab"
        caret.move_right(&buf, &mut map, false); // onto the newline -> next line
        assert_eq!(caret.byte_offset, 3);
        assert_eq!((caret.line, caret.column), (1, 0));
    }

    #[test]
    fn test_move_left_crosses_line_boundary() {
        let (buf, mut map, mut caret) = fixture("ab\ncd");
        caret.set_offset(&buf, &mut map, 3, false); // start of "cd"
        caret.move_left(&buf, &mut map, false);
        assert_eq!(caret.byte_offset, 2);
        assert_eq!((caret.line, caret.column), (0, 2));
    }

    #[test]
    fn test_sticky_column_through_short_line() {
        // Down from column 20 onto a 5-char line, then down again onto a
        // long line restores column 20.
        let long_a = "a".repeat(30);
        let long_b = "b".repeat(30);
        let text = format!("{long_a}\nshort\n{long_b}");
        let (buf, mut map, mut caret) = fixture(&text);

        caret.set_offset(&buf, &mut map, 20, false);
        assert_eq!(caret.column, 20);

        caret.move_down(&buf, &mut map, false);
        assert_eq!(caret.line, 1);
        assert_eq!(caret.column, 5); // clamped for display
        assert_eq!(caret.preferred_column, 20); // retained

        caret.move_down(&buf, &mut map, false);
        assert_eq!(caret.line, 2);
        assert_eq!(caret.column, 20); // restored
    }

    #[test]
    fn test_move_up_at_first_line_clamps() {
        let (buf, mut map, mut caret) = fixture("abc");
        caret.set_offset(&buf, &mut map, 2, false);
        caret.move_up(&buf, &mut map, false);
        assert_eq!(caret.line, 0);
        assert_eq!(caret.column, 2);
    }

    #[test]
    fn test_insert_replaces_selection() {
        let (mut buf, mut map, mut caret) = fixture("hello world");
        caret.set_offset(&buf, &mut map, 0, false);
        caret.set_offset(&buf, &mut map, 5, true); // select "hello"
        caret.insert(&mut buf, &mut map, "bye");
        assert_eq!(buf.get_str(), "bye world");
        assert_eq!(caret.byte_offset, 3);
        assert!(!caret.has_selection());
    }

    #[test]
    fn test_selection_normalization() {
        let (mut buf, mut map, mut caret) = fixture("hello world");

        // Forward selection: anchor 0, caret 5.
        caret.set_offset(&buf, &mut map, 0, false);
        caret.set_offset(&buf, &mut map, 5, true);
        let forward = caret.selected_text(&buf);

        // Backward selection: anchor 5, caret 0.
        caret.set_offset(&mut buf, &mut map, 5, false);
        caret.set_offset(&mut buf, &mut map, 0, true);
        let backward = caret.selected_text(&buf);

        assert_eq!(forward.as_deref(), Some("hello"));
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_delete_normalizes_span() {
        let (mut buf, mut map, mut caret) = fixture("hello world");
        // Backward selection of " world".
        caret.set_offset(&buf, &mut map, 11, false);
        caret.set_offset(&buf, &mut map, 5, true);
        caret.delete(&mut buf, &mut map);
        assert_eq!(buf.get_str(), "hello");
        assert_eq!(caret.byte_offset, 5);
    }

    #[test]
    fn test_delete_backward_joins_lines() {
        let (mut buf, mut map, mut caret) = fixture("ab\ncd");
        caret.set_offset(&buf, &mut map, 3, false);
        caret.delete_backward(&mut buf, &mut map);
        assert_eq!(buf.get_str(), "abcd");
        assert_eq!((caret.line, caret.column), (0, 2));
    }

    #[test]
    fn test_delete_forward_at_end_is_noop() {
        let (mut buf, mut map, mut caret) = fixture("ab");
        caret.set_offset(&buf, &mut map, 2, false);
        caret.delete_forward(&mut buf, &mut map);
        assert_eq!(buf.get_str(), "ab");
    }

    #[test]
    fn test_return_at_end_of_buffer_without_trailing_newline() {
        // A single newline insert suffices: the visual projection emits the
        // final empty row itself, so no compensation is needed.
        let (mut buf, mut map, mut caret) = fixture("abc");
        caret.set_offset(&buf, &mut map, 3, false);
        caret.insert(&mut buf, &mut map, "\n");
        assert_eq!(buf.get_str(), "abc\n");
        map.refresh(&buf);
        assert_eq!(map.row_count(), 2);
        assert_eq!((caret.line, caret.column), (1, 0));
    }

    #[test]
    fn test_word_motion() {
        let (mut buf, mut map, mut caret) = fixture("one two three");
        caret.move_word_right(&mut buf, &mut map, false);
        assert_eq!(caret.byte_offset, 3);
        caret.move_word_right(&mut buf, &mut map, false);
        assert_eq!(caret.byte_offset, 7);
        caret.move_word_left(&mut buf, &mut map, false);
        assert_eq!(caret.byte_offset, 4);
    }

    #[test]
    fn test_select_all() {
        let (mut buf, mut map, mut caret) = fixture("abc\ndef");
        caret.select_all(&buf, &mut map);
        assert_eq!(caret.selected_text(&mut buf).as_deref(), Some("abc\ndef"));
        assert_eq!(caret.byte_offset, 7);
    }

    #[test]
    fn test_home_end_on_wrapped_row() {
        let buf = GapBuffer::from_str("abcdefghij");
        let mut map = VisualLineMap::new(WrapMode::Char, 4, 4);
        map.refresh(&buf);
        let mut caret = Caret::new();

        caret.set_offset(&buf, &mut map, 5, false); // second row "efgh"
        caret.move_home(&buf, &mut map, false);
        assert_eq!(caret.byte_offset, 4);
        caret.move_end(&buf, &mut map, false);
        assert_eq!(caret.byte_offset, 8);
    }
}
