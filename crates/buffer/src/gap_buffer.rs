//! Gap buffer implementation for efficient text editing.
//!
//! A gap buffer is a byte array with a movable gap at the active edit point.
//! Insertions and deletions at the gap are O(1); moving the gap is
//! O(gap_distance) but amortizes well for typical editing patterns
//! (locality of edits).
//!
//! The storage is logically split into `[0, gap_idx)` (text before the gap)
//! and `[gap_idx + gap_count, capacity)` (text after the gap). The gap itself
//! holds no valid data. Logical offsets exclude the gap.

use unicode_segmentation::UnicodeSegmentation;

/// Minimum gap size. The gap never shrinks below this floor except via an
/// explicit [`GapBuffer::shrink_gap_to`] hint.
const MIN_GAP: usize = 64;

/// When a delete leaves the gap larger than this multiple of the floor,
/// the gap is shrunk back to the floor and the freed capacity released.
const GAP_SHRINK_FACTOR: usize = 4;

/// Cached per-buffer statistics, recomputed lazily after mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BufferStats {
    /// Number of logical lines. Always at least 1, and a trailing newline
    /// contributes a final empty line.
    pub line_count: usize,
    /// Byte length of the longest line (excluding newlines).
    pub widest_line: usize,
}

/// A gap buffer for efficient text storage and manipulation.
///
/// Out-of-range offsets passed to [`insert`](GapBuffer::insert) and
/// [`delete`](GapBuffer::delete) are clamped into the valid range rather than
/// reported as errors; callers must not rely on bounds violations being
/// detected. The buffer contents are always valid UTF-8 provided callers only
/// edit at character boundaries.
#[derive(Debug)]
pub struct GapBuffer {
    /// Backing storage: [pre-gap bytes | gap | post-gap bytes].
    data: Vec<u8>,
    /// Logical offset where the gap starts.
    gap_idx: usize,
    /// Gap size in bytes.
    gap_count: usize,
    /// Floor for gap growth; see MIN_GAP.
    min_gap: usize,
    /// Incremented on every mutation. Consumers compare against a remembered
    /// version to detect external edits.
    version: u64,
    /// Set on mutation; cleared when `stats` is recomputed.
    stats_outdated: bool,
    stats: BufferStats,
}

impl GapBuffer {
    /// Creates a new empty gap buffer.
    pub fn new() -> Self {
        Self {
            data: vec![0; MIN_GAP],
            gap_idx: 0,
            gap_count: MIN_GAP,
            min_gap: MIN_GAP,
            version: 0,
            stats_outdated: true,
            stats: BufferStats::default(),
        }
    }

    /// Creates a gap buffer initialized with the given text.
    pub fn from_str(text: &str) -> Self {
        Self::from_str_with_gap(text, MIN_GAP)
    }

    /// Creates a gap buffer from initial contents with a pre-sized gap.
    ///
    /// Used when loading a file: a larger gap avoids an immediate grow on
    /// the first burst of edits.
    pub fn from_str_with_gap(text: &str, gap: usize) -> Self {
        let gap = gap.max(MIN_GAP);
        let bytes = text.as_bytes();
        let mut data = vec![0; bytes.len() + gap];
        data[..bytes.len()].copy_from_slice(bytes);

        Self {
            data,
            gap_idx: bytes.len(),
            gap_count: gap,
            min_gap: MIN_GAP,
            version: 0,
            stats_outdated: true,
            stats: BufferStats::default(),
        }
    }

    /// Returns the logical length of the buffer in bytes (excluding the gap).
    pub fn count(&self) -> usize {
        self.data.len() - self.gap_count
    }

    /// Returns true if the buffer holds no text.
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Returns the mutation version counter.
    ///
    /// Bumped on every insert or delete; never on reads.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Returns the byte at the given logical offset.
    pub fn byte_at(&self, idx: usize) -> Option<u8> {
        if idx >= self.count() {
            return None;
        }
        let physical = if idx < self.gap_idx {
            idx
        } else {
            idx + self.gap_count
        };
        Some(self.data[physical])
    }

    /// Moves the gap so it starts at the given logical offset.
    ///
    /// O(distance): one memmove of whichever side of the gap lies between
    /// the current and target positions.
    fn move_gap_to(&mut self, idx: usize) {
        let idx = idx.min(self.count());

        if idx < self.gap_idx {
            // Gap moves left: shift [idx, gap_idx) right to the gap's end.
            let shift = self.gap_idx - idx;
            self.data
                .copy_within(idx..self.gap_idx, self.gap_idx + self.gap_count - shift);
            self.gap_idx = idx;
        } else if idx > self.gap_idx {
            // Gap moves right: shift post-gap bytes left into the gap.
            let shift = idx - self.gap_idx;
            let src = self.gap_idx + self.gap_count;
            self.data.copy_within(src..src + shift, self.gap_idx);
            self.gap_idx = idx;
        }
    }

    /// Ensures the gap can absorb at least `needed` bytes.
    ///
    /// Grows by reallocating and shifting the post-gap region forward, so
    /// the gap position is preserved. The new gap is sized `needed + min_gap`
    /// so the very next insert does not immediately re-grow.
    fn ensure_gap(&mut self, needed: usize) {
        if self.gap_count >= needed {
            return;
        }

        let growth = needed + self.min_gap - self.gap_count;
        let old_len = self.data.len();
        let post_start = self.gap_idx + self.gap_count;
        let post_len = old_len - post_start;

        self.data.resize(old_len + growth, 0);
        if post_len > 0 {
            let new_post_start = self.data.len() - post_len;
            self.data.copy_within(post_start..old_len, new_post_start);
        }
        self.gap_count += growth;
    }

    /// Shrinks the gap to exactly `size` bytes, releasing the freed capacity.
    ///
    /// This is the explicit size hint that may take the gap below the
    /// automatic floor. Used after bulk deletes when the caller knows no
    /// large insert is coming.
    pub fn shrink_gap_to(&mut self, size: usize) {
        if self.gap_count <= size {
            return;
        }

        let post_start = self.gap_idx + self.gap_count;
        let post_len = self.data.len() - post_start;
        let new_post_start = self.gap_idx + size;
        self.data
            .copy_within(post_start..post_start + post_len, new_post_start);
        self.data.truncate(new_post_start + post_len);
        self.gap_count = size;
    }

    /// Inserts `text` so its first byte lands at logical offset `idx`.
    ///
    /// `idx` is clamped to the buffer length. Amortized O(1) for edits near
    /// the gap; O(distance) otherwise.
    pub fn insert(&mut self, text: &str, idx: usize) {
        let bytes = text.as_bytes();
        if bytes.is_empty() {
            return;
        }

        let idx = idx.min(self.count());
        self.ensure_gap(bytes.len());
        self.move_gap_to(idx);

        self.data[self.gap_idx..self.gap_idx + bytes.len()].copy_from_slice(bytes);
        self.gap_idx += bytes.len();
        self.gap_count -= bytes.len();

        self.version += 1;
        self.stats_outdated = true;
    }

    /// Removes `count` bytes starting at logical offset `idx`.
    ///
    /// Both values are clamped to the buffer bounds. Deleted bytes become
    /// gap, so no byte copy is needed beyond positioning the gap. If the
    /// gap has grown past `GAP_SHRINK_FACTOR ×` the floor it is shrunk back,
    /// bounding memory after large deletes.
    pub fn delete(&mut self, count: usize, idx: usize) {
        let idx = idx.min(self.count());
        let count = count.min(self.count() - idx);
        if count == 0 {
            return;
        }

        self.move_gap_to(idx);
        self.gap_count += count;

        if self.gap_count > GAP_SHRINK_FACTOR * self.min_gap {
            self.shrink_gap_to(self.min_gap);
        }

        self.version += 1;
        self.stats_outdated = true;
    }

    /// Materializes a contiguous view of the whole buffer.
    ///
    /// Moves the gap to the end first (O(gap distance)), then returns the
    /// contiguous prefix. Subsequent calls without intervening edits are
    /// free.
    pub fn get_str(&mut self) -> &str {
        self.move_gap_to(self.count());
        std::str::from_utf8(&self.data[..self.gap_idx])
            .expect("gap buffer holds invalid UTF-8; edits must land on char boundaries")
    }

    /// Returns the content of a logical byte range as a String.
    pub fn slice(&self, start: usize, end: usize) -> String {
        let start = start.min(self.count());
        let end = end.min(self.count());
        if start >= end {
            return String::new();
        }

        let mut bytes = Vec::with_capacity(end - start);
        for i in start..end {
            if let Some(b) = self.byte_at(i) {
                bytes.push(b);
            }
        }
        String::from_utf8(bytes)
            .expect("gap buffer holds invalid UTF-8; edits must land on char boundaries")
    }

    /// Returns an iterator over the logical bytes of the buffer.
    pub fn bytes(&self) -> impl Iterator<Item = u8> + '_ {
        self.data[..self.gap_idx]
            .iter()
            .chain(self.data[self.gap_idx + self.gap_count..].iter())
            .copied()
    }

    /// Returns buffer statistics, recomputing them if a mutation occurred
    /// since the last read.
    pub fn stats(&mut self) -> BufferStats {
        if self.stats_outdated {
            let mut line_count = 1;
            let mut widest = 0;
            let mut current = 0;
            for b in self.bytes() {
                if b == b'\n' {
                    widest = widest.max(current);
                    current = 0;
                    line_count += 1;
                } else {
                    current += 1;
                }
            }
            self.stats = BufferStats {
                line_count,
                widest_line: widest.max(current),
            };
            self.stats_outdated = false;
        }
        self.stats
    }

    // ==================== Character boundaries ====================

    /// Returns true if `idx` falls on a UTF-8 character boundary.
    pub fn is_char_boundary(&self, idx: usize) -> bool {
        if idx == 0 || idx >= self.count() {
            return true;
        }
        // Continuation bytes are 0b10xx_xxxx.
        self.byte_at(idx).map_or(true, |b| (b as i8) >= -0x40)
    }

    /// Returns the offset of the character boundary after `idx`.
    pub fn next_char_offset(&self, idx: usize) -> usize {
        let mut idx = (idx + 1).min(self.count());
        while !self.is_char_boundary(idx) {
            idx += 1;
        }
        idx
    }

    /// Returns the offset of the character boundary before `idx`.
    pub fn prev_char_offset(&self, idx: usize) -> usize {
        if idx == 0 {
            return 0;
        }
        let mut idx = idx - 1;
        while !self.is_char_boundary(idx) {
            idx -= 1;
        }
        idx
    }

    // ==================== Word boundaries ====================

    /// Returns the offset of the next word boundary strictly after `idx`.
    ///
    /// Whitespace-only segments are skipped, so repeated calls step from
    /// word end to word end the way editors expect.
    pub fn next_word_boundary(&mut self, idx: usize) -> usize {
        let len = self.count();
        let idx = idx.min(len);
        let text = self.get_str();
        for (start, word) in text.split_word_bound_indices() {
            let end = start + word.len();
            if end > idx && !word.trim().is_empty() {
                return end;
            }
        }
        len
    }

    /// Returns the offset of the previous word boundary strictly before `idx`.
    pub fn prev_word_boundary(&mut self, idx: usize) -> usize {
        let idx = idx.min(self.count());
        let text = self.get_str();
        let mut best = 0;
        for (start, word) in text.split_word_bound_indices() {
            if start >= idx {
                break;
            }
            if !word.trim().is_empty() {
                best = start;
            }
        }
        best
    }

    #[cfg(test)]
    fn check_invariants(&self) {
        assert!(self.gap_idx + self.gap_count <= self.data.len());
    }
}

impl Default for GapBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_empty() {
        let buf = GapBuffer::new();
        assert!(buf.is_empty());
        assert_eq!(buf.count(), 0);
    }

    #[test]
    fn test_from_str() {
        let mut buf = GapBuffer::from_str("hello");
        assert_eq!(buf.count(), 5);
        assert_eq!(buf.get_str(), "hello");
    }

    #[test]
    fn test_insert_at_offset() {
        // New buffer from "abc"; insert "X" at offset 1.
        let mut buf = GapBuffer::from_str("abc");
        buf.insert("X", 1);
        assert_eq!(buf.get_str(), "aXbc");
        assert_eq!(buf.count(), 4);
    }

    #[test]
    fn test_insert_clamps_out_of_range() {
        let mut buf = GapBuffer::from_str("abc");
        buf.insert("X", 100);
        assert_eq!(buf.get_str(), "abcX");
    }

    #[test]
    fn test_delete_middle() {
        let mut buf = GapBuffer::from_str("hello world");
        buf.delete(6, 5);
        assert_eq!(buf.get_str(), "hello");
    }

    #[test]
    fn test_delete_clamps_out_of_range() {
        let mut buf = GapBuffer::from_str("abc");
        buf.delete(100, 1);
        assert_eq!(buf.get_str(), "a");

        buf.delete(1, 100);
        assert_eq!(buf.get_str(), "a");
    }

    #[test]
    fn test_get_str_idempotent() {
        let mut buf = GapBuffer::from_str("abc\ndef");
        buf.insert("x", 2);
        let first = buf.get_str().to_string();
        let count = buf.count();
        assert_eq!(buf.get_str(), first);
        assert_eq!(buf.count(), count);
    }

    #[test]
    fn test_version_bumps_on_mutation_only() {
        let mut buf = GapBuffer::from_str("abc");
        let v0 = buf.version();
        let _ = buf.get_str();
        let _ = buf.stats();
        assert_eq!(buf.version(), v0);

        buf.insert("x", 0);
        assert!(buf.version() > v0);
        let v1 = buf.version();
        buf.delete(1, 0);
        assert!(buf.version() > v1);
    }

    #[test]
    fn test_stats_lazy_recompute() {
        let mut buf = GapBuffer::from_str("hello\nhi");
        let stats = buf.stats();
        assert_eq!(stats.line_count, 2);
        assert_eq!(stats.widest_line, 5);

        buf.insert("!!!!", 8);
        let stats = buf.stats();
        assert_eq!(stats.line_count, 2);
        assert_eq!(stats.widest_line, 6); // "hi!!!!"
    }

    #[test]
    fn test_stats_trailing_newline_counts_empty_line() {
        let mut buf = GapBuffer::from_str("a\n");
        assert_eq!(buf.stats().line_count, 2);
    }

    #[test]
    fn test_gap_shrinks_after_large_delete() {
        let text = "x".repeat(10_000);
        let mut buf = GapBuffer::from_str(&text);
        buf.delete(9_000, 500);
        // Deleted bytes became gap and were released past the shrink bound.
        assert!(buf.data.len() < 10_000);
        assert_eq!(buf.count(), 1_000);
        buf.check_invariants();
    }

    #[test]
    fn test_random_edit_sequence_matches_reference_model() {
        // Reference model: a plain String with indices clamped identically.
        let mut buf = GapBuffer::from_str("the quick brown fox");
        let mut model = String::from("the quick brown fox");

        let edits: &[(bool, &str, usize, usize)] = &[
            (true, "jumped ", 4, 0),
            (false, "", 0, 3),
            (true, "A", 999, 0), // out of range: clamps to end
            (false, "", 999, 5), // out of range: no-op
            (true, "mid", 10, 0),
            (false, "", 8, 4),
            (true, "!", 0, 0),
        ];

        for &(is_insert, text, idx, del) in edits {
            if is_insert {
                buf.insert(text, idx);
                let at = idx.min(model.len());
                model.insert_str(at, text);
            } else {
                buf.delete(del, idx);
                let at = idx.min(model.len());
                let n = del.min(model.len() - at);
                model.replace_range(at..at + n, "");
            }
            buf.check_invariants();
            assert_eq!(buf.get_str(), model);
        }
    }

    #[test]
    fn test_byte_at_with_gap_in_middle() {
        let mut buf = GapBuffer::from_str("hello");
        buf.insert("XY", 2);
        buf.delete(2, 2);
        for (i, expected) in "hello".bytes().enumerate() {
            assert_eq!(buf.byte_at(i), Some(expected));
        }
        assert_eq!(buf.byte_at(5), None);
    }

    #[test]
    fn test_slice() {
        let buf = GapBuffer::from_str("hello world");
        assert_eq!(buf.slice(0, 5), "hello");
        assert_eq!(buf.slice(6, 11), "world");
        assert_eq!(buf.slice(6, 999), "world");
        assert_eq!(buf.slice(4, 2), "");
    }

    #[test]
    fn test_char_boundaries_multibyte() {
        let buf = GapBuffer::from_str("aé b"); // 'é' is two bytes
        assert!(buf.is_char_boundary(0));
        assert!(buf.is_char_boundary(1));
        assert!(!buf.is_char_boundary(2)); // inside 'é'
        assert_eq!(buf.next_char_offset(1), 3);
        assert_eq!(buf.prev_char_offset(3), 1);
    }

    #[test]
    fn test_word_boundaries() {
        let mut buf = GapBuffer::from_str("one two  three");
        assert_eq!(buf.next_word_boundary(0), 3);
        assert_eq!(buf.next_word_boundary(3), 7);
        assert_eq!(buf.next_word_boundary(7), 14);
        assert_eq!(buf.next_word_boundary(14), 14);

        assert_eq!(buf.prev_word_boundary(14), 9);
        assert_eq!(buf.prev_word_boundary(9), 4);
        assert_eq!(buf.prev_word_boundary(4), 0);
        assert_eq!(buf.prev_word_boundary(0), 0);
    }

    #[test]
    fn test_from_str_with_gap() {
        let mut buf = GapBuffer::from_str_with_gap("abc", 4096);
        assert_eq!(buf.gap_count, 4096);
        assert_eq!(buf.get_str(), "abc");
    }

    #[test]
    fn test_shrink_gap_to_hint() {
        let mut buf = GapBuffer::from_str_with_gap("abc", 4096);
        buf.shrink_gap_to(16);
        assert_eq!(buf.gap_count, 16);
        assert_eq!(buf.get_str(), "abc");
        buf.check_invariants();
    }

    #[test]
    fn test_insert_larger_than_gap_grows() {
        let mut buf = GapBuffer::from_str("ab");
        let big = "y".repeat(MIN_GAP * 3);
        buf.insert(&big, 1);
        assert_eq!(buf.count(), 2 + big.len());
        assert_eq!(buf.get_str(), format!("a{big}b"));
        buf.check_invariants();
    }
}
