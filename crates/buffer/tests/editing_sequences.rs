//! Integration tests for realistic editing sequences.
//!
//! These drive the gap buffer, visual-line map, and caret together the way
//! an editable widget does, verifying they stay in sync through mixed
//! typing, motion, and deletion.

use mosaic_buffer::{Caret, GapBuffer, VisualLineMap, WrapMode};

fn editor(text: &str, cols: usize) -> (GapBuffer, VisualLineMap, Caret) {
    let buf = GapBuffer::from_str(text);
    let mut map = VisualLineMap::new(WrapMode::Char, cols, 4);
    map.refresh(&buf);
    (buf, map, Caret::new())
}

#[test]
fn test_type_word_then_delete_entirely() {
    let (mut buf, mut map, mut caret) = editor("", 80);

    for ch in "hello".chars() {
        caret.insert(&mut buf, &mut map, &ch.to_string());
    }
    assert_eq!(buf.get_str(), "hello");
    assert_eq!((caret.line, caret.column), (0, 5));

    for _ in 0..5 {
        caret.delete_backward(&mut buf, &mut map);
    }
    assert!(buf.is_empty());
    assert_eq!((caret.line, caret.column), (0, 0));
}

#[test]
fn test_type_multiple_lines_and_navigate() {
    let (mut buf, mut map, mut caret) = editor("", 80);

    caret.insert(&mut buf, &mut map, "first line\nsecond\nthird line");
    assert_eq!(buf.stats().line_count, 3);
    assert_eq!((caret.line, caret.column), (2, 10));

    caret.move_up(&mut buf, &mut map, false);
    assert_eq!(caret.line, 1);
    assert_eq!(caret.column, 6); // clamped to "second"

    caret.move_up(&mut buf, &mut map, false);
    assert_eq!(caret.column, 10); // sticky column restored
}

#[test]
fn test_edit_in_wrapped_line_keeps_projection_fresh() {
    let (mut buf, mut map, mut caret) = editor("abcdefgh", 4);
    map.refresh(&buf);
    assert_eq!(map.row_count(), 2);

    // Typing at the end re-wraps on the next refresh.
    caret.set_offset(&buf, &mut map, 8, false);
    caret.insert(&mut buf, &mut map, "XY");
    map.refresh(&buf);
    assert_eq!(map.row_count(), 3);
    assert_eq!((caret.line, caret.column), (2, 2));
}

#[test]
fn test_replace_selection_across_lines() {
    let (mut buf, mut map, mut caret) = editor("aaa\nbbb\nccc", 80);

    // Select from middle of line 0 to middle of line 2, backwards.
    caret.set_offset(&buf, &mut map, 9, false);
    caret.set_offset(&buf, &mut map, 2, true);
    caret.insert(&mut buf, &mut map, "-");
    assert_eq!(buf.get_str(), "aa-cc");
    assert_eq!(buf.stats().line_count, 1);
    assert!(!caret.has_selection());
}

#[test]
fn test_out_of_range_edits_are_clamped_not_fatal() {
    let mut buf = GapBuffer::from_str("abc");
    buf.insert("X", 999);
    buf.delete(999, 999);
    buf.delete(2, 999);
    assert_eq!(buf.get_str(), "abcX");
}

#[test]
fn test_viewport_shrink_then_grow_round_trips_caret() {
    let (buf, mut map, mut caret) = editor("0123456789", 10);
    caret.set_offset(&buf, &mut map, 7, false);
    assert_eq!((caret.line, caret.column), (0, 7));

    map.set_viewport_cols(5);
    caret.set_offset(&buf, &mut map, 7, false);
    assert_eq!((caret.line, caret.column), (1, 2));

    map.set_viewport_cols(10);
    caret.set_offset(&buf, &mut map, 7, false);
    assert_eq!((caret.line, caret.column), (0, 7));
}
