//! Editable text box: the widget that wires the gap buffer, caret, and
//! visual-line projection into the box tree.
//!
//! The editor owns its document state across frames; each `build` call
//! declares one focusable box, routes the frame's event to the caret when
//! focused, and snapshots the visible rows into a draw model for the box's
//! custom draw capability. A font the shaper has not resolved yet simply
//! draws nothing this frame — the next rebuild retries.

use mosaic_buffer::{Caret, GapBuffer, VisualLineMap, WrapMode};
use mosaic_input::{Clipboard, Event, Key, Modifiers};

use crate::font::{FontId, FontShaper};
use crate::geom::{Axis, Rect, Rgba, Vec2};
use crate::render::RectCmd;
use crate::style::{SizeSpec, Style, StylePatch};
use crate::ui::{BoxIdx, BoxKind, DrawCtx, Ui, Widget};

/// Selection highlight color; multiplied into the glyph quads it underlays.
const SELECTION_COLOR: Rgba = [0.3, 0.45, 0.8, 0.45];

/// An editable text area with persistent document state.
pub struct TextEditor {
    buffer: GapBuffer,
    map: VisualLineMap,
    caret: Caret,
    font: FontId,
}

impl TextEditor {
    /// Creates an empty editor using the given font.
    pub fn new(font: FontId) -> Self {
        Self::from_str("", font)
    }

    /// Creates an editor over initial contents (e.g. a loaded file).
    pub fn from_str(text: &str, font: FontId) -> Self {
        Self {
            buffer: GapBuffer::from_str_with_gap(text, text.len().max(64) / 4),
            map: VisualLineMap::new(WrapMode::Char, 80, 4),
            caret: Caret::new(),
            font,
        }
    }

    /// The document contents.
    pub fn text(&mut self) -> &str {
        self.buffer.get_str()
    }

    pub fn caret(&self) -> &Caret {
        &self.caret
    }

    pub fn buffer_mut(&mut self) -> &mut GapBuffer {
        &mut self.buffer
    }

    /// Declares the editor's box for this frame and processes input while
    /// focused. Returns the box index.
    pub fn build(
        &mut self,
        ui: &mut Ui,
        shaper: &mut dyn FontShaper,
        id: &str,
        mut clipboard: Option<&mut dyn Clipboard>,
    ) -> BoxIdx {
        let idx = ui.push_box(id, "editor", BoxKind::Container);
        ui.patch(
            idx,
            StylePatch {
                size_x: Some(SizeSpec::PctParent(1.0)),
                size_y: Some(SizeSpec::PctParent(1.0)),
                ..Default::default()
            },
        );
        let signal = ui.focusable(idx);

        let cell_w = cell_width(shaper, self.font);
        let line_h = shaper.line_height(self.font).max(1.0);

        // Fit the wrap width to the box, using last frame's rect (this
        // frame's layout hasn't run yet).
        let view = ui.last_rect(idx).unwrap_or_default();
        if view.width() > 0.0 && cell_w > 0.0 {
            self.map
                .set_viewport_cols((view.width() / cell_w).floor() as usize);
        }

        // Click places the caret.
        if signal.clicked {
            let mouse = ui.mouse();
            let scroll = ui.scroll_offset(idx);
            let row = ((mouse.y - view.min.y + scroll.y) / line_h).max(0.0) as usize;
            let col = ((mouse.x - view.min.x + scroll.x) / cell_w).max(0.0) as usize;
            self.caret
                .set_line_col(&self.buffer, &mut self.map, row, col, false);
            ui.eat_event();
        }

        if let Some((_, dy)) = signal.scroll {
            let mut scroll = ui.scroll_offset(idx);
            self.map.refresh(&self.buffer);
            let content_h = self.map.row_count() as f32 * line_h;
            let max_scroll = (content_h - view.height()).max(0.0);
            scroll.y = (scroll.y + dy).clamp(0.0, max_scroll);
            ui.set_scroll_offset(idx, scroll);
            ui.eat_event();
        }

        if signal.focused {
            if let Some(event) = ui.event().cloned() {
                if self.handle_event(&event, clipboard.as_deref_mut()) {
                    ui.eat_event();
                }
            }
        }

        // Snapshot the visible rows for drawing.
        let scroll = ui.scroll_offset(idx);
        let widget = self.snapshot(signal.focused, scroll, view.height(), cell_w, line_h);
        ui.set_kind(idx, BoxKind::Custom(Box::new(widget)));
        ui.pop_box();
        idx
    }

    /// Applies one input event to the document. Returns true if consumed.
    pub fn handle_event(&mut self, event: &Event, clipboard: Option<&mut (dyn Clipboard + '_)>) -> bool {
        match event {
            Event::Text(text) => {
                self.caret.insert(&mut self.buffer, &mut self.map, text);
                true
            }
            Event::KeyDown { key, modifiers } => self.handle_key(*key, *modifiers, clipboard),
            _ => false,
        }
    }

    fn handle_key(
        &mut self,
        key: Key,
        mods: Modifiers,
        clipboard: Option<&mut (dyn Clipboard + '_)>,
    ) -> bool {
        let buf = &mut self.buffer;
        let map = &mut self.map;
        let select = mods.shift;
        let command = mods.meta || mods.control;
        let word = mods.alt;

        match key {
            Key::Char(ch) if command => self.command_key(ch, clipboard),
            Key::Char(ch) => {
                self.caret.insert(buf, map, &ch.to_string());
                true
            }
            Key::Return => {
                self.caret.insert(buf, map, "\n");
                true
            }
            Key::Tab => {
                self.caret.insert(buf, map, "\t");
                true
            }
            Key::Backspace => {
                self.caret.delete_backward(buf, map);
                true
            }
            Key::Delete => {
                self.caret.delete_forward(buf, map);
                true
            }
            Key::Left if word => {
                self.caret.move_word_left(buf, map, select);
                true
            }
            Key::Right if word => {
                self.caret.move_word_right(buf, map, select);
                true
            }
            Key::Left => {
                self.caret.move_left(buf, map, select);
                true
            }
            Key::Right => {
                self.caret.move_right(buf, map, select);
                true
            }
            Key::Up => {
                self.caret.move_up(buf, map, select);
                true
            }
            Key::Down => {
                self.caret.move_down(buf, map, select);
                true
            }
            Key::Home => {
                self.caret.move_home(buf, map, select);
                true
            }
            Key::End => {
                self.caret.move_end(buf, map, select);
                true
            }
            _ => false,
        }
    }

    fn command_key(&mut self, ch: char, clipboard: Option<&mut (dyn Clipboard + '_)>) -> bool {
        match ch {
            'a' => {
                self.caret.select_all(&self.buffer, &mut self.map);
                true
            }
            'c' => {
                if let (Some(clip), Some(text)) = (clipboard, self.caret.selected_text(&self.buffer))
                {
                    clip.set(&text);
                }
                true
            }
            'x' => {
                if let Some(clip) = clipboard {
                    if let Some(text) = self.caret.selected_text(&self.buffer) {
                        clip.set(&text);
                        self.caret.delete(&mut self.buffer, &mut self.map);
                    }
                }
                true
            }
            'v' => {
                if let Some(clip) = clipboard {
                    if let Some(text) = clip.get() {
                        self.caret.insert(&mut self.buffer, &mut self.map, &text);
                    }
                }
                true
            }
            _ => false,
        }
    }

    fn snapshot(
        &mut self,
        focused: bool,
        scroll: Vec2,
        view_height: f32,
        cell_w: f32,
        line_h: f32,
    ) -> EditorWidget {
        self.map.refresh(&self.buffer);

        let total_rows = self.map.row_count();
        let first = (scroll.y / line_h).max(0.0) as usize;
        let visible = if view_height > 0.0 {
            (view_height / line_h).ceil() as usize + 1
        } else {
            total_rows
        };
        let last = (first + visible).min(total_rows);

        let (sel_start, sel_end) = self.caret.selection_span();
        let mut rows = Vec::with_capacity(last.saturating_sub(first));
        for row_idx in first..last {
            let Some(row) = self.map.row(row_idx).copied() else {
                break;
            };
            let text = self.buffer.slice(row.offset, row.end());

            let selection = if self.caret.has_selection()
                && sel_start < row.end().max(row.offset + 1)
                && sel_end > row.offset
            {
                let from = self
                    .map
                    .col_of_offset(&self.buffer, row_idx, sel_start.max(row.offset));
                let to = self
                    .map
                    .col_of_offset(&self.buffer, row_idx, sel_end.min(row.end()));
                (from < to).then_some((from, to))
            } else {
                None
            };

            rows.push(RowSnapshot {
                index: row_idx,
                text,
                selection,
            });
        }

        let stats = self.buffer.stats();

        EditorWidget {
            rows,
            caret: focused.then_some((self.caret.line, self.caret.column)),
            font: self.font,
            cell_w,
            line_h,
            scroll,
            total_rows,
            widest: stats.widest_line,
        }
    }
}

/// One visible row of the draw model.
struct RowSnapshot {
    index: usize,
    text: String,
    /// Selected char-column range within this row, if any.
    selection: Option<(usize, usize)>,
}

/// Frame-local draw model handed to the box tree.
struct EditorWidget {
    rows: Vec<RowSnapshot>,
    /// (visual row, column) of the caret when the editor is focused.
    caret: Option<(usize, usize)>,
    font: FontId,
    cell_w: f32,
    line_h: f32,
    scroll: Vec2,
    total_rows: usize,
    widest: usize,
}

impl Widget for EditorWidget {
    fn measure(&self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.widest as f32 * self.cell_w,
            Axis::Y => self.total_rows as f32 * self.line_h,
        }
    }

    fn draw(&self, rect: Rect, style: &Style, ctx: &mut DrawCtx<'_>) {
        let origin_x = rect.min.x + style.padding - self.scroll.x;
        let origin_y = rect.min.y + style.padding - self.scroll.y;

        for row in &self.rows {
            let y = origin_y + row.index as f32 * self.line_h;

            if let Some((from, to)) = row.selection {
                let sel = Rect::new(
                    origin_x + from as f32 * self.cell_w,
                    y,
                    (to - from) as f32 * self.cell_w,
                    self.line_h,
                );
                // Tint the emitted quad in place: the bottom edge fades, so
                // stacked selected rows read as one block.
                let vertices = ctx.renderer.submit_rect(&RectCmd::fill(sel, SELECTION_COLOR));
                for vertex in vertices.iter_mut().skip(2) {
                    vertex.color[3] *= 0.8;
                }
            }

            ctx.text(self.font, &row.text, origin_x, y, style.foreground);
        }

        if let Some((row, col)) = self.caret {
            let caret_rect = Rect::new(
                origin_x + col as f32 * self.cell_w,
                origin_y + row as f32 * self.line_h,
                1.0,
                self.line_h,
            );
            ctx.renderer
                .submit_rect(&RectCmd::fill(caret_rect, style.foreground));
        }
    }
}

/// Monospace cell width, measured through the shaper.
fn cell_width(shaper: &mut dyn FontShaper, font: FontId) -> f32 {
    shaper
        .shape(font, "M")
        .first()
        .map_or(8.0, |g| g.x_advance.max(1.0))
}
