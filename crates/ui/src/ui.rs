//! The per-frame box tree and its context.
//!
//! Application code rebuilds the tree from scratch every frame inside
//! `begin_frame`/`end_frame`, declaring boxes with push/pop pairs. Per-box
//! persistent state (animated style, last layout rect, scroll offset, widget
//! data) survives frame boundaries in a side map keyed by the box's stable
//! key — the hash of its id path — giving retained-widget behavior over an
//! immediate-mode API.
//!
//! Exactly one input event is visible to widget logic per frame. Queued
//! platform events are drained into a single representative dispatch; a
//! widget that acts on the event calls [`Ui::eat_event`] so nothing else
//! consumes it.

use std::any::Any;
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};

use tracing::warn;

use mosaic_input::{Event, Key};

use crate::font::{FontId, FontShaper};
use crate::geom::{Axis, Rect, Vec2};
use crate::glyph_atlas::GlyphAtlas;
use crate::layout;
use crate::render::{RectCmd, Renderer};
use crate::style::{animate_style, ConfigSource, MatchContext, Style, StylePatch, StyleSheet};

/// Stable identity of a box across frames: hash of its id path.
pub type BoxKey = u64;

/// Index of a box within the current frame's tree.
pub type BoxIdx = usize;

/// Atlas geometry: fixed 32px slots in a 1024x1024 texture.
const ATLAS_SLOT: u32 = 32;
const ATLAS_COLS: u32 = 32;
const ATLAS_ROWS: u32 = 32;

/// Input signals a box observed this frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct Signal {
    /// Mouse is over this box (topmost reactive box wins).
    pub hovered: bool,
    /// Mouse button is held after going down on this box.
    pub pressed: bool,
    /// The frame's event is a mouse-down on this box.
    pub clicked: bool,
    /// This box holds keyboard focus.
    pub focused: bool,
    /// Scroll delta delivered to this box this frame.
    pub scroll: Option<(f32, f32)>,
}

/// What a box is, selecting its measure/draw capabilities.
pub enum BoxKind {
    /// Pure container; draws only its background/border.
    Container,
    /// A text run drawn with the box's font and foreground color.
    Label(String),
    /// A textured quad of intrinsic size.
    Image {
        texture: crate::render::TextureHandle,
        width: f32,
        height: f32,
    },
    /// Caller-supplied measure/draw pair.
    Custom(Box<dyn Widget>),
}

impl std::fmt::Debug for BoxKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BoxKind::Container => write!(f, "Container"),
            BoxKind::Label(text) => f.debug_tuple("Label").field(text).finish(),
            BoxKind::Image { texture, .. } => f.debug_tuple("Image").field(texture).finish(),
            BoxKind::Custom(_) => write!(f, "Custom"),
        }
    }
}

/// Measure/draw capability pair for custom boxes.
pub trait Widget {
    /// Intrinsic size along one axis, for `SizeSpec::Custom`.
    fn measure(&self, axis: Axis) -> f32;

    /// Draws into the box's laid-out rect.
    fn draw(&self, rect: Rect, style: &Style, ctx: &mut DrawCtx<'_>);
}

/// Collaborators handed to widget draw code.
pub struct DrawCtx<'a> {
    pub shaper: &'a mut dyn FontShaper,
    pub renderer: &'a mut dyn Renderer,
    pub atlas: &'a mut GlyphAtlas,
}

impl DrawCtx<'_> {
    /// Draws a text run with its top-left at (x, y). Glyphs whose slot is
    /// unavailable this frame are skipped; the pen still advances.
    pub fn text(&mut self, font: FontId, text: &str, x: f32, y: f32, color: crate::geom::Rgba) {
        let ascent = self.shaper.ascent(font);
        let glyphs = self.shaper.shape(font, text);
        self.renderer.bind_texture(self.atlas.texture());

        let mut pen = x;
        for glyph in &glyphs {
            if let Some(slot) = self.atlas.get_slot(self.shaper, self.renderer, font, glyph) {
                if slot.width > 0 && slot.height > 0 {
                    let gx = pen + glyph.x + slot.bearing_x as f32;
                    let gy = y + ascent - slot.bearing_y as f32 + glyph.y;
                    let rect = Rect::new(gx, gy, slot.width as f32, slot.height as f32);
                    let mut cmd = RectCmd::fill(rect, color);
                    cmd.texture_rect = Some(self.atlas.uv_rect(&slot));
                    self.renderer.submit_rect(&cmd);
                }
            }
            pen += glyph.x_advance;
        }
    }
}

/// One node of the frame's tree.
#[derive(Debug)]
pub struct BoxNode {
    pub key: BoxKey,
    pub id: String,
    pub tag: &'static str,
    pub kind: BoxKind,
    pub parent: Option<BoxIdx>,
    pub children: Vec<BoxIdx>,
    /// Box-local style overrides, applied after sheet rules.
    pub patch: StylePatch,
    /// Resolved (and possibly animated) style; filled in `end_frame`.
    pub style: Style,
    /// Layout result; filled in `end_frame`.
    pub rect: Rect,
    pub(crate) size_px: [f32; 2],
    /// Participates in hit-testing.
    pub reactive: bool,
    /// Participates in Tab traversal.
    pub focusable: bool,
    /// Explicit offset from the parent origin; excluded from flow.
    pub floating: Option<Vec2>,
}

/// Cross-frame state for one box key.
struct BoxState {
    generation: u64,
    /// Layout rect from the previous frame, used for hit-testing during the
    /// build pass (this frame's layout does not exist yet).
    rect: Rect,
    /// Animated style carried between frames.
    style: Option<Style>,
    scroll: Vec2,
    data: Option<Box<dyn Any>>,
}

/// The toolkit context: one per top-level UI instance.
pub struct Ui {
    /// Global style rules.
    pub sheet: StyleSheet,
    /// Named-value source for config-keyed style values.
    pub config: Option<Box<dyn ConfigSource>>,

    nodes: Vec<BoxNode>,
    stack: Vec<BoxIdx>,
    state: HashMap<BoxKey, BoxState>,
    generation: u64,

    queue: Vec<Event>,
    event: Option<Event>,
    event_eaten: bool,
    mouse: Vec2,
    mouse_down: bool,
    /// Topmost reactive box under the mouse, from last frame's rects.
    hot: Option<BoxKey>,
    /// Reactive boxes of the previous frame, declaration order, for
    /// hot-box resolution.
    prev_reactive: Vec<(BoxKey, Rect)>,
    pressed: Option<BoxKey>,
    focused: Option<BoxKey>,
    focus_order: Vec<BoxKey>,
    keys_seen: HashSet<BoxKey>,

    viewport: Vec2,
    dt: f32,
    atlas: Option<GlyphAtlas>,
}

impl Ui {
    pub fn new() -> Self {
        Self {
            sheet: StyleSheet::new(),
            config: None,
            nodes: Vec::new(),
            stack: Vec::new(),
            state: HashMap::new(),
            generation: 0,
            queue: Vec::new(),
            event: None,
            event_eaten: false,
            mouse: Vec2::default(),
            mouse_down: false,
            hot: None,
            prev_reactive: Vec::new(),
            pressed: None,
            focused: None,
            focus_order: Vec::new(),
            keys_seen: HashSet::new(),
            viewport: Vec2::new(800.0, 600.0),
            dt: 0.0,
            atlas: None,
        }
    }

    /// Queues a platform event for the next frame.
    pub fn push_event(&mut self, event: Event) {
        self.queue.push(event);
    }

    /// Returns the mouse position as of this frame.
    pub fn mouse(&self) -> Vec2 {
        self.mouse
    }

    /// The frame's representative event, unless something already ate it.
    pub fn event(&self) -> Option<&Event> {
        if self.event_eaten {
            None
        } else {
            self.event.as_ref()
        }
    }

    /// Marks the frame's event consumed: no widget checked later in the
    /// frame (or in `end_frame`'s focus handling) observes it.
    pub fn eat_event(&mut self) {
        self.event_eaten = true;
    }

    // ==================== Frame lifecycle ====================

    /// Starts a frame: drains the event queue into one representative
    /// event, resolves the hot (hovered) box from last frame's rects, and
    /// opens the root box.
    pub fn begin_frame(&mut self, dt: f32) {
        self.generation += 1;
        self.dt = dt;
        self.nodes.clear();
        self.stack.clear();
        self.focus_order.clear();
        self.keys_seen.clear();
        self.event_eaten = false;

        // Drain the queue. Positional state (mouse, viewport) absorbs every
        // event; the representative is the last one that is not a bare
        // mouse-move, so clicks and keys are not lost under move spam.
        let mut representative: Option<Event> = None;
        let mut last: Option<Event> = None;
        for event in self.queue.drain(..) {
            match &event {
                Event::WindowResize { width, height } => {
                    self.viewport = Vec2::new(*width, *height);
                }
                Event::MouseMove { x, y } => {
                    self.mouse = Vec2::new(*x, *y);
                }
                Event::MouseDown { x, y, .. } => {
                    self.mouse = Vec2::new(*x, *y);
                    self.mouse_down = true;
                }
                Event::MouseUp { x, y, .. } => {
                    self.mouse = Vec2::new(*x, *y);
                    self.mouse_down = false;
                }
                Event::Scroll { x, y, .. } => {
                    self.mouse = Vec2::new(*x, *y);
                }
                _ => {}
            }
            if !matches!(event, Event::MouseMove { .. } | Event::WindowResize { .. }) {
                representative = Some(event.clone());
            }
            last = Some(event);
        }
        self.event = representative.or(last);

        if !self.mouse_down {
            self.pressed = None;
        }

        // Topmost reactive box under the mouse: later-declared wins, which
        // matches draw order (floats declared later sit on top).
        self.hot = self
            .prev_reactive
            .iter()
            .rev()
            .find(|(_, rect)| rect.contains(self.mouse.x, self.mouse.y))
            .map(|(key, _)| *key);

        // Implicit root box sized to the viewport.
        let root = self.push_box("root", "root", BoxKind::Container);
        self.patch(
            root,
            StylePatch {
                size_x: Some(crate::style::SizeSpec::Pixels(self.viewport.x)),
                size_y: Some(crate::style::SizeSpec::Pixels(self.viewport.y)),
                ..Default::default()
            },
        );
    }

    /// Opens a box as a child of the innermost open box. Every `push_box`
    /// must be matched by [`pop_box`](Self::pop_box); leaves can use
    /// [`leaf`](Self::leaf).
    pub fn push_box(&mut self, id: &str, tag: &'static str, kind: BoxKind) -> BoxIdx {
        let parent = self.stack.last().copied();
        let parent_key = parent.map_or(0, |p| self.nodes[p].key);
        let key = hash_key(parent_key, id);

        if !self.keys_seen.insert(key) {
            warn!(id, "duplicate box key in one frame; check widget ids");
        }

        let idx = self.nodes.len();
        self.nodes.push(BoxNode {
            key,
            id: id.to_string(),
            tag,
            kind,
            parent,
            children: Vec::new(),
            patch: StylePatch::default(),
            style: Style::default(),
            rect: Rect::default(),
            size_px: [0.0, 0.0],
            reactive: false,
            focusable: false,
            floating: None,
        });
        if let Some(p) = parent {
            self.nodes[p].children.push(idx);
        }
        self.stack.push(idx);
        idx
    }

    /// Reopens an already-declared box so more children can be added to it,
    /// e.g. mounting a view into a tile leaf's content box after the tile
    /// tree finished building. Must be balanced with [`pop_box`](Self::pop_box).
    pub fn reopen_box(&mut self, idx: BoxIdx) {
        self.stack.push(idx);
    }

    /// Closes the innermost open box.
    pub fn pop_box(&mut self) {
        assert!(self.stack.len() > 1, "pop_box without matching push_box");
        self.stack.pop();
    }

    /// Declares a childless box: push + pop in one call.
    pub fn leaf(&mut self, id: &str, tag: &'static str, kind: BoxKind) -> BoxIdx {
        let idx = self.push_box(id, tag, kind);
        self.pop_box();
        idx
    }

    /// Convenience label leaf.
    pub fn label(&mut self, id: &str, text: &str) -> BoxIdx {
        let idx = self.leaf(id, "label", BoxKind::Label(text.to_string()));
        self.nodes[idx].patch.size_x = Some(crate::style::SizeSpec::Custom);
        self.nodes[idx].patch.size_y = Some(crate::style::SizeSpec::Custom);
        idx
    }

    /// Replaces a box's kind after declaration. Widgets that must process
    /// this frame's input before they can snapshot their draw model declare
    /// a container first and swap in the real kind here.
    pub fn set_kind(&mut self, idx: BoxIdx, kind: BoxKind) {
        self.nodes[idx].kind = kind;
    }

    /// Merges local style overrides onto a box (highest cascade priority).
    pub fn patch(&mut self, idx: BoxIdx, patch: StylePatch) {
        merge_patch(&mut self.nodes[idx].patch, patch);
    }

    /// Makes the box float at an explicit offset from its parent origin,
    /// excluded from normal flow.
    pub fn set_float(&mut self, idx: BoxIdx, x: f32, y: f32) {
        self.nodes[idx].floating = Some(Vec2::new(x, y));
    }

    /// Marks a box reactive and returns its input signals for this frame.
    ///
    /// Hover and click are resolved against the previous frame's layout
    /// rect, the standard immediate-mode one-frame latency.
    pub fn signal(&mut self, idx: BoxIdx) -> Signal {
        self.nodes[idx].reactive = true;
        let key = self.nodes[idx].key;

        let hovered = self.hot == Some(key);
        let mut clicked = false;
        let mut scroll = None;

        if hovered && !self.event_eaten {
            match self.event {
                Some(Event::MouseDown { .. }) => {
                    clicked = true;
                    self.pressed = Some(key);
                }
                Some(Event::Scroll { dx, dy, .. }) => {
                    scroll = Some((dx, dy));
                }
                _ => {}
            }
        }

        Signal {
            hovered,
            pressed: self.pressed == Some(key),
            clicked,
            focused: self.focused == Some(key),
            scroll,
        }
    }

    /// Marks a box focusable (and reactive), enrolling it in Tab traversal.
    /// Clicking it grabs focus immediately.
    pub fn focusable(&mut self, idx: BoxIdx) -> Signal {
        self.nodes[idx].focusable = true;
        let key = self.nodes[idx].key;
        self.focus_order.push(key);

        let mut signal = self.signal(idx);
        if signal.clicked {
            self.focused = Some(key);
            signal.focused = true;
        }
        signal
    }

    /// Returns true if the box holds keyboard focus.
    pub fn is_focused(&self, idx: BoxIdx) -> bool {
        self.focused == Some(self.nodes[idx].key)
    }

    /// Typed persistent state for a box, created on first access.
    ///
    /// The state lives in a side map keyed by the box key and survives as
    /// long as the box keeps being declared each frame.
    pub fn box_data<T: Any + Default>(&mut self, idx: BoxIdx) -> &mut T {
        let key = self.nodes[idx].key;
        let generation = self.generation;
        let state = self
            .state
            .entry(key)
            .or_insert_with(|| BoxState::new(generation));
        let data = state
            .data
            .get_or_insert_with(|| Box::<T>::default() as Box<dyn Any>);
        if data.downcast_mut::<T>().is_none() {
            // A different widget type reused this key; start fresh.
            *data = Box::<T>::default();
        }
        data.downcast_mut::<T>().expect("freshly written box data")
    }

    /// The box's layout rect from the previous frame, if it was declared
    /// then. Current-frame layout does not exist during the build pass, so
    /// geometry-dependent input logic (splitter drags, scroll hit zones)
    /// works from this.
    pub fn last_rect(&self, idx: BoxIdx) -> Option<Rect> {
        let key = self.nodes[idx].key;
        self.state
            .get(&key)
            .filter(|s| s.generation + 1 >= self.generation)
            .map(|s| s.rect)
    }

    /// Persistent scroll offset for a box.
    pub fn scroll_offset(&mut self, idx: BoxIdx) -> Vec2 {
        let key = self.nodes[idx].key;
        self.state.get(&key).map_or(Vec2::default(), |s| s.scroll)
    }

    /// Stores a box's scroll offset.
    pub fn set_scroll_offset(&mut self, idx: BoxIdx, offset: Vec2) {
        let key = self.nodes[idx].key;
        let generation = self.generation;
        self.state
            .entry(key)
            .or_insert_with(|| BoxState::new(generation))
            .scroll = offset;
    }

    /// Finishes the frame: style cascade, layout, focus traversal, draw,
    /// and garbage collection of state for boxes not declared this frame.
    pub fn end_frame(&mut self, shaper: &mut dyn FontShaper, renderer: &mut dyn Renderer) {
        assert_eq!(
            self.stack.len(),
            1,
            "unbalanced push_box/pop_box at end of frame"
        );
        self.stack.clear();

        self.resolve_styles();
        self.run_layout(shaper);
        self.handle_focus_traversal();
        self.draw(shaper, renderer);
        self.collect_garbage();
    }

    fn resolve_styles(&mut self) {
        for idx in 0..self.nodes.len() {
            let (child_index, sibling_count) = match self.nodes[idx].parent {
                Some(p) => {
                    let flow: Vec<BoxIdx> = self.nodes[p]
                        .children
                        .iter()
                        .copied()
                        .filter(|&c| self.nodes[c].floating.is_none())
                        .collect();
                    let pos = flow.iter().position(|&c| c == idx).unwrap_or(0);
                    (pos, flow.len())
                }
                None => (0, 1),
            };

            let ctx = MatchContext {
                tag: self.nodes[idx].tag,
                id: &self.nodes[idx].id,
                child_index,
                sibling_count,
            };
            let cfg = self.config.as_deref();
            let mut target = self.sheet.resolve(&ctx, cfg);
            self.nodes[idx].patch.apply_to(&mut target, cfg);

            // Animate from last frame's resolved value where masked.
            let key = self.nodes[idx].key;
            let generation = self.generation;
            let state = self
                .state
                .entry(key)
                .or_insert_with(|| BoxState::new(generation));
            let style = match state.style.take() {
                Some(mut prev) => {
                    animate_style(&mut prev, &target, self.dt);
                    prev
                }
                None => target,
            };
            state.style = Some(style.clone());
            self.nodes[idx].style = style;
        }
    }

    fn run_layout(&mut self, shaper: &mut dyn FontShaper) {
        if self.nodes.is_empty() {
            return;
        }
        layout::solve(&mut self.nodes, 0, self.viewport, &mut |node, axis| {
            measure_kind(node, axis, shaper)
        });
    }

    fn handle_focus_traversal(&mut self) {
        if self.event_eaten {
            return;
        }
        let Some(Event::KeyDown { key: Key::Tab, modifiers }) = &self.event else {
            return;
        };
        let shift = modifiers.shift;
        if self.focus_order.is_empty() {
            return;
        }

        let current = self
            .focused
            .and_then(|f| self.focus_order.iter().position(|&k| k == f));
        let next = match (current, shift) {
            (Some(i), false) => (i + 1) % self.focus_order.len(),
            (Some(i), true) => (i + self.focus_order.len() - 1) % self.focus_order.len(),
            (None, false) => 0,
            (None, true) => self.focus_order.len() - 1,
        };
        self.focused = Some(self.focus_order[next]);
        self.event_eaten = true;
    }

    fn draw(&mut self, shaper: &mut dyn FontShaper, renderer: &mut dyn Renderer) {
        let atlas = self.atlas.get_or_insert_with(|| {
            GlyphAtlas::new(renderer, ATLAS_SLOT, ATLAS_SLOT, ATLAS_COLS, ATLAS_ROWS)
        });

        self.prev_reactive.clear();

        // Declaration order == draw order == z-order.
        for node in &self.nodes {
            if node.reactive {
                self.prev_reactive.push((node.key, node.rect));
            }

            let style = &node.style;
            if style.background[3] > 0.0 || style.border_width > 0.0 || style.shadow > 0.0 {
                let mut cmd = RectCmd::fill(node.rect, style.background);
                cmd.radius = style.radius;
                cmd.border = style.border_width;
                cmd.border_color = style.border_color;
                cmd.shadow = style.shadow;
                renderer.submit_rect(&cmd);
            }

            let mut ctx = DrawCtx {
                shaper: &mut *shaper,
                renderer: &mut *renderer,
                atlas: &mut *atlas,
            };
            match &node.kind {
                BoxKind::Container => {}
                BoxKind::Label(text) => {
                    let x = node.rect.min.x + style.padding;
                    let y = node.rect.min.y + style.padding;
                    ctx.text(style.font, text, x, y, style.foreground);
                }
                BoxKind::Image { texture, .. } => {
                    ctx.renderer.bind_texture(*texture);
                    let mut cmd = RectCmd::fill(node.rect, crate::geom::WHITE);
                    cmd.texture_rect = Some(Rect::new(0.0, 0.0, 1.0, 1.0));
                    ctx.renderer.submit_rect(&cmd);
                }
                BoxKind::Custom(widget) => widget.draw(node.rect, style, &mut ctx),
            }
        }

        // Remember layout rects for next frame's hit-testing.
        for node in &self.nodes {
            if let Some(state) = self.state.get_mut(&node.key) {
                state.rect = node.rect;
            }
        }
    }

    fn collect_garbage(&mut self) {
        let generation = self.generation;
        // Refresh generation stamps for every key declared this frame, then
        // prune everything stale (widgets that stopped being declared).
        for node in &self.nodes {
            if let Some(state) = self.state.get_mut(&node.key) {
                state.generation = generation;
            }
        }
        self.state.retain(|_, s| s.generation == generation);

        if let Some(focused) = self.focused {
            if !self.state.contains_key(&focused) {
                self.focused = None;
            }
        }
    }

    // Test-only introspection.
    #[cfg(test)]
    pub(crate) fn node(&self, idx: BoxIdx) -> &BoxNode {
        &self.nodes[idx]
    }

    #[cfg(test)]
    pub(crate) fn state_len(&self) -> usize {
        self.state.len()
    }
}

impl Default for Ui {
    fn default() -> Self {
        Self::new()
    }
}

impl BoxState {
    fn new(generation: u64) -> Self {
        Self {
            generation,
            rect: Rect::default(),
            style: None,
            scroll: Vec2::default(),
            data: None,
        }
    }
}

fn hash_key(parent: BoxKey, id: &str) -> BoxKey {
    let mut hasher = DefaultHasher::new();
    parent.hash(&mut hasher);
    id.hash(&mut hasher);
    hasher.finish()
}

fn merge_patch(dst: &mut StylePatch, src: StylePatch) {
    macro_rules! take {
        ($($field:ident),*) => {
            $(if src.$field.is_some() { dst.$field = src.$field; })*
        };
    }
    take!(
        background,
        foreground,
        border_color,
        border_width,
        radius,
        shadow,
        padding,
        spacing,
        direction,
        size_x,
        size_y,
        font,
        animation_mask,
        animation_duration
    );
}

/// Intrinsic size of a box kind, for `SizeSpec::Custom`.
pub(crate) fn measure_kind(node: &BoxNode, axis: Axis, shaper: &mut dyn FontShaper) -> f32 {
    match &node.kind {
        BoxKind::Container => 0.0,
        BoxKind::Label(text) => match axis {
            Axis::X => shaper
                .shape(node.style.font, text)
                .iter()
                .map(|g| g.x_advance)
                .sum(),
            Axis::Y => shaper.line_height(node.style.font),
        },
        BoxKind::Image { width, height, .. } => match axis {
            Axis::X => *width,
            Axis::Y => *height,
        },
        BoxKind::Custom(widget) => widget.measure(axis),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::SizeSpec;
    use crate::testing::{CollectRenderer, FixedShaper};
    use mosaic_input::Modifiers;

    fn frame(ui: &mut Ui, build: impl FnOnce(&mut Ui)) {
        let mut shaper = FixedShaper::default();
        let mut renderer = CollectRenderer::default();
        ui.begin_frame(1.0 / 60.0);
        build(ui);
        ui.end_frame(&mut shaper, &mut renderer);
    }

    fn click_at(ui: &mut Ui, x: f32, y: f32) {
        ui.push_event(Event::MouseMove { x, y });
        ui.push_event(Event::MouseDown {
            x,
            y,
            modifiers: Modifiers::default(),
        });
    }

    #[test]
    fn test_keys_stable_across_frames() {
        let mut ui = Ui::new();
        let mut key_a = 0;
        frame(&mut ui, |ui| {
            let a = ui.push_box("panel", "panel", BoxKind::Container);
            key_a = ui.node(a).key;
            ui.pop_box();
        });
        frame(&mut ui, |ui| {
            let a = ui.push_box("panel", "panel", BoxKind::Container);
            assert_eq!(ui.node(a).key, key_a);
            ui.pop_box();
        });
    }

    #[test]
    fn test_keys_differ_by_path() {
        let mut ui = Ui::new();
        frame(&mut ui, |ui| {
            let outer = ui.push_box("a", "panel", BoxKind::Container);
            let inner = ui.leaf("x", "label", BoxKind::Container);
            ui.pop_box();
            let other = ui.push_box("b", "panel", BoxKind::Container);
            let inner2 = ui.leaf("x", "label", BoxKind::Container);
            ui.pop_box();

            assert_ne!(ui.node(outer).key, ui.node(other).key);
            assert_ne!(ui.node(inner).key, ui.node(inner2).key);
        });
    }

    #[test]
    fn test_state_gc_prunes_undeclared_boxes() {
        let mut ui = Ui::new();
        frame(&mut ui, |ui| {
            let a = ui.leaf("a", "panel", BoxKind::Container);
            ui.set_scroll_offset(a, Vec2::new(0.0, 42.0));
            let b = ui.leaf("b", "panel", BoxKind::Container);
            ui.set_scroll_offset(b, Vec2::new(0.0, 7.0));
        });
        // Root + a + b have state entries after styling.
        assert_eq!(ui.state_len(), 3);

        // "b" stops being declared (a closed tab): its state is pruned.
        frame(&mut ui, |ui| {
            let a = ui.leaf("a", "panel", BoxKind::Container);
            assert_eq!(ui.scroll_offset(a).y, 42.0);
        });
        assert_eq!(ui.state_len(), 2);
    }

    #[test]
    fn test_click_dispatch_hits_topmost_reactive_box() {
        let mut ui = Ui::new();

        let build = |ui: &mut Ui| -> (Signal, Signal) {
            let under = ui.leaf("under", "panel", BoxKind::Container);
            ui.patch(
                under,
                StylePatch {
                    size_x: Some(SizeSpec::Pixels(100.0)),
                    size_y: Some(SizeSpec::Pixels(100.0)),
                    ..Default::default()
                },
            );
            let over = ui.leaf("over", "panel", BoxKind::Container);
            ui.set_float(over, 0.0, 0.0);
            ui.patch(
                over,
                StylePatch {
                    size_x: Some(SizeSpec::Pixels(50.0)),
                    size_y: Some(SizeSpec::Pixels(50.0)),
                    ..Default::default()
                },
            );
            let s_under = ui.signal(under);
            let s_over = ui.signal(over);
            (s_under, s_over)
        };

        // Frame 1 lays out; frame 2 observes the click.
        frame(&mut ui, |ui| {
            build(ui);
        });
        click_at(&mut ui, 25.0, 25.0);
        let mut shaper = FixedShaper::default();
        let mut renderer = CollectRenderer::default();
        ui.begin_frame(0.016);
        let (s_under, s_over) = build(&mut ui);
        ui.end_frame(&mut shaper, &mut renderer);

        // Both overlap the point; the later-declared float is on top.
        assert!(!s_under.clicked);
        assert!(s_over.clicked);
        assert!(s_over.hovered);
    }

    #[test]
    fn test_eat_event_blocks_later_consumers() {
        let mut ui = Ui::new();
        let size = StylePatch {
            size_x: Some(SizeSpec::Pixels(100.0)),
            size_y: Some(SizeSpec::Pixels(100.0)),
            ..Default::default()
        };

        // Frame 1: lay out the hovered box.
        frame(&mut ui, |ui| {
            let a = ui.leaf("a", "panel", BoxKind::Container);
            ui.patch(a, size.clone());
            ui.signal(a);
        });

        // Frame 2: the hovered box eats the click; a consumer checking
        // afterwards sees no event and no click signal.
        click_at(&mut ui, 50.0, 50.0);
        let mut shaper = FixedShaper::default();
        let mut renderer = CollectRenderer::default();
        ui.begin_frame(0.016);
        let a = ui.leaf("a", "panel", BoxKind::Container);
        ui.patch(a, size.clone());
        let sig = ui.signal(a);
        assert!(sig.clicked);
        ui.eat_event();
        assert!(ui.event().is_none());

        let b = ui.leaf("b", "panel", BoxKind::Container);
        ui.set_float(b, 0.0, 0.0);
        ui.patch(b, size);
        let sig_b = ui.signal(b);
        assert!(!sig_b.clicked);
        ui.end_frame(&mut shaper, &mut renderer);
    }

    #[test]
    fn test_tab_moves_focus_in_declaration_order() {
        let mut ui = Ui::new();
        let build = |ui: &mut Ui| -> Vec<Signal> {
            ["first", "second", "third"]
                .iter()
                .map(|id| {
                    let idx = ui.leaf(id, "field", BoxKind::Container);
                    ui.focusable(idx)
                })
                .collect()
        };

        frame(&mut ui, |ui| {
            build(ui);
        });

        // First Tab focuses the first field.
        ui.push_event(Event::KeyDown {
            key: Key::Tab,
            modifiers: Modifiers::default(),
        });
        let mut shaper = FixedShaper::default();
        let mut renderer = CollectRenderer::default();
        ui.begin_frame(0.016);
        build(&mut ui);
        ui.end_frame(&mut shaper, &mut renderer);

        ui.begin_frame(0.016);
        let signals = build(&mut ui);
        assert!(signals[0].focused);
        ui.end_frame(&mut shaper, &mut renderer);

        // Second Tab advances; Shift-Tab goes back.
        ui.push_event(Event::KeyDown {
            key: Key::Tab,
            modifiers: Modifiers::default(),
        });
        ui.begin_frame(0.016);
        build(&mut ui);
        ui.end_frame(&mut shaper, &mut renderer);

        ui.begin_frame(0.016);
        let signals = build(&mut ui);
        assert!(signals[1].focused);
        ui.end_frame(&mut shaper, &mut renderer);

        ui.push_event(Event::KeyDown {
            key: Key::Tab,
            modifiers: Modifiers {
                shift: true,
                ..Default::default()
            },
        });
        ui.begin_frame(0.016);
        build(&mut ui);
        ui.end_frame(&mut shaper, &mut renderer);

        ui.begin_frame(0.016);
        let signals = build(&mut ui);
        assert!(signals[0].focused);
        ui.end_frame(&mut shaper, &mut renderer);
    }

    #[test]
    fn test_representative_event_prefers_meaningful_over_mouse_move() {
        let mut ui = Ui::new();
        ui.push_event(Event::KeyDown {
            key: Key::Return,
            modifiers: Modifiers::default(),
        });
        ui.push_event(Event::MouseMove { x: 5.0, y: 5.0 });
        ui.push_event(Event::MouseMove { x: 6.0, y: 6.0 });

        ui.begin_frame(0.016);
        assert!(matches!(
            ui.event(),
            Some(Event::KeyDown {
                key: Key::Return,
                ..
            })
        ));
        // Mouse position still absorbed every move.
        assert_eq!(ui.mouse().x, 6.0);
        let mut shaper = FixedShaper::default();
        let mut renderer = CollectRenderer::default();
        ui.end_frame(&mut shaper, &mut renderer);
    }

    #[test]
    fn test_box_data_persists_and_types() {
        #[derive(Default)]
        struct Counter {
            clicks: u32,
        }

        let mut ui = Ui::new();
        frame(&mut ui, |ui| {
            let b = ui.leaf("btn", "button", BoxKind::Container);
            ui.box_data::<Counter>(b).clicks += 1;
        });
        frame(&mut ui, |ui| {
            let b = ui.leaf("btn", "button", BoxKind::Container);
            let counter = ui.box_data::<Counter>(b);
            assert_eq!(counter.clicks, 1);
        });
    }
}
