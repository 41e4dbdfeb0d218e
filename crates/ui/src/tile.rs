//! Tiling panel layout: a binary split tree whose leaves host tabbed views.
//!
//! A split renders its first child at `ratio` of the parent along the split
//! axis, a fixed-width draggable splitter handle, and the second child at
//! `1 - ratio`. Dragging the handle rewrites `ratio` directly; it is always
//! clamped to [`RATIO_MIN`, `RATIO_MAX`] so no pane can collapse to nothing.
//!
//! A leaf renders a tab strip above a content box and reports what happened
//! (tab switched, close clicked) — tab removal itself is the caller's job.

use crate::geom::Axis;
use crate::style::{ColorSpec, SizeSpec, StylePatch};
use crate::ui::{BoxIdx, BoxKind, Ui};

/// Identifier of a view instance hosted in a tile tab.
pub type ViewId = u64;

/// Ratio clamp bounds: no pane smaller than 10% of its parent.
pub const RATIO_MIN: f32 = 0.1;
pub const RATIO_MAX: f32 = 0.9;

/// Splitter handle thickness in pixels.
const SPLITTER_PX: f32 = 6.0;
/// Tab strip height in pixels.
const TAB_STRIP_PX: f32 = 26.0;
/// Close icon cell width within a tab pill.
const CLOSE_PX: f32 = 14.0;

/// A node of the panel tree.
#[derive(Debug, Clone, PartialEq)]
pub enum TileNode {
    /// A pane hosting an ordered set of view tabs.
    Leaf { tabs: Vec<ViewId>, active: usize },
    /// A binary split with a draggable ratio.
    Split {
        axis: Axis,
        ratio: f32,
        first: Box<TileNode>,
        second: Box<TileNode>,
    },
}

impl TileNode {
    /// Creates a leaf showing the given tabs, first one active.
    pub fn leaf(tabs: Vec<ViewId>) -> Self {
        TileNode::Leaf { tabs, active: 0 }
    }

    /// Creates a split; the ratio is clamped on construction.
    pub fn split(axis: Axis, ratio: f32, first: TileNode, second: TileNode) -> Self {
        TileNode::Split {
            axis,
            ratio: ratio.clamp(RATIO_MIN, RATIO_MAX),
            first: Box::new(first),
            second: Box::new(second),
        }
    }
}

/// What one leaf produced this frame.
#[derive(Debug)]
pub struct TileLeaf {
    /// The content box the caller mounts the active view into.
    pub content: BoxIdx,
    /// The active tab after any tab click this frame.
    pub active_tab: Option<ViewId>,
    /// Set when a tab's close icon was clicked; removal is up to the caller.
    pub close_requested: Option<ViewId>,
}

/// Per-splitter drag memory for vertical (delta-driven) splits.
#[derive(Debug, Default)]
struct DragState {
    last_y: f32,
}

/// Renders the tree into boxes, mutating split ratios and active tabs from
/// this frame's input, and emits one [`TileLeaf`] per leaf in tree order.
pub fn build(
    ui: &mut Ui,
    root: &mut TileNode,
    titles: &mut dyn FnMut(ViewId) -> String,
    out_leaves: &mut Vec<TileLeaf>,
) {
    build_node(ui, root, "tile", titles, out_leaves);
}

fn build_node(
    ui: &mut Ui,
    node: &mut TileNode,
    path: &str,
    titles: &mut dyn FnMut(ViewId) -> String,
    out_leaves: &mut Vec<TileLeaf>,
) {
    match node {
        TileNode::Split {
            axis,
            ratio,
            first,
            second,
        } => build_split(ui, *axis, ratio, first, second, path, titles, out_leaves),
        TileNode::Leaf { tabs, active } => {
            let leaf = build_leaf(ui, tabs, active, path, titles);
            out_leaves.push(leaf);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn build_split(
    ui: &mut Ui,
    axis: Axis,
    ratio: &mut f32,
    first: &mut TileNode,
    second: &mut TileNode,
    path: &str,
    titles: &mut dyn FnMut(ViewId) -> String,
    out_leaves: &mut Vec<TileLeaf>,
) {
    let container = ui.push_box(path, "split", BoxKind::Container);
    ui.patch(
        container,
        StylePatch {
            direction: Some(axis),
            size_x: Some(SizeSpec::PctParent(1.0)),
            size_y: Some(SizeSpec::PctParent(1.0)),
            ..Default::default()
        },
    );

    let first_box = ui.push_box("first", "pane", BoxKind::Container);
    let first_path = format!("{path}/first");
    build_node(ui, first, &first_path, titles, out_leaves);
    ui.pop_box();

    let splitter = ui.leaf("splitter", "splitter", BoxKind::Container);
    ui.patch(
        splitter,
        pane_patch(axis, SizeSpec::Pixels(SPLITTER_PX), SizeSpec::PctParent(1.0)),
    );
    ui.patch(
        splitter,
        StylePatch {
            background: Some(ColorSpec::Key("splitter.background".into())),
            ..Default::default()
        },
    );
    drag_splitter(ui, splitter, container, axis, ratio);

    // Patched after the drag so both panes see the same, updated ratio.
    ui.patch(
        first_box,
        pane_patch(axis, SizeSpec::PctParent(*ratio), SizeSpec::PctParent(1.0)),
    );

    let second_box = ui.push_box("second", "pane", BoxKind::Container);
    ui.patch(
        second_box,
        pane_patch(axis, SizeSpec::PctParent(1.0 - *ratio), SizeSpec::PctParent(1.0)),
    );
    let second_path = format!("{path}/second");
    build_node(ui, second, &second_path, titles, out_leaves);
    ui.pop_box();

    ui.pop_box();
}

/// Split-axis size goes to `main`, the other axis fills the parent.
fn pane_patch(axis: Axis, main: SizeSpec, cross: SizeSpec) -> StylePatch {
    let (size_x, size_y) = match axis {
        Axis::X => (main, cross),
        Axis::Y => (cross, main),
    };
    StylePatch {
        size_x: Some(size_x),
        size_y: Some(size_y),
        ..Default::default()
    }
}

/// Updates the split ratio while the handle is dragged.
///
/// Horizontal splits derive the ratio from the absolute mouse position
/// within the container; vertical splits accumulate the mouse delta.
fn drag_splitter(ui: &mut Ui, splitter: BoxIdx, container: BoxIdx, axis: Axis, ratio: &mut f32) {
    let signal = ui.signal(splitter);
    let mouse = ui.mouse();

    if signal.clicked {
        ui.box_data::<DragState>(splitter).last_y = mouse.y;
        ui.eat_event();
    }
    if !signal.pressed {
        return;
    }

    let Some(parent) = ui.last_rect(container) else {
        return;
    };

    match axis {
        Axis::X => {
            if parent.width() > 0.0 {
                *ratio = (mouse.x - parent.min.x) / parent.width();
            }
        }
        Axis::Y => {
            let drag = ui.box_data::<DragState>(splitter);
            let dy = mouse.y - drag.last_y;
            drag.last_y = mouse.y;
            if parent.height() > 0.0 {
                *ratio += dy / parent.height();
            }
        }
    }
    *ratio = ratio.clamp(RATIO_MIN, RATIO_MAX);
}

fn build_leaf(
    ui: &mut Ui,
    tabs: &[ViewId],
    active: &mut usize,
    path: &str,
    titles: &mut dyn FnMut(ViewId) -> String,
) -> TileLeaf {
    let mut close_requested = None;

    let pane = ui.push_box(path, "tile-leaf", BoxKind::Container);
    ui.patch(
        pane,
        StylePatch {
            direction: Some(Axis::Y),
            size_x: Some(SizeSpec::PctParent(1.0)),
            size_y: Some(SizeSpec::PctParent(1.0)),
            ..Default::default()
        },
    );

    // Tab strip: one pill per tab, active one highlighted via its id rule.
    let strip = ui.push_box("tabs", "tab-strip", BoxKind::Container);
    ui.patch(
        strip,
        StylePatch {
            direction: Some(Axis::X),
            size_x: Some(SizeSpec::PctParent(1.0)),
            size_y: Some(SizeSpec::Pixels(TAB_STRIP_PX)),
            spacing: Some(2.0),
            ..Default::default()
        },
    );
    for (i, &tab_id) in tabs.iter().enumerate() {
        let pill_id = format!("tab-{tab_id}");
        let tag = if i == *active { "tab-active" } else { "tab" };
        let pill = ui.push_box(&pill_id, tag, BoxKind::Container);
        ui.patch(
            pill,
            StylePatch {
                direction: Some(Axis::X),
                size_y: Some(SizeSpec::Pixels(TAB_STRIP_PX)),
                padding: Some(4.0),
                ..Default::default()
            },
        );

        ui.label("title", &titles(tab_id));
        let close = ui.leaf("close", "tab-close", BoxKind::Label("x".to_string()));
        ui.patch(
            close,
            StylePatch {
                size_x: Some(SizeSpec::Pixels(CLOSE_PX)),
                size_y: Some(SizeSpec::Pixels(CLOSE_PX)),
                ..Default::default()
            },
        );
        // Close is checked before the pill so its click cannot also switch
        // tabs: eating the event hides it from the pill's signal.
        if ui.signal(close).clicked {
            close_requested = Some(tab_id);
            ui.eat_event();
        }
        if ui.signal(pill).clicked {
            *active = i;
            ui.eat_event();
        }
        ui.pop_box();
    }
    ui.pop_box();

    let content = ui.push_box("content", "tile-content", BoxKind::Container);
    ui.patch(
        content,
        StylePatch {
            size_x: Some(SizeSpec::PctParent(1.0)),
            size_y: Some(SizeSpec::PctParent(1.0)),
            ..Default::default()
        },
    );
    ui.pop_box();
    ui.pop_box();

    TileLeaf {
        content,
        active_tab: tabs.get(*active).copied(),
        close_requested,
    }
}
