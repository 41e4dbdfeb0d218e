//! mosaic: an immediate-mode UI toolkit with a text-editing core.
//!
//! The application rebuilds a box tree every frame between
//! [`Ui::begin_frame`] and [`Ui::end_frame`]; per-widget state survives
//! across frames keyed by stable box identity. Rendering, font shaping, and
//! the platform event pump stay behind the [`Renderer`], [`FontShaper`], and
//! event-queue seams — the toolkit itself is single-threaded, synchronous,
//! and frame-driven.
//!
//! One frame is: drain input → rebuild the tree → style cascade → two-pass
//! layout → draw-command submission. Transient failures (an unresolved font,
//! a glyph with no slot) skip work for the frame and self-heal on the next
//! rebuild.

mod config;
mod font;
mod geom;
mod glyph_atlas;
mod layout;
mod render;
mod style;
pub mod testing;
mod text_view;
mod tile;
mod ui;
mod views;

pub use config::{Config, ConfigValue};
pub use font::{FontId, FontShaper, PixelMode, RasterizedGlyph, ShapedGlyph};
pub use geom::{Axis, Rect, Rgba, Vec2, CLEAR, WHITE};
pub use glyph_atlas::{AtlasSlot, GlyphAtlas, GlyphKey};
pub use render::{RectCmd, Renderer, TextureHandle, Vertex};
pub use style::{
    anim, ColorSpec, ConfigSource, MatchContext, Pattern, Pseudo, SizeSpec, Style, StylePatch,
    StyleRule, StyleSheet,
};
pub use text_view::TextEditor;
pub use tile::{build as build_tiles, TileLeaf, TileNode, ViewId, RATIO_MAX, RATIO_MIN};
pub use ui::{BoxIdx, BoxKey, BoxKind, BoxNode, DrawCtx, Signal, Ui, Widget};
pub use views::{View, ViewInstance, ViewStore};
