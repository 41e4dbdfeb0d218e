//! Test doubles for the collaborator traits.
//!
//! Used by this crate's own tests; exported so integration tests and
//! downstream consumers can drive the toolkit without a real GPU or font
//! stack.

use mosaic_input::Clipboard;

use crate::font::{FontId, FontShaper, PixelMode, RasterizedGlyph, ShapedGlyph};
use crate::render::{RectCmd, Renderer, TextureHandle, Vertex};

/// A monospace shaper stub: every character is one glyph, one cell wide,
/// with `glyph_index == codepoint`. Counts rasterize calls so tests can
/// assert cache hits.
#[derive(Debug)]
pub struct FixedShaper {
    pub cell_width: f32,
    pub line_height: f32,
    pub ascent: f32,
    /// Bitmap size returned for every glyph.
    pub glyph_size: (u32, u32),
    /// Glyph indices that rasterize to a deliberately oversized bitmap.
    pub oversize_glyphs: Vec<u32>,
    /// Incremented on every `rasterize` call.
    pub rasterize_calls: u64,
}

impl Default for FixedShaper {
    fn default() -> Self {
        Self {
            cell_width: 8.0,
            line_height: 16.0,
            ascent: 12.0,
            glyph_size: (8, 16),
            oversize_glyphs: Vec::new(),
            rasterize_calls: 0,
        }
    }
}

impl FontShaper for FixedShaper {
    fn shape(&mut self, _font: FontId, text: &str) -> Vec<ShapedGlyph> {
        text.chars()
            .enumerate()
            .map(|(i, ch)| ShapedGlyph {
                x: i as f32 * self.cell_width,
                y: 0.0,
                x_advance: self.cell_width,
                y_advance: 0.0,
                codepoint: ch as u32,
                glyph_index: ch as u32,
            })
            .collect()
    }

    fn rasterize(&mut self, _font: FontId, glyph_index: u32) -> Option<RasterizedGlyph> {
        self.rasterize_calls += 1;
        let (w, h) = if self.oversize_glyphs.contains(&glyph_index) {
            (self.glyph_size.0 * 4, self.glyph_size.1 * 4)
        } else {
            self.glyph_size
        };
        Some(RasterizedGlyph {
            width: w,
            height: h,
            bearing_x: 0,
            bearing_y: self.ascent as i32,
            advance: self.cell_width,
            pixel_mode: PixelMode::Gray,
            pixels: vec![0xFF; (w * h) as usize],
        })
    }

    fn line_height(&self, _font: FontId) -> f32 {
        self.line_height
    }

    fn ascent(&self, _font: FontId) -> f32 {
        self.ascent
    }
}

/// An in-memory clipboard.
#[derive(Debug, Default)]
pub struct MemClipboard {
    pub contents: Option<String>,
}

impl Clipboard for MemClipboard {
    fn get(&mut self) -> Option<String> {
        self.contents.clone()
    }

    fn set(&mut self, text: &str) {
        self.contents = Some(text.to_string());
    }
}

/// A renderer that records commands instead of drawing.
#[derive(Debug, Default)]
pub struct CollectRenderer {
    pub rects: Vec<RectCmd>,
    pub vertices: Vec<Vertex>,
    pub flush_count: u64,
    pub bound_texture: Option<TextureHandle>,
    /// (texture, x, y, width, height, byte length) per upload.
    pub uploads: Vec<(TextureHandle, u32, u32, u32, u32, usize)>,
    next_texture: TextureHandle,
}

impl Renderer for CollectRenderer {
    fn submit_rect(&mut self, cmd: &RectCmd) -> &mut [Vertex] {
        self.rects.push(cmd.clone());

        let r = cmd.rect;
        let uv = cmd.texture_rect.unwrap_or_default();
        let bottom = cmd.color2.unwrap_or(cmd.color);
        self.vertices.extend_from_slice(&[
            Vertex { position: [r.min.x, r.min.y], uv: [uv.min.x, uv.min.y], color: cmd.color },
            Vertex { position: [r.max.x, r.min.y], uv: [uv.max.x, uv.min.y], color: cmd.color },
            Vertex { position: [r.min.x, r.max.y], uv: [uv.min.x, uv.max.y], color: bottom },
            Vertex { position: [r.max.x, r.max.y], uv: [uv.max.x, uv.max.y], color: bottom },
        ]);
        let len = self.vertices.len();
        &mut self.vertices[len - 4..]
    }

    fn bind_texture(&mut self, texture: TextureHandle) {
        self.bound_texture = Some(texture);
    }

    fn flush(&mut self) {
        self.flush_count += 1;
    }

    fn create_texture(&mut self, _width: u32, _height: u32) -> TextureHandle {
        self.next_texture += 1;
        self.next_texture
    }

    fn update_texture(
        &mut self,
        texture: TextureHandle,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) {
        self.uploads.push((texture, x, y, width, height, rgba.len()));
    }
}
