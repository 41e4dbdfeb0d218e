//! Renderer collaborator interface.
//!
//! The toolkit emits abstract rectangle draw commands; a platform integration
//! turns them into GPU work. Commands are batched by the renderer and only
//! reach the GPU on [`Renderer::flush`] — which the glyph atlas forces before
//! reassigning a slot, so no in-flight quad samples stale atlas pixels.

use crate::geom::{Rect, Rgba, CLEAR};

/// Opaque texture identifier minted by the renderer.
pub type TextureHandle = u64;

/// One vertex of an emitted quad.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// Position in screen coordinates (pixels).
    pub position: [f32; 2],
    /// Texture UV coordinates (normalized 0-1).
    pub uv: [f32; 2],
    /// Vertex color, multiplied with the sampled texel.
    pub color: Rgba,
}

/// A rectangle draw command.
///
/// `color2`, when set, is applied to the bottom two vertices for a vertical
/// gradient. `texture_rect` gives normalized UVs into the currently bound
/// texture; untextured rects sample a solid white texel.
#[derive(Debug, Clone, PartialEq)]
pub struct RectCmd {
    pub rect: Rect,
    pub color: Rgba,
    pub color2: Option<Rgba>,
    /// Corner radius in pixels.
    pub radius: f32,
    /// Border thickness in pixels; 0 = filled.
    pub border: f32,
    pub border_color: Rgba,
    /// Drop shadow softness in pixels; 0 = none.
    pub shadow: f32,
    pub texture_rect: Option<Rect>,
}

impl RectCmd {
    /// A solid fill with everything else off.
    pub fn fill(rect: Rect, color: Rgba) -> Self {
        Self {
            rect,
            color,
            color2: None,
            radius: 0.0,
            border: 0.0,
            border_color: CLEAR,
            shadow: 0.0,
            texture_rect: None,
        }
    }
}

/// The renderer collaborator.
pub trait Renderer {
    /// Appends a rect to the current batch and returns the four emitted
    /// vertices for in-place mutation (selection tinting and the like).
    fn submit_rect(&mut self, cmd: &RectCmd) -> &mut [Vertex];

    /// Binds the texture sampled by subsequent rects.
    fn bind_texture(&mut self, texture: TextureHandle);

    /// Submits the pending batch to the GPU.
    fn flush(&mut self);

    /// Creates an RGBA8 texture of the given pixel dimensions.
    fn create_texture(&mut self, width: u32, height: u32) -> TextureHandle;

    /// Uploads RGBA8 pixels into a region of a texture.
    fn update_texture(
        &mut self,
        texture: TextureHandle,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        rgba: &[u8],
    );
}
