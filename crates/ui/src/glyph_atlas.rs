//! Glyph atlas: a shared texture of fixed-size slots with LRU eviction.
//!
//! Each slot holds one rasterized glyph and is owned by exactly one
//! `(font, glyph_index)` pair at a time. Slots live in an arena and the LRU
//! list is threaded through them with `prev`/`next` arena indices — no
//! self-referential pointers. A hash map gives O(1) lookup from glyph key
//! to slot.
//!
//! Invariant: every slot is either on the free list, or on the LRU list and
//! present in the map. Never both, never neither.

use std::collections::HashMap;

use tracing::error;

use crate::font::{FontId, FontShaper, PixelMode, RasterizedGlyph, ShapedGlyph};
use crate::geom::Rect;
use crate::render::{Renderer, TextureHandle};

/// Sentinel for absent arena links.
const NIL: usize = usize::MAX;

/// Identifies a glyph within a font.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlyphKey {
    pub font: FontId,
    pub glyph_index: u32,
}

/// A resident glyph's placement within the atlas texture.
///
/// `width`/`height` are the uploaded bitmap's dimensions, which may be
/// smaller than the slot cell (and zero for blank glyphs).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtlasSlot {
    /// Pixel origin of the slot cell within the atlas texture.
    pub x: u32,
    pub y: u32,
    /// Uploaded bitmap dimensions.
    pub width: u32,
    pub height: u32,
    pub bearing_x: i32,
    pub bearing_y: i32,
    pub advance: f32,
    pub pixel_mode: PixelMode,
    pub glyph_index: u32,
}

/// Arena entry: slot data plus intrusive LRU links.
#[derive(Debug)]
struct Slot {
    info: AtlasSlot,
    /// Owning glyph while resident; None while on the free list.
    key: Option<GlyphKey>,
    prev: usize,
    next: usize,
}

/// Texture atlas caching rasterized glyphs with LRU eviction.
#[derive(Debug)]
pub struct GlyphAtlas {
    slots: Vec<Slot>,
    map: HashMap<GlyphKey, usize>,
    free: Vec<usize>,
    /// Most-recently-used slot.
    head: usize,
    /// Least-recently-used slot; the eviction victim.
    tail: usize,
    texture: TextureHandle,
    slot_width: u32,
    slot_height: u32,
    atlas_width: u32,
    atlas_height: u32,
}

impl GlyphAtlas {
    /// Creates an atlas of `cols × rows` slots of the given cell size,
    /// backed by one texture created through the renderer.
    pub fn new(
        renderer: &mut dyn Renderer,
        slot_width: u32,
        slot_height: u32,
        cols: u32,
        rows: u32,
    ) -> Self {
        let atlas_width = slot_width * cols;
        let atlas_height = slot_height * rows;
        let texture = renderer.create_texture(atlas_width, atlas_height);

        let mut slots = Vec::with_capacity((cols * rows) as usize);
        let mut free = Vec::with_capacity((cols * rows) as usize);
        for row in 0..rows {
            for col in 0..cols {
                free.push(slots.len());
                slots.push(Slot {
                    info: AtlasSlot {
                        x: col * slot_width,
                        y: row * slot_height,
                        width: 0,
                        height: 0,
                        bearing_x: 0,
                        bearing_y: 0,
                        advance: 0.0,
                        pixel_mode: PixelMode::Gray,
                        glyph_index: 0,
                    },
                    key: None,
                    prev: NIL,
                    next: NIL,
                });
            }
        }
        // Pop order: lowest-index slots claimed first.
        free.reverse();

        Self {
            slots,
            map: HashMap::new(),
            free,
            head: NIL,
            tail: NIL,
            texture,
            slot_width,
            slot_height,
            atlas_width,
            atlas_height,
        }
    }

    /// Returns the atlas texture handle for binding.
    pub fn texture(&self) -> TextureHandle {
        self.texture
    }

    /// Total slot count.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of glyphs currently resident.
    pub fn resident_count(&self) -> usize {
        self.map.len()
    }

    /// Normalized UV rectangle for a slot's uploaded bitmap.
    pub fn uv_rect(&self, slot: &AtlasSlot) -> Rect {
        Rect {
            min: crate::geom::Vec2::new(
                slot.x as f32 / self.atlas_width as f32,
                slot.y as f32 / self.atlas_height as f32,
            ),
            max: crate::geom::Vec2::new(
                (slot.x + slot.width) as f32 / self.atlas_width as f32,
                (slot.y + slot.height) as f32 / self.atlas_height as f32,
            ),
        }
    }

    /// Returns the atlas slot for a glyph, rasterizing and uploading it if
    /// it is not resident.
    ///
    /// - Cache hit: the slot is re-linked at the MRU end; no texture work.
    /// - Miss with free capacity: a free slot is claimed.
    /// - Miss with a full atlas: the LRU slot is evicted. The renderer's
    ///   pending batch is flushed first, since overwriting the slot's pixels
    ///   would corrupt any in-flight quad referencing its old UVs.
    ///
    /// Whitespace glyphs return `None` (nothing to draw; callers advance the
    /// pen from the shaping advance). A glyph the shaper cannot rasterize
    /// yet also returns `None` and is not cached, so the next frame retries.
    pub fn get_slot(
        &mut self,
        shaper: &mut dyn FontShaper,
        renderer: &mut dyn Renderer,
        font: FontId,
        glyph: &ShapedGlyph,
    ) -> Option<AtlasSlot> {
        if char::from_u32(glyph.codepoint).is_some_and(char::is_whitespace) {
            return None;
        }

        let key = GlyphKey {
            font,
            glyph_index: glyph.glyph_index,
        };

        if let Some(&idx) = self.map.get(&key) {
            self.unlink(idx);
            self.push_mru(idx);
            return Some(self.slots[idx].info);
        }

        let idx = match self.free.pop() {
            Some(idx) => idx,
            None => {
                let victim = self.pop_lru();
                let old_key = self.slots[victim]
                    .key
                    .take()
                    .expect("LRU slot must have an owner");
                self.map.remove(&old_key);
                // The slot's pixels are about to be overwritten.
                renderer.flush();
                victim
            }
        };

        let Some(raster) = shaper.rasterize(font, glyph.glyph_index) else {
            // Font not resolved yet: release the slot and retry next frame.
            self.free.push(idx);
            return None;
        };

        self.upload(renderer, idx, glyph.glyph_index, &raster);

        let slot = &mut self.slots[idx];
        slot.info.bearing_x = raster.bearing_x;
        slot.info.bearing_y = raster.bearing_y;
        slot.info.advance = raster.advance;
        slot.info.pixel_mode = raster.pixel_mode;
        slot.info.glyph_index = glyph.glyph_index;
        slot.key = Some(key);

        self.map.insert(key, idx);
        self.push_mru(idx);
        Some(self.slots[idx].info)
    }

    /// Converts and uploads a rasterized bitmap into the slot's region.
    ///
    /// Oversized bitmaps are logged and left blank; zero-area bitmaps skip
    /// the upload. Either way the slot stays claimed so the glyph is not
    /// re-rasterized every frame.
    fn upload(
        &mut self,
        renderer: &mut dyn Renderer,
        idx: usize,
        glyph_index: u32,
        raster: &RasterizedGlyph,
    ) {
        let slot = &mut self.slots[idx];

        if raster.width > self.slot_width || raster.height > self.slot_height {
            error!(
                glyph_index,
                width = raster.width,
                height = raster.height,
                slot_width = self.slot_width,
                slot_height = self.slot_height,
                "glyph bitmap exceeds atlas slot; leaving blank"
            );
            slot.info.width = 0;
            slot.info.height = 0;
            return;
        }

        slot.info.width = raster.width;
        slot.info.height = raster.height;
        if raster.width == 0 || raster.height == 0 {
            return;
        }

        let rgba = to_rgba(raster);
        renderer.update_texture(
            self.texture,
            slot.info.x,
            slot.info.y,
            raster.width,
            raster.height,
            &rgba,
        );
    }

    // ==================== LRU list ====================

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = (self.slots[idx].prev, self.slots[idx].next);
        if prev != NIL {
            self.slots[prev].next = next;
        } else {
            self.head = next;
        }
        if next != NIL {
            self.slots[next].prev = prev;
        } else {
            self.tail = prev;
        }
        self.slots[idx].prev = NIL;
        self.slots[idx].next = NIL;
    }

    fn push_mru(&mut self, idx: usize) {
        self.slots[idx].prev = NIL;
        self.slots[idx].next = self.head;
        if self.head != NIL {
            self.slots[self.head].prev = idx;
        }
        self.head = idx;
        if self.tail == NIL {
            self.tail = idx;
        }
    }

    fn pop_lru(&mut self) -> usize {
        let idx = self.tail;
        assert!(idx != NIL, "eviction requested from an empty LRU list");
        self.unlink(idx);
        idx
    }

    #[cfg(test)]
    fn check_invariants(&self) {
        use std::collections::HashSet;

        let free: HashSet<usize> = self.free.iter().copied().collect();
        let mut on_lru = HashSet::new();
        let mut idx = self.head;
        let mut prev = NIL;
        while idx != NIL {
            assert_eq!(self.slots[idx].prev, prev);
            on_lru.insert(idx);
            prev = idx;
            idx = self.slots[idx].next;
        }
        assert_eq!(self.tail, prev);

        for i in 0..self.slots.len() {
            let in_free = free.contains(&i);
            let in_lru = on_lru.contains(&i);
            assert!(in_free != in_lru, "slot {i} must be in exactly one list");
            assert_eq!(self.slots[i].key.is_some(), in_lru);
            if let Some(key) = self.slots[i].key {
                assert_eq!(self.map.get(&key), Some(&i));
            }
        }
        assert_eq!(self.map.len(), on_lru.len());
    }
}

/// Converts a rasterized bitmap to RGBA8.
///
/// Gray coverage becomes white RGB with alpha-as-coverage; BGRA color glyphs
/// are copied with the channels reordered. A pixel buffer whose length does
/// not match its declared dimensions is a collaborator wiring bug.
fn to_rgba(raster: &RasterizedGlyph) -> Vec<u8> {
    let pixel_count = (raster.width * raster.height) as usize;
    match raster.pixel_mode {
        PixelMode::Gray => {
            assert_eq!(
                raster.pixels.len(),
                pixel_count,
                "gray bitmap length does not match dimensions"
            );
            let mut out = Vec::with_capacity(pixel_count * 4);
            for &coverage in &raster.pixels {
                out.extend_from_slice(&[0xFF, 0xFF, 0xFF, coverage]);
            }
            out
        }
        PixelMode::Bgra => {
            assert_eq!(
                raster.pixels.len(),
                pixel_count * 4,
                "bgra bitmap length does not match dimensions"
            );
            let mut out = Vec::with_capacity(pixel_count * 4);
            for px in raster.pixels.chunks_exact(4) {
                out.extend_from_slice(&[px[2], px[1], px[0], px[3]]);
            }
            out
        }
    }
}
