//! Text rasterization and the rasterized-string cache

use super::backend::RenderBackend;
use super::sprite::{Sprite, SpriteManager};
use crate::foundation::math::Colour4;
use std::collections::HashMap;

/// RGBA8 pixels of a rasterized string, rows top to bottom
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterizedText {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Pixel data, `width * height * 4` bytes
    pub pixels: Vec<u8>,
}

/// Turns strings into texture-uploadable pixel buffers
pub trait FontRasterizer {
    /// Pixel size of `text` at `font_size`
    fn measure(&self, text: &str, font_size: f32) -> (u32, u32);

    /// Draw `text` into a new pixel buffer
    fn rasterize(&self, text: &str, font_size: f32, colour: Colour4) -> RasterizedText;
}

/// Fixed-advance rasterizer drawing every visible character as a block
///
/// Used when no real font is installed; keeps layout and sizing correct.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockFont;

impl BlockFont {
    fn cell(font_size: f32) -> (u32, u32) {
        let height = font_size.max(1.0).round() as u32;
        let width = (font_size * 0.6).max(1.0).round() as u32;
        (width, height)
    }
}

impl FontRasterizer for BlockFont {
    fn measure(&self, text: &str, font_size: f32) -> (u32, u32) {
        let (cell_width, cell_height) = Self::cell(font_size);
        (cell_width * text.chars().count() as u32, cell_height)
    }

    fn rasterize(&self, text: &str, font_size: f32, colour: Colour4) -> RasterizedText {
        let (cell_width, cell_height) = Self::cell(font_size);
        let (width, height) = self.measure(text, font_size);
        let mut pixels = vec![0u8; (width * height * 4) as usize];
        let margin_x = (cell_width / 6).max(1).min(cell_width / 2);
        let margin_y = (cell_height / 6).max(1).min(cell_height / 2);

        for (index, character) in text.chars().enumerate() {
            if character.is_whitespace() {
                continue;
            }
            let origin = index as u32 * cell_width;
            for y in margin_y..cell_height - margin_y {
                for x in margin_x..cell_width - margin_x {
                    let offset = ((y * width + origin + x) * 4) as usize;
                    pixels[offset..offset + 4].copy_from_slice(&[colour.r, colour.g, colour.b, colour.a]);
                }
            }
        }

        RasterizedText { width, height, pixels }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TextKey {
    text: String,
    font_size_bits: u32,
    colour: Colour4,
}

#[derive(Debug)]
struct CachedText {
    sprite: Sprite,
    last_used_frame: u64,
}

/// Cache of rasterized strings
///
/// Entries unused for more than `max_idle_frames` render frames are evicted
/// and their textures released.
#[derive(Debug)]
pub struct TextCache {
    entries: HashMap<TextKey, CachedText>,
    max_idle_frames: u64,
}

impl TextCache {
    /// Create an empty cache
    pub fn new(max_idle_frames: u64) -> Self {
        Self {
            entries: HashMap::new(),
            max_idle_frames,
        }
    }

    /// Sprite for `text`, rasterizing it on first use
    pub fn get_or_create(
        &mut self,
        backend: &mut dyn RenderBackend,
        sprites: &mut SpriteManager,
        rasterizer: &dyn FontRasterizer,
        text: &str,
        font_size: f32,
        colour: Colour4,
        frame: u64,
    ) -> Sprite {
        let key = TextKey {
            text: text.to_string(),
            font_size_bits: font_size.to_bits(),
            colour,
        };
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.last_used_frame = frame;
            return entry.sprite;
        }

        let raster = rasterizer.rasterize(text, font_size, colour);
        let sprite = sprites.create(backend, raster.width, raster.height, &raster.pixels);
        if sprite.is_valid() {
            self.entries.insert(
                key,
                CachedText {
                    sprite,
                    last_used_frame: frame,
                },
            );
        }
        sprite
    }

    /// Release entries idle since before `frame - max_idle_frames`
    pub fn evict(&mut self, backend: &mut dyn RenderBackend, sprites: &mut SpriteManager, frame: u64) -> usize {
        let max_idle = self.max_idle_frames;
        let mut evicted = 0;
        self.entries.retain(|_, entry| {
            let keep = frame.saturating_sub(entry.last_used_frame) <= max_idle;
            if !keep {
                sprites.destroy(backend, entry.sprite);
                evicted += 1;
            }
            keep
        });
        evicted
    }

    /// Number of cached strings
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Release every cached texture
    pub fn clear(&mut self, backend: &mut dyn RenderBackend, sprites: &mut SpriteManager) {
        for (_, entry) in self.entries.drain() {
            sprites.destroy(backend, entry.sprite);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::HeadlessBackend;

    #[test]
    fn test_block_font_measures_per_character() {
        assert_eq!(BlockFont.measure("abcd", 10.0), (24, 10));
        assert_eq!(BlockFont.measure("", 10.0), (0, 10));
    }

    #[test]
    fn test_block_font_leaves_spaces_blank() {
        let raster = BlockFont.rasterize("a b", 10.0, Colour4::RED);
        assert_eq!(raster.pixels.len(), (18 * 10 * 4) as usize);

        let pixel = |x: u32, y: u32| {
            let offset = ((y * raster.width + x) * 4) as usize;
            raster.pixels[offset..offset + 4].to_vec()
        };
        assert_eq!(pixel(3, 5), vec![255, 0, 0, 255]);
        assert_eq!(pixel(9, 5), vec![0, 0, 0, 0]);
        assert_eq!(pixel(15, 5), vec![255, 0, 0, 255]);
    }

    #[test]
    fn test_cache_reuses_and_evicts() {
        let mut backend = HeadlessBackend::new();
        let mut sprites = SpriteManager::new();
        let mut cache = TextCache::new(2);

        let first = cache.get_or_create(&mut backend, &mut sprites, &BlockFont, "hi", 12.0, Colour4::WHITE, 0);
        let again = cache.get_or_create(&mut backend, &mut sprites, &BlockFont, "hi", 12.0, Colour4::WHITE, 1);
        assert_eq!(first, again);
        assert_eq!(sprites.len(), 1);

        assert_eq!(cache.evict(&mut backend, &mut sprites, 3), 0);
        assert_eq!(cache.evict(&mut backend, &mut sprites, 4), 1);
        assert!(cache.is_empty());
        assert!(sprites.is_empty());
        assert_eq!(backend.live_textures(), 0);
    }

    #[test]
    fn test_empty_string_is_not_cached() {
        let mut backend = HeadlessBackend::new();
        let mut sprites = SpriteManager::new();
        let mut cache = TextCache::new(2);
        let sprite = cache.get_or_create(&mut backend, &mut sprites, &BlockFont, "", 12.0, Colour4::WHITE, 0);
        assert!(!sprite.is_valid());
        assert!(cache.is_empty());
    }
}
