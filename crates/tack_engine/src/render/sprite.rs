//! Sprites, sprite sheets and the sprite registry
//!
//! A [`Sprite`] wraps a backend texture handle. Handles `<= 0` are invalid.
//! The [`SpriteManager`] is the single owner of every live texture: it
//! creates them, releases each exactly once and tears all of them down at
//! unload.

use super::backend::RenderBackend;
use std::collections::HashMap;
use std::path::Path;
use std::time::{Duration, Instant};

/// Handle to a texture owned by the [`SpriteManager`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sprite {
    texture: i32,
    width: u32,
    height: u32,
}

impl Sprite {
    /// The unallocated sprite
    pub const INVALID: Self = Self {
        texture: 0,
        width: 0,
        height: 0,
    };

    /// Backend texture handle
    pub fn texture(&self) -> i32 {
        self.texture
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether the sprite refers to an allocated texture
    pub fn is_valid(&self) -> bool {
        self.texture > 0
    }
}

impl Default for Sprite {
    fn default() -> Self {
        Self::INVALID
    }
}

/// Registry of every live texture
#[derive(Debug, Default)]
pub struct SpriteManager {
    live: HashMap<i32, Sprite>,
}

impl SpriteManager {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Upload RGBA8 pixels (rows top to bottom) as a new sprite
    ///
    /// Rows are flipped before upload so texture coordinate `v = 1` is the
    /// top of the image. On failure an error is logged and
    /// [`Sprite::INVALID`] returned.
    pub fn create(&mut self, backend: &mut dyn RenderBackend, width: u32, height: u32, rgba: &[u8]) -> Sprite {
        if width == 0 || height == 0 || rgba_len(width, height) != Some(rgba.len()) {
            log::error!(
                "Sprite data does not match {}x{} RGBA ({} bytes)",
                width,
                height,
                rgba.len()
            );
            return Sprite::INVALID;
        }

        let row = width as usize * 4;
        let flipped: Vec<u8> = rgba.chunks_exact(row).rev().flatten().copied().collect();
        let texture = backend.create_texture(width, height, &flipped);
        if texture <= 0 {
            log::error!("Backend failed to create a {}x{} texture", width, height);
            return Sprite::INVALID;
        }

        let sprite = Sprite { texture, width, height };
        self.add(sprite);
        sprite
    }

    /// Load an image file as a sprite
    pub fn load(&mut self, backend: &mut dyn RenderBackend, path: impl AsRef<Path>) -> Sprite {
        let path = path.as_ref();
        match image::open(path) {
            Ok(image) => {
                let rgba = image.to_rgba8();
                let sprite = self.create(backend, rgba.width(), rgba.height(), rgba.as_raw());
                if sprite.is_valid() {
                    log::debug!("Loaded sprite {} ({}x{})", path.display(), sprite.width, sprite.height);
                }
                sprite
            }
            Err(err) => {
                log::error!("Failed to load sprite {}: {}", path.display(), err);
                Sprite::INVALID
            }
        }
    }

    /// Load an image and slice it into equally sized frames
    ///
    /// Frames are read left to right, top to bottom. Partial frames at the
    /// right or bottom edge are ignored.
    pub fn load_sheet(
        &mut self,
        backend: &mut dyn RenderBackend,
        path: impl AsRef<Path>,
        frame_width: u32,
        frame_height: u32,
    ) -> Vec<Sprite> {
        let path = path.as_ref();
        let image = match image::open(path) {
            Ok(image) => image.to_rgba8(),
            Err(err) => {
                log::error!("Failed to load sprite sheet {}: {}", path.display(), err);
                return Vec::new();
            }
        };
        self.slice_sheet(backend, image.width(), image.height(), image.as_raw(), frame_width, frame_height)
    }

    /// Slice RGBA8 pixels into equally sized frame sprites
    pub fn slice_sheet(
        &mut self,
        backend: &mut dyn RenderBackend,
        width: u32,
        height: u32,
        rgba: &[u8],
        frame_width: u32,
        frame_height: u32,
    ) -> Vec<Sprite> {
        if frame_width == 0 || frame_height == 0 || frame_width > width || frame_height > height {
            log::error!(
                "Invalid sprite sheet frame size {}x{} for a {}x{} image",
                frame_width,
                frame_height,
                width,
                height
            );
            return Vec::new();
        }
        if rgba_len(width, height) != Some(rgba.len()) {
            log::error!("Sprite sheet data does not match {}x{} RGBA", width, height);
            return Vec::new();
        }

        let (width, frame_width, frame_height) = (width as usize, frame_width as usize, frame_height as usize);
        let rows = height as usize / frame_height;
        let columns = width / frame_width;
        let frame_row = frame_width * 4;

        let mut frames = Vec::with_capacity(rows * columns);
        for row in 0..rows {
            for column in 0..columns {
                let mut pixels = Vec::with_capacity(frame_row * frame_height);
                for y in 0..frame_height {
                    let start = ((row * frame_height + y) * width + column * frame_width) * 4;
                    pixels.extend_from_slice(&rgba[start..start + frame_row]);
                }
                frames.push(self.create(backend, frame_width as u32, frame_height as u32, &pixels));
            }
        }
        frames
    }

    /// Start tracking a sprite
    ///
    /// Adding a sprite twice logs an error and returns false.
    pub fn add(&mut self, sprite: Sprite) -> bool {
        if !sprite.is_valid() {
            log::error!("Refusing to register an invalid sprite");
            return false;
        }
        if self.live.contains_key(&sprite.texture) {
            log::error!("Sprite {} is already registered", sprite.texture);
            return false;
        }
        self.live.insert(sprite.texture, sprite);
        true
    }

    /// Stop tracking a sprite without releasing it
    ///
    /// Removing an unregistered sprite logs an error and returns false.
    pub fn remove(&mut self, sprite: Sprite) -> bool {
        if self.live.remove(&sprite.texture).is_none() {
            log::error!("Sprite {} is not registered", sprite.texture);
            return false;
        }
        true
    }

    /// Release a sprite's texture
    ///
    /// Only registered sprites reach the backend, so a second destroy of the
    /// same sprite is logged and never double-frees.
    pub fn destroy(&mut self, backend: &mut dyn RenderBackend, sprite: Sprite) -> bool {
        if !self.remove(sprite) {
            return false;
        }
        backend.delete_texture(sprite.texture);
        true
    }

    /// Whether a sprite is registered
    pub fn contains(&self, sprite: Sprite) -> bool {
        self.live.contains_key(&sprite.texture)
    }

    /// Number of live sprites
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Whether no sprite is live
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Release every live sprite
    pub fn close(&mut self, backend: &mut dyn RenderBackend) {
        let count = self.live.len();
        for (texture, _) in self.live.drain() {
            backend.delete_texture(texture);
        }
        log::info!("Sprite manager closed, released {} textures", count);
    }
}

/// Byte length of a `width` x `height` RGBA8 image, `None` on overflow
pub(crate) fn rgba_len(width: u32, height: u32) -> Option<usize> {
    (width as usize).checked_mul(height as usize)?.checked_mul(4)
}

/// Frames of an animation advanced on wall-clock time
#[derive(Debug, Clone)]
pub struct SpriteSheet {
    frames: Vec<Sprite>,
    current: usize,
    refresh_interval: Duration,
    looping: bool,
    last_advance: Option<Instant>,
}

impl SpriteSheet {
    /// Create an animation showing each frame for `refresh_interval`
    pub fn new(frames: Vec<Sprite>, refresh_interval: Duration, looping: bool) -> Self {
        Self {
            frames,
            current: 0,
            refresh_interval,
            looping,
            last_advance: None,
        }
    }

    /// Move forward one frame per refresh interval elapsed since the last move
    ///
    /// Leftover time carries into the next call so playback keeps pace with
    /// the wall clock. Past the last frame a looping sheet wraps around, a
    /// non-looping one holds.
    pub fn advance(&mut self, now: Instant) {
        let Some(last) = self.last_advance else {
            self.last_advance = Some(now);
            return;
        };
        let elapsed = now.saturating_duration_since(last);
        if elapsed < self.refresh_interval || self.frames.is_empty() {
            return;
        }

        let interval = self.refresh_interval.as_nanos();
        let (steps, leftover) = if interval == 0 {
            (1, 0)
        } else {
            (elapsed.as_nanos() / interval, elapsed.as_nanos() % interval)
        };
        let leftover = Duration::from_nanos(u64::try_from(leftover).unwrap_or(u64::MAX));
        self.last_advance = Some(now.checked_sub(leftover).unwrap_or(now));

        let count = self.frames.len() as u128;
        let target = self.current as u128 + steps;
        let next = if self.looping { target % count } else { target.min(count - 1) };
        self.current = usize::try_from(next).unwrap_or(self.frames.len() - 1);
    }

    /// Sprite for the current frame
    pub fn current_frame(&self) -> Sprite {
        self.frames.get(self.current).copied().unwrap_or(Sprite::INVALID)
    }

    /// Index of the current frame
    pub fn frame_index(&self) -> usize {
        self.current
    }

    /// Number of frames
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Whether a non-looping sheet has reached its last frame
    pub fn is_finished(&self) -> bool {
        !self.looping && self.current + 1 >= self.frames.len()
    }

    /// Restart from the first frame
    pub fn reset(&mut self) {
        self.current = 0;
        self.last_advance = None;
    }

    /// All frames
    pub fn frames(&self) -> &[Sprite] {
        &self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::HeadlessBackend;

    fn pixels(width: u32, height: u32) -> Vec<u8> {
        vec![255; (width * height * 4) as usize]
    }

    #[test]
    fn test_create_registers_sprite() {
        let mut backend = HeadlessBackend::new();
        let mut sprites = SpriteManager::new();

        let sprite = sprites.create(&mut backend, 2, 3, &pixels(2, 3));
        assert!(sprite.is_valid());
        assert!(sprites.contains(sprite));
        assert_eq!(backend.texture_size(sprite.texture()), Some((2, 3)));
    }

    #[test]
    fn test_bad_data_yields_invalid_sprite() {
        let mut backend = HeadlessBackend::new();
        let mut sprites = SpriteManager::new();
        let sprite = sprites.create(&mut backend, 4, 4, &[0; 3]);
        assert!(!sprite.is_valid());
        assert!(sprites.is_empty());
    }

    #[test]
    fn test_destroy_twice_does_not_double_free() {
        let mut backend = HeadlessBackend::new();
        let mut sprites = SpriteManager::new();
        let sprite = sprites.create(&mut backend, 1, 1, &pixels(1, 1));

        assert!(sprites.destroy(&mut backend, sprite));
        assert!(!sprites.destroy(&mut backend, sprite));
        assert_eq!(backend.texture_deletes(), 1);
        assert_eq!(backend.invalid_deletes(), 0);
    }

    #[test]
    fn test_duplicate_add_is_rejected() {
        let mut backend = HeadlessBackend::new();
        let mut sprites = SpriteManager::new();
        let sprite = sprites.create(&mut backend, 1, 1, &pixels(1, 1));
        assert!(!sprites.add(sprite));
        assert_eq!(sprites.len(), 1);
    }

    #[test]
    fn test_close_releases_all() {
        let mut backend = HeadlessBackend::new();
        let mut sprites = SpriteManager::new();
        sprites.create(&mut backend, 1, 1, &pixels(1, 1));
        sprites.create(&mut backend, 1, 1, &pixels(1, 1));

        sprites.close(&mut backend);
        assert!(sprites.is_empty());
        assert_eq!(backend.live_textures(), 0);
    }

    #[test]
    fn test_slice_sheet() {
        let mut backend = HeadlessBackend::new();
        let mut sprites = SpriteManager::new();
        let frames = sprites.slice_sheet(&mut backend, 8, 4, &pixels(8, 4), 2, 2);
        assert_eq!(frames.len(), 8);
        assert!(frames.iter().all(|frame| frame.width() == 2 && frame.height() == 2));

        assert!(sprites.slice_sheet(&mut backend, 8, 4, &pixels(8, 4), 16, 2).is_empty());
    }

    #[test]
    fn test_load_from_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tile.png");
        image::RgbaImage::from_pixel(4, 2, image::Rgba([10, 20, 30, 255]))
            .save(&path)
            .unwrap();

        let mut backend = HeadlessBackend::new();
        let mut sprites = SpriteManager::new();
        let sprite = sprites.load(&mut backend, &path);
        assert_eq!((sprite.width(), sprite.height()), (4, 2));

        let frames = sprites.load_sheet(&mut backend, &path, 2, 2);
        assert_eq!(frames.len(), 2);
    }

    #[test]
    fn test_missing_file_yields_invalid_sprite() {
        let mut backend = HeadlessBackend::new();
        let mut sprites = SpriteManager::new();
        assert!(!sprites.load(&mut backend, "does/not/exist.png").is_valid());
    }

    fn sheet(looping: bool) -> SpriteSheet {
        let mut backend = HeadlessBackend::new();
        let mut sprites = SpriteManager::new();
        let frames = sprites.slice_sheet(&mut backend, 3, 1, &pixels(3, 1), 1, 1);
        SpriteSheet::new(frames, Duration::from_millis(100), looping)
    }

    #[test]
    fn test_sheet_loops() {
        let mut animation = sheet(true);
        let start = Instant::now();
        animation.advance(start);
        assert_eq!(animation.frame_index(), 0);

        animation.advance(start + Duration::from_millis(50));
        assert_eq!(animation.frame_index(), 0);

        animation.advance(start + Duration::from_millis(100));
        animation.advance(start + Duration::from_millis(200));
        assert_eq!(animation.frame_index(), 2);

        animation.advance(start + Duration::from_millis(300));
        assert_eq!(animation.frame_index(), 0);
    }

    #[test]
    fn test_sheet_holds_last_frame() {
        let mut animation = sheet(false);
        let start = Instant::now();
        animation.advance(start);
        for step in 1..=5 {
            animation.advance(start + Duration::from_millis(100 * step));
        }
        assert_eq!(animation.frame_index(), 2);
        assert!(animation.is_finished());

        animation.reset();
        assert_eq!(animation.frame_index(), 0);
    }

    #[test]
    fn test_sheet_catches_up_after_a_slow_frame() {
        let mut animation = sheet(true);
        let start = Instant::now();
        animation.advance(start);

        // 250 ms is two whole intervals, the remaining 50 ms carries over
        animation.advance(start + Duration::from_millis(250));
        assert_eq!(animation.frame_index(), 2);
        animation.advance(start + Duration::from_millis(300));
        assert_eq!(animation.frame_index(), 0);

        // Seven intervals on three frames wraps to frame 1
        animation.advance(start + Duration::from_millis(1000));
        assert_eq!(animation.frame_index(), 1);

        let mut once = sheet(false);
        once.advance(start);
        once.advance(start + Duration::from_secs(10));
        assert_eq!(once.frame_index(), 2);
        assert!(once.is_finished());
    }

    #[test]
    fn test_oversized_dimensions_are_rejected() {
        let mut backend = HeadlessBackend::new();
        let mut sprites = SpriteManager::new();
        assert_eq!(rgba_len(2, 3), Some(24));
        assert_eq!(rgba_len(u32::MAX, u32::MAX), None);
        assert!(!sprites.create(&mut backend, u32::MAX, u32::MAX, &[0; 16]).is_valid());
        assert!(sprites
            .slice_sheet(&mut backend, u32::MAX, u32::MAX, &[0; 16], 1, 1)
            .is_empty());
        assert!(sprites.is_empty());
    }

    #[test]
    fn test_empty_sheet_is_invalid() {
        let animation = SpriteSheet::new(Vec::new(), Duration::from_millis(10), true);
        assert!(!animation.current_frame().is_valid());
    }
}
