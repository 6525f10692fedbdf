//! Quad renderer facade
//!
//! [`TackRenderer`] owns the backend and every GPU resource. Each render
//! frame follows the same sequence:
//!
//! 1. [`TackRenderer::begin_frame`] clears to the background colour;
//! 2. render components queue world quads with [`TackRenderer::submit`];
//! 3. [`TackRenderer::flush_world`] stable-sorts the queue by layer and draws
//!    it relative to the main camera;
//! 4. GUI and console draw immediately in pixel space (`draw_ui_*`);
//! 5. [`TackRenderer::end_frame`] recycles buffers and evicts stale text.

use super::backend::{DrawCall, RenderBackend};
use super::buffer_pool::{BufferPool, DrawShape};
use super::shader::{ShaderRegistry, GUI_SHADER, OBJECT_SHADER};
use super::sprite::{Sprite, SpriteManager, SpriteSheet};
use super::text::{BlockFont, FontRasterizer, TextCache};
use super::vertex::{ui_quad, world_quad, QuadVertex};
use crate::config::RendererSettings;
use crate::foundation::math::{Colour4, ScreenSize, UiRect, Vec2};
use std::path::Path;

/// A world-space quad queued for the current frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldQuad {
    /// Centre in world units
    pub position: Vec2,
    /// Full extents in world units
    pub scale: Vec2,
    /// Clockwise rotation in degrees
    pub rotation: f32,
    /// Vertex colour, multiplied with the texture
    pub colour: Colour4,
    /// Texture, [`Sprite::INVALID`] draws the flat colour
    pub sprite: Sprite,
    /// Draw order, lower layers first
    pub layer: i32,
}

/// View the world pass is drawn from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    /// Camera position in world units
    pub position: Vec2,
    /// Screen dimensions the camera maps onto
    pub screen: ScreenSize,
}

/// Counters for one render frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Indexed draws issued
    pub draw_calls: u32,
    /// World quads drawn
    pub world_quads: u32,
    /// GUI quads drawn
    pub gui_quads: u32,
    /// Live textures
    pub live_sprites: usize,
    /// Buffer pairs held by the pool
    pub pooled_buffers: usize,
    /// Cached text strings
    pub cached_text: usize,
}

/// The renderer
pub struct TackRenderer {
    backend: Box<dyn RenderBackend>,
    screen: ScreenSize,
    background: Colour4,
    vsync: bool,
    vsync_changed: bool,
    shaders: ShaderRegistry,
    sprites: SpriteManager,
    pool: BufferPool,
    white: Sprite,
    world_queue: Vec<WorldQuad>,
    text_cache: TextCache,
    rasterizer: Box<dyn FontRasterizer>,
    frame: u64,
    stats: RenderStats,
    last_stats: RenderStats,
    closed: bool,
}

impl TackRenderer {
    /// Create the renderer, its built-in shaders and the white texture
    pub fn new(
        mut backend: Box<dyn RenderBackend>,
        screen: ScreenSize,
        settings: &RendererSettings,
        vsync: bool,
    ) -> Self {
        backend.set_viewport(screen.width as u32, screen.height as u32);

        let mut shaders = ShaderRegistry::new();
        shaders.load_builtin(backend.as_mut());

        let mut sprites = SpriteManager::new();
        let white = sprites.create(backend.as_mut(), 1, 1, &[255, 255, 255, 255]);

        log::info!(
            "Renderer initialized ({}x{}, vsync {})",
            screen.width,
            screen.height,
            if vsync { "on" } else { "off" }
        );

        Self {
            backend,
            screen,
            background: settings.background_colour,
            vsync,
            vsync_changed: true,
            shaders,
            sprites,
            pool: BufferPool::new(),
            white,
            world_queue: Vec::new(),
            text_cache: TextCache::new(settings.text_cache_frames),
            rasterizer: Box::new(BlockFont),
            frame: 0,
            stats: RenderStats::default(),
            last_stats: RenderStats::default(),
            closed: false,
        }
    }

    /// Replace the font rasterizer, dropping cached text
    pub fn set_font_rasterizer(&mut self, rasterizer: Box<dyn FontRasterizer>) {
        self.text_cache.clear(self.backend.as_mut(), &mut self.sprites);
        self.rasterizer = rasterizer;
    }

    // Frame lifecycle

    /// Clear the framebuffer and start a frame
    pub fn begin_frame(&mut self) {
        self.stats = RenderStats::default();
        self.world_queue.clear();
        self.backend.clear(self.background.to_rgba_f32());
    }

    /// Queue a world quad for [`TackRenderer::flush_world`]
    pub fn submit(&mut self, quad: WorldQuad) {
        self.world_queue.push(quad);
    }

    /// Draw every queued world quad, lowest layer first
    pub fn flush_world(&mut self, view: ViewTransform) {
        let mut queue = std::mem::take(&mut self.world_queue);
        queue.sort_by_key(|quad| quad.layer);

        let program = self.shaders.get_shader(OBJECT_SHADER).handle();
        for quad in &queue {
            let vertices = world_quad(quad.position, quad.scale, quad.rotation, view.position, view.screen, quad.colour);
            let texture = self.resolve(quad.sprite);
            if self.draw_vertices(program, texture, &vertices) {
                self.stats.world_quads += 1;
            }
        }

        queue.clear();
        self.world_queue = queue;
    }

    /// Finish a frame: recycle buffers and evict stale text
    pub fn end_frame(&mut self) {
        self.pool.release_frame();
        let evicted = self.text_cache.evict(self.backend.as_mut(), &mut self.sprites, self.frame);
        if evicted > 0 {
            log::trace!("Evicted {} cached strings", evicted);
        }
        self.frame += 1;

        self.stats.live_sprites = self.sprites.len();
        self.stats.pooled_buffers = self.pool.allocated();
        self.stats.cached_text = self.text_cache.len();
        self.last_stats = self.stats;
    }

    // GUI primitives, pixel space with a top-left origin

    /// Fill a rectangle with a flat colour
    pub fn draw_ui_rect(&mut self, rect: UiRect, colour: Colour4) {
        self.draw_ui_sprite(rect, self.white, colour);
    }

    /// Draw a sprite stretched over a rectangle
    pub fn draw_ui_sprite(&mut self, rect: UiRect, sprite: Sprite, tint: Colour4) {
        let program = self.shaders.get_shader(GUI_SHADER).handle();
        let vertices = ui_quad(rect, self.screen, tint);
        let texture = self.resolve(sprite);
        if self.draw_vertices(program, texture, &vertices) {
            self.stats.gui_quads += 1;
        }
    }

    /// Draw a string with its top-left corner at `position`, returning its bounds
    pub fn draw_ui_text(&mut self, position: Vec2, text: &str, font_size: f32, colour: Colour4) -> UiRect {
        if text.is_empty() {
            return UiRect::new(position.x, position.y, 0.0, 0.0);
        }
        let sprite = self.text_cache.get_or_create(
            self.backend.as_mut(),
            &mut self.sprites,
            self.rasterizer.as_ref(),
            text,
            font_size,
            colour,
            self.frame,
        );
        let rect = UiRect::new(position.x, position.y, sprite.width() as f32, sprite.height() as f32);
        if sprite.is_valid() {
            self.draw_ui_sprite(rect, sprite, Colour4::WHITE);
        }
        rect
    }

    /// Pixel size of a string
    pub fn measure_text(&self, text: &str, font_size: f32) -> Vec2 {
        let (width, height) = self.rasterizer.measure(text, font_size);
        Vec2::new(width as f32, height as f32)
    }

    fn resolve(&self, sprite: Sprite) -> i32 {
        if sprite.is_valid() {
            sprite.texture()
        } else {
            self.white.texture()
        }
    }

    fn draw_vertices(&mut self, program: i32, texture: i32, vertices: &[QuadVertex; 4]) -> bool {
        let Some(buffers) = self.pool.acquire(self.backend.as_mut(), DrawShape::Quad) else {
            return false;
        };
        self.backend.upload_vertices(buffers.vertex_buffer, bytemuck::cast_slice(vertices));
        self.backend.draw_indexed(&DrawCall {
            program,
            texture,
            vertex_buffer: buffers.vertex_buffer,
            index_buffer: buffers.index_buffer,
            index_count: DrawShape::Quad.index_count(),
        });
        self.stats.draw_calls += 1;
        true
    }

    // Sprites

    /// Upload RGBA8 pixels as a sprite
    pub fn create_sprite(&mut self, width: u32, height: u32, rgba: &[u8]) -> Sprite {
        self.sprites.create(self.backend.as_mut(), width, height, rgba)
    }

    /// Load an image file as a sprite
    pub fn load_sprite(&mut self, path: impl AsRef<Path>) -> Sprite {
        self.sprites.load(self.backend.as_mut(), path)
    }

    /// Load an image and slice it into an animation
    pub fn load_sprite_sheet(
        &mut self,
        path: impl AsRef<Path>,
        frame_width: u32,
        frame_height: u32,
        refresh_interval: std::time::Duration,
        looping: bool,
    ) -> SpriteSheet {
        let frames = self
            .sprites
            .load_sheet(self.backend.as_mut(), path, frame_width, frame_height);
        SpriteSheet::new(frames, refresh_interval, looping)
    }

    /// Release a sprite
    pub fn destroy_sprite(&mut self, sprite: Sprite) -> bool {
        self.sprites.destroy(self.backend.as_mut(), sprite)
    }

    /// The sprite registry
    pub fn sprites(&self) -> &SpriteManager {
        &self.sprites
    }

    /// The 1×1 white texture flat colours are drawn with
    pub fn white_sprite(&self) -> Sprite {
        self.white
    }

    // Shaders

    /// Compile and register a custom shader program
    pub fn register_shader(&mut self, name: &str, vertex_source: &str, fragment_source: &str) -> super::ShaderProgram {
        self.shaders.register(self.backend.as_mut(), name, vertex_source, fragment_source)
    }

    /// Look up a shader, falling back to the object shader
    pub fn get_shader(&self, name: &str) -> super::ShaderProgram {
        self.shaders.get_shader(name)
    }

    // State

    /// Screen size in pixels
    pub fn screen_size(&self) -> ScreenSize {
        self.screen
    }

    /// Track a framebuffer resize
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.screen = ScreenSize::from((width, height));
        self.backend.set_viewport(width, height);
    }

    /// Background clear colour
    pub fn background_colour(&self) -> Colour4 {
        self.background
    }

    /// Change the background clear colour
    pub fn set_background_colour(&mut self, colour: Colour4) {
        self.background = colour;
    }

    /// Current vsync setting
    pub fn vsync(&self) -> bool {
        self.vsync
    }

    /// Change vsync, applied by the frame driver before the next swap
    pub fn set_vsync(&mut self, enabled: bool) {
        if self.vsync != enabled {
            self.vsync = enabled;
            self.vsync_changed = true;
        }
    }

    /// Pending vsync change, cleared once read
    pub fn take_vsync_change(&mut self) -> Option<bool> {
        std::mem::take(&mut self.vsync_changed).then_some(self.vsync)
    }

    /// Statistics of the last completed frame
    pub fn stats(&self) -> RenderStats {
        self.last_stats
    }

    /// Completed render frames
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    /// The backend
    pub fn backend(&self) -> &dyn RenderBackend {
        self.backend.as_ref()
    }

    /// The backend, mutably
    pub fn backend_mut(&mut self) -> &mut dyn RenderBackend {
        self.backend.as_mut()
    }

    /// Release every texture, buffer and program
    ///
    /// Safe to call more than once.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.text_cache.clear(self.backend.as_mut(), &mut self.sprites);
        self.sprites.close(self.backend.as_mut());
        self.pool.destroy(self.backend.as_mut());
        self.shaders.close(self.backend.as_mut());
        self.white = Sprite::INVALID;
        self.closed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::HeadlessBackend;
    use approx::assert_relative_eq;

    fn renderer() -> TackRenderer {
        TackRenderer::new(
            Box::new(HeadlessBackend::new()),
            ScreenSize::new(800.0, 600.0),
            &RendererSettings::default(),
            true,
        )
    }

    fn headless(renderer: &mut TackRenderer) -> &mut HeadlessBackend {
        renderer
            .backend_mut()
            .as_any_mut()
            .downcast_mut::<HeadlessBackend>()
            .unwrap()
    }

    fn quad(layer: i32, colour: Colour4) -> WorldQuad {
        WorldQuad {
            position: Vec2::zeros(),
            scale: Vec2::new(10.0, 10.0),
            rotation: 0.0,
            colour,
            sprite: Sprite::INVALID,
            layer,
        }
    }

    fn view() -> ViewTransform {
        ViewTransform {
            position: Vec2::zeros(),
            screen: ScreenSize::new(800.0, 600.0),
        }
    }

    #[test]
    fn test_flat_colour_uses_white_texture() {
        let mut renderer = renderer();
        let white = renderer.white_sprite();
        renderer.begin_frame();
        renderer.submit(quad(0, Colour4::RED));
        renderer.flush_world(view());
        renderer.end_frame();

        let draws = headless(&mut renderer).take_draws();
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].texture, white.texture());
        assert_eq!(draws[0].vertices[0].colour, [1.0, 0.0, 0.0]);
        assert_eq!(renderer.stats().draw_calls, 1);
        assert_eq!(renderer.stats().world_quads, 1);
    }

    #[test]
    fn test_world_pass_sorts_by_layer_stably() {
        let mut renderer = renderer();
        renderer.begin_frame();
        renderer.submit(quad(2, Colour4::RED));
        renderer.submit(quad(0, Colour4::GREEN));
        renderer.submit(quad(2, Colour4::BLUE));
        renderer.flush_world(view());

        let colours: Vec<[f32; 3]> = headless(&mut renderer)
            .take_draws()
            .iter()
            .map(|draw| draw.vertices[0].colour)
            .collect();
        assert_eq!(colours, vec![[0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]]);
    }

    #[test]
    fn test_buffers_are_pooled_between_frames() {
        let mut renderer = renderer();
        for _ in 0..3 {
            renderer.begin_frame();
            renderer.submit(quad(0, Colour4::WHITE));
            renderer.submit(quad(0, Colour4::WHITE));
            renderer.flush_world(view());
            renderer.end_frame();
        }
        assert_eq!(renderer.stats().pooled_buffers, 2);
        assert_eq!(headless(&mut renderer).buffers_created(), 4);
    }

    #[test]
    fn test_ui_rect_top_left_maps_to_upper_left_ndc() {
        let mut renderer = renderer();
        renderer.begin_frame();
        renderer.draw_ui_rect(UiRect::new(0.0, 0.0, 400.0, 300.0), Colour4::WHITE);

        let draws = headless(&mut renderer).take_draws();
        let top_left = draws[0].vertices[3].position;
        let bottom_right = draws[0].vertices[1].position;
        assert_relative_eq!(top_left[0], -1.0);
        assert_relative_eq!(top_left[1], 1.0);
        assert_relative_eq!(bottom_right[0], 0.0);
        assert_relative_eq!(bottom_right[1], 0.0);
    }

    #[test]
    fn test_gui_uses_gui_shader() {
        let mut renderer = renderer();
        let gui = renderer.get_shader(GUI_SHADER).handle();
        renderer.begin_frame();
        renderer.draw_ui_text(Vec2::new(5.0, 5.0), "hello", 12.0, Colour4::WHITE);
        let draws = headless(&mut renderer).take_draws();
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].program, gui);
    }

    #[test]
    fn test_text_bounds_match_measurement() {
        let mut renderer = renderer();
        renderer.begin_frame();
        let bounds = renderer.draw_ui_text(Vec2::new(10.0, 20.0), "abc", 10.0, Colour4::WHITE);
        let measured = renderer.measure_text("abc", 10.0);
        assert_relative_eq!(bounds.width, measured.x);
        assert_relative_eq!(bounds.height, measured.y);

        let empty = renderer.draw_ui_text(Vec2::new(10.0, 20.0), "", 10.0, Colour4::WHITE);
        assert_relative_eq!(empty.width, 0.0);
    }

    #[test]
    fn test_clear_uses_background_colour() {
        let mut renderer = renderer();
        renderer.set_background_colour(Colour4::BLUE);
        renderer.begin_frame();
        assert_eq!(headless(&mut renderer).last_clear_colour(), Some([0.0, 0.0, 1.0, 1.0]));
    }

    #[test]
    fn test_vsync_change_is_reported_once() {
        let mut renderer = renderer();
        assert_eq!(renderer.take_vsync_change(), Some(true));
        assert_eq!(renderer.take_vsync_change(), None);

        renderer.set_vsync(false);
        assert_eq!(renderer.take_vsync_change(), Some(false));
        renderer.set_vsync(false);
        assert_eq!(renderer.take_vsync_change(), None);
    }

    #[test]
    fn test_close_releases_gpu_resources() {
        let mut renderer = renderer();
        renderer.begin_frame();
        renderer.submit(quad(0, Colour4::WHITE));
        renderer.flush_world(view());
        renderer.draw_ui_text(Vec2::zeros(), "x", 12.0, Colour4::WHITE);
        renderer.end_frame();

        renderer.close();
        renderer.close();
        let backend = headless(&mut renderer);
        assert_eq!(backend.live_textures(), 0);
        assert_eq!(backend.live_buffers(), 0);
        assert_eq!(backend.live_programs(), 0);
        assert_eq!(backend.invalid_deletes(), 0);
    }
}
