//! Backend abstraction trait for the quad renderer
//!
//! The trait is shaped after a minimal OpenGL surface: integer handles for
//! textures, buffers and programs, where any handle `<= 0` is invalid.
//! Creation failures are reported by returning an invalid handle, matching
//! how GL reports them, and callers check before use.

use super::RenderError;
use std::any::Any;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, RenderError>;

/// One indexed triangle draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCall {
    /// Shader program
    pub program: i32,
    /// Bound texture
    pub texture: i32,
    /// Vertex buffer holding the interleaved quad vertices
    pub vertex_buffer: i32,
    /// Index buffer
    pub index_buffer: i32,
    /// Number of indices to draw
    pub index_count: u32,
}

/// Main rendering backend trait
pub trait RenderBackend {
    /// Clear the framebuffer to an RGBA colour
    fn clear(&mut self, colour: [f32; 4]);

    /// Set the viewport size in pixels
    fn set_viewport(&mut self, width: u32, height: u32);

    /// Upload RGBA8 pixels as a texture, returning `<= 0` on failure
    fn create_texture(&mut self, width: u32, height: u32, rgba: &[u8]) -> i32;

    /// Release a texture
    fn delete_texture(&mut self, texture: i32);

    /// Allocate an empty buffer, returning `<= 0` on failure
    fn create_buffer(&mut self) -> i32;

    /// Replace the contents of a vertex buffer
    fn upload_vertices(&mut self, buffer: i32, bytes: &[u8]);

    /// Replace the contents of an index buffer
    fn upload_indices(&mut self, buffer: i32, indices: &[u32]);

    /// Release a buffer
    fn delete_buffer(&mut self, buffer: i32);

    /// Compile and link a shader program
    fn compile_program(&mut self, vertex_source: &str, fragment_source: &str) -> BackendResult<i32>;

    /// Release a shader program
    fn delete_program(&mut self, program: i32);

    /// Issue an indexed triangle draw
    fn draw_indexed(&mut self, call: &DrawCall);

    /// Downcast to the concrete backend type
    fn as_any(&self) -> &dyn Any;

    /// Downcast to the mutable concrete backend type
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
