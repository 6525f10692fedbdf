//! Recording backend used without a GPU
//!
//! Keeps real handle bookkeeping and records the current frame's draws with
//! their decoded vertices, which is what tests and headless runs inspect.
//! Every clear starts a new frame and drops the previous recording.

use super::backend::{BackendResult, DrawCall, RenderBackend};
use super::sprite::rgba_len;
use super::vertex::QuadVertex;
use super::RenderError;
use std::any::Any;
use std::collections::{HashMap, HashSet};

/// A draw as it reached the backend
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedDraw {
    /// Program used
    pub program: i32,
    /// Texture bound
    pub texture: i32,
    /// Vertex buffer contents at draw time
    pub vertices: Vec<QuadVertex>,
    /// Index buffer contents at draw time
    pub indices: Vec<u32>,
}

#[derive(Debug, Default)]
struct BufferData {
    vertices: Vec<u8>,
    indices: Vec<u32>,
}

/// Backend that records instead of rendering
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    next_handle: i32,
    textures: HashMap<i32, (u32, u32)>,
    buffers: HashMap<i32, BufferData>,
    programs: HashSet<i32>,
    draws: Vec<RecordedDraw>,
    clears: usize,
    last_clear: Option<[f32; 4]>,
    viewport: (u32, u32),
    texture_deletes: usize,
    invalid_deletes: usize,
    buffers_created: usize,
    fail_shaders: bool,
}

impl HeadlessBackend {
    /// Create a new recording backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every shader compilation fail
    pub fn with_failing_shaders(mut self) -> Self {
        self.fail_shaders = true;
        self
    }

    /// Draws recorded since the last clear or [`HeadlessBackend::take_draws`]
    pub fn draws(&self) -> &[RecordedDraw] {
        &self.draws
    }

    /// Drain the recorded draws
    pub fn take_draws(&mut self) -> Vec<RecordedDraw> {
        std::mem::take(&mut self.draws)
    }

    /// Number of clears issued
    pub fn clear_count(&self) -> usize {
        self.clears
    }

    /// Colour of the most recent clear
    pub fn last_clear_colour(&self) -> Option<[f32; 4]> {
        self.last_clear
    }

    /// Current viewport
    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    /// Live texture count
    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    /// Size of a live texture
    pub fn texture_size(&self, texture: i32) -> Option<(u32, u32)> {
        self.textures.get(&texture).copied()
    }

    /// Successful texture deletions
    pub fn texture_deletes(&self) -> usize {
        self.texture_deletes
    }

    /// Deletes of handles that were invalid or already released
    pub fn invalid_deletes(&self) -> usize {
        self.invalid_deletes
    }

    /// Buffers ever created
    pub fn buffers_created(&self) -> usize {
        self.buffers_created
    }

    /// Live buffer count
    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    /// Live program count
    pub fn live_programs(&self) -> usize {
        self.programs.len()
    }

    fn allocate(&mut self) -> i32 {
        self.next_handle += 1;
        self.next_handle
    }
}

impl RenderBackend for HeadlessBackend {
    fn clear(&mut self, colour: [f32; 4]) {
        self.draws.clear();
        self.clears += 1;
        self.last_clear = Some(colour);
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
    }

    fn create_texture(&mut self, width: u32, height: u32, rgba: &[u8]) -> i32 {
        if width == 0 || height == 0 || rgba_len(width, height) != Some(rgba.len()) {
            return 0;
        }
        let handle = self.allocate();
        self.textures.insert(handle, (width, height));
        handle
    }

    fn delete_texture(&mut self, texture: i32) {
        if self.textures.remove(&texture).is_some() {
            self.texture_deletes += 1;
        } else {
            self.invalid_deletes += 1;
        }
    }

    fn create_buffer(&mut self) -> i32 {
        let handle = self.allocate();
        self.buffers.insert(handle, BufferData::default());
        self.buffers_created += 1;
        handle
    }

    fn upload_vertices(&mut self, buffer: i32, bytes: &[u8]) {
        if let Some(data) = self.buffers.get_mut(&buffer) {
            data.vertices.clear();
            data.vertices.extend_from_slice(bytes);
        }
    }

    fn upload_indices(&mut self, buffer: i32, indices: &[u32]) {
        if let Some(data) = self.buffers.get_mut(&buffer) {
            data.indices.clear();
            data.indices.extend_from_slice(indices);
        }
    }

    fn delete_buffer(&mut self, buffer: i32) {
        if self.buffers.remove(&buffer).is_none() {
            self.invalid_deletes += 1;
        }
    }

    fn compile_program(&mut self, vertex_source: &str, fragment_source: &str) -> BackendResult<i32> {
        if self.fail_shaders || vertex_source.trim().is_empty() || fragment_source.trim().is_empty() {
            return Err(RenderError::ShaderCompile("empty or rejected shader source".to_string()));
        }
        let handle = self.allocate();
        self.programs.insert(handle);
        Ok(handle)
    }

    fn delete_program(&mut self, program: i32) {
        if !self.programs.remove(&program) {
            self.invalid_deletes += 1;
        }
    }

    fn draw_indexed(&mut self, call: &DrawCall) {
        let vertices = self
            .buffers
            .get(&call.vertex_buffer)
            .map(|data| {
                data.vertices
                    .chunks_exact(QuadVertex::SIZE)
                    .map(bytemuck::pod_read_unaligned::<QuadVertex>)
                    .collect()
            })
            .unwrap_or_default();
        let indices = self
            .buffers
            .get(&call.index_buffer)
            .map(|data| data.indices.iter().take(call.index_count as usize).copied().collect())
            .unwrap_or_default();

        self.draws.push(RecordedDraw {
            program: call.program,
            texture: call.texture,
            vertices,
            indices,
        });
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::vertex::QUAD_INDICES;

    #[test]
    fn test_handles_start_at_one() {
        let mut backend = HeadlessBackend::new();
        assert_eq!(backend.create_buffer(), 1);
        assert_eq!(backend.create_texture(1, 1, &[255; 4]), 2);
    }

    #[test]
    fn test_bad_texture_data_yields_invalid_handle() {
        let mut backend = HeadlessBackend::new();
        assert_eq!(backend.create_texture(2, 2, &[0; 4]), 0);
        assert_eq!(backend.create_texture(0, 0, &[]), 0);
        assert_eq!(backend.live_textures(), 0);
    }

    #[test]
    fn test_double_delete_is_counted() {
        let mut backend = HeadlessBackend::new();
        let texture = backend.create_texture(1, 1, &[0; 4]);
        backend.delete_texture(texture);
        backend.delete_texture(texture);
        assert_eq!(backend.texture_deletes(), 1);
        assert_eq!(backend.invalid_deletes(), 1);
    }

    #[test]
    fn test_draw_decodes_vertices() {
        let mut backend = HeadlessBackend::new();
        let vertex_buffer = backend.create_buffer();
        let index_buffer = backend.create_buffer();
        let vertex = QuadVertex {
            position: [0.5, -0.5, 1.0],
            colour: [1.0, 1.0, 1.0],
            tex_coord: [0.0, 1.0],
        };
        backend.upload_vertices(vertex_buffer, bytemuck::cast_slice(&[vertex; 4]));
        backend.upload_indices(index_buffer, &QUAD_INDICES);
        backend.draw_indexed(&DrawCall {
            program: 7,
            texture: 9,
            vertex_buffer,
            index_buffer,
            index_count: 6,
        });

        let draws = backend.take_draws();
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].vertices, vec![vertex; 4]);
        assert_eq!(draws[0].indices, QUAD_INDICES.to_vec());
        assert!(backend.draws().is_empty());
    }

    fn draw_once(backend: &mut HeadlessBackend, vertex_buffer: i32, index_buffer: i32) {
        backend.draw_indexed(&DrawCall {
            program: 1,
            texture: 1,
            vertex_buffer,
            index_buffer,
            index_count: 6,
        });
    }

    #[test]
    fn test_clear_starts_a_new_recording() {
        let mut backend = HeadlessBackend::new();
        let vertex_buffer = backend.create_buffer();
        let index_buffer = backend.create_buffer();

        for _ in 0..50 {
            backend.clear([0.0, 0.0, 0.0, 1.0]);
            draw_once(&mut backend, vertex_buffer, index_buffer);
            draw_once(&mut backend, vertex_buffer, index_buffer);
        }
        assert_eq!(backend.draws().len(), 2);
        assert_eq!(backend.clear_count(), 50);
    }

    #[test]
    fn test_oversized_texture_is_rejected() {
        let mut backend = HeadlessBackend::new();
        assert_eq!(backend.create_texture(u32::MAX, u32::MAX, &[0; 4]), 0);
        assert_eq!(backend.live_textures(), 0);
    }

    #[test]
    fn test_failing_shaders() {
        let mut backend = HeadlessBackend::new().with_failing_shaders();
        assert!(backend.compile_program("void main() {}", "void main() {}").is_err());
    }
}
