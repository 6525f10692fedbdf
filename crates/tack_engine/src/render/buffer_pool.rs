//! Persistent vertex/index buffer pool
//!
//! Buffers are acquired per draw, returned at the end of the frame and reused
//! on the next one, so a steady scene allocates nothing after its first frame.

use super::backend::RenderBackend;
use super::vertex::QUAD_INDICES;
use std::collections::HashMap;

/// Geometry a pooled buffer pair is prepared for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawShape {
    /// Four vertices, six indices
    Quad,
}

impl DrawShape {
    fn indices(self) -> &'static [u32] {
        match self {
            Self::Quad => &QUAD_INDICES,
        }
    }

    /// Number of indices drawn for this shape
    pub fn index_count(self) -> u32 {
        self.indices().len() as u32
    }
}

/// A vertex buffer paired with an index buffer already holding the shape's indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PooledBuffers {
    /// Vertex buffer handle
    pub vertex_buffer: i32,
    /// Index buffer handle
    pub index_buffer: i32,
}

/// Buffer pool keyed by draw shape
#[derive(Debug, Default)]
pub struct BufferPool {
    free: HashMap<DrawShape, Vec<PooledBuffers>>,
    in_flight: Vec<(DrawShape, PooledBuffers)>,
    allocated: usize,
}

impl BufferPool {
    /// Create an empty pool
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a buffer pair for one draw
    ///
    /// Returns `None`, after logging, if the backend could not allocate.
    pub fn acquire(&mut self, backend: &mut dyn RenderBackend, shape: DrawShape) -> Option<PooledBuffers> {
        let buffers = match self.free.get_mut(&shape).and_then(Vec::pop) {
            Some(buffers) => buffers,
            None => {
                let vertex_buffer = backend.create_buffer();
                let index_buffer = backend.create_buffer();
                if vertex_buffer <= 0 || index_buffer <= 0 {
                    log::error!("Failed to allocate {:?} buffers", shape);
                    if vertex_buffer > 0 {
                        backend.delete_buffer(vertex_buffer);
                    }
                    if index_buffer > 0 {
                        backend.delete_buffer(index_buffer);
                    }
                    return None;
                }
                backend.upload_indices(index_buffer, shape.indices());
                self.allocated += 1;
                PooledBuffers {
                    vertex_buffer,
                    index_buffer,
                }
            }
        };
        self.in_flight.push((shape, buffers));
        Some(buffers)
    }

    /// Return every buffer acquired this frame
    pub fn release_frame(&mut self) {
        for (shape, buffers) in self.in_flight.drain(..) {
            self.free.entry(shape).or_default().push(buffers);
        }
    }

    /// Buffer pairs ever allocated
    pub fn allocated(&self) -> usize {
        self.allocated
    }

    /// Buffer pairs acquired and not yet released
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Delete every buffer the pool owns
    pub fn destroy(&mut self, backend: &mut dyn RenderBackend) {
        self.release_frame();
        for (_, list) in self.free.drain() {
            for buffers in list {
                backend.delete_buffer(buffers.vertex_buffer);
                backend.delete_buffer(buffers.index_buffer);
            }
        }
        self.allocated = 0;
    }
}
