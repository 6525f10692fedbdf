//! # Rendering System
//!
//! Everything on screen is a textured quad. World objects are converted
//! from camera-relative world space, GUI and console draw in pixel space,
//! and both end up as the same interleaved four-vertex quad drawn through a
//! [`RenderBackend`].
//!
//! The backend is the external GPU collaborator. [`HeadlessBackend`] records
//! draws instead of issuing them and is what tests and headless runs use.

mod backend;
mod buffer_pool;
mod headless;
mod renderer;
mod shader;
mod sprite;
mod text;
pub mod vertex;

pub use backend::{BackendResult, DrawCall, RenderBackend};
pub use buffer_pool::{BufferPool, DrawShape, PooledBuffers};
pub use headless::{HeadlessBackend, RecordedDraw};
pub use renderer::{RenderStats, TackRenderer, ViewTransform, WorldQuad};
pub use shader::{ShaderProgram, ShaderRegistry, GUI_SHADER, OBJECT_SHADER};
pub use sprite::{Sprite, SpriteManager, SpriteSheet};
pub use text::{BlockFont, FontRasterizer, RasterizedText, TextCache};
pub use vertex::{QuadVertex, QUAD_INDICES};

use thiserror::Error;

/// Rendering errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// Shader failed to compile or link
    #[error("Shader compilation failed: {0}")]
    ShaderCompile(String),

    /// Backend-specific failure
    #[error("Render backend error: {0}")]
    Backend(String),
}
