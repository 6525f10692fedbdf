//! Built-in components

mod audio_source;
mod camera;
mod physics_body;
mod quad_renderer;

pub use audio_source::AudioSource;
pub use camera::Camera;
pub use physics_body::PhysicsBody;
pub use quad_renderer::{QuadRenderer, RenderMode};
