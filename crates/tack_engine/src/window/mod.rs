//! Window management
//!
//! The frame driver owns exactly one [`WindowBackend`]: it polls platform
//! events from it once per loop iteration and swaps buffers after every
//! rendered frame.

mod headless;

#[cfg(feature = "glfw-window")]
mod glfw_window;

pub use headless::HeadlessWindow;

#[cfg(feature = "glfw-window")]
pub use glfw_window::GlfwWindow;

use crate::input::PlatformEvent;
use std::any::Any;
use thiserror::Error;

/// Window management errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WindowError {
    /// The windowing library could not be initialized
    #[error("Window system initialization failed: {0}")]
    InitializationFailed(String),

    /// The OS refused to create the window
    #[error("Window creation failed")]
    CreationFailed,
}

/// Platform window abstraction
pub trait WindowBackend {
    /// Collect the events that arrived since the last poll
    fn poll_events(&mut self) -> Vec<PlatformEvent>;

    /// Present the rendered frame
    fn swap_buffers(&mut self);

    /// Whether the window was asked to close
    fn should_close(&self) -> bool;

    /// Request or cancel closing
    fn set_should_close(&mut self, should_close: bool);

    /// Enable or disable waiting for vertical sync on swap
    fn set_vsync(&mut self, enabled: bool);

    /// Drawable size in pixels
    fn framebuffer_size(&self) -> (u32, u32);

    /// Window title
    fn title(&self) -> String;

    /// Change the window title
    fn set_title(&mut self, title: &str);

    /// Downcast to the concrete window type
    fn as_any(&self) -> &dyn Any;

    /// Downcast to the mutable concrete window type
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
