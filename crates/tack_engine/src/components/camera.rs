//! Camera component

use crate::foundation::math::ScreenSize;
use crate::objects::{Capabilities, TackComponent};

/// Defines the view: the owning object's position is the centre of the
/// screen and `screen` is the extent mapped onto clip space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    screen: ScreenSize,
}

impl Camera {
    /// Camera covering `screen` pixels
    pub fn new(screen: ScreenSize) -> Self {
        Self { screen }
    }

    /// Screen dimensions
    pub fn screen_size(&self) -> ScreenSize {
        self.screen
    }

    /// Change the screen dimensions, ignoring empty sizes
    pub fn set_screen_size(&mut self, screen: ScreenSize) {
        if screen.width <= 0.0 || screen.height <= 0.0 {
            log::warn!("Ignoring camera size {}x{}", screen.width, screen.height);
            return;
        }
        self.screen = screen;
    }
}

impl TackComponent for Camera {
    fn capabilities(&self) -> Capabilities {
        Capabilities::CAMERA
    }
}
