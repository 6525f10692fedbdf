//! Static panel

use super::{GuiStyle, GuiWidget};
use crate::foundation::math::{UiRect, Vec2};
use crate::render::TackRenderer;

/// Filled rectangle with optional text
#[derive(Debug, Clone)]
pub struct GuiBox {
    /// Bounds in pixels
    pub bounds: UiRect,
    /// Text drawn at the padded top-left corner
    pub text: Option<String>,
    /// Colours and font
    pub style: GuiStyle,
    /// Whether the box is drawn
    pub visible: bool,
}

impl GuiBox {
    /// Empty panel
    pub fn new(bounds: UiRect) -> Self {
        Self {
            bounds,
            text: None,
            style: GuiStyle::default(),
            visible: true,
        }
    }

    /// Panel with text
    pub fn with_text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }
}

impl GuiWidget for GuiBox {
    fn bounds(&self) -> UiRect {
        self.bounds
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn render(&self, renderer: &mut TackRenderer) {
        renderer.draw_ui_rect(self.bounds, self.style.normal_colour);
        if let Some(text) = &self.text {
            let origin = Vec2::new(self.bounds.x + self.style.padding, self.bounds.y + self.style.padding);
            renderer.draw_ui_text(origin, text, self.style.font_size(), self.style.text_colour);
        }
    }
}
