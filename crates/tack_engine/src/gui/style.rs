//! Widget styling

use crate::foundation::math::Colour4;

/// Font size used when a style is given a non-positive one
pub const DEFAULT_FONT_SIZE: f32 = 16.0;

/// Pointer interaction state of a widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WidgetState {
    /// Pointer elsewhere
    #[default]
    Normal,
    /// Pointer inside the bounds
    Hovering,
    /// Left button went down inside the bounds and is still held
    Pressed,
}

/// Colours and text settings shared by widgets
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuiStyle {
    /// Fill in [`WidgetState::Normal`]
    pub normal_colour: Colour4,
    /// Fill in [`WidgetState::Hovering`]
    pub hover_colour: Colour4,
    /// Fill in [`WidgetState::Pressed`]
    pub pressed_colour: Colour4,
    /// Fill of a selected toggle or a focused text box
    pub selected_colour: Colour4,
    /// Label colour
    pub text_colour: Colour4,
    /// Gap between the bounds and the label
    pub padding: f32,
    font_size: f32,
}

impl Default for GuiStyle {
    fn default() -> Self {
        Self {
            normal_colour: Colour4::rgb(77, 77, 77),
            hover_colour: Colour4::rgb(102, 102, 128),
            pressed_colour: Colour4::rgb(128, 128, 153),
            selected_colour: Colour4::rgb(64, 128, 192),
            text_colour: Colour4::WHITE,
            padding: 4.0,
            font_size: DEFAULT_FONT_SIZE,
        }
    }
}

impl GuiStyle {
    /// Label font size in pixels
    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    /// Set the label font size
    ///
    /// Non-positive or non-finite sizes fall back to [`DEFAULT_FONT_SIZE`].
    pub fn set_font_size(&mut self, font_size: f32) {
        if font_size.is_finite() && font_size > 0.0 {
            self.font_size = font_size;
        } else {
            log::warn!("Invalid font size {}, using {}", font_size, DEFAULT_FONT_SIZE);
            self.font_size = DEFAULT_FONT_SIZE;
        }
    }

    /// Builder form of [`GuiStyle::set_font_size`]
    pub fn with_font_size(mut self, font_size: f32) -> Self {
        self.set_font_size(font_size);
        self
    }

    /// Fill colour for an interaction state
    pub fn colour_for(&self, state: WidgetState) -> Colour4 {
        match state {
            WidgetState::Normal => self.normal_colour,
            WidgetState::Hovering => self.hover_colour,
            WidgetState::Pressed => self.pressed_colour,
        }
    }
}
