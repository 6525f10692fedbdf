//! Single-line text input
//!
//! Clicking inside claims exclusive input focus; clicking elsewhere releases
//! it. While focused the box drains the shared buffered-input queue.

use super::{GuiEvent, GuiId, GuiStyle, GuiWidget};
use crate::foundation::math::{UiRect, Vec2};
use crate::input::{BufferedInput, FocusOwner, InputManager, MouseButton};
use crate::render::TackRenderer;

/// Text input field
#[derive(Debug, Clone)]
pub struct GuiTextBox {
    /// Bounds in pixels
    pub bounds: UiRect,
    /// Shown while empty and unfocused
    pub placeholder: String,
    /// Colours and font
    pub style: GuiStyle,
    /// Whether the box is drawn and interactive
    pub visible: bool,
    /// Characters accepted before further input is dropped
    pub max_length: usize,
    /// Keep the text after Enter instead of clearing it
    pub keep_on_submit: bool,
    text: String,
    focused: bool,
}

impl GuiTextBox {
    /// Empty text box
    pub fn new(bounds: UiRect) -> Self {
        Self {
            bounds,
            placeholder: String::new(),
            style: GuiStyle::default(),
            visible: true,
            max_length: 256,
            keep_on_submit: false,
            text: String::new(),
            focused: false,
        }
    }

    /// Set the placeholder
    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = placeholder.to_string();
        self
    }

    /// Current contents
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the contents
    pub fn set_text(&mut self, text: &str) {
        self.text = text.chars().take(self.max_length).collect();
    }

    /// Whether this box holds input focus
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    fn apply(&mut self, id: GuiId, item: BufferedInput, events: &mut Vec<GuiEvent>) {
        match item {
            BufferedInput::Char(c) => {
                if self.text.chars().count() < self.max_length {
                    self.text.push(c);
                }
            }
            BufferedInput::Backspace => {
                self.text.pop();
            }
            BufferedInput::Submit => {
                let text = if self.keep_on_submit {
                    self.text.clone()
                } else {
                    std::mem::take(&mut self.text)
                };
                events.push(GuiEvent::TextSubmitted { id, text });
            }
        }
    }
}

impl GuiWidget for GuiTextBox {
    fn bounds(&self) -> UiRect {
        self.bounds
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn update(&mut self, id: GuiId, input: &mut InputManager, events: &mut Vec<GuiEvent>) {
        let owner = FocusOwner::Widget(id);
        if input.mouse_pressed(MouseButton::Left) {
            if self.bounds.contains(input.mouse_position()) {
                self.focused = input.claim_focus(owner);
            } else if self.focused {
                input.release_focus(owner);
                self.focused = false;
            }
        }

        // Focus can be taken away by the console
        self.focused = self.focused && input.has_focus(owner);
        if !self.focused {
            return;
        }

        for item in input.take_buffered_input(owner) {
            self.apply(id, item, events);
        }
    }

    fn render(&self, renderer: &mut TackRenderer) {
        let fill = if self.focused {
            self.style.selected_colour
        } else {
            self.style.normal_colour
        };
        renderer.draw_ui_rect(self.bounds, fill);

        let origin = Vec2::new(self.bounds.x + self.style.padding, self.bounds.y + self.style.padding);
        let font_size = self.style.font_size();
        if self.focused {
            let shown = format!("{}_", self.text);
            renderer.draw_ui_text(origin, &shown, font_size, self.style.text_colour);
        } else if self.text.is_empty() {
            renderer.draw_ui_text(origin, &self.placeholder, font_size, self.style.hover_colour);
        } else {
            renderer.draw_ui_text(origin, &self.text, font_size, self.style.text_colour);
        }
    }

    fn on_dispose(&mut self, id: GuiId, input: &mut InputManager) {
        input.release_focus(FocusOwner::Widget(id));
        self.focused = false;
    }
}
