//! Toggle widget

use super::{centred, pointer_transition, GuiEvent, GuiId, GuiStyle, GuiWidget, WidgetState};
use crate::foundation::math::UiRect;
use crate::input::{InputManager, MouseButton};
use crate::render::TackRenderer;

/// Two-state button
///
/// Selection flips when the left button is released over the widget.
/// Pointer activity outside the bounds never changes it.
#[derive(Debug, Clone)]
pub struct GuiToggle {
    /// Bounds in pixels
    pub bounds: UiRect,
    /// Label text
    pub label: String,
    /// Colours and font
    pub style: GuiStyle,
    /// Whether the toggle is drawn and interactive
    pub visible: bool,
    state: WidgetState,
    selected: bool,
}

impl GuiToggle {
    /// Unselected toggle with the default style
    pub fn new(bounds: UiRect, label: &str) -> Self {
        Self {
            bounds,
            label: label.to_string(),
            style: GuiStyle::default(),
            visible: true,
            state: WidgetState::Normal,
            selected: false,
        }
    }

    /// Start selected or not
    pub fn with_selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    /// Whether the toggle is on
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Set the selection without emitting an event
    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    /// Current interaction state
    pub fn state(&self) -> WidgetState {
        self.state
    }
}

impl GuiWidget for GuiToggle {
    fn bounds(&self) -> UiRect {
        self.bounds
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn update(&mut self, id: GuiId, input: &mut InputManager, events: &mut Vec<GuiEvent>) {
        let hovered = self.bounds.contains(input.mouse_position());
        if hovered && input.mouse_released(MouseButton::Left) {
            self.selected = !self.selected;
            events.push(GuiEvent::Toggled {
                id,
                selected: self.selected,
            });
        }
        self.state = pointer_transition(self.state, hovered, input).0;
    }

    fn render(&self, renderer: &mut TackRenderer) {
        let fill = if self.selected && self.state == WidgetState::Normal {
            self.style.selected_colour
        } else {
            self.style.colour_for(self.state)
        };
        renderer.draw_ui_rect(self.bounds, fill);

        if self.selected {
            let marker = self.bounds.inset(self.style.padding);
            renderer.draw_ui_rect(UiRect::new(marker.x, marker.y, marker.height, marker.height), self.style.selected_colour);
        }

        if !self.label.is_empty() {
            let size = renderer.measure_text(&self.label, self.style.font_size());
            renderer.draw_ui_text(
                centred(self.bounds, size),
                &self.label,
                self.style.font_size(),
                self.style.text_colour,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gui::tests::{move_mouse, set_left};
    use crate::gui::TackGui;

    fn selected(gui: &TackGui, id: GuiId) -> Option<bool> {
        gui.get::<GuiToggle>(id).map(GuiToggle::is_selected)
    }

    #[test]
    fn test_unchanged_while_mouse_outside() {
        let mut gui = TackGui::new();
        let mut input = InputManager::new();
        let id = gui.add(GuiToggle::new(UiRect::new(0.0, 0.0, 40.0, 20.0), "sound"));
        move_mouse(&mut input, 300.0, 300.0);

        for frame in 0..50 {
            set_left(&mut input, frame % 2 == 0);
            gui.update(&mut input);
            input.end_frame();
            assert_eq!(selected(&gui, id), Some(false));
        }
        assert!(gui.drain_events().is_empty());
    }

    #[test]
    fn test_release_inside_flips() {
        let mut gui = TackGui::new();
        let mut input = InputManager::new();
        let id = gui.add(GuiToggle::new(UiRect::new(0.0, 0.0, 40.0, 20.0), "sound"));
        move_mouse(&mut input, 5.0, 5.0);

        set_left(&mut input, true);
        gui.update(&mut input);
        input.end_frame();
        assert_eq!(selected(&gui, id), Some(false));

        set_left(&mut input, false);
        gui.update(&mut input);
        input.end_frame();
        assert_eq!(selected(&gui, id), Some(true));
        assert_eq!(gui.drain_events(), vec![GuiEvent::Toggled { id, selected: true }]);

        // Idle frames inside the bounds keep the selection
        gui.update(&mut input);
        gui.update(&mut input);
        assert_eq!(selected(&gui, id), Some(true));
    }
}
