//! Button widget - clickable labelled box

use super::{centred, pointer_transition, GuiEvent, GuiId, GuiStyle, GuiWidget, WidgetState};
use crate::foundation::math::UiRect;
use crate::input::InputManager;
use crate::render::TackRenderer;

/// Clickable button
///
/// Fires [`GuiEvent::Clicked`] once per left-button down edge inside its
/// bounds, never per held frame.
#[derive(Debug, Clone)]
pub struct GuiButton {
    /// Bounds in pixels
    pub bounds: UiRect,
    /// Label text
    pub label: String,
    /// Colours and font
    pub style: GuiStyle,
    /// Whether the button is drawn and interactive
    pub visible: bool,
    state: WidgetState,
    clicks: u32,
}

impl GuiButton {
    /// Button with the default style
    pub fn new(bounds: UiRect, label: &str) -> Self {
        Self {
            bounds,
            label: label.to_string(),
            style: GuiStyle::default(),
            visible: true,
            state: WidgetState::Normal,
            clicks: 0,
        }
    }

    /// Replace the style
    pub fn with_style(mut self, style: GuiStyle) -> Self {
        self.style = style;
        self
    }

    /// Current interaction state
    pub fn state(&self) -> WidgetState {
        self.state
    }

    /// Clicks registered so far
    pub fn click_count(&self) -> u32 {
        self.clicks
    }
}

impl GuiWidget for GuiButton {
    fn bounds(&self) -> UiRect {
        self.bounds
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn update(&mut self, id: GuiId, input: &mut InputManager, events: &mut Vec<GuiEvent>) {
        let hovered = self.bounds.contains(input.mouse_position());
        let (state, clicked) = pointer_transition(self.state, hovered, input);
        self.state = state;
        if clicked {
            self.clicks += 1;
            events.push(GuiEvent::Clicked(id));
        }
    }

    fn render(&self, renderer: &mut TackRenderer) {
        renderer.draw_ui_rect(self.bounds, self.style.colour_for(self.state));
        if !self.label.is_empty() {
            let size = renderer.measure_text(&self.label, self.style.font_size());
            let position = centred(self.bounds, size);
            renderer.draw_ui_text(position, &self.label, self.style.font_size(), self.style.text_colour);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gui::tests::{move_mouse, set_left};
    use crate::gui::TackGui;

    #[test]
    fn test_click_fires_once_per_down_edge() {
        let mut gui = TackGui::new();
        let mut input = InputManager::new();
        let id = gui.add(GuiButton::new(UiRect::new(10.0, 10.0, 80.0, 30.0), "Play"));

        move_mouse(&mut input, 20.0, 20.0);
        gui.update(&mut input);
        assert_eq!(gui.get::<GuiButton>(id).map(GuiButton::state), Some(WidgetState::Hovering));

        set_left(&mut input, true);
        gui.update(&mut input);
        input.end_frame();
        // Held for several frames
        for _ in 0..3 {
            gui.update(&mut input);
            input.end_frame();
        }
        assert_eq!(gui.drain_events(), vec![GuiEvent::Clicked(id)]);
        assert_eq!(gui.get::<GuiButton>(id).map(GuiButton::state), Some(WidgetState::Pressed));

        set_left(&mut input, false);
        gui.update(&mut input);
        assert_eq!(gui.get::<GuiButton>(id).map(GuiButton::state), Some(WidgetState::Hovering));
        assert_eq!(gui.get::<GuiButton>(id).map(GuiButton::click_count), Some(1));
    }

    #[test]
    fn test_press_outside_does_not_click() {
        let mut gui = TackGui::new();
        let mut input = InputManager::new();
        let id = gui.add(GuiButton::new(UiRect::new(10.0, 10.0, 80.0, 30.0), "Play"));

        move_mouse(&mut input, 200.0, 200.0);
        set_left(&mut input, true);
        gui.update(&mut input);

        assert!(gui.drain_events().is_empty());
        assert_eq!(gui.get::<GuiButton>(id).map(GuiButton::state), Some(WidgetState::Normal));
    }

    #[test]
    fn test_release_outside_returns_to_normal() {
        let mut gui = TackGui::new();
        let mut input = InputManager::new();
        let id = gui.add(GuiButton::new(UiRect::new(0.0, 0.0, 50.0, 50.0), ""));

        move_mouse(&mut input, 10.0, 10.0);
        set_left(&mut input, true);
        gui.update(&mut input);
        input.end_frame();

        move_mouse(&mut input, 100.0, 100.0);
        gui.update(&mut input);
        assert_eq!(gui.get::<GuiButton>(id).map(GuiButton::state), Some(WidgetState::Pressed));

        set_left(&mut input, false);
        gui.update(&mut input);
        assert_eq!(gui.get::<GuiButton>(id).map(GuiButton::state), Some(WidgetState::Normal));
    }
}
