//! Input management system
//!
//! The frame driver forwards every [`PlatformEvent`] to the [`InputManager`].
//! Game code and widgets read held state and per-frame edges from it; the
//! edge buffers are advanced once at the end of every update tick.
//!
//! Text entry goes through a shared buffered-input queue that only fills
//! while a [`FocusOwner`] has claimed exclusive input focus.

mod keys;

pub use keys::{KeyCode, MouseButton};

use crate::foundation::math::Vec2;
use std::collections::HashSet;

/// Raw event delivered by the window backend
#[derive(Debug, Clone, PartialEq)]
pub enum PlatformEvent {
    /// Key changed state
    Key {
        /// Key that changed
        key: KeyCode,
        /// True on press, false on release
        pressed: bool,
    },
    /// A character was typed (already decoded by the OS)
    Char(char),
    /// Cursor moved, window pixels with a top-left origin
    MouseMoved {
        /// X coordinate
        x: f32,
        /// Y coordinate
        y: f32,
    },
    /// Mouse button changed state
    MouseButton {
        /// Button that changed
        button: MouseButton,
        /// True on press, false on release
        pressed: bool,
    },
    /// Scroll wheel moved
    Scroll {
        /// Horizontal delta
        dx: f32,
        /// Vertical delta
        dy: f32,
    },
    /// Framebuffer was resized
    Resized {
        /// New width in pixels
        width: u32,
        /// New height in pixels
        height: u32,
    },
    /// The user asked to close the window
    CloseRequested,
}

/// Entry of the buffered text-input queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferedInput {
    /// Printable character
    Char(char),
    /// Delete the character before the cursor
    Backspace,
    /// Enter was pressed
    Submit,
}

/// Who currently owns keyboard text input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FocusOwner {
    /// The developer console input field
    Console,
    /// A GUI text field, identified by its widget id
    Widget(crate::gui::GuiId),
}

#[derive(Debug)]
struct EdgeSet<T: std::hash::Hash + Eq + Copy> {
    held: HashSet<T>,
    pressed: HashSet<T>,
    released: HashSet<T>,
}

// Manual impl: a derive would demand `T: Default`.
impl<T: std::hash::Hash + Eq + Copy> Default for EdgeSet<T> {
    fn default() -> Self {
        Self {
            held: HashSet::new(),
            pressed: HashSet::new(),
            released: HashSet::new(),
        }
    }
}

impl<T: std::hash::Hash + Eq + Copy> EdgeSet<T> {
    fn set(&mut self, item: T, down: bool) {
        if down {
            if self.held.insert(item) {
                self.pressed.insert(item);
            }
        } else if self.held.remove(&item) {
            self.released.insert(item);
        }
    }

    fn clear_edges(&mut self) {
        self.pressed.clear();
        self.released.clear();
    }
}

/// Input manager
#[derive(Debug)]
pub struct InputManager {
    keys: EdgeSet<KeyCode>,
    buttons: EdgeSet<MouseButton>,
    mouse_position: Vec2,
    scroll: Vec2,
    focus: Option<FocusOwner>,
    buffered: Vec<BufferedInput>,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    /// Create a new input manager
    pub fn new() -> Self {
        Self {
            keys: EdgeSet::default(),
            buttons: EdgeSet::default(),
            mouse_position: Vec2::zeros(),
            scroll: Vec2::zeros(),
            focus: None,
            buffered: Vec::new(),
        }
    }

    /// Apply one platform event
    pub fn handle_event(&mut self, event: &PlatformEvent) {
        match *event {
            PlatformEvent::Key { key, pressed } => {
                self.keys.set(key, pressed);
                if pressed && self.focus.is_some() {
                    match key {
                        KeyCode::Backspace => self.buffered.push(BufferedInput::Backspace),
                        KeyCode::Enter => self.buffered.push(BufferedInput::Submit),
                        _ => {}
                    }
                }
            }
            PlatformEvent::Char(c) => {
                if self.focus.is_some() && !c.is_control() {
                    self.buffered.push(BufferedInput::Char(c));
                }
            }
            PlatformEvent::MouseMoved { x, y } => self.mouse_position = Vec2::new(x, y),
            PlatformEvent::MouseButton { button, pressed } => self.buttons.set(button, pressed),
            PlatformEvent::Scroll { dx, dy } => self.scroll += Vec2::new(dx, dy),
            PlatformEvent::Resized { .. } | PlatformEvent::CloseRequested => {}
        }
    }

    /// Advance the per-frame edge buffers, called at the end of every update
    pub fn end_frame(&mut self) {
        self.keys.clear_edges();
        self.buttons.clear_edges();
        self.scroll = Vec2::zeros();
    }

    /// Whether the key is held
    pub fn key_down(&self, key: KeyCode) -> bool {
        self.keys.held.contains(&key)
    }

    /// Whether the key went down this frame
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.keys.pressed.contains(&key)
    }

    /// Whether the key went up this frame
    pub fn key_released(&self, key: KeyCode) -> bool {
        self.keys.released.contains(&key)
    }

    /// Whether the mouse button is held
    pub fn mouse_down(&self, button: MouseButton) -> bool {
        self.buttons.held.contains(&button)
    }

    /// Whether the mouse button went down this frame
    pub fn mouse_pressed(&self, button: MouseButton) -> bool {
        self.buttons.pressed.contains(&button)
    }

    /// Whether the mouse button went up this frame
    pub fn mouse_released(&self, button: MouseButton) -> bool {
        self.buttons.released.contains(&button)
    }

    /// Cursor position in window pixels, top-left origin
    pub fn mouse_position(&self) -> Vec2 {
        self.mouse_position
    }

    /// Scroll accumulated this frame
    pub fn scroll_delta(&self) -> Vec2 {
        self.scroll
    }

    /// Claim exclusive text-input focus
    ///
    /// Returns false, without side effects, if another owner holds focus.
    pub fn claim_focus(&mut self, owner: FocusOwner) -> bool {
        match self.focus {
            Some(current) if current == owner => true,
            Some(current) => {
                log::debug!("Input focus requested by {:?} but held by {:?}", owner, current);
                false
            }
            None => {
                self.focus = Some(owner);
                self.buffered.clear();
                true
            }
        }
    }

    /// Release focus if `owner` holds it
    pub fn release_focus(&mut self, owner: FocusOwner) {
        if self.focus == Some(owner) {
            self.focus = None;
            self.buffered.clear();
        }
    }

    /// Whether `owner` holds text-input focus
    pub fn has_focus(&self, owner: FocusOwner) -> bool {
        self.focus == Some(owner)
    }

    /// Current focus owner, if any
    pub fn focus_owner(&self) -> Option<FocusOwner> {
        self.focus
    }

    /// Drain the buffered input queue for the focus owner
    ///
    /// Anyone but the current owner gets an empty list and leaves the queue
    /// untouched.
    pub fn take_buffered_input(&mut self, owner: FocusOwner) -> Vec<BufferedInput> {
        if self.has_focus(owner) {
            std::mem::take(&mut self.buffered)
        } else {
            Vec::new()
        }
    }

    /// Discard anything queued, used when the console toggles
    pub fn clear_buffered_input(&mut self) {
        self.buffered.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gui::GuiId;
    use slotmap::KeyData;

    fn widget_owner(raw: u64) -> FocusOwner {
        FocusOwner::Widget(GuiId::from(KeyData::from_ffi(raw)))
    }

    #[test]
    fn test_key_edges_last_one_frame() {
        let mut input = InputManager::new();
        input.handle_event(&PlatformEvent::Key { key: KeyCode::A, pressed: true });

        assert!(input.key_down(KeyCode::A));
        assert!(input.key_pressed(KeyCode::A));

        input.end_frame();
        assert!(input.key_down(KeyCode::A));
        assert!(!input.key_pressed(KeyCode::A));

        input.handle_event(&PlatformEvent::Key { key: KeyCode::A, pressed: false });
        assert!(input.key_released(KeyCode::A));
        assert!(!input.key_down(KeyCode::A));
    }

    #[test]
    fn test_repeat_press_is_not_a_new_edge() {
        let mut input = InputManager::new();
        input.handle_event(&PlatformEvent::MouseButton { button: MouseButton::Left, pressed: true });
        input.end_frame();
        input.handle_event(&PlatformEvent::MouseButton { button: MouseButton::Left, pressed: true });
        assert!(!input.mouse_pressed(MouseButton::Left));
        assert!(input.mouse_down(MouseButton::Left));
    }

    #[test]
    fn test_buffer_only_fills_while_focused() {
        let mut input = InputManager::new();
        input.handle_event(&PlatformEvent::Char('x'));
        assert!(input.take_buffered_input(FocusOwner::Console).is_empty());

        assert!(input.claim_focus(FocusOwner::Console));
        input.handle_event(&PlatformEvent::Char('h'));
        input.handle_event(&PlatformEvent::Char('i'));
        input.handle_event(&PlatformEvent::Key { key: KeyCode::Backspace, pressed: true });
        input.handle_event(&PlatformEvent::Key { key: KeyCode::Enter, pressed: true });

        assert_eq!(
            input.take_buffered_input(FocusOwner::Console),
            vec![
                BufferedInput::Char('h'),
                BufferedInput::Char('i'),
                BufferedInput::Backspace,
                BufferedInput::Submit,
            ]
        );
    }

    #[test]
    fn test_focus_is_exclusive() {
        let mut input = InputManager::new();
        let field = widget_owner(1);

        assert!(input.claim_focus(field));
        assert!(!input.claim_focus(FocusOwner::Console));
        assert!(input.has_focus(field));

        input.handle_event(&PlatformEvent::Char('a'));
        assert!(input.take_buffered_input(FocusOwner::Console).is_empty());

        input.release_focus(FocusOwner::Console);
        assert!(input.has_focus(field));

        input.release_focus(field);
        assert!(input.claim_focus(FocusOwner::Console));
    }

    #[test]
    fn test_scroll_resets_each_frame() {
        let mut input = InputManager::new();
        input.handle_event(&PlatformEvent::Scroll { dx: 0.0, dy: 1.0 });
        input.handle_event(&PlatformEvent::Scroll { dx: 0.0, dy: 2.0 });
        assert_eq!(input.scroll_delta(), Vec2::new(0.0, 3.0));
        input.end_frame();
        assert_eq!(input.scroll_delta(), Vec2::zeros());
    }
}
