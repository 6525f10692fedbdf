//! Immediate-mode GUI layer
//!
//! Widgets live in a [`TackGui`] slot map and are drawn in insertion order.
//! Every update each visible widget hit-tests the pointer, advances its
//! state and queues [`GuiEvent`]s for the game to drain. Every render it
//! submits its own quads and text through the renderer's pixel-space
//! primitives. Widgets stay registered until [`TackGui::dispose`].

mod button;
mod panel;
mod style;
mod text_box;
mod toggle;

pub use button::GuiButton;
pub use panel::GuiBox;
pub use style::{GuiStyle, WidgetState, DEFAULT_FONT_SIZE};
pub use text_box::GuiTextBox;
pub use toggle::GuiToggle;

use crate::foundation::math::{UiRect, Vec2};
use crate::input::{InputManager, MouseButton};
use crate::objects::AsAny;
use crate::render::TackRenderer;
use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Handle to a registered widget
    pub struct GuiId;
}

/// Something a widget reported during an update
#[derive(Debug, Clone, PartialEq)]
pub enum GuiEvent {
    /// A button went down
    Clicked(GuiId),
    /// A toggle flipped
    Toggled {
        /// Toggle widget
        id: GuiId,
        /// New selection state
        selected: bool,
    },
    /// Enter was pressed in a focused text box
    TextSubmitted {
        /// Text box widget
        id: GuiId,
        /// Submitted text
        text: String,
    },
}

/// A widget managed by [`TackGui`]
#[allow(unused_variables)]
pub trait GuiWidget: AsAny {
    /// Bounds in top-left-origin pixel space
    fn bounds(&self) -> UiRect;

    /// Hidden widgets neither update nor render
    fn is_visible(&self) -> bool {
        true
    }

    /// Advance interaction state
    fn update(&mut self, id: GuiId, input: &mut InputManager, events: &mut Vec<GuiEvent>) {}

    /// Submit draw primitives
    fn render(&self, renderer: &mut TackRenderer);

    /// Release anything held before the widget is dropped
    fn on_dispose(&mut self, id: GuiId, input: &mut InputManager) {}
}

/// Advance the shared Normal/Hovering/Pressed machine
///
/// Returns the next state and whether the left button went down on the
/// widget this frame.
pub(crate) fn pointer_transition(current: WidgetState, hovered: bool, input: &InputManager) -> (WidgetState, bool) {
    match current {
        WidgetState::Pressed if input.mouse_down(MouseButton::Left) => (WidgetState::Pressed, false),
        _ if hovered && input.mouse_pressed(MouseButton::Left) => (WidgetState::Pressed, true),
        _ if hovered => (WidgetState::Hovering, false),
        _ => (WidgetState::Normal, false),
    }
}

/// Top-left position that centres `size` inside `bounds`
pub(crate) fn centred(bounds: UiRect, size: Vec2) -> Vec2 {
    Vec2::new(
        bounds.x + (bounds.width - size.x) * 0.5,
        bounds.y + (bounds.height - size.y) * 0.5,
    )
}

/// Events kept when the game does not drain the queue
pub const MAX_QUEUED_EVENTS: usize = 256;

/// Widget registry
///
/// Widget events queue up until the game takes them with
/// [`TackGui::drain_events`], normally once per update. Past
/// [`MAX_QUEUED_EVENTS`] the oldest events are dropped with a warning.
#[derive(Default)]
pub struct TackGui {
    widgets: SlotMap<GuiId, Box<dyn GuiWidget>>,
    order: Vec<GuiId>,
    events: Vec<GuiEvent>,
}

impl TackGui {
    /// Empty GUI layer
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a widget, drawn above everything added before it
    pub fn add<W: GuiWidget>(&mut self, widget: W) -> GuiId {
        let id = self.widgets.insert(Box::new(widget));
        self.order.push(id);
        id
    }

    /// Unregister a widget, releasing its input focus
    pub fn dispose(&mut self, id: GuiId, input: &mut InputManager) -> bool {
        let Some(mut widget) = self.widgets.remove(id) else {
            log::warn!("Attempted to dispose unknown widget {:?}", id);
            return false;
        };
        widget.on_dispose(id, input);
        self.order.retain(|other| *other != id);
        true
    }

    /// Whether `id` is registered
    pub fn contains(&self, id: GuiId) -> bool {
        self.widgets.contains_key(id)
    }

    /// Registered widget count
    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    /// Whether no widgets are registered
    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    /// Borrow a widget as its concrete type
    pub fn get<W: GuiWidget>(&self, id: GuiId) -> Option<&W> {
        self.widgets.get(id).and_then(|widget| (**widget).as_any().downcast_ref::<W>())
    }

    /// Mutably borrow a widget as its concrete type
    pub fn get_mut<W: GuiWidget>(&mut self, id: GuiId) -> Option<&mut W> {
        self.widgets
            .get_mut(id)
            .and_then(|widget| (**widget).as_any_mut().downcast_mut::<W>())
    }

    /// Update every visible widget in draw order
    pub fn update(&mut self, input: &mut InputManager) {
        for id in &self.order {
            if let Some(widget) = self.widgets.get_mut(*id) {
                if widget.is_visible() {
                    widget.update(*id, input, &mut self.events);
                }
            }
        }

        if self.events.len() > MAX_QUEUED_EVENTS {
            let dropped = self.events.len() - MAX_QUEUED_EVENTS;
            self.events.drain(..dropped);
            log::warn!("GUI event queue full, dropped {} undrained events", dropped);
        }
    }

    /// Draw every visible widget in insertion order
    pub fn render(&self, renderer: &mut TackRenderer) {
        for id in &self.order {
            if let Some(widget) = self.widgets.get(*id) {
                if widget.is_visible() {
                    widget.render(renderer);
                }
            }
        }
    }

    /// Take the events queued since the last drain
    pub fn drain_events(&mut self) -> Vec<GuiEvent> {
        std::mem::take(&mut self.events)
    }

    /// Dispose of every widget
    pub fn clear(&mut self, input: &mut InputManager) {
        for id in std::mem::take(&mut self.order) {
            if let Some(mut widget) = self.widgets.remove(id) {
                widget.on_dispose(id, input);
            }
        }
        self.events.clear();
    }
}
