//! Component trait

use super::ObjectState;
use crate::context::ComponentContext;
use crate::render::TackRenderer;
use bitflags::bitflags;
use std::any::Any;

bitflags! {
    /// Optional roles a component takes part in
    ///
    /// Render hooks only run for components that declare the matching flag.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u8 {
        /// `on_render` is called during the world pass
        const RENDER = 1 << 0;
        /// `on_gui_render` is called during the GUI pass
        const GUI_RENDER = 1 << 1;
        /// The component defines a camera view
        const CAMERA = 1 << 2;
    }
}

/// Upcasting support for component downcasts
pub trait AsAny: Any {
    /// As `&dyn Any`
    fn as_any(&self) -> &dyn Any;
    /// As `&mut dyn Any`
    fn as_any_mut(&mut self) -> &mut dyn Any;
    /// As `Box<dyn Any>`
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// Behaviour attached to a [`super::TackObject`]
///
/// Every hook has a no-op default. The owning object's state is passed in
/// on each call; components never hold a reference back to their object.
#[allow(unused_variables)]
pub trait TackComponent: AsAny {
    /// Roles this component takes part in
    fn capabilities(&self) -> Capabilities {
        Capabilities::empty()
    }

    /// Called once before the component's first update
    fn on_start(&mut self, state: &mut ObjectState, ctx: &mut ComponentContext<'_>) {}

    /// Called every update tick
    fn on_update(&mut self, state: &mut ObjectState, ctx: &mut ComponentContext<'_>) {}

    /// Called during the world pass, requires [`Capabilities::RENDER`]
    fn on_render(&mut self, state: &ObjectState, renderer: &mut TackRenderer) {}

    /// Called during the GUI pass, requires [`Capabilities::GUI_RENDER`]
    fn on_gui_render(&mut self, state: &ObjectState, renderer: &mut TackRenderer) {}

    /// Called once at unload
    fn on_close(&mut self, state: &mut ObjectState, ctx: &mut ComponentContext<'_>) {}

    /// Called when attached to an object
    fn on_attached_to_object(&mut self, state: &mut ObjectState) {}

    /// Called when detached from an object
    fn on_detached_from_object(&mut self, state: &mut ObjectState) {}
}
