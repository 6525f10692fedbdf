//! Scene graph entity

use super::component::{Capabilities, TackComponent};
use crate::context::ComponentContext;
use crate::foundation::math::Vec2;
use crate::render::TackRenderer;
use std::cell::{Cell, Ref, RefCell, RefMut};
use std::fmt;

/// Transform of an object, handed to component hooks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectState {
    /// Centre in world units
    pub position: Vec2,
    /// Full extents in world units
    pub scale: Vec2,
    /// Clockwise rotation in degrees
    pub rotation: f32,
}

impl Default for ObjectState {
    fn default() -> Self {
        Self {
            position: Vec2::zeros(),
            scale: Vec2::new(1.0, 1.0),
            rotation: 0.0,
        }
    }
}

struct ComponentSlot {
    component: Box<dyn TackComponent>,
    started: bool,
}

/// A named, positioned object owning an ordered list of components
///
/// Objects are created through [`super::TackObjectManager::create`] and
/// shared as [`super::ObjectRef`]. Identity is the reference, not the value;
/// the hash is a printable form of that identity.
pub struct TackObject {
    hash: String,
    name: RefCell<String>,
    state: Cell<ObjectState>,
    components: RefCell<Vec<ComponentSlot>>,
}

impl TackObject {
    pub(super) fn new(hash: String, name: &str, state: ObjectState) -> Self {
        Self {
            hash,
            name: RefCell::new(name.to_string()),
            state: Cell::new(state),
            components: RefCell::new(Vec::new()),
        }
    }

    /// Process-unique identity hash
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Display name
    pub fn name(&self) -> String {
        self.name.borrow().clone()
    }

    /// Rename the object
    pub fn set_name(&self, name: impl Into<String>) {
        *self.name.borrow_mut() = name.into();
    }

    /// Current transform
    pub fn state(&self) -> ObjectState {
        self.state.get()
    }

    /// Replace the transform
    pub fn set_state(&self, state: ObjectState) {
        self.state.set(state);
    }

    /// Position in world units
    pub fn position(&self) -> Vec2 {
        self.state.get().position
    }

    /// Move the object
    pub fn set_position(&self, position: Vec2) {
        self.update_state(|state| state.position = position);
    }

    /// Full extents in world units
    pub fn scale(&self) -> Vec2 {
        self.state.get().scale
    }

    /// Resize the object
    pub fn set_scale(&self, scale: Vec2) {
        self.update_state(|state| state.scale = scale);
    }

    /// Rotation in degrees
    pub fn rotation(&self) -> f32 {
        self.state.get().rotation
    }

    /// Rotate the object
    pub fn set_rotation(&self, degrees: f32) {
        self.update_state(|state| state.rotation = degrees);
    }

    fn update_state(&self, edit: impl FnOnce(&mut ObjectState)) {
        let mut state = self.state.get();
        edit(&mut state);
        self.state.set(state);
    }

    /// First component of type `T`, in attachment order
    ///
    /// Returns `None` when no such component is attached, or while the
    /// object's components are in use by one of its own hooks.
    pub fn get_component<T: TackComponent>(&self) -> Option<Ref<'_, T>> {
        let Ok(components) = self.components.try_borrow() else {
            log::debug!("Components of '{}' are busy", self.hash);
            return None;
        };
        Ref::filter_map(components, |slots| {
            slots
                .iter()
                .find_map(|slot| (*slot.component).as_any().downcast_ref::<T>())
        })
        .ok()
    }

    /// Mutable access to the first component of type `T`
    pub fn get_component_mut<T: TackComponent>(&self) -> Option<RefMut<'_, T>> {
        let Ok(components) = self.components.try_borrow_mut() else {
            log::debug!("Components of '{}' are busy", self.hash);
            return None;
        };
        RefMut::filter_map(components, |slots| {
            slots
                .iter_mut()
                .find_map(|slot| (*slot.component).as_any_mut().downcast_mut::<T>())
        })
        .ok()
    }

    /// Whether a component of type `T` is attached
    pub fn has_component<T: TackComponent>(&self) -> bool {
        self.get_component::<T>().is_some()
    }

    /// Number of attached components
    pub fn component_count(&self) -> usize {
        self.components.try_borrow().map_or(0, |slots| slots.len())
    }

    /// Append a component, returning false if the list is busy
    pub(super) fn push_component(&self, mut component: Box<dyn TackComponent>) -> bool {
        let Ok(mut slots) = self.components.try_borrow_mut() else {
            return false;
        };
        let mut state = self.state.get();
        component.on_attached_to_object(&mut state);
        self.state.set(state);
        slots.push(ComponentSlot {
            component,
            started: false,
        });
        true
    }

    /// Remove the first component of type `T`
    pub(super) fn take_component<T: TackComponent>(&self) -> Option<T> {
        let Ok(mut slots) = self.components.try_borrow_mut() else {
            log::error!("Cannot detach from '{}' while its components are busy", self.hash);
            return None;
        };
        let index = slots
            .iter()
            .position(|slot| (*slot.component).as_any().is::<T>())?;
        let mut slot = slots.remove(index);
        let mut state = self.state.get();
        slot.component.on_detached_from_object(&mut state);
        self.state.set(state);
        slot.component.into_any().downcast::<T>().ok().map(|boxed| *boxed)
    }

    /// Whether any attached component has all of `capabilities`
    pub(crate) fn has_capability(&self, capabilities: Capabilities) -> bool {
        self.components.try_borrow().is_ok_and(|slots| {
            slots
                .iter()
                .any(|slot| slot.component.capabilities().contains(capabilities))
        })
    }

    /// Run a context hook on every component, writing the state back after each
    fn run_hooks(
        &self,
        ctx: &mut ComponentContext<'_>,
        mut hook: impl FnMut(&mut ComponentSlot, &mut ObjectState, &mut ComponentContext<'_>),
    ) {
        let Ok(mut slots) = self.components.try_borrow_mut() else {
            log::warn!("Skipping hooks of '{}': components are busy", self.hash);
            return;
        };
        for slot in slots.iter_mut() {
            let mut state = self.state.get();
            hook(slot, &mut state, ctx);
            self.state.set(state);
        }
    }

    /// Start every component not yet started
    pub(crate) fn start_components(&self, ctx: &mut ComponentContext<'_>) {
        self.run_hooks(ctx, |slot, state, ctx| {
            if !slot.started {
                slot.started = true;
                slot.component.on_start(state, ctx);
            }
        });
    }

    /// Update every component, starting late-attached ones first
    pub(crate) fn update_components(&self, ctx: &mut ComponentContext<'_>) {
        self.run_hooks(ctx, |slot, state, ctx| {
            if !slot.started {
                slot.started = true;
                slot.component.on_start(state, ctx);
            }
            slot.component.on_update(state, ctx);
        });
    }

    /// Close every component
    pub(crate) fn close_components(&self, ctx: &mut ComponentContext<'_>) {
        self.run_hooks(ctx, |slot, state, ctx| slot.component.on_close(state, ctx));
    }

    /// World pass for render-capable components
    pub(crate) fn render_components(&self, renderer: &mut TackRenderer) {
        self.run_render(renderer, Capabilities::RENDER, |component, state, renderer| {
            component.on_render(state, renderer);
        });
    }

    /// GUI pass for GUI-capable components
    pub(crate) fn gui_render_components(&self, renderer: &mut TackRenderer) {
        self.run_render(renderer, Capabilities::GUI_RENDER, |component, state, renderer| {
            component.on_gui_render(state, renderer);
        });
    }

    fn run_render(
        &self,
        renderer: &mut TackRenderer,
        capability: Capabilities,
        mut hook: impl FnMut(&mut dyn TackComponent, &ObjectState, &mut TackRenderer),
    ) {
        let Ok(mut slots) = self.components.try_borrow_mut() else {
            return;
        };
        let state = self.state.get();
        for slot in slots
            .iter_mut()
            .filter(|slot| slot.component.capabilities().contains(capability))
        {
            hook(slot.component.as_mut(), &state, renderer);
        }
    }
}

impl fmt::Debug for TackObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TackObject")
            .field("hash", &self.hash)
            .field("name", &*self.name.borrow())
            .field("state", &self.state.get())
            .field("components", &self.component_count())
            .finish()
    }
}
