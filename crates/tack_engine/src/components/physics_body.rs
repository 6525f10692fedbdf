//! Physics body component

use crate::context::ComponentContext;
use crate::foundation::math::Vec2;
use crate::objects::{ObjectState, TackComponent};
use crate::physics::{
    BodyDescriptor, BodyHandle, BodyProperties, ForceMode, PhysicsCommands, PhysicsError,
};

/// Simulated body driving the owning object's position
///
/// Registers with the physics thread on start. Every update the object's
/// position is overwritten with the simulated position from the snapshot
/// synced at the start of that frame.
pub struct PhysicsBody {
    properties: BodyProperties,
    is_static: bool,
    initial_velocity: Vec2,
    velocity: Vec2,
    handle: Option<BodyHandle>,
    commands: Option<PhysicsCommands>,
    pending_forces: Vec<(Vec2, ForceMode)>,
}

impl PhysicsBody {
    /// Create a dynamic body
    ///
    /// Fails fast on a non-positive or non-finite mass, a zero gravity
    /// modifier or a negative drag.
    pub fn new(mass: f32, gravity_modifier: f32, drag: f32) -> Result<Self, PhysicsError> {
        Ok(Self::from_properties(BodyProperties::new(mass, gravity_modifier, drag)?))
    }

    /// Create a body from validated properties
    pub fn from_properties(properties: BodyProperties) -> Self {
        Self {
            properties,
            is_static: false,
            initial_velocity: Vec2::zeros(),
            velocity: Vec2::zeros(),
            handle: None,
            commands: None,
            pending_forces: Vec::new(),
        }
    }

    /// Make the body immovable
    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    /// Set the velocity the body starts with
    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.initial_velocity = velocity;
        self.velocity = velocity;
        self
    }

    /// Physical properties
    pub fn properties(&self) -> BodyProperties {
        self.properties
    }

    /// Velocity as of the last update
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Simulation handle, once started
    pub fn handle(&self) -> Option<BodyHandle> {
        self.handle
    }

    /// Apply a force or impulse
    ///
    /// Before the body is registered the force is queued and sent on start.
    pub fn add_force(&mut self, vector: Vec2, mode: ForceMode) {
        match (&self.commands, self.handle) {
            (Some(commands), Some(handle)) => commands.add_force(handle, vector, mode),
            _ => self.pending_forces.push((vector, mode)),
        }
    }

    /// Move the simulated body, keeping its velocity
    pub fn teleport(&self, position: Vec2) {
        if let (Some(commands), Some(handle)) = (&self.commands, self.handle) {
            commands.set_position(handle, position);
        }
    }

    fn deregister(&mut self) {
        if let (Some(commands), Some(handle)) = (self.commands.take(), self.handle.take()) {
            commands.deregister(handle);
        }
    }
}

impl TackComponent for PhysicsBody {
    fn on_start(&mut self, state: &mut ObjectState, ctx: &mut ComponentContext<'_>) {
        let commands = ctx.physics.commands();
        let handle = commands.register(BodyDescriptor {
            position: state.position,
            velocity: self.initial_velocity,
            properties: self.properties,
            is_static: self.is_static,
        });
        for (vector, mode) in self.pending_forces.drain(..) {
            commands.add_force(handle, vector, mode);
        }
        self.handle = Some(handle);
        self.commands = Some(commands);
    }

    fn on_update(&mut self, state: &mut ObjectState, ctx: &mut ComponentContext<'_>) {
        let Some(handle) = self.handle else {
            return;
        };
        if let Some(body) = ctx.physics.body_state(handle) {
            state.position = body.position;
            self.velocity = body.velocity;
        }
    }

    fn on_close(&mut self, _state: &mut ObjectState, _ctx: &mut ComponentContext<'_>) {
        self.deregister();
    }

    fn on_detached_from_object(&mut self, _state: &mut ObjectState) {
        self.deregister();
    }
}

impl Drop for PhysicsBody {
    fn drop(&mut self) {
        self.deregister();
    }
}
