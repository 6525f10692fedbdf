//! Physics collaborator
//!
//! The simulation runs on one dedicated background thread owned by the
//! [`PhysicsHost`]. The main thread never touches simulation state directly:
//!
//! - body registration, removal and forces travel to the thread as
//!   [`PhysicsCommand`]s over a channel;
//! - after every step the thread publishes a [`PhysicsSnapshot`] into a
//!   locked staging buffer;
//! - at the start of every update tick the main thread copies the staging
//!   buffer ([`PhysicsHost::sync`]), so all reads within one frame see the
//!   same simulation state.

mod host;
mod solver;

pub use host::{PhysicsCommands, PhysicsHost};
pub use solver::{EulerSolver, PhysicsSolver, SimBody};

use crate::foundation::math::Vec2;
use std::collections::HashMap;
use thiserror::Error;

/// Physics errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PhysicsError {
    /// Mass must be positive and finite
    #[error("Invalid body mass {0}: must be positive and finite")]
    InvalidMass(f32),

    /// A zero gravity modifier would freeze the body on the gravity axis
    #[error("Gravity modifier must not be zero")]
    ZeroGravityModifier,

    /// Drag must be finite and non-negative
    #[error("Invalid drag {0}: must be finite and non-negative")]
    InvalidDrag(f32),

    /// The simulation thread is already running
    #[error("Physics thread already running")]
    AlreadyRunning,

    /// The simulation thread could not be spawned
    #[error("Failed to spawn physics thread: {0}")]
    SpawnFailed(String),

    /// The simulation thread panicked before it could be joined
    #[error("Physics thread panicked")]
    ThreadPanicked,
}

/// Identifier of a simulated body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle(pub u64);

/// How a force vector is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForceMode {
    /// Continuous force, integrated over the next step (`a = F / m`)
    Force,
    /// Instant change of momentum (`Δv = J / m`)
    Impulse,
}

/// Validated physical properties of a body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyProperties {
    mass: f32,
    gravity_modifier: f32,
    drag: f32,
}

impl BodyProperties {
    /// Validate and create body properties
    ///
    /// Invalid values are caller-contract violations and are returned as
    /// errors rather than clamped.
    pub fn new(mass: f32, gravity_modifier: f32, drag: f32) -> Result<Self, PhysicsError> {
        if !(mass > 0.0 && mass.is_finite()) {
            return Err(PhysicsError::InvalidMass(mass));
        }
        if gravity_modifier == 0.0 {
            return Err(PhysicsError::ZeroGravityModifier);
        }
        if !(drag >= 0.0 && drag.is_finite()) {
            return Err(PhysicsError::InvalidDrag(drag));
        }
        Ok(Self { mass, gravity_modifier, drag })
    }

    /// Mass in kilograms
    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Multiplier applied to world gravity
    pub fn gravity_modifier(&self) -> f32 {
        self.gravity_modifier
    }

    /// Linear drag coefficient per second
    pub fn drag(&self) -> f32 {
        self.drag
    }
}

impl Default for BodyProperties {
    fn default() -> Self {
        Self { mass: 1.0, gravity_modifier: 1.0, drag: 0.0 }
    }
}

/// Everything the simulation needs to create a body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDescriptor {
    /// Initial position in world units
    pub position: Vec2,
    /// Initial velocity in world units per second
    pub velocity: Vec2,
    /// Physical properties
    pub properties: BodyProperties,
    /// Static bodies never move
    pub is_static: bool,
}

/// Position and velocity published by the simulation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    /// World position
    pub position: Vec2,
    /// Velocity in world units per second
    pub velocity: Vec2,
}

/// Simulation state published after one step
#[derive(Debug, Clone, Default)]
pub struct PhysicsSnapshot {
    /// Step counter of the simulation thread
    pub step: u64,
    /// Per-body state
    pub bodies: HashMap<BodyHandle, BodyState>,
}

/// Requests from the main thread to the simulation thread
#[derive(Debug, Clone, PartialEq)]
pub enum PhysicsCommand {
    /// Add a body
    Register(BodyHandle, BodyDescriptor),
    /// Remove a body
    Deregister(BodyHandle),
    /// Apply a force or impulse to a body
    AddForce(BodyHandle, Vec2, ForceMode),
    /// Teleport a body, keeping its velocity
    SetPosition(BodyHandle, Vec2),
    /// Replace world gravity
    SetGravity(Vec2),
}
