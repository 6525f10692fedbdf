//! Simulation step interface and the built-in integrator

use super::{BodyDescriptor, BodyHandle, BodyState, ForceMode};
use crate::foundation::math::Vec2;

/// A body as seen by the solver
#[derive(Debug, Clone)]
pub struct SimBody {
    /// Handle assigned by the main thread
    pub handle: BodyHandle,
    /// Creation parameters
    pub descriptor: BodyDescriptor,
    /// Current position
    pub position: Vec2,
    /// Current velocity
    pub velocity: Vec2,
    /// Forces accumulated since the last step
    pub pending_force: Vec2,
}

impl SimBody {
    /// Create a body at its descriptor's initial state
    pub fn new(handle: BodyHandle, descriptor: BodyDescriptor) -> Self {
        Self {
            handle,
            descriptor,
            position: descriptor.position,
            velocity: descriptor.velocity,
            pending_force: Vec2::zeros(),
        }
    }

    /// Apply a force or an impulse
    pub fn apply(&mut self, vector: Vec2, mode: ForceMode) {
        if self.descriptor.is_static {
            return;
        }
        match mode {
            ForceMode::Force => self.pending_force += vector,
            ForceMode::Impulse => self.velocity += vector / self.descriptor.properties.mass(),
        }
    }

    /// Published view of the body
    pub fn state(&self) -> BodyState {
        BodyState {
            position: self.position,
            velocity: self.velocity,
        }
    }
}

/// Advances the simulation by one fixed step
///
/// Implementations run on the physics thread.
pub trait PhysicsSolver: Send {
    /// Step every body forward by `dt` seconds
    fn step(&mut self, bodies: &mut [SimBody], dt: f32);

    /// Replace world gravity
    fn set_gravity(&mut self, gravity: Vec2);
}

/// Semi-implicit Euler integration with gravity and linear drag
///
/// No collision detection or response.
#[derive(Debug, Clone)]
pub struct EulerSolver {
    gravity: Vec2,
}

impl EulerSolver {
    /// Create a solver with the given world gravity
    pub fn new(gravity: Vec2) -> Self {
        Self { gravity }
    }
}

impl Default for EulerSolver {
    fn default() -> Self {
        Self::new(Vec2::new(0.0, -9.81))
    }
}

impl PhysicsSolver for EulerSolver {
    fn step(&mut self, bodies: &mut [SimBody], dt: f32) {
        for body in bodies.iter_mut().filter(|body| !body.descriptor.is_static) {
            let properties = body.descriptor.properties;
            let acceleration = self.gravity * properties.gravity_modifier()
                + body.pending_force / properties.mass();
            body.velocity += acceleration * dt;
            body.velocity *= (1.0 - properties.drag() * dt).max(0.0);
            body.position += body.velocity * dt;
            body.pending_force = Vec2::zeros();
        }
    }

    fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = gravity;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::BodyProperties;
    use approx::assert_relative_eq;

    fn body(is_static: bool) -> SimBody {
        SimBody::new(
            BodyHandle(1),
            BodyDescriptor {
                position: Vec2::zeros(),
                velocity: Vec2::zeros(),
                properties: BodyProperties::new(2.0, 1.0, 0.0).unwrap(),
                is_static,
            },
        )
    }

    #[test]
    fn test_gravity_integration() {
        let mut solver = EulerSolver::new(Vec2::new(0.0, -10.0));
        let mut bodies = vec![body(false)];

        solver.step(&mut bodies, 0.5);
        assert_relative_eq!(bodies[0].velocity.y, -5.0);
        assert_relative_eq!(bodies[0].position.y, -2.5);
    }

    #[test]
    fn test_force_divides_by_mass_and_clears() {
        let mut solver = EulerSolver::new(Vec2::zeros());
        let mut bodies = vec![body(false)];

        bodies[0].apply(Vec2::new(4.0, 0.0), ForceMode::Force);
        solver.step(&mut bodies, 1.0);
        assert_relative_eq!(bodies[0].velocity.x, 2.0);
        assert_eq!(bodies[0].pending_force, Vec2::zeros());

        solver.step(&mut bodies, 1.0);
        assert_relative_eq!(bodies[0].velocity.x, 2.0);
    }

    #[test]
    fn test_impulse_is_immediate() {
        let mut bodies = vec![body(false)];
        bodies[0].apply(Vec2::new(0.0, 6.0), ForceMode::Impulse);
        assert_relative_eq!(bodies[0].velocity.y, 3.0);
    }

    #[test]
    fn test_static_bodies_do_not_move() {
        let mut solver = EulerSolver::default();
        let mut bodies = vec![body(true)];
        bodies[0].apply(Vec2::new(10.0, 10.0), ForceMode::Impulse);
        solver.step(&mut bodies, 1.0);
        assert_eq!(bodies[0].position, Vec2::zeros());
    }
}
