//! Physics thread ownership and the snapshot handoff

use super::{
    BodyDescriptor, BodyHandle, BodyState, EulerSolver, ForceMode, PhysicsCommand, PhysicsError,
    PhysicsSnapshot, PhysicsSolver, SimBody,
};
use crate::foundation::math::Vec2;
use crate::foundation::time::Stopwatch;
use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// Cloneable sending half used by components to talk to the simulation
///
/// Commands sent before the thread starts are queued and applied on its
/// first step.
#[derive(Clone)]
pub struct PhysicsCommands {
    sender: Sender<PhysicsCommand>,
    next_handle: Arc<AtomicU64>,
}

impl PhysicsCommands {
    /// Register a body, returning its handle immediately
    pub fn register(&self, descriptor: BodyDescriptor) -> BodyHandle {
        let handle = BodyHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));
        self.send(PhysicsCommand::Register(handle, descriptor));
        handle
    }

    /// Remove a body from the simulation
    pub fn deregister(&self, handle: BodyHandle) {
        self.send(PhysicsCommand::Deregister(handle));
    }

    /// Apply a force or impulse on the next step
    pub fn add_force(&self, handle: BodyHandle, vector: Vec2, mode: ForceMode) {
        self.send(PhysicsCommand::AddForce(handle, vector, mode));
    }

    /// Move a body without touching its velocity
    pub fn set_position(&self, handle: BodyHandle, position: Vec2) {
        self.send(PhysicsCommand::SetPosition(handle, position));
    }

    /// Replace world gravity
    pub fn set_gravity(&self, gravity: Vec2) {
        self.send(PhysicsCommand::SetGravity(gravity));
    }

    fn send(&self, command: PhysicsCommand) {
        if let Err(err) = self.sender.send(command) {
            log::debug!("Physics command dropped, simulation is shut down: {:?}", err.0);
        }
    }
}

/// Owner of the physics thread
///
/// The main thread reads simulation results only through [`PhysicsHost::sync`]
/// and the synced snapshot, never while the thread is writing them.
pub struct PhysicsHost {
    commands: PhysicsCommands,
    receiver: Option<Receiver<PhysicsCommand>>,
    solver: Option<Box<dyn PhysicsSolver>>,
    staging: Arc<Mutex<PhysicsSnapshot>>,
    current: PhysicsSnapshot,
    running: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl PhysicsHost {
    /// Create a host using the built-in Euler solver
    pub fn new() -> Self {
        Self::with_solver(Box::new(EulerSolver::default()))
    }

    /// Create a host stepping a custom solver
    pub fn with_solver(solver: Box<dyn PhysicsSolver>) -> Self {
        let (sender, receiver) = unbounded();
        Self {
            commands: PhysicsCommands {
                sender,
                next_handle: Arc::new(AtomicU64::new(1)),
            },
            receiver: Some(receiver),
            solver: Some(solver),
            staging: Arc::new(Mutex::new(PhysicsSnapshot::default())),
            current: PhysicsSnapshot::default(),
            running: Arc::new(AtomicBool::new(false)),
            thread: None,
        }
    }

    /// Command sender for components
    pub fn commands(&self) -> PhysicsCommands {
        self.commands.clone()
    }

    /// Launch the simulation thread stepping `update_frequency` times per second
    ///
    /// A host can only be started once.
    pub fn start(&mut self, update_frequency: f64) -> Result<(), PhysicsError> {
        let (Some(receiver), Some(solver)) = (self.receiver.take(), self.solver.take()) else {
            return Err(PhysicsError::AlreadyRunning);
        };

        let frequency = if update_frequency > 0.0 && update_frequency.is_finite() {
            update_frequency
        } else {
            log::warn!("Invalid physics frequency {}, using 60 Hz", update_frequency);
            60.0
        };
        let interval = Duration::from_secs_f64(1.0 / frequency);

        self.running.store(true, Ordering::SeqCst);
        let running = Arc::clone(&self.running);
        let staging = Arc::clone(&self.staging);

        let thread = std::thread::Builder::new()
            .name("tack-physics".to_string())
            .spawn(move || simulation_loop(&receiver, solver, &staging, &running, interval))
            .map_err(|err| {
                self.running.store(false, Ordering::SeqCst);
                PhysicsError::SpawnFailed(err.to_string())
            })?;

        self.thread = Some(thread);
        log::info!("Physics thread started at {:.1} Hz", frequency);
        Ok(())
    }

    /// Whether the simulation thread is running
    pub fn is_running(&self) -> bool {
        self.thread.is_some()
    }

    /// Copy the latest published snapshot, called once at the start of every update
    pub fn sync(&mut self) {
        self.current.clone_from(&self.staging.lock());
    }

    /// Snapshot synced at the start of this frame
    pub fn snapshot(&self) -> &PhysicsSnapshot {
        &self.current
    }

    /// State of a body as of the last sync
    pub fn body_state(&self, handle: BodyHandle) -> Option<BodyState> {
        self.current.bodies.get(&handle).copied()
    }

    /// Replace world gravity
    pub fn set_gravity(&self, gravity: Vec2) {
        self.commands.set_gravity(gravity);
    }

    /// Signal the thread to stop and join it
    ///
    /// Stopping a host that never started is a no-op.
    pub fn stop(&mut self) -> Result<(), PhysicsError> {
        let Some(thread) = self.thread.take() else {
            return Ok(());
        };
        self.running.store(false, Ordering::SeqCst);
        match thread.join() {
            Ok(()) => {
                log::info!("Physics thread stopped");
                Ok(())
            }
            Err(_) => {
                log::error!("Physics thread panicked");
                Err(PhysicsError::ThreadPanicked)
            }
        }
    }
}

impl Default for PhysicsHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for PhysicsHost {
    fn drop(&mut self) {
        if let Err(err) = self.stop() {
            log::error!("Physics shutdown failed: {}", err);
        }
    }
}

fn simulation_loop(
    receiver: &Receiver<PhysicsCommand>,
    mut solver: Box<dyn PhysicsSolver>,
    staging: &Mutex<PhysicsSnapshot>,
    running: &AtomicBool,
    interval: Duration,
) {
    let mut bodies: Vec<SimBody> = Vec::new();
    let mut step = 0u64;
    let dt = interval.as_secs_f32();

    while running.load(Ordering::SeqCst) {
        let stopwatch = Stopwatch::start_new();

        while let Ok(command) = receiver.try_recv() {
            apply_command(&mut bodies, solver.as_mut(), command);
        }

        solver.step(&mut bodies, dt);
        step += 1;

        let published = PhysicsSnapshot {
            step,
            bodies: bodies
                .iter()
                .map(|body| (body.handle, body.state()))
                .collect::<HashMap<_, _>>(),
        };
        *staging.lock() = published;

        let remaining = interval.saturating_sub(stopwatch.elapsed());
        if !remaining.is_zero() {
            std::thread::sleep(remaining);
        }
    }
}

fn apply_command(bodies: &mut Vec<SimBody>, solver: &mut dyn PhysicsSolver, command: PhysicsCommand) {
    match command {
        PhysicsCommand::Register(handle, descriptor) => {
            if let Some(existing) = bodies.iter_mut().find(|body| body.handle == handle) {
                log::warn!("Body {:?} registered twice, replacing", handle);
                *existing = SimBody::new(handle, descriptor);
            } else {
                bodies.push(SimBody::new(handle, descriptor));
            }
        }
        PhysicsCommand::Deregister(handle) => {
            let before = bodies.len();
            bodies.retain(|body| body.handle != handle);
            if bodies.len() == before {
                log::debug!("Deregister of unknown body {:?}", handle);
            }
        }
        PhysicsCommand::AddForce(handle, vector, mode) => {
            match bodies.iter_mut().find(|body| body.handle == handle) {
                Some(body) => body.apply(vector, mode),
                None => log::debug!("Force on unknown body {:?} ignored", handle),
            }
        }
        PhysicsCommand::SetPosition(handle, position) => {
            if let Some(body) = bodies.iter_mut().find(|body| body.handle == handle) {
                body.position = position;
            }
        }
        PhysicsCommand::SetGravity(gravity) => solver.set_gravity(gravity),
    }
}
