//! Frame driver
//!
//! [`GameWindow`] owns the platform window, the [`EngineContext`], the
//! console command table and the game. It runs the Load, Update, Render and
//! Unload phases in a fixed order:
//!
//! - **Load**: subsystems are built (console, audio, scene graph, renderer,
//!   input, GUI), then `on_start`, then every component's start hook, then
//!   the physics thread is launched.
//! - **Update** (fixed rate): physics sync, `on_update`, component updates,
//!   GUI, console and command dispatch, input edge reset.
//! - **Render** (its own rate): world pass, widgets, GUI components,
//!   `on_gui_render`, console overlay on top, swap.
//! - **Unload**: `on_close`, component close hooks, physics stop, then audio,
//!   renderer and console shutdown.

use crate::application::{GameError, TackGame};
use crate::audio::{AudioBackend, SilentAudioBackend};
use crate::config::EngineConfig;
use crate::console::{register_builtin_commands, CommandHandler, CommandRegistry, ConsoleError};
use crate::context::EngineContext;
use crate::foundation::logging;
use crate::foundation::math::Vec2;
use crate::foundation::time::FixedStep;
use crate::input::PlatformEvent;
use crate::objects::TackObjectManager;
use crate::physics::PhysicsError;
use crate::render::{HeadlessBackend, RenderBackend, ViewTransform};
use crate::window::{HeadlessWindow, WindowBackend, WindowError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use thiserror::Error;

static WINDOW_EXISTS: AtomicBool = AtomicBool::new(false);

/// Engine errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Only one game window may exist at a time
    #[error("A game window already exists")]
    WindowAlreadyExists,

    /// Platform window failure
    #[error("Window error: {0}")]
    Window(#[from] WindowError),

    /// Error returned by a game callback
    #[error("Game error: {0}")]
    Game(#[from] GameError),

    /// The physics thread could not start or did not stop cleanly
    #[error("Physics thread error: {0}")]
    PhysicsThread(PhysicsError),
}

/// Lifecycle phase of a [`GameWindow`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Subsystems built, game not started
    Created,
    /// Between load and unload
    Running,
    /// Unloaded
    Closed,
}

/// Marks the single live window; released on drop
struct WindowGuard;

impl WindowGuard {
    fn acquire() -> Result<Self, EngineError> {
        if WINDOW_EXISTS
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            log::error!("A game window already exists, the first one stays active");
            return Err(EngineError::WindowAlreadyExists);
        }
        Ok(Self)
    }
}

impl Drop for WindowGuard {
    fn drop(&mut self) {
        WINDOW_EXISTS.store(false, Ordering::SeqCst);
    }
}

/// The game window and frame loop
pub struct GameWindow<G: TackGame> {
    window: Box<dyn WindowBackend>,
    context: EngineContext,
    commands: CommandRegistry<EngineContext>,
    game: G,
    update_step: FixedStep,
    render_step: FixedStep,
    max_catch_up: u32,
    phase: Phase,
    _guard: WindowGuard,
}

impl<G: TackGame> GameWindow<G> {
    /// Create a game window from explicit backends
    ///
    /// Fails with [`EngineError::WindowAlreadyExists`] while another
    /// `GameWindow` is alive.
    pub fn new(
        config: EngineConfig,
        game: G,
        window: Box<dyn WindowBackend>,
        render_backend: Box<dyn RenderBackend>,
        audio_backend: Box<dyn AudioBackend>,
    ) -> Result<Self, EngineError> {
        let guard = WindowGuard::acquire()?;
        Ok(Self::assemble(guard, config, game, window, render_backend, audio_backend))
    }

    /// Create a display-less window with recording backends
    ///
    /// With a frame limit the loop ends after that many rendered frames.
    pub fn headless(config: EngineConfig, game: G, frame_limit: Option<u64>) -> Result<Self, EngineError> {
        let guard = WindowGuard::acquire()?;
        let mut window = HeadlessWindow::new(&config.window.title, config.window.width, config.window.height);
        if let Some(limit) = frame_limit {
            window = window.with_frame_limit(limit);
        }
        Ok(Self::assemble(
            guard,
            config,
            game,
            Box::new(window),
            Box::new(HeadlessBackend::new()),
            Box::new(SilentAudioBackend::new()),
        ))
    }

    /// Open a GLFW window drawing through `render_backend`
    #[cfg(feature = "glfw-window")]
    pub fn windowed(
        config: EngineConfig,
        game: G,
        render_backend: Box<dyn RenderBackend>,
        audio_backend: Box<dyn AudioBackend>,
    ) -> Result<Self, EngineError> {
        let guard = WindowGuard::acquire()?;
        let window = crate::window::GlfwWindow::new(&config.window.title, config.window.width, config.window.height)
            .map_err(|err| {
                log::error!("Failed to create window: {}", err);
                err
            })?;
        Ok(Self::assemble(guard, config, game, Box::new(window), render_backend, audio_backend))
    }

    fn assemble(
        guard: WindowGuard,
        mut config: EngineConfig,
        mut game: G,
        window: Box<dyn WindowBackend>,
        render_backend: Box<dyn RenderBackend>,
        audio_backend: Box<dyn AudioBackend>,
    ) -> Self {
        logging::init(logging::parse_level(&config.logging.level));
        config.validate();
        log::info!(
            "Creating game window '{}' ({}x{}, update {} Hz, render {} Hz)",
            config.window.title,
            config.window.width,
            config.window.height,
            config.timing.update_frequency,
            config.timing.render_frequency
        );

        let update_step = FixedStep::from_frequency(config.timing.update_frequency);
        let render_step = FixedStep::from_frequency(config.timing.render_frequency);
        let max_catch_up = config.timing.max_catch_up_steps.max(1);

        let mut context = EngineContext::new(config, render_backend, audio_backend);

        let mut commands = CommandRegistry::new();
        register_builtin_commands(&mut commands);
        game.register_commands(&mut commands);
        context.console.set_command_summaries(commands.summaries());
        log::info!("{} console commands registered", commands.len());

        Self {
            window,
            context,
            commands,
            game,
            update_step,
            render_step,
            max_catch_up,
            phase: Phase::Created,
            _guard: guard,
        }
    }

    // Accessors

    /// Shared subsystems
    pub fn context(&self) -> &EngineContext {
        &self.context
    }

    /// Mutable shared subsystems
    pub fn context_mut(&mut self) -> &mut EngineContext {
        &mut self.context
    }

    /// The game
    pub fn game(&self) -> &G {
        &self.game
    }

    /// The mutable game
    pub fn game_mut(&mut self) -> &mut G {
        &mut self.game
    }

    /// The platform window
    pub fn window(&self) -> &dyn WindowBackend {
        self.window.as_ref()
    }

    /// The mutable platform window
    pub fn window_mut(&mut self) -> &mut dyn WindowBackend {
        self.window.as_mut()
    }

    /// Console command table
    pub fn commands(&self) -> &CommandRegistry<EngineContext> {
        &self.commands
    }

    /// Register a console command after creation
    pub fn register_command(
        &mut self,
        call: &str,
        signatures: &[&str],
        description: &str,
        handler: CommandHandler<EngineContext>,
    ) -> Result<(), ConsoleError> {
        self.commands.register(call, signatures, description, handler)?;
        self.context.console.set_command_summaries(self.commands.summaries());
        Ok(())
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether the loop should stop
    pub fn should_close(&self) -> bool {
        self.window.should_close() || self.context.quit_requested()
    }

    // Lifecycle

    /// Load, loop until the window closes, then unload
    pub fn run(&mut self) -> Result<(), EngineError> {
        let result = self.load().and_then(|()| self.run_loop());
        if let Err(err) = &result {
            log::error!("Game loop stopped: {}", err);
        }
        let unloaded = self.unload();
        result.and(unloaded)
    }

    fn run_loop(&mut self) -> Result<(), EngineError> {
        log::info!("Starting main loop...");
        let mut last = Instant::now();

        while !self.should_close() {
            let now = Instant::now();
            let elapsed = now - last;
            last = now;
            self.update_step.accumulate(elapsed);
            self.render_step.accumulate(elapsed);

            self.pump_events();

            let mut steps = 0;
            while self.update_step.consume_tick() {
                self.update_frame()?;
                steps += 1;
                if steps >= self.max_catch_up {
                    log::debug!("Update loop fell behind, dropping backlog");
                    self.update_step.discard_backlog();
                    break;
                }
            }

            if self.render_step.consume_tick() {
                self.render_step.discard_backlog();
                self.render_frame()?;
            }

            if self.should_close() {
                break;
            }
            let wait = self.update_step.until_next_tick().min(self.render_step.until_next_tick());
            if !wait.is_zero() {
                std::thread::sleep(wait);
            }
        }
        Ok(())
    }

    /// Start the game, its components and the physics thread
    pub fn load(&mut self) -> Result<(), EngineError> {
        if self.phase != Phase::Created {
            log::warn!("Game window already loaded");
            return Ok(());
        }
        self.phase = Phase::Running;
        log::info!("Loading game...");

        self.game.on_start(&mut self.context)?;
        TackObjectManager::start_all(&mut self.context.component_context());

        let frequency = self.context.config.timing.update_frequency;
        self.context.physics.start(frequency).map_err(EngineError::PhysicsThread)?;
        log::info!("Game loaded with {} objects", self.context.objects.len());
        Ok(())
    }

    /// Forward pending platform events to the input subsystem
    pub fn pump_events(&mut self) {
        for event in self.window.poll_events() {
            match event {
                PlatformEvent::Resized { width, height } if width > 0 && height > 0 => {
                    self.context.renderer.resize(width, height);
                    self.context.console.resize((width, height).into());
                }
                PlatformEvent::CloseRequested => self.window.set_should_close(true),
                _ => {}
            }
            self.context.input.handle_event(&event);
        }
    }

    /// Run one fixed update
    pub fn update_frame(&mut self) -> Result<(), EngineError> {
        let ctx = &mut self.context;
        ctx.physics.sync();

        self.game.on_update(ctx)?;
        TackObjectManager::update_all(&mut ctx.component_context());

        ctx.gui.update(&mut ctx.input);
        ctx.console.update(&mut ctx.input);
        for line in ctx.console.take_submitted() {
            // Unknown commands are logged by the registry
            let _ = self.commands.dispatch(ctx, &line);
        }

        ctx.input.end_frame();
        ctx.time.record_update();

        if ctx.quit_requested() {
            self.window.set_should_close(true);
        }
        Ok(())
    }

    /// Draw one frame and present it
    pub fn render_frame(&mut self) -> Result<(), EngineError> {
        let ctx = &mut self.context;
        if let Some(vsync) = ctx.renderer.take_vsync_change() {
            self.window.set_vsync(vsync);
        }

        ctx.renderer.begin_frame();
        ctx.objects.render_all(&mut ctx.renderer);
        let view = ctx.objects.main_camera_view().unwrap_or(ViewTransform {
            position: Vec2::zeros(),
            screen: ctx.renderer.screen_size(),
        });
        ctx.renderer.flush_world(view);

        ctx.gui.render(&mut ctx.renderer);
        ctx.objects.gui_render_all(&mut ctx.renderer);
        let game_result = self.game.on_gui_render(ctx);
        ctx.console.render(&mut ctx.renderer);

        ctx.renderer.end_frame();
        self.window.swap_buffers();
        ctx.time.record_render();

        game_result.map_err(EngineError::from)
    }

    /// Close the game and release every subsystem
    pub fn unload(&mut self) -> Result<(), EngineError> {
        if self.phase == Phase::Closed {
            return Ok(());
        }
        let started = self.phase == Phase::Running;
        self.phase = Phase::Closed;
        log::info!("Unloading game...");

        let ctx = &mut self.context;
        let game_result = if started {
            self.game.on_close(ctx)
        } else {
            Ok(())
        };
        TackObjectManager::close_all(&mut ctx.component_context());

        let physics_result = ctx.physics.stop();
        ctx.audio.close();
        ctx.renderer.close();
        ctx.console.close(&mut ctx.input);
        ctx.gui.clear(&mut ctx.input);
        log::info!("Engine shutdown complete");

        physics_result.map_err(EngineError::PhysicsThread)?;
        game_result?;
        Ok(())
    }
}

impl<G: TackGame> Drop for GameWindow<G> {
    fn drop(&mut self) {
        if let Err(err) = self.unload() {
            log::error!("Unload failed: {}", err);
        }
    }
}
