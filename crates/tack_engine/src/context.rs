//! Subsystems shared by the frame driver, the game and components
//!
//! [`EngineContext`] replaces process-wide singletons: one instance is built
//! at load and handed by reference to every callback. Components see a
//! narrower [`ComponentContext`] borrowed from it.

use crate::audio::{AudioBackend, AudioManager};
use crate::config::EngineConfig;
use crate::console::TackConsole;
use crate::foundation::logging;
use crate::foundation::math::ScreenSize;
use crate::foundation::time::FrameTime;
use crate::gui::TackGui;
use crate::input::InputManager;
use crate::objects::TackObjectManager;
use crate::physics::PhysicsHost;
use crate::render::{RenderBackend, TackRenderer};

/// Every engine subsystem
pub struct EngineContext {
    /// Settings the window was created with
    pub config: EngineConfig,
    /// Developer console
    pub console: TackConsole,
    /// Audio clips and playback
    pub audio: AudioManager,
    /// Scene graph
    pub objects: TackObjectManager,
    /// Renderer and GPU resources
    pub renderer: TackRenderer,
    /// Keyboard and mouse state
    pub input: InputManager,
    /// GUI widgets
    pub gui: TackGui,
    /// Physics thread host
    pub physics: PhysicsHost,
    /// Frame timing
    pub time: FrameTime,
    quit_requested: bool,
}

impl EngineContext {
    /// Build every subsystem in load order
    ///
    /// Console, audio, scene graph, renderer, input, then GUI.
    pub fn new(
        config: EngineConfig,
        render_backend: Box<dyn RenderBackend>,
        audio_backend: Box<dyn AudioBackend>,
    ) -> Self {
        let screen = ScreenSize::new(config.window.width as f32, config.window.height as f32);

        let console = TackConsole::new(&config.console, logging::sink(), screen);
        let audio = AudioManager::new(audio_backend);
        let objects = TackObjectManager::new();
        let renderer = TackRenderer::new(render_backend, screen, &config.renderer, config.window.vsync);
        let input = InputManager::new();
        let gui = TackGui::new();
        let physics = PhysicsHost::new();
        let time = FrameTime::new(config.timing.update_frequency);

        Self {
            config,
            console,
            audio,
            objects,
            renderer,
            input,
            gui,
            physics,
            time,
            quit_requested: false,
        }
    }

    /// Narrow view handed to component hooks
    pub fn component_context(&mut self) -> ComponentContext<'_> {
        ComponentContext {
            objects: &mut self.objects,
            physics: &self.physics,
            audio: &mut self.audio,
            renderer: &mut self.renderer,
            input: &self.input,
            time: &self.time,
        }
    }

    /// Ask the frame driver to close the window after this frame
    pub fn quit(&mut self) {
        self.quit_requested = true;
    }

    /// Whether [`EngineContext::quit`] was called
    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }
}

/// What component hooks can reach during start, update and close
pub struct ComponentContext<'a> {
    /// Scene graph; objects may be added or removed mid-pass
    pub objects: &'a mut TackObjectManager,
    /// Physics state synced at the start of this update
    pub physics: &'a PhysicsHost,
    /// Audio playback
    pub audio: &'a mut AudioManager,
    /// Sprite creation and other GPU resources
    pub renderer: &'a mut TackRenderer,
    /// Input state for this frame
    pub input: &'a InputManager,
    /// Frame timing
    pub time: &'a FrameTime,
}
