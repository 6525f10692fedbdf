//! # Tack Engine
//!
//! A 2D game engine runtime: a game window driving a fixed-rate update loop
//! and an independent render loop, a scene graph of objects with pluggable
//! components, a textured-quad renderer, an immediate-mode GUI and an
//! in-game developer console.
//!
//! ## Features
//!
//! - **Objects and components**: named transforms carrying ordered
//!   behaviour components with start, update, render and close hooks
//! - **Quad renderer**: flat colour, sprite and animated sprite-sheet quads
//!   behind a pluggable [`render::RenderBackend`]
//! - **GUI**: buttons, toggles, text boxes and panels
//! - **Console**: log overlay and dotted-path commands (`renderer.setVSync`)
//! - **Physics**: background-thread integrator with snapshot hand-off
//! - **Audio**: WAV clips played through a pluggable backend
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tack_engine::prelude::*;
//!
//! struct MyGame;
//!
//! impl TackGame for MyGame {
//!     fn on_start(&mut self, ctx: &mut EngineContext) -> Result<(), GameError> {
//!         let player = ctx.objects.create("player", Vec2::zeros(), Vec2::new(32.0, 32.0));
//!         ctx.objects.attach_component(&player, QuadRenderer::colour(Colour4::RED));
//!         Ok(())
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Logging starts at `config.logging.level` when the window is created
//!     let config = EngineConfig::new("My Game", 800, 600);
//!     let mut window = GameWindow::headless(config, MyGame, Some(600))?;
//!     window.run()?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod audio;
pub mod components;
pub mod config;
pub mod console;
pub mod foundation;
pub mod gui;
pub mod input;
pub mod objects;
pub mod physics;
pub mod render;
pub mod window;

mod application;
mod context;
mod engine;

#[cfg(test)]
mod tests;

pub use application::{GameError, TackGame};
pub use context::{ComponentContext, EngineContext};
pub use engine::{EngineError, GameWindow, Phase};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        audio::{AudioManager, ClipId, WavData},
        components::{AudioSource, Camera, PhysicsBody, QuadRenderer, RenderMode},
        config::{Config, EngineConfig},
        console::CommandRegistry,
        foundation::math::{Colour4, ScreenSize, UiRect, Vec2},
        gui::{GuiBox, GuiButton, GuiEvent, GuiId, GuiStyle, GuiTextBox, GuiToggle},
        input::{InputManager, KeyCode, MouseButton},
        objects::{Capabilities, ObjectRef, ObjectState, TackComponent, TackObject},
        physics::ForceMode,
        render::{Sprite, SpriteSheet, TackRenderer},
        ComponentContext, EngineContext, EngineError, GameError, GameWindow, TackGame,
    };
}
