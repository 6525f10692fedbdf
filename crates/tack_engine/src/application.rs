//! Game trait and lifecycle callbacks

use crate::console::CommandRegistry;
use crate::context::EngineContext;
use thiserror::Error;

/// Game lifecycle trait
///
/// Implement this trait and hand the game to [`crate::GameWindow`]. Every
/// callback receives the shared [`EngineContext`].
#[allow(unused_variables)]
pub trait TackGame {
    /// Add game-specific console commands
    ///
    /// Called once before `on_start`, after the built-in commands exist.
    fn register_commands(&mut self, registry: &mut CommandRegistry<EngineContext>) {}

    /// Called once after every subsystem is loaded and before any object's
    /// components start. Create the initial objects and widgets here.
    fn on_start(&mut self, ctx: &mut EngineContext) -> Result<(), GameError>;

    /// Called every fixed update, before component update hooks
    fn on_update(&mut self, ctx: &mut EngineContext) -> Result<(), GameError> {
        Ok(())
    }

    /// Called every render after the world pass and widgets, below the console
    fn on_gui_render(&mut self, ctx: &mut EngineContext) -> Result<(), GameError> {
        Ok(())
    }

    /// Called once when the window closes, before subsystems shut down
    fn on_close(&mut self, ctx: &mut EngineContext) -> Result<(), GameError> {
        Ok(())
    }
}

/// Game-level errors
#[derive(Error, Debug)]
pub enum GameError {
    /// Asset could not be loaded
    #[error("Asset error: {0}")]
    Asset(String),

    /// Configuration problem
    #[error("Config error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Audio problem
    #[error("Audio error: {0}")]
    Audio(#[from] crate::audio::AudioError),

    /// Physics contract violation
    #[error("Physics error: {0}")]
    Physics(#[from] crate::physics::PhysicsError),

    /// Game logic error
    #[error("Game logic error: {0}")]
    Logic(String),
}
