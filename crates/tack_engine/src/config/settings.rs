//! Engine configuration consumed from the host at start-up

use super::Config;
use crate::foundation::math::Colour4;
use crate::input::KeyCode;
use serde::{Deserialize, Serialize};

/// Window configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    /// Window title
    pub title: String,
    /// Window width in pixels
    pub width: u32,
    /// Window height in pixels
    pub height: u32,
    /// Initial vsync setting
    pub vsync: bool,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "Tack Engine".to_string(),
            width: 800,
            height: 600,
            vsync: true,
        }
    }
}

/// Loop cadence configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingSettings {
    /// Update ticks per second, also the physics step rate
    pub update_frequency: f64,
    /// Render ticks per second
    pub render_frequency: f64,
    /// Maximum update ticks run back to back before the backlog is dropped
    pub max_catch_up_steps: u32,
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            update_frequency: 60.0,
            render_frequency: 60.0,
            max_catch_up_steps: 5,
        }
    }
}

/// Developer console configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleSettings {
    /// Key that toggles the console overlay
    pub activation_key: KeyCode,
    /// Lines retained by the log sink
    pub max_log_lines: usize,
    /// Fraction of the window height covered by the overlay
    pub height_fraction: f32,
    /// Font size of log lines and the input field
    pub font_size: f32,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            activation_key: KeyCode::GraveAccent,
            max_log_lines: crate::foundation::logging::DEFAULT_MAX_LINES,
            height_fraction: 0.5,
            font_size: 14.0,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Minimum level recorded (`error`, `warn`, `info`, `debug`, `trace`)
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Renderer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererSettings {
    /// Colour the framebuffer is cleared to every frame
    pub background_colour: Colour4,
    /// Render frames a cached text texture may go unused before eviction
    pub text_cache_frames: u64,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            background_colour: Colour4::rgb(30, 30, 30),
            text_cache_frames: 120,
        }
    }
}

/// Complete engine configuration
///
/// Passed once when the game window is created and immutable for the
/// session. Runtime toggles (vsync, background colour) live in subsystem
/// state and start from these values.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Window settings
    pub window: WindowSettings,
    /// Loop cadence
    pub timing: TimingSettings,
    /// Developer console
    pub console: ConsoleSettings,
    /// Logging
    pub logging: LoggingSettings,
    /// Renderer
    pub renderer: RendererSettings,
}

impl EngineConfig {
    /// Create a configuration with a window title and size
    pub fn new(title: impl Into<String>, width: u32, height: u32) -> Self {
        let mut config = Self::default();
        config.window.title = title.into();
        config.window.width = width;
        config.window.height = height;
        config
    }

    /// Set the update and render frequencies
    pub fn with_frequencies(mut self, update: f64, render: f64) -> Self {
        self.timing.update_frequency = update;
        self.timing.render_frequency = render;
        self
    }

    /// Set the initial vsync state
    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.window.vsync = vsync;
        self
    }

    /// Clamp out-of-range values to their defaults
    ///
    /// Every correction is logged; the returned list describes them.
    pub fn validate(&mut self) -> Vec<String> {
        let defaults = Self::default();
        let mut corrections = Vec::new();

        if self.window.width == 0 || self.window.height == 0 {
            corrections.push(format!(
                "window size {}x{} replaced with {}x{}",
                self.window.width, self.window.height, defaults.window.width, defaults.window.height
            ));
            self.window.width = defaults.window.width;
            self.window.height = defaults.window.height;
        }
        if !(self.timing.update_frequency > 0.0 && self.timing.update_frequency.is_finite()) {
            corrections.push(format!(
                "update frequency {} replaced with {}",
                self.timing.update_frequency, defaults.timing.update_frequency
            ));
            self.timing.update_frequency = defaults.timing.update_frequency;
        }
        if !(self.timing.render_frequency > 0.0 && self.timing.render_frequency.is_finite()) {
            corrections.push(format!(
                "render frequency {} replaced with {}",
                self.timing.render_frequency, defaults.timing.render_frequency
            ));
            self.timing.render_frequency = defaults.timing.render_frequency;
        }
        if self.timing.max_catch_up_steps == 0 {
            corrections.push("max catch-up steps 0 replaced with 1".to_string());
            self.timing.max_catch_up_steps = 1;
        }
        if !(0.05..=1.0).contains(&self.console.height_fraction) {
            let clamped = self.console.height_fraction.clamp(0.05, 1.0);
            corrections.push(format!(
                "console height fraction {} clamped to {}",
                self.console.height_fraction, clamped
            ));
            self.console.height_fraction = if clamped.is_nan() {
                defaults.console.height_fraction
            } else {
                clamped
            };
        }
        if self.console.font_size <= 0.0 {
            corrections.push(format!(
                "console font size {} replaced with {}",
                self.console.font_size, defaults.console.font_size
            ));
            self.console.font_size = defaults.console.font_size;
        }

        if self.logging.level.parse::<log::LevelFilter>().is_err() {
            corrections.push(format!(
                "log level '{}' replaced with '{}'",
                self.logging.level, defaults.logging.level
            ));
            self.logging.level = defaults.logging.level;
        }

        for correction in &corrections {
            log::warn!("Config: {}", correction);
        }
        corrections
    }
}

impl Config for EngineConfig {}
