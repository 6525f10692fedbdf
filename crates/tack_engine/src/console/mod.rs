//! Developer console overlay
//!
//! The console toggles between hidden and visible on the activation key's
//! down edge. While visible it shows the newest log sink lines, scrolls with
//! the mouse wheel or page keys, and owns a single-line input field that
//! takes keyboard focus when clicked. Submitted lines are queued for the
//! engine to dispatch through a [`CommandRegistry`].

mod builtin;
mod commands;

pub use builtin::register_builtin_commands;
pub use commands::{CommandHandler, CommandRegistry, CommandSummary};

use crate::config::ConsoleSettings;
use crate::foundation::logging::{LogLine, LogSink};
use crate::foundation::math::{Colour4, ScreenSize, UiRect, Vec2};
use crate::input::{BufferedInput, FocusOwner, InputManager, KeyCode, MouseButton};
use crate::render::TackRenderer;
use thiserror::Error;

/// Console errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsoleError {
    /// A command with this call string already exists
    #[error("Command '{0}' is already registered")]
    DuplicateCommand(String),

    /// Call strings must be non-empty and contain no whitespace
    #[error("Invalid command name '{0}'")]
    InvalidCommandName(String),

    /// No command matches the first token
    #[error("Unknown command '{0}'")]
    UnknownCommand(String),

    /// The submitted line was blank
    #[error("Empty command line")]
    EmptyCommand,
}

/// Overlay visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleVisibility {
    /// Not drawn, ignores input
    Hidden,
    /// Drawn above everything else
    Visible,
}

/// Input field state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFieldState {
    /// Not receiving keystrokes
    Idle,
    /// Holds input focus
    Focused,
}

const LINES_PER_SCROLL_STEP: usize = 3;
const LINE_SPACING: f32 = 1.25;
const PADDING: f32 = 4.0;

/// The developer console
pub struct TackConsole {
    sink: LogSink,
    settings: ConsoleSettings,
    visibility: ConsoleVisibility,
    field: InputFieldState,
    input_line: String,
    scroll: usize,
    cleared_at: u64,
    submitted: Vec<String>,
    summaries: Vec<CommandSummary>,
    screen: ScreenSize,
}

impl TackConsole {
    /// Create a hidden console reading from `sink`
    pub fn new(settings: &ConsoleSettings, sink: LogSink, screen: ScreenSize) -> Self {
        sink.set_max_lines(settings.max_log_lines);
        log::info!("Console initialized (toggle with {:?})", settings.activation_key);
        Self {
            sink,
            settings: settings.clone(),
            visibility: ConsoleVisibility::Hidden,
            field: InputFieldState::Idle,
            input_line: String::new(),
            scroll: 0,
            cleared_at: 0,
            submitted: Vec::new(),
            summaries: Vec::new(),
            screen,
        }
    }

    // State

    /// Current visibility
    pub fn visibility(&self) -> ConsoleVisibility {
        self.visibility
    }

    /// Whether the overlay is shown
    pub fn is_visible(&self) -> bool {
        self.visibility == ConsoleVisibility::Visible
    }

    /// Input field state
    pub fn field_state(&self) -> InputFieldState {
        self.field
    }

    /// Text typed so far
    pub fn input_line(&self) -> &str {
        &self.input_line
    }

    /// Replace the typed text
    pub fn set_input_line(&mut self, line: &str) {
        self.input_line = line.to_string();
    }

    /// Lines scrolled back from the newest
    pub fn scroll_offset(&self) -> usize {
        self.scroll
    }

    /// Show or hide the overlay
    pub fn set_visible(&mut self, visible: bool, input: &mut InputManager) {
        self.visibility = if visible {
            ConsoleVisibility::Visible
        } else {
            ConsoleVisibility::Hidden
        };
        if !visible {
            self.unfocus(input);
        }
        input.clear_buffered_input();
    }

    /// Track the window size for layout
    pub fn resize(&mut self, screen: ScreenSize) {
        self.screen = screen;
    }

    /// Area covered by the overlay
    pub fn overlay_rect(&self) -> UiRect {
        UiRect::new(
            0.0,
            0.0,
            self.screen.width,
            (self.screen.height * self.settings.height_fraction.clamp(0.1, 1.0)).floor(),
        )
    }

    /// Area of the input field at the bottom of the overlay
    pub fn input_rect(&self) -> UiRect {
        let overlay = self.overlay_rect();
        let height = self.settings.font_size + PADDING * 2.0;
        UiRect::new(overlay.x, overlay.y + overlay.height - height, overlay.width, height)
    }

    fn line_height(&self) -> f32 {
        self.settings.font_size * LINE_SPACING
    }

    /// Log lines that fit above the input field
    pub fn visible_line_capacity(&self) -> usize {
        let log_height = self.overlay_rect().height - self.input_rect().height - PADDING;
        (log_height / self.line_height()).max(0.0) as usize
    }

    /// Lines currently shown, oldest first
    pub fn visible_lines(&self) -> Vec<LogLine> {
        self.sink.tail(self.visible_line_capacity(), self.scroll, self.cleared_at)
    }

    // Commands

    /// Store the command list shown by `help`
    pub fn set_command_summaries(&mut self, summaries: Vec<CommandSummary>) {
        self.summaries = summaries;
    }

    /// Command list shown by `help`
    pub fn command_summaries(&self) -> &[CommandSummary] {
        &self.summaries
    }

    /// Submit the input line: echo it, queue it and clear the field
    pub fn submit_input(&mut self) {
        let line = std::mem::take(&mut self.input_line);
        self.submit(&line);
    }

    /// Queue a line for dispatch as if it had been typed
    pub fn submit(&mut self, line: &str) {
        self.input_line.clear();
        self.scroll = 0;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return;
        }
        log::info!("> {}", trimmed);
        self.submitted.push(trimmed.to_string());
    }

    /// Take the lines submitted since the last call
    pub fn take_submitted(&mut self) -> Vec<String> {
        std::mem::take(&mut self.submitted)
    }

    /// Hide every line logged so far
    pub fn clear(&mut self) {
        self.cleared_at = self.sink.total_appended();
        self.scroll = 0;
    }

    // Per-frame

    /// Advance toggle, scroll, focus and typing
    pub fn update(&mut self, input: &mut InputManager) {
        if input.key_pressed(self.settings.activation_key) {
            let show = !self.is_visible();
            self.set_visible(show, input);
        }
        if !self.is_visible() {
            return;
        }

        self.update_scroll(input);

        if input.mouse_pressed(MouseButton::Left) {
            if self.input_rect().contains(input.mouse_position()) {
                if input.claim_focus(FocusOwner::Console) {
                    self.field = InputFieldState::Focused;
                }
            } else {
                self.unfocus(input);
            }
        }

        if self.field == InputFieldState::Focused && !input.has_focus(FocusOwner::Console) {
            self.field = InputFieldState::Idle;
        }
        if self.field != InputFieldState::Focused {
            return;
        }

        for item in input.take_buffered_input(FocusOwner::Console) {
            match item {
                BufferedInput::Char(c) => self.input_line.push(c),
                BufferedInput::Backspace => {
                    self.input_line.pop();
                }
                BufferedInput::Submit => self.submit_input(),
            }
        }
    }

    fn update_scroll(&mut self, input: &InputManager) {
        let mut delta: i64 = 0;
        let wheel = input.scroll_delta().y;
        if wheel > 0.0 {
            delta += LINES_PER_SCROLL_STEP as i64;
        } else if wheel < 0.0 {
            delta -= LINES_PER_SCROLL_STEP as i64;
        }
        let page = self.visible_line_capacity().max(1) as i64;
        if input.key_pressed(KeyCode::PageUp) {
            delta += page;
        }
        if input.key_pressed(KeyCode::PageDown) {
            delta -= page;
        }
        if delta == 0 {
            return;
        }

        let available = self.sink.tail(usize::MAX, 0, self.cleared_at).len();
        let max_scroll = available.saturating_sub(self.visible_line_capacity());
        let next = (self.scroll as i64 + delta).clamp(0, max_scroll as i64);
        self.scroll = next as usize;
    }

    fn unfocus(&mut self, input: &mut InputManager) {
        if self.field == InputFieldState::Focused {
            input.release_focus(FocusOwner::Console);
        }
        self.field = InputFieldState::Idle;
    }

    /// Draw the overlay, called last in the render pass
    pub fn render(&self, renderer: &mut TackRenderer) {
        if !self.is_visible() {
            return;
        }

        let overlay = self.overlay_rect();
        renderer.draw_ui_rect(overlay, Colour4::new(10, 10, 14, 220));

        let line_height = self.line_height();
        let input_rect = self.input_rect();
        let mut y = input_rect.y - PADDING - line_height;
        for line in self.visible_lines().iter().rev() {
            if y < overlay.y {
                break;
            }
            renderer.draw_ui_text(
                Vec2::new(overlay.x + PADDING, y),
                &line.display(),
                self.settings.font_size,
                level_colour(line.level),
            );
            y -= line_height;
        }

        let field_colour = match self.field {
            InputFieldState::Focused => Colour4::rgb(45, 45, 80),
            InputFieldState::Idle => Colour4::rgb(35, 35, 35),
        };
        renderer.draw_ui_rect(input_rect, field_colour);

        let cursor = if self.field == InputFieldState::Focused { "_" } else { "" };
        renderer.draw_ui_text(
            Vec2::new(input_rect.x + PADDING, input_rect.y + PADDING),
            &format!("> {}{}", self.input_line, cursor),
            self.settings.font_size,
            Colour4::WHITE,
        );
    }

    /// Release focus and drop pending lines
    pub fn close(&mut self, input: &mut InputManager) {
        self.unfocus(input);
        self.submitted.clear();
        self.visibility = ConsoleVisibility::Hidden;
        log::info!("Console closed");
    }
}

fn level_colour(level: log::Level) -> Colour4 {
    match level {
        log::Level::Error => Colour4::rgb(255, 90, 90),
        log::Level::Warn => Colour4::rgb(255, 200, 60),
        log::Level::Info => Colour4::rgb(220, 220, 220),
        log::Level::Debug | log::Level::Trace => Colour4::rgb(140, 140, 140),
    }
}
