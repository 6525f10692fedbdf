//! Window management using GLFW
//!
//! Creates a window with an OpenGL 3.3 core context made current on the
//! calling thread.

use super::{WindowBackend, WindowError};
use crate::input::{KeyCode, MouseButton, PlatformEvent};
use glfw::{Action, Context};
use std::any::Any;

/// GLFW window wrapper
pub struct GlfwWindow {
    glfw: glfw::Glfw,
    window: glfw::PWindow,
    events: glfw::GlfwReceiver<(f64, glfw::WindowEvent)>,
    title: String,
}

impl GlfwWindow {
    /// Open a window
    pub fn new(title: &str, width: u32, height: u32) -> Result<Self, WindowError> {
        let mut glfw = glfw::init(glfw::fail_on_errors)
            .map_err(|err| WindowError::InitializationFailed(format!("{err:?}")))?;

        glfw.window_hint(glfw::WindowHint::ContextVersion(3, 3));
        glfw.window_hint(glfw::WindowHint::OpenGlProfile(glfw::OpenGlProfileHint::Core));
        glfw.window_hint(glfw::WindowHint::Resizable(true));

        let (mut window, events) = glfw
            .create_window(width, height, title, glfw::WindowMode::Windowed)
            .ok_or(WindowError::CreationFailed)?;

        window.make_current();
        window.set_key_polling(true);
        window.set_char_polling(true);
        window.set_cursor_pos_polling(true);
        window.set_mouse_button_polling(true);
        window.set_scroll_polling(true);
        window.set_framebuffer_size_polling(true);
        window.set_close_polling(true);

        log::info!("Created {}x{} GLFW window '{}'", width, height, title);
        Ok(Self {
            glfw,
            window,
            events,
            title: title.to_string(),
        })
    }
}

fn map_key(key: glfw::Key) -> KeyCode {
    use glfw::Key;
    match key {
        Key::A => KeyCode::A,
        Key::B => KeyCode::B,
        Key::C => KeyCode::C,
        Key::D => KeyCode::D,
        Key::E => KeyCode::E,
        Key::F => KeyCode::F,
        Key::G => KeyCode::G,
        Key::H => KeyCode::H,
        Key::I => KeyCode::I,
        Key::J => KeyCode::J,
        Key::K => KeyCode::K,
        Key::L => KeyCode::L,
        Key::M => KeyCode::M,
        Key::N => KeyCode::N,
        Key::O => KeyCode::O,
        Key::P => KeyCode::P,
        Key::Q => KeyCode::Q,
        Key::R => KeyCode::R,
        Key::S => KeyCode::S,
        Key::T => KeyCode::T,
        Key::U => KeyCode::U,
        Key::V => KeyCode::V,
        Key::W => KeyCode::W,
        Key::X => KeyCode::X,
        Key::Y => KeyCode::Y,
        Key::Z => KeyCode::Z,
        Key::Num0 => KeyCode::Num0,
        Key::Num1 => KeyCode::Num1,
        Key::Num2 => KeyCode::Num2,
        Key::Num3 => KeyCode::Num3,
        Key::Num4 => KeyCode::Num4,
        Key::Num5 => KeyCode::Num5,
        Key::Num6 => KeyCode::Num6,
        Key::Num7 => KeyCode::Num7,
        Key::Num8 => KeyCode::Num8,
        Key::Num9 => KeyCode::Num9,
        Key::Space => KeyCode::Space,
        Key::Enter => KeyCode::Enter,
        Key::Escape => KeyCode::Escape,
        Key::Backspace => KeyCode::Backspace,
        Key::Tab => KeyCode::Tab,
        Key::GraveAccent => KeyCode::GraveAccent,
        Key::LeftShift => KeyCode::LeftShift,
        Key::RightShift => KeyCode::RightShift,
        Key::LeftControl => KeyCode::LeftControl,
        Key::PageUp => KeyCode::PageUp,
        Key::PageDown => KeyCode::PageDown,
        Key::Up => KeyCode::Up,
        Key::Down => KeyCode::Down,
        Key::Left => KeyCode::Left,
        Key::Right => KeyCode::Right,
        Key::F1 => KeyCode::F1,
        _ => KeyCode::Unknown,
    }
}

fn map_button(button: glfw::MouseButton) -> Option<MouseButton> {
    match button {
        glfw::MouseButton::Button1 => Some(MouseButton::Left),
        glfw::MouseButton::Button2 => Some(MouseButton::Right),
        glfw::MouseButton::Button3 => Some(MouseButton::Middle),
        _ => None,
    }
}

impl WindowBackend for GlfwWindow {
    fn poll_events(&mut self) -> Vec<PlatformEvent> {
        self.glfw.poll_events();
        let mut events = Vec::new();
        for (_, event) in glfw::flush_messages(&self.events) {
            let mapped = match event {
                glfw::WindowEvent::Key(key, _, Action::Press, _) => Some(PlatformEvent::Key {
                    key: map_key(key),
                    pressed: true,
                }),
                glfw::WindowEvent::Key(key, _, Action::Release, _) => Some(PlatformEvent::Key {
                    key: map_key(key),
                    pressed: false,
                }),
                glfw::WindowEvent::Char(character) => Some(PlatformEvent::Char(character)),
                glfw::WindowEvent::CursorPos(x, y) => Some(PlatformEvent::MouseMoved {
                    x: x as f32,
                    y: y as f32,
                }),
                glfw::WindowEvent::MouseButton(button, action, _) => {
                    map_button(button).map(|button| PlatformEvent::MouseButton {
                        button,
                        pressed: action != Action::Release,
                    })
                }
                glfw::WindowEvent::Scroll(dx, dy) => Some(PlatformEvent::Scroll {
                    dx: dx as f32,
                    dy: dy as f32,
                }),
                glfw::WindowEvent::FramebufferSize(width, height) => Some(PlatformEvent::Resized {
                    width: width.max(0) as u32,
                    height: height.max(0) as u32,
                }),
                glfw::WindowEvent::Close => Some(PlatformEvent::CloseRequested),
                _ => None,
            };
            events.extend(mapped);
        }
        events
    }

    fn swap_buffers(&mut self) {
        self.window.swap_buffers();
    }

    fn should_close(&self) -> bool {
        self.window.should_close()
    }

    fn set_should_close(&mut self, should_close: bool) {
        self.window.set_should_close(should_close);
    }

    fn set_vsync(&mut self, enabled: bool) {
        let interval = if enabled {
            glfw::SwapInterval::Sync(1)
        } else {
            glfw::SwapInterval::None
        };
        self.glfw.set_swap_interval(interval);
    }

    fn framebuffer_size(&self) -> (u32, u32) {
        let (width, height) = self.window.get_framebuffer_size();
        (width.max(0) as u32, height.max(0) as u32)
    }

    fn title(&self) -> String {
        self.title.clone()
    }

    fn set_title(&mut self, title: &str) {
        self.window.set_title(title);
        self.title = title.to_string();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
