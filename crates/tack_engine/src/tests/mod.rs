//! Cross-subsystem tests driven through a headless [`GameWindow`]

mod frame_order;

use crate::config::EngineConfig;
use crate::render::HeadlessBackend;
use crate::window::HeadlessWindow;
use crate::{GameWindow, TackGame};
use parking_lot::{Mutex, MutexGuard};
use std::cell::RefCell;
use std::rc::Rc;

static ENGINE_LOCK: Mutex<()> = parking_lot::const_mutex(());

/// Only one game window may exist at a time; tests creating one hold this
pub(crate) fn engine_lock() -> MutexGuard<'static, ()> {
    ENGINE_LOCK.lock()
}

pub(crate) fn test_config() -> EngineConfig {
    EngineConfig::new("test", 800, 600)
        .with_frequencies(1000.0, 1000.0)
        .with_vsync(false)
}

pub(crate) fn recorded_backend<G: TackGame>(window: &mut GameWindow<G>) -> &mut HeadlessBackend {
    window
        .context_mut()
        .renderer
        .backend_mut()
        .as_any_mut()
        .downcast_mut::<HeadlessBackend>()
        .expect("headless render backend")
}

pub(crate) fn headless_window<G: TackGame>(window: &mut GameWindow<G>) -> &mut HeadlessWindow {
    window
        .window_mut()
        .as_any_mut()
        .downcast_mut::<HeadlessWindow>()
        .expect("headless window")
}

/// Shared, ordered record of lifecycle calls
pub(crate) type EventLog = Rc<RefCell<Vec<String>>>;

pub(crate) fn record(log: &EventLog, event: impl Into<String>) {
    log.borrow_mut().push(event.into());
}
