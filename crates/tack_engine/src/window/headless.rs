//! Window without a display
//!
//! Events are scripted up front and delivered on the poll following a given
//! number of buffer swaps. An optional frame limit closes the window after
//! that many swaps, which is how headless runs terminate.

use super::WindowBackend;
use crate::input::PlatformEvent;
use std::any::Any;

/// Scripted, display-less window
#[derive(Debug)]
pub struct HeadlessWindow {
    title: String,
    size: (u32, u32),
    should_close: bool,
    vsync: Option<bool>,
    vsync_changes: usize,
    swaps: u64,
    frame_limit: Option<u64>,
    scheduled: Vec<(u64, PlatformEvent)>,
}

impl HeadlessWindow {
    /// Create a headless window
    pub fn new(title: &str, width: u32, height: u32) -> Self {
        Self {
            title: title.to_string(),
            size: (width, height),
            should_close: false,
            vsync: None,
            vsync_changes: 0,
            swaps: 0,
            frame_limit: None,
            scheduled: Vec::new(),
        }
    }

    /// Close after `frames` buffer swaps
    pub fn with_frame_limit(mut self, frames: u64) -> Self {
        self.frame_limit = Some(frames);
        self
    }

    /// Deliver `event` on the next poll
    pub fn queue_event(&mut self, event: PlatformEvent) {
        self.schedule_event(self.swaps, event);
    }

    /// Deliver `event` on the first poll after `swaps` buffer swaps
    pub fn schedule_event(&mut self, swaps: u64, event: PlatformEvent) {
        self.scheduled.push((swaps, event));
    }

    /// Buffer swaps so far
    pub fn swap_count(&self) -> u64 {
        self.swaps
    }

    /// Last vsync setting applied
    pub fn vsync(&self) -> Option<bool> {
        self.vsync
    }

    /// Number of vsync changes applied
    pub fn vsync_changes(&self) -> usize {
        self.vsync_changes
    }
}

impl WindowBackend for HeadlessWindow {
    fn poll_events(&mut self) -> Vec<PlatformEvent> {
        let swaps = self.swaps;
        let (due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.scheduled)
            .into_iter()
            .partition(|(at, _)| *at <= swaps);
        self.scheduled = pending;

        let events: Vec<PlatformEvent> = due.into_iter().map(|(_, event)| event).collect();
        for event in &events {
            match event {
                PlatformEvent::Resized { width, height } => self.size = (*width, *height),
                PlatformEvent::CloseRequested => self.should_close = true,
                _ => {}
            }
        }
        events
    }

    fn swap_buffers(&mut self) {
        self.swaps += 1;
        if self.frame_limit.is_some_and(|limit| self.swaps >= limit) {
            self.should_close = true;
        }
    }

    fn should_close(&self) -> bool {
        self.should_close
    }

    fn set_should_close(&mut self, should_close: bool) {
        self.should_close = should_close;
    }

    fn set_vsync(&mut self, enabled: bool) {
        self.vsync = Some(enabled);
        self.vsync_changes += 1;
    }

    fn framebuffer_size(&self) -> (u32, u32) {
        self.size
    }

    fn title(&self) -> String {
        self.title.clone()
    }

    fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::KeyCode;

    #[test]
    fn test_scheduled_events_arrive_after_swaps() {
        let mut window = HeadlessWindow::new("test", 64, 64);
        window.queue_event(PlatformEvent::Char('a'));
        window.schedule_event(2, PlatformEvent::Key { key: KeyCode::A, pressed: true });

        assert_eq!(window.poll_events(), vec![PlatformEvent::Char('a')]);
        assert!(window.poll_events().is_empty());

        window.swap_buffers();
        assert!(window.poll_events().is_empty());
        window.swap_buffers();
        assert_eq!(window.poll_events().len(), 1);
    }

    #[test]
    fn test_frame_limit_closes() {
        let mut window = HeadlessWindow::new("test", 64, 64).with_frame_limit(2);
        window.swap_buffers();
        assert!(!window.should_close());
        window.swap_buffers();
        assert!(window.should_close());
    }

    #[test]
    fn test_resize_and_close_events_update_state() {
        let mut window = HeadlessWindow::new("test", 64, 64);
        window.queue_event(PlatformEvent::Resized { width: 128, height: 32 });
        window.queue_event(PlatformEvent::CloseRequested);
        window.poll_events();
        assert_eq!(window.framebuffer_size(), (128, 32));
        assert!(window.should_close());
    }
}
