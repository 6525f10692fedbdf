//! Audio backend abstraction
//!
//! Platform-independent interface over the playback library. Buffer and
//! source handles are plain integers owned by the [`super::AudioManager`].

use super::{AudioError, WavData};
use std::any::Any;
use std::collections::{HashMap, HashSet};

/// Audio backend trait for platform abstraction
pub trait AudioBackend {
    /// Upload a clip, returning its buffer handle
    fn create_buffer(&mut self, clip: &WavData) -> Result<u32, AudioError>;

    /// Release a buffer
    fn delete_buffer(&mut self, buffer: u32);

    /// Create a playback source
    fn create_source(&mut self) -> Result<u32, AudioError>;

    /// Release a playback source
    fn delete_source(&mut self, source: u32);

    /// Play `buffer` on `source` with a gain already clamped to `0..=1`
    fn play(&mut self, source: u32, buffer: u32, gain: f32) -> Result<(), AudioError>;

    /// Stop whatever `source` is playing
    fn stop(&mut self, source: u32);

    /// Whether `source` is currently playing
    fn is_playing(&self, source: u32) -> bool;

    /// Release the device
    fn shutdown(&mut self);

    /// Downcasting support
    fn as_any(&self) -> &dyn Any;
}

/// Backend that accepts every call and produces no sound
///
/// Keeps handle bookkeeping so lifetimes can be checked without a device.
#[derive(Debug, Default)]
pub struct SilentAudioBackend {
    next_handle: u32,
    buffers: HashSet<u32>,
    sources: HashMap<u32, Option<u32>>,
    plays: Vec<(u32, u32, f32)>,
    shut_down: bool,
}

impl SilentAudioBackend {
    /// Create a new silent backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Live buffer count
    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Live source count
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Every `(source, buffer, gain)` passed to [`AudioBackend::play`]
    pub fn plays(&self) -> &[(u32, u32, f32)] {
        &self.plays
    }

    /// Whether [`AudioBackend::shutdown`] ran
    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    fn allocate(&mut self) -> u32 {
        self.next_handle += 1;
        self.next_handle
    }
}

impl AudioBackend for SilentAudioBackend {
    fn create_buffer(&mut self, _clip: &WavData) -> Result<u32, AudioError> {
        let handle = self.allocate();
        self.buffers.insert(handle);
        Ok(handle)
    }

    fn delete_buffer(&mut self, buffer: u32) {
        self.buffers.remove(&buffer);
    }

    fn create_source(&mut self) -> Result<u32, AudioError> {
        let handle = self.allocate();
        self.sources.insert(handle, None);
        Ok(handle)
    }

    fn delete_source(&mut self, source: u32) {
        self.sources.remove(&source);
    }

    fn play(&mut self, source: u32, buffer: u32, gain: f32) -> Result<(), AudioError> {
        if !self.buffers.contains(&buffer) {
            return Err(AudioError::Backend(format!("unknown buffer {buffer}")));
        }
        let Some(slot) = self.sources.get_mut(&source) else {
            return Err(AudioError::Backend(format!("unknown source {source}")));
        };
        *slot = Some(buffer);
        self.plays.push((source, buffer, gain));
        Ok(())
    }

    fn stop(&mut self, source: u32) {
        if let Some(slot) = self.sources.get_mut(&source) {
            *slot = None;
        }
    }

    fn is_playing(&self, source: u32) -> bool {
        self.sources.get(&source).is_some_and(Option::is_some)
    }

    fn shutdown(&mut self) {
        self.shut_down = true;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
