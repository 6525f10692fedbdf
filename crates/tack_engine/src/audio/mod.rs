//! Audio system
//!
//! Clips are parsed from RIFF/WAVE files and uploaded to an [`AudioBackend`]
//! once; playback sources are created per emitter. All handles are tracked
//! here so [`AudioManager::close`] can release everything at unload.

mod backend;
pub mod wav;

pub use backend::{AudioBackend, SilentAudioBackend};
pub use wav::WavData;

use slotmap::{new_key_type, SlotMap};
use std::path::Path;
use thiserror::Error;

new_key_type! {
    /// Handle to a loaded clip
    pub struct ClipId;
    /// Handle to a playback source
    pub struct SourceId;
}

/// Audio errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AudioError {
    /// File could not be read
    #[error("Failed to read audio file {path}: {message}")]
    Io {
        /// File path
        path: String,
        /// OS error text
        message: String,
    },

    /// File is not a well-formed RIFF/WAVE file
    #[error("Invalid WAV data: {0}")]
    InvalidWav(String),

    /// The backend refused an operation
    #[error("Audio backend error: {0}")]
    Backend(String),

    /// Handle does not refer to a live clip or source
    #[error("Unknown audio handle")]
    UnknownHandle,

    /// The manager has already been closed
    #[error("Audio system is closed")]
    Closed,
}

struct Clip {
    name: String,
    buffer: u32,
    duration_secs: f32,
}

/// Audio manager
pub struct AudioManager {
    backend: Box<dyn AudioBackend>,
    clips: SlotMap<ClipId, Clip>,
    sources: SlotMap<SourceId, u32>,
    closed: bool,
}

impl AudioManager {
    /// Create a manager over a backend
    pub fn new(backend: Box<dyn AudioBackend>) -> Self {
        log::info!("Audio system initialized");
        Self {
            backend,
            clips: SlotMap::with_key(),
            sources: SlotMap::with_key(),
            closed: false,
        }
    }

    /// Create a manager that plays nothing
    pub fn silent() -> Self {
        Self::new(Box::new(SilentAudioBackend::new()))
    }

    /// Load a `.wav` file as a clip
    pub fn load_wav(&mut self, path: impl AsRef<Path>) -> Result<ClipId, AudioError> {
        let path = path.as_ref();
        let data = wav::load(path).map_err(|err| {
            log::error!("Failed to load clip {}: {}", path.display(), err);
            err
        })?;
        self.add_clip(&path.display().to_string(), &data)
    }

    /// Upload already decoded clip data
    pub fn add_clip(&mut self, name: &str, data: &WavData) -> Result<ClipId, AudioError> {
        if self.closed {
            return Err(AudioError::Closed);
        }
        let buffer = self.backend.create_buffer(data)?;
        let id = self.clips.insert(Clip {
            name: name.to_string(),
            buffer,
            duration_secs: data.duration_secs(),
        });
        log::debug!("Loaded clip '{}' ({:.2}s)", name, data.duration_secs());
        Ok(id)
    }

    /// Name a clip was loaded under
    pub fn clip_name(&self, clip: ClipId) -> Option<&str> {
        self.clips.get(clip).map(|clip| clip.name.as_str())
    }

    /// Length of a clip in seconds
    pub fn clip_duration(&self, clip: ClipId) -> Option<f32> {
        self.clips.get(clip).map(|clip| clip.duration_secs)
    }

    /// Release a clip's buffer
    pub fn unload_clip(&mut self, clip: ClipId) {
        match self.clips.remove(clip) {
            Some(clip) => self.backend.delete_buffer(clip.buffer),
            None => log::warn!("Unload of unknown clip"),
        }
    }

    /// Create a playback source
    pub fn create_source(&mut self) -> Result<SourceId, AudioError> {
        if self.closed {
            return Err(AudioError::Closed);
        }
        let handle = self.backend.create_source()?;
        Ok(self.sources.insert(handle))
    }

    /// Release a playback source
    pub fn release_source(&mut self, source: SourceId) {
        if let Some(handle) = self.sources.remove(source) {
            self.backend.stop(handle);
            self.backend.delete_source(handle);
        }
    }

    /// Play a clip on a source
    ///
    /// Gain outside `0..=1` is clamped and logged.
    pub fn play(&mut self, source: SourceId, clip: ClipId, gain: f32) -> Result<(), AudioError> {
        let (Some(&source_handle), Some(clip)) = (self.sources.get(source), self.clips.get(clip)) else {
            log::error!("Play with an unknown audio handle");
            return Err(AudioError::UnknownHandle);
        };
        self.backend.play(source_handle, clip.buffer, clamp_gain(gain))
    }

    /// Stop a source
    pub fn stop(&mut self, source: SourceId) {
        if let Some(&handle) = self.sources.get(source) {
            self.backend.stop(handle);
        }
    }

    /// Whether a source is playing
    pub fn is_playing(&self, source: SourceId) -> bool {
        self.sources
            .get(source)
            .is_some_and(|&handle| self.backend.is_playing(handle))
    }

    /// Number of loaded clips
    pub fn clip_count(&self) -> usize {
        self.clips.len()
    }

    /// Backend, for downcasting in tests and tools
    pub fn backend(&self) -> &dyn AudioBackend {
        self.backend.as_ref()
    }

    /// Release every source and buffer and shut the backend down
    ///
    /// Safe to call more than once.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        for (_, handle) in self.sources.drain() {
            self.backend.stop(handle);
            self.backend.delete_source(handle);
        }
        for (_, clip) in self.clips.drain() {
            self.backend.delete_buffer(clip.buffer);
        }
        self.backend.shutdown();
        self.closed = true;
        log::info!("Audio system closed");
    }
}

fn clamp_gain(gain: f32) -> f32 {
    if (0.0..=1.0).contains(&gain) {
        gain
    } else {
        let clamped = if gain.is_nan() { 1.0 } else { gain.clamp(0.0, 1.0) };
        log::warn!("Gain {} outside 0..1, clamped to {}", gain, clamped);
        clamped
    }
}
