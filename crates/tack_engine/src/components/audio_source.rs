//! Audio emitter component

use crate::audio::{AudioManager, ClipId, SourceId};
use crate::context::ComponentContext;
use crate::objects::{ObjectState, TackComponent};

/// Plays a clip through its own playback source
#[derive(Debug, Clone)]
pub struct AudioSource {
    clip: ClipId,
    gain: f32,
    play_on_start: bool,
    source: Option<SourceId>,
}

impl AudioSource {
    /// Emitter for `clip` at `gain` (clamped to `0..=1` at playback)
    pub fn new(clip: ClipId, gain: f32) -> Self {
        Self {
            clip,
            gain,
            play_on_start: false,
            source: None,
        }
    }

    /// Start playing as soon as the component starts
    pub fn with_play_on_start(mut self, play_on_start: bool) -> Self {
        self.play_on_start = play_on_start;
        self
    }

    /// Playback gain
    pub fn gain(&self) -> f32 {
        self.gain
    }

    /// Change the gain used by the next [`AudioSource::play`]
    pub fn set_gain(&mut self, gain: f32) {
        self.gain = gain;
    }

    /// Play the clip from the beginning
    pub fn play(&mut self, audio: &mut AudioManager) {
        let source = match self.source {
            Some(source) => source,
            None => match audio.create_source() {
                Ok(source) => {
                    self.source = Some(source);
                    source
                }
                Err(err) => {
                    log::error!("Failed to create audio source: {}", err);
                    return;
                }
            },
        };
        if let Err(err) = audio.play(source, self.clip, self.gain) {
            log::error!("Failed to play clip: {}", err);
        }
    }

    /// Stop playback
    pub fn stop(&self, audio: &mut AudioManager) {
        if let Some(source) = self.source {
            audio.stop(source);
        }
    }

    /// Whether the clip is playing
    pub fn is_playing(&self, audio: &AudioManager) -> bool {
        self.source.is_some_and(|source| audio.is_playing(source))
    }
}

impl TackComponent for AudioSource {
    fn on_start(&mut self, _state: &mut ObjectState, ctx: &mut ComponentContext<'_>) {
        if self.play_on_start {
            self.play(ctx.audio);
        }
    }

    fn on_close(&mut self, _state: &mut ObjectState, ctx: &mut ComponentContext<'_>) {
        if let Some(source) = self.source.take() {
            ctx.audio.release_source(source);
        }
    }
}
