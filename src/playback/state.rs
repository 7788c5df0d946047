use crate::audio::ResourceHandle;
use crate::track::Track;

use super::queue::Queue;

/// Everything the player bar needs, plus the live resource handle.
///
/// At every settled point `current_track` and `audio_handle` are either both
/// set or both empty. `pending_track` is the track whose resource is being
/// opened. `ended` marks an installed resource that played to its end;
/// resuming it starts over. `volume_control` is false when the backend
/// ignores volume changes.
#[derive(Debug, Clone)]
pub struct PlaybackState {
    pub current_track: Option<Track>,
    pub pending_track: Option<Track>,
    pub queue: Option<Queue>,
    pub is_playing: bool,
    pub ended: bool,
    pub shuffle: bool,
    pub audio_handle: Option<ResourceHandle>,
    pub position_ms: u64,
    pub duration_ms: u64,
    pub volume: f32,
    pub volume_control: bool,
}

impl PlaybackState {
    pub fn new(volume: f32, shuffle: bool) -> Self {
        Self {
            current_track: None,
            pending_track: None,
            queue: None,
            is_playing: false,
            ended: false,
            shuffle,
            audio_handle: None,
            position_ms: 0,
            duration_ms: 0,
            volume,
            volume_control: true,
        }
    }

    /// The track next/previous count from.
    pub fn anchor(&self) -> Option<&Track> {
        self.pending_track.as_ref().or(self.current_track.as_ref())
    }

    /// The track worth showing in the player bar.
    pub fn display_track(&self) -> Option<&Track> {
        self.anchor()
    }

    pub(super) fn clear_track(&mut self) {
        self.current_track = None;
        self.audio_handle = None;
        self.is_playing = false;
        self.ended = false;
        self.position_ms = 0;
        self.duration_ms = 0;
    }
}
