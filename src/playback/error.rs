use thiserror::Error;

use crate::audio::AdapterError;

#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("stream unavailable: {0}")]
    StreamUnavailable(String),
    #[error("could not create audio resource: {0}")]
    ResourceCreateFailed(String),
}

impl PlaybackError {
    pub fn user_message(&self) -> &'static str {
        match self {
            PlaybackError::StreamUnavailable(_) => "This track could not be streamed.",
            PlaybackError::ResourceCreateFailed(_) => "Playback could not start.",
        }
    }
}

impl From<AdapterError> for PlaybackError {
    fn from(e: AdapterError) -> Self {
        match e {
            AdapterError::Fetch(inner) => PlaybackError::StreamUnavailable(inner.to_string()),
            other => PlaybackError::ResourceCreateFailed(other.to_string()),
        }
    }
}
