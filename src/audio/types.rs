//! Handles, status events and errors shared by the audio adapters.

use std::fmt;

use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;

use crate::api::ApiError;

/// Opaque id of one opened audio resource.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceHandle(pub u64);

impl fmt::Display for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StatusKind {
    /// Playback position in milliseconds.
    Position(u64),
    /// Total length in milliseconds, once the decoder knows it.
    Duration(u64),
    /// Whether the resource is currently audible.
    Playing(bool),
    /// Reached the end of the stream.
    Ended,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StatusEvent {
    pub handle: ResourceHandle,
    pub kind: StatusKind,
}

impl StatusEvent {
    pub fn new(handle: ResourceHandle, kind: StatusKind) -> Self {
        Self { handle, kind }
    }
}

pub type StatusSender = UnboundedSender<StatusEvent>;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("stream fetch failed: {0}")]
    Fetch(#[from] ApiError),
    #[error("could not decode audio: {0}")]
    Decode(String),
    #[error("audio output unavailable: {0}")]
    Output(String),
    #[error("unknown resource {0}")]
    UnknownResource(ResourceHandle),
}
