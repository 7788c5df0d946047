//! HTTP access to the Vibe Music server.
//!
//! Every call except `login` carries the bearer token. The client is cheap to
//! clone and shared between the guard, the playback session and the list
//! screens.

mod client;
mod error;
mod models;


pub use client::{ApiClient, stream_url};
pub use error::{ApiError, DataError};
pub use models::{AppendItem, LoginReply, PlaylistsReply, SearchReply, ValidateReply};
