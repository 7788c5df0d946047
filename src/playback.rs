//! The playback session controller.
//!
//! One [`PlaybackSession`] per application owns the current track, the queue
//! reference and the single live audio resource. See [`PlaybackSession::play`]
//! for the ordering rules that keep at most one resource alive.

mod error;
mod queue;
mod select;
mod session;
mod state;


pub use error::PlaybackError;
pub use queue::Queue;
pub use select::{Direction, select_successor};
pub use session::{PlayOutcome, PlaybackSession};
pub use state::PlaybackState;
