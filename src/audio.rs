//! Platform audio resources.
//!
//! The playback session talks to audio through [`AudioResourceAdapter`]. Two
//! adapters exist: [`EngineAdapter`] drives a rodio sink directly and reports
//! fine-grained progress, [`ElementAdapter`] mimics a media element that only
//! accepts a local `src` and reports play / pause / ended. Both emit
//! [`StatusEvent`]s on the channel handed to them at construction.

mod adapter;
mod blob;
mod element;
mod engine;
mod output;
mod sink;
mod types;


pub use adapter::{AudioResourceAdapter, Capabilities, PlatformAdapter, StreamFetcher};
pub use blob::BlobRegistry;
pub use element::{AudioElement, ElementAdapter, OutputElement};
pub use engine::EngineAdapter;
pub use output::OutputHandle;
pub use types::{AdapterError, ResourceHandle, StatusEvent, StatusKind, StatusSender};
