use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::time::Duration;

use tracing::debug;

use super::adapter::{AudioResourceAdapter, Capabilities, StreamFetcher};
use super::output::{OutputHandle, Reporting};
use super::types::{AdapterError, ResourceHandle};

/// Imperative adapter: fetch with the bearer header, decode, drive a sink.
pub struct EngineAdapter<F> {
    fetcher: F,
    output: OutputHandle,
    next_id: Cell<u64>,
    live: RefCell<HashSet<ResourceHandle>>,
    // Applied to sinks at load so a new track never starts at full volume.
    volume: Cell<f32>,
}

impl<F: StreamFetcher> EngineAdapter<F> {
    pub const CAPABILITIES: Capabilities = Capabilities {
        seek: true,
        volume: true,
        progress: true,
    };

    pub fn new(fetcher: F, output: OutputHandle) -> Self {
        Self {
            fetcher,
            output,
            next_id: Cell::new(0),
            live: RefCell::new(HashSet::new()),
            volume: Cell::new(1.0),
        }
    }

    fn known(&self, handle: ResourceHandle) -> Result<(), AdapterError> {
        if self.live.borrow().contains(&handle) {
            Ok(())
        } else {
            Err(AdapterError::UnknownResource(handle))
        }
    }
}

impl<F: StreamFetcher> AudioResourceAdapter for EngineAdapter<F> {
    fn capabilities(&self) -> Capabilities {
        Self::CAPABILITIES
    }

    async fn open(&self, url: &str, token: &str) -> Result<ResourceHandle, AdapterError> {
        let bytes = self.fetcher.fetch_stream(url, token).await?;

        let handle = ResourceHandle(self.next_id.get() + 1);
        self.next_id.set(handle.0);

        let total = self
            .output
            .load(handle, bytes, Reporting::Full, self.volume.get())
            .await?;
        self.live.borrow_mut().insert(handle);
        debug!(%handle, total_ms = total.map(|d| d.as_millis() as u64), "engine resource open");
        Ok(handle)
    }

    async fn play(&self, handle: ResourceHandle) -> Result<(), AdapterError> {
        self.known(handle)?;
        self.output.play(handle)
    }

    async fn pause(&self, handle: ResourceHandle) -> Result<(), AdapterError> {
        self.known(handle)?;
        self.output.pause(handle)
    }

    async fn seek(&self, handle: ResourceHandle, position_ms: u64) -> Result<(), AdapterError> {
        self.known(handle)?;
        self.output.seek(handle, Duration::from_millis(position_ms))
    }

    async fn set_volume(&self, handle: ResourceHandle, volume: f32) -> Result<(), AdapterError> {
        self.volume.set(volume);
        self.known(handle)?;
        self.output.set_volume(handle, volume)
    }

    async fn release(&self, handle: ResourceHandle) -> Result<(), AdapterError> {
        if !self.live.borrow_mut().remove(&handle) {
            return Ok(());
        }
        self.output.release(handle).await
    }
}
