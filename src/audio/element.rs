use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use tracing::{debug, warn};

use super::adapter::{AudioResourceAdapter, Capabilities, StreamFetcher};
use super::blob::BlobRegistry;
use super::output::{OutputHandle, Reporting};
use super::types::{AdapterError, ResourceHandle};

/// A media element: it loads a local `src`, plays, pauses and reports
/// play / pause / ended. No seeking, no volume, no progress.
#[allow(async_fn_in_trait)]
pub trait AudioElement {
    async fn load(&self, handle: ResourceHandle, src: &str) -> Result<(), AdapterError>;
    fn play(&self, handle: ResourceHandle) -> Result<(), AdapterError>;
    fn pause(&self, handle: ResourceHandle) -> Result<(), AdapterError>;
    async fn unload(&self, handle: ResourceHandle) -> Result<(), AdapterError>;
}

/// Element backed by the shared output thread in play-only reporting mode.
pub struct OutputElement {
    blobs: Rc<BlobRegistry>,
    output: OutputHandle,
}

impl OutputElement {
    pub fn new(blobs: Rc<BlobRegistry>, output: OutputHandle) -> Self {
        Self { blobs, output }
    }
}

impl AudioElement for OutputElement {
    async fn load(&self, handle: ResourceHandle, src: &str) -> Result<(), AdapterError> {
        let bytes = self
            .blobs
            .resolve(src)
            .ok_or_else(|| AdapterError::Decode(format!("unresolvable src {src}")))?;
        self.output
            .load(handle, bytes, Reporting::PlaybackOnly, 1.0)
            .await
            .map(|_| ())
    }

    fn play(&self, handle: ResourceHandle) -> Result<(), AdapterError> {
        self.output.play(handle)
    }

    fn pause(&self, handle: ResourceHandle) -> Result<(), AdapterError> {
        self.output.pause(handle)
    }

    async fn unload(&self, handle: ResourceHandle) -> Result<(), AdapterError> {
        self.output.release(handle).await
    }
}

/// Declarative adapter: fetch with the bearer header, publish the bytes as a
/// blob URL and point the element at it.
pub struct ElementAdapter<E, F> {
    element: E,
    fetcher: F,
    blobs: Rc<BlobRegistry>,
    sources: RefCell<HashMap<ResourceHandle, String>>,
    next_id: Cell<u64>,
}

impl<E: AudioElement, F: StreamFetcher> ElementAdapter<E, F> {
    pub const CAPABILITIES: Capabilities = Capabilities {
        seek: false,
        volume: false,
        progress: false,
    };

    pub fn new(element: E, fetcher: F, blobs: Rc<BlobRegistry>) -> Self {
        Self {
            element,
            fetcher,
            blobs,
            sources: RefCell::new(HashMap::new()),
            next_id: Cell::new(0),
        }
    }

    pub fn blobs(&self) -> &BlobRegistry {
        &self.blobs
    }

    /// The blob URL currently loaded for `handle`.
    pub fn source_of(&self, handle: ResourceHandle) -> Option<String> {
        self.sources.borrow().get(&handle).cloned()
    }

    fn known(&self, handle: ResourceHandle) -> Result<(), AdapterError> {
        if self.sources.borrow().contains_key(&handle) {
            Ok(())
        } else {
            Err(AdapterError::UnknownResource(handle))
        }
    }
}

impl<E: AudioElement, F: StreamFetcher> AudioResourceAdapter for ElementAdapter<E, F> {
    fn capabilities(&self) -> Capabilities {
        Self::CAPABILITIES
    }

    async fn open(&self, url: &str, token: &str) -> Result<ResourceHandle, AdapterError> {
        let bytes = self.fetcher.fetch_stream(url, token).await?;
        let src = self.blobs.register(bytes);

        let handle = ResourceHandle(self.next_id.get() + 1);
        self.next_id.set(handle.0);

        if let Err(e) = self.element.load(handle, &src).await {
            self.blobs.revoke(&src);
            return Err(e);
        }
        debug!(%handle, %src, "element loaded");
        self.sources.borrow_mut().insert(handle, src);
        Ok(handle)
    }

    async fn play(&self, handle: ResourceHandle) -> Result<(), AdapterError> {
        self.known(handle)?;
        self.element.play(handle)
    }

    async fn pause(&self, handle: ResourceHandle) -> Result<(), AdapterError> {
        self.known(handle)?;
        self.element.pause(handle)
    }

    async fn seek(&self, handle: ResourceHandle, position_ms: u64) -> Result<(), AdapterError> {
        debug!(%handle, position_ms, "seek unsupported by element backend");
        Ok(())
    }

    async fn set_volume(&self, handle: ResourceHandle, volume: f32) -> Result<(), AdapterError> {
        debug!(%handle, volume, "volume unsupported by element backend");
        Ok(())
    }

    async fn release(&self, handle: ResourceHandle) -> Result<(), AdapterError> {
        let Some(src) = self.sources.borrow_mut().remove(&handle) else {
            return Ok(());
        };
        let unloaded = self.element.unload(handle).await;
        if let Err(e) = &unloaded {
            warn!(%handle, error = %e, "element unload failed");
        }
        self.blobs.revoke(&src);
        unloaded
    }
}
