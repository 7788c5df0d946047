use std::rc::Rc;

use bytes::Bytes;
use tokio::sync::mpsc::UnboundedSender;

use crate::api::{ApiClient, ApiError};
use crate::config::AudioBackendSetting;

use super::blob::BlobRegistry;
use super::element::{ElementAdapter, OutputElement};
use super::engine::EngineAdapter;
use super::output::OutputHandle;
use super::types::{AdapterError, ResourceHandle, StatusEvent};

/// What an adapter can do beyond play / pause / ended.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Capabilities {
    pub seek: bool,
    pub volume: bool,
    pub progress: bool,
}

/// Authorized byte delivery for stream URLs.
#[allow(async_fn_in_trait)]
pub trait StreamFetcher {
    async fn fetch_stream(&self, url: &str, token: &str) -> Result<Bytes, ApiError>;
}

impl StreamFetcher for ApiClient {
    async fn fetch_stream(&self, url: &str, token: &str) -> Result<Bytes, ApiError> {
        self.fetch_bytes(url, token).await
    }
}

/// One platform audio resource per handle.
///
/// `release` resolves only once the resource is really gone; the playback
/// session relies on that for its release-before-open ordering.
#[allow(async_fn_in_trait)]
pub trait AudioResourceAdapter {
    fn capabilities(&self) -> Capabilities;
    async fn open(&self, url: &str, token: &str) -> Result<ResourceHandle, AdapterError>;
    async fn play(&self, handle: ResourceHandle) -> Result<(), AdapterError>;
    async fn pause(&self, handle: ResourceHandle) -> Result<(), AdapterError>;
    async fn seek(&self, handle: ResourceHandle, position_ms: u64) -> Result<(), AdapterError>;
    async fn set_volume(&self, handle: ResourceHandle, volume: f32) -> Result<(), AdapterError>;
    async fn release(&self, handle: ResourceHandle) -> Result<(), AdapterError>;
}

/// The adapter picked by `audio.backend`.
pub enum PlatformAdapter<F> {
    Engine(EngineAdapter<F>),
    Element(ElementAdapter<OutputElement, F>),
}

impl<F: StreamFetcher> PlatformAdapter<F> {
    pub fn from_setting(
        backend: AudioBackendSetting,
        fetcher: F,
        events: UnboundedSender<StatusEvent>,
    ) -> Self {
        let output = OutputHandle::spawn(events.clone());
        match backend {
            AudioBackendSetting::Engine => PlatformAdapter::Engine(EngineAdapter::new(fetcher, output)),
            AudioBackendSetting::Element => {
                let blobs = Rc::new(BlobRegistry::default());
                let element = OutputElement::new(blobs.clone(), output);
                PlatformAdapter::Element(ElementAdapter::new(element, fetcher, blobs))
            }
        }
    }
}

impl<F: StreamFetcher> AudioResourceAdapter for PlatformAdapter<F> {
    fn capabilities(&self) -> Capabilities {
        match self {
            PlatformAdapter::Engine(a) => a.capabilities(),
            PlatformAdapter::Element(a) => a.capabilities(),
        }
    }

    async fn open(&self, url: &str, token: &str) -> Result<ResourceHandle, AdapterError> {
        match self {
            PlatformAdapter::Engine(a) => a.open(url, token).await,
            PlatformAdapter::Element(a) => a.open(url, token).await,
        }
    }

    async fn play(&self, handle: ResourceHandle) -> Result<(), AdapterError> {
        match self {
            PlatformAdapter::Engine(a) => a.play(handle).await,
            PlatformAdapter::Element(a) => a.play(handle).await,
        }
    }

    async fn pause(&self, handle: ResourceHandle) -> Result<(), AdapterError> {
        match self {
            PlatformAdapter::Engine(a) => a.pause(handle).await,
            PlatformAdapter::Element(a) => a.pause(handle).await,
        }
    }

    async fn seek(&self, handle: ResourceHandle, position_ms: u64) -> Result<(), AdapterError> {
        match self {
            PlatformAdapter::Engine(a) => a.seek(handle, position_ms).await,
            PlatformAdapter::Element(a) => a.seek(handle, position_ms).await,
        }
    }

    async fn set_volume(&self, handle: ResourceHandle, volume: f32) -> Result<(), AdapterError> {
        match self {
            PlatformAdapter::Engine(a) => a.set_volume(handle, volume).await,
            PlatformAdapter::Element(a) => a.set_volume(handle, volume).await,
        }
    }

    async fn release(&self, handle: ResourceHandle) -> Result<(), AdapterError> {
        match self {
            PlatformAdapter::Engine(a) => a.release(handle).await,
            PlatformAdapter::Element(a) => a.release(handle).await,
        }
    }
}
