use std::cell::RefCell;
use std::collections::HashMap;

use bytes::Bytes;
use tracing::debug;
use uuid::Uuid;

const SCHEME_PREFIX: &str = "blob:vibe/";

/// Local object URLs for fetched audio bytes.
///
/// Every registered URL must be revoked once its element is unloaded.
#[derive(Debug, Default)]
pub struct BlobRegistry {
    blobs: RefCell<HashMap<String, Bytes>>,
}

impl BlobRegistry {
    /// Register `bytes` and return the URL an element can load.
    pub fn register(&self, bytes: Bytes) -> String {
        let url = format!("{SCHEME_PREFIX}{}", Uuid::new_v4());
        debug!(%url, len = bytes.len(), "registered blob");
        self.blobs.borrow_mut().insert(url.clone(), bytes);
        url
    }

    pub fn resolve(&self, url: &str) -> Option<Bytes> {
        self.blobs.borrow().get(url).cloned()
    }

    /// Drop the bytes behind `url`. Returns whether it was registered.
    pub fn revoke(&self, url: &str) -> bool {
        let removed = self.blobs.borrow_mut().remove(url).is_some();
        if removed {
            debug!(%url, "revoked blob");
        }
        removed
    }

    pub fn is_blob_url(url: &str) -> bool {
        url.starts_with(SCHEME_PREFIX)
    }

    pub fn len(&self) -> usize {
        self.blobs.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.borrow().is_empty()
    }
}
