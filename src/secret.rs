//! Credential storage.
//!
//! The bearer token is the only secret the client keeps. Stores are used
//! through the small [`SecretStore`] key-value trait so the auth guard and
//! the playback session never care where the token actually lives.

mod file;
mod memory;


use std::path::PathBuf;
use std::rc::Rc;

use thiserror::Error;
use tracing::warn;

use crate::config::{SecretStoreKind, Settings, default_data_dir};

pub use file::FileSecretStore;
pub use memory::MemorySecretStore;

/// Key under which the bearer token is stored.
pub const TOKEN_KEY: &str = "token";

#[derive(Debug, Error)]
pub enum SecretError {
    #[error("secret store i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("secret store is corrupt: {0}")]
    Corrupt(String),
    #[error("no location for the secret store")]
    NoLocation,
}

/// Minimal key-value secret storage.
///
/// Methods take `&self`; implementations use interior mutability so a store
/// can be shared between the guard and the session behind an `Rc`.
pub trait SecretStore {
    fn get(&self, key: &str) -> Result<Option<String>, SecretError>;
    fn set(&self, key: &str, value: &str) -> Result<(), SecretError>;
    fn delete(&self, key: &str) -> Result<(), SecretError>;
}

/// Read the stored token. Store failures are logged and read as "no token".
pub fn load_token(store: &dyn SecretStore) -> Option<String> {
    match store.get(TOKEN_KEY) {
        Ok(token) => token.filter(|t| !t.is_empty()),
        Err(e) => {
            warn!(error = %e, "failed to read token; treating as logged out");
            None
        }
    }
}

/// Persist the token, logging on failure.
pub fn store_token(store: &dyn SecretStore, token: &str) {
    if let Err(e) = store.set(TOKEN_KEY, token) {
        warn!(error = %e, "failed to persist token");
    }
}

/// Forget the token, logging on failure.
pub fn clear_token(store: &dyn SecretStore) {
    if let Err(e) = store.delete(TOKEN_KEY) {
        warn!(error = %e, "failed to delete token");
    }
}

/// Build the store selected by `auth.secret_store`.
///
/// Never fails: an unreadable file store starts empty and is rewritten on
/// the next login, and a missing location falls back to memory.
pub fn open_store(settings: &Settings) -> Rc<dyn SecretStore> {
    match settings.auth.secret_store {
        SecretStoreKind::Memory => Rc::new(MemorySecretStore::default()),
        SecretStoreKind::File => {
            let path = match &settings.auth.secret_path {
                Some(p) => p.clone(),
                None => match default_secret_path() {
                    Some(p) => p,
                    None => {
                        warn!(error = %SecretError::NoLocation, "using in-memory secret store");
                        return Rc::new(MemorySecretStore::default());
                    }
                },
            };
            match FileSecretStore::open(&path) {
                Ok(store) => Rc::new(store),
                Err(e @ SecretError::Corrupt(_)) => {
                    warn!(path = %path.display(), error = %e, "ignoring unreadable secret store");
                    Rc::new(FileSecretStore::empty(path))
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "using in-memory secret store");
                    Rc::new(MemorySecretStore::default())
                }
            }
        }
    }
}

fn default_secret_path() -> Option<PathBuf> {
    default_data_dir().map(|d| d.join("secrets.toml"))
}
