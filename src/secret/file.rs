//! TOML-backed secret store.
//!
//! The whole map is kept in memory and rewritten on every change. On unix
//! the file is created with owner-only permissions.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{SecretError, SecretStore};

#[derive(Debug)]
pub struct FileSecretStore {
    path: PathBuf,
    entries: RefCell<BTreeMap<String, String>>,
}

impl FileSecretStore {
    /// Open the store at `path`, reading existing entries if the file exists.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SecretError> {
        let path = path.into();
        let entries = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            toml::from_str(&raw).map_err(|e| SecretError::Corrupt(e.to_string()))?
        } else {
            BTreeMap::new()
        };
        debug!(path = %path.display(), "opened secret store");
        Ok(Self {
            path,
            entries: RefCell::new(entries),
        })
    }

    /// A store at `path` that ignores whatever the file holds; the first
    /// change overwrites it.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: RefCell::new(BTreeMap::new()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), SecretError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = toml::to_string(&*self.entries.borrow())
            .map_err(|e| SecretError::Corrupt(e.to_string()))?;

        let mut file = open_private(&self.path)?;
        file.write_all(raw.as_bytes())?;
        file.sync_all()?;
        Ok(())
    }
}

#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // `mode` only applies on creation; tighten a pre-existing file too.
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    Ok(file)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

impl SecretStore for FileSecretStore {
    fn get(&self, key: &str) -> Result<Option<String>, SecretError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SecretError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn delete(&self, key: &str) -> Result<(), SecretError> {
        let removed = self.entries.borrow_mut().remove(key).is_some();
        if removed { self.flush() } else { Ok(()) }
    }
}
