use std::cell::RefCell;
use std::collections::HashMap;

use super::{SecretError, SecretStore};

/// Process-lifetime store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemorySecretStore {
    entries: RefCell<HashMap<String, String>>,
}

impl SecretStore for MemorySecretStore {
    fn get(&self, key: &str) -> Result<Option<String>, SecretError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SecretError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), SecretError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}
