// binaa/src/storage/memory.rs
use crate::error::CheckoutResult;
use crate::storage::SlotStore;
use parking_lot::RwLock;
use std::collections::HashMap;

/// In-process slot store. Stands in for browser storage in tests and in
/// hosts that keep one process per customer.
#[derive(Debug, Default)]
pub struct MemoryStore {
  slots: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn keys(&self) -> Vec<String> {
    let mut keys: Vec<String> = self.slots.read().keys().cloned().collect();
    keys.sort();
    keys
  }
}

impl SlotStore for MemoryStore {
  fn get(&self, key: &str) -> CheckoutResult<Option<String>> {
    Ok(self.slots.read().get(key).cloned())
  }

  fn set(&self, key: &str, value: &str) -> CheckoutResult<()> {
    self.slots.write().insert(key.to_string(), value.to_string());
    Ok(())
  }

  fn remove(&self, key: &str) -> CheckoutResult<()> {
    self.slots.write().remove(key);
    Ok(())
  }
}
