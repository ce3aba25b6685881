// binaa/src/storage/mod.rs

//! Durable key/value slots: the client-side storage every page reads from.
//!
//! Slots hold JSON text. All writes replace the whole value of a slot; there
//! is no partial update. Two writers on the same key are last-writer-wins.

pub mod file;
pub mod memory;

use crate::error::{CheckoutError, CheckoutResult};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Well-known slot keys.
pub mod keys {
  pub const TOKEN: &str = "token";
  pub const USER: &str = "user";
  /// Unscoped cart written by old releases. Only ever removed.
  pub const LEGACY_CART: &str = "cart";
  pub const CHECKOUT_SUMMARY: &str = "checkoutSummary";

  /// Slot holding the cart of one user.
  pub fn cart(user_id: &str) -> String {
    format!("cart_{user_id}")
  }
}

pub trait SlotStore: Send + Sync {
  fn get(&self, key: &str) -> CheckoutResult<Option<String>>;

  fn set(&self, key: &str, value: &str) -> CheckoutResult<()>;

  /// Removing a missing slot is not an error.
  fn remove(&self, key: &str) -> CheckoutResult<()>;
}

/// Reads and parses a JSON slot. `Ok(None)` when the slot is empty,
/// [`CheckoutError::Corrupt`] when it holds something unparsable.
pub fn read_json<T: DeserializeOwned>(store: &dyn SlotStore, key: &str) -> CheckoutResult<Option<T>> {
  match store.get(key)? {
    None => Ok(None),
    Some(raw) => serde_json::from_str(&raw).map(Some).map_err(|source| CheckoutError::Corrupt {
      key: key.to_string(),
      source,
    }),
  }
}

pub fn write_json<T: Serialize + ?Sized>(store: &dyn SlotStore, key: &str, value: &T) -> CheckoutResult<()> {
  let raw = serde_json::to_string(value).map_err(|source| CheckoutError::Serialize {
    key: key.to_string(),
    source,
  })?;
  store.set(key, &raw)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn cart_key_is_scoped_by_user() {
    assert_eq!(keys::cart("42"), "cart_42");
    assert_ne!(keys::cart("a"), keys::cart("b"));
  }

  #[test]
  fn read_json_reports_corruption() {
    let store = MemoryStore::new();
    store.set("x", "{not json").unwrap();
    let res = read_json::<Vec<u32>>(&store, "x");
    assert!(matches!(res, Err(CheckoutError::Corrupt { key, .. }) if key == "x"));
  }

  #[test]
  fn read_json_on_empty_slot_is_none() {
    let store = MemoryStore::new();
    assert!(read_json::<Vec<u32>>(&store, "missing").unwrap().is_none());
  }
}
