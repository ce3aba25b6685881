// binaa/src/cart/store.rs
use super::item::CartLineItem;
use crate::error::{CheckoutError, CheckoutResult};
use crate::session::Session;
use crate::storage::{self, keys, SlotStore};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// The `cart_<userId>` slot of one user.
#[derive(Clone)]
pub struct CartStore {
  store: Arc<dyn SlotStore>,
  user_id: String,
  key: String,
}

impl std::fmt::Debug for CartStore {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("CartStore").field("key", &self.key).finish()
  }
}

impl CartStore {
  pub fn new(store: Arc<dyn SlotStore>, user_id: impl Into<String>) -> Self {
    let user_id = user_id.into();
    let key = keys::cart(&user_id);
    Self { store, user_id, key }
  }

  /// Store of the session's user, or [`CheckoutError::Unauthenticated`].
  pub fn for_session(store: Arc<dyn SlotStore>, session: &Session) -> CheckoutResult<Self> {
    let user_id = session.user_id().ok_or(CheckoutError::Unauthenticated)?;
    Ok(Self::new(store, user_id))
  }

  pub fn user_id(&self) -> &str {
    &self.user_id
  }

  pub fn key(&self) -> &str {
    &self.key
  }

  /// Reads the cart. Never fails: a corrupt slot is removed and read as
  /// empty, an unreadable one is read as empty.
  #[instrument(level = "debug", skip(self), fields(slot = %self.key))]
  pub fn load(&self) -> Vec<CartLineItem> {
    match storage::read_json::<Vec<CartLineItem>>(self.store.as_ref(), &self.key) {
      Ok(Some(items)) => normalize(items),
      Ok(None) => Vec::new(),
      Err(CheckoutError::Corrupt { source, .. }) => {
        warn!(error = %source, "Discarding corrupt cart.");
        if let Err(e) = self.store.remove(&self.key) {
          warn!(error = %e, "Could not remove corrupt cart slot.");
        }
        Vec::new()
      }
      Err(e) => {
        warn!(error = %e, "Cart slot unreadable, starting empty.");
        Vec::new()
      }
    }
  }

  /// Replaces the stored list with `items`.
  pub fn save(&self, items: &[CartLineItem]) -> CheckoutResult<()> {
    storage::write_json(self.store.as_ref(), &self.key, items)?;
    debug!(slot = %self.key, lines = items.len(), "Cart saved.");
    Ok(())
  }

  pub fn clear(&self) -> CheckoutResult<()> {
    self.store.remove(&self.key)
  }

  /// Removes the unscoped cart older releases wrote.
  pub fn clear_legacy(store: &dyn SlotStore) -> CheckoutResult<()> {
    store.remove(keys::LEGACY_CART)
  }
}

/// Drops zero-quantity lines and folds duplicate product ids into the first
/// occurrence, keeping insertion order.
fn normalize(items: Vec<CartLineItem>) -> Vec<CartLineItem> {
  let mut out: Vec<CartLineItem> = Vec::with_capacity(items.len());
  let mut index: HashMap<String, usize> = HashMap::new();
  for item in items {
    if item.quantity == 0 {
      warn!(product_id = %item.product_id, "Dropping stored line with zero quantity.");
      continue;
    }
    match index.get(&item.product_id) {
      Some(&i) => out[i].quantity = out[i].quantity.saturating_add(item.quantity),
      None => {
        index.insert(item.product_id.clone(), out.len());
        out.push(item);
      }
    }
  }
  out
}
