// binaa/src/cart/mod.rs

//! The per-user shopping cart.
//!
//! A [`Cart`] is the in-memory list a page works on. Every mutation writes
//! the full list back to the user's slot before returning, so whichever page
//! mounts next sees it.

pub mod item;
pub mod store;

pub use item::{resolve_image_url, CartLineItem, ProductSnapshot, SellerSnapshot, ShippingMethod};
pub use store::CartStore;

use crate::error::{CheckoutError, CheckoutResult};
use crate::pricing::{CartTotals, PricingPolicy};
use tracing::{debug, error, instrument};

#[derive(Debug, Clone, Default)]
pub struct Cart {
  /// `None` for a visitor without a session: the list lives in memory only.
  store: Option<CartStore>,
  items: Vec<CartLineItem>,
}

impl Cart {
  /// Loads the user's cart (empty when missing or corrupt).
  pub fn open(store: CartStore) -> Self {
    let items = store.load();
    Self {
      store: Some(store),
      items,
    }
  }

  /// A cart that is never persisted.
  pub fn detached() -> Self {
    Self::default()
  }

  pub fn is_persistent(&self) -> bool {
    self.store.is_some()
  }

  pub fn items(&self) -> &[CartLineItem] {
    &self.items
  }

  pub fn get(&self, product_id: &str) -> Option<&CartLineItem> {
    self.items.iter().find(|i| i.product_id == product_id)
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  pub fn line_count(&self) -> usize {
    self.items.len()
  }

  /// Sum of all line quantities.
  pub fn total_quantity(&self) -> u64 {
    self.items.iter().map(|i| u64::from(i.quantity)).sum()
  }

  pub fn totals(&self, policy: &PricingPolicy) -> CartTotals {
    CartTotals::compute(&self.items, policy)
  }

  /// Adds `quantity` of a product. A product already in the cart keeps its
  /// first snapshot and only has its quantity raised.
  #[instrument(level = "debug", skip(self, snapshot), fields(product_id = %snapshot.product_id))]
  pub fn add_or_increment(&mut self, snapshot: &ProductSnapshot, quantity: u32) -> CheckoutResult<()> {
    merge_line(&mut self.items, snapshot, quantity)?;
    self.persist()
  }

  /// Moves a quantity by `delta`, flooring at zero. A line that reaches zero
  /// is removed. Unknown ids leave the list as is.
  pub fn change_quantity(&mut self, product_id: &str, delta: i64) -> CheckoutResult<()> {
    if let Some(pos) = self.items.iter().position(|i| i.product_id == product_id) {
      let next = (i64::from(self.items[pos].quantity) + delta).clamp(0, i64::from(u32::MAX));
      if next == 0 {
        self.items.remove(pos);
      } else {
        // Clamped into u32 range above.
        self.items[pos].quantity = next as u32;
      }
    }
    self.persist()
  }

  pub fn remove_item(&mut self, product_id: &str) -> CheckoutResult<()> {
    self.items.retain(|i| i.product_id != product_id);
    self.persist()
  }

  fn persist(&self) -> CheckoutResult<()> {
    match &self.store {
      Some(store) => store.save(&self.items).map_err(|e| {
        error!(slot = %store.key(), error = %e, "Cart persist failed; memory is ahead of storage.");
        e
      }),
      None => {
        debug!("Detached cart, nothing persisted.");
        Ok(())
      }
    }
  }
}

/// Adds `quantity` of `snapshot` to `items` in place, keeping product ids
/// unique. Nothing is persisted.
pub fn merge_line(items: &mut Vec<CartLineItem>, snapshot: &ProductSnapshot, quantity: u32) -> CheckoutResult<()> {
  if quantity == 0 {
    return Err(CheckoutError::InvalidQuantity {
      product_id: snapshot.product_id.clone(),
    });
  }
  match items.iter_mut().find(|i| i.product_id == snapshot.product_id) {
    Some(existing) => existing.quantity = existing.quantity.saturating_add(quantity),
    None => items.push(snapshot.to_line_item(quantity)),
  }
  Ok(())
}
