// binaa/src/handoff.rs

//! The one-shot channel from the shipping page to the payment page.
//!
//! The shipping page writes a frozen [`CheckoutSummary`] into the
//! `checkoutSummary` slot and navigates away; the payment page reads it once
//! on mount. Each checkout attempt overwrites the previous one.

use crate::cart::CartLineItem;
use crate::error::{CheckoutError, CheckoutResult};
use crate::pricing::{CartTotals, PricingPolicy};
use crate::storage::{self, keys, SlotStore};
use rust_decimal::Decimal;
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSummary {
  pub items: Vec<CartLineItem>,
  #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
  pub subtotal: Decimal,
  #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
  pub shipping_cost: Decimal,
  #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
  pub tax: Decimal,
  #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
  pub grand_total: Decimal,
}

impl CheckoutSummary {
  /// Copies the items and computes their totals.
  pub fn snapshot(items: &[CartLineItem], policy: &PricingPolicy) -> Self {
    let totals = CartTotals::compute(items, policy);
    Self {
      items: items.to_vec(),
      subtotal: totals.subtotal,
      shipping_cost: totals.shipping_cost,
      tax: totals.tax,
      grand_total: totals.grand_total,
    }
  }

  pub fn totals(&self) -> CartTotals {
    CartTotals {
      subtotal: self.subtotal,
      shipping_cost: self.shipping_cost,
      tax: self.tax,
      grand_total: self.grand_total,
    }
  }
}

#[derive(Clone)]
pub struct SummarySlot {
  store: Arc<dyn SlotStore>,
}

impl SummarySlot {
  pub fn new(store: Arc<dyn SlotStore>) -> Self {
    Self { store }
  }

  pub fn write(&self, summary: &CheckoutSummary) -> CheckoutResult<()> {
    storage::write_json(self.store.as_ref(), keys::CHECKOUT_SUMMARY, summary)?;
    info!(
      lines = summary.items.len(),
      grand_total = %summary.grand_total,
      "Checkout summary handed off."
    );
    Ok(())
  }

  /// The last summary written, if it is still readable.
  pub fn read(&self) -> Option<CheckoutSummary> {
    match storage::read_json(self.store.as_ref(), keys::CHECKOUT_SUMMARY) {
      Ok(summary) => summary,
      Err(e) => {
        log_unreadable(&e);
        None
      }
    }
  }
}

fn log_unreadable(e: &CheckoutError) {
  warn!(slot = keys::CHECKOUT_SUMMARY, error = %e, "Checkout summary unreadable, using zero totals.");
}

/// Lenient shape read by the payment page. Missing fields default.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredSummary {
  #[serde(default)]
  items: Vec<IgnoredAny>,
  subtotal: Option<Decimal>,
  shipping_cost: Option<Decimal>,
  tax: Option<Decimal>,
  grand_total: Option<Decimal>,
}

/// Totals shown by the payment page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaymentView {
  pub totals: CartTotals,
  pub line_count: usize,
  /// False when the slot was empty or unreadable.
  pub has_summary: bool,
}

impl PaymentView {
  /// Reads the hand-off slot. Absent or corrupt reads as all zeros; a
  /// summary without a grand total gets one from its parts.
  pub fn from_slot(store: &dyn SlotStore) -> Self {
    let stored = match storage::read_json::<StoredSummary>(store, keys::CHECKOUT_SUMMARY) {
      Ok(Some(stored)) => stored,
      Ok(None) => return Self::default(),
      Err(e) => {
        log_unreadable(&e);
        return Self::default();
      }
    };
    let subtotal = stored.subtotal.unwrap_or_default();
    let shipping_cost = stored.shipping_cost.unwrap_or_default();
    let tax = stored.tax.unwrap_or_default();
    Self {
      totals: CartTotals {
        subtotal,
        shipping_cost,
        tax,
        grand_total: stored.grand_total.unwrap_or_else(|| {
          subtotal
            .checked_add(shipping_cost)
            .and_then(|t| t.checked_add(tax))
            .unwrap_or(Decimal::MAX)
        }),
      },
      line_count: stored.items.len(),
      has_summary: true,
    }
  }
}
