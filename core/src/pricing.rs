// binaa/src/pricing.rs

//! Cart totals. Pure functions of the current line items, recomputed
//! whenever they are needed.

use crate::cart::CartLineItem;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{de, Deserialize, Deserializer, Serialize};
use tracing::warn;

/// Largest price or shipping cost accepted from the API or a stored cart.
/// With quantities capped well below `u32::MAX` the totals stay in range.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0); // 1e15

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingPolicy {
  pub tax_rate: Decimal,
  /// Charged for a line whose shipping cost is missing or zero.
  pub fallback_shipping_cost: Decimal,
}

impl Default for PricingPolicy {
  fn default() -> Self {
    Self {
      tax_rate: Decimal::new(15, 2),
      fallback_shipping_cost: Decimal::from(50),
    }
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
  #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
  pub subtotal: Decimal,
  #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
  pub shipping_cost: Decimal,
  #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
  pub tax: Decimal,
  #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
  pub grand_total: Decimal,
}

impl CartTotals {
  /// Totals never panic: an overflowing sum is capped at `Decimal::MAX`.
  pub fn compute(items: &[CartLineItem], policy: &PricingPolicy) -> Self {
    let subtotal = saturate("subtotal", checked_sum(items.iter().map(line_total)));
    let shipping_cost = saturate(
      "shipping_cost",
      checked_sum(items.iter().map(|i| Some(item_shipping_cost(i, policy)))),
    );
    let tax = saturate(
      "tax",
      subtotal
        .checked_mul(policy.tax_rate)
        .map(|t| t.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)),
    );
    let grand_total = saturate(
      "grand_total",
      subtotal.checked_add(shipping_cost).and_then(|t| t.checked_add(tax)),
    );
    Self {
      subtotal,
      shipping_cost,
      tax,
      grand_total,
    }
  }

  pub fn zero() -> Self {
    Self::default()
  }
}

/// `None` when price times quantity does not fit in a `Decimal`.
pub fn line_total(item: &CartLineItem) -> Option<Decimal> {
  item.price.checked_mul(Decimal::from(item.quantity))
}

fn checked_sum(amounts: impl Iterator<Item = Option<Decimal>>) -> Option<Decimal> {
  amounts.fold(Some(Decimal::ZERO), |acc, amount| acc?.checked_add(amount?))
}

fn saturate(total: &'static str, amount: Option<Decimal>) -> Decimal {
  amount.unwrap_or_else(|| {
    warn!(total, "Cart total overflowed, capping it.");
    Decimal::MAX
  })
}

fn check_amount<E: de::Error>(amount: Decimal) -> Result<Decimal, E> {
  if amount.is_sign_negative() && !amount.is_zero() {
    return Err(E::custom(format!("negative amount {amount}")));
  }
  if amount > MAX_AMOUNT {
    return Err(E::custom(format!("amount {amount} exceeds {MAX_AMOUNT}")));
  }
  Ok(amount)
}

/// Reads a price or shipping cost, rejecting negative and out-of-range values.
/// Accepts both JSON numbers and numeric strings.
pub(crate) fn deserialize_amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
  check_amount(<Decimal as Deserialize>::deserialize(deserializer)?)
}

pub(crate) fn deserialize_optional_amount<'de, D: Deserializer<'de>>(
  deserializer: D,
) -> Result<Option<Decimal>, D::Error> {
  Option::<Decimal>::deserialize(deserializer)?.map(check_amount).transpose()
}

/// Shipping is charged per line, each seller ships on its own.
pub fn item_shipping_cost(item: &CartLineItem, policy: &PricingPolicy) -> Decimal {
  match item.shipping_cost {
    Some(cost) if !cost.is_zero() => cost,
    _ => policy.fallback_shipping_cost,
  }
}

/// Number of units in the cart, not the number of lines.
pub fn products_count(items: &[CartLineItem]) -> u64 {
  items.iter().map(|i| u64::from(i.quantity)).sum()
}

pub fn products_label(items: &[CartLineItem]) -> String {
  match products_count(items) {
    0 => "المنتجات".to_string(),
    n => format!("المنتجات ({n})"),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn line(price: i64, quantity: u32, shipping_cost: Option<i64>) -> CartLineItem {
    CartLineItem {
      product_id: format!("p{price}"),
      name: "item".into(),
      price: Decimal::from(price),
      quantity,
      seller_name: None,
      seller_email: None,
      seller_phone: None,
      seller_shipping_method: None,
      shipping_cost: shipping_cost.map(Decimal::from),
      image: None,
    }
  }

  #[test]
  fn two_sellers_with_fallback_shipping() {
    let items = vec![line(100, 2, Some(30)), line(50, 1, None)];
    let totals = CartTotals::compute(&items, &PricingPolicy::default());
    assert_eq!(totals.subtotal, Decimal::from(250));
    assert_eq!(totals.shipping_cost, Decimal::from(80));
    assert_eq!(totals.tax, Decimal::from(38));
    assert_eq!(totals.grand_total, Decimal::from(368));
  }

  #[test]
  fn zero_shipping_cost_uses_fallback() {
    let items = vec![line(10, 1, Some(0))];
    assert_eq!(item_shipping_cost(&items[0], &PricingPolicy::default()), Decimal::from(50));
  }

  #[test]
  fn tax_rounds_half_up() {
    // 10 * 0.15 = 1.5
    let totals = CartTotals::compute(&[line(10, 1, Some(5))], &PricingPolicy::default());
    assert_eq!(totals.tax, Decimal::from(2));
    // 3 * 0.15 = 0.45
    let totals = CartTotals::compute(&[line(3, 1, Some(5))], &PricingPolicy::default());
    assert_eq!(totals.tax, Decimal::ZERO);
  }

  #[test]
  fn empty_cart_has_zero_totals() {
    assert_eq!(CartTotals::compute(&[], &PricingPolicy::default()), CartTotals::zero());
  }

  #[test]
  fn overflowing_totals_are_capped_instead_of_panicking() {
    let mut huge = line(1, 2, Some(1));
    huge.price = Decimal::MAX;
    let totals = CartTotals::compute(&[huge.clone()], &PricingPolicy::default());
    assert_eq!(line_total(&huge), None);
    assert_eq!(totals.subtotal, Decimal::MAX);
    assert_eq!(totals.grand_total, Decimal::MAX);
    assert_eq!(totals.shipping_cost, Decimal::ONE);
  }

  #[test]
  fn totals_serialize_as_json_numbers() {
    let totals = CartTotals::compute(&[line(100, 2, Some(30))], &PricingPolicy::default());
    let value = serde_json::to_value(totals).unwrap();
    for field in ["subtotal", "shippingCost", "tax", "grandTotal"] {
      assert!(value[field].is_number(), "{field} is {}", value[field]);
    }
    assert_eq!(value["grandTotal"].as_f64(), Some(260.0));
  }

  #[test]
  fn amounts_reject_negative_and_out_of_range() {
    #[derive(Deserialize)]
    struct Priced {
      #[serde(deserialize_with = "deserialize_amount")]
      price: Decimal,
    }
    assert!(serde_json::from_str::<Priced>(r#"{"price": -1}"#).is_err());
    assert!(serde_json::from_str::<Priced>(r#"{"price": 1e16}"#).is_err());
    assert_eq!(serde_json::from_str::<Priced>(r#"{"price": "12.5"}"#).unwrap().price, Decimal::new(125, 1));
    assert_eq!(serde_json::from_str::<Priced>(r#"{"price": 0}"#).unwrap().price, Decimal::ZERO);
  }

  #[test]
  fn label_counts_units() {
    let items = vec![line(1, 3, None), line(2, 2, None)];
    assert_eq!(products_label(&items), "المنتجات (5)");
    assert_eq!(products_label(&[]), "المنتجات");
  }
}
