// binaa/src/cart/item.rs
use crate::pricing;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How a seller ships a product. Chosen by the seller, shown read-only to
/// the buyer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShippingMethod {
  Standard,
  Express,
  SameDay,
}

impl ShippingMethod {
  /// Label used in the cart list.
  pub fn label(self) -> &'static str {
    match self {
      ShippingMethod::Standard => "شحن عادي",
      ShippingMethod::Express => "شحن سريع",
      ShippingMethod::SameDay => "توصيل في نفس اليوم",
    }
  }

  /// Label with the delivery window, used on the shipping-method step.
  pub fn label_with_window(method: Option<Self>) -> &'static str {
    match method {
      Some(ShippingMethod::Standard) => "شحن عادي (5-7 أيام عمل)",
      Some(ShippingMethod::Express) => "شحن سريع (2-3 أيام عمل)",
      Some(ShippingMethod::SameDay) => "توصيل في نفس اليوم",
      None => "غير محدد",
    }
  }

  /// Label on the product page, where a missing method reads as standard.
  pub fn product_label(method: Option<Self>) -> &'static str {
    match method {
      Some(ShippingMethod::Standard) => "شحن عادي (5-7 أيام)",
      Some(ShippingMethod::Express) => "شحن سريع (2-3 أيام)",
      Some(ShippingMethod::SameDay) => ShippingMethod::SameDay.label(),
      None => ShippingMethod::Standard.label(),
    }
  }
}

/// One product in a cart. Price and seller details are a snapshot taken when
/// the product was first added; they are never re-fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
  #[serde(rename = "_id", alias = "productId")]
  pub product_id: String,
  pub name: String,
  #[serde(
    serialize_with = "rust_decimal::serde::float::serialize",
    deserialize_with = "pricing::deserialize_amount"
  )]
  pub price: Decimal,
  pub quantity: u32,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub seller_name: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub seller_email: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub seller_phone: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub seller_shipping_method: Option<ShippingMethod>,
  #[serde(
    default,
    skip_serializing_if = "Option::is_none",
    serialize_with = "rust_decimal::serde::float_option::serialize",
    deserialize_with = "pricing::deserialize_optional_amount"
  )]
  pub shipping_cost: Option<Decimal>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub image: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SellerSnapshot {
  pub name: String,
  pub email: Option<String>,
  pub phone: Option<String>,
}

/// What the product page knows about a product at add-to-cart time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSnapshot {
  pub product_id: String,
  pub name: String,
  pub price: Decimal,
  pub seller: Option<SellerSnapshot>,
  pub shipping_method: Option<ShippingMethod>,
  pub shipping_cost: Option<Decimal>,
  pub image: String,
}

impl ProductSnapshot {
  pub fn to_line_item(&self, quantity: u32) -> CartLineItem {
    let seller = self.seller.as_ref();
    CartLineItem {
      product_id: self.product_id.clone(),
      name: self.name.clone(),
      price: self.price,
      quantity,
      seller_name: seller.map(|s| s.name.clone()),
      seller_email: seller.and_then(|s| s.email.clone()),
      seller_phone: seller.and_then(|s| s.phone.clone()),
      seller_shipping_method: self.shipping_method,
      shipping_cost: self.shipping_cost,
      image: Some(self.image.clone()),
    }
  }
}

pub const PLACEHOLDER_IMAGE: &str = "/placeholder.svg";

/// Absolute URLs are kept, paths are served by the API host, missing images
/// use the placeholder.
pub fn resolve_image_url(image: Option<&str>, api_base_url: &str) -> String {
  match image {
    Some(src) if src.starts_with("http") => src.to_string(),
    Some(src) if !src.is_empty() => format!("{}{}", api_base_url.trim_end_matches('/'), src),
    _ => PLACEHOLDER_IMAGE.to_string(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn line_item_reads_storefront_json() {
    let raw = r#"{"_id":"p1","name":"Cement 50kg","price":25,"quantity":4,
      "sellerName":"Al Bina Co","sellerShippingMethod":"same-day","shippingCost":30}"#;
    let item: CartLineItem = serde_json::from_str(raw).unwrap();
    assert_eq!(item.product_id, "p1");
    assert_eq!(item.price, Decimal::from(25));
    assert_eq!(item.seller_shipping_method, Some(ShippingMethod::SameDay));
    assert_eq!(item.shipping_cost, Some(Decimal::from(30)));
    assert!(item.seller_email.is_none());
  }

  #[test]
  fn image_urls_are_resolved_against_api_host() {
    assert_eq!(resolve_image_url(Some("https://cdn/x.png"), "http://api"), "https://cdn/x.png");
    assert_eq!(resolve_image_url(Some("/uploads/x.png"), "http://api/"), "http://api/uploads/x.png");
    assert_eq!(resolve_image_url(None, "http://api"), PLACEHOLDER_IMAGE);
  }

  #[test]
  fn shipping_labels() {
    assert_eq!(ShippingMethod::label_with_window(None), "غير محدد");
    assert_eq!(ShippingMethod::Express.label(), "شحن سريع");
    assert_eq!(ShippingMethod::product_label(None), "شحن عادي");
    assert_eq!(ShippingMethod::product_label(Some(ShippingMethod::Standard)), "شحن عادي (5-7 أيام)");
    assert_eq!(
      ShippingMethod::product_label(Some(ShippingMethod::SameDay)),
      ShippingMethod::label_with_window(Some(ShippingMethod::SameDay))
    );
  }
}
