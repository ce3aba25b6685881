// binaa/src/api/mod.rs

//! The storefront REST API, as far as checkout needs it.

pub mod http;

pub use http::HttpStorefrontApi;

use crate::cart::{resolve_image_url, ProductSnapshot, SellerSnapshot, ShippingMethod};
use crate::error::{CheckoutError, CheckoutResult};
use crate::pricing;
use crate::session::User;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const PRODUCT_FETCH_FAILED: &str = "فشل في جلب بيانات المنتج";
pub const PRODUCT_FETCH_ERROR: &str = "حدث خطأ أثناء جلب بيانات المنتج";
pub const ORDERS_FETCH_FAILED: &str = "فشل في جلب الطلبات";
pub const ORDERS_FETCH_ERROR: &str = "حدث خطأ أثناء جلب الطلبات";

#[async_trait]
pub trait StorefrontApi: Send + Sync {
  /// `GET /api/products/:id`
  async fn product(&self, id: &str) -> CheckoutResult<Product>;

  /// `GET /api/auth/me`. A refused token is [`CheckoutError::Unauthenticated`].
  async fn me(&self, token: &str) -> CheckoutResult<User>;

  /// `GET /api/orders/my-orders`, newest first.
  async fn my_orders(&self, token: &str) -> CheckoutResult<Vec<Order>>;

  /// Host that relative image paths are served from.
  fn base_url(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seller {
  #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
  pub id: Option<String>,
  pub name: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub email: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
  #[serde(rename = "_id")]
  pub id: String,
  pub name: String,
  #[serde(default)]
  pub description: String,
  #[serde(deserialize_with = "pricing::deserialize_amount")]
  pub price: Decimal,
  #[serde(default)]
  pub image: Option<String>,
  #[serde(default)]
  pub category: String,
  #[serde(default)]
  pub brand: Option<String>,
  #[serde(default)]
  pub stock: Option<u32>,
  #[serde(default)]
  pub unit: Option<String>,
  #[serde(default)]
  pub color: Option<String>,
  #[serde(default)]
  pub size: Option<String>,
  #[serde(default)]
  pub feature1: Option<String>,
  #[serde(default)]
  pub feature2: Option<String>,
  #[serde(default)]
  pub feature3: Option<String>,
  #[serde(default)]
  pub shipping_method: Option<ShippingMethod>,
  #[serde(default, deserialize_with = "pricing::deserialize_optional_amount")]
  pub shipping_cost: Option<Decimal>,
  #[serde(default)]
  pub seller: Option<Seller>,
}

impl Product {
  /// What a cart line keeps of this product.
  pub fn snapshot(&self, api_base_url: &str) -> ProductSnapshot {
    ProductSnapshot {
      product_id: self.id.clone(),
      name: self.name.clone(),
      price: self.price,
      seller: self.seller.as_ref().map(|s| SellerSnapshot {
        name: s.name.clone(),
        email: s.email.clone(),
        phone: s.phone.clone(),
      }),
      shipping_method: self.shipping_method,
      shipping_cost: self.shipping_cost,
      image: resolve_image_url(self.image.as_deref(), api_base_url),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
  #[serde(default)]
  pub product: Option<String>,
  #[serde(default)]
  pub quantity: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
  #[serde(rename = "_id")]
  pub id: String,
  pub total_amount: Decimal,
  #[serde(default)]
  pub products: Vec<OrderLine>,
}

/// `{success, message?, ...body}` as every endpoint answers.
#[derive(Debug, Deserialize)]
pub struct Envelope<B> {
  #[serde(default)]
  pub success: bool,
  #[serde(default)]
  pub message: Option<String>,
  #[serde(flatten)]
  pub body: B,
}

impl<B> Envelope<B> {
  /// The body when the call succeeded, else [`CheckoutError::Api`] with the
  /// server message or `fallback`.
  pub fn into_body(self, http_ok: bool, fallback: &str) -> CheckoutResult<B> {
    if http_ok && self.success {
      return Ok(self.body);
    }
    Err(CheckoutError::Api {
      message: self
        .message
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| fallback.to_string()),
    })
  }
}

#[derive(Debug, Deserialize)]
pub struct ProductBody {
  pub product: Option<Product>,
}

#[derive(Debug, Deserialize)]
pub struct UserBody {
  pub user: Option<User>,
}

#[derive(Debug, Deserialize)]
pub struct OrdersBody {
  #[serde(default)]
  pub orders: Vec<Order>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn failed_envelope_carries_server_message() {
    let env: Envelope<OrdersBody> = serde_json::from_str(r#"{"success":false,"message":"غير مصرح"}"#).unwrap();
    let err = env.into_body(true, ORDERS_FETCH_FAILED).unwrap_err();
    assert!(matches!(err, CheckoutError::Api { message } if message == "غير مصرح"));
  }

  #[test]
  fn failed_envelope_without_message_uses_fallback() {
    let env: Envelope<OrdersBody> = serde_json::from_str(r#"{"success":true}"#).unwrap();
    let err = env.into_body(false, ORDERS_FETCH_FAILED).unwrap_err();
    assert!(matches!(err, CheckoutError::Api { message } if message == ORDERS_FETCH_FAILED));
  }

  #[test]
  fn product_with_seller_parses() {
    let raw = r#"{"success":true,"product":{"_id":"p9","name":"Rebar 12mm","price":"310.50",
      "stock":40,"shippingMethod":"express","shippingCost":75,
      "seller":{"_id":"s1","name":"Gulf Steel","phone":"0500000000"}}}"#;
    let env: Envelope<ProductBody> = serde_json::from_str(raw).unwrap();
    let product = env.into_body(true, PRODUCT_FETCH_FAILED).unwrap().product.unwrap();
    assert_eq!(product.stock, Some(40));
    assert_eq!(product.shipping_method, Some(ShippingMethod::Express));
    assert_eq!(product.seller.unwrap().name, "Gulf Steel");
    assert_eq!(product.price, Decimal::new(31050, 2));
  }
}
