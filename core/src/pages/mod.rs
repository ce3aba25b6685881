// binaa/src/pages/mod.rs

//! The three cart-bearing pages: product detail, shipping (the checkout
//! wizard) and payment.
//!
//! A page is mounted with an explicit [`Session`](crate::session::Session)
//! and a [`PageScope`](crate::scope::PageScope). Its state sits in a
//! [`PageData`](crate::flow::PageData) that its flows run against; closing
//! the scope stops every pending fetch from writing into it.

pub mod payment;
pub mod product;
pub mod shipping;

pub use payment::{PaymentMethod, PaymentPage};
pub use product::{AddToCartOutcome, ProductPage, ProductState};
pub use shipping::{ShippingLine, ShippingPage, ShippingState};

use crate::api::StorefrontApi;
use crate::config::CheckoutConfig;
use crate::pricing::PricingPolicy;
use crate::session::SessionStore;
use crate::storage::SlotStore;
use std::fmt;
use std::sync::Arc;

/// What every page is mounted with besides its session and scope.
#[derive(Clone)]
pub struct PageServices {
  pub api: Arc<dyn StorefrontApi>,
  pub slots: Arc<dyn SlotStore>,
  pub config: CheckoutConfig,
}

impl PageServices {
  pub fn new(api: Arc<dyn StorefrontApi>, slots: Arc<dyn SlotStore>, config: CheckoutConfig) -> Self {
    Self { api, slots, config }
  }

  pub fn sessions(&self) -> SessionStore {
    SessionStore::new(self.slots.clone())
  }

  pub fn pricing_policy(&self) -> PricingPolicy {
    self.config.pricing_policy()
  }
}

/// Where a page action sends the buyer next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
  Home,
  Login,
  ProductDetail(String),
  Shipping,
  Payment,
}

impl Route {
  pub fn path(&self) -> String {
    match self {
      Route::Home => "/".to_string(),
      Route::Login => "/login".to_string(),
      Route::ProductDetail(id) => format!("/products/{id}"),
      Route::Shipping => "/shipping".to_string(),
      Route::Payment => "/payment".to_string(),
    }
  }
}

impl fmt::Display for Route {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.path())
  }
}
