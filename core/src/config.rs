// binaa/src/config.rs

use crate::error::{CheckoutError, CheckoutResult};
use crate::pricing::PricingPolicy;
use crate::storage::FileStore;
use dotenvy::dotenv;
use rust_decimal::Decimal;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutConfig {
  /// Required only by the HTTP API client.
  pub api_base_url: Option<String>,
  pub storage_dir: PathBuf,
  pub tax_rate: Decimal,
  pub fallback_shipping_cost: Decimal,
  /// Quantity cap on the product page when the product has no stock figure.
  pub max_quantity: u32,
}

impl Default for CheckoutConfig {
  fn default() -> Self {
    let policy = PricingPolicy::default();
    Self {
      api_base_url: None,
      storage_dir: PathBuf::from(".binaa"),
      tax_rate: policy.tax_rate,
      fallback_shipping_cost: policy.fallback_shipping_cost,
      max_quantity: 999,
    }
  }
}

impl CheckoutConfig {
  pub fn from_env() -> CheckoutResult<Self> {
    dotenv().ok(); // Load .env file if present
    let config = Self::from_lookup(|name| env::var(name).ok())?;
    tracing::info!(storage_dir = %config.storage_dir.display(), "Checkout configuration loaded.");
    Ok(config)
  }

  /// Builds the config from any variable source. Unset variables keep their
  /// defaults, set but unparsable ones are errors.
  pub fn from_lookup<F>(lookup: F) -> CheckoutResult<Self>
  where
    F: Fn(&str) -> Option<String>,
  {
    let defaults = Self::default();
    let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    let tax_rate = parse_or(get("BINAA_TAX_RATE"), "BINAA_TAX_RATE", defaults.tax_rate)?;
    if tax_rate.is_sign_negative() {
      return Err(CheckoutError::Config(format!("BINAA_TAX_RATE must not be negative, got {tax_rate}")));
    }
    let fallback_shipping_cost = parse_or(
      get("BINAA_FALLBACK_SHIPPING_COST"),
      "BINAA_FALLBACK_SHIPPING_COST",
      defaults.fallback_shipping_cost,
    )?;
    let max_quantity = parse_or(get("BINAA_MAX_QUANTITY"), "BINAA_MAX_QUANTITY", defaults.max_quantity)?;
    if max_quantity == 0 {
      return Err(CheckoutError::Config("BINAA_MAX_QUANTITY must be at least 1".to_string()));
    }

    Ok(Self {
      api_base_url: get("BINAA_API_BASE_URL"),
      storage_dir: get("BINAA_STORAGE_DIR").map(PathBuf::from).unwrap_or(defaults.storage_dir),
      tax_rate,
      fallback_shipping_cost,
      max_quantity,
    })
  }

  pub fn pricing_policy(&self) -> PricingPolicy {
    PricingPolicy {
      tax_rate: self.tax_rate,
      fallback_shipping_cost: self.fallback_shipping_cost,
    }
  }

  pub fn open_store(&self) -> CheckoutResult<FileStore> {
    FileStore::open(&self.storage_dir)
  }
}

fn parse_or<T>(raw: Option<String>, name: &str, default: T) -> CheckoutResult<T>
where
  T: FromStr,
  T::Err: std::fmt::Display,
{
  match raw {
    None => Ok(default),
    Some(raw) => raw
      .parse::<T>()
      .map_err(|e| CheckoutError::Config(format!("Invalid {name} '{raw}': {e}"))),
  }
}
