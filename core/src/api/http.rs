// binaa/src/api/http.rs
use super::{
  Envelope, Order, OrdersBody, Product, ProductBody, StorefrontApi, UserBody, ORDERS_FETCH_FAILED,
  PRODUCT_FETCH_FAILED,
};
use crate::config::CheckoutConfig;
use crate::error::{CheckoutError, CheckoutResult};
use crate::session::User;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

/// [`StorefrontApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpStorefrontApi {
  client: reqwest::Client,
  base_url: String,
}

impl HttpStorefrontApi {
  pub fn new(base_url: impl Into<String>) -> CheckoutResult<Self> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    let client = reqwest::Client::builder().default_headers(headers).build()?;
    Ok(Self {
      client,
      base_url: base_url.into().trim_end_matches('/').to_string(),
    })
  }

  pub fn from_config(config: &CheckoutConfig) -> CheckoutResult<Self> {
    let base_url = config
      .api_base_url
      .as_deref()
      .ok_or_else(|| CheckoutError::Config("BINAA_API_BASE_URL is not set".to_string()))?;
    Self::new(base_url)
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.base_url, path)
  }

  /// GETs `path` and decodes the envelope whatever the status; the caller
  /// decides what a non-2xx means.
  async fn get<B: DeserializeOwned>(&self, path: &str, token: Option<&str>) -> CheckoutResult<(bool, Envelope<B>)> {
    let mut request = self.client.get(self.url(path));
    if let Some(token) = token {
      request = request.bearer_auth(token);
    }
    let response = request.send().await?;
    let status = response.status();
    debug!(path, %status, "Storefront API answered.");
    let envelope = response.json::<Envelope<B>>().await?;
    Ok((status.is_success(), envelope))
  }
}

#[async_trait]
impl StorefrontApi for HttpStorefrontApi {
  #[instrument(skip(self), err(Display))]
  async fn product(&self, id: &str) -> CheckoutResult<Product> {
    let (ok, envelope) = self.get::<ProductBody>(&format!("/api/products/{id}"), None).await?;
    envelope
      .into_body(ok, PRODUCT_FETCH_FAILED)?
      .product
      .ok_or_else(|| CheckoutError::Api {
        message: PRODUCT_FETCH_FAILED.to_string(),
      })
  }

  #[instrument(skip_all, err(Display))]
  async fn me(&self, token: &str) -> CheckoutResult<User> {
    let (ok, envelope) = self.get::<UserBody>("/api/auth/me", Some(token)).await?;
    match (ok && envelope.success, envelope.body.user) {
      (true, Some(user)) => Ok(user),
      _ => {
        warn!(message = envelope.message.as_deref().unwrap_or(""), "Profile request refused.");
        Err(CheckoutError::Unauthenticated)
      }
    }
  }

  #[instrument(skip_all, err(Display))]
  async fn my_orders(&self, token: &str) -> CheckoutResult<Vec<Order>> {
    let (ok, envelope) = self.get::<OrdersBody>("/api/orders/my-orders", Some(token)).await?;
    Ok(envelope.into_body(ok, ORDERS_FETCH_FAILED)?.orders)
  }

  fn base_url(&self) -> &str {
    &self.base_url
  }
}
