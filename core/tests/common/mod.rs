// tests/common/mod.rs
#![allow(dead_code)] // Not every test binary uses every helper

use async_trait::async_trait;
use binaa::api::{Order, Product, Seller};
use binaa::{
  CheckoutConfig, CheckoutError, CheckoutResult, MemoryStore, PageServices, ProductSnapshot, Role, Session,
  ShippingMethod, SlotStore, StorefrontApi, User,
};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// --- Tracing, once per test binary ---
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  // RUST_LOG overrides, e.g. `RUST_LOG=binaa=trace`.
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// --- Canned API answers ---
#[derive(Clone, Debug)]
pub enum Reply<T> {
  Ok(T),
  /// `success: false` with a server message.
  Rejected(String),
  /// The token was refused.
  Refused,
  /// Anything else going wrong on the way.
  Broken,
}

impl<T: Clone> Reply<T> {
  fn produce(&self) -> CheckoutResult<T> {
    match self {
      Reply::Ok(v) => Ok(v.clone()),
      Reply::Rejected(message) => Err(CheckoutError::Api {
        message: message.clone(),
      }),
      Reply::Refused => Err(CheckoutError::Unauthenticated),
      Reply::Broken => Err(CheckoutError::Internal("connection reset".to_string())),
    }
  }
}

pub struct StubApi {
  pub product: Mutex<Reply<Product>>,
  pub me: Mutex<Reply<User>>,
  pub orders: Mutex<Reply<Vec<Order>>>,
  /// Every call sleeps this long first.
  pub delay: Mutex<Option<Duration>>,
  pub calls: AtomicUsize,
}

impl StubApi {
  pub fn new() -> Self {
    Self {
      product: Mutex::new(Reply::Ok(product("p1", 100, Some(30)))),
      me: Mutex::new(Reply::Ok(user("u1", "Ahmad Ali"))),
      orders: Mutex::new(Reply::Ok(Vec::new())),
      delay: Mutex::new(None),
      calls: AtomicUsize::new(0),
    }
  }

  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }

  async fn answer<T: Clone>(&self, reply: &Mutex<Reply<T>>) -> CheckoutResult<T> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    let delay = *self.delay.lock();
    if let Some(delay) = delay {
      tokio::time::sleep(delay).await;
    }
    let answer = reply.lock().produce();
    answer
  }
}

#[async_trait]
impl StorefrontApi for StubApi {
  async fn product(&self, _id: &str) -> CheckoutResult<Product> {
    self.answer(&self.product).await
  }

  async fn me(&self, _token: &str) -> CheckoutResult<User> {
    self.answer(&self.me).await
  }

  async fn my_orders(&self, _token: &str) -> CheckoutResult<Vec<Order>> {
    self.answer(&self.orders).await
  }

  fn base_url(&self) -> &str {
    "http://api.test"
  }
}

// --- Fixtures ---
pub fn user(id: &str, name: &str) -> User {
  User {
    id: id.to_string(),
    role: Role::Customer,
    name: name.to_string(),
    phone: Some("0551234567".to_string()),
    email: None,
  }
}

pub fn product(id: &str, price: i64, shipping_cost: Option<i64>) -> Product {
  Product {
    id: id.to_string(),
    name: format!("Product {id}"),
    description: String::new(),
    price: Decimal::from(price),
    image: Some(format!("/uploads/{id}.png")),
    category: "cement".to_string(),
    brand: None,
    stock: None,
    unit: None,
    color: None,
    size: None,
    feature1: None,
    feature2: None,
    feature3: None,
    shipping_method: Some(ShippingMethod::Express),
    shipping_cost: shipping_cost.map(Decimal::from),
    seller: Some(Seller {
      id: Some("s1".to_string()),
      name: "Gulf Building Supplies".to_string(),
      email: Some("sales@gulf.example".to_string()),
      phone: Some("0500000000".to_string()),
    }),
  }
}

pub fn snapshot(id: &str, price: i64, shipping_cost: Option<i64>) -> ProductSnapshot {
  product(id, price, shipping_cost).snapshot("http://api.test")
}

pub fn signed_in(store: &Arc<MemoryStore>, user: &User) -> Session {
  binaa::SessionStore::new(store.clone())
    .login("token-123", user)
    .expect("login writes to memory")
}

pub fn services(api: Arc<StubApi>, store: Arc<MemoryStore>) -> PageServices {
  let slots: Arc<dyn SlotStore> = store;
  PageServices::new(api, slots, CheckoutConfig::default())
}
