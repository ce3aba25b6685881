// binaa/src/session.rs

//! The authenticated identity, as an explicit value.
//!
//! Pages receive a [`Session`] when they mount instead of re-reading the
//! `user` slot in every handler. Carts are keyed by the session's user id.

use crate::error::{CheckoutError, CheckoutResult};
use crate::storage::{self, keys, SlotStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  #[default]
  Customer,
  Seller,
  Admin,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "UserWire")]
pub struct User {
  pub id: String,
  pub role: Role,
  pub name: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub phone: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub email: Option<String>,
}

/// The API sends the id as either `id` or `_id`.
#[derive(Deserialize)]
struct UserWire {
  id: Option<String>,
  #[serde(rename = "_id")]
  mongo_id: Option<String>,
  #[serde(default)]
  role: Role,
  #[serde(default)]
  name: String,
  phone: Option<String>,
  email: Option<String>,
}

impl TryFrom<UserWire> for User {
  type Error = String;

  fn try_from(wire: UserWire) -> Result<Self, Self::Error> {
    let id = wire
      .id
      .or(wire.mongo_id)
      .filter(|id| !id.is_empty())
      .ok_or_else(|| "user record has neither `id` nor `_id`".to_string())?;
    Ok(User {
      id,
      role: wire.role,
      name: wire.name,
      phone: wire.phone,
      email: wire.email,
    })
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
  pub token: Option<String>,
  pub user: Option<User>,
}

impl Session {
  pub fn new(token: impl Into<String>, user: User) -> Self {
    Self {
      token: Some(token.into()),
      user: Some(user),
    }
  }

  pub fn anonymous() -> Self {
    Self::default()
  }

  /// Both a token and a user record are present.
  pub fn is_authenticated(&self) -> bool {
    self.token.is_some() && self.user.is_some()
  }

  pub fn user_id(&self) -> Option<&str> {
    self.user.as_ref().map(|u| u.id.as_str())
  }
}

/// Reads and clears the `token` / `user` slots the auth collaborator fills.
#[derive(Clone)]
pub struct SessionStore {
  store: Arc<dyn SlotStore>,
}

impl SessionStore {
  pub fn new(store: Arc<dyn SlotStore>) -> Self {
    Self { store }
  }

  /// Current session. An unparsable `user` slot counts as no user.
  pub fn load(&self) -> CheckoutResult<Session> {
    let token = self.store.get(keys::TOKEN)?.filter(|t| !t.is_empty());
    let user = match storage::read_json::<User>(self.store.as_ref(), keys::USER) {
      Ok(user) => user,
      Err(CheckoutError::Corrupt { key, source }) => {
        warn!(slot = %key, error = %source, "Ignoring unreadable user slot.");
        None
      }
      Err(e) => return Err(e),
    };
    Ok(Session { token, user })
  }

  /// What the login page does after a successful sign-in.
  pub fn login(&self, token: &str, user: &User) -> CheckoutResult<Session> {
    self.store.set(keys::TOKEN, token)?;
    storage::write_json(self.store.as_ref(), keys::USER, user)?;
    info!(user_id = %user.id, "Session stored.");
    Ok(Session::new(token, user.clone()))
  }

  /// Signs out: drops credentials, the user's cart and the legacy cart.
  #[instrument(skip_all, fields(user_id = session.user_id().unwrap_or("-")))]
  pub fn logout(&self, session: &Session) -> CheckoutResult<()> {
    self.store.remove(keys::TOKEN)?;
    self.store.remove(keys::USER)?;
    if let Some(user_id) = session.user_id() {
      self.store.remove(&keys::cart(user_id))?;
    }
    self.store.remove(keys::LEGACY_CART)?;
    info!("Signed out.");
    Ok(())
  }

  /// The API refused the token: forget it. The scoped cart is left alone
  /// since the owning user is unknown at this point.
  pub fn invalidate(&self) -> CheckoutResult<()> {
    self.store.remove(keys::TOKEN)?;
    self.store.remove(keys::USER)?;
    self.store.remove(keys::LEGACY_CART)?;
    warn!("Session invalidated.");
    Ok(())
  }
}
