// binaa/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CheckoutError {
  #[error("Storage I/O failed for slot '{key}'. Source: {source}")]
  Storage {
    key: String,
    #[source]
    source: std::io::Error,
  },

  #[error("Slot '{key}' holds malformed JSON. Source: {source}")]
  Corrupt {
    key: String,
    #[source]
    source: serde_json::Error,
  },

  #[error("Could not serialize value for slot '{key}'. Source: {source}")]
  Serialize {
    key: String,
    #[source]
    source: serde_json::Error,
  },

  #[error("API transport error: {0}")]
  Transport(#[from] reqwest::Error),

  #[error("API rejected the request: {message}")]
  Api { message: String },

  #[error("Quantity must be at least 1 (product '{product_id}')")]
  InvalidQuantity { product_id: String },

  #[error("No authenticated session")]
  Unauthenticated,

  #[error("Validation failed: {0}")]
  Validation(#[from] validator::ValidationErrors),

  #[error("Configuration error: {0}")]
  Config(String),

  #[error("Page scope closed before '{operation}' finished")]
  Cancelled { operation: String },

  #[error("Handler missing for non-optional step: {step_name}")]
  HandlerMissing { step_name: String },

  #[error("Error in step handler. Source: {source}")]
  Handler {
    #[source]
    source: AnyhowError,
  },

  #[error("Internal checkout error: {0}")]
  Internal(String),
}

impl From<AnyhowError> for CheckoutError {
  fn from(err: AnyhowError) -> Self {
    // Unwrap a CheckoutError that was boxed into anyhow on the way up.
    match err.downcast::<CheckoutError>() {
      Ok(inner) => inner,
      Err(source) => CheckoutError::Handler { source },
    }
  }
}

pub type CheckoutResult<T, E = CheckoutError> = std::result::Result<T, E>;
