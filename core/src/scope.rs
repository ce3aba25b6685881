// binaa/src/scope.rs

//! Page-lifetime cancellation.
//!
//! Every page owns a [`PageScope`]. Network calls made while the page is open
//! are raced against the scope, so a response that lands after the page was
//! torn down is dropped instead of being written into state nobody renders.

use crate::error::{CheckoutError, CheckoutResult};
use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct PageScope {
  page: &'static str,
  token: CancellationToken,
}

impl PageScope {
  pub fn new(page: &'static str) -> Self {
    Self {
      page,
      token: CancellationToken::new(),
    }
  }

  pub fn page(&self) -> &'static str {
    self.page
  }

  /// Tears the page down. Pending and future guarded calls resolve to
  /// [`CheckoutError::Cancelled`].
  pub fn close(&self) {
    debug!(page = self.page, "Closing page scope.");
    self.token.cancel();
  }

  pub fn is_closed(&self) -> bool {
    self.token.is_cancelled()
  }

  /// A scope that closes with this one (and can also be closed on its own).
  pub fn child(&self, page: &'static str) -> Self {
    Self {
      page,
      token: self.token.child_token(),
    }
  }

  /// Runs `fut` unless the scope closes first.
  ///
  /// A result that arrives after the scope closed is discarded too, so callers
  /// may write the `Ok` value into page state without re-checking.
  pub async fn guard<T, F>(&self, operation: &str, fut: F) -> CheckoutResult<T>
  where
    F: Future<Output = CheckoutResult<T>>,
  {
    let cancelled = || CheckoutError::Cancelled {
      operation: operation.to_string(),
    };
    tokio::select! {
      biased;
      _ = self.token.cancelled() => {
        debug!(page = self.page, operation, "Guarded call abandoned.");
        Err(cancelled())
      }
      result = fut => {
        if self.token.is_cancelled() {
          debug!(page = self.page, operation, "Late response discarded.");
          return Err(cancelled());
        }
        result
      }
    }
  }
}
