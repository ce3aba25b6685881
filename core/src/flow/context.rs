// binaa/src/flow/context.rs
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;

/// Shared, lockable state of one page (product, shipping, payment).
///
/// Cloning is cheap and every clone sees the same data. Lock guards are
/// blocking and MUST be dropped before any `.await`.
#[derive(Debug)]
pub struct PageData<T: Send + Sync + 'static>(Arc<RwLock<T>>);

impl<T: Send + Sync + 'static> PageData<T> {
  pub fn new(data: T) -> Self {
    PageData(Arc::new(RwLock::new(data)))
  }

  pub fn read(&self) -> RwLockReadGuard<'_, T> {
    self.0.read()
  }

  pub fn write(&self) -> RwLockWriteGuard<'_, T> {
    self.0.write()
  }
}

impl<T: Send + Sync + 'static> Clone for PageData<T> {
  fn clone(&self) -> Self {
    PageData(Arc::clone(&self.0))
  }
}

impl<T: Send + Sync + 'static + Default> Default for PageData<T> {
  fn default() -> Self {
    Self::new(Default::default())
  }
}
