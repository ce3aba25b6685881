// binaa/src/storage/file.rs
use crate::error::{CheckoutError, CheckoutResult};
use crate::storage::SlotStore;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Slot store backed by a directory, one file per slot.
///
/// Writes go to `<slot>.tmp` and are renamed into place, so a reader never
/// sees a half-written slot.
#[derive(Debug, Clone)]
pub struct FileStore {
  root: PathBuf,
}

impl FileStore {
  #[instrument(skip_all, fields(root = %root.as_ref().display()), err)]
  pub fn open(root: impl AsRef<Path>) -> CheckoutResult<Self> {
    let root = root.as_ref().to_path_buf();
    fs::create_dir_all(&root).map_err(|source| CheckoutError::Storage {
      key: root.display().to_string(),
      source,
    })?;
    Ok(Self { root })
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  /// Percent-encodes the key, so distinct keys always get distinct files.
  /// User ids inside `cart_<id>` come from the API and may hold any character.
  fn path_for(&self, key: &str) -> PathBuf {
    self.root.join(format!("{}.json", urlencoding::encode(key)))
  }
}

impl SlotStore for FileStore {
  fn get(&self, key: &str) -> CheckoutResult<Option<String>> {
    match fs::read_to_string(self.path_for(key)) {
      Ok(raw) => Ok(Some(raw)),
      Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
      Err(source) => Err(CheckoutError::Storage {
        key: key.to_string(),
        source,
      }),
    }
  }

  fn set(&self, key: &str, value: &str) -> CheckoutResult<()> {
    let path = self.path_for(key);
    let tmp = path.with_extension("json.tmp");
    let io_err = |source| CheckoutError::Storage {
      key: key.to_string(),
      source,
    };
    fs::write(&tmp, value).map_err(io_err)?;
    fs::rename(&tmp, &path).map_err(io_err)?;
    debug!(slot = key, bytes = value.len(), "Slot written.");
    Ok(())
  }

  fn remove(&self, key: &str) -> CheckoutResult<()> {
    match fs::remove_file(self.path_for(key)) {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
      Err(source) => Err(CheckoutError::Storage {
        key: key.to_string(),
        source,
      }),
    }
  }
}
