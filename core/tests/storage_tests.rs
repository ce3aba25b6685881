// tests/storage_tests.rs
mod common;

use binaa::storage::keys;
use binaa::{Cart, CartStore, CheckoutConfig, FileStore, SlotStore};
use common::*;
use serial_test::serial;
use std::path::PathBuf;
use std::sync::Arc;

fn scratch_dir(name: &str) -> PathBuf {
  let dir = std::env::temp_dir().join(format!("binaa-{}-{}", name, std::process::id()));
  let _ = std::fs::remove_dir_all(&dir);
  dir
}

#[test]
#[serial]
fn test_file_store_set_get_remove() {
  setup_tracing();
  let dir = scratch_dir("slots");
  let store = FileStore::open(&dir).unwrap();

  assert!(store.get(keys::TOKEN).unwrap().is_none());
  store.set(keys::TOKEN, "abc").unwrap();
  store.set(keys::TOKEN, "def").unwrap();
  assert_eq!(store.get(keys::TOKEN).unwrap().as_deref(), Some("def"));

  store.remove(keys::TOKEN).unwrap();
  store.remove(keys::TOKEN).unwrap();
  assert!(store.get(keys::TOKEN).unwrap().is_none());

  let leftovers: Vec<_> = std::fs::read_dir(&dir).unwrap().collect();
  assert!(leftovers.is_empty());
  std::fs::remove_dir_all(&dir).ok();
}

#[test]
#[serial]
fn test_cart_survives_reopening_the_store() {
  setup_tracing();
  let dir = scratch_dir("reopen");
  {
    let store = Arc::new(FileStore::open(&dir).unwrap());
    let mut cart = Cart::open(CartStore::new(store, "u/1"));
    cart.add_or_increment(&snapshot("p1", 40, Some(10)), 2).unwrap();
  }

  let store = Arc::new(FileStore::open(&dir).unwrap());
  let cart = Cart::open(CartStore::new(store.clone(), "u/1"));
  assert_eq!(cart.total_quantity(), 2);
  // User ids are percent-encoded into file names.
  assert!(dir.join("cart_u%2F1.json").exists());
  std::fs::remove_dir_all(&dir).ok();
}

#[test]
#[serial]
fn test_user_ids_differing_in_punctuation_keep_separate_carts() {
  setup_tracing();
  let dir = scratch_dir("isolation");
  let store = Arc::new(FileStore::open(&dir).unwrap());
  let mut dotted = Cart::open(CartStore::new(store.clone(), "ali.k"));
  dotted.add_or_increment(&snapshot("secret", 10, None), 3).unwrap();

  for other in ["ali_k", "ali-k", "ali%2Ek", "ali@k", "ali+k"] {
    let cart = Cart::open(CartStore::new(store.clone(), other));
    assert!(cart.is_empty(), "user {other} sees {:?}", cart.items());
  }
  assert_eq!(Cart::open(CartStore::new(store, "ali.k")).total_quantity(), 3);
  std::fs::remove_dir_all(&dir).ok();
}

#[test]
#[serial]
fn test_config_opens_the_configured_directory() {
  setup_tracing();
  let dir = scratch_dir("config");
  let config = CheckoutConfig {
    storage_dir: dir.clone(),
    ..CheckoutConfig::default()
  };

  let store = config.open_store().unwrap();

  assert_eq!(store.root(), dir.as_path());
  assert!(dir.is_dir());
  std::fs::remove_dir_all(&dir).ok();
}
