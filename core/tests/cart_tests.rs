// tests/cart_tests.rs
mod common;

use binaa::storage::keys;
use binaa::{Cart, CartStore, MemoryStore, SessionStore, SlotStore};
use common::*;
use rust_decimal::Decimal;
use serial_test::serial;
use std::sync::Arc;

#[test]
#[serial]
fn test_load_after_save_returns_the_same_items() {
  setup_tracing();
  let mem = Arc::new(MemoryStore::new());
  let store = CartStore::new(mem.clone(), "u1");
  let items = vec![
    snapshot("p1", 100, Some(30)).to_line_item(2),
    snapshot("p2", 50, None).to_line_item(1),
  ];

  store.save(&items).unwrap();

  assert_eq!(store.load(), items);
  assert!(mem.get("cart_u1").unwrap().is_some());
}

#[test]
#[serial]
fn test_corrupt_cart_slot_loads_empty_and_is_discarded() {
  setup_tracing();
  let mem = Arc::new(MemoryStore::new());
  mem.set("cart_u1", "{\"_id\": oops").unwrap();

  let cart = Cart::open(CartStore::new(mem.clone(), "u1"));

  assert!(cart.is_empty());
  assert!(mem.get("cart_u1").unwrap().is_none());
}

#[test]
#[serial]
fn test_out_of_range_prices_in_a_stored_cart_count_as_corruption() {
  setup_tracing();
  let mem = Arc::new(MemoryStore::new());
  for price in ["-5", "1e30"] {
    let raw = format!(r#"[{{"_id":"p1","name":"x","price":{price},"quantity":1}}]"#);
    mem.set("cart_u1", &raw).unwrap();

    let cart = Cart::open(CartStore::new(mem.clone(), "u1"));

    assert!(cart.is_empty(), "price {price} was accepted");
    assert!(mem.get("cart_u1").unwrap().is_none());
  }
}

#[test]
#[serial]
fn test_saved_cart_stores_money_as_json_numbers() {
  setup_tracing();
  let mem = Arc::new(MemoryStore::new());
  CartStore::new(mem.clone(), "u1")
    .save(&[snapshot("p1", 100, Some(30)).to_line_item(2)])
    .unwrap();

  let raw = mem.get("cart_u1").unwrap().unwrap();
  let stored: serde_json::Value = serde_json::from_str(&raw).unwrap();
  assert!(stored[0]["price"].is_number(), "{raw}");
  assert!(stored[0]["shippingCost"].is_number(), "{raw}");
}

#[test]
#[serial]
fn test_adding_the_same_product_increments_instead_of_duplicating() {
  setup_tracing();
  let mem = Arc::new(MemoryStore::new());
  let mut cart = Cart::open(CartStore::new(mem.clone(), "u1"));
  let first = snapshot("p1", 100, Some(30));
  let mut repriced = snapshot("p1", 999, Some(1));
  repriced.name = "Renamed".to_string();

  cart.add_or_increment(&first, 2).unwrap();
  cart.add_or_increment(&repriced, 3).unwrap();

  assert_eq!(cart.line_count(), 1);
  let line = cart.get("p1").unwrap();
  assert_eq!(line.quantity, 5);
  // The first snapshot wins.
  assert_eq!(line.price, Decimal::from(100));
  assert_eq!(line.name, "Product p1");
  assert_eq!(Cart::open(CartStore::new(mem, "u1")).items(), cart.items());
}

#[test]
#[serial]
fn test_line_item_keeps_seller_snapshot_and_resolved_image() {
  setup_tracing();
  let line = snapshot("p7", 12, None).to_line_item(1);
  assert_eq!(line.seller_name.as_deref(), Some("Gulf Building Supplies"));
  assert_eq!(line.seller_phone.as_deref(), Some("0500000000"));
  assert_eq!(line.image.as_deref(), Some("http://api.test/uploads/p7.png"));
  assert_eq!(line.shipping_cost, None);
}

#[test]
#[serial]
fn test_quantity_controls_remove_the_line_at_zero() {
  setup_tracing();
  let mem = Arc::new(MemoryStore::new());
  let mut cart = Cart::open(CartStore::new(mem.clone(), "u1"));
  cart.add_or_increment(&snapshot("p1", 10, None), 1).unwrap();
  cart.add_or_increment(&snapshot("p2", 10, None), 3).unwrap();

  cart.change_quantity("p2", -1).unwrap();
  cart.change_quantity("p1", -1).unwrap();

  assert_eq!(cart.line_count(), 1);
  assert_eq!(cart.get("p2").unwrap().quantity, 2);
  assert!(cart.get("p1").is_none());
  assert_eq!(cart.total_quantity(), 2);
  assert_eq!(CartStore::new(mem, "u1").load().len(), 1);
}

#[test]
#[serial]
fn test_carts_of_different_users_do_not_interfere() {
  setup_tracing();
  let mem = Arc::new(MemoryStore::new());
  let mut a = Cart::open(CartStore::new(mem.clone(), "A"));
  let mut b = Cart::open(CartStore::new(mem.clone(), "B"));

  a.add_or_increment(&snapshot("brick", 2, None), 500).unwrap();
  b.add_or_increment(&snapshot("tile", 30, None), 4).unwrap();
  b.remove_item("brick").unwrap();

  let a_again = Cart::open(CartStore::new(mem.clone(), "A"));
  let b_again = Cart::open(CartStore::new(mem, "B"));
  assert_eq!(a_again.items().len(), 1);
  assert_eq!(a_again.items()[0].product_id, "brick");
  assert_eq!(b_again.items().len(), 1);
  assert_eq!(b_again.items()[0].product_id, "tile");
}

#[test]
#[serial]
fn test_logout_of_one_user_never_exposes_their_cart_to_the_next() {
  setup_tracing();
  let mem = Arc::new(MemoryStore::new());
  let sessions = SessionStore::new(mem.clone());

  let session_a = signed_in(&mem, &user("A", "Ali"));
  let mut cart_a = Cart::open(CartStore::for_session(mem.clone(), &session_a).unwrap());
  cart_a.add_or_increment(&snapshot("cement", 25, Some(20)), 10).unwrap();
  mem.set(keys::LEGACY_CART, "[]").unwrap();

  sessions.logout(&session_a).unwrap();
  assert!(mem.get("cart_A").unwrap().is_none());
  assert!(mem.get(keys::LEGACY_CART).unwrap().is_none());
  assert!(!sessions.load().unwrap().is_authenticated());

  let session_b = signed_in(&mem, &user("B", "Badr"));
  let cart_b = Cart::open(CartStore::for_session(mem.clone(), &session_b).unwrap());
  assert!(cart_b.is_empty());
  assert_eq!(sessions.load().unwrap().user_id(), Some("B"));
}

#[test]
#[serial]
fn test_invalidate_keeps_scoped_cart_but_drops_credentials() {
  setup_tracing();
  let mem = Arc::new(MemoryStore::new());
  let session = signed_in(&mem, &user("A", "Ali"));
  let mut cart = Cart::open(CartStore::for_session(mem.clone(), &session).unwrap());
  cart.add_or_increment(&snapshot("sand", 5, None), 1).unwrap();

  SessionStore::new(mem.clone()).invalidate().unwrap();

  assert!(mem.get(keys::TOKEN).unwrap().is_none());
  assert!(mem.get(keys::USER).unwrap().is_none());
  assert!(mem.get("cart_A").unwrap().is_some());
}
