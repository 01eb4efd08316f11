//! Cart persistence and checkout flow tests.
//!
//! Exercises the cart through the JSON file store across simulated process
//! restarts, and hands the resulting snapshot to the scripted checkout API.

#![allow(clippy::unwrap_used)]

use std::path::PathBuf;

use tiffin_client::api::{CheckoutApi, CheckoutRequest};
use tiffin_client::cart::{Cart, CartItem};
use tiffin_client::store::JsonFileStore;
use tiffin_core::{MenuItemId, Price, RestaurantId};
use tiffin_integration_tests::ScriptedApi;

fn temp_cart_path(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!("tiffin-it-{tag}-{}.json", std::process::id()))
}

fn item(id: &str, cents: i64) -> CartItem {
    CartItem {
        id: MenuItemId::new(id),
        name: format!("Item {id}"),
        unit_price: Price::from_cents(cents),
        image_url: None,
    }
}

#[test]
fn test_cart_survives_restart() {
    let path = temp_cart_path("restart");
    let _ = std::fs::remove_file(&path);

    {
        let mut cart = Cart::restore(Box::new(JsonFileStore::new(&path)));
        cart.add_item(item("thali", 1250), Some(RestaurantId::new("R1")));
        cart.add_item(item("lassi", 450), None);
        cart.increment_quantity(&MenuItemId::new("thali"));
    }

    let cart = Cart::restore(Box::new(JsonFileStore::new(&path)));
    assert_eq!(cart.lines().len(), 2);
    assert_eq!(cart.total_quantity(), 3);
    assert_eq!(cart.subtotal(), Price::from_cents(2950));
    assert_eq!(cart.active_restaurant_id(), Some(&RestaurantId::new("R1")));

    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_corrupt_snapshot_starts_empty() {
    let path = temp_cart_path("corrupt");
    std::fs::write(&path, b"not json {").unwrap();

    let cart = Cart::restore(Box::new(JsonFileStore::new(&path)));
    assert!(cart.is_empty());
    assert!(cart.active_restaurant_id().is_none());

    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_restaurant_switch_survives_restart() {
    let path = temp_cart_path("switch");
    let _ = std::fs::remove_file(&path);

    {
        let mut cart = Cart::restore(Box::new(JsonFileStore::new(&path)));
        cart.add_item(item("thali", 1250), Some(RestaurantId::new("R1")));
        cart.add_item(item("ramen", 1400), Some(RestaurantId::new("R2")));
    }

    // The persisted snapshot reflects the replacement, not a merge.
    let cart = Cart::restore(Box::new(JsonFileStore::new(&path)));
    assert_eq!(cart.lines().len(), 1);
    assert_eq!(cart.lines()[0].item.id, MenuItemId::new("ramen"));
    assert_eq!(cart.active_restaurant_id(), Some(&RestaurantId::new("R2")));

    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn test_checkout_request_carries_cart_contents() {
    let api = ScriptedApi::anonymous();
    let mut cart = Cart::in_memory();
    cart.add_item(item("thali", 1250), Some(RestaurantId::new("R1")));
    cart.increment_quantity(&MenuItemId::new("thali"));

    let request = CheckoutRequest::from_cart(&cart, None);
    assert_eq!(request.restaurant_id, Some(RestaurantId::new("R1")));
    assert_eq!(request.items.len(), 1);
    assert_eq!(request.items[0].quantity, 2);

    let url = api.create_checkout_session(&request).await.unwrap();
    assert_eq!(url.host_str(), Some("pay.example"));

    // Creating the session must not clear the cart; confirmation does.
    assert!(!cart.is_empty());
    cart.clear();
    assert!(cart.is_empty());
    assert!(cart.active_restaurant_id().is_none());
}

#[tokio::test]
async fn test_empty_cart_checkout_is_rejected() {
    let api = ScriptedApi::anonymous();
    let cart = Cart::in_memory();

    let request = CheckoutRequest::from_cart(&cart, None);
    let result = api.create_checkout_session(&request).await;

    assert!(result.is_err());
}
