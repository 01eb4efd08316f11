//! Single-restaurant shopping cart.
//!
//! The cart never mixes items from two restaurants: silently merging them
//! would produce an undeliverable order under the single delivery
//! address/fee model, so switching restaurants clears the cart rather than
//! merging. Every mutation persists a snapshot through the configured
//! [`CartStore`]; a persistence failure is logged and never fails the
//! mutation itself.

use core::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use tiffin_core::{MenuItemId, Price, RestaurantId};

use crate::store::{CartStore, MemoryStore};

/// An orderable item as it appears in the cart, without quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Menu item ID.
    pub id: MenuItemId,
    /// Display name.
    pub name: String,
    /// Unit price at the time the item was added.
    pub unit_price: Price,
    /// Item image URL, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// A cart entry: an item and its quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// The item.
    pub item: CartItem,
    /// Quantity, always at least 1.
    pub quantity: u32,
}

impl CartLine {
    /// The line total (unit price times quantity).
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.item.unit_price * self.quantity
    }
}

/// Serialized cart state written through the [`CartStore`] boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartSnapshot {
    /// Cart lines in insertion order.
    pub items: Vec<CartLine>,
    /// The restaurant whose items populate the cart.
    pub active_restaurant_id: Option<RestaurantId>,
    /// When the snapshot was written.
    pub saved_at: DateTime<Utc>,
}

impl CartSnapshot {
    /// An empty snapshot.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            active_restaurant_id: None,
            saved_at: Utc::now(),
        }
    }
}

/// The shopping cart.
///
/// Invariant: when `lines` is non-empty every line was added while the
/// stored active restaurant was active. Removing the last item does NOT
/// unset the active restaurant, so re-adding an item from the same
/// restaurant keeps its state; only [`Cart::clear`] resets it.
pub struct Cart {
    lines: Vec<CartLine>,
    active_restaurant_id: Option<RestaurantId>,
    store: Box<dyn CartStore>,
}

impl fmt::Debug for Cart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cart")
            .field("lines", &self.lines)
            .field("active_restaurant_id", &self.active_restaurant_id)
            .finish_non_exhaustive()
    }
}

impl Cart {
    /// Restore the cart from the given store, starting empty when no
    /// snapshot exists or the snapshot cannot be read.
    #[must_use]
    pub fn restore(store: Box<dyn CartStore>) -> Self {
        let snapshot = match store.load() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("failed to restore cart snapshot, starting empty: {e}");
                None
            }
        };

        match snapshot {
            Some(snapshot) => Self {
                lines: snapshot.items,
                active_restaurant_id: snapshot.active_restaurant_id,
                store,
            },
            None => Self {
                lines: Vec::new(),
                active_restaurant_id: None,
                store,
            },
        }
    }

    /// An empty cart backed by an in-memory store.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::restore(Box::new(MemoryStore::default()))
    }

    /// Cart lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// The restaurant whose items populate the cart.
    #[must_use]
    pub const fn active_restaurant_id(&self) -> Option<&RestaurantId> {
        self.active_restaurant_id.as_ref()
    }

    /// True when the cart holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Sum of all line totals.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Add an item to the cart.
    ///
    /// If the cart is empty, or `restaurant_id` is provided and differs from
    /// the active restaurant, the cart is replaced with a single-entry cart
    /// for the item and the provided restaurant becomes active. Otherwise an
    /// existing line's quantity increments, or the item is appended with
    /// quantity 1.
    pub fn add_item(&mut self, item: CartItem, restaurant_id: Option<RestaurantId>) {
        let switching = restaurant_id
            .as_ref()
            .is_some_and(|r| self.active_restaurant_id.as_ref() != Some(r));

        if self.lines.is_empty() || switching {
            self.lines = vec![CartLine { item, quantity: 1 }];
            if let Some(restaurant) = restaurant_id {
                self.active_restaurant_id = Some(restaurant);
            }
        } else if let Some(line) = self.lines.iter_mut().find(|l| l.item.id == item.id) {
            line.quantity += 1;
        } else {
            self.lines.push(CartLine { item, quantity: 1 });
        }

        self.persist();
    }

    /// Increase an item's quantity by one. No-op for an unknown item.
    pub fn increment_quantity(&mut self, item_id: &MenuItemId) {
        if let Some(line) = self.lines.iter_mut().find(|l| l.item.id == *item_id) {
            line.quantity += 1;
            self.persist();
        }
    }

    /// Decrease an item's quantity by one, flooring at 1.
    ///
    /// Removal is a separate explicit operation ([`Cart::remove_item`]),
    /// never implicit.
    pub fn decrement_quantity(&mut self, item_id: &MenuItemId) {
        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|l| l.item.id == *item_id && l.quantity > 1)
        {
            line.quantity -= 1;
            self.persist();
        }
    }

    /// Remove an item's line entirely.
    ///
    /// The active restaurant is left untouched even when the cart becomes
    /// empty, so a subsequent add for the same restaurant does not
    /// spuriously reset state.
    pub fn remove_item(&mut self, item_id: &MenuItemId) {
        let before = self.lines.len();
        self.lines.retain(|l| l.item.id != *item_id);
        if self.lines.len() != before {
            self.persist();
        }
    }

    /// Empty the cart and unset the active restaurant.
    ///
    /// Called after successful checkout confirmation and by explicit user
    /// action.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.active_restaurant_id = None;
        self.persist();
    }

    fn persist(&self) {
        let snapshot = CartSnapshot {
            items: self.lines.clone(),
            active_restaurant_id: self.active_restaurant_id.clone(),
            saved_at: Utc::now(),
        };
        if let Err(e) = self.store.save(&snapshot) {
            warn!("failed to persist cart snapshot: {e}");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::JsonFileStore;

    fn item(id: &str, cents: i64) -> CartItem {
        CartItem {
            id: MenuItemId::new(id),
            name: format!("Item {id}"),
            unit_price: Price::from_cents(cents),
            image_url: None,
        }
    }

    fn restaurant(id: &str) -> RestaurantId {
        RestaurantId::new(id)
    }

    #[test]
    fn test_add_first_item_sets_active_restaurant() {
        let mut cart = Cart::in_memory();
        cart.add_item(item("A", 1000), Some(restaurant("R1")));

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 1);
        assert_eq!(cart.active_restaurant_id(), Some(&restaurant("R1")));
    }

    #[test]
    fn test_switching_restaurant_replaces_cart() {
        let mut cart = Cart::in_memory();
        cart.add_item(item("A", 1000), Some(restaurant("R1")));
        cart.add_item(item("B", 500), Some(restaurant("R2")));

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].item.id, MenuItemId::new("B"));
        assert_eq!(cart.active_restaurant_id(), Some(&restaurant("R2")));
    }

    #[test]
    fn test_adding_same_item_increments() {
        let mut cart = Cart::in_memory();
        cart.add_item(item("A", 1000), Some(restaurant("R1")));
        cart.add_item(item("A", 1000), Some(restaurant("R1")));

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 2);
        assert_eq!(cart.active_restaurant_id(), Some(&restaurant("R1")));
    }

    #[test]
    fn test_adding_different_item_same_restaurant_appends() {
        let mut cart = Cart::in_memory();
        cart.add_item(item("A", 1000), Some(restaurant("R1")));
        cart.add_item(item("B", 500), Some(restaurant("R1")));

        assert_eq!(cart.lines().len(), 2);
        assert_eq!(cart.total_quantity(), 2);
    }

    #[test]
    fn test_never_mixes_restaurants() {
        let mut cart = Cart::in_memory();
        cart.add_item(item("A", 1000), Some(restaurant("R1")));
        cart.add_item(item("B", 500), Some(restaurant("R1")));
        cart.add_item(item("C", 750), Some(restaurant("R2")));
        cart.add_item(item("D", 250), Some(restaurant("R2")));

        // Only R2 items remain, and the active restaurant matches.
        assert_eq!(cart.active_restaurant_id(), Some(&restaurant("R2")));
        assert_eq!(cart.lines().len(), 2);
        for line in cart.lines() {
            assert!(matches!(line.item.id.as_str(), "C" | "D"));
        }
    }

    #[test]
    fn test_decrement_floors_at_one() {
        let mut cart = Cart::in_memory();
        cart.add_item(item("A", 1000), Some(restaurant("R1")));

        cart.decrement_quantity(&MenuItemId::new("A"));
        cart.decrement_quantity(&MenuItemId::new("A"));

        assert_eq!(cart.lines()[0].quantity, 1);
    }

    #[test]
    fn test_increment_then_decrement() {
        let mut cart = Cart::in_memory();
        cart.add_item(item("A", 1000), Some(restaurant("R1")));
        cart.increment_quantity(&MenuItemId::new("A"));
        cart.increment_quantity(&MenuItemId::new("A"));
        cart.decrement_quantity(&MenuItemId::new("A"));

        assert_eq!(cart.lines()[0].quantity, 2);
    }

    #[test]
    fn test_quantity_ops_on_unknown_item_are_noops() {
        let mut cart = Cart::in_memory();
        cart.add_item(item("A", 1000), Some(restaurant("R1")));

        cart.increment_quantity(&MenuItemId::new("ghost"));
        cart.decrement_quantity(&MenuItemId::new("ghost"));
        cart.remove_item(&MenuItemId::new("ghost"));

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 1);
    }

    #[test]
    fn test_remove_keeps_active_restaurant() {
        let mut cart = Cart::in_memory();
        cart.add_item(item("A", 1000), Some(restaurant("R1")));
        cart.remove_item(&MenuItemId::new("A"));

        assert!(cart.is_empty());
        assert_eq!(cart.active_restaurant_id(), Some(&restaurant("R1")));

        // Re-adding without naming the restaurant keeps R1 active.
        cart.add_item(item("A", 1000), None);
        assert_eq!(cart.active_restaurant_id(), Some(&restaurant("R1")));
        assert_eq!(cart.lines().len(), 1);
    }

    #[test]
    fn test_clear_resets_active_restaurant() {
        let mut cart = Cart::in_memory();
        cart.add_item(item("A", 1000), Some(restaurant("R1")));
        cart.clear();

        assert!(cart.is_empty());
        assert!(cart.active_restaurant_id().is_none());
    }

    #[test]
    fn test_subtotal() {
        let mut cart = Cart::in_memory();
        cart.add_item(item("A", 1000), Some(restaurant("R1")));
        cart.add_item(item("A", 1000), None);
        cart.add_item(item("B", 550), None);

        assert_eq!(cart.subtotal(), Price::from_cents(2550));
        assert_eq!(cart.total_quantity(), 3);
    }

    #[test]
    fn test_persists_across_restore() {
        let path =
            std::env::temp_dir().join(format!("tiffin-cart-test-{}.json", std::process::id()));
        let _ = std::fs::remove_file(&path);

        {
            let mut cart = Cart::restore(Box::new(JsonFileStore::new(&path)));
            cart.add_item(item("A", 1000), Some(restaurant("R1")));
            cart.increment_quantity(&MenuItemId::new("A"));
        }

        let cart = Cart::restore(Box::new(JsonFileStore::new(&path)));
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 2);
        assert_eq!(cart.active_restaurant_id(), Some(&restaurant("R1")));

        let _ = std::fs::remove_file(&path);
    }
}
