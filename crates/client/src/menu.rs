//! Denormalized menu cache for the restaurant-management flow.
//!
//! The cache mirrors the server's menu for the user's restaurant. It is
//! mutated only after the corresponding remote call confirms success, and
//! every mutation is an idempotent no-op when the target ID is absent
//! (delete) or already matches (replace): the cache may be stale relative
//! to a concurrent mutation from another client, and that must never turn
//! into an error here.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use tiffin_core::{MenuItemId, Price, RestaurantId};

use crate::api::ApiError;

/// A menu item as confirmed by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    /// Server-issued menu item ID.
    pub id: MenuItemId,
    /// Owning restaurant.
    pub restaurant_id: RestaurantId,
    /// Display name.
    pub name: String,
    /// Description shown on the menu page.
    #[serde(default)]
    pub description: String,
    /// Unit price.
    pub price: Price,
    /// Item image URL, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Menu category (e.g. "mains", "sides").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Payload for creating a menu item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMenuItem {
    /// Display name.
    pub name: String,
    /// Description shown on the menu page.
    #[serde(default)]
    pub description: String,
    /// Unit price.
    pub price: Price,
    /// Item image URL, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Menu category.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Partial update for an existing menu item; `None` fields are untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MenuItemPatch {
    /// New display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New unit price.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    /// New image URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// New category.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Seam between the menu manager and the remote menu endpoints.
pub trait MenuApi {
    /// Create a menu item; returns the server-confirmed item.
    fn create_menu(
        &self,
        item: &NewMenuItem,
    ) -> impl Future<Output = Result<MenuItem, ApiError>> + Send;

    /// Update a menu item; returns the server-confirmed item.
    fn update_menu(
        &self,
        id: &MenuItemId,
        patch: &MenuItemPatch,
    ) -> impl Future<Output = Result<MenuItem, ApiError>> + Send;

    /// Delete a menu item.
    fn delete_menu(&self, id: &MenuItemId) -> impl Future<Output = Result<(), ApiError>> + Send;
}

impl<T: MenuApi> MenuApi for std::sync::Arc<T> {
    fn create_menu(
        &self,
        item: &NewMenuItem,
    ) -> impl Future<Output = Result<MenuItem, ApiError>> + Send {
        T::create_menu(self, item)
    }

    fn update_menu(
        &self,
        id: &MenuItemId,
        patch: &MenuItemPatch,
    ) -> impl Future<Output = Result<MenuItem, ApiError>> + Send {
        T::update_menu(self, id, patch)
    }

    fn delete_menu(&self, id: &MenuItemId) -> impl Future<Output = Result<(), ApiError>> + Send {
        T::delete_menu(self, id)
    }
}

/// Ordered, id-unique client-local view of the restaurant's menu.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuCache {
    items: Vec<MenuItem>,
}

impl MenuCache {
    /// Create an empty cache.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Seed the cache from a server-provided listing, dropping any previous
    /// contents.
    pub fn reset(&mut self, items: Vec<MenuItem>) {
        self.items = items;
        self.items.dedup_by(|a, b| a.id == b.id);
    }

    /// Items in server order.
    #[must_use]
    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    /// Look up an item by ID.
    #[must_use]
    pub fn get(&self, id: &MenuItemId) -> Option<&MenuItem> {
        self.items.iter().find(|m| m.id == *id)
    }

    /// Insert a server-confirmed item, replacing any entry with the same ID.
    pub fn insert(&mut self, item: MenuItem) {
        if let Some(existing) = self.items.iter_mut().find(|m| m.id == item.id) {
            *existing = item;
        } else {
            self.items.push(item);
        }
    }

    /// Replace an existing entry. No-op when the ID is absent.
    pub fn replace(&mut self, item: MenuItem) {
        if let Some(existing) = self.items.iter_mut().find(|m| m.id == item.id) {
            *existing = item;
        }
    }

    /// Delete an entry. No-op when the ID is absent.
    pub fn delete(&mut self, id: &MenuItemId) {
        self.items.retain(|m| m.id != *id);
    }
}

/// Coordinates remote menu mutations with the local cache.
///
/// Remote failure means "do not mutate local state": there is no optimistic
/// update and no rollback, the cache is only touched from the success
/// branch.
#[derive(Debug)]
pub struct MenuManager<A> {
    api: A,
    cache: MenuCache,
}

impl<A: MenuApi> MenuManager<A> {
    /// Create a manager with an empty cache.
    #[must_use]
    pub const fn new(api: A) -> Self {
        Self {
            api,
            cache: MenuCache::new(),
        }
    }

    /// The current cache contents.
    #[must_use]
    pub const fn cache(&self) -> &MenuCache {
        &self.cache
    }

    /// Seed the cache from a server-provided listing.
    pub fn seed(&mut self, items: Vec<MenuItem>) {
        self.cache.reset(items);
    }

    /// Create a menu item remotely, then insert the confirmed item.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the remote call fails; the cache is unchanged.
    #[instrument(skip(self, item), fields(name = %item.name))]
    pub async fn create(&mut self, item: &NewMenuItem) -> Result<MenuItem, ApiError> {
        let created = self.api.create_menu(item).await?;
        self.cache.insert(created.clone());
        Ok(created)
    }

    /// Update a menu item remotely, then replace the cached entry.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the remote call fails; the cache is unchanged.
    #[instrument(skip(self, patch), fields(id = %id))]
    pub async fn update(
        &mut self,
        id: &MenuItemId,
        patch: &MenuItemPatch,
    ) -> Result<MenuItem, ApiError> {
        let updated = self.api.update_menu(id, patch).await?;
        self.cache.replace(updated.clone());
        Ok(updated)
    }

    /// Delete a menu item remotely, then drop the cached entry.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the remote call fails; the cache is unchanged.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete(&mut self, id: &MenuItemId) -> Result<(), ApiError> {
        self.api.delete_menu(id).await?;
        self.cache.delete(id);
        Ok(())
    }
}
