//! Owned application state: one instance per process/connection.
//!
//! `App` bundles the config, the API client, and the three state owners
//! (session authority, cart, menu manager). It is constructed once and
//! passed by reference; nothing in here is a process-global singleton, so
//! tests construct fresh instances freely.

use url::Url;

use crate::api::{ApiClient, CheckoutApi, CheckoutRequest};
use crate::cart::Cart;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::menu::MenuManager;
use crate::session::SessionAuthority;
use crate::store::JsonFileStore;

/// The ordering client's state, one logical owner per state object.
#[derive(Debug)]
pub struct App {
    config: ClientConfig,
    api: ApiClient,
    session: SessionAuthority<ApiClient>,
    cart: Cart,
    menus: MenuManager<ApiClient>,
}

impl App {
    /// Build the app from environment configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is missing/invalid or the HTTP
    /// client cannot be built.
    pub fn from_env() -> Result<Self, ClientError> {
        let config = ClientConfig::from_env()?;
        Self::new(config)
    }

    /// Build the app from an explicit configuration.
    ///
    /// The cart is restored from the configured snapshot path; the session
    /// starts in the checking state until [`SessionAuthority::bootstrap`]
    /// resolves it.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let api = ApiClient::new(config.api_base_url.clone()).map_err(ClientError::Api)?;
        let cart = Cart::restore(Box::new(JsonFileStore::new(&config.cart_path)));
        let session = SessionAuthority::new(api.clone());
        let menus = MenuManager::new(api.clone());

        Ok(Self {
            config,
            api,
            session,
            cart,
            menus,
        })
    }

    /// The loaded configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The session authority.
    #[must_use]
    pub const fn session(&self) -> &SessionAuthority<ApiClient> {
        &self.session
    }

    /// Mutable access to the session authority.
    pub const fn session_mut(&mut self) -> &mut SessionAuthority<ApiClient> {
        &mut self.session
    }

    /// The cart.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Mutable access to the cart.
    pub const fn cart_mut(&mut self) -> &mut Cart {
        &mut self.cart
    }

    /// The menu manager.
    #[must_use]
    pub const fn menus(&self) -> &MenuManager<ApiClient> {
        &self.menus
    }

    /// Mutable access to the menu manager.
    pub const fn menus_mut(&mut self) -> &mut MenuManager<ApiClient> {
        &mut self.menus
    }

    /// Create a payment checkout session for the current cart.
    ///
    /// On success control is handed to the returned URL; the cart is NOT
    /// cleared here. Call [`App::confirm_checkout`] once the payment flow
    /// confirms completion. On failure the cart is untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Api`] if the checkout collaborator rejects the
    /// request or is unreachable.
    pub async fn create_checkout(&self) -> Result<Url, ClientError> {
        let request =
            CheckoutRequest::from_cart(&self.cart, self.config.checkout_return_url.clone());
        let url = self.api.create_checkout_session(&request).await?;
        Ok(url)
    }

    /// Record checkout completion: clears the cart and unsets the active
    /// restaurant.
    pub fn confirm_checkout(&mut self) {
        self.cart.clear();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tiffin_core::{MenuItemId, Price, RestaurantId};

    use super::*;
    use crate::cart::CartItem;

    fn config() -> ClientConfig {
        ClientConfig {
            api_base_url: Url::parse("https://api.tiffin.example/").unwrap(),
            cart_path: std::env::temp_dir()
                .join(format!("tiffin-state-test-{}.json", std::process::id())),
            checkout_return_url: None,
        }
    }

    #[test]
    fn test_new_app_starts_checking() {
        let app = App::new(config()).unwrap();
        assert!(app.session().session().is_checking());
        let _ = std::fs::remove_file(&app.config().cart_path);
    }

    #[test]
    fn test_confirm_checkout_clears_cart() {
        let mut app = App::new(config()).unwrap();
        app.cart_mut().add_item(
            CartItem {
                id: MenuItemId::new("A"),
                name: "Dal".to_owned(),
                unit_price: Price::from_cents(900),
                image_url: None,
            },
            Some(RestaurantId::new("R1")),
        );
        assert!(!app.cart().is_empty());

        app.confirm_checkout();

        assert!(app.cart().is_empty());
        assert!(app.cart().active_restaurant_id().is_none());
        let _ = std::fs::remove_file(&app.config().cart_path);
    }
}
