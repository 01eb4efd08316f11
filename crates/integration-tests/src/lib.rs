//! Integration test support for Tiffin.
//!
//! Provides [`ScriptedApi`], an in-process stand-in for the remote Tiffin
//! API implementing the same seams as the production client
//! ([`tiffin_client::session::IdentityApi`], [`tiffin_client::menu::MenuApi`],
//! [`tiffin_client::api::CheckoutApi`]). Tests script its behavior through
//! shared flags instead of standing up a server.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use url::Url;

use tiffin_client::api::{ApiError, CheckoutApi, CheckoutRequest};
use tiffin_client::menu::{MenuApi, MenuItem, MenuItemPatch, NewMenuItem};
use tiffin_client::session::{Credentials, IdentityApi, NewAccount};
use tiffin_core::{Email, Identity, IdentityPatch, MenuItemId, RestaurantId, UserId};

/// A scripted remote API: every operation succeeds against the configured
/// identity until [`ScriptedApi::set_failing`] flips it into rejection mode.
#[derive(Debug, Default)]
pub struct ScriptedApi {
    identity: Mutex<Option<Identity>>,
    failing: AtomicBool,
    check_auth_calls: AtomicU32,
    next_menu_id: AtomicU32,
}

impl ScriptedApi {
    /// An API with no recognized session (bootstrap will resolve
    /// logged-out until a login succeeds).
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// An API whose session already resolves to `identity`.
    #[must_use]
    pub fn recognizing(identity: Identity) -> Self {
        let api = Self::default();
        *api.identity.lock().unwrap_or_else(|p| p.into_inner()) = Some(identity);
        api
    }

    /// Script subsequent calls to fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// How many times the bootstrap identity check ran.
    #[must_use]
    pub fn check_auth_calls(&self) -> u32 {
        self.check_auth_calls.load(Ordering::SeqCst)
    }

    fn rejection() -> ApiError {
        ApiError::Rejected {
            message: "scripted failure".to_owned(),
        }
    }

    fn guard_failing(&self) -> Result<(), ApiError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(Self::rejection())
        } else {
            Ok(())
        }
    }

    fn current_identity(&self) -> Result<Identity, ApiError> {
        self.guard_failing()?;
        self.identity
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
            .ok_or_else(Self::rejection)
    }
}

/// A plain user identity for tests.
#[must_use]
pub fn test_identity(verified: bool, is_admin: bool) -> Identity {
    Identity {
        id: UserId::new("u_1"),
        email: Email::parse("user@example.com").expect("static email is valid"),
        name: "Test User".to_owned(),
        verified,
        is_admin,
        avatar_url: None,
    }
}

/// Matching credentials for [`test_identity`].
#[must_use]
pub fn test_credentials() -> Credentials {
    Credentials::new(
        Email::parse("user@example.com").expect("static email is valid"),
        "correct-horse-battery",
    )
}

impl IdentityApi for ScriptedApi {
    async fn check_auth(&self) -> Result<Identity, ApiError> {
        self.check_auth_calls.fetch_add(1, Ordering::SeqCst);
        self.current_identity()
    }

    async fn login(&self, credentials: &Credentials) -> Result<Identity, ApiError> {
        self.guard_failing()?;
        let identity = Identity {
            email: credentials.email.clone(),
            ..test_identity(true, false)
        };
        *self.identity.lock().unwrap_or_else(|p| p.into_inner()) = Some(identity.clone());
        Ok(identity)
    }

    async fn signup(&self, account: &NewAccount) -> Result<Identity, ApiError> {
        self.guard_failing()?;
        let identity = Identity {
            email: account.email.clone(),
            name: account.name.clone(),
            verified: false,
            ..test_identity(false, false)
        };
        *self.identity.lock().unwrap_or_else(|p| p.into_inner()) = Some(identity.clone());
        Ok(identity)
    }

    async fn logout(&self) -> Result<(), ApiError> {
        let result = self.guard_failing();
        if result.is_ok() {
            *self.identity.lock().unwrap_or_else(|p| p.into_inner()) = None;
        }
        result
    }

    async fn verify_email(&self, _code: &str) -> Result<(), ApiError> {
        self.guard_failing()?;
        if let Some(identity) = self
            .identity
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .as_mut()
        {
            identity.verified = true;
        }
        Ok(())
    }

    async fn update_profile(&self, patch: &IdentityPatch) -> Result<Identity, ApiError> {
        let mut identity = self.current_identity()?;
        if let Some(name) = &patch.name {
            identity.name.clone_from(name);
        }
        if let Some(avatar) = &patch.avatar_url {
            identity.avatar_url = Some(avatar.clone());
        }
        *self.identity.lock().unwrap_or_else(|p| p.into_inner()) = Some(identity.clone());
        Ok(identity)
    }
}

impl MenuApi for ScriptedApi {
    async fn create_menu(&self, item: &NewMenuItem) -> Result<MenuItem, ApiError> {
        self.guard_failing()?;
        let n = self.next_menu_id.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(MenuItem {
            id: MenuItemId::new(format!("m_{n}")),
            restaurant_id: RestaurantId::new("r_1"),
            name: item.name.clone(),
            description: item.description.clone(),
            price: item.price,
            image_url: item.image_url.clone(),
            category: item.category.clone(),
        })
    }

    async fn update_menu(
        &self,
        id: &MenuItemId,
        patch: &MenuItemPatch,
    ) -> Result<MenuItem, ApiError> {
        self.guard_failing()?;
        Ok(MenuItem {
            id: id.clone(),
            restaurant_id: RestaurantId::new("r_1"),
            name: patch.name.clone().unwrap_or_else(|| "unchanged".to_owned()),
            description: patch.description.clone().unwrap_or_default(),
            price: patch.price.unwrap_or_default(),
            image_url: patch.image_url.clone(),
            category: patch.category.clone(),
        })
    }

    async fn delete_menu(&self, _id: &MenuItemId) -> Result<(), ApiError> {
        self.guard_failing()
    }
}

impl CheckoutApi for ScriptedApi {
    async fn create_checkout_session(&self, request: &CheckoutRequest) -> Result<Url, ApiError> {
        self.guard_failing()?;
        if request.items.is_empty() {
            return Err(ApiError::Rejected {
                message: "cannot check out an empty cart".to_owned(),
            });
        }
        Ok(Url::parse("https://pay.example/session/test").expect("static url is valid"))
    }
}
