//! REST client for the Tiffin API collaborators.
//!
//! Every exchange is a single request/response returning a JSON envelope
//! with a `success` flag; any non-2xx status or `success=false` is a
//! failure. Session authentication rides on a cookie, so the underlying
//! HTTP client keeps a cookie store.

use std::sync::Arc;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::instrument;
use url::Url;

use tiffin_core::{Identity, IdentityPatch, MenuItemId, Price, RestaurantId};

use crate::cart::Cart;
use crate::menu::{MenuApi, MenuItem, MenuItemPatch, NewMenuItem};
use crate::session::{Credentials, IdentityApi, NewAccount};

/// Errors that can occur talking to the Tiffin API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Network or protocol failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("server returned {status}{}", .message.as_ref().map_or_else(String::new, |m| format!(": {m}")))]
    Status {
        /// HTTP status code.
        status: reqwest::StatusCode,
        /// Server-provided message, when the body carried one.
        message: Option<String>,
    },

    /// The server answered 2xx but flagged the operation as failed.
    #[error("request rejected: {message}")]
    Rejected {
        /// Server-provided reason.
        message: String,
    },

    /// The server flagged success but omitted the expected payload.
    #[error("response missing expected payload")]
    MissingPayload,

    /// An endpoint path could not be joined onto the base URL.
    #[error("invalid endpoint url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

// ─────────────────────────────────────────────────────────────────────────────
// Response envelopes
// ─────────────────────────────────────────────────────────────────────────────

const DEFAULT_REJECTION: &str = "operation failed";

#[derive(Debug, Deserialize)]
struct AckEnvelope {
    success: bool,
    #[serde(default)]
    message: Option<String>,
}

impl AckEnvelope {
    fn into_result(self) -> Result<(), ApiError> {
        if self.success {
            Ok(())
        } else {
            Err(ApiError::Rejected {
                message: self.message.unwrap_or_else(|| DEFAULT_REJECTION.to_owned()),
            })
        }
    }
}

#[derive(Debug, Deserialize)]
struct IdentityEnvelope {
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    user: Option<Identity>,
}

impl IdentityEnvelope {
    fn into_result(self) -> Result<Identity, ApiError> {
        if !self.success {
            return Err(ApiError::Rejected {
                message: self.message.unwrap_or_else(|| DEFAULT_REJECTION.to_owned()),
            });
        }
        self.user.ok_or(ApiError::MissingPayload)
    }
}

#[derive(Debug, Deserialize)]
struct MenuEnvelope {
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    menu: Option<MenuItem>,
}

impl MenuEnvelope {
    fn into_result(self) -> Result<MenuItem, ApiError> {
        if !self.success {
            return Err(ApiError::Rejected {
                message: self.message.unwrap_or_else(|| DEFAULT_REJECTION.to_owned()),
            });
        }
        self.menu.ok_or(ApiError::MissingPayload)
    }
}

#[derive(Debug, Deserialize)]
struct CheckoutEnvelope {
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    session_url: Option<String>,
}

impl CheckoutEnvelope {
    fn into_result(self) -> Result<Url, ApiError> {
        if !self.success {
            return Err(ApiError::Rejected {
                message: self.message.unwrap_or_else(|| DEFAULT_REJECTION.to_owned()),
            });
        }
        let raw = self.session_url.ok_or(ApiError::MissingPayload)?;
        Ok(Url::parse(&raw)?)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Request payloads
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct SignupRequest<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct VerifyRequest<'a> {
    code: &'a str,
}

/// One cart line in a checkout session request.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutLine {
    /// Menu item being ordered.
    pub menu_item_id: MenuItemId,
    /// Display name (shown on the payment page).
    pub name: String,
    /// Unit price.
    pub unit_price: Price,
    /// Quantity.
    pub quantity: u32,
}

/// Payload for creating a payment checkout session.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutRequest {
    /// The restaurant being ordered from.
    pub restaurant_id: Option<RestaurantId>,
    /// Cart lines.
    pub items: Vec<CheckoutLine>,
    /// URL the payment provider should redirect back to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_url: Option<Url>,
}

impl CheckoutRequest {
    /// Build a checkout request from the current cart contents.
    #[must_use]
    pub fn from_cart(cart: &Cart, return_url: Option<Url>) -> Self {
        Self {
            restaurant_id: cart.active_restaurant_id().cloned(),
            items: cart
                .lines()
                .iter()
                .map(|line| CheckoutLine {
                    menu_item_id: line.item.id.clone(),
                    name: line.item.name.clone(),
                    unit_price: line.item.unit_price,
                    quantity: line.quantity,
                })
                .collect(),
            return_url,
        }
    }
}

/// Seam for the payment checkout collaborator.
pub trait CheckoutApi {
    /// Create a checkout session; returns the URL to hand control to.
    ///
    /// Callers must not clear the cart on failure; the cart is cleared only
    /// after checkout confirmation.
    fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> impl Future<Output = Result<Url, ApiError>> + Send;
}

impl<T: CheckoutApi> CheckoutApi for Arc<T> {
    fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> impl Future<Output = Result<Url, ApiError>> + Send {
        T::create_checkout_session(self, request)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Client
// ─────────────────────────────────────────────────────────────────────────────

/// Client for the Tiffin REST API.
///
/// Cheaply cloneable via `Arc`; the cookie store carries the session cookie
/// across calls.
#[derive(Debug, Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

#[derive(Debug)]
struct ApiClientInner {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new API client against `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] if the HTTP client cannot be built.
    pub fn new(base_url: Url) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().cookie_store(true).build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner { http, base_url }),
        })
    }

    /// The configured API base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path)?)
    }

    async fn read_envelope<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            // Best-effort extraction of the server's message.
            let message = response
                .json::<AckEnvelope>()
                .await
                .ok()
                .and_then(|envelope| envelope.message);
            return Err(ApiError::Status { status, message });
        }

        Ok(response.json::<T>().await?)
    }

    async fn get_envelope<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.inner.http.get(self.endpoint(path)?).send().await?;
        Self::read_envelope(response).await
    }

    async fn post_envelope<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .inner
            .http
            .post(self.endpoint(path)?)
            .json(body)
            .send()
            .await?;
        Self::read_envelope(response).await
    }

    async fn patch_envelope<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .inner
            .http
            .patch(self.endpoint(path)?)
            .json(body)
            .send()
            .await?;
        Self::read_envelope(response).await
    }

    async fn delete_envelope<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.inner.http.delete(self.endpoint(path)?).send().await?;
        Self::read_envelope(response).await
    }
}

impl IdentityApi for ApiClient {
    #[instrument(skip(self))]
    async fn check_auth(&self) -> Result<Identity, ApiError> {
        let envelope: IdentityEnvelope = self.get_envelope("api/v1/auth/check-auth").await?;
        envelope.into_result()
    }

    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    async fn login(&self, credentials: &Credentials) -> Result<Identity, ApiError> {
        let body = LoginRequest {
            email: credentials.email.as_str(),
            password: credentials.password_str(),
        };
        let envelope: IdentityEnvelope = self.post_envelope("api/v1/auth/login", &body).await?;
        envelope.into_result()
    }

    #[instrument(skip(self, account), fields(email = %account.email))]
    async fn signup(&self, account: &NewAccount) -> Result<Identity, ApiError> {
        use secrecy::ExposeSecret;
        let body = SignupRequest {
            name: &account.name,
            email: account.email.as_str(),
            password: account.password.expose_secret(),
        };
        let envelope: IdentityEnvelope = self.post_envelope("api/v1/auth/signup", &body).await?;
        envelope.into_result()
    }

    #[instrument(skip(self))]
    async fn logout(&self) -> Result<(), ApiError> {
        let envelope: AckEnvelope = self.post_envelope("api/v1/auth/logout", &()).await?;
        envelope.into_result()
    }

    #[instrument(skip(self, code))]
    async fn verify_email(&self, code: &str) -> Result<(), ApiError> {
        let body = VerifyRequest { code };
        let envelope: AckEnvelope = self.post_envelope("api/v1/auth/verify-email", &body).await?;
        envelope.into_result()
    }

    #[instrument(skip(self, patch))]
    async fn update_profile(&self, patch: &IdentityPatch) -> Result<Identity, ApiError> {
        let envelope: IdentityEnvelope = self.patch_envelope("api/v1/user/profile", patch).await?;
        envelope.into_result()
    }
}

impl MenuApi for ApiClient {
    #[instrument(skip(self, item), fields(name = %item.name))]
    async fn create_menu(&self, item: &NewMenuItem) -> Result<MenuItem, ApiError> {
        let envelope: MenuEnvelope = self.post_envelope("api/v1/menu", item).await?;
        envelope.into_result()
    }

    #[instrument(skip(self, patch), fields(id = %id))]
    async fn update_menu(&self, id: &MenuItemId, patch: &MenuItemPatch) -> Result<MenuItem, ApiError> {
        let envelope: MenuEnvelope = self
            .patch_envelope(&format!("api/v1/menu/{id}"), patch)
            .await?;
        envelope.into_result()
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn delete_menu(&self, id: &MenuItemId) -> Result<(), ApiError> {
        let envelope: AckEnvelope = self.delete_envelope(&format!("api/v1/menu/{id}")).await?;
        envelope.into_result()
    }
}

impl CheckoutApi for ApiClient {
    #[instrument(skip(self, request), fields(lines = request.items.len()))]
    async fn create_checkout_session(&self, request: &CheckoutRequest) -> Result<Url, ApiError> {
        let envelope: CheckoutEnvelope = self
            .post_envelope("api/v1/order/checkout-session", request)
            .await?;
        envelope.into_result()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_ack_envelope_rejection_carries_message() {
        let envelope: AckEnvelope =
            serde_json::from_str(r#"{"success":false,"message":"wrong password"}"#).unwrap();
        let err = envelope.into_result().unwrap_err();
        assert!(matches!(err, ApiError::Rejected { message } if message == "wrong password"));
    }

    #[test]
    fn test_ack_envelope_rejection_without_message() {
        let envelope: AckEnvelope = serde_json::from_str(r#"{"success":false}"#).unwrap();
        let err = envelope.into_result().unwrap_err();
        assert!(matches!(err, ApiError::Rejected { message } if message == DEFAULT_REJECTION));
    }

    #[test]
    fn test_identity_envelope_success_without_user_is_error() {
        let envelope: IdentityEnvelope = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert!(matches!(
            envelope.into_result(),
            Err(ApiError::MissingPayload)
        ));
    }

    #[test]
    fn test_identity_envelope_success() {
        let json = r#"{
            "success": true,
            "user": {"id":"u_1","email":"user@example.com","name":"Test User","verified":true}
        }"#;
        let envelope: IdentityEnvelope = serde_json::from_str(json).unwrap();
        let identity = envelope.into_result().unwrap();
        assert!(identity.verified);
        assert!(!identity.is_admin);
    }

    #[test]
    fn test_checkout_envelope_parses_session_url() {
        let json = r#"{"success":true,"session_url":"https://pay.example/session/abc"}"#;
        let envelope: CheckoutEnvelope = serde_json::from_str(json).unwrap();
        let url = envelope.into_result().unwrap();
        assert_eq!(url.host_str(), Some("pay.example"));
    }

    #[test]
    fn test_endpoint_join() {
        let client = ApiClient::new(Url::parse("https://api.tiffin.example/").unwrap()).unwrap();
        let url = client.endpoint("api/v1/auth/login").unwrap();
        assert_eq!(url.as_str(), "https://api.tiffin.example/api/v1/auth/login");
    }
}
