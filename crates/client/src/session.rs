//! Session authority: the single source of truth for the current user.
//!
//! A [`Session`] starts in a transient "checking" phase while the initial
//! remote identity check is in flight. [`SessionAuthority::bootstrap`]
//! resolves that phase exactly once per process; afterwards login, logout,
//! verify, and profile-update operations may toggle the authenticated state
//! any number of times, but the session never returns to checking.

use secrecy::{ExposeSecret, SecretString};
use tracing::{instrument, warn};

use tiffin_core::{Email, Identity, IdentityPatch};

use crate::api::ApiError;

/// Errors that can occur during session authority operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The remote identity service rejected the operation or was unreachable.
    /// Local session state is unchanged (except for logout).
    #[error("identity service error: {0}")]
    Api(#[from] ApiError),

    /// The operation needs an identity but none is present.
    #[error("no identity in session")]
    NoIdentity,
}

/// Login credentials.
///
/// The password is wrapped in [`SecretString`] so it is redacted in debug
/// output and zeroized on drop.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Account email address.
    pub email: Email,
    /// Account password.
    pub password: SecretString,
}

impl Credentials {
    /// Create credentials from an email and a raw password.
    #[must_use]
    pub fn new(email: Email, password: impl Into<String>) -> Self {
        Self {
            email,
            password: SecretString::from(password.into()),
        }
    }

    /// Expose the raw password for serialization into a login request.
    #[must_use]
    pub fn password_str(&self) -> &str {
        self.password.expose_secret()
    }
}

/// Signup data for a new account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    /// Display name.
    pub name: String,
    /// Account email address.
    pub email: Email,
    /// Account password.
    pub password: SecretString,
}

/// Seam between the session authority and the remote identity service.
///
/// The production implementation is [`crate::api::ApiClient`]; tests
/// substitute scripted stubs.
pub trait IdentityApi {
    /// One-shot identity check used by bootstrap. Returns the identity the
    /// server associates with the current session cookie.
    fn check_auth(&self) -> impl Future<Output = Result<Identity, ApiError>> + Send;

    /// Exchange credentials for an authenticated session.
    fn login(&self, credentials: &Credentials)
    -> impl Future<Output = Result<Identity, ApiError>> + Send;

    /// Register a new account; a successful signup is also a login.
    fn signup(&self, account: &NewAccount)
    -> impl Future<Output = Result<Identity, ApiError>> + Send;

    /// Invalidate the remote session.
    fn logout(&self) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Confirm the email verification code.
    fn verify_email(&self, code: &str) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Apply a profile patch; returns the server-confirmed profile.
    fn update_profile(
        &self,
        patch: &IdentityPatch,
    ) -> impl Future<Output = Result<Identity, ApiError>> + Send;
}

impl<T: IdentityApi> IdentityApi for std::sync::Arc<T> {
    fn check_auth(&self) -> impl Future<Output = Result<Identity, ApiError>> + Send {
        T::check_auth(self)
    }

    fn login(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<Identity, ApiError>> + Send {
        T::login(self, credentials)
    }

    fn signup(
        &self,
        account: &NewAccount,
    ) -> impl Future<Output = Result<Identity, ApiError>> + Send {
        T::signup(self, account)
    }

    fn logout(&self) -> impl Future<Output = Result<(), ApiError>> + Send {
        T::logout(self)
    }

    fn verify_email(&self, code: &str) -> impl Future<Output = Result<(), ApiError>> + Send {
        T::verify_email(self, code)
    }

    fn update_profile(
        &self,
        patch: &IdentityPatch,
    ) -> impl Future<Output = Result<Identity, ApiError>> + Send {
        T::update_profile(self, patch)
    }
}

/// The current session state.
///
/// Invariants (enforced by construction and by [`SessionAuthority`]):
/// - `checking` implies not authenticated and no identity
/// - not authenticated implies no identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    checking: bool,
    authenticated: bool,
    identity: Option<Identity>,
}

impl Session {
    /// The initial state at process start: the bootstrap check has not yet
    /// reached a decision.
    #[must_use]
    pub const fn starting() -> Self {
        Self {
            checking: true,
            authenticated: false,
            identity: None,
        }
    }

    /// A determined, logged-out session.
    #[must_use]
    pub const fn unauthenticated() -> Self {
        Self {
            checking: false,
            authenticated: false,
            identity: None,
        }
    }

    /// A determined, logged-in session holding `identity`.
    #[must_use]
    pub const fn authenticated(identity: Identity) -> Self {
        Self {
            checking: false,
            authenticated: true,
            identity: Some(identity),
        }
    }

    /// True only while the bootstrap check is unresolved.
    #[must_use]
    pub const fn is_checking(&self) -> bool {
        self.checking
    }

    /// True iff the session holds a currently-valid identity.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// The current identity, present iff authenticated.
    #[must_use]
    pub const fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    fn set_identity(&mut self, identity: Identity) {
        self.authenticated = true;
        self.identity = Some(identity);
    }

    fn clear_identity(&mut self) {
        self.authenticated = false;
        self.identity = None;
    }
}

/// Owner of the [`Session`], mediating every mutation through the remote
/// identity service.
///
/// Each operation performs at most one remote call and never retries.
/// Overlapping calls are not cancelled; the response applied last in
/// completion order wins, which is acceptable for a transient UI state.
#[derive(Debug)]
pub struct SessionAuthority<A> {
    api: A,
    session: Session,
}

impl<A: IdentityApi> SessionAuthority<A> {
    /// Create an authority in the starting (checking) state.
    #[must_use]
    pub const fn new(api: A) -> Self {
        Self {
            api,
            session: Session::starting(),
        }
    }

    /// The current session snapshot.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Resolve the initial checking phase with a single remote identity
    /// check.
    ///
    /// Always leaves the session determined (`checking == false`): a failed
    /// or rejected check resolves to logged-out rather than propagating an
    /// error, because every consumer gating on the checking flag must
    /// eventually be unblocked. Calling bootstrap on an already-determined
    /// session is a no-op.
    #[instrument(skip(self))]
    pub async fn bootstrap(&mut self) {
        if !self.session.checking {
            return;
        }

        match self.api.check_auth().await {
            Ok(identity) => {
                self.session.checking = false;
                self.session.set_identity(identity);
            }
            Err(e) => {
                warn!("bootstrap identity check failed: {e}");
                self.session.checking = false;
                self.session.clear_identity();
            }
        }
    }

    /// Log in with credentials.
    ///
    /// On success the session becomes authenticated with the returned
    /// identity; the checking flag is not touched. On failure the session is
    /// left unchanged and the error is returned for the caller to surface.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Api`] if the remote call fails or is rejected.
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn login(&mut self, credentials: &Credentials) -> Result<(), SessionError> {
        let identity = self.api.login(credentials).await?;
        self.session.set_identity(identity);
        Ok(())
    }

    /// Register a new account and log in as it.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Api`] if the remote call fails or is rejected.
    #[instrument(skip(self, account), fields(email = %account.email))]
    pub async fn signup(&mut self, account: &NewAccount) -> Result<(), SessionError> {
        let identity = self.api.signup(account).await?;
        self.session.set_identity(identity);
        Ok(())
    }

    /// Log out.
    ///
    /// The local session is reset to logged-out regardless of the remote
    /// outcome: logout is idempotent from the client's perspective, and a
    /// remote error must not leave the client believing it is still logged
    /// in. The remote error, if any, is still returned after the reset.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Api`] if the remote call failed; local state
    /// is already logged-out when this is returned.
    #[instrument(skip(self))]
    pub async fn logout(&mut self) -> Result<(), SessionError> {
        let result = self.api.logout().await;
        self.session.clear_identity();
        result.map_err(SessionError::from)
    }

    /// Confirm the email verification code and mark the identity verified.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoIdentity`] if the session holds no identity,
    /// or [`SessionError::Api`] if the remote call fails; in both cases the
    /// session is unchanged.
    #[instrument(skip(self, code))]
    pub async fn verify_identity(&mut self, code: &str) -> Result<(), SessionError> {
        if self.session.identity.is_none() {
            return Err(SessionError::NoIdentity);
        }

        self.api.verify_email(code).await?;

        if let Some(identity) = self.session.identity.as_mut() {
            identity.mark_verified();
        }
        Ok(())
    }

    /// Apply a profile patch.
    ///
    /// On success the session adopts the server-confirmed profile and is
    /// guaranteed authenticated; on failure it is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Api`] if the remote call fails or is rejected.
    #[instrument(skip(self, patch))]
    pub async fn update_identity(&mut self, patch: &IdentityPatch) -> Result<(), SessionError> {
        let identity = self.api.update_profile(patch).await?;
        self.session.set_identity(identity);
        Ok(())
    }
}
