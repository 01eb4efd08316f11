//! Access decision function for protected surfaces.
//!
//! [`evaluate`] is a pure function of the current [`Session`] snapshot and a
//! [`CapabilityRequirement`]. It is re-run on every render/request rather
//! than cached, so session mutations are picked up on the next evaluation.
//!
//! The inverse policy, "send already-authenticated users away from guest
//! pages", is deliberately a separate function
//! ([`redirect_authenticated`]) rather than a flag on the requirement:
//! "requirement not met" and "requirement met, now leave" are
//! opposite-direction policies.

use serde::{Deserialize, Serialize};

use crate::session::Session;

/// Default redirect target for unauthenticated sessions.
pub const LOGIN_PATH: &str = "/login";

/// Default redirect target for unverified identities.
pub const VERIFY_EMAIL_PATH: &str = "/verify-email";

/// Default redirect target for non-admin users hitting admin surfaces.
pub const HOME_PATH: &str = "/";

/// The declared access precondition attached to a protected resource.
///
/// Constructed per protected resource at the point of use; the builder
/// methods chain the common combinations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityRequirement {
    /// The session must be authenticated.
    pub require_auth: bool,
    /// The identity must be email-verified.
    pub require_verified: bool,
    /// The identity must hold the admin role.
    pub require_admin: bool,
    /// Overrides the default redirect target for whichever rule denies.
    pub redirect_target: Option<String>,
}

impl CapabilityRequirement {
    /// Require an authenticated session.
    #[must_use]
    pub fn authenticated() -> Self {
        Self {
            require_auth: true,
            ..Self::default()
        }
    }

    /// Require an authenticated, email-verified identity.
    #[must_use]
    pub fn verified() -> Self {
        Self {
            require_auth: true,
            require_verified: true,
            ..Self::default()
        }
    }

    /// Require an authenticated admin identity.
    #[must_use]
    pub fn admin() -> Self {
        Self {
            require_auth: true,
            require_admin: true,
            ..Self::default()
        }
    }

    /// Override the redirect target used when this requirement denies.
    #[must_use]
    pub fn with_redirect(mut self, target: impl Into<String>) -> Self {
        self.redirect_target = Some(target.into());
        self
    }
}

/// Why a redirect decision was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RedirectReason {
    /// No authenticated session.
    Unauthenticated,
    /// Identity absent or not email-verified.
    Unverified,
    /// Identity absent or not an admin.
    Unauthorized,
    /// Guest page reached by an authenticated session.
    AlreadyAuthenticated,
}

/// Outcome of an access decision.
///
/// There is no error variant: denial is normal control flow, expressed as a
/// redirect, and `Checking` is a valid transient state consumers must
/// render as a loading affordance, never as a denial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    /// The bootstrap check has not resolved; defer rendering and
    /// re-evaluate once it has.
    Checking,
    /// Access denied; navigate to `target`.
    Redirect {
        /// Path to navigate to.
        target: String,
        /// The specific rule that denied.
        reason: RedirectReason,
    },
    /// Access granted.
    Allow,
}

impl Decision {
    fn redirect(
        requirement: &CapabilityRequirement,
        default_target: &str,
        reason: RedirectReason,
    ) -> Self {
        let target = requirement
            .redirect_target
            .clone()
            .unwrap_or_else(|| default_target.to_owned());
        Self::Redirect { target, reason }
    }
}

/// Evaluate a capability requirement against the current session.
///
/// Rules are evaluated in a fixed order, first match wins:
///
/// 1. session still checking → [`Decision::Checking`]
/// 2. auth required, not authenticated → redirect (default [`LOGIN_PATH`])
/// 3. verified required, identity absent or unverified → redirect
///    (default [`VERIFY_EMAIL_PATH`])
/// 4. admin required, identity absent or not admin → redirect
///    (default [`HOME_PATH`])
/// 5. otherwise → [`Decision::Allow`]
///
/// Authentication is the weakest precondition and is checked first: an
/// unauthenticated session has no identity to inspect, so the later rules
/// would only be order-independent by accident. Fixing the order matches
/// the natural precondition chain.
#[must_use]
pub fn evaluate(session: &Session, requirement: &CapabilityRequirement) -> Decision {
    if session.is_checking() {
        return Decision::Checking;
    }

    if requirement.require_auth && !session.is_authenticated() {
        return Decision::redirect(requirement, LOGIN_PATH, RedirectReason::Unauthenticated);
    }

    if requirement.require_verified && !session.identity().is_some_and(|id| id.verified) {
        return Decision::redirect(requirement, VERIFY_EMAIL_PATH, RedirectReason::Unverified);
    }

    if requirement.require_admin && !session.identity().is_some_and(|id| id.is_admin) {
        return Decision::redirect(requirement, HOME_PATH, RedirectReason::Unauthorized);
    }

    Decision::Allow
}

/// Guest-page guard: redirect authenticated sessions to `target`.
///
/// This is the explicit inverse of [`evaluate`], used on pages like login
/// and signup that authenticated users should not see. A checking session
/// still defers.
#[must_use]
pub fn redirect_authenticated(session: &Session, target: impl Into<String>) -> Decision {
    if session.is_checking() {
        return Decision::Checking;
    }

    if session.is_authenticated() {
        return Decision::Redirect {
            target: target.into(),
            reason: RedirectReason::AlreadyAuthenticated,
        };
    }

    Decision::Allow
}
