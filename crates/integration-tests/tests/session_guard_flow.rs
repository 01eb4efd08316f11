//! End-to-end session lifecycle tests.
//!
//! Drives a [`SessionAuthority`] through bootstrap, login, signup, verify,
//! and logout against the scripted API, asserting after each step the
//! decision a protected surface would reach.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use tiffin_client::guard::{
    CapabilityRequirement, Decision, HOME_PATH, LOGIN_PATH, RedirectReason, VERIFY_EMAIL_PATH,
    evaluate, redirect_authenticated,
};
use tiffin_client::session::{NewAccount, SessionAuthority};
use tiffin_core::Email;
use tiffin_integration_tests::{ScriptedApi, test_credentials, test_identity};

#[tokio::test]
async fn test_fresh_visitor_lifecycle() {
    let api = Arc::new(ScriptedApi::anonymous());
    let mut authority = SessionAuthority::new(Arc::clone(&api));
    let checkout_gate = CapabilityRequirement::authenticated();

    // Before bootstrap every protected surface defers.
    assert_eq!(
        evaluate(authority.session(), &checkout_gate),
        Decision::Checking
    );

    // Bootstrap resolves logged-out: protected surfaces send to login.
    authority.bootstrap().await;
    assert_eq!(
        evaluate(authority.session(), &checkout_gate),
        Decision::Redirect {
            target: LOGIN_PATH.to_owned(),
            reason: RedirectReason::Unauthenticated,
        }
    );

    // Login opens the gate.
    authority.login(&test_credentials()).await.unwrap();
    assert_eq!(evaluate(authority.session(), &checkout_gate), Decision::Allow);

    // But not the admin surface.
    assert_eq!(
        evaluate(authority.session(), &CapabilityRequirement::admin()),
        Decision::Redirect {
            target: HOME_PATH.to_owned(),
            reason: RedirectReason::Unauthorized,
        }
    );

    // Logout closes it again.
    authority.logout().await.unwrap();
    assert_eq!(
        evaluate(authority.session(), &checkout_gate),
        Decision::Redirect {
            target: LOGIN_PATH.to_owned(),
            reason: RedirectReason::Unauthenticated,
        }
    );
}

#[tokio::test]
async fn test_returning_user_bootstrap_restores_access() {
    let api = Arc::new(ScriptedApi::recognizing(test_identity(true, false)));
    let mut authority = SessionAuthority::new(Arc::clone(&api));

    authority.bootstrap().await;
    authority.bootstrap().await;

    assert_eq!(api.check_auth_calls(), 1);
    assert_eq!(
        evaluate(authority.session(), &CapabilityRequirement::verified()),
        Decision::Allow
    );
}

#[tokio::test]
async fn test_signup_then_verify_opens_verified_surfaces() {
    let api = Arc::new(ScriptedApi::anonymous());
    let mut authority = SessionAuthority::new(Arc::clone(&api));
    authority.bootstrap().await;

    let account = NewAccount {
        name: "New User".to_owned(),
        email: Email::parse("new@example.com").unwrap(),
        password: "correct-horse-battery".to_owned().into(),
    };
    authority.signup(&account).await.unwrap();

    // Signed up but not yet verified: verified surfaces bounce to the
    // verification page, plain authenticated surfaces open.
    assert_eq!(
        evaluate(authority.session(), &CapabilityRequirement::verified()),
        Decision::Redirect {
            target: VERIFY_EMAIL_PATH.to_owned(),
            reason: RedirectReason::Unverified,
        }
    );
    assert_eq!(
        evaluate(authority.session(), &CapabilityRequirement::authenticated()),
        Decision::Allow
    );

    authority.verify_identity("123456").await.unwrap();
    assert_eq!(
        evaluate(authority.session(), &CapabilityRequirement::verified()),
        Decision::Allow
    );
}

#[tokio::test]
async fn test_outage_during_bootstrap_resolves_logged_out() {
    let api = Arc::new(ScriptedApi::recognizing(test_identity(true, false)));
    api.set_failing(true);
    let mut authority = SessionAuthority::new(Arc::clone(&api));

    authority.bootstrap().await;

    // The gate must deny rather than hang on the checking state.
    assert_eq!(
        evaluate(authority.session(), &CapabilityRequirement::authenticated()),
        Decision::Redirect {
            target: LOGIN_PATH.to_owned(),
            reason: RedirectReason::Unauthenticated,
        }
    );

    // Recovery: a later login works without re-running bootstrap.
    api.set_failing(false);
    authority.login(&test_credentials()).await.unwrap();
    assert_eq!(
        evaluate(authority.session(), &CapabilityRequirement::authenticated()),
        Decision::Allow
    );
}

#[tokio::test]
async fn test_logout_failure_still_locks_the_client_out() {
    let api = Arc::new(ScriptedApi::recognizing(test_identity(true, false)));
    let mut authority = SessionAuthority::new(Arc::clone(&api));
    authority.bootstrap().await;

    api.set_failing(true);
    let result = authority.logout().await;

    assert!(result.is_err());
    assert_eq!(
        evaluate(authority.session(), &CapabilityRequirement::authenticated()),
        Decision::Redirect {
            target: LOGIN_PATH.to_owned(),
            reason: RedirectReason::Unauthenticated,
        }
    );
}

#[tokio::test]
async fn test_guest_pages_bounce_logged_in_users() {
    let api = Arc::new(ScriptedApi::recognizing(test_identity(true, false)));
    let mut authority = SessionAuthority::new(Arc::clone(&api));

    // Still checking: the login page defers instead of flashing.
    assert_eq!(
        redirect_authenticated(authority.session(), "/"),
        Decision::Checking
    );

    authority.bootstrap().await;
    assert_eq!(
        redirect_authenticated(authority.session(), "/"),
        Decision::Redirect {
            target: "/".to_owned(),
            reason: RedirectReason::AlreadyAuthenticated,
        }
    );

    authority.logout().await.unwrap();
    assert_eq!(
        redirect_authenticated(authority.session(), "/"),
        Decision::Allow
    );
}

#[tokio::test]
async fn test_failed_login_keeps_gate_closed() {
    let api = Arc::new(ScriptedApi::anonymous());
    let mut authority = SessionAuthority::new(Arc::clone(&api));
    authority.bootstrap().await;

    api.set_failing(true);
    let result = authority.login(&test_credentials()).await;

    assert!(result.is_err());
    assert_eq!(
        evaluate(authority.session(), &CapabilityRequirement::authenticated()),
        Decision::Redirect {
            target: LOGIN_PATH.to_owned(),
            reason: RedirectReason::Unauthenticated,
        }
    );
}
