//! Identity types carried by the session.
//!
//! These represent the authenticated user's profile as confirmed by the
//! identity service, separate from any transport/response types.

use serde::{Deserialize, Serialize};

use crate::types::{Email, UserId};

/// The authenticated user's profile.
///
/// Only `verified` and `is_admin` participate in access decisions; the
/// remaining fields are display data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Server-issued user ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// Display name.
    pub name: String,
    /// Whether the email has been verified.
    #[serde(default)]
    pub verified: bool,
    /// Whether the user holds the admin role.
    #[serde(default)]
    pub is_admin: bool,
    /// Avatar image URL, if set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl Identity {
    /// Mark the identity as email-verified.
    pub const fn mark_verified(&mut self) {
        self.verified = true;
    }
}

/// A partial profile update sent to the identity service.
///
/// Fields left as `None` are not touched by the update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdentityPatch {
    /// New display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New avatar image URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl IdentityPatch {
    /// True when the patch carries no changes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.avatar_url.is_none()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn identity() -> Identity {
        Identity {
            id: UserId::new("u_1"),
            email: Email::parse("user@example.com").unwrap(),
            name: "Test User".to_owned(),
            verified: false,
            is_admin: false,
            avatar_url: None,
        }
    }

    #[test]
    fn test_mark_verified() {
        let mut id = identity();
        id.mark_verified();
        assert!(id.verified);
    }

    #[test]
    fn test_flags_default_false_on_deserialize() {
        let json = r#"{"id":"u_1","email":"user@example.com","name":"Test User"}"#;
        let id: Identity = serde_json::from_str(json).unwrap();
        assert!(!id.verified);
        assert!(!id.is_admin);
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(IdentityPatch::default().is_empty());
        let patch = IdentityPatch {
            name: Some("New Name".to_owned()),
            ..IdentityPatch::default()
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn test_patch_skips_none_fields() {
        let patch = IdentityPatch {
            name: Some("New Name".to_owned()),
            avatar_url: None,
        };
        let json = serde_json::to_string(&patch).unwrap();
        assert_eq!(json, r#"{"name":"New Name"}"#);
    }
}
