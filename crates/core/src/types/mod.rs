//! Core types for Tiffin.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod identity;
pub mod price;

pub use email::{Email, EmailError};
pub use id::*;
pub use identity::{Identity, IdentityPatch};
pub use price::Price;
