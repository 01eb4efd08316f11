//! Tiffin Core - Shared types library.
//!
//! This crate provides common types used across all Tiffin components:
//! - `client` - The ordering client core (session, guard, cart, menu cache)
//! - `cli` - Command-line tool driving the client library
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This keeps
//! it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, and emails,
//!   plus the [`types::Identity`] profile carried by the session.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
