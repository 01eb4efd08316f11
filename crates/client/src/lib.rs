//! Tiffin ordering client core.
//!
//! This crate implements the client-side state of a food-ordering
//! application:
//!
//! - [`session`] - the session authority: the single source of truth for
//!   "who is the current user, and can we trust that answer yet"
//! - [`guard`] - the access decision function gating protected surfaces
//! - [`cart`] - the single-restaurant shopping cart with persistence
//! - [`menu`] - the denormalized menu cache kept consistent with
//!   server-confirmed mutations
//! - [`api`] - the REST collaborator client (identity, menu, checkout)
//!
//! All HTTP route wiring, rendering, and storage schemas live elsewhere;
//! this crate owns the state machines and their invariants.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod config;
pub mod error;
pub mod guard;
pub mod menu;
pub mod session;
pub mod state;
pub mod store;
