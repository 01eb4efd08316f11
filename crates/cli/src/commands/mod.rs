//! CLI command implementations.

pub mod auth;
pub mod cart;
pub mod menu;
