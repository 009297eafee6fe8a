//! Shared domain types for the Relay workflow coordination service.
//!
//! This crate is deliberately dependency-light (no sqlx, no axum) so the
//! polling client can reuse the same types as the server.

pub mod content;
pub mod error;
pub mod kind;
pub mod roles;
pub mod status;
pub mod types;
