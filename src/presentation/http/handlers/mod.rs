//! HTTP Handlers
//!
//! Request handlers for all HTTP endpoints.

pub mod auth;
pub mod channel;
pub mod chat;
pub mod health;
pub mod message;
pub mod server;
