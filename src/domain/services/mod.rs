//! # Domain Services
//!
//! Domain services encapsulate business rules that don't naturally belong
//! to a single entity.
//!
//! ## Services
//!
//! - **PermissionService**: Role and channel-visibility rules

mod permission_service;

pub use permission_service::*;
