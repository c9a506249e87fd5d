//! Infrastructure Layer
//!
//! Contains implementations for external services including:
//! - Database pool and repositories (PostgreSQL)
//! - Completion API client (OpenAI-compatible)
//! - Attachment file storage (local disk)
//! - Prometheus metrics

pub mod completion;
pub mod database;
pub mod metrics;
pub mod repositories;
pub mod storage;
