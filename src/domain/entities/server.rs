//! Server entity and repository trait.
//!
//! Maps to the `servers` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Channel, ServerMember};
use crate::shared::error::AppError;

/// Represents a server (community) that owns channels and members.
///
/// Maps to the `servers` table:
/// - id: UUID PRIMARY KEY
/// - name: VARCHAR(50) NOT NULL
/// - description: VARCHAR(200) NOT NULL DEFAULT ''
/// - owner_id: UUID NOT NULL REFERENCES users(id)
/// - created_at / updated_at: TIMESTAMPTZ
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A server together with its current member count.
#[derive(Debug, Clone)]
pub struct ServerOverview {
    pub server: Server,
    pub member_count: i64,
}

/// Repository trait for Server data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ServerRepository: Send + Sync {
    /// Find a server by ID.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Server>, AppError>;

    /// Insert a server with its default channel and owner membership.
    ///
    /// All three rows are written in a single transaction.
    async fn create_with_defaults(
        &self,
        server: &Server,
        default_channel: &Channel,
        owner: &ServerMember,
    ) -> Result<(), AppError>;

    /// Find all servers a user is a member of, newest first.
    async fn find_by_member(&self, user_id: Uuid) -> Result<Vec<ServerOverview>, AppError>;
}
