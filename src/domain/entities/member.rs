//! Server and channel membership entities and repository trait.
//!
//! Maps to the `server_members` and `channel_members` tables in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::AppError;

/// Server-level role stored on a membership row.
///
/// Database definition:
/// ```sql
/// role VARCHAR(16) NOT NULL CHECK (role IN ('owner', 'admin', 'member'))
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    Owner,
    Admin,
    #[default]
    Member,
}

impl MemberRole {
    /// Convert from database string representation.
    ///
    /// Unknown values fall back to the least privileged role.
    pub fn from_db(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "owner" => Self::Owner,
            "admin" => Self::Admin,
            _ => Self::Member,
        }
    }

    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Admin => "admin",
            Self::Member => "member",
        }
    }
}

impl std::fmt::Display for MemberRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Represents a user's membership in a server.
///
/// Maps to the `server_members` table:
/// - server_id: UUID NOT NULL REFERENCES servers(id) (composite PK)
/// - user_id: UUID NOT NULL REFERENCES users(id) (composite PK)
/// - role: VARCHAR(16) NOT NULL
/// - joined_at / updated_at: TIMESTAMPTZ
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerMember {
    pub server_id: Uuid,
    pub user_id: Uuid,
    pub role: MemberRole,
    pub joined_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ServerMember {
    /// Create a membership row stamped with the current time.
    pub fn new(server_id: Uuid, user_id: Uuid, role: MemberRole) -> Self {
        let now = Utc::now();
        Self {
            server_id,
            user_id,
            role,
            joined_at: now,
            updated_at: now,
        }
    }
}

/// Explicit membership in a private channel.
///
/// Maps to the `channel_members` table:
/// - channel_id: UUID NOT NULL REFERENCES channels(id) (composite PK)
/// - user_id: UUID NOT NULL REFERENCES users(id) (composite PK)
/// - added_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelMember {
    pub channel_id: Uuid,
    pub user_id: Uuid,
    pub added_at: DateTime<Utc>,
}

/// Repository trait for membership data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MemberRepository: Send + Sync {
    /// Check if a user is a member of a server.
    async fn is_member(&self, server_id: Uuid, user_id: Uuid) -> Result<bool, AppError>;

    /// Get a member's role, `None` when the user is not a member.
    async fn find_role(&self, server_id: Uuid, user_id: Uuid)
        -> Result<Option<MemberRole>, AppError>;

    /// Add a member to a server.
    async fn create(&self, member: &ServerMember) -> Result<(), AppError>;

    /// Check if a user has an explicit membership row for a channel.
    async fn is_channel_member(&self, channel_id: Uuid, user_id: Uuid) -> Result<bool, AppError>;

    /// Add a user to a private channel. Existing rows are left untouched.
    async fn add_channel_member(&self, member: &ChannelMember) -> Result<(), AppError>;
}
