//! Channel entity and repository trait.
//!
//! Maps to the `channels` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::AppError;

/// Name of the channel every new server starts with.
pub const DEFAULT_CHANNEL_NAME: &str = "general";

/// Description of the default channel.
pub const DEFAULT_CHANNEL_DESCRIPTION: &str = "General discussion";

/// Represents a text channel inside a server.
///
/// Maps to the `channels` table:
/// - id: UUID PRIMARY KEY
/// - server_id: UUID NOT NULL REFERENCES servers(id)
/// - category_id: UUID NULL REFERENCES categories(id)
/// - name: VARCHAR(50) NOT NULL
/// - description: VARCHAR(200) NOT NULL DEFAULT ''
/// - is_private: BOOLEAN NOT NULL DEFAULT FALSE
/// - created_at / updated_at: TIMESTAMPTZ
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    pub id: Uuid,

    /// Owning server
    pub server_id: Uuid,

    /// Optional grouping; must belong to the same server
    pub category_id: Option<Uuid>,

    pub name: String,

    pub description: String,

    /// Private channels are visible only to their channel members
    pub is_private: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Channel {
    /// Build the public `general` channel a server is created with.
    pub fn default_for(server_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            server_id,
            category_id: None,
            name: DEFAULT_CHANNEL_NAME.to_string(),
            description: DEFAULT_CHANNEL_DESCRIPTION.to_string(),
            is_private: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Repository trait for Channel data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChannelRepository: Send + Sync {
    /// Find a channel by ID.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Channel>, AppError>;

    /// Insert a channel.
    ///
    /// When `creator_id` is given, the creator is added as a channel member
    /// in the same transaction.
    async fn create(&self, channel: &Channel, creator_id: Option<Uuid>) -> Result<(), AppError>;

    /// List the channels of a server visible to a user, ordered by name.
    ///
    /// Public channels plus private channels the user is a member of.
    async fn find_visible_by_server(
        &self,
        server_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<Channel>, AppError>;

    /// List the channels of a category visible to a user, ordered by name.
    async fn find_visible_by_category(
        &self,
        category_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<Channel>, AppError>;

    /// Move a channel into a category, or out of any category with `None`.
    async fn update_category(
        &self,
        channel_id: Uuid,
        category_id: Option<Uuid>,
    ) -> Result<(), AppError>;
}
