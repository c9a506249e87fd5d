//! Message entity and repository trait.
//!
//! Maps to the `messages` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Attachment;
use crate::shared::error::AppError;

/// Maximum message content length in characters.
pub const MAX_MESSAGE_LENGTH: usize = 2000;

/// Represents a message posted to a channel.
///
/// Maps to the `messages` table:
/// - id: UUID PRIMARY KEY
/// - channel_id: UUID NOT NULL REFERENCES channels(id)
/// - author_id: UUID NOT NULL REFERENCES users(id)
/// - content: TEXT NOT NULL DEFAULT ''
/// - "timestamp": TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// - is_edited: BOOLEAN NOT NULL DEFAULT FALSE
/// - is_deleted: BOOLEAN NOT NULL DEFAULT FALSE (tombstone)
/// - edited_at: TIMESTAMPTZ NULL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub channel_id: Uuid,
    pub author_id: Uuid,

    /// Message content; may be empty when attachments exist
    pub content: String,

    pub timestamp: DateTime<Utc>,

    pub is_edited: bool,

    /// Soft-deleted messages are kept but never returned by read paths
    pub is_deleted: bool,

    pub edited_at: Option<DateTime<Utc>>,
}

impl Message {
    /// Check if the given user wrote this message.
    pub fn is_author(&self, user_id: Uuid) -> bool {
        self.author_id == user_id
    }
}

/// A message together with its attachments in upload order.
#[derive(Debug, Clone)]
pub struct MessageWithAttachments {
    pub message: Message,
    pub attachments: Vec<Attachment>,
}

/// Repository trait for Message data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Find a message by ID, including soft-deleted ones.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Message>, AppError>;

    /// Insert a message and its attachments in a single transaction.
    async fn create_with_attachments(
        &self,
        message: &Message,
        attachments: &[Attachment],
    ) -> Result<(), AppError>;

    /// List the non-deleted messages of a channel, oldest first.
    async fn find_by_channel(&self, channel_id: Uuid) -> Result<Vec<Message>, AppError>;

    /// Replace the content of a live message and mark it edited.
    ///
    /// Returns `false` when no live message matched.
    async fn update_content(
        &self,
        id: Uuid,
        content: &str,
        edited_at: DateTime<Utc>,
    ) -> Result<bool, AppError>;

    /// Set the tombstone flag. Returns `false` when the message does not exist.
    async fn soft_delete(&self, id: Uuid) -> Result<bool, AppError>;
}
