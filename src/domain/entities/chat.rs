//! AI chat entities and repository trait.
//!
//! Maps to the `chats` and `chat_messages` tables in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::AppError;

/// Who produced a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn from_db(s: &str) -> Self {
        match s {
            "assistant" => Self::Assistant,
            _ => Self::User,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// A conversation between one user and the assistant.
///
/// Maps to the `chats` table:
/// - id: UUID PRIMARY KEY
/// - user_id: UUID NOT NULL REFERENCES users(id)
/// - title: VARCHAR(64) NOT NULL
/// - message_count: INTEGER NOT NULL
/// - last_message_at / created_at: TIMESTAMPTZ
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub message_count: i32,
    pub last_message_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// One turn of a chat.
///
/// Maps to the `chat_messages` table:
/// - id: UUID PRIMARY KEY
/// - chat_id: UUID NOT NULL REFERENCES chats(id)
/// - role: VARCHAR(16) NOT NULL CHECK (role IN ('user', 'assistant'))
/// - content: TEXT NOT NULL
/// - "timestamp": TIMESTAMPTZ NOT NULL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub chat_id: Uuid,
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(chat_id: Uuid, role: ChatRole, content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            chat_id,
            role,
            content: content.into(),
            timestamp,
        }
    }
}

/// Listing entry for the chat history view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSummary {
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub last_message_at: DateTime<Utc>,
    pub message_count: i32,

    /// Content of the earliest user turn, if any
    pub first_message: Option<String>,
}

/// Repository trait for Chat data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatRepository: Send + Sync {
    /// Insert a chat and its initial turns in a single transaction.
    async fn create_with_messages(
        &self,
        chat: &Chat,
        messages: &[ChatMessage],
    ) -> Result<(), AppError>;

    /// Find a chat by ID, only if it belongs to the given user.
    async fn find_owned(&self, chat_id: Uuid, user_id: Uuid) -> Result<Option<Chat>, AppError>;

    /// List a chat's turns, oldest first.
    async fn find_messages(&self, chat_id: Uuid) -> Result<Vec<ChatMessage>, AppError>;

    /// Insert turns and bump `message_count` / `last_message_at` in a single transaction.
    async fn append_messages(
        &self,
        chat_id: Uuid,
        messages: &[ChatMessage],
        last_message_at: DateTime<Utc>,
    ) -> Result<(), AppError>;

    /// List a user's chats, most recently active first.
    async fn find_summaries(&self, user_id: Uuid) -> Result<Vec<ChatSummary>, AppError>;
}
