//! Message Attachment entity and repository trait.
//!
//! Maps to the `attachments` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::AppError;

/// Coarse file classification derived from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FileType {
    Image,
    Video,
    Audio,
    Document,
    #[default]
    Other,
}

impl FileType {
    /// Classify a file by its extension, case-insensitively.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" | "png" | "gif" | "webp" => Self::Image,
            "mp4" | "webm" | "mov" | "avi" => Self::Video,
            "mp3" | "wav" | "ogg" => Self::Audio,
            "pdf" | "doc" | "docx" | "xls" | "xlsx" | "ppt" | "pptx" => Self::Document,
            _ => Self::Other,
        }
    }

    /// Classify a file name or path. Names without an extension are `Other`.
    pub fn from_file_name(name: &str) -> Self {
        std::path::Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or_default()
    }

    /// Media that browsers can render in place rather than download.
    pub fn is_inline(&self) -> bool {
        matches!(self, Self::Image | Self::Video | Self::Audio)
    }

    /// Convert from database string representation.
    pub fn from_db(s: &str) -> Self {
        match s {
            "image" => Self::Image,
            "video" => Self::Video,
            "audio" => Self::Audio,
            "document" => Self::Document,
            _ => Self::Other,
        }
    }

    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Document => "document",
            Self::Other => "other",
        }
    }
}

/// Represents a file attached to a message.
///
/// Maps to the `attachments` table:
/// - id: UUID PRIMARY KEY
/// - message_id: UUID NOT NULL REFERENCES messages(id)
/// - file_name: VARCHAR(255) NOT NULL
/// - file_type: VARCHAR(16) NOT NULL
/// - file_path: TEXT NOT NULL
/// - file_size: BIGINT NOT NULL
/// - position: INTEGER NOT NULL (upload order within the message)
/// - uploaded_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub id: Uuid,
    pub message_id: Uuid,
    pub file_name: String,
    pub file_type: FileType,

    /// Location in file storage
    #[serde(skip_serializing)]
    pub file_path: String,

    /// Size in bytes
    pub file_size: i64,

    pub position: i32,
    pub uploaded_at: DateTime<Utc>,
}

/// Repository trait for Attachment data access operations.
///
/// Attachments are inserted together with their message, see
/// [`MessageRepository::create_with_attachments`](super::MessageRepository::create_with_attachments).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AttachmentRepository: Send + Sync {
    /// Find an attachment by ID.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Attachment>, AppError>;

    /// Load the attachments of many messages in one query,
    /// ordered by message then position.
    async fn find_by_message_ids(&self, message_ids: &[Uuid]) -> Result<Vec<Attachment>, AppError>;
}
