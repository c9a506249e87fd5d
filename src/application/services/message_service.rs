//! Message Service
//!
//! Message lifecycle: atomic save with attachments, channel listing, edit,
//! soft delete, and attachment upload/download.
//!
//! Callers are expected to have checked access through
//! [`AccessService`](super::AccessService) before calling in.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::{
    Attachment, AttachmentRepository, FileType, Message, MessageRepository,
    MessageWithAttachments, MAX_MESSAGE_LENGTH,
};
use crate::infrastructure::storage::{FileStorage, StorageError};

/// Message service trait
#[async_trait]
pub trait MessageService: Send + Sync {
    /// Persist a message and its attachment rows in one transaction.
    async fn save_message(&self, request: SaveMessageDto) -> Result<MessageWithAttachments, MessageError>;

    /// Non-deleted messages of a channel, oldest first, with attachments.
    async fn get_channel_messages(&self, channel_id: Uuid) -> Result<Vec<MessageWithAttachments>, MessageError>;

    /// Replace the content of a live message.
    async fn edit_message(&self, message_id: Uuid, content: &str) -> Result<Message, MessageError>;

    /// Soft-delete a message. Deleting twice is not an error.
    async fn delete_message(&self, message_id: Uuid) -> Result<(), MessageError>;

    /// Write an uploaded file to storage and return its path.
    async fn save_attachment(&self, message_id: Uuid, file: UploadedFile) -> Result<String, MessageError>;

    /// Attachment metadata plus the channel its message lives in.
    async fn get_attachment(&self, attachment_id: Uuid) -> Result<(Attachment, Uuid), MessageError>;

    /// Attachment bytes from storage.
    async fn read_attachment(&self, attachment: &Attachment) -> Result<Vec<u8>, MessageError>;
}

/// Save message request
#[derive(Debug, Clone)]
pub struct SaveMessageDto {
    pub id: Uuid,
    pub channel_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    /// Storage paths in upload order
    pub attachment_paths: Vec<String>,
}

/// A file received from a client
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Message service errors
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    #[error("Message not found")]
    NotFound,

    #[error("Attachment not found")]
    AttachmentNotFound,

    #[error("Message has neither content nor attachments")]
    EmptyMessage,

    #[error("Message too long")]
    ContentTooLong,

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// MessageService implementation
pub struct MessageServiceImpl<M, A>
where
    M: MessageRepository,
    A: AttachmentRepository,
{
    message_repo: Arc<M>,
    attachment_repo: Arc<A>,
    storage: Arc<dyn FileStorage>,
}

impl<M, A> MessageServiceImpl<M, A>
where
    M: MessageRepository,
    A: AttachmentRepository,
{
    pub fn new(message_repo: Arc<M>, attachment_repo: Arc<A>, storage: Arc<dyn FileStorage>) -> Self {
        Self {
            message_repo,
            attachment_repo,
            storage,
        }
    }

    fn validate_content(content: &str, has_attachments: bool) -> Result<(), MessageError> {
        if content.trim().is_empty() && !has_attachments {
            return Err(MessageError::EmptyMessage);
        }
        if content.chars().count() > MAX_MESSAGE_LENGTH {
            return Err(MessageError::ContentTooLong);
        }
        Ok(())
    }

    /// Build attachment rows for stored files, in upload order.
    async fn describe_attachments(
        &self,
        message_id: Uuid,
        paths: &[String],
    ) -> Result<Vec<Attachment>, MessageError> {
        let uploaded_at = Utc::now();
        let mut attachments = Vec::with_capacity(paths.len());

        for (position, path) in paths.iter().enumerate() {
            let file_size = self.storage.size_of(path).await?;
            let file_name = Path::new(path)
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or(path)
                .to_string();

            attachments.push(Attachment {
                id: Uuid::new_v4(),
                message_id,
                file_type: FileType::from_file_name(&file_name),
                file_name,
                file_path: path.clone(),
                file_size: file_size as i64,
                position: position as i32,
                uploaded_at,
            });
        }

        Ok(attachments)
    }
}

#[async_trait]
impl<M, A> MessageService for MessageServiceImpl<M, A>
where
    M: MessageRepository + 'static,
    A: AttachmentRepository + 'static,
{
    async fn save_message(&self, request: SaveMessageDto) -> Result<MessageWithAttachments, MessageError> {
        Self::validate_content(&request.content, !request.attachment_paths.is_empty())?;

        let attachments = self
            .describe_attachments(request.id, &request.attachment_paths)
            .await?;

        let message = Message {
            id: request.id,
            channel_id: request.channel_id,
            author_id: request.author_id,
            content: request.content,
            timestamp: Utc::now(),
            is_edited: false,
            is_deleted: false,
            edited_at: None,
        };

        self.message_repo
            .create_with_attachments(&message, &attachments)
            .await
            .map_err(|e| MessageError::Internal(e.to_string()))?;

        tracing::debug!(
            message_id = %message.id,
            channel_id = %message.channel_id,
            attachments = attachments.len(),
            "Message saved"
        );

        Ok(MessageWithAttachments {
            message,
            attachments,
        })
    }

    async fn get_channel_messages(&self, channel_id: Uuid) -> Result<Vec<MessageWithAttachments>, MessageError> {
        let messages = self
            .message_repo
            .find_by_channel(channel_id)
            .await
            .map_err(|e| MessageError::Internal(e.to_string()))?;

        if messages.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = messages.iter().map(|m| m.id).collect();
        let mut by_message: HashMap<Uuid, Vec<Attachment>> = HashMap::new();
        for attachment in self
            .attachment_repo
            .find_by_message_ids(&ids)
            .await
            .map_err(|e| MessageError::Internal(e.to_string()))?
        {
            by_message.entry(attachment.message_id).or_default().push(attachment);
        }

        Ok(messages
            .into_iter()
            .map(|message| {
                let mut attachments = by_message.remove(&message.id).unwrap_or_default();
                attachments.sort_by_key(|a| a.position);
                MessageWithAttachments {
                    message,
                    attachments,
                }
            })
            .collect())
    }

    async fn edit_message(&self, message_id: Uuid, content: &str) -> Result<Message, MessageError> {
        if content.trim().is_empty() {
            return Err(MessageError::EmptyMessage);
        }
        if content.chars().count() > MAX_MESSAGE_LENGTH {
            return Err(MessageError::ContentTooLong);
        }

        let edited_at = Utc::now();
        let updated = self
            .message_repo
            .update_content(message_id, content, edited_at)
            .await
            .map_err(|e| MessageError::Internal(e.to_string()))?;

        if !updated {
            return Err(MessageError::NotFound);
        }

        self.message_repo
            .find_by_id(message_id)
            .await
            .map_err(|e| MessageError::Internal(e.to_string()))?
            .ok_or(MessageError::NotFound)
    }

    async fn delete_message(&self, message_id: Uuid) -> Result<(), MessageError> {
        let existed = self
            .message_repo
            .soft_delete(message_id)
            .await
            .map_err(|e| MessageError::Internal(e.to_string()))?;

        if !existed {
            return Err(MessageError::NotFound);
        }

        tracing::debug!(message_id = %message_id, "Message soft-deleted");
        Ok(())
    }

    async fn save_attachment(&self, message_id: Uuid, file: UploadedFile) -> Result<String, MessageError> {
        let path = self.storage.store(&file.file_name, &file.bytes).await?;

        tracing::debug!(message_id = %message_id, path = %path, "Attachment stored");
        Ok(path)
    }

    async fn get_attachment(&self, attachment_id: Uuid) -> Result<(Attachment, Uuid), MessageError> {
        let attachment = self
            .attachment_repo
            .find_by_id(attachment_id)
            .await
            .map_err(|e| MessageError::Internal(e.to_string()))?
            .ok_or(MessageError::AttachmentNotFound)?;

        let message = self
            .message_repo
            .find_by_id(attachment.message_id)
            .await
            .map_err(|e| MessageError::Internal(e.to_string()))?
            .filter(|m| !m.is_deleted)
            .ok_or(MessageError::AttachmentNotFound)?;

        Ok((attachment, message.channel_id))
    }

    async fn read_attachment(&self, attachment: &Attachment) -> Result<Vec<u8>, MessageError> {
        self.storage
            .read(&attachment.file_path)
            .await
            .map_err(|e| match e {
                StorageError::NotFound(_) => MessageError::AttachmentNotFound,
                other => MessageError::Storage(other),
            })
    }
}
