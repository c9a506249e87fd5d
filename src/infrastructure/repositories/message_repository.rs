//! Message Repository Implementation
//!
//! PostgreSQL implementation of message storage. Messages are soft-deleted;
//! read paths filter on `is_deleted`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Attachment, Message, MessageRepository};
use crate::shared::error::AppError;

/// PostgreSQL message repository implementation.
#[derive(Clone)]
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    /// Creates a new PgMessageRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Internal row type for message queries.
#[derive(Debug, sqlx::FromRow)]
struct MessageRow {
    id: Uuid,
    channel_id: Uuid,
    author_id: Uuid,
    content: String,
    timestamp: DateTime<Utc>,
    is_edited: bool,
    is_deleted: bool,
    edited_at: Option<DateTime<Utc>>,
}

impl MessageRow {
    fn into_message(self) -> Message {
        Message {
            id: self.id,
            channel_id: self.channel_id,
            author_id: self.author_id,
            content: self.content,
            timestamp: self.timestamp,
            is_edited: self.is_edited,
            is_deleted: self.is_deleted,
            edited_at: self.edited_at,
        }
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Message>, AppError> {
        let row = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT id, channel_id, author_id, content, "timestamp",
                   is_edited, is_deleted, edited_at
            FROM messages
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_message()))
    }

    /// Insert the message, then each attachment, inside one transaction.
    async fn create_with_attachments(
        &self,
        message: &Message,
        attachments: &[Attachment],
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO messages (id, channel_id, author_id, content, "timestamp", is_edited, is_deleted, edited_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(message.id)
        .bind(message.channel_id)
        .bind(message.author_id)
        .bind(&message.content)
        .bind(message.timestamp)
        .bind(message.is_edited)
        .bind(message.is_deleted)
        .bind(message.edited_at)
        .execute(&mut *tx)
        .await?;

        for attachment in attachments {
            sqlx::query(
                r#"
                INSERT INTO attachments (id, message_id, file_name, file_type, file_path, file_size, position, uploaded_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(attachment.id)
            .bind(attachment.message_id)
            .bind(&attachment.file_name)
            .bind(attachment.file_type.as_str())
            .bind(&attachment.file_path)
            .bind(attachment.file_size)
            .bind(attachment.position)
            .bind(attachment.uploaded_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(())
    }

    async fn find_by_channel(&self, channel_id: Uuid) -> Result<Vec<Message>, AppError> {
        let rows = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT id, channel_id, author_id, content, "timestamp",
                   is_edited, is_deleted, edited_at
            FROM messages
            WHERE channel_id = $1 AND is_deleted = false
            ORDER BY "timestamp" ASC
            "#,
        )
        .bind(channel_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_message()).collect())
    }

    async fn update_content(
        &self,
        id: Uuid,
        content: &str,
        edited_at: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE messages
            SET content = $2, is_edited = true, edited_at = $3
            WHERE id = $1 AND is_deleted = false
            "#,
        )
        .bind(id)
        .bind(content)
        .bind(edited_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Re-deleting an already deleted message still matches the row.
    async fn soft_delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE messages SET is_deleted = true WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
