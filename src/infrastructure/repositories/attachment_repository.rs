//! Attachment Repository Implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Attachment, AttachmentRepository, FileType};
use crate::shared::error::AppError;

#[derive(Debug, sqlx::FromRow)]
struct AttachmentRow {
    id: Uuid,
    message_id: Uuid,
    file_name: String,
    file_type: String,
    file_path: String,
    file_size: i64,
    position: i32,
    uploaded_at: DateTime<Utc>,
}

impl AttachmentRow {
    fn into_attachment(self) -> Attachment {
        Attachment {
            id: self.id,
            message_id: self.message_id,
            file_name: self.file_name,
            file_type: FileType::from_db(&self.file_type),
            file_path: self.file_path,
            file_size: self.file_size,
            position: self.position,
            uploaded_at: self.uploaded_at,
        }
    }
}

/// PostgreSQL attachment repository implementation.
#[derive(Clone)]
pub struct PgAttachmentRepository {
    pool: PgPool,
}

impl PgAttachmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttachmentRepository for PgAttachmentRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Attachment>, AppError> {
        let row = sqlx::query_as::<_, AttachmentRow>(
            r#"
            SELECT id, message_id, file_name, file_type, file_path, file_size, position, uploaded_at
            FROM attachments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_attachment()))
    }

    async fn find_by_message_ids(&self, message_ids: &[Uuid]) -> Result<Vec<Attachment>, AppError> {
        if message_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, AttachmentRow>(
            r#"
            SELECT id, message_id, file_name, file_type, file_path, file_size, position, uploaded_at
            FROM attachments
            WHERE message_id = ANY($1)
            ORDER BY message_id, position ASC
            "#,
        )
        .bind(message_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_attachment()).collect())
    }
}
