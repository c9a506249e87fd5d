//! Chat Repository Implementation
//!
//! PostgreSQL storage for AI chats and their turns.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::{Chat, ChatMessage, ChatRepository, ChatRole, ChatSummary};
use crate::shared::error::AppError;

#[derive(Debug, sqlx::FromRow)]
struct ChatRow {
    id: Uuid,
    user_id: Uuid,
    title: String,
    message_count: i32,
    last_message_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl ChatRow {
    fn into_chat(self) -> Chat {
        Chat {
            id: self.id,
            user_id: self.user_id,
            title: self.title,
            message_count: self.message_count,
            last_message_at: self.last_message_at,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ChatMessageRow {
    id: Uuid,
    chat_id: Uuid,
    role: String,
    content: String,
    timestamp: DateTime<Utc>,
}

impl ChatMessageRow {
    fn into_message(self) -> ChatMessage {
        ChatMessage {
            id: self.id,
            chat_id: self.chat_id,
            role: ChatRole::from_db(&self.role),
            content: self.content,
            timestamp: self.timestamp,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ChatSummaryRow {
    id: Uuid,
    title: String,
    created_at: DateTime<Utc>,
    last_message_at: DateTime<Utc>,
    message_count: i32,
    first_message: Option<String>,
}

/// PostgreSQL chat repository implementation.
#[derive(Clone)]
pub struct PgChatRepository {
    pool: PgPool,
}

impl PgChatRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_messages(
        tx: &mut Transaction<'_, Postgres>,
        messages: &[ChatMessage],
    ) -> Result<(), AppError> {
        for message in messages {
            sqlx::query(
                r#"
                INSERT INTO chat_messages (id, chat_id, role, content, "timestamp")
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(message.id)
            .bind(message.chat_id)
            .bind(message.role.as_str())
            .bind(&message.content)
            .bind(message.timestamp)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl ChatRepository for PgChatRepository {
    async fn create_with_messages(
        &self,
        chat: &Chat,
        messages: &[ChatMessage],
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO chats (id, user_id, title, message_count, last_message_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(chat.id)
        .bind(chat.user_id)
        .bind(&chat.title)
        .bind(chat.message_count)
        .bind(chat.last_message_at)
        .bind(chat.created_at)
        .execute(&mut *tx)
        .await?;

        Self::insert_messages(&mut tx, messages).await?;

        tx.commit().await?;

        Ok(())
    }

    async fn find_owned(&self, chat_id: Uuid, user_id: Uuid) -> Result<Option<Chat>, AppError> {
        let row = sqlx::query_as::<_, ChatRow>(
            r#"
            SELECT id, user_id, title, message_count, last_message_at, created_at
            FROM chats
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(chat_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_chat()))
    }

    async fn find_messages(&self, chat_id: Uuid) -> Result<Vec<ChatMessage>, AppError> {
        let rows = sqlx::query_as::<_, ChatMessageRow>(
            r#"
            SELECT id, chat_id, role, content, "timestamp"
            FROM chat_messages
            WHERE chat_id = $1
            ORDER BY "timestamp" ASC
            "#,
        )
        .bind(chat_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_message()).collect())
    }

    async fn append_messages(
        &self,
        chat_id: Uuid,
        messages: &[ChatMessage],
        last_message_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        Self::insert_messages(&mut tx, messages).await?;

        sqlx::query(
            r#"
            UPDATE chats
            SET message_count = message_count + $2, last_message_at = $3
            WHERE id = $1
            "#,
        )
        .bind(chat_id)
        .bind(messages.len() as i32)
        .bind(last_message_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }

    async fn find_summaries(&self, user_id: Uuid) -> Result<Vec<ChatSummary>, AppError> {
        let rows = sqlx::query_as::<_, ChatSummaryRow>(
            r#"
            SELECT c.id, c.title, c.created_at, c.last_message_at, c.message_count,
                   first_turn.content AS first_message
            FROM chats c
            LEFT JOIN LATERAL (
                SELECT m.content
                FROM chat_messages m
                WHERE m.chat_id = c.id AND m.role = 'user'
                ORDER BY m."timestamp" ASC
                LIMIT 1
            ) first_turn ON true
            WHERE c.user_id = $1
            ORDER BY c.last_message_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| ChatSummary {
                id: r.id,
                title: r.title,
                created_at: r.created_at,
                last_message_at: r.last_message_at,
                message_count: r.message_count,
                first_message: r.first_message,
            })
            .collect())
    }
}
