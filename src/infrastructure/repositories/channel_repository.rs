//! Channel Repository Implementation
//!
//! PostgreSQL implementation of the ChannelRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Channel, ChannelRepository};
use crate::shared::error::AppError;

#[derive(Debug, sqlx::FromRow)]
struct ChannelRow {
    id: Uuid,
    server_id: Uuid,
    category_id: Option<Uuid>,
    name: String,
    description: String,
    is_private: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ChannelRow {
    fn into_channel(self) -> Channel {
        Channel {
            id: self.id,
            server_id: self.server_id,
            category_id: self.category_id,
            name: self.name,
            description: self.description,
            is_private: self.is_private,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// PostgreSQL channel repository implementation.
#[derive(Clone)]
pub struct PgChannelRepository {
    pool: PgPool,
}

impl PgChannelRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChannelRepository for PgChannelRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Channel>, AppError> {
        let row = sqlx::query_as::<_, ChannelRow>(
            r#"
            SELECT id, server_id, category_id, name, description, is_private, created_at, updated_at
            FROM channels
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_channel()))
    }

    async fn create(&self, channel: &Channel, creator_id: Option<Uuid>) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO channels (id, server_id, category_id, name, description, is_private, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(channel.id)
        .bind(channel.server_id)
        .bind(channel.category_id)
        .bind(&channel.name)
        .bind(&channel.description)
        .bind(channel.is_private)
        .bind(channel.created_at)
        .bind(channel.updated_at)
        .execute(&mut *tx)
        .await?;

        if let Some(user_id) = creator_id {
            sqlx::query(
                r#"
                INSERT INTO channel_members (channel_id, user_id, added_at)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(channel.id)
            .bind(user_id)
            .bind(channel.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(())
    }

    async fn find_visible_by_server(
        &self,
        server_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<Channel>, AppError> {
        let rows = sqlx::query_as::<_, ChannelRow>(
            r#"
            SELECT c.id, c.server_id, c.category_id, c.name, c.description, c.is_private,
                   c.created_at, c.updated_at
            FROM channels c
            WHERE c.server_id = $1
              AND (c.is_private = false OR EXISTS (
                    SELECT 1 FROM channel_members cm
                    WHERE cm.channel_id = c.id AND cm.user_id = $2))
            ORDER BY c.name ASC
            "#,
        )
        .bind(server_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_channel()).collect())
    }

    async fn find_visible_by_category(
        &self,
        category_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<Channel>, AppError> {
        let rows = sqlx::query_as::<_, ChannelRow>(
            r#"
            SELECT c.id, c.server_id, c.category_id, c.name, c.description, c.is_private,
                   c.created_at, c.updated_at
            FROM channels c
            WHERE c.category_id = $1
              AND (c.is_private = false OR EXISTS (
                    SELECT 1 FROM channel_members cm
                    WHERE cm.channel_id = c.id AND cm.user_id = $2))
            ORDER BY c.name ASC
            "#,
        )
        .bind(category_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_channel()).collect())
    }

    async fn update_category(
        &self,
        channel_id: Uuid,
        category_id: Option<Uuid>,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE channels
            SET category_id = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(channel_id)
        .bind(category_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Channel not found".to_string()));
        }

        Ok(())
    }
}
