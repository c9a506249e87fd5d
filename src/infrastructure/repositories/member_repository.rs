//! Member Repository Implementation
//!
//! PostgreSQL implementation for server and private-channel membership.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{ChannelMember, MemberRepository, MemberRole, ServerMember};
use crate::shared::error::AppError;

/// PostgreSQL member repository implementation.
#[derive(Clone)]
pub struct PgMemberRepository {
    pool: PgPool,
}

impl PgMemberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemberRepository for PgMemberRepository {
    async fn is_member(&self, server_id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        let exists: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM server_members WHERE server_id = $1 AND user_id = $2)",
        )
        .bind(server_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists.0)
    }

    async fn find_role(
        &self,
        server_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<MemberRole>, AppError> {
        let role: Option<(String,)> = sqlx::query_as(
            "SELECT role FROM server_members WHERE server_id = $1 AND user_id = $2",
        )
        .bind(server_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(role.map(|(r,)| MemberRole::from_db(&r)))
    }

    async fn create(&self, member: &ServerMember) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO server_members (server_id, user_id, role, joined_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(member.server_id)
        .bind(member.user_id)
        .bind(member.role.as_str())
        .bind(member.joined_at)
        .bind(member.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::Conflict("Already a member of this server".to_string())
            }
            _ => AppError::Database(e),
        })?;

        Ok(())
    }

    async fn is_channel_member(&self, channel_id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        let exists: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM channel_members WHERE channel_id = $1 AND user_id = $2)",
        )
        .bind(channel_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists.0)
    }

    async fn add_channel_member(&self, member: &ChannelMember) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO channel_members (channel_id, user_id, added_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (channel_id, user_id) DO NOTHING
            "#,
        )
        .bind(member.channel_id)
        .bind(member.user_id)
        .bind(member.added_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
