//! Server Repository Implementation
//!
//! PostgreSQL implementation of the ServerRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Channel, Server, ServerMember, ServerOverview, ServerRepository};
use crate::shared::error::AppError;

#[derive(Debug, sqlx::FromRow)]
struct ServerRow {
    id: Uuid,
    name: String,
    description: String,
    owner_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ServerRow {
    fn into_server(self) -> Server {
        Server {
            id: self.id,
            name: self.name,
            description: self.description,
            owner_id: self.owner_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ServerOverviewRow {
    #[sqlx(flatten)]
    server: ServerRow,
    member_count: i64,
}

/// PostgreSQL server repository implementation.
#[derive(Clone)]
pub struct PgServerRepository {
    pool: PgPool,
}

impl PgServerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ServerRepository for PgServerRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Server>, AppError> {
        let row = sqlx::query_as::<_, ServerRow>(
            r#"
            SELECT id, name, description, owner_id, created_at, updated_at
            FROM servers
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_server()))
    }

    /// Insert the server, its default channel and the owner membership.
    ///
    /// The transaction rolls back on drop if any statement fails.
    async fn create_with_defaults(
        &self,
        server: &Server,
        default_channel: &Channel,
        owner: &ServerMember,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO servers (id, name, description, owner_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(server.id)
        .bind(&server.name)
        .bind(&server.description)
        .bind(server.owner_id)
        .bind(server.created_at)
        .bind(server.updated_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO channels (id, server_id, category_id, name, description, is_private, created_at, updated_at)
            VALUES ($1, $2, NULL, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(default_channel.id)
        .bind(default_channel.server_id)
        .bind(&default_channel.name)
        .bind(&default_channel.description)
        .bind(default_channel.is_private)
        .bind(default_channel.created_at)
        .bind(default_channel.updated_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO server_members (server_id, user_id, role, joined_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(owner.server_id)
        .bind(owner.user_id)
        .bind(owner.role.as_str())
        .bind(owner.joined_at)
        .bind(owner.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }

    async fn find_by_member(&self, user_id: Uuid) -> Result<Vec<ServerOverview>, AppError> {
        let rows = sqlx::query_as::<_, ServerOverviewRow>(
            r#"
            SELECT s.id, s.name, s.description, s.owner_id, s.created_at, s.updated_at,
                   (SELECT COUNT(*) FROM server_members c WHERE c.server_id = s.id) AS member_count
            FROM servers s
            JOIN server_members m ON m.server_id = s.id
            WHERE m.user_id = $1
            ORDER BY s.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| ServerOverview {
                server: r.server.into_server(),
                member_count: r.member_count,
            })
            .collect())
    }
}
