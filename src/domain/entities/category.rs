//! Category entity and repository trait.
//!
//! Maps to the `categories` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::AppError;

/// Groups channels of one server for display ordering.
///
/// Maps to the `categories` table:
/// - id: UUID PRIMARY KEY
/// - server_id: UUID NOT NULL REFERENCES servers(id)
/// - name: VARCHAR(50) NOT NULL
/// - position: INTEGER NOT NULL DEFAULT 0
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub server_id: Uuid,
    pub name: String,
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Repository trait for Category data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Find a category by ID.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, AppError>;

    /// Create a new category.
    async fn create(&self, category: &Category) -> Result<(), AppError>;

    /// List a server's categories ordered by position.
    async fn find_by_server(&self, server_id: Uuid) -> Result<Vec<Category>, AppError>;
}
