//! Server Service
//!
//! Servers, channels, categories and membership management.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::services::PermissionService;
use crate::domain::{
    Category, CategoryRepository, Channel, ChannelMember, ChannelRepository, MemberRepository,
    MemberRole, Server, ServerMember, ServerOverview, ServerRepository,
};
use crate::shared::error::AppError;

/// Server service trait
#[async_trait]
pub trait ServerService: Send + Sync {
    /// Create a server with its `general` channel; the creator becomes owner.
    async fn create_server(&self, owner_id: Uuid, request: CreateServerDto) -> Result<Server, ServerError>;

    /// Servers the user belongs to, newest first.
    async fn get_user_servers(&self, user_id: Uuid) -> Result<Vec<ServerOverview>, ServerError>;

    async fn join_server(&self, server_id: Uuid, user_id: Uuid) -> Result<(), ServerError>;

    /// Channels of a server visible to the user, ordered by name.
    async fn get_server_channels(&self, server_id: Uuid, user_id: Uuid) -> Result<Vec<Channel>, ServerError>;

    async fn create_channel(
        &self,
        server_id: Uuid,
        actor_id: Uuid,
        request: CreateChannelDto,
    ) -> Result<Channel, ServerError>;

    /// Grant a server member access to a private channel.
    async fn add_channel_member(
        &self,
        channel_id: Uuid,
        actor_id: Uuid,
        target_user_id: Uuid,
    ) -> Result<(), ServerError>;

    async fn create_category(
        &self,
        server_id: Uuid,
        actor_id: Uuid,
        request: CreateCategoryDto,
    ) -> Result<Category, ServerError>;

    async fn get_server_categories(&self, server_id: Uuid, user_id: Uuid) -> Result<Vec<Category>, ServerError>;

    async fn get_category_channels(&self, category_id: Uuid, user_id: Uuid) -> Result<Vec<Channel>, ServerError>;

    /// Move a channel into a category of the same server, or out with `None`.
    async fn update_channel_category(
        &self,
        channel_id: Uuid,
        actor_id: Uuid,
        category_id: Option<Uuid>,
    ) -> Result<(), ServerError>;
}

/// Create server request
#[derive(Debug, Clone)]
pub struct CreateServerDto {
    pub name: String,
    pub description: Option<String>,
}

/// Create channel request
#[derive(Debug, Clone)]
pub struct CreateChannelDto {
    pub name: String,
    pub description: Option<String>,
    pub is_private: bool,
    pub category_id: Option<Uuid>,
}

/// Create category request
#[derive(Debug, Clone)]
pub struct CreateCategoryDto {
    pub name: String,
    pub position: Option<i32>,
}

/// Server service errors
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Server not found")]
    NotFound,

    #[error("Channel not found")]
    ChannelNotFound,

    #[error("Category not found")]
    CategoryNotFound,

    #[error("Permission denied")]
    Forbidden,

    #[error("Already a member")]
    AlreadyMember,

    #[error("Channel is not private")]
    ChannelNotPrivate,

    #[error("Target user is not a server member")]
    TargetNotMember,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// ServerService implementation
pub struct ServerServiceImpl<S, C, Cat, Mem>
where
    S: ServerRepository,
    C: ChannelRepository,
    Cat: CategoryRepository,
    Mem: MemberRepository,
{
    server_repo: Arc<S>,
    channel_repo: Arc<C>,
    category_repo: Arc<Cat>,
    member_repo: Arc<Mem>,
}

impl<S, C, Cat, Mem> ServerServiceImpl<S, C, Cat, Mem>
where
    S: ServerRepository,
    C: ChannelRepository,
    Cat: CategoryRepository,
    Mem: MemberRepository,
{
    pub fn new(
        server_repo: Arc<S>,
        channel_repo: Arc<C>,
        category_repo: Arc<Cat>,
        member_repo: Arc<Mem>,
    ) -> Self {
        Self {
            server_repo,
            channel_repo,
            category_repo,
            member_repo,
        }
    }

    async fn ensure_server_exists(&self, server_id: Uuid) -> Result<Server, ServerError> {
        self.server_repo
            .find_by_id(server_id)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))?
            .ok_or(ServerError::NotFound)
    }

    async fn ensure_member(&self, server_id: Uuid, user_id: Uuid) -> Result<(), ServerError> {
        let is_member = self
            .member_repo
            .is_member(server_id, user_id)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))?;

        if !is_member {
            return Err(ServerError::Forbidden);
        }
        Ok(())
    }

    async fn ensure_manager(&self, server_id: Uuid, user_id: Uuid) -> Result<(), ServerError> {
        let role = self
            .member_repo
            .find_role(server_id, user_id)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))?;

        if !PermissionService::can_manage_channels(role) {
            return Err(ServerError::Forbidden);
        }
        Ok(())
    }

    async fn find_channel(&self, channel_id: Uuid) -> Result<Channel, ServerError> {
        self.channel_repo
            .find_by_id(channel_id)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))?
            .ok_or(ServerError::ChannelNotFound)
    }

    /// The category must exist and belong to `server_id`.
    async fn ensure_category_in_server(&self, category_id: Uuid, server_id: Uuid) -> Result<(), ServerError> {
        self.category_repo
            .find_by_id(category_id)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))?
            .filter(|c| c.server_id == server_id)
            .map(|_| ())
            .ok_or(ServerError::CategoryNotFound)
    }
}

#[async_trait]
impl<S, C, Cat, Mem> ServerService for ServerServiceImpl<S, C, Cat, Mem>
where
    S: ServerRepository + 'static,
    C: ChannelRepository + 'static,
    Cat: CategoryRepository + 'static,
    Mem: MemberRepository + 'static,
{
    async fn create_server(&self, owner_id: Uuid, request: CreateServerDto) -> Result<Server, ServerError> {
        let now = Utc::now();
        let server = Server {
            id: Uuid::new_v4(),
            name: request.name,
            description: request.description.unwrap_or_default(),
            owner_id,
            created_at: now,
            updated_at: now,
        };
        let general = Channel::default_for(server.id, now);
        let owner = ServerMember {
            server_id: server.id,
            user_id: owner_id,
            role: MemberRole::Owner,
            joined_at: now,
            updated_at: now,
        };

        self.server_repo
            .create_with_defaults(&server, &general, &owner)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))?;

        tracing::info!(server_id = %server.id, owner_id = %owner_id, "Server created");

        Ok(server)
    }

    async fn get_user_servers(&self, user_id: Uuid) -> Result<Vec<ServerOverview>, ServerError> {
        self.server_repo
            .find_by_member(user_id)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }

    async fn join_server(&self, server_id: Uuid, user_id: Uuid) -> Result<(), ServerError> {
        self.ensure_server_exists(server_id).await?;

        if self
            .member_repo
            .is_member(server_id, user_id)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))?
        {
            return Err(ServerError::AlreadyMember);
        }

        // A concurrent join can still hit the unique key after the check above
        self.member_repo
            .create(&ServerMember::new(server_id, user_id, MemberRole::Member))
            .await
            .map_err(|e| match e {
                AppError::Conflict(_) => ServerError::AlreadyMember,
                other => ServerError::Internal(other.to_string()),
            })?;

        tracing::info!(server_id = %server_id, user_id = %user_id, "User joined server");
        Ok(())
    }

    async fn get_server_channels(&self, server_id: Uuid, user_id: Uuid) -> Result<Vec<Channel>, ServerError> {
        self.ensure_member(server_id, user_id).await?;

        self.channel_repo
            .find_visible_by_server(server_id, user_id)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }

    async fn create_channel(
        &self,
        server_id: Uuid,
        actor_id: Uuid,
        request: CreateChannelDto,
    ) -> Result<Channel, ServerError> {
        self.ensure_server_exists(server_id).await?;
        self.ensure_manager(server_id, actor_id).await?;

        if let Some(category_id) = request.category_id {
            self.ensure_category_in_server(category_id, server_id).await?;
        }

        let now = Utc::now();
        let channel = Channel {
            id: Uuid::new_v4(),
            server_id,
            category_id: request.category_id,
            name: request.name,
            description: request.description.unwrap_or_default(),
            is_private: request.is_private,
            created_at: now,
            updated_at: now,
        };

        let creator = channel.is_private.then_some(actor_id);
        self.channel_repo
            .create(&channel, creator)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))?;

        tracing::info!(
            channel_id = %channel.id,
            server_id = %server_id,
            is_private = channel.is_private,
            "Channel created"
        );

        Ok(channel)
    }

    async fn add_channel_member(
        &self,
        channel_id: Uuid,
        actor_id: Uuid,
        target_user_id: Uuid,
    ) -> Result<(), ServerError> {
        let channel = self.find_channel(channel_id).await?;

        if !channel.is_private {
            return Err(ServerError::ChannelNotPrivate);
        }

        self.ensure_manager(channel.server_id, actor_id).await?;

        let target_is_member = self
            .member_repo
            .is_member(channel.server_id, target_user_id)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))?;
        if !target_is_member {
            return Err(ServerError::TargetNotMember);
        }

        self.member_repo
            .add_channel_member(&ChannelMember {
                channel_id,
                user_id: target_user_id,
                added_at: Utc::now(),
            })
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))?;

        tracing::info!(channel_id = %channel_id, user_id = %target_user_id, "Channel member added");
        Ok(())
    }

    async fn create_category(
        &self,
        server_id: Uuid,
        actor_id: Uuid,
        request: CreateCategoryDto,
    ) -> Result<Category, ServerError> {
        self.ensure_server_exists(server_id).await?;
        self.ensure_manager(server_id, actor_id).await?;

        let now = Utc::now();
        let category = Category {
            id: Uuid::new_v4(),
            server_id,
            name: request.name,
            position: request.position.unwrap_or(0),
            created_at: now,
            updated_at: now,
        };

        self.category_repo
            .create(&category)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))?;

        Ok(category)
    }

    async fn get_server_categories(&self, server_id: Uuid, user_id: Uuid) -> Result<Vec<Category>, ServerError> {
        self.ensure_member(server_id, user_id).await?;

        self.category_repo
            .find_by_server(server_id)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }

    async fn get_category_channels(&self, category_id: Uuid, user_id: Uuid) -> Result<Vec<Channel>, ServerError> {
        let category = self
            .category_repo
            .find_by_id(category_id)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))?
            .ok_or(ServerError::CategoryNotFound)?;

        self.ensure_member(category.server_id, user_id).await?;

        self.channel_repo
            .find_visible_by_category(category_id, user_id)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }

    async fn update_channel_category(
        &self,
        channel_id: Uuid,
        actor_id: Uuid,
        category_id: Option<Uuid>,
    ) -> Result<(), ServerError> {
        let channel = self.find_channel(channel_id).await?;
        self.ensure_manager(channel.server_id, actor_id).await?;

        if let Some(category_id) = category_id {
            self.ensure_category_in_server(category_id, channel.server_id).await?;
        }

        self.channel_repo
            .update_category(channel_id, category_id)
            .await
            .map_err(|e| match e {
                AppError::NotFound(_) => ServerError::ChannelNotFound,
                other => ServerError::Internal(other.to_string()),
            })
    }
}
