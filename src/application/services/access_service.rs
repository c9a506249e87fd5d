//! Access Service
//!
//! Answers authorization questions about servers, channels and messages.
//! Denials are plain `false`; errors are reserved for missing rows and
//! storage failures.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::services::PermissionService;
use crate::domain::{ChannelRepository, MemberRepository, MessageRepository};

/// Access service trait
#[async_trait]
pub trait AccessService: Send + Sync {
    /// Whether the user belongs to the server. Unknown servers yield `false`.
    async fn is_server_member(&self, server_id: Uuid, user_id: Uuid) -> Result<bool, AccessError>;

    /// Whether the user may create channels, categories and manage private channels.
    async fn has_channel_management_permission(
        &self,
        server_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, AccessError>;

    async fn is_channel_private(&self, channel_id: Uuid) -> Result<bool, AccessError>;

    /// Whether the user may read and post in the channel.
    async fn has_channel_access(&self, channel_id: Uuid, user_id: Uuid) -> Result<bool, AccessError>;

    async fn is_message_author(&self, message_id: Uuid, user_id: Uuid) -> Result<bool, AccessError>;

    /// Whether the user may delete the message (author, owner or admin).
    async fn can_delete_message(&self, message_id: Uuid, user_id: Uuid) -> Result<bool, AccessError>;
}

/// Access service errors
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    #[error("Channel not found")]
    ChannelNotFound,

    #[error("Message not found")]
    MessageNotFound,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// AccessService implementation
pub struct AccessServiceImpl<Mem, C, M>
where
    Mem: MemberRepository,
    C: ChannelRepository,
    M: MessageRepository,
{
    member_repo: Arc<Mem>,
    channel_repo: Arc<C>,
    message_repo: Arc<M>,
}

impl<Mem, C, M> AccessServiceImpl<Mem, C, M>
where
    Mem: MemberRepository,
    C: ChannelRepository,
    M: MessageRepository,
{
    pub fn new(member_repo: Arc<Mem>, channel_repo: Arc<C>, message_repo: Arc<M>) -> Self {
        Self {
            member_repo,
            channel_repo,
            message_repo,
        }
    }
}

#[async_trait]
impl<Mem, C, M> AccessService for AccessServiceImpl<Mem, C, M>
where
    Mem: MemberRepository + 'static,
    C: ChannelRepository + 'static,
    M: MessageRepository + 'static,
{
    async fn is_server_member(&self, server_id: Uuid, user_id: Uuid) -> Result<bool, AccessError> {
        self.member_repo
            .is_member(server_id, user_id)
            .await
            .map_err(|e| AccessError::Internal(e.to_string()))
    }

    async fn has_channel_management_permission(
        &self,
        server_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, AccessError> {
        let role = self
            .member_repo
            .find_role(server_id, user_id)
            .await
            .map_err(|e| AccessError::Internal(e.to_string()))?;

        Ok(PermissionService::can_manage_channels(role))
    }

    async fn is_channel_private(&self, channel_id: Uuid) -> Result<bool, AccessError> {
        let channel = self
            .channel_repo
            .find_by_id(channel_id)
            .await
            .map_err(|e| AccessError::Internal(e.to_string()))?
            .ok_or(AccessError::ChannelNotFound)?;

        Ok(channel.is_private)
    }

    async fn has_channel_access(&self, channel_id: Uuid, user_id: Uuid) -> Result<bool, AccessError> {
        let channel = self
            .channel_repo
            .find_by_id(channel_id)
            .await
            .map_err(|e| AccessError::Internal(e.to_string()))?
            .ok_or(AccessError::ChannelNotFound)?;

        if !self.is_server_member(channel.server_id, user_id).await? {
            return Ok(false);
        }

        if !channel.is_private {
            return Ok(true);
        }

        let is_channel_member = self
            .member_repo
            .is_channel_member(channel_id, user_id)
            .await
            .map_err(|e| AccessError::Internal(e.to_string()))?;

        Ok(PermissionService::can_view_channel(&channel, true, is_channel_member))
    }

    async fn is_message_author(&self, message_id: Uuid, user_id: Uuid) -> Result<bool, AccessError> {
        let message = self
            .message_repo
            .find_by_id(message_id)
            .await
            .map_err(|e| AccessError::Internal(e.to_string()))?
            .ok_or(AccessError::MessageNotFound)?;

        Ok(message.is_author(user_id))
    }

    async fn can_delete_message(&self, message_id: Uuid, user_id: Uuid) -> Result<bool, AccessError> {
        let message = self
            .message_repo
            .find_by_id(message_id)
            .await
            .map_err(|e| AccessError::Internal(e.to_string()))?
            .ok_or(AccessError::MessageNotFound)?;

        if message.is_author(user_id) {
            return Ok(true);
        }

        let channel = self
            .channel_repo
            .find_by_id(message.channel_id)
            .await
            .map_err(|e| AccessError::Internal(e.to_string()))?
            .ok_or(AccessError::ChannelNotFound)?;

        let role = self
            .member_repo
            .find_role(channel.server_id, user_id)
            .await
            .map_err(|e| AccessError::Internal(e.to_string()))?;

        Ok(PermissionService::can_delete_message(false, role))
    }
}
