//! Response DTOs
//!
//! Data structures for API response bodies.

use serde::Serialize;

use crate::application::services::AuthTokens;
use crate::domain::{
    Attachment, Category, Channel, ChatMessage, ChatSummary, Message, MessageWithAttachments,
    Server, ServerOverview, User,
};

/// User response
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username,
            email: user.email,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Registration/login response (user and access token)
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub access_token: String,
    pub expires_in: i64,
    pub token_type: String,
}

impl AuthResponse {
    pub fn new(user: User, tokens: AuthTokens) -> Self {
        Self {
            user: user.into(),
            access_token: tokens.access_token,
            expires_in: tokens.expires_in,
            token_type: tokens.token_type,
        }
    }
}

/// Server response
#[derive(Debug, Serialize)]
pub struct ServerResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub owner_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_count: Option<i64>,
    pub created_at: String,
}

impl From<Server> for ServerResponse {
    fn from(server: Server) -> Self {
        Self {
            id: server.id.to_string(),
            name: server.name,
            description: server.description,
            owner_id: server.owner_id.to_string(),
            member_count: None,
            created_at: server.created_at.to_rfc3339(),
        }
    }
}

impl From<ServerOverview> for ServerResponse {
    fn from(overview: ServerOverview) -> Self {
        Self {
            member_count: Some(overview.member_count),
            ..overview.server.into()
        }
    }
}

/// Channel response
#[derive(Debug, Serialize)]
pub struct ChannelResponse {
    pub id: String,
    pub server_id: String,
    pub category_id: Option<String>,
    pub name: String,
    pub description: String,
    pub is_private: bool,
    pub created_at: String,
}

impl From<Channel> for ChannelResponse {
    fn from(channel: Channel) -> Self {
        Self {
            id: channel.id.to_string(),
            server_id: channel.server_id.to_string(),
            category_id: channel.category_id.map(|id| id.to_string()),
            name: channel.name,
            description: channel.description,
            is_private: channel.is_private,
            created_at: channel.created_at.to_rfc3339(),
        }
    }
}

/// Category response
#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub id: String,
    pub server_id: String,
    pub name: String,
    pub position: i32,
    pub created_at: String,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.id.to_string(),
            server_id: category.server_id.to_string(),
            name: category.name,
            position: category.position,
            created_at: category.created_at.to_rfc3339(),
        }
    }
}

/// Attachment metadata; the bytes are served from `url`
#[derive(Debug, Serialize)]
pub struct AttachmentResponse {
    pub id: String,
    pub file_name: String,
    pub file_type: String,
    pub file_size: i64,
    pub url: String,
}

impl From<Attachment> for AttachmentResponse {
    fn from(attachment: Attachment) -> Self {
        Self {
            url: format!("/api/v1/attachments/{}", attachment.id),
            id: attachment.id.to_string(),
            file_name: attachment.file_name,
            file_type: attachment.file_type.as_str().to_string(),
            file_size: attachment.file_size,
        }
    }
}

/// Channel message response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub id: String,
    pub channel_id: String,
    pub author_id: String,
    pub content: String,
    pub timestamp: String,
    pub is_edited: bool,
    pub edited_at: Option<String>,
    pub attachments: Vec<AttachmentResponse>,
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self {
            id: message.id.to_string(),
            channel_id: message.channel_id.to_string(),
            author_id: message.author_id.to_string(),
            content: message.content,
            timestamp: message.timestamp.to_rfc3339(),
            is_edited: message.is_edited,
            edited_at: message.edited_at.map(|t| t.to_rfc3339()),
            attachments: Vec::new(),
        }
    }
}

impl From<MessageWithAttachments> for MessageResponse {
    fn from(item: MessageWithAttachments) -> Self {
        Self {
            attachments: item.attachments.into_iter().map(Into::into).collect(),
            ..item.message.into()
        }
    }
}

/// One AI chat turn
#[derive(Debug, Serialize)]
pub struct ChatMessageResponse {
    pub id: String,
    pub role: String,
    pub content: String,
    pub timestamp: String,
}

impl From<ChatMessage> for ChatMessageResponse {
    fn from(message: ChatMessage) -> Self {
        Self {
            id: message.id.to_string(),
            role: message.role.as_str().to_string(),
            content: message.content,
            timestamp: message.timestamp.to_rfc3339(),
        }
    }
}

/// A chat and its turns
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub chat_id: String,
    pub messages: Vec<ChatMessageResponse>,
}

/// Chat history entry
#[derive(Debug, Serialize)]
pub struct ChatSummaryResponse {
    pub id: String,
    pub title: String,
    pub created_at: String,
    pub last_message_at: String,
    pub message_count: i32,
    pub first_message: Option<String>,
}

impl From<ChatSummary> for ChatSummaryResponse {
    fn from(summary: ChatSummary) -> Self {
        Self {
            id: summary.id.to_string(),
            title: summary.title,
            created_at: summary.created_at.to_rfc3339(),
            last_message_at: summary.last_message_at.to_rfc3339(),
            message_count: summary.message_count,
            first_message: summary.first_message,
        }
    }
}
