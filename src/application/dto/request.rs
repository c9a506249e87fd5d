//! Request DTOs
//!
//! Data structures for API request bodies.

use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::application::services::{CreateCategoryDto, CreateChannelDto, CreateServerDto};

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Registration request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 2, max = 32, message = "Username must be 2-32 characters"))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Create server request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateServerRequest {
    #[validate(length(min = 3, max = 50, message = "Name must be 3-50 characters"))]
    pub name: String,

    #[validate(length(max = 200, message = "Description must be at most 200 characters"))]
    pub description: Option<String>,
}

impl From<CreateServerRequest> for CreateServerDto {
    fn from(req: CreateServerRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
        }
    }
}

/// Create channel request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateChannelRequest {
    #[validate(length(min = 3, max = 50, message = "Name must be 3-50 characters"))]
    pub name: String,

    #[validate(length(max = 200, message = "Description must be at most 200 characters"))]
    pub description: Option<String>,

    #[serde(default)]
    pub is_private: bool,

    pub category_id: Option<Uuid>,
}

impl From<CreateChannelRequest> for CreateChannelDto {
    fn from(req: CreateChannelRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
            is_private: req.is_private,
            category_id: req.category_id,
        }
    }
}

/// Add private channel member request
#[derive(Debug, Deserialize)]
pub struct AddChannelMemberRequest {
    pub user_id: Uuid,
}

/// Create category request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 50, message = "Name must be 1-50 characters"))]
    pub name: String,

    #[validate(range(min = 0, message = "Position must not be negative"))]
    pub position: Option<i32>,
}

impl From<CreateCategoryRequest> for CreateCategoryDto {
    fn from(req: CreateCategoryRequest) -> Self {
        Self {
            name: req.name,
            position: req.position,
        }
    }
}

/// Move a channel between categories; `null` removes it from its category
#[derive(Debug, Deserialize)]
pub struct UpdateChannelCategoryRequest {
    pub category_id: Option<Uuid>,
}

/// Edit message request
#[derive(Debug, Deserialize, Validate)]
pub struct EditMessageRequest {
    #[validate(length(min = 1, max = 2000, message = "Content must be 1-2000 characters"))]
    pub content: String,
}

/// AI chat message request, used both to start and to continue a chat
#[derive(Debug, Deserialize, Validate)]
pub struct ChatMessageRequest {
    #[validate(length(min = 1, max = 4000, message = "Message must be 1-4000 characters"))]
    pub message: String,
}
