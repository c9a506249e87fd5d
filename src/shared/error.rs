//! Application Error Types
//!
//! Centralized error handling with Axum integration.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::application::services::{AccessError, AuthError, ChatError, MessageError, ServerError};

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Upstream unavailable: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

/// Field-level validation error
#[derive(Debug, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, 10001, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, 10002, msg.clone()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, 10003, msg.clone()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, 10004, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, 10005, msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, 10007, msg.clone()),
            AppError::Upstream(msg) => {
                tracing::warn!("Upstream failure: {}", msg);
                (StatusCode::BAD_GATEWAY, 10008, "Completion service unavailable".into())
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, 10000, "Internal server error".into())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, 10000, "Internal server error".into())
            }
        };

        let body = ErrorResponse {
            code,
            message,
            errors: None,
        };

        (status, Json(body)).into_response()
    }
}

impl From<AccessError> for AppError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::ChannelNotFound => AppError::NotFound("Channel not found".into()),
            AccessError::MessageNotFound => AppError::NotFound("Message not found".into()),
            AccessError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<MessageError> for AppError {
    fn from(err: MessageError) -> Self {
        match err {
            MessageError::NotFound => AppError::NotFound("Message not found".into()),
            MessageError::AttachmentNotFound => AppError::NotFound("Attachment not found".into()),
            MessageError::EmptyMessage => {
                AppError::BadRequest("Message must have content or attachments".into())
            }
            MessageError::ContentTooLong => {
                AppError::BadRequest("Message content too long (max 2000 characters)".into())
            }
            e => AppError::Internal(e.to_string()),
        }
    }
}

impl From<ChatError> for AppError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::EmptyMessage => AppError::BadRequest("Message cannot be empty".into()),
            ChatError::Completion(msg) => AppError::Upstream(msg),
            ChatError::CompletionTimeout => AppError::Upstream("completion timed out".into()),
            ChatError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<ServerError> for AppError {
    fn from(err: ServerError) -> Self {
        match err {
            ServerError::NotFound => AppError::NotFound("Server not found".into()),
            ServerError::ChannelNotFound => AppError::NotFound("Channel not found".into()),
            ServerError::CategoryNotFound => AppError::NotFound("Category not found".into()),
            ServerError::Forbidden => AppError::Forbidden("Permission denied".into()),
            ServerError::AlreadyMember => {
                AppError::Conflict("Already a member of this server".into())
            }
            ServerError::ChannelNotPrivate => {
                AppError::BadRequest("Channel is not private".into())
            }
            ServerError::TargetNotMember => {
                AppError::BadRequest("User is not a member of this server".into())
            }
            ServerError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => AppError::Unauthorized("Invalid credentials".into()),
            AuthError::TokenExpired => AppError::Unauthorized("Token expired".into()),
            AuthError::InvalidToken => AppError::Unauthorized("Invalid token".into()),
            AuthError::UserNotFound => AppError::NotFound("User not found".into()),
            AuthError::EmailExists => AppError::Conflict("Email already registered".into()),
            AuthError::UsernameExists => AppError::Conflict("Username already taken".into()),
            AuthError::Internal(msg) => AppError::Internal(msg),
        }
    }
}
