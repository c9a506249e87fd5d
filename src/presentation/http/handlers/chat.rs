//! AI Chat Handlers

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::application::dto::request::ChatMessageRequest;
use crate::application::dto::response::{ChatMessageResponse, ChatResponse, ChatSummaryResponse};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::validate_body;
use crate::startup::AppState;

fn chat_not_found() -> AppError {
    AppError::NotFound("Chat not found".into())
}

/// Start a chat; responds with both turns
pub async fn create_chat(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<ChatMessageRequest>,
) -> Result<(StatusCode, Json<ChatResponse>), AppError> {
    validate_body(&body)?;

    let (chat_id, messages) = state.chats.create_new_chat(auth.user_id, &body.message).await?;

    Ok((
        StatusCode::CREATED,
        Json(ChatResponse {
            chat_id: chat_id.to_string(),
            messages: messages.into_iter().map(Into::into).collect(),
        }),
    ))
}

/// Continue a chat; responds with the assistant turn
pub async fn add_message(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(chat_id): Path<Uuid>,
    Json(body): Json<ChatMessageRequest>,
) -> Result<Json<ChatMessageResponse>, AppError> {
    validate_body(&body)?;

    let reply = state
        .chats
        .add_message(chat_id, auth.user_id, &body.message)
        .await?
        .ok_or_else(chat_not_found)?;

    Ok(Json(reply.into()))
}

pub async fn get_chat(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(chat_id): Path<Uuid>,
) -> Result<Json<ChatResponse>, AppError> {
    let messages = state
        .chats
        .get_chat(chat_id, auth.user_id)
        .await?
        .ok_or_else(chat_not_found)?;

    Ok(Json(ChatResponse {
        chat_id: chat_id.to_string(),
        messages: messages.into_iter().map(Into::into).collect(),
    }))
}

/// The caller's chats, most recently active first
pub async fn history(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<ChatSummaryResponse>>, AppError> {
    let chats = state.chats.get_chat_history(auth.user_id).await?;
    Ok(Json(chats.into_iter().map(Into::into).collect()))
}
