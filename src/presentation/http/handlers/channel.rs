//! Channel Handlers

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::application::dto::request::{AddChannelMemberRequest, UpdateChannelCategoryRequest};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Grant a server member access to a private channel
pub async fn add_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(channel_id): Path<Uuid>,
    Json(body): Json<AddChannelMemberRequest>,
) -> Result<StatusCode, AppError> {
    state
        .servers
        .add_channel_member(channel_id, auth.user_id, body.user_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Move a channel into a category, or out of one with `null`
pub async fn update_category(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(channel_id): Path<Uuid>,
    Json(body): Json<UpdateChannelCategoryRequest>,
) -> Result<StatusCode, AppError> {
    state
        .servers
        .update_channel_category(channel_id, auth.user_id, body.category_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
