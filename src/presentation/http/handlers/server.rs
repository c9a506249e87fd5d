//! Server Handlers
//!
//! Servers, their channel listings and categories.

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::application::dto::request::{
    CreateCategoryRequest, CreateChannelRequest, CreateServerRequest,
};
use crate::application::dto::response::{CategoryResponse, ChannelResponse, ServerResponse};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::validate_body;
use crate::startup::AppState;

/// Create a server owned by the caller
pub async fn create_server(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<CreateServerRequest>,
) -> Result<(StatusCode, Json<ServerResponse>), AppError> {
    validate_body(&body)?;

    let server = state.servers.create_server(auth.user_id, body.into()).await?;

    Ok((StatusCode::CREATED, Json(server.into())))
}

/// Servers the caller belongs to
pub async fn list_servers(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<ServerResponse>>, AppError> {
    let servers = state.servers.get_user_servers(auth.user_id).await?;
    Ok(Json(servers.into_iter().map(Into::into).collect()))
}

pub async fn join_server(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(server_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.servers.join_server(server_id, auth.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Channels of the server the caller can see
pub async fn list_channels(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(server_id): Path<Uuid>,
) -> Result<Json<Vec<ChannelResponse>>, AppError> {
    let channels = state
        .servers
        .get_server_channels(server_id, auth.user_id)
        .await?;

    Ok(Json(channels.into_iter().map(Into::into).collect()))
}

pub async fn create_channel(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(server_id): Path<Uuid>,
    Json(body): Json<CreateChannelRequest>,
) -> Result<(StatusCode, Json<ChannelResponse>), AppError> {
    validate_body(&body)?;

    let channel = state
        .servers
        .create_channel(server_id, auth.user_id, body.into())
        .await?;

    Ok((StatusCode::CREATED, Json(channel.into())))
}

pub async fn list_categories(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(server_id): Path<Uuid>,
) -> Result<Json<Vec<CategoryResponse>>, AppError> {
    let categories = state
        .servers
        .get_server_categories(server_id, auth.user_id)
        .await?;

    Ok(Json(categories.into_iter().map(Into::into).collect()))
}

pub async fn create_category(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(server_id): Path<Uuid>,
    Json(body): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<CategoryResponse>), AppError> {
    validate_body(&body)?;

    let category = state
        .servers
        .create_category(server_id, auth.user_id, body.into())
        .await?;

    Ok((StatusCode::CREATED, Json(category.into())))
}

/// Channels in a category the caller can see
pub async fn list_category_channels(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(category_id): Path<Uuid>,
) -> Result<Json<Vec<ChannelResponse>>, AppError> {
    let channels = state
        .servers
        .get_category_channels(category_id, auth.user_id)
        .await?;

    Ok(Json(channels.into_iter().map(Into::into).collect()))
}
