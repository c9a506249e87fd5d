//! Authentication Handlers

use axum::{extract::{Extension, State}, http::StatusCode, Json};

use crate::application::dto::request::{LoginRequest, RegisterRequest};
use crate::application::dto::response::{AuthResponse, UserResponse};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::validate_body;
use crate::startup::AppState;

/// Register a new user
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    validate_body(&body)?;

    let (user, tokens) = state
        .auth
        .register(&body.username, &body.email, &body.password)
        .await?;

    Ok((StatusCode::CREATED, Json(AuthResponse::new(user, tokens))))
}

/// Login with credentials
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    validate_body(&body)?;

    let (user, tokens) = state.auth.login(&body.email, &body.password).await?;

    Ok(Json(AuthResponse::new(user, tokens)))
}

/// The authenticated user's profile
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<UserResponse>, AppError> {
    let user = state.auth.get_current_user(auth.user_id).await?;
    Ok(Json(user.into()))
}
