//! Message Handlers
//!
//! Channel messages, multipart uploads and attachment downloads.

use axum::{
    extract::{Extension, Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::application::dto::request::EditMessageRequest;
use crate::application::dto::response::MessageResponse;
use crate::application::services::{SaveMessageDto, UploadedFile};
use crate::domain::MAX_MESSAGE_LENGTH;
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::validate_body;
use crate::startup::AppState;

/// Multipart field carrying the message text
const CONTENT_FIELD: &str = "content";
/// Multipart field carrying uploaded files; may repeat
const FILES_FIELD: &str = "files";

async fn ensure_channel_access(
    state: &AppState,
    channel_id: Uuid,
    user_id: Uuid,
) -> Result<(), AppError> {
    if !state.access.has_channel_access(channel_id, user_id).await? {
        return Err(AppError::Forbidden("No access to this channel".into()));
    }
    Ok(())
}

/// Get live messages of a channel, oldest first
pub async fn get_messages(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(channel_id): Path<Uuid>,
) -> Result<Json<Vec<MessageResponse>>, AppError> {
    ensure_channel_access(&state, channel_id, auth.user_id).await?;

    let messages = state.messages.get_channel_messages(channel_id).await?;

    Ok(Json(messages.into_iter().map(Into::into).collect()))
}

/// Post a message with optional attachments
pub async fn send_message(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(channel_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    ensure_channel_access(&state, channel_id, auth.user_id).await?;

    let mut content = String::new();
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            CONTENT_FIELD => {
                content = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Invalid content field: {e}")))?;
            }
            FILES_FIELD => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Invalid file field: {e}")))?;
                files.push(UploadedFile {
                    file_name,
                    bytes: bytes.to_vec(),
                });
            }
            _ => {}
        }
    }

    // Reject before anything reaches storage.
    if content.trim().is_empty() && files.is_empty() {
        return Err(AppError::BadRequest(
            "Message must have content or attachments".into(),
        ));
    }
    if content.chars().count() > MAX_MESSAGE_LENGTH {
        return Err(AppError::BadRequest(format!(
            "Message content too long (max {MAX_MESSAGE_LENGTH} characters)"
        )));
    }

    let message_id = Uuid::new_v4();
    let mut attachment_paths = Vec::with_capacity(files.len());
    for file in files {
        let path = state.messages.save_attachment(message_id, file).await?;
        attachment_paths.push(path);
    }

    let saved = state
        .messages
        .save_message(SaveMessageDto {
            id: message_id,
            channel_id,
            author_id: auth.user_id,
            content,
            attachment_paths,
        })
        .await?;

    tracing::info!(
        message_id = %message_id,
        channel_id = %channel_id,
        attachments = saved.attachments.len(),
        "Message posted"
    );

    Ok((StatusCode::CREATED, Json(saved.into())))
}

/// Edit the caller's own message
pub async fn edit_message(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(message_id): Path<Uuid>,
    Json(body): Json<EditMessageRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    validate_body(&body)?;

    if !state.access.is_message_author(message_id, auth.user_id).await? {
        return Err(AppError::Forbidden("Only the author can edit this message".into()));
    }

    let message = state.messages.edit_message(message_id, &body.content).await?;

    Ok(Json(message.into()))
}

/// Soft-delete a message (author, owner or admin)
pub async fn delete_message(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(message_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.access.can_delete_message(message_id, auth.user_id).await? {
        return Err(AppError::Forbidden("Cannot delete this message".into()));
    }

    state.messages.delete_message(message_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Download an attachment's bytes
pub async fn download_attachment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(attachment_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let (attachment, channel_id) = state.messages.get_attachment(attachment_id).await?;
    ensure_channel_access(&state, channel_id, auth.user_id).await?;

    let bytes = state.messages.read_attachment(&attachment).await?;
    let content_type = mime_guess::from_path(&attachment.file_name)
        .first_or_octet_stream()
        .to_string();
    let disposition = format!(
        "{}; filename=\"{}\"",
        if attachment.file_type.is_inline() { "inline" } else { "attachment" },
        attachment.file_name.replace(['"', '\\'], "_")
    );

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}
