//! Message Handlers

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};

use super::parse_id;
use crate::application::dto::request::{
    ForwardRequest, MessageQueryParams, ReactionRequest, SendMessageRequest, UpdateMessageRequest,
};
use crate::application::dto::response::{ActionResponse, MarkReadResponse, ReactionsResponse};
use crate::application::services::{
    CreateMessageDto, ForwardReport, MessageDto, MessageError, SentMessageDto,
};
use crate::domain::MessageType;
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::validate_request;
use crate::startup::AppState;

impl From<MessageError> for AppError {
    fn from(e: MessageError) -> Self {
        match e {
            MessageError::NotFound | MessageError::PermissionDenied => {
                AppError::NotFound("Message not found".into())
            }
            MessageError::ChatNotFound => AppError::NotFound("Chat not found".into()),
            MessageError::Validation(msg) => AppError::Validation(msg),
            MessageError::Storage(e) => e,
        }
    }
}

/// Send a message to a chat
pub async fn send_message(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(chat_id): Path<String>,
    Json(body): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<SentMessageDto>), AppError> {
    let chat_id = parse_id(&chat_id, "chat")?;
    validate_request(&body)?;

    let message_type = match body.message_type.as_deref() {
        Some(raw) => MessageType::parse(raw)
            .ok_or_else(|| AppError::Validation(format!("Unknown message type: {}", raw)))?,
        None => MessageType::default(),
    };

    let request = CreateMessageDto {
        text: body.text,
        message_type,
        media_url: body.media_url,
        file_name: body.file_name,
        file_size: body.file_size,
        reply_to: body.reply_to,
        scheduled_for: body.scheduled_for,
    };

    let sent = state
        .message_service
        .send_message(chat_id, &auth.sender(), request)
        .await?;

    Ok((StatusCode::CREATED, Json(sent)))
}

/// Get messages from a chat
pub async fn get_messages(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(chat_id): Path<String>,
    Query(params): Query<MessageQueryParams>,
) -> Result<Json<Vec<MessageDto>>, AppError> {
    let chat_id = parse_id(&chat_id, "chat")?;

    let messages = state
        .message_service
        .get_messages(chat_id, &auth.user_id, params.into())
        .await?;

    Ok(Json(messages))
}

/// Get pinned messages of a chat
pub async fn get_pinned_messages(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(chat_id): Path<String>,
) -> Result<Json<Vec<MessageDto>>, AppError> {
    let chat_id = parse_id(&chat_id, "chat")?;

    let messages = state
        .message_service
        .get_pinned_messages(chat_id, &auth.user_id)
        .await?;

    Ok(Json(messages))
}

/// Get a single message
pub async fn get_message(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(message_id): Path<String>,
) -> Result<Json<MessageDto>, AppError> {
    let message_id = parse_id(&message_id, "message")?;

    let message = state
        .message_service
        .get_message(message_id, &auth.user_id)
        .await?;

    Ok(Json(message))
}

/// Edit a message
pub async fn update_message(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(message_id): Path<String>,
    Json(body): Json<UpdateMessageRequest>,
) -> Result<Json<MessageDto>, AppError> {
    let message_id = parse_id(&message_id, "message")?;
    validate_request(&body)?;

    let message = state
        .message_service
        .edit_message(message_id, &auth.user_id, body.into())
        .await?;

    Ok(Json(message))
}

/// Delete a message
pub async fn delete_message(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(message_id): Path<String>,
) -> Result<Json<ActionResponse>, AppError> {
    let message_id = parse_id(&message_id, "message")?;

    state
        .message_service
        .delete_message(message_id, &auth.user_id)
        .await?;

    Ok(Json(ActionResponse::ok("Message deleted")))
}

/// Mark a single message as read
pub async fn mark_message_read(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(message_id): Path<String>,
) -> Result<Json<MarkReadResponse>, AppError> {
    let message_id = parse_id(&message_id, "message")?;

    let updated = state
        .message_service
        .mark_message_read(message_id, &auth.user_id)
        .await?;

    Ok(Json(MarkReadResponse { updated }))
}

/// React to a message
pub async fn add_reaction(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(message_id): Path<String>,
    Json(body): Json<ReactionRequest>,
) -> Result<Json<ReactionsResponse>, AppError> {
    let message_id = parse_id(&message_id, "message")?;
    validate_request(&body)?;

    let reactions = state
        .message_service
        .add_reaction(message_id, &auth.user_id, &body.emoji)
        .await?;

    Ok(Json(ReactionsResponse {
        message_id,
        reactions,
    }))
}

/// Withdraw a reaction
pub async fn remove_reaction(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((message_id, emoji)): Path<(String, String)>,
) -> Result<Json<ReactionsResponse>, AppError> {
    let message_id = parse_id(&message_id, "message")?;

    let reactions = state
        .message_service
        .remove_reaction(message_id, &auth.user_id, &emoji)
        .await?;

    Ok(Json(ReactionsResponse {
        message_id,
        reactions,
    }))
}

/// Forward a message to other chats
pub async fn forward_message(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(message_id): Path<String>,
    Json(body): Json<ForwardRequest>,
) -> Result<Json<ForwardReport>, AppError> {
    let message_id = parse_id(&message_id, "message")?;
    validate_request(&body)?;

    let report = state
        .message_service
        .forward_message(message_id, &auth.sender(), body.into())
        .await?;

    Ok(Json(report))
}
