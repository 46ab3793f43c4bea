//! Chat Handlers

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};

use super::parse_id;
use crate::application::dto::request::{
    ArchiveRequest, ChatListQuery, CreateChatRequest, MarkReadRequest, UpdateChatRequest,
};
use crate::application::dto::response::{ActionResponse, MarkReadResponse};
use crate::application::services::{ChatDto, ChatError, CreateChatDto};
use crate::domain::ChatType;
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::validate_request;
use crate::startup::AppState;

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        match e {
            // Callers cannot tell a hidden chat from a missing one
            ChatError::NotFound | ChatError::PermissionDenied => {
                AppError::NotFound("Chat not found".into())
            }
            ChatError::NotJoinable => AppError::BadRequest("This chat cannot be joined".into()),
            ChatError::OwnerCannotLeave => {
                AppError::BadRequest("The owner cannot leave the chat".into())
            }
            ChatError::Validation(msg) => AppError::Validation(msg),
            ChatError::Storage(e) => e,
        }
    }
}

fn parse_chat_type(raw: &str) -> Result<ChatType, AppError> {
    ChatType::parse(raw).ok_or_else(|| AppError::Validation(format!("Unknown chat type: {}", raw)))
}

/// Create a new chat
pub async fn create_chat(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<CreateChatRequest>,
) -> Result<(StatusCode, Json<ChatDto>), AppError> {
    validate_request(&body)?;

    let request = CreateChatDto {
        chat_type: parse_chat_type(&body.chat_type)?,
        name: body.name,
        description: body.description,
        avatar: body.avatar,
        participants: body.participants,
        is_public: body.is_public,
    };

    let chat = state.chat_service.create_chat(&auth.user_id, request).await?;

    Ok((StatusCode::CREATED, Json(chat)))
}

/// List non-archived chats, optionally of one type
pub async fn list_chats(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<ChatListQuery>,
) -> Result<Json<Vec<ChatDto>>, AppError> {
    let chat_type = query.chat_type.as_deref().map(parse_chat_type).transpose()?;

    let chats = state.chat_service.list_chats(&auth.user_id, chat_type).await?;

    Ok(Json(chats))
}

/// List archived chats
pub async fn list_archived_chats(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<ChatDto>>, AppError> {
    let chats = state.chat_service.list_archived(&auth.user_id).await?;
    Ok(Json(chats))
}

/// Get chat by ID
pub async fn get_chat(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(chat_id): Path<String>,
) -> Result<Json<ChatDto>, AppError> {
    let chat_id = parse_id(&chat_id, "chat")?;

    let chat = state.chat_service.get_chat(chat_id, &auth.user_id).await?;

    Ok(Json(chat))
}

/// Update chat details
pub async fn update_chat(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(chat_id): Path<String>,
    Json(body): Json<UpdateChatRequest>,
) -> Result<Json<ChatDto>, AppError> {
    let chat_id = parse_id(&chat_id, "chat")?;
    validate_request(&body)?;

    let chat = state
        .chat_service
        .update_chat(chat_id, &auth.user_id, body.into())
        .await?;

    Ok(Json(chat))
}

/// Delete chat and its messages
pub async fn delete_chat(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(chat_id): Path<String>,
) -> Result<Json<ActionResponse>, AppError> {
    let chat_id = parse_id(&chat_id, "chat")?;

    state.chat_service.delete_chat(chat_id, &auth.user_id).await?;

    Ok(Json(ActionResponse::ok("Chat deleted")))
}

/// Join a group, channel or public bot
pub async fn join_chat(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(chat_id): Path<String>,
) -> Result<Json<ActionResponse>, AppError> {
    let chat_id = parse_id(&chat_id, "chat")?;

    let joined = state.chat_service.join_chat(chat_id, &auth.user_id).await?;

    let message = if joined { "Joined chat" } else { "Already a member" };
    Ok(Json(ActionResponse::ok(message)))
}

/// Leave a chat
pub async fn leave_chat(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(chat_id): Path<String>,
) -> Result<Json<ActionResponse>, AppError> {
    let chat_id = parse_id(&chat_id, "chat")?;

    state.chat_service.leave_chat(chat_id, &auth.user_id).await?;

    Ok(Json(ActionResponse::ok("Left chat")))
}

/// Archive or unarchive a chat
pub async fn archive_chat(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(chat_id): Path<String>,
    Json(body): Json<ArchiveRequest>,
) -> Result<Json<ActionResponse>, AppError> {
    let chat_id = parse_id(&chat_id, "chat")?;

    state
        .chat_service
        .set_archived(chat_id, &auth.user_id, body.archived)
        .await?;

    let message = if body.archived { "Chat archived" } else { "Chat unarchived" };
    Ok(Json(ActionResponse::ok(message)))
}

/// Mark messages of a chat as read
pub async fn mark_chat_read(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(chat_id): Path<String>,
    Json(body): Json<MarkReadRequest>,
) -> Result<Json<MarkReadResponse>, AppError> {
    let chat_id = parse_id(&chat_id, "chat")?;

    let updated = state
        .message_service
        .mark_read(chat_id, &auth.user_id, body.message_ids)
        .await?;

    Ok(Json(MarkReadResponse { updated }))
}
