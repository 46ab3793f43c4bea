//! User Handlers

use axum::{
    extract::{Extension, State},
    Json,
};

use crate::application::dto::response::UserChatsResponse;
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Chats and folders of the current user
pub async fn get_user_chats(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<UserChatsResponse>, AppError> {
    let chats = state.chat_service.list_chats(&auth.user_id, None).await?;
    let folders = state.folder_service.list_folders(&auth.user_id).await?;

    Ok(Json(UserChatsResponse {
        user_id: auth.user_id,
        chats,
        folders,
    }))
}
