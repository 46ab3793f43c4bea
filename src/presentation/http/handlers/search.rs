//! Search Handlers

use axum::{
    extract::{Extension, Query, State},
    Json,
};

use crate::application::dto::request::SearchParams;
use crate::application::services::MessageDto;
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::validate_request;
use crate::startup::AppState;

/// Full-text search over the caller's chats
pub async fn search_messages(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<MessageDto>>, AppError> {
    validate_request(&params)?;

    let messages = state
        .message_service
        .search_messages(&auth.user_id, params.into())
        .await?;

    Ok(Json(messages))
}
