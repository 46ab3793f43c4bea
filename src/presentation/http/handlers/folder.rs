//! Folder Handlers

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};

use super::parse_id;
use crate::application::dto::request::{CreateFolderRequest, UpdateFolderRequest};
use crate::application::dto::response::ActionResponse;
use crate::application::services::{FolderContentsDto, FolderDto, FolderError};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::validate_request;
use crate::startup::AppState;

impl From<FolderError> for AppError {
    fn from(e: FolderError) -> Self {
        match e {
            FolderError::NotFound => AppError::NotFound("Folder not found".into()),
            FolderError::DefaultFolderImmutable => {
                AppError::BadRequest("Default folders cannot be deleted".into())
            }
            FolderError::Validation(msg) => AppError::Validation(msg),
            FolderError::Storage(e) => e,
        }
    }
}

/// List folders, creating the defaults on first access
pub async fn list_folders(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<FolderDto>>, AppError> {
    let folders = state.folder_service.list_folders(&auth.user_id).await?;
    Ok(Json(folders))
}

/// Create a folder
pub async fn create_folder(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<CreateFolderRequest>,
) -> Result<(StatusCode, Json<FolderDto>), AppError> {
    validate_request(&body)?;

    let folder = state
        .folder_service
        .create_folder(&auth.user_id, body.into())
        .await?;

    Ok((StatusCode::CREATED, Json(folder)))
}

/// Update a folder
pub async fn update_folder(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(folder_id): Path<String>,
    Json(body): Json<UpdateFolderRequest>,
) -> Result<Json<FolderDto>, AppError> {
    let folder_id = parse_id(&folder_id, "folder")?;
    validate_request(&body)?;

    let folder = state
        .folder_service
        .update_folder(folder_id, &auth.user_id, body.into())
        .await?;

    Ok(Json(folder))
}

/// Delete a custom folder
pub async fn delete_folder(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(folder_id): Path<String>,
) -> Result<Json<ActionResponse>, AppError> {
    let folder_id = parse_id(&folder_id, "folder")?;

    state
        .folder_service
        .delete_folder(folder_id, &auth.user_id)
        .await?;

    Ok(Json(ActionResponse::ok("Folder deleted")))
}

/// Chats currently shown by a folder
pub async fn get_folder_chats(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(folder_id): Path<String>,
) -> Result<Json<FolderContentsDto>, AppError> {
    let folder_id = parse_id(&folder_id, "folder")?;

    let contents = state
        .folder_service
        .folder_chats(folder_id, &auth.user_id)
        .await?;

    Ok(Json(contents))
}
