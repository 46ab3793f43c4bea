//! Privacy Handlers

use axum::{
    extract::{Extension, Path, State},
    Json,
};

use crate::application::dto::request::{UpdateContactPrivacyRequest, UpdatePrivacyRequest};
use crate::application::services::{PrivacyError, PrivacySettingsDto, VisibilityDto};
use crate::domain::ContactPrivacySettings;
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::validate_request;
use crate::startup::AppState;

impl From<PrivacyError> for AppError {
    fn from(e: PrivacyError) -> Self {
        match e {
            PrivacyError::Validation(msg) => AppError::Validation(msg),
            PrivacyError::Storage(e) => e,
        }
    }
}

/// Get the caller's privacy settings
pub async fn get_privacy_settings(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<PrivacySettingsDto>, AppError> {
    let settings = state.privacy_service.get_settings(&auth.user_id).await?;
    Ok(Json(settings))
}

/// Update global visibility defaults
pub async fn update_privacy_settings(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<UpdatePrivacyRequest>,
) -> Result<Json<PrivacySettingsDto>, AppError> {
    let settings = state
        .privacy_service
        .update_settings(&auth.user_id, body.into())
        .await?;

    Ok(Json(settings))
}

/// Create or merge a per-contact override
pub async fn update_contact_privacy(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<UpdateContactPrivacyRequest>,
) -> Result<Json<PrivacySettingsDto>, AppError> {
    validate_request(&body)?;

    let settings = state
        .privacy_service
        .update_contact_settings(&auth.user_id, body.into())
        .await?;

    Ok(Json(settings))
}

/// Effective settings toward one contact
pub async fn get_contact_privacy(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(contact_id): Path<String>,
) -> Result<Json<ContactPrivacySettings>, AppError> {
    let contact = state
        .privacy_service
        .get_contact_settings(&auth.user_id, &contact_id)
        .await?;

    Ok(Json(contact))
}

/// What the caller may see of another user
pub async fn get_visibility(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(target_id): Path<String>,
) -> Result<Json<VisibilityDto>, AppError> {
    let visibility = state
        .privacy_service
        .visibility(&auth.user_id, &target_id)
        .await?;

    Ok(Json(visibility))
}
