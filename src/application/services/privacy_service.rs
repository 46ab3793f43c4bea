//! Privacy Service
//!
//! Resolves whether a user's read receipts, last-seen time and online status
//! are visible to another user, and manages the settings behind it.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{
    ContactPrivacySettings, ContactPrivacyUpdate, PrivacyDefaultsUpdate, PrivacyRepository,
    PrivacySettings, VisibilityKind,
};
use crate::shared::error::AppError;

/// Privacy service trait
#[async_trait]
pub trait PrivacyService: Send + Sync {
    /// Get the user's settings, creating all-visible defaults on first access
    async fn get_settings(&self, user_id: &str) -> Result<PrivacySettingsDto, PrivacyError>;

    /// Merge new global defaults
    async fn update_settings(
        &self,
        user_id: &str,
        update: PrivacyDefaultsUpdate,
    ) -> Result<PrivacySettingsDto, PrivacyError>;

    /// Merge or append a per-contact override
    async fn update_contact_settings(
        &self,
        user_id: &str,
        update: ContactPrivacyUpdate,
    ) -> Result<PrivacySettingsDto, PrivacyError>;

    /// The override for a contact, or one derived from the global defaults
    async fn get_contact_settings(
        &self,
        user_id: &str,
        contact_id: &str,
    ) -> Result<ContactPrivacySettings, PrivacyError>;

    /// Whether `target_id`'s `kind` signal is visible to `viewer_id`
    async fn can_see(
        &self,
        kind: VisibilityKind,
        viewer_id: &str,
        target_id: &str,
    ) -> Result<bool, PrivacyError>;

    /// All three signals of `target_id` as seen by `viewer_id`
    async fn visibility(&self, viewer_id: &str, target_id: &str) -> Result<VisibilityDto, PrivacyError>;
}

/// Privacy settings data transfer object
#[derive(Debug, Clone, Serialize)]
pub struct PrivacySettingsDto {
    pub user_id: String,
    pub default_show_read_receipts: bool,
    pub default_show_last_seen: bool,
    pub default_show_online_status: bool,
    pub contact_settings: Vec<ContactPrivacySettings>,
    pub updated_at: DateTime<Utc>,
}

impl From<PrivacySettings> for PrivacySettingsDto {
    fn from(settings: PrivacySettings) -> Self {
        Self {
            user_id: settings.user_id,
            default_show_read_receipts: settings.default_show_read_receipts,
            default_show_last_seen: settings.default_show_last_seen,
            default_show_online_status: settings.default_show_online_status,
            contact_settings: settings.contact_settings,
            updated_at: settings.updated_at,
        }
    }
}

/// What a viewer may see of a target user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisibilityDto {
    pub viewer_id: String,
    pub target_id: String,
    pub read_receipts: bool,
    pub last_seen: bool,
    pub online_status: bool,
}

/// Privacy service errors
#[derive(Debug, thiserror::Error)]
pub enum PrivacyError {
    #[error("Invalid privacy settings: {0}")]
    Validation(String),

    #[error(transparent)]
    Storage(#[from] AppError),
}

/// Load a user's settings, inserting the defaults if none exist yet.
///
/// Concurrent first accesses converge on a single stored record.
pub async fn load_or_init_settings<P>(repo: &P, user_id: &str) -> Result<PrivacySettings, AppError>
where
    P: PrivacyRepository + ?Sized,
{
    if let Some(settings) = repo.find_by_user(user_id).await? {
        return Ok(settings);
    }

    tracing::debug!(user_id = %user_id, "Creating default privacy settings");
    repo.insert_if_absent(&PrivacySettings::defaults_for(user_id, Utc::now()))
        .await
}

/// Per-call cache of privacy settings used when filtering many readers.
pub struct VisibilityResolver<'a, P: PrivacyRepository> {
    repo: &'a P,
    cache: HashMap<String, PrivacySettings>,
}

impl<'a, P: PrivacyRepository> VisibilityResolver<'a, P> {
    pub fn new(repo: &'a P) -> Self {
        Self {
            repo,
            cache: HashMap::new(),
        }
    }

    /// Whether `target_id`'s `kind` signal is visible to `viewer_id`.
    ///
    /// Users always see their own signals.
    pub async fn resolve(
        &mut self,
        kind: VisibilityKind,
        viewer_id: &str,
        target_id: &str,
    ) -> Result<bool, AppError> {
        if viewer_id == target_id {
            return Ok(true);
        }

        if !self.cache.contains_key(target_id) {
            let settings = load_or_init_settings(self.repo, target_id).await?;
            self.cache.insert(target_id.to_string(), settings);
        }

        Ok(self
            .cache
            .get(target_id)
            .map(|settings| settings.shows_to(kind, viewer_id))
            .unwrap_or(true))
    }

    /// Keep only the readers whose read receipts the viewer may see.
    pub async fn filter_readers(
        &mut self,
        viewer_id: &str,
        readers: Vec<String>,
    ) -> Result<Vec<String>, AppError> {
        let mut visible = Vec::with_capacity(readers.len());
        for reader in readers {
            if self.resolve(VisibilityKind::ReadReceipt, viewer_id, &reader).await? {
                visible.push(reader);
            }
        }
        Ok(visible)
    }
}

/// PrivacyService implementation
pub struct PrivacyServiceImpl<P>
where
    P: PrivacyRepository,
{
    privacy_repo: Arc<P>,
}

impl<P> PrivacyServiceImpl<P>
where
    P: PrivacyRepository,
{
    pub fn new(privacy_repo: Arc<P>) -> Self {
        Self { privacy_repo }
    }
}

#[async_trait]
impl<P> PrivacyService for PrivacyServiceImpl<P>
where
    P: PrivacyRepository + 'static,
{
    async fn get_settings(&self, user_id: &str) -> Result<PrivacySettingsDto, PrivacyError> {
        let settings = load_or_init_settings(self.privacy_repo.as_ref(), user_id).await?;
        Ok(settings.into())
    }

    async fn update_settings(
        &self,
        user_id: &str,
        update: PrivacyDefaultsUpdate,
    ) -> Result<PrivacySettingsDto, PrivacyError> {
        let mut settings = load_or_init_settings(self.privacy_repo.as_ref(), user_id).await?;
        settings.apply_defaults(&update, Utc::now());

        let saved = self.privacy_repo.save(&settings).await?;
        tracing::info!(user_id = %user_id, "Privacy defaults updated");

        Ok(saved.into())
    }

    async fn update_contact_settings(
        &self,
        user_id: &str,
        update: ContactPrivacyUpdate,
    ) -> Result<PrivacySettingsDto, PrivacyError> {
        if update.contact_user_id.trim().is_empty() {
            return Err(PrivacyError::Validation("contact_user_id must not be empty".into()));
        }
        if update.contact_user_id == user_id {
            return Err(PrivacyError::Validation("Cannot set privacy overrides for yourself".into()));
        }

        let mut settings = load_or_init_settings(self.privacy_repo.as_ref(), user_id).await?;
        settings.apply_contact(&update, Utc::now());

        let saved = self.privacy_repo.save(&settings).await?;
        tracing::info!(
            user_id = %user_id,
            contact_id = %update.contact_user_id,
            "Contact privacy override updated"
        );

        Ok(saved.into())
    }

    async fn get_contact_settings(
        &self,
        user_id: &str,
        contact_id: &str,
    ) -> Result<ContactPrivacySettings, PrivacyError> {
        let settings = load_or_init_settings(self.privacy_repo.as_ref(), user_id).await?;
        Ok(settings.effective_contact(contact_id))
    }

    async fn can_see(
        &self,
        kind: VisibilityKind,
        viewer_id: &str,
        target_id: &str,
    ) -> Result<bool, PrivacyError> {
        let mut resolver = VisibilityResolver::new(self.privacy_repo.as_ref());
        Ok(resolver.resolve(kind, viewer_id, target_id).await?)
    }

    async fn visibility(&self, viewer_id: &str, target_id: &str) -> Result<VisibilityDto, PrivacyError> {
        let mut resolver = VisibilityResolver::new(self.privacy_repo.as_ref());

        Ok(VisibilityDto {
            viewer_id: viewer_id.to_string(),
            target_id: target_id.to_string(),
            read_receipts: resolver.resolve(VisibilityKind::ReadReceipt, viewer_id, target_id).await?,
            last_seen: resolver.resolve(VisibilityKind::LastSeen, viewer_id, target_id).await?,
            online_status: resolver.resolve(VisibilityKind::OnlineStatus, viewer_id, target_id).await?,
        })
    }
}
