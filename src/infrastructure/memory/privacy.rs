use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::domain::{PrivacyRepository, PrivacySettings};
use crate::shared::error::AppError;

/// Privacy records keyed by user id.
#[derive(Default)]
pub struct InMemoryPrivacyRepository {
    settings: RwLock<HashMap<String, PrivacySettings>>,
}

impl InMemoryPrivacyRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PrivacyRepository for InMemoryPrivacyRepository {
    async fn find_by_user(&self, user_id: &str) -> Result<Option<PrivacySettings>, AppError> {
        Ok(self.settings.read().get(user_id).cloned())
    }

    async fn insert_if_absent(&self, settings: &PrivacySettings) -> Result<PrivacySettings, AppError> {
        Ok(self
            .settings
            .write()
            .entry(settings.user_id.clone())
            .or_insert_with(|| settings.clone())
            .clone())
    }

    async fn save(&self, settings: &PrivacySettings) -> Result<PrivacySettings, AppError> {
        self.settings
            .write()
            .insert(settings.user_id.clone(), settings.clone());
        Ok(settings.clone())
    }
}
