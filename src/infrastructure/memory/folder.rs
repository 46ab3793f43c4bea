use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::domain::{Folder, FolderRepository, FolderUpdate};
use crate::shared::error::AppError;

/// Folders keyed by id behind a single lock, so seeding the defaults is one
/// check-and-insert step.
#[derive(Default)]
pub struct InMemoryFolderRepository {
    folders: RwLock<HashMap<Uuid, Folder>>,
}

impl InMemoryFolderRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FolderRepository for InMemoryFolderRepository {
    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Folder>, AppError> {
        let mut folders: Vec<Folder> = self
            .folders
            .read()
            .values()
            .filter(|f| f.user_id == user_id)
            .cloned()
            .collect();
        folders.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.created_at.cmp(&b.created_at)));
        Ok(folders)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Folder>, AppError> {
        Ok(self.folders.read().get(&id).cloned())
    }

    async fn insert_defaults(&self, defaults: &[Folder]) -> Result<(), AppError> {
        let mut folders = self.folders.write();
        for folder in defaults {
            let exists = folders.values().any(|f| {
                f.is_default && f.user_id == folder.user_id && f.folder_type == folder.folder_type
            });
            if !exists {
                folders.insert(folder.id, folder.clone());
            }
        }
        Ok(())
    }

    async fn create(&self, folder: &Folder) -> Result<Folder, AppError> {
        self.folders.write().insert(folder.id, folder.clone());
        Ok(folder.clone())
    }

    async fn update(&self, id: Uuid, update: &FolderUpdate) -> Result<Option<Folder>, AppError> {
        let mut folders = self.folders.write();
        let Some(folder) = folders.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = &update.name {
            folder.name = name.clone();
        }
        if let Some(icon) = &update.icon {
            folder.icon = icon.clone();
        }
        if let Some(chat_ids) = &update.chat_ids {
            folder.chat_ids = chat_ids.clone();
        }
        Ok(Some(folder.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.folders.write().remove(&id).is_some())
    }
}
