//! Folder Service
//!
//! Per-user folders: the five built-in views plus custom chat lists.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::chat_service::ChatDto;
use crate::domain::{
    ChatRepository, Folder, FolderRepository, FolderType, FolderUpdate, MessageRepository,
};
use crate::shared::error::AppError;

/// Folder service trait
#[async_trait]
pub trait FolderService: Send + Sync {
    /// All folders of the user, creating the defaults on first access
    async fn list_folders(&self, user_id: &str) -> Result<Vec<FolderDto>, FolderError>;

    /// Create a folder
    async fn create_folder(&self, user_id: &str, request: CreateFolderDto) -> Result<FolderDto, FolderError>;

    /// Rename, re-icon or re-fill a folder
    async fn update_folder(
        &self,
        folder_id: Uuid,
        user_id: &str,
        update: FolderUpdate,
    ) -> Result<FolderDto, FolderError>;

    /// Delete a custom folder
    async fn delete_folder(&self, folder_id: Uuid, user_id: &str) -> Result<(), FolderError>;

    /// The chats a folder currently shows
    async fn folder_chats(&self, folder_id: Uuid, user_id: &str) -> Result<FolderContentsDto, FolderError>;
}

/// Create folder request
#[derive(Debug, Clone)]
pub struct CreateFolderDto {
    pub name: String,
    pub icon: Option<String>,
    pub folder_type: String,
    pub chat_ids: Vec<Uuid>,
}

/// Folder data transfer object
#[derive(Debug, Clone, Serialize)]
pub struct FolderDto {
    pub id: Uuid,
    pub name: String,
    pub icon: String,
    pub folder_type: FolderType,
    pub chat_ids: Vec<Uuid>,
    pub is_default: bool,
    pub order: i32,
    pub created_at: DateTime<Utc>,
}

impl From<Folder> for FolderDto {
    fn from(folder: Folder) -> Self {
        Self {
            id: folder.id,
            name: folder.name,
            icon: folder.icon,
            folder_type: folder.folder_type,
            chat_ids: folder.chat_ids,
            is_default: folder.is_default,
            order: folder.order,
            created_at: folder.created_at,
        }
    }
}

/// A folder with the chats it shows
#[derive(Debug, Clone, Serialize)]
pub struct FolderContentsDto {
    pub folder: FolderDto,
    pub chats: Vec<ChatDto>,
}

/// Folder service errors
#[derive(Debug, thiserror::Error)]
pub enum FolderError {
    #[error("Folder not found")]
    NotFound,

    #[error("Default folders cannot be deleted")]
    DefaultFolderImmutable,

    #[error("Invalid folder: {0}")]
    Validation(String),

    #[error(transparent)]
    Storage(#[from] AppError),
}

/// Icon for folders created without one
const CUSTOM_FOLDER_ICON: &str = "📁";

/// FolderService implementation
pub struct FolderServiceImpl<F, C, M>
where
    F: FolderRepository,
    C: ChatRepository,
    M: MessageRepository,
{
    folder_repo: Arc<F>,
    chat_repo: Arc<C>,
    message_repo: Arc<M>,
}

impl<F, C, M> FolderServiceImpl<F, C, M>
where
    F: FolderRepository,
    C: ChatRepository,
    M: MessageRepository,
{
    pub fn new(folder_repo: Arc<F>, chat_repo: Arc<C>, message_repo: Arc<M>) -> Self {
        Self {
            folder_repo,
            chat_repo,
            message_repo,
        }
    }

    /// The user's folders, seeding the defaults if the user has none yet.
    async fn ensure_folders(&self, user_id: &str) -> Result<Vec<Folder>, FolderError> {
        let folders = self.folder_repo.find_by_user(user_id).await?;
        if folders.iter().any(|f| f.is_default) {
            return Ok(folders);
        }

        tracing::info!(user_id = %user_id, "Creating default folders");
        self.folder_repo
            .insert_defaults(&Folder::defaults_for(user_id, Utc::now()))
            .await?;

        Ok(self.folder_repo.find_by_user(user_id).await?)
    }

    async fn owned_folder(&self, folder_id: Uuid, user_id: &str) -> Result<Folder, FolderError> {
        self.folder_repo
            .find_by_id(folder_id)
            .await?
            .filter(|f| f.user_id == user_id)
            .ok_or(FolderError::NotFound)
    }

    /// Reject chat ids the user cannot see.
    async fn check_chat_ids(&self, user_id: &str, chat_ids: &[Uuid]) -> Result<Vec<Uuid>, FolderError> {
        let mut visible = self.chat_repo.find_for_user(user_id, false).await?;
        visible.extend(self.chat_repo.find_for_user(user_id, true).await?);

        let mut checked = Vec::with_capacity(chat_ids.len());
        for id in chat_ids {
            if !visible.iter().any(|c| c.id == *id) {
                return Err(FolderError::Validation(format!("Unknown chat {id}")));
            }
            if !checked.contains(id) {
                checked.push(*id);
            }
        }
        Ok(checked)
    }
}

#[async_trait]
impl<F, C, M> FolderService for FolderServiceImpl<F, C, M>
where
    F: FolderRepository + 'static,
    C: ChatRepository + 'static,
    M: MessageRepository + 'static,
{
    async fn list_folders(&self, user_id: &str) -> Result<Vec<FolderDto>, FolderError> {
        let folders = self.ensure_folders(user_id).await?;
        Ok(folders.into_iter().map(FolderDto::from).collect())
    }

    async fn create_folder(&self, user_id: &str, request: CreateFolderDto) -> Result<FolderDto, FolderError> {
        let folder_type = FolderType::parse(&request.folder_type).ok_or_else(|| {
            FolderError::Validation(format!("Unknown folder type '{}'", request.folder_type))
        })?;

        let name = request.name.trim();
        if name.is_empty() {
            return Err(FolderError::Validation("Folder name must not be empty".into()));
        }
        if !folder_type.stores_chat_ids() && !request.chat_ids.is_empty() {
            return Err(FolderError::Validation(format!(
                "Folders of type '{folder_type}' cannot list chats"
            )));
        }

        let chat_ids = self.check_chat_ids(user_id, &request.chat_ids).await?;
        let existing = self.ensure_folders(user_id).await?;
        let order = existing.iter().map(|f| f.order).max().map_or(0, |max| max + 1);

        let folder = Folder {
            id: Uuid::now_v7(),
            user_id: user_id.to_string(),
            name: name.to_string(),
            folder_type,
            icon: request.icon.unwrap_or_else(|| CUSTOM_FOLDER_ICON.to_string()),
            chat_ids,
            is_default: false,
            order,
            created_at: Utc::now(),
        };

        let created = self.folder_repo.create(&folder).await?;
        tracing::info!(folder_id = %created.id, user_id = %user_id, "Folder created");

        Ok(created.into())
    }

    async fn update_folder(
        &self,
        folder_id: Uuid,
        user_id: &str,
        mut update: FolderUpdate,
    ) -> Result<FolderDto, FolderError> {
        let folder = self.owned_folder(folder_id, user_id).await?;

        if update.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(FolderError::Validation("Folder name must not be empty".into()));
        }
        if let Some(chat_ids) = update.chat_ids.take() {
            if !folder.folder_type.stores_chat_ids() {
                return Err(FolderError::Validation(format!(
                    "Folders of type '{}' cannot list chats",
                    folder.folder_type
                )));
            }
            update.chat_ids = Some(self.check_chat_ids(user_id, &chat_ids).await?);
        }

        let updated = self
            .folder_repo
            .update(folder_id, &update)
            .await?
            .ok_or(FolderError::NotFound)?;

        tracing::info!(folder_id = %folder_id, "Folder updated");

        Ok(updated.into())
    }

    async fn delete_folder(&self, folder_id: Uuid, user_id: &str) -> Result<(), FolderError> {
        let folder = self.owned_folder(folder_id, user_id).await?;

        if folder.is_default {
            return Err(FolderError::DefaultFolderImmutable);
        }

        self.folder_repo.delete(folder_id).await?;
        tracing::info!(folder_id = %folder_id, "Folder deleted");

        Ok(())
    }

    async fn folder_chats(&self, folder_id: Uuid, user_id: &str) -> Result<FolderContentsDto, FolderError> {
        let folder = self.owned_folder(folder_id, user_id).await?;

        let mut candidates = self.chat_repo.find_for_user(user_id, false).await?;
        if matches!(folder.folder_type, FolderType::Archived | FolderType::Custom) {
            candidates.extend(self.chat_repo.find_for_user(user_id, true).await?);
        }

        let mut chats = Vec::new();
        for chat in candidates {
            let unread = self.message_repo.count_unread(chat.id, user_id).await?;
            if folder.contains(&chat, unread) {
                chats.push(ChatDto::from_chat(chat, unread));
            }
        }

        Ok(FolderContentsDto {
            folder: folder.into(),
            chats,
        })
    }
}
