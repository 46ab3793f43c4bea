//! Folder entity and repository trait.
//!
//! Maps to the `folders` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::chat::{Chat, ChatType};
use crate::shared::error::AppError;

/// Folder kinds.
///
/// Every kind except `Custom` is a view computed from chat state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FolderType {
    All,
    Unread,
    Channels,
    Bots,
    Groups,
    Archived,
    Custom,
}

impl FolderType {
    /// Parse the database/API string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "all" => Some(Self::All),
            "unread" => Some(Self::Unread),
            "channels" => Some(Self::Channels),
            "bots" => Some(Self::Bots),
            "groups" => Some(Self::Groups),
            "archived" => Some(Self::Archived),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }

    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Unread => "unread",
            Self::Channels => "channels",
            Self::Bots => "bots",
            Self::Groups => "groups",
            Self::Archived => "archived",
            Self::Custom => "custom",
        }
    }

    /// Whether folders of this kind store an explicit chat list.
    pub fn stores_chat_ids(&self) -> bool {
        matches!(self, Self::Custom)
    }
}

impl std::fmt::Display for FolderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Built-in folders created for every user, in display order.
pub const DEFAULT_FOLDERS: [(FolderType, &str, &str); 5] = [
    (FolderType::All, "All Chats", "💬"),
    (FolderType::Unread, "Unread", "🔴"),
    (FolderType::Channels, "Channels", "📢"),
    (FolderType::Bots, "Bots", "🤖"),
    (FolderType::Groups, "Groups", "👥"),
];

/// A named view over a user's chats.
///
/// Maps to the `folders` table:
/// - id: UUID PRIMARY KEY
/// - user_id: TEXT NOT NULL
/// - folder_type: TEXT NOT NULL
/// - chat_ids: UUID[] NOT NULL DEFAULT '{}' (custom folders only)
/// - is_default: BOOLEAN NOT NULL
/// - position: INTEGER NOT NULL (display rank)
/// - UNIQUE (user_id, folder_type) WHERE is_default
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub folder_type: FolderType,
    pub icon: String,
    pub chat_ids: Vec<Uuid>,
    pub is_default: bool,
    pub order: i32,
    pub created_at: DateTime<Utc>,
}

impl Folder {
    /// The five built-in folders for a user.
    pub fn defaults_for(user_id: &str, now: DateTime<Utc>) -> Vec<Folder> {
        DEFAULT_FOLDERS
            .iter()
            .enumerate()
            .map(|(order, (folder_type, name, icon))| Folder {
                id: Uuid::now_v7(),
                user_id: user_id.to_string(),
                name: name.to_string(),
                folder_type: *folder_type,
                icon: icon.to_string(),
                chat_ids: Vec::new(),
                is_default: true,
                order: order as i32,
                created_at: now,
            })
            .collect()
    }

    /// Whether `chat` belongs in this folder.
    ///
    /// `unread_count` is the number of messages in the chat the folder owner
    /// has not read yet.
    pub fn contains(&self, chat: &Chat, unread_count: i64) -> bool {
        match self.folder_type {
            FolderType::All => !chat.is_archived,
            FolderType::Unread => !chat.is_archived && unread_count > 0,
            FolderType::Channels => !chat.is_archived && chat.chat_type == ChatType::Channel,
            FolderType::Bots => !chat.is_archived && chat.chat_type == ChatType::Bot,
            FolderType::Groups => !chat.is_archived && chat.chat_type == ChatType::Group,
            FolderType::Archived => chat.is_archived,
            FolderType::Custom => self.chat_ids.contains(&chat.id),
        }
    }
}

/// Fields that can change on an existing folder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FolderUpdate {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub chat_ids: Option<Vec<Uuid>>,
}

/// Repository trait for Folder data access operations.
#[async_trait]
pub trait FolderRepository: Send + Sync {
    /// All folders of a user, ordered by display rank.
    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Folder>, AppError>;

    /// Find a folder by ID.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Folder>, AppError>;

    /// Insert each default folder unless the user already has a default
    /// folder of that type. Safe under concurrent first access.
    async fn insert_defaults(&self, folders: &[Folder]) -> Result<(), AppError>;

    /// Insert a new folder.
    async fn create(&self, folder: &Folder) -> Result<Folder, AppError>;

    /// Update name/icon/chat_ids. Returns the updated folder.
    async fn update(&self, id: Uuid, update: &FolderUpdate) -> Result<Option<Folder>, AppError>;

    /// Delete a folder. Returns false if it did not exist.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::chat::NewChat;
    use pretty_assertions::assert_eq;

    fn chat(chat_type: ChatType) -> Chat {
        Chat::create(
            Uuid::now_v7(),
            "alice",
            NewChat {
                name: "c".into(),
                chat_type,
                description: None,
                avatar: None,
                participants: vec![],
                is_public: false,
            },
            Utc::now(),
        )
    }

    fn folder(folder_type: FolderType) -> Folder {
        Folder {
            id: Uuid::now_v7(),
            user_id: "alice".into(),
            name: "f".into(),
            folder_type,
            icon: "x".into(),
            chat_ids: vec![],
            is_default: false,
            order: 0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_defaults_are_five_in_fixed_order() {
        let folders = Folder::defaults_for("alice", Utc::now());

        let types: Vec<FolderType> = folders.iter().map(|f| f.folder_type).collect();
        assert_eq!(
            types,
            vec![
                FolderType::All,
                FolderType::Unread,
                FolderType::Channels,
                FolderType::Bots,
                FolderType::Groups
            ]
        );
        assert!(folders.iter().all(|f| f.is_default && f.user_id == "alice"));
        let orders: Vec<i32> = folders.iter().map(|f| f.order).collect();
        assert_eq!(orders, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_unknown_folder_type_is_rejected() {
        assert_eq!(FolderType::parse("favourites"), None);
        assert_eq!(FolderType::parse("Custom"), Some(FolderType::Custom));
    }

    #[test]
    fn test_type_views_follow_chat_state() {
        let channel = chat(ChatType::Channel);
        let group = chat(ChatType::Group);

        assert!(folder(FolderType::Channels).contains(&channel, 0));
        assert!(!folder(FolderType::Channels).contains(&group, 0));
        assert!(folder(FolderType::Groups).contains(&group, 0));
        assert!(folder(FolderType::All).contains(&group, 0));
        assert!(!folder(FolderType::Unread).contains(&group, 0));
        assert!(folder(FolderType::Unread).contains(&group, 3));
    }

    #[test]
    fn test_archived_chats_only_in_archived_view() {
        let mut group = chat(ChatType::Group);
        group.is_archived = true;

        assert!(folder(FolderType::Archived).contains(&group, 0));
        assert!(!folder(FolderType::All).contains(&group, 0));
        assert!(!folder(FolderType::Groups).contains(&group, 0));
    }

    #[test]
    fn test_custom_folder_uses_explicit_ids() {
        let group = chat(ChatType::Group);
        let mut custom = folder(FolderType::Custom);
        assert!(!custom.contains(&group, 0));

        custom.chat_ids.push(group.id);
        assert!(custom.contains(&group, 0));
    }
}
