//! Chat Service
//!
//! Handles chat lifecycle: create, update, archive, join, leave, delete.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{
    AccessControl, Chat, ChatDetailsUpdate, ChatRepository, ChatType, MessageRepository, NewChat,
};
use crate::shared::error::AppError;

/// Chat service trait
#[async_trait]
pub trait ChatService: Send + Sync {
    /// Create a chat owned by `creator_id`
    async fn create_chat(&self, creator_id: &str, request: CreateChatDto) -> Result<ChatDto, ChatError>;

    /// Get a chat the user can access
    async fn get_chat(&self, chat_id: Uuid, user_id: &str) -> Result<ChatDto, ChatError>;

    /// Non-archived chats visible to the user, most recently active first
    async fn list_chats(&self, user_id: &str, chat_type: Option<ChatType>) -> Result<Vec<ChatDto>, ChatError>;

    /// Archived chats visible to the user
    async fn list_archived(&self, user_id: &str) -> Result<Vec<ChatDto>, ChatError>;

    /// Update name/description/avatar (admins and owner only)
    async fn update_chat(
        &self,
        chat_id: Uuid,
        user_id: &str,
        update: ChatDetailsUpdate,
    ) -> Result<ChatDto, ChatError>;

    /// Delete a chat and all of its messages (owner only)
    async fn delete_chat(&self, chat_id: Uuid, user_id: &str) -> Result<(), ChatError>;

    /// Join a chat. Returns false if the user was already a member.
    async fn join_chat(&self, chat_id: Uuid, user_id: &str) -> Result<bool, ChatError>;

    /// Leave a chat
    async fn leave_chat(&self, chat_id: Uuid, user_id: &str) -> Result<(), ChatError>;

    /// Archive or unarchive a chat
    async fn set_archived(&self, chat_id: Uuid, user_id: &str, archived: bool) -> Result<(), ChatError>;
}

/// Create chat request
#[derive(Debug, Clone)]
pub struct CreateChatDto {
    pub name: String,
    pub chat_type: ChatType,
    pub description: Option<String>,
    pub avatar: Option<String>,
    pub participants: Vec<String>,
    pub is_public: bool,
}

impl From<CreateChatDto> for NewChat {
    fn from(dto: CreateChatDto) -> Self {
        Self {
            name: dto.name,
            chat_type: dto.chat_type,
            description: dto.description,
            avatar: dto.avatar,
            participants: dto.participants,
            is_public: dto.is_public,
        }
    }
}

/// Chat data transfer object
///
/// `unread_count` is relative to the requesting user.
#[derive(Debug, Clone, Serialize)]
pub struct ChatDto {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub chat_type: ChatType,
    pub description: Option<String>,
    pub avatar: Option<String>,
    pub participants: Vec<String>,
    pub members: Vec<String>,
    pub admins: Vec<String>,
    pub owner: Option<String>,
    pub subscribers_count: i64,
    pub bot_commands: Vec<String>,
    pub bot_description: Option<String>,
    pub is_public: bool,
    pub is_verified: bool,
    pub is_archived: bool,
    pub last_message: Option<String>,
    pub last_message_time: Option<DateTime<Utc>>,
    pub unread_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChatDto {
    pub fn from_chat(chat: Chat, unread_count: i64) -> Self {
        Self {
            id: chat.id,
            name: chat.name,
            chat_type: chat.chat_type,
            description: chat.description,
            avatar: chat.avatar,
            participants: chat.participants,
            members: chat.members,
            admins: chat.admins,
            owner: chat.owner,
            subscribers_count: chat.subscribers_count,
            bot_commands: chat.bot_commands,
            bot_description: chat.bot_description,
            is_public: chat.is_public,
            is_verified: chat.is_verified,
            is_archived: chat.is_archived,
            last_message: chat.last_message,
            last_message_time: chat.last_message_time,
            unread_count,
            created_at: chat.created_at,
            updated_at: chat.updated_at,
        }
    }
}

/// Chat service errors
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Chat not found")]
    NotFound,

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Cannot join this chat")]
    NotJoinable,

    #[error("Cannot leave this chat")]
    OwnerCannotLeave,

    #[error("Invalid chat: {0}")]
    Validation(String),

    #[error(transparent)]
    Storage(#[from] AppError),
}

/// ChatService implementation
pub struct ChatServiceImpl<C, M>
where
    C: ChatRepository,
    M: MessageRepository,
{
    chat_repo: Arc<C>,
    message_repo: Arc<M>,
}

impl<C, M> ChatServiceImpl<C, M>
where
    C: ChatRepository,
    M: MessageRepository,
{
    pub fn new(chat_repo: Arc<C>, message_repo: Arc<M>) -> Self {
        Self {
            chat_repo,
            message_repo,
        }
    }

    /// Load a chat the user can access. Absence and lack of access look the same.
    async fn accessible_chat(&self, chat_id: Uuid, user_id: &str) -> Result<Chat, ChatError> {
        let chat = self
            .chat_repo
            .find_by_id(chat_id)
            .await?
            .ok_or(ChatError::NotFound)?;

        if !AccessControl::can_access(&chat, user_id) {
            return Err(ChatError::NotFound);
        }

        Ok(chat)
    }

    async fn to_dtos(&self, chats: Vec<Chat>, user_id: &str) -> Result<Vec<ChatDto>, ChatError> {
        let mut dtos = Vec::with_capacity(chats.len());
        for chat in chats {
            let unread = self.message_repo.count_unread(chat.id, user_id).await?;
            dtos.push(ChatDto::from_chat(chat, unread));
        }
        Ok(dtos)
    }
}

#[async_trait]
impl<C, M> ChatService for ChatServiceImpl<C, M>
where
    C: ChatRepository + 'static,
    M: MessageRepository + 'static,
{
    async fn create_chat(&self, creator_id: &str, request: CreateChatDto) -> Result<ChatDto, ChatError> {
        if request.name.trim().is_empty() {
            return Err(ChatError::Validation("Chat name must not be empty".into()));
        }

        let chat = Chat::create(Uuid::now_v7(), creator_id, request.into(), Utc::now());
        let created = self.chat_repo.create(&chat).await?;

        tracing::info!(
            chat_id = %created.id,
            chat_type = %created.chat_type,
            creator_id = %creator_id,
            "Chat created"
        );

        Ok(ChatDto::from_chat(created, 0))
    }

    async fn get_chat(&self, chat_id: Uuid, user_id: &str) -> Result<ChatDto, ChatError> {
        let chat = self.accessible_chat(chat_id, user_id).await?;
        let unread = self.message_repo.count_unread(chat.id, user_id).await?;
        Ok(ChatDto::from_chat(chat, unread))
    }

    async fn list_chats(&self, user_id: &str, chat_type: Option<ChatType>) -> Result<Vec<ChatDto>, ChatError> {
        let mut chats = self.chat_repo.find_for_user(user_id, false).await?;
        if let Some(chat_type) = chat_type {
            chats.retain(|c| c.chat_type == chat_type);
        }

        tracing::debug!(user_id = %user_id, count = chats.len(), "Listed chats");
        self.to_dtos(chats, user_id).await
    }

    async fn list_archived(&self, user_id: &str) -> Result<Vec<ChatDto>, ChatError> {
        let chats = self.chat_repo.find_for_user(user_id, true).await?;
        self.to_dtos(chats, user_id).await
    }

    async fn update_chat(
        &self,
        chat_id: Uuid,
        user_id: &str,
        update: ChatDetailsUpdate,
    ) -> Result<ChatDto, ChatError> {
        let chat = self.accessible_chat(chat_id, user_id).await?;

        if !AccessControl::can_update(&chat, user_id) {
            return Err(ChatError::PermissionDenied);
        }
        if update.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(ChatError::Validation("Chat name must not be empty".into()));
        }

        let updated = self
            .chat_repo
            .update_details(chat_id, &update, Utc::now())
            .await?
            .ok_or(ChatError::NotFound)?;

        tracing::info!(chat_id = %chat_id, user_id = %user_id, "Chat updated");

        let unread = self.message_repo.count_unread(chat_id, user_id).await?;
        Ok(ChatDto::from_chat(updated, unread))
    }

    async fn delete_chat(&self, chat_id: Uuid, user_id: &str) -> Result<(), ChatError> {
        let chat = self.accessible_chat(chat_id, user_id).await?;

        if !AccessControl::can_delete_chat(&chat, user_id) {
            return Err(ChatError::PermissionDenied);
        }

        // Chat first: a failure here must leave the history intact.
        self.chat_repo.delete(chat_id).await?;
        let removed_messages = self.message_repo.delete_by_chat(chat_id).await?;

        tracing::info!(
            chat_id = %chat_id,
            removed_messages,
            "Chat deleted"
        );

        Ok(())
    }

    async fn join_chat(&self, chat_id: Uuid, user_id: &str) -> Result<bool, ChatError> {
        let chat = self
            .chat_repo
            .find_by_id(chat_id)
            .await?
            .ok_or(ChatError::NotFound)?;

        if !chat.is_joinable() {
            return Err(ChatError::NotJoinable);
        }
        if chat.is_member(user_id) {
            return Ok(false);
        }

        let added = self.chat_repo.add_member(chat_id, user_id, Utc::now()).await?;
        if added {
            tracing::info!(chat_id = %chat_id, user_id = %user_id, "User joined chat");
        }

        Ok(added)
    }

    async fn leave_chat(&self, chat_id: Uuid, user_id: &str) -> Result<(), ChatError> {
        let chat = self.accessible_chat(chat_id, user_id).await?;

        if chat.is_owner(user_id) {
            return Err(ChatError::OwnerCannotLeave);
        }

        let decrement_subscribers = match chat.chat_type {
            ChatType::Channel => true,
            ChatType::Private | ChatType::Group | ChatType::Bot => false,
        };

        self.chat_repo
            .remove_member(chat_id, user_id, decrement_subscribers, Utc::now())
            .await?;

        tracing::info!(chat_id = %chat_id, user_id = %user_id, "User left chat");

        Ok(())
    }

    async fn set_archived(&self, chat_id: Uuid, user_id: &str, archived: bool) -> Result<(), ChatError> {
        let chat = self.accessible_chat(chat_id, user_id).await?;

        if !AccessControl::can_archive(&chat, user_id) {
            return Err(ChatError::PermissionDenied);
        }

        if !self.chat_repo.set_archived(chat_id, archived, Utc::now()).await? {
            return Err(ChatError::NotFound);
        }

        tracing::info!(chat_id = %chat_id, archived, "Chat archive state changed");

        Ok(())
    }
}
