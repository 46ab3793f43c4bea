//! Message Service
//!
//! Handles message operations: send, list, edit, delete, read receipts,
//! reactions, forwarding and search.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use uuid::Uuid;

use super::privacy_service::VisibilityResolver;
use crate::domain::{
    forwarded_text, AccessControl, Chat, ChatRepository, Message, MessageEdit, MessageRepository,
    MessageSearch, MessageType, NewMessage, PrivacyRepository, Reaction,
};
use crate::shared::error::AppError;

/// Paging and size limits applied by the message service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageLimits {
    /// Page size when the caller gives none
    pub default_page_size: i64,
    /// Upper bound on a single page
    pub max_page_size: i64,
    /// Longest accepted message text, in characters
    pub max_text_length: usize,
    /// Upper bound on search hits
    pub search_limit: i64,
}

impl Default for MessageLimits {
    fn default() -> Self {
        Self {
            default_page_size: 50,
            max_page_size: 100,
            max_text_length: 4096,
            search_limit: 50,
        }
    }
}

/// Message service trait
#[async_trait]
pub trait MessageService: Send + Sync {
    /// Send a message to a chat
    async fn send_message(
        &self,
        chat_id: Uuid,
        sender: &Sender,
        request: CreateMessageDto,
    ) -> Result<SentMessageDto, MessageError>;

    /// Visible messages of a chat, oldest first
    async fn get_messages(
        &self,
        chat_id: Uuid,
        user_id: &str,
        query: MessageQueryDto,
    ) -> Result<Vec<MessageDto>, MessageError>;

    /// Get a single message
    async fn get_message(&self, message_id: Uuid, user_id: &str) -> Result<MessageDto, MessageError>;

    /// Pinned messages of a chat
    async fn get_pinned_messages(&self, chat_id: Uuid, user_id: &str) -> Result<Vec<MessageDto>, MessageError>;

    /// Edit a message (sender only)
    async fn edit_message(
        &self,
        message_id: Uuid,
        user_id: &str,
        edit: MessageEdit,
    ) -> Result<MessageDto, MessageError>;

    /// Soft-delete a message (sender, admins, owner)
    async fn delete_message(&self, message_id: Uuid, user_id: &str) -> Result<(), MessageError>;

    /// Mark messages of a chat as read. Without ids, every unread message is marked.
    async fn mark_read(
        &self,
        chat_id: Uuid,
        user_id: &str,
        message_ids: Option<Vec<Uuid>>,
    ) -> Result<u64, MessageError>;

    /// Mark a single message as read
    async fn mark_message_read(&self, message_id: Uuid, user_id: &str) -> Result<u64, MessageError>;

    /// React to a message. Returns the reactions after the change.
    async fn add_reaction(&self, message_id: Uuid, user_id: &str, emoji: &str) -> Result<Vec<Reaction>, MessageError>;

    /// Withdraw a reaction. Returns the reactions after the change.
    async fn remove_reaction(
        &self,
        message_id: Uuid,
        user_id: &str,
        emoji: &str,
    ) -> Result<Vec<Reaction>, MessageError>;

    /// Copy a message into other chats, best effort per target
    async fn forward_message(
        &self,
        message_id: Uuid,
        sender: &Sender,
        request: ForwardMessageDto,
    ) -> Result<ForwardReport, MessageError>;

    /// Full-text search over messages the user can see
    async fn search_messages(&self, user_id: &str, query: SearchQueryDto) -> Result<Vec<MessageDto>, MessageError>;
}

/// The authenticated author of an action
#[derive(Debug, Clone)]
pub struct Sender {
    pub id: String,
    pub name: String,
}

/// Create message request
#[derive(Debug, Clone, Default)]
pub struct CreateMessageDto {
    pub text: Option<String>,
    pub message_type: MessageType,
    pub media_url: Option<String>,
    pub file_name: Option<String>,
    pub file_size: Option<i64>,
    pub reply_to: Option<Uuid>,
    pub scheduled_for: Option<DateTime<Utc>>,
}

/// Message query parameters
#[derive(Debug, Clone, Default)]
pub struct MessageQueryDto {
    /// Only messages strictly older than this message
    pub before: Option<Uuid>,
    pub limit: Option<i64>,
}

/// Forward request
#[derive(Debug, Clone)]
pub struct ForwardMessageDto {
    pub target_chat_ids: Vec<Uuid>,
    pub caption: Option<String>,
}

/// Search request
#[derive(Debug, Clone)]
pub struct SearchQueryDto {
    pub query: String,
    pub chat_id: Option<Uuid>,
    pub limit: Option<i64>,
}

/// Message data transfer object
///
/// `read_by` only lists readers whose receipts the viewer may see.
#[derive(Debug, Clone, Serialize)]
pub struct MessageDto {
    pub id: Uuid,
    pub chat_id: Uuid,
    pub sender_id: String,
    pub sender_name: String,
    pub text: Option<String>,
    pub message_type: MessageType,
    pub media_url: Option<String>,
    pub file_name: Option<String>,
    pub file_size: Option<i64>,
    pub reply_to: Option<Uuid>,
    pub forwarded_from: Option<String>,
    pub is_edited: bool,
    pub edited_at: Option<DateTime<Utc>>,
    pub is_deleted: bool,
    pub is_pinned: bool,
    pub is_bot_command: bool,
    pub is_scheduled: bool,
    pub scheduled_for: Option<DateTime<Utc>>,
    pub reactions: Vec<Reaction>,
    pub read_by: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl From<Message> for MessageDto {
    fn from(message: Message) -> Self {
        Self {
            id: message.id,
            chat_id: message.chat_id,
            sender_id: message.sender_id,
            sender_name: message.sender_name,
            text: message.text,
            message_type: message.message_type,
            media_url: message.media_url,
            file_name: message.file_name,
            file_size: message.file_size,
            reply_to: message.reply_to,
            forwarded_from: message.forwarded_from,
            is_edited: message.is_edited,
            edited_at: message.edited_at,
            is_deleted: message.is_deleted,
            is_pinned: message.is_pinned,
            is_bot_command: message.is_bot_command,
            is_scheduled: message.is_scheduled,
            scheduled_for: message.scheduled_for,
            reactions: message.reactions,
            read_by: message.read_by,
            timestamp: message.timestamp,
        }
    }
}

/// A sent message with the message it replies to, when visible
#[derive(Debug, Clone, Serialize)]
pub struct SentMessageDto {
    pub message: MessageDto,
    pub reply_to_message: Option<MessageDto>,
}

/// Per-target failure of a forward
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForwardFailure {
    pub chat_id: Uuid,
    pub error: String,
}

/// Outcome of forwarding one message to many chats
#[derive(Debug, Clone, Default, Serialize)]
pub struct ForwardReport {
    pub successful_forwards: Vec<Uuid>,
    pub failed_forwards: Vec<ForwardFailure>,
    pub total_sent: usize,
    pub total_failed: usize,
}

/// Message service errors
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    #[error("Message not found")]
    NotFound,

    #[error("Chat not found")]
    ChatNotFound,

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Invalid message: {0}")]
    Validation(String),

    #[error(transparent)]
    Storage(#[from] AppError),
}

/// MessageService implementation
pub struct MessageServiceImpl<M, C, P>
where
    M: MessageRepository,
    C: ChatRepository,
    P: PrivacyRepository,
{
    message_repo: Arc<M>,
    chat_repo: Arc<C>,
    privacy_repo: Arc<P>,
    limits: MessageLimits,
}

impl<M, C, P> MessageServiceImpl<M, C, P>
where
    M: MessageRepository,
    C: ChatRepository,
    P: PrivacyRepository,
{
    pub fn new(message_repo: Arc<M>, chat_repo: Arc<C>, privacy_repo: Arc<P>) -> Self {
        Self {
            message_repo,
            chat_repo,
            privacy_repo,
            limits: MessageLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: MessageLimits) -> Self {
        self.limits = limits;
        self
    }

    async fn accessible_chat(&self, chat_id: Uuid, user_id: &str) -> Result<Chat, MessageError> {
        let chat = self
            .chat_repo
            .find_by_id(chat_id)
            .await?
            .ok_or(MessageError::ChatNotFound)?;

        if !AccessControl::can_access(&chat, user_id) {
            return Err(MessageError::ChatNotFound);
        }

        Ok(chat)
    }

    /// Load a message together with its chat, if the user can access the chat.
    async fn accessible_message(&self, message_id: Uuid, user_id: &str) -> Result<(Message, Chat), MessageError> {
        let message = self
            .message_repo
            .find_by_id(message_id)
            .await?
            .ok_or(MessageError::NotFound)?;

        let chat = self
            .chat_repo
            .find_by_id(message.chat_id)
            .await?
            .filter(|chat| AccessControl::can_access(chat, user_id))
            .ok_or(MessageError::NotFound)?;

        Ok((message, chat))
    }

    /// Convert messages for `viewer_id`, hiding read receipts they may not see.
    async fn present(&self, viewer_id: &str, messages: Vec<Message>) -> Result<Vec<MessageDto>, MessageError> {
        let mut resolver = VisibilityResolver::new(self.privacy_repo.as_ref());
        let mut dtos = Vec::with_capacity(messages.len());
        for mut message in messages {
            let readers = std::mem::take(&mut message.read_by);
            message.read_by = resolver.filter_readers(viewer_id, readers).await?;
            dtos.push(MessageDto::from(message));
        }
        Ok(dtos)
    }

    async fn present_one(&self, viewer_id: &str, message: Message) -> Result<MessageDto, MessageError> {
        self.present(viewer_id, vec![message])
            .await?
            .pop()
            .ok_or(MessageError::NotFound)
    }

    fn validate_text(&self, text: Option<&str>) -> Result<(), MessageError> {
        let max = self.limits.max_text_length;
        if text.is_some_and(|t| t.chars().count() > max) {
            return Err(MessageError::Validation(format!(
                "Message text exceeds {max} characters"
            )));
        }
        Ok(())
    }

    /// Insert a message into an accessible chat and refresh the chat's
    /// last-message cache unless it is scheduled.
    async fn create_in_chat(&self, chat: &Chat, sender: &Sender, request: NewMessage) -> Result<Message, MessageError> {
        let message = Message::compose(
            Uuid::now_v7(),
            chat.id,
            chat.chat_type,
            &sender.id,
            &sender.name,
            request,
            Utc::now(),
        );

        let created = self.message_repo.create(&message).await?;

        if !created.is_scheduled {
            self.chat_repo
                .update_last_message(chat.id, created.preview_text(), created.timestamp)
                .await?;
        }

        Ok(created)
    }

    async fn forward_to(
        &self,
        target_chat_id: Uuid,
        original: &Message,
        sender: &Sender,
        text: Option<String>,
    ) -> Result<Uuid, String> {
        let chat = match self.chat_repo.find_by_id(target_chat_id).await {
            Ok(Some(chat)) if AccessControl::can_access(&chat, &sender.id) => chat,
            Ok(_) => return Err("Chat not found or no access".to_string()),
            Err(e) => return Err(e.to_string()),
        };

        let request = NewMessage {
            text,
            message_type: original.message_type,
            media_url: original.media_url.clone(),
            file_name: original.file_name.clone(),
            file_size: original.file_size,
            forwarded_from: Some(original.sender_id.clone()),
            ..Default::default()
        };

        self.create_in_chat(&chat, sender, request)
            .await
            .map(|m| m.id)
            .map_err(|e| e.to_string())
    }
}

#[async_trait]
impl<M, C, P> MessageService for MessageServiceImpl<M, C, P>
where
    M: MessageRepository + 'static,
    C: ChatRepository + 'static,
    P: PrivacyRepository + 'static,
{
    async fn send_message(
        &self,
        chat_id: Uuid,
        sender: &Sender,
        request: CreateMessageDto,
    ) -> Result<SentMessageDto, MessageError> {
        self.validate_text(request.text.as_deref())?;

        let chat = self.accessible_chat(chat_id, &sender.id).await?;

        let created = self
            .create_in_chat(
                &chat,
                sender,
                NewMessage {
                    text: request.text,
                    message_type: request.message_type,
                    media_url: request.media_url,
                    file_name: request.file_name,
                    file_size: request.file_size,
                    reply_to: request.reply_to,
                    scheduled_for: request.scheduled_for,
                    forwarded_from: None,
                },
            )
            .await?;

        tracing::info!(
            message_id = %created.id,
            chat_id = %chat_id,
            sender_id = %sender.id,
            scheduled = created.is_scheduled,
            "Message sent"
        );

        let reply_to_message = match created.reply_to {
            Some(reply_id) => match self.accessible_message(reply_id, &sender.id).await {
                Ok((reply, _)) if reply.chat_id == chat_id => {
                    Some(self.present_one(&sender.id, reply).await?)
                }
                Ok(_) => None,
                Err(MessageError::NotFound) => None,
                Err(e) => return Err(e),
            },
            None => None,
        };

        Ok(SentMessageDto {
            message: self.present_one(&sender.id, created).await?,
            reply_to_message,
        })
    }

    async fn get_messages(
        &self,
        chat_id: Uuid,
        user_id: &str,
        query: MessageQueryDto,
    ) -> Result<Vec<MessageDto>, MessageError> {
        self.accessible_chat(chat_id, user_id).await?;

        let limit = query
            .limit
            .unwrap_or(self.limits.default_page_size)
            .clamp(1, self.limits.max_page_size);

        // An unknown cursor is ignored rather than rejected.
        let before = match query.before {
            Some(cursor) => self
                .message_repo
                .find_by_id(cursor)
                .await?
                .filter(|m| m.chat_id == chat_id)
                .map(|m| m.timestamp),
            None => None,
        };

        let mut messages = self.message_repo.find_by_chat(chat_id, before, limit).await?;
        messages.reverse();

        tracing::debug!(chat_id = %chat_id, count = messages.len(), "Fetched messages");

        self.present(user_id, messages).await
    }

    async fn get_message(&self, message_id: Uuid, user_id: &str) -> Result<MessageDto, MessageError> {
        let (message, _) = self.accessible_message(message_id, user_id).await?;
        self.present_one(user_id, message).await
    }

    async fn get_pinned_messages(&self, chat_id: Uuid, user_id: &str) -> Result<Vec<MessageDto>, MessageError> {
        self.accessible_chat(chat_id, user_id).await?;
        let messages = self.message_repo.find_pinned(chat_id).await?;
        self.present(user_id, messages).await
    }

    async fn edit_message(
        &self,
        message_id: Uuid,
        user_id: &str,
        edit: MessageEdit,
    ) -> Result<MessageDto, MessageError> {
        self.validate_text(edit.text.as_deref())?;

        let (message, _) = self.accessible_message(message_id, user_id).await?;

        if !AccessControl::can_edit_message(&message, user_id) {
            return Err(MessageError::PermissionDenied);
        }

        let updated = self
            .message_repo
            .update(message_id, &edit, Utc::now())
            .await?
            .ok_or(MessageError::NotFound)?;

        tracing::info!(message_id = %message_id, user_id = %user_id, "Message edited");

        self.present_one(user_id, updated).await
    }

    async fn delete_message(&self, message_id: Uuid, user_id: &str) -> Result<(), MessageError> {
        let (message, chat) = self.accessible_message(message_id, user_id).await?;

        if !AccessControl::can_delete_message(&chat, &message, user_id) {
            return Err(MessageError::PermissionDenied);
        }

        if message.is_deleted {
            return Ok(());
        }

        self.message_repo.soft_delete(message_id).await?;
        tracing::info!(message_id = %message_id, user_id = %user_id, "Message deleted");

        Ok(())
    }

    async fn mark_read(
        &self,
        chat_id: Uuid,
        user_id: &str,
        message_ids: Option<Vec<Uuid>>,
    ) -> Result<u64, MessageError> {
        self.accessible_chat(chat_id, user_id).await?;

        // An empty id list means the whole chat.
        let message_ids = message_ids.filter(|ids| !ids.is_empty());

        let updated = self
            .message_repo
            .mark_read(chat_id, user_id, message_ids.as_deref())
            .await?;

        tracing::debug!(chat_id = %chat_id, user_id = %user_id, updated, "Messages marked read");

        Ok(updated)
    }

    async fn mark_message_read(&self, message_id: Uuid, user_id: &str) -> Result<u64, MessageError> {
        let (message, chat) = self.accessible_message(message_id, user_id).await?;
        let ids = [message.id];

        Ok(self.message_repo.mark_read(chat.id, user_id, Some(&ids[..])).await?)
    }

    async fn add_reaction(&self, message_id: Uuid, user_id: &str, emoji: &str) -> Result<Vec<Reaction>, MessageError> {
        let emoji = emoji.trim();
        if emoji.is_empty() {
            return Err(MessageError::Validation("Emoji must not be empty".into()));
        }

        self.accessible_message(message_id, user_id).await?;
        self.message_repo.add_reaction(message_id, user_id, emoji).await?;

        let message = self
            .message_repo
            .find_by_id(message_id)
            .await?
            .ok_or(MessageError::NotFound)?;

        Ok(message.reactions)
    }

    async fn remove_reaction(
        &self,
        message_id: Uuid,
        user_id: &str,
        emoji: &str,
    ) -> Result<Vec<Reaction>, MessageError> {
        self.accessible_message(message_id, user_id).await?;
        self.message_repo.remove_reaction(message_id, user_id, emoji.trim()).await?;

        let message = self
            .message_repo
            .find_by_id(message_id)
            .await?
            .ok_or(MessageError::NotFound)?;

        Ok(message.reactions)
    }

    async fn forward_message(
        &self,
        message_id: Uuid,
        sender: &Sender,
        request: ForwardMessageDto,
    ) -> Result<ForwardReport, MessageError> {
        let (original, _) = self.accessible_message(message_id, &sender.id).await?;

        let text = forwarded_text(request.caption.as_deref(), original.text.as_deref());
        self.validate_text(text.as_deref())?;

        let mut seen = HashSet::new();
        let targets: Vec<Uuid> = request
            .target_chat_ids
            .into_iter()
            .filter(|id| seen.insert(*id))
            .collect();

        let outcomes = join_all(
            targets
                .iter()
                .map(|target| self.forward_to(*target, &original, sender, text.clone())),
        )
        .await;

        let mut report = ForwardReport::default();
        for (target, outcome) in targets.into_iter().zip(outcomes) {
            match outcome {
                Ok(_) => report.successful_forwards.push(target),
                Err(error) => {
                    tracing::warn!(
                        message_id = %message_id,
                        target_chat_id = %target,
                        error = %error,
                        "Forward to chat failed"
                    );
                    report.failed_forwards.push(ForwardFailure { chat_id: target, error });
                }
            }
        }
        report.total_sent = report.successful_forwards.len();
        report.total_failed = report.failed_forwards.len();

        tracing::info!(
            message_id = %message_id,
            total_sent = report.total_sent,
            total_failed = report.total_failed,
            "Message forwarded"
        );

        Ok(report)
    }

    async fn search_messages(&self, user_id: &str, query: SearchQueryDto) -> Result<Vec<MessageDto>, MessageError> {
        let text = query.query.trim();
        if text.is_empty() {
            return Err(MessageError::Validation("Search query must not be empty".into()));
        }

        let chat_ids = match query.chat_id {
            Some(chat_id) => vec![self.accessible_chat(chat_id, user_id).await?.id],
            None => {
                let mut chats = self.chat_repo.find_for_user(user_id, false).await?;
                chats.extend(self.chat_repo.find_for_user(user_id, true).await?);
                chats.into_iter().map(|c| c.id).collect()
            }
        };

        if chat_ids.is_empty() {
            return Ok(Vec::new());
        }

        let search = MessageSearch {
            query: text.to_string(),
            chat_ids,
            limit: query
                .limit
                .unwrap_or(self.limits.search_limit)
                .clamp(1, self.limits.search_limit.max(1)),
        };
        let messages = self.message_repo.search(&search).await?;

        tracing::debug!(user_id = %user_id, hits = messages.len(), "Message search");

        self.present(user_id, messages).await
    }
}
