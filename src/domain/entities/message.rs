//! Message entity and repository trait.
//!
//! Maps to the `messages` and `message_reactions` tables in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::chat::ChatType;
use crate::shared::error::AppError;

/// Prefix that turns a bot-chat message into a command.
pub const BOT_COMMAND_MARKER: char = '/';

/// Placeholder used for the chat preview when a message carries no text.
pub const MEDIA_PREVIEW: &str = "Media";

/// Separator placed between a forward caption and the forwarded text.
pub const FORWARD_SEPARATOR: &str = "\n\n--- Forwarded message ---\n";

/// Message content kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    #[default]
    Text,
    Image,
    File,
    Audio,
    Video,
    Poll,
    System,
}

impl MessageType {
    /// Parse the database/API string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(Self::Text),
            "image" => Some(Self::Image),
            "file" => Some(Self::File),
            "audio" => Some(Self::Audio),
            "video" => Some(Self::Video),
            "poll" => Some(Self::Poll),
            "system" => Some(Self::System),
            _ => None,
        }
    }

    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::File => "file",
            Self::Audio => "audio",
            Self::Video => "video",
            Self::Poll => "poll",
            Self::System => "system",
        }
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Aggregated reaction for one emoji on a message.
///
/// `count` always equals `users.len()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    pub emoji: String,
    pub users: Vec<String>,
    pub count: u32,
}

impl Reaction {
    pub fn new(emoji: impl Into<String>, users: Vec<String>) -> Self {
        let count = users.len() as u32;
        Self {
            emoji: emoji.into(),
            users,
            count,
        }
    }
}

/// Add `user_id` to the `emoji` entry, creating the entry if needed.
///
/// Returns false when the user had already reacted with that emoji.
pub fn add_reaction(reactions: &mut Vec<Reaction>, emoji: &str, user_id: &str) -> bool {
    match reactions.iter_mut().find(|r| r.emoji == emoji) {
        Some(reaction) => {
            if reaction.users.iter().any(|u| u == user_id) {
                return false;
            }
            reaction.users.push(user_id.to_string());
            reaction.count = reaction.users.len() as u32;
            true
        }
        None => {
            reactions.push(Reaction::new(emoji, vec![user_id.to_string()]));
            true
        }
    }
}

/// Remove `user_id` from the `emoji` entry, pruning the entry once empty.
///
/// Returns false when the user had not reacted with that emoji.
pub fn remove_reaction(reactions: &mut Vec<Reaction>, emoji: &str, user_id: &str) -> bool {
    let Some(index) = reactions.iter().position(|r| r.emoji == emoji) else {
        return false;
    };

    let reaction = &mut reactions[index];
    let before = reaction.users.len();
    reaction.users.retain(|u| u != user_id);
    if reaction.users.len() == before {
        return false;
    }
    reaction.count = reaction.users.len() as u32;

    if reaction.count == 0 {
        reactions.remove(index);
    }
    true
}

/// A message in a chat.
///
/// Maps to the `messages` table:
/// - id: UUID PRIMARY KEY
/// - chat_id: UUID NOT NULL REFERENCES chats(id) ON DELETE CASCADE
/// - read_by: TEXT[] NOT NULL (initialised with the sender, only ever grows)
/// - is_deleted: BOOLEAN NOT NULL DEFAULT FALSE (soft delete)
/// - sent_at: TIMESTAMPTZ NOT NULL
///
/// Reactions live in `message_reactions`, one row per (message, emoji, user).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,

    pub chat_id: Uuid,

    pub sender_id: String,

    pub sender_name: String,

    pub text: Option<String>,

    pub message_type: MessageType,

    pub media_url: Option<String>,

    pub file_name: Option<String>,

    pub file_size: Option<i64>,

    /// Not validated for existence at write time
    pub reply_to: Option<Uuid>,

    /// Origin sender, set only on forwarded copies
    pub forwarded_from: Option<String>,

    pub is_edited: bool,

    pub edited_at: Option<DateTime<Utc>>,

    pub is_deleted: bool,

    pub is_pinned: bool,

    pub is_bot_command: bool,

    /// Computed once at creation, never re-evaluated
    pub is_scheduled: bool,

    pub scheduled_for: Option<DateTime<Utc>>,

    pub reactions: Vec<Reaction>,

    pub read_by: Vec<String>,

    pub timestamp: DateTime<Utc>,
}

/// Input for composing a message.
#[derive(Debug, Clone, Default)]
pub struct NewMessage {
    pub text: Option<String>,
    pub message_type: MessageType,
    pub media_url: Option<String>,
    pub file_name: Option<String>,
    pub file_size: Option<i64>,
    pub reply_to: Option<Uuid>,
    pub scheduled_for: Option<DateTime<Utc>>,
    pub forwarded_from: Option<String>,
}

/// Sender-editable fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageEdit {
    pub text: Option<String>,
    pub is_pinned: Option<bool>,
}

impl Message {
    /// Compose a new message for a chat of the given kind.
    pub fn compose(
        id: Uuid,
        chat_id: Uuid,
        chat_type: ChatType,
        sender_id: &str,
        sender_name: &str,
        request: NewMessage,
        now: DateTime<Utc>,
    ) -> Self {
        let is_scheduled = request.scheduled_for.is_some_and(|at| at > now);
        let is_bot_command = match chat_type {
            ChatType::Bot => request
                .text
                .as_deref()
                .is_some_and(|t| t.starts_with(BOT_COMMAND_MARKER)),
            ChatType::Private | ChatType::Group | ChatType::Channel => false,
        };

        Self {
            id,
            chat_id,
            sender_id: sender_id.to_string(),
            sender_name: sender_name.to_string(),
            text: request.text,
            message_type: request.message_type,
            media_url: request.media_url,
            file_name: request.file_name,
            file_size: request.file_size,
            reply_to: request.reply_to,
            forwarded_from: request.forwarded_from,
            is_edited: false,
            edited_at: None,
            is_deleted: false,
            is_pinned: false,
            is_bot_command,
            is_scheduled,
            scheduled_for: request.scheduled_for,
            reactions: Vec::new(),
            read_by: vec![sender_id.to_string()],
            timestamp: now,
        }
    }

    /// Shown in message lists: not deleted and not waiting to be sent.
    pub fn is_visible(&self) -> bool {
        !self.is_deleted && !self.is_scheduled
    }

    pub fn is_read_by(&self, user_id: &str) -> bool {
        self.read_by.iter().any(|u| u == user_id)
    }

    /// Add the user to `read_by`. Returns false if already present.
    pub fn mark_read_by(&mut self, user_id: &str) -> bool {
        if self.is_read_by(user_id) {
            return false;
        }
        self.read_by.push(user_id.to_string());
        true
    }

    /// Apply a sender edit in place.
    pub fn apply_edit(&mut self, edit: &MessageEdit, now: DateTime<Utc>) {
        if let Some(text) = &edit.text {
            self.text = Some(text.clone());
        }
        if let Some(pinned) = edit.is_pinned {
            self.is_pinned = pinned;
        }
        self.is_edited = true;
        self.edited_at = Some(now);
    }

    /// Text used for the chat's last-message preview.
    pub fn preview_text(&self) -> &str {
        self.text.as_deref().unwrap_or(MEDIA_PREVIEW)
    }
}

/// Text of a forwarded copy, with the optional caption prepended.
pub fn forwarded_text(caption: Option<&str>, original: Option<&str>) -> Option<String> {
    match caption.filter(|c| !c.trim().is_empty()) {
        Some(caption) => Some(format!(
            "{}{}{}",
            caption,
            FORWARD_SEPARATOR,
            original.unwrap_or_default()
        )),
        None => original.map(str::to_string),
    }
}

/// Lowercased word tokens used for full-text matching.
pub fn search_terms(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Whether every query term occurs as a word in `text`.
pub fn matches_search(text: &str, query: &str) -> bool {
    let terms = search_terms(query);
    if terms.is_empty() {
        return false;
    }
    let words = search_terms(text);
    terms.iter().all(|t| words.contains(t))
}

/// Full-text search request against the message store.
#[derive(Debug, Clone)]
pub struct MessageSearch {
    pub query: String,
    /// Chats the search may cover
    pub chat_ids: Vec<Uuid>,
    pub limit: i64,
}

/// Repository trait for Message data access operations.
///
/// Read-state and reaction mutations are atomic per message.
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Find a message by ID, reactions included.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Message>, AppError>;

    /// Visible messages of a chat (not deleted, not scheduled), newest first.
    ///
    /// - `before`: only messages strictly older than this timestamp
    async fn find_by_chat(
        &self,
        chat_id: Uuid,
        before: Option<DateTime<Utc>>,
        limit: i64,
    ) -> Result<Vec<Message>, AppError>;

    /// Pinned, non-deleted messages of a chat, oldest first.
    async fn find_pinned(&self, chat_id: Uuid) -> Result<Vec<Message>, AppError>;

    /// Insert a new message.
    async fn create(&self, message: &Message) -> Result<Message, AppError>;

    /// Apply a sender edit. Returns the updated message.
    async fn update(&self, id: Uuid, edit: &MessageEdit, now: DateTime<Utc>) -> Result<Option<Message>, AppError>;

    /// Set `is_deleted`. Returns false if the message does not exist.
    async fn soft_delete(&self, id: Uuid) -> Result<bool, AppError>;

    /// Physically remove every message of a chat.
    async fn delete_by_chat(&self, chat_id: Uuid) -> Result<u64, AppError>;

    /// Add the user to `read_by` of messages in the chat that lack it,
    /// restricted to `message_ids` when given. Returns the updated count.
    async fn mark_read(
        &self,
        chat_id: Uuid,
        user_id: &str,
        message_ids: Option<&[Uuid]>,
    ) -> Result<u64, AppError>;

    /// Number of visible messages in the chat the user has not read.
    async fn count_unread(&self, chat_id: Uuid, user_id: &str) -> Result<i64, AppError>;

    /// Add a reaction. Returns false if the user already used that emoji.
    async fn add_reaction(&self, id: Uuid, user_id: &str, emoji: &str) -> Result<bool, AppError>;

    /// Remove a reaction. Returns false if there was nothing to remove.
    ///
    /// Users within an entry always stay in reaction order. Entry order may
    /// differ between stores once an entry's first reactor withdraws: the
    /// in-memory store keeps the entry where it was, PostgreSQL re-sorts by
    /// the earliest remaining reaction.
    async fn remove_reaction(&self, id: Uuid, user_id: &str, emoji: &str) -> Result<bool, AppError>;

    /// Full-text search over non-deleted messages, newest first.
    async fn search(&self, search: &MessageSearch) -> Result<Vec<Message>, AppError>;
}
