//! Chat entity and repository trait.
//!
//! Maps to the `chats` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::AppError;

/// Commands seeded into every newly created bot chat.
pub const DEFAULT_BOT_COMMANDS: [&str; 3] = ["/help", "/start", "/stop"];

/// Chat kinds.
///
/// The kind is fixed at creation. Membership rules differ per kind: private
/// chats track `participants`, every other kind tracks `members`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatType {
    /// One-to-one conversation
    Private,
    /// Multi-user conversation with admins and an owner
    Group,
    /// Broadcast channel, optionally public
    Channel,
    /// Conversation with a bot
    Bot,
}

impl ChatType {
    /// Parse the database/API string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "private" => Some(Self::Private),
            "group" => Some(Self::Group),
            "channel" => Some(Self::Channel),
            "bot" => Some(Self::Bot),
            _ => None,
        }
    }

    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::Group => "group",
            Self::Channel => "channel",
            Self::Bot => "bot",
        }
    }
}

impl std::fmt::Display for ChatType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A conversation container.
///
/// Maps to the `chats` table:
/// - id: UUID PRIMARY KEY
/// - chat_type: TEXT NOT NULL ('private' | 'group' | 'channel' | 'bot')
/// - participants / members / admins: TEXT[] NOT NULL DEFAULT '{}'
/// - owner: TEXT NULL
/// - subscribers_count: BIGINT NOT NULL DEFAULT 0
/// - last_message / last_message_time: denormalized cache, last write wins
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    pub id: Uuid,

    pub name: String,

    #[serde(rename = "type")]
    pub chat_type: ChatType,

    pub description: Option<String>,

    pub avatar: Option<String>,

    /// Private chats only
    pub participants: Vec<String>,

    /// Group, channel and bot chats
    pub members: Vec<String>,

    /// Always a subset of `members`
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

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for creating a chat.
#[derive(Debug, Clone)]
pub struct NewChat {
    pub name: String,
    pub chat_type: ChatType,
    pub description: Option<String>,
    pub avatar: Option<String>,
    /// Users to add alongside the creator
    pub participants: Vec<String>,
    pub is_public: bool,
}

/// Editable presentation fields of a chat.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatDetailsUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub avatar: Option<String>,
}

impl ChatDetailsUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.avatar.is_none()
    }
}

impl Chat {
    /// Build a new chat owned by `creator`.
    ///
    /// The creator always comes first in the membership list and duplicates
    /// among the requested users are dropped.
    pub fn create(id: Uuid, creator: &str, request: NewChat, now: DateTime<Utc>) -> Self {
        let users = unique_preserving_order(
            std::iter::once(creator.to_string()).chain(request.participants),
        );

        let mut chat = Self {
            id,
            name: request.name,
            chat_type: request.chat_type,
            description: request.description,
            avatar: request.avatar,
            participants: Vec::new(),
            members: Vec::new(),
            admins: Vec::new(),
            owner: None,
            subscribers_count: 0,
            bot_commands: Vec::new(),
            bot_description: None,
            is_public: request.is_public,
            is_verified: false,
            is_archived: false,
            last_message: None,
            last_message_time: None,
            created_at: now,
            updated_at: now,
        };

        match request.chat_type {
            ChatType::Private => {
                chat.participants = users;
            }
            ChatType::Group => {
                chat.members = users;
                chat.admins = vec![creator.to_string()];
                chat.owner = Some(creator.to_string());
            }
            ChatType::Channel => {
                chat.subscribers_count = users.len() as i64;
                chat.members = users;
                chat.admins = vec![creator.to_string()];
                chat.owner = Some(creator.to_string());
            }
            ChatType::Bot => {
                chat.members = users;
                chat.admins = vec![creator.to_string()];
                chat.owner = Some(creator.to_string());
                chat.is_verified = true;
                chat.bot_commands = DEFAULT_BOT_COMMANDS.iter().map(|c| c.to_string()).collect();
            }
        }

        chat
    }

    pub fn is_participant(&self, user_id: &str) -> bool {
        self.participants.iter().any(|p| p == user_id)
    }

    pub fn is_member(&self, user_id: &str) -> bool {
        self.members.iter().any(|m| m == user_id)
    }

    pub fn is_admin(&self, user_id: &str) -> bool {
        self.admins.iter().any(|a| a == user_id)
    }

    pub fn is_owner(&self, user_id: &str) -> bool {
        self.owner.as_deref() == Some(user_id)
    }

    /// Whether the user currently belongs to the chat, regardless of kind.
    pub fn has_membership(&self, user_id: &str) -> bool {
        match self.chat_type {
            ChatType::Private => self.is_participant(user_id),
            ChatType::Group | ChatType::Channel | ChatType::Bot => self.is_member(user_id),
        }
    }

    /// Whether non-members may join this chat.
    ///
    /// Private chats are closed even when flagged public: access to them
    /// goes through `participants`, which joining never touches.
    pub fn is_joinable(&self) -> bool {
        match self.chat_type {
            ChatType::Private => false,
            ChatType::Group | ChatType::Channel => true,
            ChatType::Bot => self.is_public,
        }
    }

    /// Apply a details update in place.
    pub fn apply_details(&mut self, update: ChatDetailsUpdate, now: DateTime<Utc>) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        if let Some(avatar) = update.avatar {
            self.avatar = Some(avatar);
        }
        self.updated_at = now;
    }
}

fn unique_preserving_order(users: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    users
        .into_iter()
        .filter(|u| seen.insert(u.clone()))
        .collect()
}

/// Repository trait for Chat data access operations.
///
/// Membership mutations are conditional single-row updates so concurrent
/// joins and leaves cannot double-count subscribers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatRepository: Send + Sync {
    /// Find a chat by ID.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Chat>, AppError>;

    /// Chats visible to the user (participant, member, or public channel),
    /// filtered by archive state and ordered by `updated_at` descending.
    async fn find_for_user(&self, user_id: &str, archived: bool) -> Result<Vec<Chat>, AppError>;

    /// Insert a new chat.
    async fn create(&self, chat: &Chat) -> Result<Chat, AppError>;

    /// Update name/description/avatar. Returns the updated chat.
    async fn update_details(
        &self,
        id: Uuid,
        update: &ChatDetailsUpdate,
        now: DateTime<Utc>,
    ) -> Result<Option<Chat>, AppError>;

    /// Set the archive flag. Returns false if the chat does not exist.
    async fn set_archived(&self, id: Uuid, archived: bool, now: DateTime<Utc>) -> Result<bool, AppError>;

    /// Delete a chat. Returns false if it did not exist.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    /// Add the user to `members` and bump `subscribers_count`, only if the
    /// user is not already a member. Returns whether the user was added.
    async fn add_member(&self, id: Uuid, user_id: &str, now: DateTime<Utc>) -> Result<bool, AppError>;

    /// Remove the user from members, participants and admins at once.
    ///
    /// When `decrement_subscribers` is set and the user was a member, the
    /// subscriber count drops by one (never below zero). Returns whether the
    /// user was removed from any list.
    async fn remove_member(
        &self,
        id: Uuid,
        user_id: &str,
        decrement_subscribers: bool,
        now: DateTime<Utc>,
    ) -> Result<bool, AppError>;

    /// Overwrite the last-message cache and `updated_at`.
    async fn update_last_message(&self, id: Uuid, text: &str, at: DateTime<Utc>) -> Result<(), AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn new_chat(chat_type: ChatType, participants: &[&str], is_public: bool) -> Chat {
        Chat::create(
            Uuid::now_v7(),
            "alice",
            NewChat {
                name: "test".into(),
                chat_type,
                description: None,
                avatar: None,
                participants: participants.iter().map(|p| p.to_string()).collect(),
                is_public,
            },
            Utc::now(),
        )
    }

    #[test]
    fn test_public_flag_does_not_open_private_chat() {
        assert!(!new_chat(ChatType::Private, &["bob"], true).is_joinable());
        assert!(new_chat(ChatType::Bot, &[], true).is_joinable());
        assert!(!new_chat(ChatType::Bot, &[], false).is_joinable());
    }

    #[test]
    fn test_private_chat_uses_participants() {
        let chat = new_chat(ChatType::Private, &["bob"], false);

        assert_eq!(chat.participants, vec!["alice", "bob"]);
        assert!(chat.members.is_empty());
        assert!(chat.admins.is_empty());
        assert_eq!(chat.owner, None);
    }

    #[test_case(ChatType::Group ; "group")]
    #[test_case(ChatType::Channel ; "channel")]
    #[test_case(ChatType::Bot ; "bot")]
    fn test_non_private_chat_has_owner_admin_member(chat_type: ChatType) {
        let chat = new_chat(chat_type, &["bob", "carol"], false);

        assert_eq!(chat.members, vec!["alice", "bob", "carol"]);
        assert_eq!(chat.admins, vec!["alice"]);
        assert_eq!(chat.owner.as_deref(), Some("alice"));
        assert!(chat.participants.is_empty());
        assert!(chat.admins.iter().all(|a| chat.is_member(a)));
    }

    #[test]
    fn test_channel_counts_initial_subscribers() {
        let chat = new_chat(ChatType::Channel, &["bob"], true);
        assert_eq!(chat.subscribers_count, 2);
        assert!(chat.is_public);
    }

    #[test]
    fn test_bot_chat_is_verified_with_commands() {
        let chat = new_chat(ChatType::Bot, &[], false);
        assert!(chat.is_verified);
        assert_eq!(chat.bot_commands, vec!["/help", "/start", "/stop"]);
    }

    #[test]
    fn test_duplicate_participants_are_dropped() {
        let chat = new_chat(ChatType::Group, &["alice", "bob", "bob"], false);
        assert_eq!(chat.members, vec!["alice", "bob"]);
    }

    #[test_case(ChatType::Private, false, false ; "private never joinable")]
    #[test_case(ChatType::Private, true, false ; "public private still not joinable")]
    #[test_case(ChatType::Group, false, true ; "group joinable")]
    #[test_case(ChatType::Channel, false, true ; "private channel joinable")]
    #[test_case(ChatType::Bot, false, false ; "bot not joinable")]
    #[test_case(ChatType::Bot, true, true ; "public bot joinable")]
    fn test_is_joinable(chat_type: ChatType, is_public: bool, expected: bool) {
        let chat = new_chat(chat_type, &[], is_public);
        assert_eq!(chat.is_joinable(), expected);
    }

    #[test]
    fn test_chat_type_round_trip_strings() {
        for t in [ChatType::Private, ChatType::Group, ChatType::Channel, ChatType::Bot] {
            assert_eq!(ChatType::parse(t.as_str()), Some(t));
        }
        assert_eq!(ChatType::parse("supergroup"), None);
    }

    #[test]
    fn test_apply_details_only_touches_given_fields() {
        let mut chat = new_chat(ChatType::Group, &[], false);
        chat.description = Some("old".into());

        chat.apply_details(
            ChatDetailsUpdate {
                name: Some("renamed".into()),
                ..Default::default()
            },
            Utc::now(),
        );

        assert_eq!(chat.name, "renamed");
        assert_eq!(chat.description.as_deref(), Some("old"));
    }
}
