//! Chat Repository Implementation
//!
//! PostgreSQL implementation of chat storage. Membership changes are single
//! conditional UPDATE statements so concurrent joins and leaves never
//! double-count subscribers.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Chat, ChatDetailsUpdate, ChatRepository, ChatType};
use crate::shared::error::AppError;

const CHAT_COLUMNS: &str = r#"
    id, name, chat_type, description, avatar, participants, members, admins, owner,
    subscribers_count, bot_commands, bot_description, is_public, is_verified, is_archived,
    last_message, last_message_time, created_at, updated_at
"#;

/// PostgreSQL chat repository implementation.
pub struct PgChatRepository {
    pool: PgPool,
}

impl PgChatRepository {
    /// Creates a new PgChatRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Internal row type for chat queries.
#[derive(Debug, sqlx::FromRow)]
struct ChatRow {
    id: Uuid,
    name: String,
    chat_type: String,
    description: Option<String>,
    avatar: Option<String>,
    participants: Vec<String>,
    members: Vec<String>,
    admins: Vec<String>,
    owner: Option<String>,
    subscribers_count: i64,
    bot_commands: Vec<String>,
    bot_description: Option<String>,
    is_public: bool,
    is_verified: bool,
    is_archived: bool,
    last_message: Option<String>,
    last_message_time: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ChatRow {
    /// Converts database row to domain Chat entity.
    fn into_chat(self) -> Result<Chat, AppError> {
        let chat_type = ChatType::parse(&self.chat_type).ok_or_else(|| {
            AppError::Internal(format!("Unknown chat type '{}' for chat {}", self.chat_type, self.id))
        })?;

        Ok(Chat {
            id: self.id,
            name: self.name,
            chat_type,
            description: self.description,
            avatar: self.avatar,
            participants: self.participants,
            members: self.members,
            admins: self.admins,
            owner: self.owner,
            subscribers_count: self.subscribers_count,
            bot_commands: self.bot_commands,
            bot_description: self.bot_description,
            is_public: self.is_public,
            is_verified: self.is_verified,
            is_archived: self.is_archived,
            last_message: self.last_message,
            last_message_time: self.last_message_time,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[async_trait]
impl ChatRepository for PgChatRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Chat>, AppError> {
        let row = sqlx::query_as::<_, ChatRow>(&format!(
            "SELECT {CHAT_COLUMNS} FROM chats WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ChatRow::into_chat).transpose()
    }

    /// Chats the user participates in or is a member of, plus every public
    /// channel, most recently active first.
    async fn find_for_user(&self, user_id: &str, archived: bool) -> Result<Vec<Chat>, AppError> {
        let rows = sqlx::query_as::<_, ChatRow>(&format!(
            r#"
            SELECT {CHAT_COLUMNS}
            FROM chats
            WHERE is_archived = $2
              AND ($1 = ANY(participants)
                   OR $1 = ANY(members)
                   OR (chat_type = 'channel' AND is_public))
            ORDER BY updated_at DESC
            "#
        ))
        .bind(user_id)
        .bind(archived)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ChatRow::into_chat).collect()
    }

    async fn create(&self, chat: &Chat) -> Result<Chat, AppError> {
        let row = sqlx::query_as::<_, ChatRow>(&format!(
            r#"
            INSERT INTO chats (
                id, name, chat_type, description, avatar, participants, members, admins,
                owner, subscribers_count, bot_commands, bot_description, is_public,
                is_verified, is_archived, last_message, last_message_time, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            RETURNING {CHAT_COLUMNS}
            "#
        ))
        .bind(chat.id)
        .bind(&chat.name)
        .bind(chat.chat_type.as_str())
        .bind(&chat.description)
        .bind(&chat.avatar)
        .bind(&chat.participants)
        .bind(&chat.members)
        .bind(&chat.admins)
        .bind(&chat.owner)
        .bind(chat.subscribers_count)
        .bind(&chat.bot_commands)
        .bind(&chat.bot_description)
        .bind(chat.is_public)
        .bind(chat.is_verified)
        .bind(chat.is_archived)
        .bind(&chat.last_message)
        .bind(chat.last_message_time)
        .bind(chat.created_at)
        .bind(chat.updated_at)
        .fetch_one(&self.pool)
        .await?;

        row.into_chat()
    }

    async fn update_details(
        &self,
        id: Uuid,
        update: &ChatDetailsUpdate,
        now: DateTime<Utc>,
    ) -> Result<Option<Chat>, AppError> {
        let row = sqlx::query_as::<_, ChatRow>(&format!(
            r#"
            UPDATE chats SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                avatar = COALESCE($4, avatar),
                updated_at = $5
            WHERE id = $1
            RETURNING {CHAT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&update.name)
        .bind(&update.description)
        .bind(&update.avatar)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ChatRow::into_chat).transpose()
    }

    async fn set_archived(&self, id: Uuid, archived: bool, now: DateTime<Utc>) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE chats SET is_archived = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(archived)
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM chats WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn add_member(&self, id: Uuid, user_id: &str, now: DateTime<Utc>) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE chats SET
                members = array_append(members, $2),
                subscribers_count = subscribers_count + 1,
                updated_at = $3
            WHERE id = $1 AND NOT ($2 = ANY(members))
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn remove_member(
        &self,
        id: Uuid,
        user_id: &str,
        decrement_subscribers: bool,
        now: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        // SET expressions all read the pre-update row.
        let result = sqlx::query(
            r#"
            UPDATE chats SET
                subscribers_count = CASE
                    WHEN $3 AND $2 = ANY(members) THEN GREATEST(subscribers_count - 1, 0)
                    ELSE subscribers_count
                END,
                members = array_remove(members, $2),
                participants = array_remove(participants, $2),
                admins = array_remove(admins, $2),
                updated_at = $4
            WHERE id = $1
              AND ($2 = ANY(members) OR $2 = ANY(participants) OR $2 = ANY(admins))
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(decrement_subscribers)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_last_message(&self, id: Uuid, text: &str, at: DateTime<Utc>) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE chats SET last_message = $2, last_message_time = $3, updated_at = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(text)
        .bind(at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
