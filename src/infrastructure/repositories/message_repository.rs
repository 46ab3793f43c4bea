//! Message Repository Implementation
//!
//! PostgreSQL implementation of message storage with cursor pagination,
//! atomic read receipts and normalized reactions.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{
    Message, MessageEdit, MessageRepository, MessageSearch, MessageType, Reaction,
};
use crate::shared::error::AppError;

const MESSAGE_COLUMNS: &str = r#"
    id, chat_id, sender_id, sender_name, text, message_type, media_url, file_name, file_size,
    reply_to, forwarded_from, is_edited, edited_at, is_deleted, is_pinned, is_bot_command,
    is_scheduled, scheduled_for, read_by, sent_at
"#;

/// PostgreSQL message repository implementation.
///
/// Reactions live in `message_reactions`, one row per (message, emoji, user),
/// so a reaction's count is always the size of its user list.
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    /// Creates a new PgMessageRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load reactions for the given rows and convert them to messages.
    ///
    /// Entries are ordered by their earliest remaining reaction, so an entry
    /// moves back once its first reactor withdraws.
    async fn with_reactions(&self, rows: Vec<MessageRow>) -> Result<Vec<Message>, AppError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let groups = sqlx::query_as::<_, ReactionGroupRow>(
            r#"
            SELECT message_id, emoji,
                   array_agg(user_id ORDER BY created_at, user_id) AS users
            FROM message_reactions
            WHERE message_id = ANY($1)
            GROUP BY message_id, emoji
            ORDER BY message_id, MIN(created_at), emoji
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_message: HashMap<Uuid, Vec<Reaction>> = HashMap::new();
        for group in groups {
            by_message
                .entry(group.message_id)
                .or_default()
                .push(Reaction::new(group.emoji, group.users));
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let reactions = by_message.remove(&row.id).unwrap_or_default();
                row.into_message(reactions)
            })
            .collect())
    }

    async fn with_reactions_one(&self, row: Option<MessageRow>) -> Result<Option<Message>, AppError> {
        match row {
            Some(row) => Ok(self.with_reactions(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }
}

/// Internal row type for message queries.
#[derive(Debug, sqlx::FromRow)]
struct MessageRow {
    id: Uuid,
    chat_id: Uuid,
    sender_id: String,
    sender_name: String,
    text: Option<String>,
    message_type: String,
    media_url: Option<String>,
    file_name: Option<String>,
    file_size: Option<i64>,
    reply_to: Option<Uuid>,
    forwarded_from: Option<String>,
    is_edited: bool,
    edited_at: Option<DateTime<Utc>>,
    is_deleted: bool,
    is_pinned: bool,
    is_bot_command: bool,
    is_scheduled: bool,
    scheduled_for: Option<DateTime<Utc>>,
    read_by: Vec<String>,
    sent_at: DateTime<Utc>,
}

impl MessageRow {
    /// Converts database row to domain Message entity.
    fn into_message(self, reactions: Vec<Reaction>) -> Message {
        Message {
            id: self.id,
            chat_id: self.chat_id,
            sender_id: self.sender_id,
            sender_name: self.sender_name,
            text: self.text,
            message_type: MessageType::parse(&self.message_type).unwrap_or_default(),
            media_url: self.media_url,
            file_name: self.file_name,
            file_size: self.file_size,
            reply_to: self.reply_to,
            forwarded_from: self.forwarded_from,
            is_edited: self.is_edited,
            edited_at: self.edited_at,
            is_deleted: self.is_deleted,
            is_pinned: self.is_pinned,
            is_bot_command: self.is_bot_command,
            is_scheduled: self.is_scheduled,
            scheduled_for: self.scheduled_for,
            reactions,
            read_by: self.read_by,
            timestamp: self.sent_at,
        }
    }
}

/// Aggregated reaction row: one per (message, emoji).
#[derive(Debug, sqlx::FromRow)]
struct ReactionGroupRow {
    message_id: Uuid,
    emoji: String,
    users: Vec<String>,
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Message>, AppError> {
        let row = sqlx::query_as::<_, MessageRow>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        self.with_reactions_one(row).await
    }

    /// Keyset pagination on `sent_at`, newest first.
    async fn find_by_chat(
        &self,
        chat_id: Uuid,
        before: Option<DateTime<Utc>>,
        limit: i64,
    ) -> Result<Vec<Message>, AppError> {
        let rows = sqlx::query_as::<_, MessageRow>(&format!(
            r#"
            SELECT {MESSAGE_COLUMNS}
            FROM messages
            WHERE chat_id = $1
              AND NOT is_deleted
              AND NOT is_scheduled
              AND ($2::timestamptz IS NULL OR sent_at < $2)
            ORDER BY sent_at DESC
            LIMIT $3
            "#
        ))
        .bind(chat_id)
        .bind(before)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        self.with_reactions(rows).await
    }

    async fn find_pinned(&self, chat_id: Uuid) -> Result<Vec<Message>, AppError> {
        let rows = sqlx::query_as::<_, MessageRow>(&format!(
            r#"
            SELECT {MESSAGE_COLUMNS}
            FROM messages
            WHERE chat_id = $1 AND is_pinned AND NOT is_deleted
            ORDER BY sent_at ASC
            "#
        ))
        .bind(chat_id)
        .fetch_all(&self.pool)
        .await?;

        self.with_reactions(rows).await
    }

    async fn create(&self, message: &Message) -> Result<Message, AppError> {
        let row = sqlx::query_as::<_, MessageRow>(&format!(
            r#"
            INSERT INTO messages (
                id, chat_id, sender_id, sender_name, text, message_type, media_url, file_name,
                file_size, reply_to, forwarded_from, is_edited, edited_at, is_deleted, is_pinned,
                is_bot_command, is_scheduled, scheduled_for, read_by, sent_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20)
            RETURNING {MESSAGE_COLUMNS}
            "#
        ))
        .bind(message.id)
        .bind(message.chat_id)
        .bind(&message.sender_id)
        .bind(&message.sender_name)
        .bind(&message.text)
        .bind(message.message_type.as_str())
        .bind(&message.media_url)
        .bind(&message.file_name)
        .bind(message.file_size)
        .bind(message.reply_to)
        .bind(&message.forwarded_from)
        .bind(message.is_edited)
        .bind(message.edited_at)
        .bind(message.is_deleted)
        .bind(message.is_pinned)
        .bind(message.is_bot_command)
        .bind(message.is_scheduled)
        .bind(message.scheduled_for)
        .bind(&message.read_by)
        .bind(message.timestamp)
        .fetch_one(&self.pool)
        .await?;

        // A new message has no reactions yet.
        Ok(row.into_message(Vec::new()))
    }

    async fn update(&self, id: Uuid, edit: &MessageEdit, now: DateTime<Utc>) -> Result<Option<Message>, AppError> {
        let row = sqlx::query_as::<_, MessageRow>(&format!(
            r#"
            UPDATE messages SET
                text = COALESCE($2, text),
                is_pinned = COALESCE($3, is_pinned),
                is_edited = TRUE,
                edited_at = $4
            WHERE id = $1
            RETURNING {MESSAGE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&edit.text)
        .bind(edit.is_pinned)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        self.with_reactions_one(row).await
    }

    async fn soft_delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE messages SET is_deleted = TRUE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_chat(&self, chat_id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM messages WHERE chat_id = $1")
            .bind(chat_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn mark_read(
        &self,
        chat_id: Uuid,
        user_id: &str,
        message_ids: Option<&[Uuid]>,
    ) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE messages SET read_by = array_append(read_by, $2)
            WHERE chat_id = $1
              AND NOT ($2 = ANY(read_by))
              AND ($3::uuid[] IS NULL OR id = ANY($3))
            "#,
        )
        .bind(chat_id)
        .bind(user_id)
        .bind(message_ids.map(|ids| ids.to_vec()))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn count_unread(&self, chat_id: Uuid, user_id: &str) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM messages
            WHERE chat_id = $1
              AND NOT is_deleted
              AND NOT is_scheduled
              AND NOT ($2 = ANY(read_by))
            "#,
        )
        .bind(chat_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn add_reaction(&self, id: Uuid, user_id: &str, emoji: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO message_reactions (message_id, emoji, user_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (message_id, emoji, user_id) DO NOTHING
            "#,
        )
        .bind(id)
        .bind(emoji)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn remove_reaction(&self, id: Uuid, user_id: &str, emoji: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            "DELETE FROM message_reactions WHERE message_id = $1 AND emoji = $2 AND user_id = $3",
        )
        .bind(id)
        .bind(emoji)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Every query word must occur in the text (`plainto_tsquery` ANDs terms).
    async fn search(&self, search: &MessageSearch) -> Result<Vec<Message>, AppError> {
        let rows = sqlx::query_as::<_, MessageRow>(&format!(
            r#"
            SELECT {MESSAGE_COLUMNS}
            FROM messages
            WHERE chat_id = ANY($1)
              AND NOT is_deleted
              AND to_tsvector('simple', coalesce(text, '')) @@ plainto_tsquery('simple', $2)
            ORDER BY sent_at DESC
            LIMIT $3
            "#
        ))
        .bind(&search.chat_ids)
        .bind(&search.query)
        .bind(search.limit)
        .fetch_all(&self.pool)
        .await?;

        self.with_reactions(rows).await
    }
}
