use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use crate::domain::{
    add_reaction, matches_search, remove_reaction, Message, MessageEdit, MessageRepository,
    MessageSearch,
};
use crate::shared::error::AppError;

/// Messages keyed by id, reactions embedded in each message.
///
/// Reaction entries keep the position their emoji first appeared at.
#[derive(Default)]
pub struct InMemoryMessageRepository {
    messages: DashMap<Uuid, Message>,
}

impl InMemoryMessageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn collect_newest_first(&self, filter: impl Fn(&Message) -> bool) -> Vec<Message> {
        let mut found: Vec<Message> = self
            .messages
            .iter()
            .filter(|m| filter(m))
            .map(|m| m.clone())
            .collect();
        found.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| b.id.cmp(&a.id)));
        found
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Message>, AppError> {
        Ok(self.messages.get(&id).map(|m| m.clone()))
    }

    async fn find_by_chat(
        &self,
        chat_id: Uuid,
        before: Option<DateTime<Utc>>,
        limit: i64,
    ) -> Result<Vec<Message>, AppError> {
        let mut page = self.collect_newest_first(|m| {
            m.chat_id == chat_id && m.is_visible() && before.map_or(true, |b| m.timestamp < b)
        });
        page.truncate(limit.max(0) as usize);
        Ok(page)
    }

    async fn find_pinned(&self, chat_id: Uuid) -> Result<Vec<Message>, AppError> {
        let mut pinned = self.collect_newest_first(|m| m.chat_id == chat_id && m.is_pinned && !m.is_deleted);
        pinned.reverse();
        Ok(pinned)
    }

    async fn create(&self, message: &Message) -> Result<Message, AppError> {
        self.messages.insert(message.id, message.clone());
        Ok(message.clone())
    }

    async fn update(&self, id: Uuid, edit: &MessageEdit, now: DateTime<Utc>) -> Result<Option<Message>, AppError> {
        Ok(self.messages.get_mut(&id).map(|mut message| {
            message.apply_edit(edit, now);
            message.clone()
        }))
    }

    async fn soft_delete(&self, id: Uuid) -> Result<bool, AppError> {
        match self.messages.get_mut(&id) {
            Some(mut message) => {
                message.is_deleted = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_by_chat(&self, chat_id: Uuid) -> Result<u64, AppError> {
        let before = self.messages.len();
        self.messages.retain(|_, m| m.chat_id != chat_id);
        Ok((before - self.messages.len()) as u64)
    }

    async fn mark_read(
        &self,
        chat_id: Uuid,
        user_id: &str,
        message_ids: Option<&[Uuid]>,
    ) -> Result<u64, AppError> {
        let mut updated = 0;
        for mut message in self.messages.iter_mut() {
            if message.chat_id != chat_id {
                continue;
            }
            if message_ids.is_some_and(|ids| !ids.contains(&message.id)) {
                continue;
            }
            if message.mark_read_by(user_id) {
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn count_unread(&self, chat_id: Uuid, user_id: &str) -> Result<i64, AppError> {
        Ok(self
            .messages
            .iter()
            .filter(|m| m.chat_id == chat_id && m.is_visible() && !m.is_read_by(user_id))
            .count() as i64)
    }

    async fn add_reaction(&self, id: Uuid, user_id: &str, emoji: &str) -> Result<bool, AppError> {
        Ok(self
            .messages
            .get_mut(&id)
            .is_some_and(|mut m| add_reaction(&mut m.reactions, emoji, user_id)))
    }

    async fn remove_reaction(&self, id: Uuid, user_id: &str, emoji: &str) -> Result<bool, AppError> {
        Ok(self
            .messages
            .get_mut(&id)
            .is_some_and(|mut m| remove_reaction(&mut m.reactions, emoji, user_id)))
    }

    async fn search(&self, search: &MessageSearch) -> Result<Vec<Message>, AppError> {
        let mut hits = self.collect_newest_first(|m| {
            search.chat_ids.contains(&m.chat_id)
                && !m.is_deleted
                && m.text.as_deref().is_some_and(|t| matches_search(t, &search.query))
        });
        hits.truncate(search.limit.max(0) as usize);
        Ok(hits)
    }
}
