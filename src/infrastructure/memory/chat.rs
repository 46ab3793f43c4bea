use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use crate::domain::{Chat, ChatDetailsUpdate, ChatRepository, ChatType};
use crate::shared::error::AppError;

/// Chats keyed by id. Each mutation holds the shard lock of its chat for the
/// whole read-modify-write.
#[derive(Default)]
pub struct InMemoryChatRepository {
    chats: DashMap<Uuid, Chat>,
}

impl InMemoryChatRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn visible_to(chat: &Chat, user_id: &str) -> bool {
    chat.is_participant(user_id)
        || chat.is_member(user_id)
        || (chat.chat_type == ChatType::Channel && chat.is_public)
}

#[async_trait]
impl ChatRepository for InMemoryChatRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Chat>, AppError> {
        Ok(self.chats.get(&id).map(|c| c.clone()))
    }

    async fn find_for_user(&self, user_id: &str, archived: bool) -> Result<Vec<Chat>, AppError> {
        let mut chats: Vec<Chat> = self
            .chats
            .iter()
            .filter(|c| c.is_archived == archived && visible_to(c, user_id))
            .map(|c| c.clone())
            .collect();
        chats.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| b.id.cmp(&a.id)));
        Ok(chats)
    }

    async fn create(&self, chat: &Chat) -> Result<Chat, AppError> {
        self.chats.insert(chat.id, chat.clone());
        Ok(chat.clone())
    }

    async fn update_details(
        &self,
        id: Uuid,
        update: &ChatDetailsUpdate,
        now: DateTime<Utc>,
    ) -> Result<Option<Chat>, AppError> {
        Ok(self.chats.get_mut(&id).map(|mut chat| {
            chat.apply_details(update.clone(), now);
            chat.clone()
        }))
    }

    async fn set_archived(&self, id: Uuid, archived: bool, now: DateTime<Utc>) -> Result<bool, AppError> {
        match self.chats.get_mut(&id) {
            Some(mut chat) => {
                chat.is_archived = archived;
                chat.updated_at = now;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.chats.remove(&id).is_some())
    }

    async fn add_member(&self, id: Uuid, user_id: &str, now: DateTime<Utc>) -> Result<bool, AppError> {
        let Some(mut chat) = self.chats.get_mut(&id) else {
            return Ok(false);
        };
        if chat.is_member(user_id) {
            return Ok(false);
        }
        chat.members.push(user_id.to_string());
        chat.subscribers_count += 1;
        chat.updated_at = now;
        Ok(true)
    }

    async fn remove_member(
        &self,
        id: Uuid,
        user_id: &str,
        decrement_subscribers: bool,
        now: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let Some(mut chat) = self.chats.get_mut(&id) else {
            return Ok(false);
        };

        let was_member = chat.is_member(user_id);
        let before = chat.members.len() + chat.participants.len() + chat.admins.len();
        chat.members.retain(|m| m != user_id);
        chat.participants.retain(|p| p != user_id);
        chat.admins.retain(|a| a != user_id);
        let removed = chat.members.len() + chat.participants.len() + chat.admins.len() < before;

        if !removed {
            return Ok(false);
        }
        if decrement_subscribers && was_member {
            chat.subscribers_count = (chat.subscribers_count - 1).max(0);
        }
        chat.updated_at = now;
        Ok(true)
    }

    async fn update_last_message(&self, id: Uuid, text: &str, at: DateTime<Utc>) -> Result<(), AppError> {
        if let Some(mut chat) = self.chats.get_mut(&id) {
            chat.last_message = Some(text.to_string());
            chat.last_message_time = Some(at);
            chat.updated_at = at;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewChat;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    fn chat(chat_type: ChatType, owner: &str, others: &[&str], is_public: bool) -> Chat {
        Chat::create(
            Uuid::now_v7(),
            owner,
            NewChat {
                name: "chat".into(),
                chat_type,
                description: None,
                avatar: None,
                participants: others.iter().map(|o| o.to_string()).collect(),
                is_public,
            },
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn test_find_for_user_includes_public_channels() {
        let repo = InMemoryChatRepository::new();
        let public = repo.create(&chat(ChatType::Channel, "owner", &[], true)).await.unwrap();
        repo.create(&chat(ChatType::Channel, "owner", &[], false)).await.unwrap();
        let own = repo.create(&chat(ChatType::Group, "alice", &[], false)).await.unwrap();

        let ids: Vec<Uuid> = repo
            .find_for_user("alice", false)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();

        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&public.id));
        assert!(ids.contains(&own.id));
    }

    #[tokio::test]
    async fn test_find_for_user_orders_by_recent_activity() {
        let repo = InMemoryChatRepository::new();
        let older = repo.create(&chat(ChatType::Group, "alice", &[], false)).await.unwrap();
        let newer = repo.create(&chat(ChatType::Group, "alice", &[], false)).await.unwrap();

        repo.update_last_message(older.id, "hi", Utc::now() + Duration::seconds(5))
            .await
            .unwrap();

        let chats = repo.find_for_user("alice", false).await.unwrap();
        assert_eq!(chats[0].id, older.id);
        assert_eq!(chats[1].id, newer.id);
    }

    #[tokio::test]
    async fn test_archived_filter() {
        let repo = InMemoryChatRepository::new();
        let c = repo.create(&chat(ChatType::Group, "alice", &[], false)).await.unwrap();
        assert!(repo.set_archived(c.id, true, Utc::now()).await.unwrap());

        assert!(repo.find_for_user("alice", false).await.unwrap().is_empty());
        assert_eq!(repo.find_for_user("alice", true).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_add_member_is_idempotent() {
        let repo = InMemoryChatRepository::new();
        let c = repo.create(&chat(ChatType::Channel, "owner", &[], true)).await.unwrap();

        assert!(repo.add_member(c.id, "bob", Utc::now()).await.unwrap());
        assert!(!repo.add_member(c.id, "bob", Utc::now()).await.unwrap());

        let stored = repo.find_by_id(c.id).await.unwrap().unwrap();
        assert_eq!(stored.members, vec!["owner".to_string(), "bob".to_string()]);
        assert_eq!(stored.subscribers_count, 2);
    }

    #[tokio::test]
    async fn test_remove_member_strips_admin_rights() {
        let repo = InMemoryChatRepository::new();
        let mut group = chat(ChatType::Group, "owner", &["bob"], false);
        group.admins.push("bob".into());
        let c = repo.create(&group).await.unwrap();

        assert!(repo.remove_member(c.id, "bob", false, Utc::now()).await.unwrap());

        let stored = repo.find_by_id(c.id).await.unwrap().unwrap();
        assert!(!stored.is_member("bob"));
        assert!(!stored.is_admin("bob"));
        assert!(!repo.remove_member(c.id, "bob", false, Utc::now()).await.unwrap());
    }

    #[tokio::test]
    async fn test_subscriber_count_never_negative() {
        let repo = InMemoryChatRepository::new();
        let mut channel = chat(ChatType::Channel, "owner", &["bob"], true);
        channel.subscribers_count = 0;
        let c = repo.create(&channel).await.unwrap();

        assert!(repo.remove_member(c.id, "bob", true, Utc::now()).await.unwrap());
        let stored = repo.find_by_id(c.id).await.unwrap().unwrap();
        assert_eq!(stored.subscribers_count, 0);
    }

    #[tokio::test]
    async fn test_concurrent_joins_count_once_each() {
        let repo = std::sync::Arc::new(InMemoryChatRepository::new());
        let c = repo.create(&chat(ChatType::Channel, "owner", &[], true)).await.unwrap();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let repo = repo.clone();
                tokio::spawn(async move {
                    // Every user joins twice
                    let user = format!("user{}", i % 4);
                    repo.add_member(c.id, &user, Utc::now()).await.unwrap()
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        let stored = repo.find_by_id(c.id).await.unwrap().unwrap();
        assert_eq!(stored.members.len(), 5);
        assert_eq!(stored.subscribers_count, 5);
    }
}
