//! Chat access domain service.

use crate::domain::entities::{Chat, ChatType, Message};

/// Domain service deciding who may see and manage chats and messages.
///
/// Callers turn a failed check into a not-found outcome so that chat
/// existence does not leak.
pub struct AccessControl;

impl AccessControl {
    /// Whether the user may read the chat and its messages.
    ///
    /// Public channels are readable by anyone; every other chat requires
    /// current membership.
    pub fn can_access(chat: &Chat, user_id: &str) -> bool {
        match chat.chat_type {
            ChatType::Private => chat.is_participant(user_id),
            ChatType::Channel if chat.is_public => true,
            ChatType::Channel | ChatType::Group | ChatType::Bot => chat.is_member(user_id),
        }
    }

    /// Admin or owner.
    pub fn is_manager(chat: &Chat, user_id: &str) -> bool {
        chat.is_admin(user_id) || chat.is_owner(user_id)
    }

    /// Whether the user may change name, description and avatar.
    pub fn can_update(chat: &Chat, user_id: &str) -> bool {
        match chat.chat_type {
            // Private chats have no admins, so nobody can rename them.
            ChatType::Private => false,
            ChatType::Group | ChatType::Channel | ChatType::Bot => Self::is_manager(chat, user_id),
        }
    }

    pub fn can_delete_chat(chat: &Chat, user_id: &str) -> bool {
        chat.is_owner(user_id)
    }

    pub fn can_archive(chat: &Chat, user_id: &str) -> bool {
        match chat.chat_type {
            ChatType::Private => chat.is_participant(user_id),
            ChatType::Group | ChatType::Channel | ChatType::Bot => Self::is_manager(chat, user_id),
        }
    }

    /// Sender only.
    pub fn can_edit_message(message: &Message, user_id: &str) -> bool {
        message.sender_id == user_id
    }

    /// Sender, any admin of the chat, or its owner.
    pub fn can_delete_message(chat: &Chat, message: &Message, user_id: &str) -> bool {
        message.sender_id == user_id || Self::is_manager(chat, user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{NewChat, NewMessage};
    use chrono::Utc;
    use test_case::test_case;
    use uuid::Uuid;

    fn chat(chat_type: ChatType, is_public: bool) -> Chat {
        Chat::create(
            Uuid::now_v7(),
            "alice",
            NewChat {
                name: "test".into(),
                chat_type,
                description: None,
                avatar: None,
                participants: vec!["bob".into()],
                is_public,
            },
            Utc::now(),
        )
    }

    #[test_case(ChatType::Private, false, "bob", true ; "private participant")]
    #[test_case(ChatType::Private, true, "carol", false ; "private outsider even if flagged public")]
    #[test_case(ChatType::Group, false, "bob", true ; "group member")]
    #[test_case(ChatType::Group, true, "carol", false ; "public group still needs membership")]
    #[test_case(ChatType::Bot, true, "carol", false ; "bot outsider")]
    #[test_case(ChatType::Channel, false, "carol", false ; "private channel outsider")]
    #[test_case(ChatType::Channel, false, "bob", true ; "private channel member")]
    #[test_case(ChatType::Channel, true, "carol", true ; "public channel outsider")]
    fn test_can_access(chat_type: ChatType, is_public: bool, user: &str, expected: bool) {
        assert_eq!(AccessControl::can_access(&chat(chat_type, is_public), user), expected);
    }

    #[test]
    fn test_flipping_public_changes_access_without_membership_change() {
        let mut channel = chat(ChatType::Channel, false);
        let members_before = channel.members.clone();
        assert!(!AccessControl::can_access(&channel, "carol"));

        channel.is_public = true;
        assert!(AccessControl::can_access(&channel, "carol"));
        assert_eq!(channel.members, members_before);
    }

    #[test]
    fn test_public_channel_reader_cannot_update() {
        let channel = chat(ChatType::Channel, true);
        assert!(AccessControl::can_access(&channel, "carol"));
        assert!(!AccessControl::can_update(&channel, "carol"));
        assert!(!AccessControl::can_update(&channel, "bob"));
        assert!(AccessControl::can_update(&channel, "alice"));
    }

    #[test_case(ChatType::Private, "bob", true ; "private participant archives")]
    #[test_case(ChatType::Group, "bob", false ; "group member cannot archive")]
    #[test_case(ChatType::Group, "alice", true ; "group owner archives")]
    fn test_can_archive(chat_type: ChatType, user: &str, expected: bool) {
        assert_eq!(AccessControl::can_archive(&chat(chat_type, false), user), expected);
    }

    #[test]
    fn test_message_delete_roles() {
        let mut group = chat(ChatType::Group, false);
        group.members.push("carol".into());
        group.admins.push("bob".into());
        group.owner = Some("dave".into());

        let message = Message::compose(
            Uuid::now_v7(),
            group.id,
            group.chat_type,
            "carol",
            "Carol",
            NewMessage {
                text: Some("hello".into()),
                ..Default::default()
            },
            Utc::now(),
        );

        assert!(AccessControl::can_delete_message(&group, &message, "carol"));
        assert!(AccessControl::can_delete_message(&group, &message, "bob"));
        assert!(AccessControl::can_delete_message(&group, &message, "dave"));
        assert!(!AccessControl::can_delete_message(&group, &message, "erin"));
        assert!(AccessControl::can_edit_message(&message, "carol"));
        assert!(!AccessControl::can_edit_message(&message, "bob"));
    }
}
