//! Response DTOs
//!
//! Data structures for API response bodies that wrap service results.

use serde::Serialize;
use uuid::Uuid;

use crate::application::services::{ChatDto, FolderDto};
use crate::domain::Reaction;

/// Chats and folders of the current user
#[derive(Debug, Serialize)]
pub struct UserChatsResponse {
    pub user_id: String,
    pub chats: Vec<ChatDto>,
    pub folders: Vec<FolderDto>,
}

/// Generic outcome of a state-changing action
#[derive(Debug, Serialize)]
pub struct ActionResponse {
    pub success: bool,
    pub message: String,
}

impl ActionResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Number of messages whose read state changed
#[derive(Debug, Serialize)]
pub struct MarkReadResponse {
    pub updated: u64,
}

/// Reactions of a message after a react/unreact
#[derive(Debug, Serialize)]
pub struct ReactionsResponse {
    pub message_id: Uuid,
    pub reactions: Vec<Reaction>,
}
