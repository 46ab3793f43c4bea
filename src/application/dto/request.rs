//! Request DTOs
//!
//! Data structures for API request bodies and query strings.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::application::services::{
    CreateFolderDto, ForwardMessageDto, MessageQueryDto, SearchQueryDto,
};
use crate::domain::{
    ChatDetailsUpdate, ContactPrivacyUpdate, FolderUpdate, MessageEdit, PrivacyDefaultsUpdate,
};

/// Create chat request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateChatRequest {
    #[validate(length(min = 1, max = 128, message = "Name must be 1-128 characters"))]
    pub name: String,

    #[serde(rename = "type")]
    pub chat_type: String,

    #[validate(length(max = 512, message = "Description must be at most 512 characters"))]
    pub description: Option<String>,

    pub avatar: Option<String>,

    #[serde(default)]
    pub participants: Vec<String>,

    #[serde(default)]
    pub is_public: bool,
}

/// Update chat request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateChatRequest {
    #[validate(length(min = 1, max = 128, message = "Name must be 1-128 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 512, message = "Description must be at most 512 characters"))]
    pub description: Option<String>,

    pub avatar: Option<String>,
}

impl From<UpdateChatRequest> for ChatDetailsUpdate {
    fn from(req: UpdateChatRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
            avatar: req.avatar,
        }
    }
}

/// Chat list query parameters
#[derive(Debug, Deserialize)]
pub struct ChatListQuery {
    #[serde(rename = "type")]
    pub chat_type: Option<String>,
}

/// Archive request
#[derive(Debug, Deserialize)]
pub struct ArchiveRequest {
    #[serde(default = "default_true")]
    pub archived: bool,
}

fn default_true() -> bool {
    true
}

/// Send message request
#[derive(Debug, Deserialize, Validate)]
pub struct SendMessageRequest {
    pub text: Option<String>,

    pub message_type: Option<String>,

    pub media_url: Option<String>,

    pub file_name: Option<String>,

    #[validate(range(min = 0, message = "File size must not be negative"))]
    pub file_size: Option<i64>,

    pub reply_to: Option<Uuid>,

    pub scheduled_for: Option<DateTime<Utc>>,
}

/// Update message request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateMessageRequest {
    pub text: Option<String>,
    pub is_pinned: Option<bool>,
}

impl From<UpdateMessageRequest> for MessageEdit {
    fn from(req: UpdateMessageRequest) -> Self {
        Self {
            text: req.text,
            is_pinned: req.is_pinned,
        }
    }
}

/// Message query parameters
#[derive(Debug, Deserialize)]
pub struct MessageQueryParams {
    pub before: Option<Uuid>,
    pub limit: Option<i64>,
}

impl From<MessageQueryParams> for MessageQueryDto {
    fn from(params: MessageQueryParams) -> Self {
        Self {
            before: params.before,
            limit: params.limit,
        }
    }
}

/// Mark read request
#[derive(Debug, Default, Deserialize)]
pub struct MarkReadRequest {
    pub message_ids: Option<Vec<Uuid>>,
}

/// Reaction request
#[derive(Debug, Deserialize, Validate)]
pub struct ReactionRequest {
    #[validate(length(min = 1, max = 32, message = "Emoji must be 1-32 characters"))]
    pub emoji: String,
}

/// Forward request
#[derive(Debug, Deserialize, Validate)]
pub struct ForwardRequest {
    #[validate(length(min = 1, message = "At least one target chat is required"))]
    pub target_chat_ids: Vec<Uuid>,

    pub caption: Option<String>,
}

impl From<ForwardRequest> for ForwardMessageDto {
    fn from(req: ForwardRequest) -> Self {
        Self {
            target_chat_ids: req.target_chat_ids,
            caption: req.caption,
        }
    }
}

/// Message search query parameters
#[derive(Debug, Deserialize, Validate)]
pub struct SearchParams {
    #[validate(length(min = 1, max = 256, message = "Query must be 1-256 characters"))]
    pub q: String,

    pub chat_id: Option<Uuid>,

    pub limit: Option<i64>,
}

impl From<SearchParams> for SearchQueryDto {
    fn from(params: SearchParams) -> Self {
        Self {
            query: params.q,
            chat_id: params.chat_id,
            limit: params.limit,
        }
    }
}

/// Create folder request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateFolderRequest {
    #[validate(length(min = 1, max = 64, message = "Name must be 1-64 characters"))]
    pub name: String,

    pub icon: Option<String>,

    #[serde(default = "default_folder_type")]
    pub folder_type: String,

    #[serde(default)]
    pub chat_ids: Vec<Uuid>,
}

fn default_folder_type() -> String {
    "custom".into()
}

impl From<CreateFolderRequest> for CreateFolderDto {
    fn from(req: CreateFolderRequest) -> Self {
        Self {
            name: req.name,
            icon: req.icon,
            folder_type: req.folder_type,
            chat_ids: req.chat_ids,
        }
    }
}

/// Update folder request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateFolderRequest {
    #[validate(length(min = 1, max = 64, message = "Name must be 1-64 characters"))]
    pub name: Option<String>,

    pub icon: Option<String>,

    pub chat_ids: Option<Vec<Uuid>>,
}

impl From<UpdateFolderRequest> for FolderUpdate {
    fn from(req: UpdateFolderRequest) -> Self {
        Self {
            name: req.name,
            icon: req.icon,
            chat_ids: req.chat_ids,
        }
    }
}

/// Update global privacy defaults
#[derive(Debug, Deserialize)]
pub struct UpdatePrivacyRequest {
    pub default_show_read_receipts: Option<bool>,
    pub default_show_last_seen: Option<bool>,
    pub default_show_online_status: Option<bool>,
}

impl From<UpdatePrivacyRequest> for PrivacyDefaultsUpdate {
    fn from(req: UpdatePrivacyRequest) -> Self {
        Self {
            default_show_read_receipts: req.default_show_read_receipts,
            default_show_last_seen: req.default_show_last_seen,
            default_show_online_status: req.default_show_online_status,
        }
    }
}

/// Update a per-contact privacy override
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateContactPrivacyRequest {
    #[validate(length(min = 1, message = "contact_user_id is required"))]
    pub contact_user_id: String,

    pub show_read_receipts_to_contact: Option<bool>,
    pub can_see_contact_read_receipts: Option<bool>,
    pub show_last_seen_to_contact: Option<bool>,
    pub can_see_contact_last_seen: Option<bool>,
    pub show_online_status_to_contact: Option<bool>,
    pub can_see_contact_online_status: Option<bool>,
}

impl From<UpdateContactPrivacyRequest> for ContactPrivacyUpdate {
    fn from(req: UpdateContactPrivacyRequest) -> Self {
        Self {
            contact_user_id: req.contact_user_id,
            show_read_receipts_to_contact: req.show_read_receipts_to_contact,
            can_see_contact_read_receipts: req.can_see_contact_read_receipts,
            show_last_seen_to_contact: req.show_last_seen_to_contact,
            can_see_contact_last_seen: req.can_see_contact_last_seen,
            show_online_status_to_contact: req.show_online_status_to_contact,
            can_see_contact_online_status: req.can_see_contact_online_status,
        }
    }
}
