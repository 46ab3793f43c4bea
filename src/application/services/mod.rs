//! Application Services
//!
//! Business logic services that coordinate domain operations.
//!
//! ## Available Services
//!
//! - **ChatService**: Chat lifecycle and membership
//! - **MessageService**: Messages, read receipts, reactions, forwarding, search
//! - **PrivacyService**: Visibility defaults and per-contact overrides
//! - **FolderService**: Default and custom chat folders

pub mod chat_service;
pub mod folder_service;
pub mod message_service;
pub mod privacy_service;

// Re-export chat service types
pub use chat_service::{ChatDto, ChatError, ChatService, ChatServiceImpl, CreateChatDto};

// Re-export message service types
pub use message_service::{
    CreateMessageDto, ForwardFailure, ForwardMessageDto, ForwardReport, MessageDto, MessageError,
    MessageLimits, MessageQueryDto, MessageService, MessageServiceImpl, SearchQueryDto, Sender,
    SentMessageDto,
};

// Re-export privacy service types
pub use privacy_service::{
    load_or_init_settings, PrivacyError, PrivacyService, PrivacyServiceImpl, PrivacySettingsDto,
    VisibilityDto, VisibilityResolver,
};

// Re-export folder service types
pub use folder_service::{
    CreateFolderDto, FolderContentsDto, FolderDto, FolderError, FolderService, FolderServiceImpl,
};
