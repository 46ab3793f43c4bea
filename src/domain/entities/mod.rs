//! # Domain Entities
//!
//! Core domain entities of the messenger. All entities map directly to their
//! corresponding database tables.
//!
//! ## Core Entities
//!
//! - **Chat**: A conversation container (private, group, channel or bot)
//! - **Message**: A message in a chat, with read state and reactions
//!
//! ## Per-user Entities
//!
//! - **Folder**: A named view over a user's chats
//! - **PrivacySettings**: Visibility defaults and per-contact overrides
//!
//! ## Repository Traits
//!
//! Each entity has an associated repository trait defining data access operations.
//! These traits are implemented in the infrastructure layer, following the
//! dependency inversion principle.

mod chat;
mod folder;
mod message;
mod privacy;

// Re-export Chat entity and related types
pub use chat::{Chat, ChatDetailsUpdate, ChatRepository, ChatType, NewChat, DEFAULT_BOT_COMMANDS};

#[cfg(test)]
pub use chat::MockChatRepository;

// Re-export Message entity and related types
pub use message::{
    add_reaction, forwarded_text, matches_search, remove_reaction, search_terms, Message,
    MessageEdit, MessageRepository, MessageSearch, MessageType, NewMessage, Reaction,
    BOT_COMMAND_MARKER, FORWARD_SEPARATOR, MEDIA_PREVIEW,
};

// Re-export Folder entity and related types
pub use folder::{Folder, FolderRepository, FolderType, FolderUpdate, DEFAULT_FOLDERS};

// Re-export Privacy entity and related types
pub use privacy::{
    ContactPrivacySettings, ContactPrivacyUpdate, PrivacyDefaultsUpdate, PrivacyRepository,
    PrivacySettings,
};
