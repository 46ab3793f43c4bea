//! In-memory repositories
//!
//! Process-local implementations of the domain repository traits, used by
//! the `memory` storage backend and by tests. State is lost on restart.

mod chat;
mod folder;
mod message;
mod privacy;

pub use chat::InMemoryChatRepository;
pub use folder::InMemoryFolderRepository;
pub use message::InMemoryMessageRepository;
pub use privacy::InMemoryPrivacyRepository;
