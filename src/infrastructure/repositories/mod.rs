//! Repository Implementations
//!
//! PostgreSQL implementations of domain repository traits.
//!
//! ## Available Repositories
//!
//! - **PgChatRepository** - Chats and their membership lists
//! - **PgMessageRepository** - Messages, read receipts and reactions
//! - **PgFolderRepository** - Built-in and custom folders
//! - **PgPrivacyRepository** - Per-user visibility settings
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use sqlx::PgPool;
//! use crate::infrastructure::repositories::{PgChatRepository, PgMessageRepository};
//!
//! async fn setup_repositories(pool: PgPool) {
//!     let chat_repo = PgChatRepository::new(pool.clone());
//!     let message_repo = PgMessageRepository::new(pool.clone());
//! }
//! ```

pub mod chat_repository;
pub mod folder_repository;
pub mod message_repository;
pub mod privacy_repository;

pub use chat_repository::PgChatRepository;
pub use folder_repository::PgFolderRepository;
pub use message_repository::PgMessageRepository;
pub use privacy_repository::PgPrivacyRepository;
