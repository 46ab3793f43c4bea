//! # Domain Layer
//!
//! The domain layer contains the core rules of the messenger: who may see a
//! chat, how message state evolves, and how privacy settings resolve.
//! It is independent of any external frameworks or infrastructure concerns.
//!
//! ## Structure
//!
//! - **entities**: Core domain entities (Chat, Message, Folder, PrivacySettings)
//! - **value_objects**: Immutable value types (VisibilityKind)
//! - **services**: Domain services for rules spanning entities (AccessControl)
//!
//! ## Design Principles
//!
//! - No dependencies on infrastructure or presentation layers
//! - Repository traits define data access contracts
//! - Entities encapsulate domain behavior

pub mod entities;
pub mod services;
pub mod value_objects;

// Re-export commonly used types
pub use entities::*;
pub use services::*;
pub use value_objects::*;
