//! HTTP Handlers
//!
//! Request handlers for all HTTP endpoints.

pub mod chat;
pub mod folder;
pub mod health;
pub mod message;
pub mod privacy;
pub mod search;
pub mod user;

use uuid::Uuid;

use crate::shared::error::AppError;

/// Parse a path segment as an entity id.
fn parse_id(raw: &str, entity: &str) -> Result<Uuid, AppError> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid {} ID", entity)))
}
