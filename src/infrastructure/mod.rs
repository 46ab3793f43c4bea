//! Infrastructure Layer
//!
//! Storage backends for the domain repository traits:
//! - PostgreSQL repositories
//! - In-memory repositories (development and tests)

pub mod database;
pub mod memory;
pub mod repositories;
