//! # Domain Services
//!
//! Domain services encapsulate business rules that don't naturally belong to
//! a single entity.
//!
//! ## Services
//!
//! - **AccessControl**: Chat visibility and role checks

mod access_control;

pub use access_control::*;
