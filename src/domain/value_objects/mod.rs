//! # Domain Value Objects
//!
//! Immutable value types that represent domain concepts without identity.
//!
//! ## Value Objects
//!
//! - **VisibilityKind**: The presence/read signals a privacy setting can hide

mod visibility;

pub use visibility::*;
