//! Diorama Core - Foundational types for scene snapshots
//!
//! This crate provides the core types that all other Diorama crates depend on:
//! - `ObjectId` - Stable object identifiers
//! - `ContentHash` - SHA-256 based content hashing
//! - `Transform` - Spatial state of a live object
//! - Error types and Result alias

mod error;
mod hash;
mod id;
mod types;

pub use error::{DioramaError, Result};
pub use glam::{Quat, Vec3};
pub use hash::ContentHash;
pub use id::ObjectId;
pub use types::Transform;
