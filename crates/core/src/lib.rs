//! `labor-core`: shared domain shapes.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).
//! Persistence is owned by the data-access layer; this crate only fixes the
//! contract every stored entity follows.

pub mod entity;
pub mod error;
pub mod id;

pub use entity::{BaseEntity, Entity};
pub use error::{DomainError, DomainResult};
pub use id::EntityId;
