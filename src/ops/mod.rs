//! Protocol operations, grouped by extension area.
//!
//! Each module adds methods to [`Client`](crate::Client): future lifecycle
//! (poll/cancel), persistence contexts, entity persist/unpersist, and
//! spatial anchors. Every operation follows the same discipline: local
//! validation first, then ambient-scope resolution for context-shaped
//! calls, then one synchronous shim dispatch, then status wrapping.

pub mod anchor;
pub mod entity;
pub mod future;
pub mod persistence;

pub use anchor::CreatedAnchor;
