//! Lantern Core - Foundational types for the Lantern engine
//!
//! This crate provides the types every other Lantern crate depends on:
//! - `NodeId` / `SlotId` - Stable identifiers
//! - `Signal` - Typed listener lists for engine events
//! - `Layout` - Node layout bitmasks used for render filtering and culling
//! - `ContentHash` - SHA-256 based content hashing
//! - Error types and Result alias

mod error;
mod hash;
mod id;
mod layout;
mod signal;

pub use error::{LanternError, Result};
pub use hash::ContentHash;
pub use id::{NodeId, SlotId};
pub use layout::Layout;
pub use signal::Signal;
