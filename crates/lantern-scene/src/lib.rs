//! Lantern Scene - Retained scene graph
//!
//! A [`Scene`] owns a tree of named nodes. Each node aggregates:
//! - an ordered child list,
//! - a [`lantern_core::Layout`] mask,
//! - a [`lantern_data::Store`] of published properties,
//! - a list of components (boxed [`Component`] trait objects).
//!
//! Components hold data and publish it into stores; systems (transform
//! update, light collection, rendering) traverse the graph and read it back.

mod component;
mod query;
mod scene;

pub use component::{Component, ComponentEvent};
pub use query::NodeSet;
pub use scene::Scene;
