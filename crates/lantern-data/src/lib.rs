//! Lantern Data - The property data-flow layer
//!
//! Components do not talk to the renderer directly. They publish typed
//! properties (`model_to_world_matrix`, `diffuse_color`, light arrays) into
//! per-node [`Store`]s through [`Provider`]s, and effect files declare
//! [`Binding`]s that pull those properties back out when draw calls are
//! assembled. This crate defines that vocabulary.

mod binding;
mod convert;
mod provider;
mod store;
mod value;

pub use binding::{Binding, BindingMap, BindingSource, MacroBinding, MacroBindingMap};
pub use convert::{value_from_toml, value_to_toml};
pub use provider::Provider;
pub use store::{PropertyEvent, Store};
pub use value::Value;
