//! The component trait

use lantern_core::NodeId;
use std::any::Any;

/// A unit of data or behavior attached to a scene node.
///
/// Components are downcast by concrete type through
/// [`crate::Scene::component`], so implementations only need to expose
/// themselves as `Any` and report a stable name for signals and errors.
pub trait Component: Any {
    /// Stable human-readable name ("Transform", "Surface", ...)
    fn type_name(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Payload for component added/removed signals
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentEvent {
    pub node: NodeId,
    pub component: &'static str,
}
