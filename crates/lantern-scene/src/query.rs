//! Scene queries
//!
//! Systems rarely want the whole graph; they want "every drawable under this
//! root" or "every node carrying a light". `NodeSet` wraps a traversal with
//! chainable filters over an immutable scene borrow.

use crate::{Component, Scene};
use lantern_core::{Layout, NodeId};

/// A filtered set of nodes produced from a scene traversal.
pub struct NodeSet<'a> {
    scene: &'a Scene,
    nodes: Vec<NodeId>,
}

impl<'a> NodeSet<'a> {
    /// Every node reachable from `root` (inclusive), pre-order
    pub fn descendants(scene: &'a Scene, root: NodeId) -> Self {
        Self {
            nodes: scene.descendants(root),
            scene,
        }
    }

    /// Keep nodes matching the predicate
    pub fn filter<F: Fn(&Scene, NodeId) -> bool>(mut self, pred: F) -> Self {
        self.nodes.retain(|id| pred(self.scene, *id));
        self
    }

    /// Keep nodes carrying a component of type `C`
    pub fn with_component<C: Component>(self) -> Self {
        let scene = self.scene;
        self.filter(|_, id| scene.has_component::<C>(id))
    }

    /// Keep nodes whose layout intersects `mask`
    pub fn in_layout(self, mask: Layout) -> Self {
        self.filter(|scene, id| scene.layout(id).intersects(mask))
    }

    /// The matching node ids, in traversal order
    pub fn into_vec(self) -> Vec<NodeId> {
        self.nodes
    }

    /// Number of matching nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when no node matched
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lantern_core::Layout;

    struct Marker;

    impl Component for Marker {
        fn type_name(&self) -> &'static str {
            "Marker"
        }
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
            self
        }
    }

    #[test]
    fn test_with_component() {
        let mut scene = Scene::new();
        let a = scene.create_node("a").unwrap();
        let b = scene.create_node("b").unwrap();
        scene.add_child(scene.root(), a).unwrap();
        scene.add_child(scene.root(), b).unwrap();
        scene.add_component(b, Marker).unwrap();

        let found = NodeSet::descendants(&scene, scene.root())
            .with_component::<Marker>()
            .into_vec();

        assert_eq!(found, vec![b]);
    }

    #[test]
    fn test_in_layout() {
        let mut scene = Scene::new();
        let a = scene.create_node("a").unwrap();
        let b = scene.create_node("b").unwrap();
        scene.add_child(scene.root(), a).unwrap();
        scene.add_child(scene.root(), b).unwrap();
        scene.set_layout(b, Layout::DEBUG).unwrap();

        let found = NodeSet::descendants(&scene, scene.root())
            .in_layout(Layout::DEBUG)
            .into_vec();

        assert_eq!(found, vec![b]);
    }

    #[test]
    fn test_traversal_order_is_preorder() {
        let mut scene = Scene::new();
        let a = scene.create_node("a").unwrap();
        let b = scene.create_node("b").unwrap();
        let c = scene.create_node("c").unwrap();
        scene.add_child(scene.root(), a).unwrap();
        scene.add_child(a, b).unwrap();
        scene.add_child(scene.root(), c).unwrap();

        let all = NodeSet::descendants(&scene, scene.root()).into_vec();
        assert_eq!(all, vec![scene.root(), a, b, c]);
    }
}
