//! The scene graph

use crate::{Component, ComponentEvent};
use lantern_core::{LanternError, Layout, NodeId, Result, Signal};
use lantern_data::Store;
use std::collections::HashMap;

struct NodeData {
    name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    layout: Layout,
    store: Store,
    components: Vec<Box<dyn Component>>,
}

impl NodeData {
    fn new(name: String) -> Self {
        Self {
            name,
            parent: None,
            children: Vec::new(),
            layout: Layout::DEFAULT,
            store: Store::new(),
            components: Vec::new(),
        }
    }
}

/// A tree of nodes with per-node stores and components.
///
/// Node names are unique within a scene; scene files and queries address
/// nodes by name, stable [`NodeId`]s address them from code.
pub struct Scene {
    nodes: HashMap<NodeId, NodeData>,
    name_map: HashMap<String, NodeId>,
    root: NodeId,
    revision: u64,
    node_added: Signal<NodeId>,
    node_removed: Signal<NodeId>,
    component_added: Signal<ComponentEvent>,
    component_removed: Signal<ComponentEvent>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Create a scene holding a single root node named "root"
    pub fn new() -> Self {
        let root = NodeId::new();
        let mut nodes = HashMap::new();
        nodes.insert(root, NodeData::new("root".to_string()));
        let mut name_map = HashMap::new();
        name_map.insert("root".to_string(), root);

        Self {
            nodes,
            name_map,
            root,
            revision: 0,
            node_added: Signal::new(),
            node_removed: Signal::new(),
            component_added: Signal::new(),
            component_removed: Signal::new(),
        }
    }

    /// The root node
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Create a detached node. Attach it with [`Scene::add_child`].
    pub fn create_node(&mut self, name: impl Into<String>) -> Result<NodeId> {
        let name = name.into();
        if self.name_map.contains_key(&name) {
            return Err(LanternError::DuplicateNodeName(name));
        }

        let id = NodeId::new();
        self.nodes.insert(id, NodeData::new(name.clone()));
        self.name_map.insert(name, id);
        self.revision += 1;
        self.node_added.emit(&id);

        Ok(id)
    }

    /// Attach `child` under `parent`, detaching it from any previous parent.
    ///
    /// Attaching a node under its own descendant is an error.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.node(parent)?;
        self.node(child)?;

        if parent == child || self.ancestors(parent).contains(&child) {
            return Err(LanternError::SceneError(format!(
                "cannot attach {} under its own descendant {}",
                self.name(child)?,
                self.name(parent)?
            )));
        }

        if let Some(old_parent) = self.nodes[&child].parent {
            let old = self.nodes.get_mut(&old_parent).unwrap();
            old.children.retain(|c| *c != child);
        }

        self.nodes.get_mut(&child).unwrap().parent = Some(parent);
        self.nodes.get_mut(&parent).unwrap().children.push(child);
        self.revision += 1;

        Ok(())
    }

    /// Reparent `child` under `parent`. Alias of [`Scene::add_child`] with
    /// the arguments in child-first order.
    pub fn set_parent(&mut self, child: NodeId, parent: NodeId) -> Result<()> {
        self.add_child(parent, child)
    }

    /// Detach `child` from `parent`, leaving it (and its subtree) in the
    /// scene but unreachable from the root.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        if self.nodes.get(&child).and_then(|n| n.parent) != Some(parent) {
            return Err(LanternError::SceneError(format!(
                "{} is not a child of {}",
                child, parent
            )));
        }

        self.nodes.get_mut(&parent).unwrap().children.retain(|c| *c != child);
        self.nodes.get_mut(&child).unwrap().parent = None;
        self.revision += 1;

        Ok(())
    }

    /// Remove a node and its whole subtree. The root cannot be removed.
    pub fn remove_node(&mut self, id: NodeId) -> Result<()> {
        if id == self.root {
            return Err(LanternError::SceneError("cannot remove the root node".to_string()));
        }
        self.node(id)?;

        if let Some(parent) = self.nodes[&id].parent {
            self.nodes.get_mut(&parent).unwrap().children.retain(|c| *c != id);
        }

        for removed in self.descendants(id) {
            let data = self.nodes.remove(&removed).unwrap();
            self.name_map.remove(&data.name);
            self.node_removed.emit(&removed);
        }
        self.revision += 1;

        Ok(())
    }

    /// Node name
    pub fn name(&self, id: NodeId) -> Result<&str> {
        Ok(&self.node(id)?.name)
    }

    /// Look a node up by name
    pub fn node_by_name(&self, name: &str) -> Option<NodeId> {
        self.name_map.get(name).copied()
    }

    /// True when the node exists in this scene
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Parent node, if attached
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|n| n.parent)
    }

    /// Children in attach order
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(&id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Ancestors from parent to root
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.parent(id);
        while let Some(node) = current {
            out.push(node);
            current = self.parent(node);
        }
        out
    }

    /// The topmost ancestor (the node itself when detached)
    pub fn root_of(&self, id: NodeId) -> NodeId {
        self.ancestors(id).last().copied().unwrap_or(id)
    }

    /// Depth-first pre-order traversal including `id` itself
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            if !self.contains(node) {
                continue;
            }
            out.push(node);
            for child in self.children(node).iter().rev() {
                stack.push(*child);
            }
        }
        out
    }

    /// Node layout mask
    pub fn layout(&self, id: NodeId) -> Layout {
        self.nodes.get(&id).map(|n| n.layout).unwrap_or(Layout::NOTHING)
    }

    /// Set the node layout mask
    pub fn set_layout(&mut self, id: NodeId, layout: Layout) -> Result<()> {
        self.node_mut(id)?.layout = layout;
        Ok(())
    }

    /// The node's property store
    pub fn store(&self, id: NodeId) -> Result<&Store> {
        Ok(&self.node(id)?.store)
    }

    /// The node's property store, mutable
    pub fn store_mut(&mut self, id: NodeId) -> Result<&mut Store> {
        Ok(&mut self.node_mut(id)?.store)
    }

    /// Attach a component to a node
    pub fn add_component<C: Component>(&mut self, id: NodeId, component: C) -> Result<()> {
        let event = ComponentEvent {
            node: id,
            component: component.type_name(),
        };
        self.node_mut(id)?.components.push(Box::new(component));
        self.revision += 1;
        self.component_added.emit(&event);
        Ok(())
    }

    /// Remove the first component of type `C`, returning it
    pub fn remove_component<C: Component>(&mut self, id: NodeId) -> Result<Box<C>> {
        let data = self.node_mut(id)?;
        let index = data
            .components
            .iter()
            .position(|c| c.as_any().is::<C>())
            .ok_or_else(|| {
                LanternError::ComponentNotFound(std::any::type_name::<C>().to_string())
            })?;

        let component = data.components.remove(index);
        let event = ComponentEvent {
            node: id,
            component: component.type_name(),
        };
        self.revision += 1;
        self.component_removed.emit(&event);

        // The downcast cannot fail: the slot was selected by type above.
        Ok(component
            .as_any_boxed()
            .downcast::<C>()
            .unwrap_or_else(|_| unreachable!()))
    }

    /// Get the first component of type `C` on a node
    pub fn component<C: Component>(&self, id: NodeId) -> Option<&C> {
        self.nodes
            .get(&id)?
            .components
            .iter()
            .find_map(|c| c.as_any().downcast_ref::<C>())
    }

    /// Get the first component of type `C` on a node, mutable
    pub fn component_mut<C: Component>(&mut self, id: NodeId) -> Option<&mut C> {
        self.nodes
            .get_mut(&id)?
            .components
            .iter_mut()
            .find_map(|c| c.as_any_mut().downcast_mut::<C>())
    }

    /// True when the node carries a component of type `C`
    pub fn has_component<C: Component>(&self, id: NodeId) -> bool {
        self.component::<C>(id).is_some()
    }

    /// Take the first component of type `C` off a node without signalling.
    ///
    /// Used by systems that must call a component with mutable access to the
    /// scene; pair with [`Scene::put_component`].
    pub fn take_component<C: Component>(&mut self, id: NodeId) -> Option<Box<C>> {
        let data = self.nodes.get_mut(&id)?;
        let index = data.components.iter().position(|c| c.as_any().is::<C>())?;
        let component = data.components.remove(index);
        Some(
            component
                .as_any_boxed()
                .downcast::<C>()
                .unwrap_or_else(|_| unreachable!()),
        )
    }

    /// Put back a component taken with [`Scene::take_component`]
    pub fn put_component<C: Component>(&mut self, id: NodeId, component: Box<C>) {
        if let Some(data) = self.nodes.get_mut(&id) {
            data.components.push(component);
        }
    }

    /// Bumped on every topology or component change; systems compare
    /// revisions to re-sync caches only when the graph actually changed.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Signal emitted after a node is created
    pub fn node_added(&mut self) -> &mut Signal<NodeId> {
        &mut self.node_added
    }

    /// Signal emitted after a node is removed
    pub fn node_removed(&mut self) -> &mut Signal<NodeId> {
        &mut self.node_removed
    }

    /// Signal emitted after a component is attached
    pub fn component_added(&mut self) -> &mut Signal<ComponentEvent> {
        &mut self.component_added
    }

    /// Signal emitted after a component is removed
    pub fn component_removed(&mut self) -> &mut Signal<ComponentEvent> {
        &mut self.component_removed
    }

    fn node(&self, id: NodeId) -> Result<&NodeData> {
        self.nodes
            .get(&id)
            .ok_or_else(|| LanternError::NodeNotFound(id.to_string()))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut NodeData> {
        self.nodes
            .get_mut(&id)
            .ok_or_else(|| LanternError::NodeNotFound(id.to_string()))
    }
}

trait AsAnyBoxed {
    fn as_any_boxed(self: Box<Self>) -> Box<dyn std::any::Any>;
}

impl AsAnyBoxed for dyn Component {
    fn as_any_boxed(self: Box<Self>) -> Box<dyn std::any::Any> {
        self
    }
}
