//! Local transforms and world-matrix propagation

use glam::Mat4;
use lantern_core::Result;
use lantern_scene::{Component, Scene};
use std::collections::HashMap;

/// A local transform matrix.
///
/// [`update_world_transforms`] composes these top-down and writes the result
/// into each node's store as `model_to_world_matrix`. Nodes without a
/// transform inherit their parent's world matrix unchanged.
#[derive(Debug, Clone)]
pub struct Transform {
    local: Mat4,
    /// World matrix written on the last propagation pass
    world: Option<Mat4>,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    pub fn identity() -> Self {
        Self::new(Mat4::IDENTITY)
    }

    pub fn new(local: Mat4) -> Self {
        Self { local, world: None }
    }

    pub fn from_translation(translation: glam::Vec3) -> Self {
        Self::new(Mat4::from_translation(translation))
    }

    pub fn local(&self) -> Mat4 {
        self.local
    }

    pub fn set_local(&mut self, local: Mat4) {
        self.local = local;
    }

    /// World matrix from the last [`update_world_transforms`] pass
    pub fn world(&self) -> Option<Mat4> {
        self.world
    }
}

impl Component for Transform {
    fn type_name(&self) -> &'static str {
        "Transform"
    }
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

/// Propagate world matrices from the root down.
///
/// Every node carrying a [`Transform`] gets `model_to_world_matrix` set in
/// its store; the store write is skipped when the matrix did not change, so
/// static subtrees do not bump store generations frame over frame.
pub fn update_world_transforms(scene: &mut Scene) -> Result<()> {
    let nodes = scene.descendants(scene.root());
    let mut worlds: HashMap<_, Mat4> = HashMap::with_capacity(nodes.len());

    for node in nodes {
        let parent_world = scene
            .parent(node)
            .and_then(|p| worlds.get(&p).copied())
            .unwrap_or(Mat4::IDENTITY);

        let Some(transform) = scene.component::<Transform>(node) else {
            worlds.insert(node, parent_world);
            continue;
        };

        let world = parent_world * transform.local();
        worlds.insert(node, world);

        let unchanged = transform.world() == Some(world);
        if let Some(transform) = scene.component_mut::<Transform>(node) {
            transform.world = Some(world);
        }
        if !unchanged {
            scene.store_mut(node)?.set("model_to_world_matrix", world);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use lantern_data::Value;

    #[test]
    fn test_world_matrices_compose() {
        let mut scene = Scene::new();
        let a = scene.create_node("a").unwrap();
        let b = scene.create_node("b").unwrap();
        scene.add_child(scene.root(), a).unwrap();
        scene.add_child(a, b).unwrap();

        scene
            .add_component(a, Transform::from_translation(Vec3::new(1.0, 0.0, 0.0)))
            .unwrap();
        scene
            .add_component(b, Transform::from_translation(Vec3::new(0.0, 2.0, 0.0)))
            .unwrap();

        update_world_transforms(&mut scene).unwrap();

        let world = scene
            .store(b)
            .unwrap()
            .get("model_to_world_matrix")
            .and_then(Value::as_mat4)
            .unwrap();
        assert_eq!(world.w_axis.truncate(), Vec3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn test_intermediate_node_without_transform_inherits() {
        let mut scene = Scene::new();
        let a = scene.create_node("a").unwrap();
        let b = scene.create_node("b").unwrap();
        let c = scene.create_node("c").unwrap();
        scene.add_child(scene.root(), a).unwrap();
        scene.add_child(a, b).unwrap();
        scene.add_child(b, c).unwrap();

        scene
            .add_component(a, Transform::from_translation(Vec3::X))
            .unwrap();
        scene.add_component(c, Transform::identity()).unwrap();

        update_world_transforms(&mut scene).unwrap();

        let world = scene
            .store(c)
            .unwrap()
            .get("model_to_world_matrix")
            .and_then(Value::as_mat4)
            .unwrap();
        assert_eq!(world.w_axis.truncate(), Vec3::X);
    }

    #[test]
    fn test_unchanged_transform_skips_store_write() {
        let mut scene = Scene::new();
        let a = scene.create_node("a").unwrap();
        scene.add_child(scene.root(), a).unwrap();
        scene.add_component(a, Transform::identity()).unwrap();

        update_world_transforms(&mut scene).unwrap();
        let generation = scene.store(a).unwrap().generation();

        update_world_transforms(&mut scene).unwrap();
        assert_eq!(scene.store(a).unwrap().generation(), generation);

        scene
            .component_mut::<Transform>(a)
            .unwrap()
            .set_local(Mat4::from_translation(Vec3::Y));
        update_world_transforms(&mut scene).unwrap();
        assert!(scene.store(a).unwrap().generation() > generation);
    }
}
