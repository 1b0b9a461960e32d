//! Perspective camera

use glam::Mat4;
use lantern_core::Result;
use lantern_data::Value;
use lantern_scene::{Component, Scene};

/// A perspective projection camera.
///
/// [`update_cameras`] derives the view matrix from the node's world matrix
/// and writes `view_matrix`, `projection_matrix`, `world_to_screen_matrix`
/// and `camera_position` into the node store.
#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    /// Vertical field of view in radians
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self {
            fov: 60f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl PerspectiveCamera {
    pub fn new(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            fov,
            aspect,
            near,
            far,
        }
    }

    /// Follow an output-size change
    pub fn update_projection(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }
}

impl Component for PerspectiveCamera {
    fn type_name(&self) -> &'static str {
        "PerspectiveCamera"
    }
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

/// Publish camera matrices for every node carrying a [`PerspectiveCamera`].
///
/// Runs after [`crate::update_world_transforms`] so the world matrix read
/// from the store is current; a camera without a transform sits at the
/// origin looking down -Z.
pub fn update_cameras(scene: &mut Scene) -> Result<()> {
    for node in scene.descendants(scene.root()) {
        let Some(camera) = scene.component::<PerspectiveCamera>(node) else {
            continue;
        };
        let projection = camera.projection_matrix();

        let store = scene.store_mut(node)?;
        let world = store
            .get("model_to_world_matrix")
            .and_then(Value::as_mat4)
            .unwrap_or(Mat4::IDENTITY);
        let view = world.inverse();

        store.set("view_matrix", view);
        store.set("projection_matrix", projection);
        store.set("world_to_screen_matrix", projection * view);
        store.set("camera_position", world.w_axis.truncate());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{update_world_transforms, Transform};
    use glam::Vec3;

    #[test]
    fn test_camera_publishes_matrices() {
        let mut scene = Scene::new();
        let cam = scene.create_node("camera").unwrap();
        scene.add_child(scene.root(), cam).unwrap();
        scene
            .add_component(cam, Transform::from_translation(Vec3::new(0.0, 0.0, 5.0)))
            .unwrap();
        scene
            .add_component(cam, PerspectiveCamera::default())
            .unwrap();

        update_world_transforms(&mut scene).unwrap();
        update_cameras(&mut scene).unwrap();

        let store = scene.store(cam).unwrap();
        let position = store.get("camera_position").and_then(Value::as_vec3).unwrap();
        assert_eq!(position, Vec3::new(0.0, 0.0, 5.0));

        let view = store.get("view_matrix").and_then(Value::as_mat4).unwrap();
        // The view matrix undoes the camera translation.
        assert_eq!(
            view.transform_point3(Vec3::new(0.0, 0.0, 5.0)),
            Vec3::ZERO
        );
        assert!(store.has("world_to_screen_matrix"));
    }

    #[test]
    fn test_update_projection_changes_aspect() {
        let mut camera = PerspectiveCamera::default();
        let before = camera.projection_matrix();
        camera.update_projection(1.0);
        assert_ne!(camera.projection_matrix(), before);
    }
}
