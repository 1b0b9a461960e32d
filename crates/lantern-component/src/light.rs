//! Light components and scene-wide light collection

use glam::{Mat4, Vec3};
use lantern_core::Result;
use lantern_data::{Provider, Value};
use lantern_scene::{Component, Scene};

/// Uniform background illumination.
#[derive(Debug, Clone)]
pub struct AmbientLight {
    pub color: Vec3,
    pub intensity: f32,
}

impl Default for AmbientLight {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            intensity: 0.2,
        }
    }
}

/// A light shining along the node's -Z axis from infinitely far away.
#[derive(Debug, Clone)]
pub struct DirectionalLight {
    pub color: Vec3,
    pub intensity: f32,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            intensity: 1.0,
        }
    }
}

/// A light radiating from the node's world position.
#[derive(Debug, Clone)]
pub struct PointLight {
    pub color: Vec3,
    pub intensity: f32,
    /// Constant, linear and quadratic attenuation coefficients
    pub attenuation: Vec3,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            intensity: 1.0,
            attenuation: Vec3::new(1.0, 0.0, 0.0),
        }
    }
}

/// A cone of light along the node's -Z axis.
#[derive(Debug, Clone)]
pub struct SpotLight {
    pub color: Vec3,
    pub intensity: f32,
    /// Full-intensity cone angle in radians
    pub inner_angle: f32,
    /// Cutoff cone angle in radians
    pub outer_angle: f32,
    pub attenuation: Vec3,
}

impl Default for SpotLight {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            intensity: 1.0,
            inner_angle: 20f32.to_radians(),
            outer_angle: 30f32.to_radians(),
            attenuation: Vec3::new(1.0, 0.0, 0.0),
        }
    }
}

macro_rules! impl_light_component {
    ($ty:ty, $name:literal) => {
        impl Component for $ty {
            fn type_name(&self) -> &'static str {
                $name
            }
            fn as_any(&self) -> &dyn std::any::Any {
                self
            }
            fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
                self
            }
        }
    };
}

impl_light_component!(AmbientLight, "AmbientLight");
impl_light_component!(DirectionalLight, "DirectionalLight");
impl_light_component!(PointLight, "PointLight");
impl_light_component!(SpotLight, "SpotLight");

fn world_matrix(scene: &Scene, node: lantern_core::NodeId) -> Mat4 {
    scene
        .store(node)
        .ok()
        .and_then(|s| s.get("model_to_world_matrix").and_then(Value::as_mat4))
        .unwrap_or(Mat4::IDENTITY)
}

fn forward(world: &Mat4) -> Vec3 {
    world.transform_vector3(Vec3::NEG_Z).normalize_or_zero()
}

fn push_vec3(out: &mut Vec<f32>, v: Vec3) {
    out.extend_from_slice(&[v.x, v.y, v.z]);
}

/// Gather every light in the scene into flat arrays on the root store.
///
/// Per light type the provider carries `<type>_light_count` plus parallel
/// float arrays, three floats per light for vectors, one per light for
/// scalars, in scene pre-order. Runs after world transforms so positions and
/// directions are current. The whole provider is replaced every pass, so
/// removed lights disappear and the store generation moves only when the
/// light set or a light property actually changed.
pub fn collect_lights(scene: &mut Scene) -> Result<()> {
    let mut ambient_color = Vec::new();
    let mut ambient_intensity = Vec::new();
    let mut directional_color = Vec::new();
    let mut directional_intensity = Vec::new();
    let mut directional_direction = Vec::new();
    let mut point_color = Vec::new();
    let mut point_intensity = Vec::new();
    let mut point_position = Vec::new();
    let mut point_attenuation = Vec::new();
    let mut spot_color = Vec::new();
    let mut spot_intensity = Vec::new();
    let mut spot_position = Vec::new();
    let mut spot_direction = Vec::new();
    let mut spot_angles = Vec::new();
    let mut spot_attenuation = Vec::new();

    for node in scene.descendants(scene.root()) {
        if let Some(light) = scene.component::<AmbientLight>(node) {
            push_vec3(&mut ambient_color, light.color);
            ambient_intensity.push(light.intensity);
        }
        if let Some(light) = scene.component::<DirectionalLight>(node) {
            let world = world_matrix(scene, node);
            push_vec3(&mut directional_color, light.color);
            directional_intensity.push(light.intensity);
            push_vec3(&mut directional_direction, forward(&world));
        }
        if let Some(light) = scene.component::<PointLight>(node) {
            let world = world_matrix(scene, node);
            push_vec3(&mut point_color, light.color);
            point_intensity.push(light.intensity);
            push_vec3(&mut point_position, world.w_axis.truncate());
            push_vec3(&mut point_attenuation, light.attenuation);
        }
        if let Some(light) = scene.component::<SpotLight>(node) {
            let world = world_matrix(scene, node);
            push_vec3(&mut spot_color, light.color);
            spot_intensity.push(light.intensity);
            push_vec3(&mut spot_position, world.w_axis.truncate());
            push_vec3(&mut spot_direction, forward(&world));
            spot_angles.push(light.inner_angle);
            spot_angles.push(light.outer_angle);
            push_vec3(&mut spot_attenuation, light.attenuation);
        }
    }

    let provider = Provider::new("lights")
        .with("ambient_light_count", ambient_intensity.len() as i32)
        .with("ambient_light_color", ambient_color)
        .with("ambient_light_intensity", ambient_intensity)
        .with("directional_light_count", directional_intensity.len() as i32)
        .with("directional_light_color", directional_color)
        .with("directional_light_intensity", directional_intensity)
        .with("directional_light_direction", directional_direction)
        .with("point_light_count", point_intensity.len() as i32)
        .with("point_light_color", point_color)
        .with("point_light_intensity", point_intensity)
        .with("point_light_position", point_position)
        .with("point_light_attenuation", point_attenuation)
        .with("spot_light_count", spot_intensity.len() as i32)
        .with("spot_light_color", spot_color)
        .with("spot_light_intensity", spot_intensity)
        .with("spot_light_position", spot_position)
        .with("spot_light_direction", spot_direction)
        .with("spot_light_angles", spot_angles)
        .with("spot_light_attenuation", spot_attenuation);

    let root = scene.root();
    let store = scene.store_mut(root)?;
    if store.provider("lights") != Some(&provider) {
        store.remove_provider("lights");
        store.add_provider(provider);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{update_world_transforms, Transform};

    #[test]
    fn test_lights_collected_into_root_store() {
        let mut scene = Scene::new();
        let sun = scene.create_node("sun").unwrap();
        let lamp = scene.create_node("lamp").unwrap();
        scene.add_child(scene.root(), sun).unwrap();
        scene.add_child(scene.root(), lamp).unwrap();

        scene.add_component(sun, DirectionalLight::default()).unwrap();
        scene
            .add_component(lamp, Transform::from_translation(Vec3::new(1.0, 2.0, 3.0)))
            .unwrap();
        scene.add_component(lamp, PointLight::default()).unwrap();

        update_world_transforms(&mut scene).unwrap();
        collect_lights(&mut scene).unwrap();

        let root = scene.root();
        let store = scene.store(root).unwrap();
        assert_eq!(
            store.get("directional_light_count").and_then(Value::as_int),
            Some(1)
        );
        assert_eq!(
            store.get("point_light_count").and_then(Value::as_int),
            Some(1)
        );
        let positions = store.get("point_light_position").unwrap();
        assert_eq!(
            positions,
            &Value::FloatArray(vec![1.0, 2.0, 3.0])
        );
    }

    #[test]
    fn test_removed_light_disappears() {
        let mut scene = Scene::new();
        let sun = scene.create_node("sun").unwrap();
        scene.add_child(scene.root(), sun).unwrap();
        scene.add_component(sun, DirectionalLight::default()).unwrap();

        collect_lights(&mut scene).unwrap();
        scene.remove_component::<DirectionalLight>(sun).unwrap();
        collect_lights(&mut scene).unwrap();

        let root = scene.root();
        assert_eq!(
            scene
                .store(root)
                .unwrap()
                .get("directional_light_count")
                .and_then(Value::as_int),
            Some(0)
        );
    }

    #[test]
    fn test_unchanged_lights_keep_generation() {
        let mut scene = Scene::new();
        let sun = scene.create_node("sun").unwrap();
        scene.add_child(scene.root(), sun).unwrap();
        scene.add_component(sun, DirectionalLight::default()).unwrap();

        collect_lights(&mut scene).unwrap();
        let root = scene.root();
        let generation = scene.store(root).unwrap().generation();

        collect_lights(&mut scene).unwrap();
        assert_eq!(scene.store(root).unwrap().generation(), generation);
    }
}
