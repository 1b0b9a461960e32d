//! Scene loading from TOML files

use crate::format::{LightKind, SceneFile};
use glam::{EulerRot, Mat4, Quat, Vec3, Vec4};
use lantern_asset::AssetLibrary;
use lantern_component::{
    attach_surface, AmbientLight, DirectionalLight, PerspectiveCamera, PointLight, Renderer,
    SpotLight, Surface, Transform,
};
use lantern_core::{LanternError, Layout, Result};
use lantern_data::{value_from_toml, Provider};
use lantern_scene::Scene;
use std::path::Path;

/// Load a scene from a TOML file
pub fn load_scene<P: AsRef<Path>>(path: P, library: &AssetLibrary) -> Result<Scene> {
    let content = std::fs::read_to_string(path)?;
    load_scene_string(&content, library)
}

/// Build a scene from TOML content.
///
/// Nodes are created in a first pass and wired up in a second, so a node may
/// name a parent declared later in the file. Unknown parents and duplicate
/// node names are errors. Surface materials resolve against `library` with
/// inline properties overlaid.
pub fn load_scene_string(content: &str, library: &AssetLibrary) -> Result<Scene> {
    let file: SceneFile = toml::from_str(content)?;
    let mut scene = Scene::new();

    for def in &file.nodes {
        scene.create_node(&def.name)?;
    }

    for def in &file.nodes {
        let id = scene
            .node_by_name(&def.name)
            .unwrap_or_else(|| unreachable!());

        let parent = match &def.parent {
            Some(name) => scene.node_by_name(name).ok_or_else(|| {
                LanternError::SceneError(format!(
                    "node {} names unknown parent {}",
                    def.name, name
                ))
            })?,
            None => scene.root(),
        };
        scene.add_child(parent, id)?;

        if let Some(layout) = def.layout {
            scene.set_layout(id, Layout(layout))?;
        }

        if let Some(transform) = &def.transform {
            let rotation = Quat::from_euler(
                EulerRot::XYZ,
                transform.rotation[0].to_radians(),
                transform.rotation[1].to_radians(),
                transform.rotation[2].to_radians(),
            );
            let local = Mat4::from_scale_rotation_translation(
                Vec3::from_array(transform.scale),
                rotation,
                Vec3::from_array(transform.translation),
            );
            scene.add_component(id, Transform::new(local))?;
        }

        if let Some(camera) = &def.camera {
            scene.add_component(
                id,
                PerspectiveCamera::new(
                    camera.fov.to_radians(),
                    camera.aspect,
                    camera.near,
                    camera.far,
                ),
            )?;
        }

        if let Some(light) = &def.light {
            let color = Vec3::from_array(light.color);
            let attenuation = light
                .attenuation
                .map(Vec3::from_array)
                .unwrap_or(Vec3::new(1.0, 0.0, 0.0));
            match light.kind {
                LightKind::Ambient => scene.add_component(
                    id,
                    AmbientLight {
                        color,
                        intensity: light.intensity,
                    },
                )?,
                LightKind::Directional => scene.add_component(
                    id,
                    DirectionalLight {
                        color,
                        intensity: light.intensity,
                    },
                )?,
                LightKind::Point => scene.add_component(
                    id,
                    PointLight {
                        color,
                        intensity: light.intensity,
                        attenuation,
                    },
                )?,
                LightKind::Spot => {
                    let defaults = SpotLight::default();
                    scene.add_component(
                        id,
                        SpotLight {
                            color,
                            intensity: light.intensity,
                            inner_angle: light
                                .inner_angle
                                .map(f32::to_radians)
                                .unwrap_or(defaults.inner_angle),
                            outer_angle: light
                                .outer_angle
                                .map(f32::to_radians)
                                .unwrap_or(defaults.outer_angle),
                            attenuation,
                        },
                    )?
                }
            }
        }

        if let Some(def_surface) = &def.surface {
            let mut material = match &def_surface.material {
                Some(name) => library.material_instance(name).ok_or_else(|| {
                    LanternError::AssetNotFound(format!("material {name}"))
                })?,
                None => Provider::new("material"),
            };
            for (property, value) in &def_surface.properties {
                material.set(property.clone(), value_from_toml(property, value)?);
            }

            let mut surface = Surface::new(
                def_surface.geometry.clone(),
                material,
                def_surface.effect.clone(),
            );
            if let Some(technique) = &def_surface.technique {
                surface = surface.with_technique(technique.clone());
            }
            surface.set_visible(def_surface.visible);
            attach_surface(&mut scene, id, surface)?;
        }

        if let Some(renderer) = &def.renderer {
            let mut component = Renderer::new()
                .with_background(Vec4::from_array(renderer.background))
                .with_priority(renderer.priority);
            if let Some(mask) = renderer.layout_mask {
                component.set_layout_mask(Layout(mask));
            }
            scene.add_component(id, component)?;
        }
    }

    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENE: &str = r#"
[scene]
name = "demo"

[[nodes]]
name = "rig"
parent = "dolly"
transform = { translation = [0.0, 1.0, 5.0] }
camera = { fov = 45.0, aspect = 1.0 }
renderer = { background = [0.1, 0.2, 0.3, 1.0] }

[[nodes]]
name = "dolly"

[[nodes]]
name = "crate"
transform = { rotation = [0.0, 45.0, 0.0] }
surface = { geometry = "cube", properties = { diffuse_color = [1.0, 0.5, 0.2, 1.0] } }

[[nodes]]
name = "sun"
light = { type = "directional", intensity = 2.0 }
"#;

    #[test]
    fn test_forward_parent_reference() {
        let scene = load_scene_string(SCENE, &AssetLibrary::empty()).unwrap();

        let rig = scene.node_by_name("rig").unwrap();
        let dolly = scene.node_by_name("dolly").unwrap();
        assert_eq!(scene.parent(rig), Some(dolly));
        assert_eq!(scene.parent(dolly), Some(scene.root()));
    }

    #[test]
    fn test_components_built() {
        let scene = load_scene_string(SCENE, &AssetLibrary::empty()).unwrap();

        let rig = scene.node_by_name("rig").unwrap();
        let camera = scene.component::<PerspectiveCamera>(rig).unwrap();
        assert!((camera.fov - 45f32.to_radians()).abs() < 1e-6);
        assert!(scene.has_component::<Renderer>(rig));

        let crate_node = scene.node_by_name("crate").unwrap();
        let surface = scene.component::<Surface>(crate_node).unwrap();
        assert_eq!(surface.geometry(), "cube");
        assert_eq!(surface.effect(), "basic");
        assert!(scene
            .store(crate_node)
            .unwrap()
            .has("diffuse_color"));

        let sun = scene.node_by_name("sun").unwrap();
        assert_eq!(scene.component::<DirectionalLight>(sun).unwrap().intensity, 2.0);
    }

    #[test]
    fn test_unknown_parent_is_an_error() {
        let result = load_scene_string(
            r#"
[scene]
name = "bad"

[[nodes]]
name = "a"
parent = "nope"
"#,
            &AssetLibrary::empty(),
        );
        assert!(matches!(result, Err(LanternError::SceneError(_))));
    }

    #[test]
    fn test_duplicate_name_is_an_error() {
        let result = load_scene_string(
            r#"
[scene]
name = "bad"

[[nodes]]
name = "a"

[[nodes]]
name = "a"
"#,
            &AssetLibrary::empty(),
        );
        assert!(matches!(result, Err(LanternError::DuplicateNodeName(_))));
    }

    #[test]
    fn test_missing_material_is_an_error() {
        let result = load_scene_string(
            r#"
[scene]
name = "bad"

[[nodes]]
name = "crate"
surface = { geometry = "cube", material = "missing" }
"#,
            &AssetLibrary::empty(),
        );
        assert!(matches!(result, Err(LanternError::AssetNotFound(_))));
    }
}
