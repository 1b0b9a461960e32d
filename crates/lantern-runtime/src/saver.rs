//! Scene saving to TOML files

use crate::format::{
    CameraDef, LightDef, LightKind, NodeDef, RendererDef, SceneFile, SceneMetadata, SurfaceDef,
    TransformDef,
};
use glam::EulerRot;
use lantern_component::{
    AmbientLight, DirectionalLight, PerspectiveCamera, PointLight, Renderer, SpotLight, Surface,
    Transform,
};
use lantern_core::{Layout, Result};
use lantern_data::value_to_toml;
use lantern_scene::Scene;
use std::path::Path;

/// Serialize a scene to TOML content. [`crate::load_scene_string`] restores
/// it; texture-id material values are runtime-only and are dropped.
pub fn save_scene_string(scene: &Scene, name: &str) -> Result<String> {
    let mut file = SceneFile {
        scene: SceneMetadata {
            name: name.to_string(),
        },
        nodes: Vec::new(),
    };

    for id in scene.descendants(scene.root()) {
        if id == scene.root() {
            continue;
        }
        let mut def = NodeDef::new(scene.name(id)?);

        let parent = scene.parent(id);
        if let Some(parent) = parent.filter(|p| *p != scene.root()) {
            def.parent = Some(scene.name(parent)?.to_string());
        }
        if scene.layout(id) != Layout::DEFAULT {
            def.layout = Some(scene.layout(id).0);
        }

        if let Some(transform) = scene.component::<Transform>(id) {
            let (scale, rotation, translation) =
                transform.local().to_scale_rotation_translation();
            let (x, y, z) = rotation.to_euler(EulerRot::XYZ);
            def.transform = Some(TransformDef {
                translation: translation.to_array(),
                rotation: [x.to_degrees(), y.to_degrees(), z.to_degrees()],
                scale: scale.to_array(),
            });
        }

        if let Some(camera) = scene.component::<PerspectiveCamera>(id) {
            def.camera = Some(CameraDef {
                fov: camera.fov.to_degrees(),
                aspect: camera.aspect,
                near: camera.near,
                far: camera.far,
            });
        }

        def.light = light_def(scene, id);

        if let Some(surface) = scene.component::<Surface>(id) {
            let properties = surface
                .material()
                .iter()
                .filter_map(|(property, value)| {
                    value_to_toml(value).map(|v| (property.to_string(), v))
                })
                .collect();
            def.surface = Some(SurfaceDef {
                geometry: surface.geometry().to_string(),
                material: None,
                properties,
                effect: surface.effect().to_string(),
                technique: Some(surface.technique().to_string()),
                visible: surface.visible(),
            });
        }

        if let Some(renderer) = scene.component::<Renderer>(id) {
            def.renderer = Some(RendererDef {
                background: renderer.background().to_array(),
                layout_mask: (renderer.layout_mask() != Layout::DEFAULT)
                    .then(|| renderer.layout_mask().0),
                priority: renderer.priority(),
            });
        }

        file.nodes.push(def);
    }

    Ok(toml::to_string_pretty(&file)?)
}

/// Serialize a scene to a TOML file
pub fn save_scene<P: AsRef<Path>>(scene: &Scene, name: &str, path: P) -> Result<()> {
    let content = save_scene_string(scene, name)?;
    std::fs::write(path, content)?;
    Ok(())
}

fn light_def(scene: &Scene, id: lantern_core::NodeId) -> Option<LightDef> {
    if let Some(light) = scene.component::<AmbientLight>(id) {
        return Some(LightDef {
            kind: LightKind::Ambient,
            color: light.color.to_array(),
            intensity: light.intensity,
            attenuation: None,
            inner_angle: None,
            outer_angle: None,
        });
    }
    if let Some(light) = scene.component::<DirectionalLight>(id) {
        return Some(LightDef {
            kind: LightKind::Directional,
            color: light.color.to_array(),
            intensity: light.intensity,
            attenuation: None,
            inner_angle: None,
            outer_angle: None,
        });
    }
    if let Some(light) = scene.component::<PointLight>(id) {
        return Some(LightDef {
            kind: LightKind::Point,
            color: light.color.to_array(),
            intensity: light.intensity,
            attenuation: Some(light.attenuation.to_array()),
            inner_angle: None,
            outer_angle: None,
        });
    }
    if let Some(light) = scene.component::<SpotLight>(id) {
        return Some(LightDef {
            kind: LightKind::Spot,
            color: light.color.to_array(),
            intensity: light.intensity,
            attenuation: Some(light.attenuation.to_array()),
            inner_angle: Some(light.inner_angle.to_degrees()),
            outer_angle: Some(light.outer_angle.to_degrees()),
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load_scene_string;
    use lantern_asset::AssetLibrary;
    use lantern_data::Value;

    const SCENE: &str = r#"
[scene]
name = "demo"

[[nodes]]
name = "rig"
transform = { translation = [0.0, 1.0, 5.0] }
camera = { fov = 45.0, aspect = 1.0 }
renderer = {}

[[nodes]]
name = "crate"
parent = "rig"
surface = { geometry = "cube", properties = { diffuse_color = [1.0, 0.5, 0.2, 1.0] } }

[[nodes]]
name = "sun"
light = { type = "spot", inner_angle = 15.0, outer_angle = 25.0 }
"#;

    #[test]
    fn test_round_trip() {
        let library = AssetLibrary::empty();
        let scene = load_scene_string(SCENE, &library).unwrap();
        let saved = save_scene_string(&scene, "demo").unwrap();
        let restored = load_scene_string(&saved, &library).unwrap();

        let rig = restored.node_by_name("rig").unwrap();
        let crate_node = restored.node_by_name("crate").unwrap();
        assert_eq!(restored.parent(crate_node), Some(rig));

        let camera = restored.component::<PerspectiveCamera>(rig).unwrap();
        assert!((camera.fov - 45f32.to_radians()).abs() < 1e-4);

        let surface = restored.component::<Surface>(crate_node).unwrap();
        assert_eq!(surface.geometry(), "cube");
        assert_eq!(
            surface.material().get("diffuse_color"),
            Some(&Value::Vec4(glam::Vec4::new(1.0, 0.5, 0.2, 1.0)))
        );

        let sun = restored.node_by_name("sun").unwrap();
        let spot = restored.component::<SpotLight>(sun).unwrap();
        assert!((spot.inner_angle.to_degrees() - 15.0).abs() < 1e-4);
    }
}
