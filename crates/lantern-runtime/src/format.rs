//! Scene file format definitions
//!
//! ```toml
//! [scene]
//! name = "demo"
//!
//! [[nodes]]
//! name = "camera"
//! transform = { translation = [0.0, 1.0, 5.0] }
//! camera = { fov = 60.0 }
//! renderer = { background = [0.1, 0.1, 0.1, 1.0] }
//!
//! [[nodes]]
//! name = "crate"
//! parent = "camera_rig"          # forward references allowed
//! surface = { geometry = "cube", material = "wood", effect = "basic" }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Root structure of a scene TOML file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneFile {
    pub scene: SceneMetadata,
    #[serde(default)]
    pub nodes: Vec<NodeDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneMetadata {
    pub name: String,
}

/// One node entry. Nodes without a parent attach under the root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<TransformDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera: Option<CameraDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub light: Option<LightDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surface: Option<SurfaceDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renderer: Option<RendererDef>,
}

impl NodeDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            layout: None,
            transform: None,
            camera: None,
            light: None,
            surface: None,
            renderer: None,
        }
    }
}

/// Translation / rotation (euler degrees, XYZ order) / scale
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformDef {
    #[serde(default)]
    pub translation: [f32; 3],
    #[serde(default)]
    pub rotation: [f32; 3],
    #[serde(default = "unit_scale")]
    pub scale: [f32; 3],
}

impl Default for TransformDef {
    fn default() -> Self {
        Self {
            translation: [0.0; 3],
            rotation: [0.0; 3],
            scale: unit_scale(),
        }
    }
}

fn unit_scale() -> [f32; 3] {
    [1.0; 3]
}

/// Perspective camera parameters; fov in degrees
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraDef {
    #[serde(default = "default_fov")]
    pub fov: f32,
    #[serde(default = "default_aspect")]
    pub aspect: f32,
    #[serde(default = "default_near")]
    pub near: f32,
    #[serde(default = "default_far")]
    pub far: f32,
}

impl Default for CameraDef {
    fn default() -> Self {
        Self {
            fov: default_fov(),
            aspect: default_aspect(),
            near: default_near(),
            far: default_far(),
        }
    }
}

fn default_fov() -> f32 {
    60.0
}
fn default_aspect() -> f32 {
    16.0 / 9.0
}
fn default_near() -> f32 {
    0.1
}
fn default_far() -> f32 {
    1000.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightKind {
    Ambient,
    Directional,
    Point,
    Spot,
}

/// A light of any kind; cone angles in degrees, used by spot lights only
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightDef {
    #[serde(rename = "type")]
    pub kind: LightKind,
    #[serde(default = "white")]
    pub color: [f32; 3],
    #[serde(default = "default_intensity")]
    pub intensity: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attenuation: Option<[f32; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inner_angle: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outer_angle: Option<f32>,
}

fn white() -> [f32; 3] {
    [1.0; 3]
}
fn default_intensity() -> f32 {
    1.0
}

/// A drawable. `material` names a library material; `properties` overlays
/// inline values on top of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfaceDef {
    pub geometry: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, toml::Value>,
    #[serde(default = "default_effect")]
    pub effect: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technique: Option<String>,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

fn default_effect() -> String {
    "basic".to_string()
}
fn default_visible() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RendererDef {
    #[serde(default = "default_background")]
    pub background: [f32; 4],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout_mask: Option<u32>,
    #[serde(default)]
    pub priority: f32,
}

impl Default for RendererDef {
    fn default() -> Self {
        Self {
            background: default_background(),
            layout_mask: None,
            priority: 0.0,
        }
    }
}

fn default_background() -> [f32; 4] {
    [0.0, 0.0, 0.0, 1.0]
}
