//! The TOML effect file format
//!
//! An effect file declares bindings and states once at the top level and any
//! number of techniques; passes inherit the shared declarations and may
//! extend or override them locally:
//!
//! ```toml
//! name = "basic"
//!
//! [attributes]
//! a_position = { property = "position" }
//!
//! [uniforms]
//! u_model_to_world = { property = "model_to_world_matrix" }
//! u_world_to_screen = { property = "world_to_screen_matrix", source = "renderer" }
//!
//! [macros]
//! NUM_DIRECTIONAL_LIGHTS = { property = "directional_light_count", source = "root" }
//!
//! [[techniques]]
//! name = "default"
//!
//! [[techniques.passes]]
//! name = "base"
//! vertex_shader = "..."
//! fragment_shader = "..."
//! ```

use crate::{Blending, CompareMode, Effect, Pass, States, Technique, TriangleCulling};
use lantern_core::{LanternError, Result};
use lantern_data::{Binding, BindingMap, BindingSource, MacroBinding, MacroBindingMap};
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Deserialize)]
struct EffectFile {
    name: String,
    #[serde(default)]
    attributes: BTreeMap<String, BindingDef>,
    #[serde(default)]
    uniforms: BTreeMap<String, BindingDef>,
    #[serde(default)]
    macros: BTreeMap<String, MacroDef>,
    #[serde(default)]
    states: StatesDef,
    techniques: Vec<TechniqueDef>,
}

#[derive(Debug, Deserialize)]
struct TechniqueDef {
    name: String,
    passes: Vec<PassDef>,
}

#[derive(Debug, Deserialize)]
struct PassDef {
    name: String,
    vertex_shader: String,
    fragment_shader: String,
    #[serde(default)]
    fallback: Option<String>,
    #[serde(default)]
    attributes: BTreeMap<String, BindingDef>,
    #[serde(default)]
    uniforms: BTreeMap<String, BindingDef>,
    #[serde(default)]
    macros: BTreeMap<String, MacroDef>,
    #[serde(default)]
    states: Option<StatesDef>,
}

#[derive(Debug, Deserialize)]
struct BindingDef {
    property: String,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    required: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct MacroDef {
    property: String,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    default: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
struct StatesDef {
    #[serde(default)]
    priority: Option<f32>,
    #[serde(default)]
    z_sorted: Option<bool>,
    #[serde(default)]
    blending: Option<Blending>,
    #[serde(default)]
    color_mask: Option<bool>,
    #[serde(default)]
    depth_mask: Option<bool>,
    #[serde(default)]
    depth_function: Option<CompareMode>,
    #[serde(default)]
    triangle_culling: Option<TriangleCulling>,
    #[serde(default)]
    scissor: Option<[u32; 4]>,
}

impl StatesDef {
    fn apply(&self, base: &States) -> States {
        States {
            priority: self.priority.unwrap_or(base.priority),
            z_sorted: self.z_sorted.unwrap_or(base.z_sorted),
            blending: self.blending.unwrap_or(base.blending),
            color_mask: self.color_mask.unwrap_or(base.color_mask),
            depth_mask: self.depth_mask.unwrap_or(base.depth_mask),
            depth_function: self.depth_function.unwrap_or(base.depth_function),
            triangle_culling: self.triangle_culling.unwrap_or(base.triangle_culling),
            scissor: self.scissor.or(base.scissor),
        }
    }
}

fn parse_source(name: &str, def: Option<&str>) -> Result<BindingSource> {
    match def {
        None => Ok(BindingSource::Target),
        Some(s) => BindingSource::parse(s).ok_or_else(|| {
            LanternError::ParseError(format!("unknown binding source '{}' for {}", s, name))
        }),
    }
}

fn build_bindings(
    base: &BTreeMap<String, BindingDef>,
    overrides: &BTreeMap<String, BindingDef>,
) -> Result<BindingMap> {
    let mut map = BindingMap::new();
    for (name, def) in base.iter().chain(overrides.iter()) {
        map.insert(
            name.clone(),
            Binding {
                property: def.property.clone(),
                source: parse_source(name, def.source.as_deref())?,
                required: def.required.unwrap_or(true),
            },
        );
    }
    Ok(map)
}

fn build_macros(
    base: &BTreeMap<String, MacroDef>,
    overrides: &BTreeMap<String, MacroDef>,
) -> Result<MacroBindingMap> {
    let mut map = MacroBindingMap::new();
    for (name, def) in base.iter().chain(overrides.iter()) {
        map.insert(
            name.clone(),
            MacroBinding {
                property: def.property.clone(),
                source: parse_source(name, def.source.as_deref())?,
                default: def.default,
            },
        );
    }
    Ok(map)
}

/// Parse an effect from TOML source.
pub fn parse_effect(content: &str) -> Result<Effect> {
    let file: EffectFile = toml::from_str(content)?;
    let base_states = file.states.apply(&States::default());

    let mut techniques = Vec::with_capacity(file.techniques.len());
    for technique in &file.techniques {
        let mut passes = Vec::with_capacity(technique.passes.len());
        for pass in &technique.passes {
            let states = match &pass.states {
                Some(def) => def.apply(&base_states),
                None => base_states.clone(),
            };
            passes.push(Pass {
                name: pass.name.clone(),
                vertex_shader: pass.vertex_shader.clone(),
                fragment_shader: pass.fragment_shader.clone(),
                attribute_bindings: build_bindings(&file.attributes, &pass.attributes)?,
                uniform_bindings: build_bindings(&file.uniforms, &pass.uniforms)?,
                macro_bindings: build_macros(&file.macros, &pass.macros)?,
                states,
                fallback: pass.fallback.clone(),
            });
        }
        techniques.push(Technique {
            name: technique.name.clone(),
            passes,
        });
    }

    Effect::new(file.name, techniques)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASIC: &str = r#"
name = "basic"

[attributes]
a_position = { property = "position" }
a_normal = { property = "normal" }

[uniforms]
u_model_to_world = { property = "model_to_world_matrix" }
u_world_to_screen = { property = "world_to_screen_matrix", source = "renderer" }
u_diffuse_color = { property = "diffuse_color" }

[macros]
NUM_DIRECTIONAL_LIGHTS = { property = "directional_light_count", source = "root" }

[states]
priority = 2000.0

[[techniques]]
name = "default"

[[techniques.passes]]
name = "base"
vertex_shader = "vs"
fragment_shader = "fs"

[[techniques]]
name = "translucent"

[[techniques.passes]]
name = "blend"
vertex_shader = "vs"
fragment_shader = "fs"
fallback = "default"

[techniques.passes.states]
blending = "alpha"
z_sorted = true
depth_mask = false
"#;

    #[test]
    fn test_parse_basic_effect() {
        let effect = parse_effect(BASIC).unwrap();
        assert_eq!(effect.name(), "basic");

        let technique = effect.technique("default").unwrap();
        let pass = &technique.passes[0];
        assert_eq!(pass.attribute_bindings.len(), 2);
        assert_eq!(
            pass.uniform_bindings["u_world_to_screen"].source,
            BindingSource::Renderer
        );
        assert_eq!(
            pass.uniform_bindings["u_diffuse_color"].source,
            BindingSource::Target
        );
        assert_eq!(pass.states.priority, 2000.0);
        assert_eq!(pass.states.blending, Blending::Opaque);
    }

    #[test]
    fn test_pass_state_overrides_inherit() {
        let effect = parse_effect(BASIC).unwrap();
        let pass = &effect.technique("translucent").unwrap().passes[0];

        assert_eq!(pass.states.blending, Blending::Alpha);
        assert!(pass.states.z_sorted);
        assert!(!pass.states.depth_mask);
        // inherited from the effect-level [states]
        assert_eq!(pass.states.priority, 2000.0);
        assert_eq!(pass.fallback.as_deref(), Some("default"));
    }

    #[test]
    fn test_unknown_source_rejected() {
        let result = parse_effect(
            r#"
name = "bad"

[uniforms]
u_x = { property = "x", source = "world" }

[[techniques]]
name = "default"

[[techniques.passes]]
name = "p"
vertex_shader = "vs"
fragment_shader = "fs"
"#,
        );
        assert!(matches!(result, Err(LanternError::ParseError(_))));
    }

    #[test]
    fn test_effect_without_techniques_rejected() {
        assert!(parse_effect("name = \"x\"\ntechniques = []").is_err());
    }
}
