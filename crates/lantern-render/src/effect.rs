//! Effects, techniques and passes

use crate::States;
use lantern_core::{LanternError, Result};
use lantern_data::{BindingMap, MacroBindingMap};
use std::collections::HashMap;

/// One shader invocation inside a technique.
#[derive(Debug, Clone)]
pub struct Pass {
    pub name: String,
    pub vertex_shader: String,
    pub fragment_shader: String,
    /// Geometry attribute name per shader input
    pub attribute_bindings: BindingMap,
    /// Store property per shader uniform
    pub uniform_bindings: BindingMap,
    /// Store property per macro define
    pub macro_bindings: MacroBindingMap,
    pub states: States,
    /// Technique tried instead when this pass cannot be completed
    pub fallback: Option<String>,
}

/// An ordered list of passes selected together.
#[derive(Debug, Clone)]
pub struct Technique {
    pub name: String,
    pub passes: Vec<Pass>,
}

/// A shader program bundle: named techniques over shared bindings.
///
/// Effects are immutable once parsed; per-variant program compilation is
/// keyed off them by the draw-call pool.
#[derive(Debug, Clone)]
pub struct Effect {
    name: String,
    techniques: HashMap<String, Technique>,
}

impl Effect {
    /// The technique used when a surface does not name one
    pub const DEFAULT_TECHNIQUE: &'static str = "default";

    /// Build an effect from parsed techniques
    pub fn new(name: impl Into<String>, techniques: Vec<Technique>) -> Result<Self> {
        let name = name.into();
        if techniques.is_empty() {
            return Err(LanternError::EffectError(format!(
                "effect {} declares no techniques",
                name
            )));
        }

        let mut map = HashMap::new();
        for technique in techniques {
            if technique.passes.is_empty() {
                return Err(LanternError::EffectError(format!(
                    "technique {}/{} declares no passes",
                    name, technique.name
                )));
            }
            if map.insert(technique.name.clone(), technique).is_some() {
                return Err(LanternError::EffectError(format!(
                    "effect {} declares a duplicate technique",
                    name
                )));
            }
        }

        Ok(Self { name, techniques: map })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look a technique up by name
    pub fn technique(&self, name: &str) -> Result<&Technique> {
        self.techniques
            .get(name)
            .ok_or_else(|| LanternError::TechniqueNotFound {
                effect: self.name.clone(),
                technique: name.to_string(),
            })
    }

    /// True when the technique exists
    pub fn has_technique(&self, name: &str) -> bool {
        self.techniques.contains_key(name)
    }

    /// Technique names, unordered
    pub fn technique_names(&self) -> impl Iterator<Item = &str> {
        self.techniques.keys().map(|s| s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pass(name: &str) -> Pass {
        Pass {
            name: name.to_string(),
            vertex_shader: "vs".to_string(),
            fragment_shader: "fs".to_string(),
            attribute_bindings: BindingMap::new(),
            uniform_bindings: BindingMap::new(),
            macro_bindings: MacroBindingMap::new(),
            states: States::default(),
            fallback: None,
        }
    }

    #[test]
    fn test_technique_lookup() {
        let effect = Effect::new(
            "basic",
            vec![Technique {
                name: "default".to_string(),
                passes: vec![pass("p0")],
            }],
        )
        .unwrap();

        assert!(effect.technique("default").is_ok());
        assert!(matches!(
            effect.technique("missing"),
            Err(LanternError::TechniqueNotFound { .. })
        ));
    }

    #[test]
    fn test_empty_effect_rejected() {
        assert!(Effect::new("empty", vec![]).is_err());
        assert!(Effect::new(
            "no-passes",
            vec![Technique {
                name: "default".to_string(),
                passes: vec![],
            }]
        )
        .is_err());
    }

    #[test]
    fn test_duplicate_technique_rejected() {
        let technique = Technique {
            name: "default".to_string(),
            passes: vec![pass("p0")],
        };
        assert!(Effect::new("dup", vec![technique.clone(), technique]).is_err());
    }
}
