//! Program signatures
//!
//! A pass compiles to one program per combination of macro values. The
//! signature is the canonical encoding of that combination: equal signatures
//! reuse the compiled program, different signatures trigger a new variant.

use lantern_data::{MacroBindingMap, Store, Value};

/// Resolved macro values for one draw call, in macro-name order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ProgramSignature {
    defines: Vec<(String, i32)>,
}

impl ProgramSignature {
    /// Resolve `macros` against the three candidate stores.
    ///
    /// A macro is defined when its bound property exists in its source store.
    /// Bool properties define the macro to 1/0, integer properties to their
    /// value, any other type to the binding default (or 1).
    pub fn resolve(
        macros: &MacroBindingMap,
        target: &Store,
        renderer: &Store,
        root: &Store,
    ) -> Self {
        let mut defines = Vec::new();

        for (name, binding) in macros {
            let store = match binding.source {
                lantern_data::BindingSource::Target => target,
                lantern_data::BindingSource::Renderer => renderer,
                lantern_data::BindingSource::Root => root,
            };

            let Some(value) = store.get(&binding.property) else {
                continue;
            };

            let define = match value {
                Value::Bool(false) => 0,
                Value::Bool(true) => 1,
                Value::Int(v) => *v,
                Value::UInt(v) => *v as i32,
                _ => binding.default.unwrap_or(1),
            };
            defines.push((name.clone(), define));
        }

        // MacroBindingMap is a BTreeMap, so the order is already canonical.
        Self { defines }
    }

    /// The resolved (macro, value) pairs
    pub fn defines(&self) -> &[(String, i32)] {
        &self.defines
    }

    /// True when no macro resolved
    pub fn is_empty(&self) -> bool {
        self.defines.is_empty()
    }
}

impl std::fmt::Display for ProgramSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (name, value) in &self.defines {
            if !first {
                write!(f, " ")?;
            }
            write!(f, "{}={}", name, value)?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lantern_data::{BindingSource, MacroBinding, Provider};

    fn macros() -> MacroBindingMap {
        let mut map = MacroBindingMap::new();
        map.insert(
            "NUM_DIRECTIONAL_LIGHTS".to_string(),
            MacroBinding {
                property: "directional_light_count".to_string(),
                source: BindingSource::Root,
                default: None,
            },
        );
        map.insert(
            "HAS_DIFFUSE_MAP".to_string(),
            MacroBinding {
                property: "diffuse_map".to_string(),
                source: BindingSource::Target,
                default: Some(1),
            },
        );
        map
    }

    #[test]
    fn test_undefined_macros_are_absent() {
        let signature = ProgramSignature::resolve(&macros(), &Store::new(), &Store::new(), &Store::new());
        assert!(signature.is_empty());
    }

    #[test]
    fn test_integer_property_becomes_value() {
        let mut root = Store::new();
        root.add_provider(Provider::new("lights").with("directional_light_count", 2i32));

        let signature = ProgramSignature::resolve(&macros(), &Store::new(), &Store::new(), &root);
        assert_eq!(
            signature.defines(),
            &[("NUM_DIRECTIONAL_LIGHTS".to_string(), 2)]
        );
    }

    #[test]
    fn test_texture_property_uses_default() {
        let mut target = Store::new();
        target.add_provider(Provider::new("material").with("diffuse_map", Value::Texture(7)));

        let signature = ProgramSignature::resolve(&macros(), &target, &Store::new(), &Store::new());
        assert_eq!(signature.defines(), &[("HAS_DIFFUSE_MAP".to_string(), 1)]);
    }

    #[test]
    fn test_equal_inputs_equal_signatures() {
        let mut root = Store::new();
        root.add_provider(Provider::new("lights").with("directional_light_count", 2i32));

        let a = ProgramSignature::resolve(&macros(), &Store::new(), &Store::new(), &root);
        let b = ProgramSignature::resolve(&macros(), &Store::new(), &Store::new(), &root);
        assert_eq!(a, b);
    }
}
