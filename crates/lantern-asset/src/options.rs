//! Loading options

use lantern_data::Provider;
use lantern_geometry::Geometry;
use std::path::PathBuf;
use std::rc::Rc;

/// Per-load configuration.
///
/// Options are inherited: a loader clones the library's defaults, and a
/// queued file can override the clone. The processing hooks are shared
/// closures, so inheriting is cheap and a hook installed on the defaults
/// applies to every load that does not replace it.
#[derive(Clone, Default)]
pub struct Options {
    include_paths: Vec<PathBuf>,
    effect_override: Option<String>,
    technique_override: Option<String>,
    generate_mipmaps: bool,
    material_fn: Option<Rc<dyn Fn(Provider) -> Provider>>,
    geometry_fn: Option<Rc<dyn Fn(Geometry) -> Geometry>>,
    node_fn: Option<Rc<dyn Fn(&str) -> String>>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clone a parent's options, sharing its hooks
    pub fn inherit(parent: &Options) -> Self {
        parent.clone()
    }

    /// Add a directory searched when resolving relative paths
    pub fn with_include_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.include_paths.push(path.into());
        self
    }

    /// Force every surface loaded from symbols to use this effect
    pub fn with_effect_override(mut self, effect: impl Into<String>) -> Self {
        self.effect_override = Some(effect.into());
        self
    }

    /// Force every surface loaded from symbols to use this technique
    pub fn with_technique_override(mut self, technique: impl Into<String>) -> Self {
        self.technique_override = Some(technique.into());
        self
    }

    pub fn with_generate_mipmaps(mut self, generate: bool) -> Self {
        self.generate_mipmaps = generate;
        self
    }

    /// Hook run on every material a parser produces
    pub fn with_material_fn(mut self, f: impl Fn(Provider) -> Provider + 'static) -> Self {
        self.material_fn = Some(Rc::new(f));
        self
    }

    /// Hook run on every geometry a parser produces
    pub fn with_geometry_fn(mut self, f: impl Fn(Geometry) -> Geometry + 'static) -> Self {
        self.geometry_fn = Some(Rc::new(f));
        self
    }

    /// Hook mapping node names while building symbol scenes
    pub fn with_node_fn(mut self, f: impl Fn(&str) -> String + 'static) -> Self {
        self.node_fn = Some(Rc::new(f));
        self
    }

    pub fn include_paths(&self) -> &[PathBuf] {
        &self.include_paths
    }

    pub fn effect_override(&self) -> Option<&str> {
        self.effect_override.as_deref()
    }

    pub fn technique_override(&self) -> Option<&str> {
        self.technique_override.as_deref()
    }

    pub fn generate_mipmaps(&self) -> bool {
        self.generate_mipmaps
    }

    /// Apply the material hook, if any
    pub fn process_material(&self, material: Provider) -> Provider {
        match &self.material_fn {
            Some(f) => f(material),
            None => material,
        }
    }

    /// Apply the geometry hook, if any
    pub fn process_geometry(&self, geometry: Geometry) -> Geometry {
        match &self.geometry_fn {
            Some(f) => f(geometry),
            None => geometry,
        }
    }

    /// Apply the node-name hook, if any
    pub fn process_node_name(&self, name: &str) -> String {
        match &self.node_fn {
            Some(f) => f(name),
            None => name.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inherit_shares_hooks() {
        let parent = Options::new()
            .with_include_path("assets")
            .with_material_fn(|m| m.with("tweaked", true));

        let child = Options::inherit(&parent).with_include_path("extra");

        assert_eq!(child.include_paths().len(), 2);
        assert_eq!(parent.include_paths().len(), 1);

        let material = child.process_material(Provider::new("m"));
        assert!(material.has("tweaked"));
    }

    #[test]
    fn test_hooks_default_to_identity() {
        let options = Options::new();
        assert_eq!(options.process_node_name("pivot"), "pivot");
        assert!(!options.process_material(Provider::new("m")).has("tweaked"));
    }
}
