//! The drawable marker component

use lantern_core::{NodeId, Result, Signal};
use lantern_data::Provider;
use lantern_scene::{Component, Scene};

/// Marks a node as drawable.
///
/// A surface names its geometry and effect assets and carries the material
/// provider feeding the effect's `target`-sourced bindings. Attach with
/// [`attach_surface`] so the material lands in the node store.
pub struct Surface {
    geometry: String,
    effect: String,
    technique: String,
    material: Provider,
    visible: bool,
    technique_changed: Signal<String>,
}

impl Surface {
    pub fn new(
        geometry: impl Into<String>,
        material: Provider,
        effect: impl Into<String>,
    ) -> Self {
        Self {
            geometry: geometry.into(),
            effect: effect.into(),
            technique: lantern_render::Effect::DEFAULT_TECHNIQUE.to_string(),
            material,
            visible: true,
            technique_changed: Signal::new(),
        }
    }

    pub fn with_technique(mut self, technique: impl Into<String>) -> Self {
        self.technique = technique.into();
        self
    }

    pub fn geometry(&self) -> &str {
        &self.geometry
    }

    pub fn effect(&self) -> &str {
        &self.effect
    }

    pub fn technique(&self) -> &str {
        &self.technique
    }

    pub fn material(&self) -> &Provider {
        &self.material
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Switch techniques, notifying `technique_changed` listeners.
    ///
    /// The new name is not validated here; if the effect lacks it the
    /// draw-call pool reports the error on its next sync.
    pub fn set_technique(&mut self, technique: impl Into<String>) {
        let technique = technique.into();
        if technique != self.technique {
            self.technique = technique.clone();
            self.technique_changed.emit(&technique);
        }
    }

    /// Signal emitted after the technique name changes
    pub fn technique_changed(&mut self) -> &mut Signal<String> {
        &mut self.technique_changed
    }
}

impl Component for Surface {
    fn type_name(&self) -> &'static str {
        "Surface"
    }
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

/// Attach a surface to a node, pushing its material provider (renamed to
/// "material") and its geometry name into the node store.
pub fn attach_surface(scene: &mut Scene, node: NodeId, surface: Surface) -> Result<()> {
    let mut material = Provider::new("material");
    for (property, value) in surface.material.iter() {
        material.set(property, value.clone());
    }

    let store = scene.store_mut(node)?;
    store.remove_provider("material");
    store.add_provider(material);
    store.set("geometry", surface.geometry.clone());

    scene.add_component(node, surface)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lantern_data::Value;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn surface() -> Surface {
        Surface::new(
            "cube",
            Provider::new("phong").with("diffuse_color", glam::Vec4::ONE),
            "basic",
        )
    }

    #[test]
    fn test_attach_pushes_material_into_store() {
        let mut scene = Scene::new();
        let node = scene.create_node("drawable").unwrap();
        scene.add_child(scene.root(), node).unwrap();

        attach_surface(&mut scene, node, surface()).unwrap();

        let store = scene.store(node).unwrap();
        assert!(store.provider("material").is_some());
        assert_eq!(
            store.get("diffuse_color"),
            Some(&Value::Vec4(glam::Vec4::ONE))
        );
        assert_eq!(store.get("geometry").and_then(Value::as_str), Some("cube"));
        assert!(scene.has_component::<Surface>(node));
    }

    #[test]
    fn test_technique_change_signals() {
        let changed = Rc::new(RefCell::new(Vec::new()));
        let mut surface = surface();
        let c = changed.clone();
        surface
            .technique_changed()
            .connect(move |name: &String| c.borrow_mut().push(name.clone()));

        surface.set_technique("fancy");
        surface.set_technique("fancy"); // unchanged, no signal

        assert_eq!(surface.technique(), "fancy");
        assert_eq!(*changed.borrow(), vec!["fancy".to_string()]);
    }
}
