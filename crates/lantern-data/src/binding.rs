//! Binding descriptions
//!
//! Effect files declare where each shader input comes from: a property name
//! plus the store it is resolved against. Resolution happens when draw calls
//! are assembled, never inside the shaders themselves.

use std::collections::BTreeMap;

/// Which store a bound property is resolved against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BindingSource {
    /// The store of the node carrying the surface being drawn
    #[default]
    Target,
    /// The store of the node carrying the active renderer
    Renderer,
    /// The store of the scene root (lights, global uniforms)
    Root,
}

impl BindingSource {
    /// Parse the lowercase names used in effect files
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "target" => Some(BindingSource::Target),
            "renderer" => Some(BindingSource::Renderer),
            "root" => Some(BindingSource::Root),
            _ => None,
        }
    }
}

/// A single uniform or attribute binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    /// Property name looked up in the source store
    pub property: String,
    /// Store to resolve against
    pub source: BindingSource,
    /// Incomplete draw calls are skipped when a required binding is missing
    pub required: bool,
}

impl Binding {
    /// A required binding against the target store
    pub fn target(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            source: BindingSource::Target,
            required: true,
        }
    }

    /// A required binding against the renderer store
    pub fn renderer(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            source: BindingSource::Renderer,
            required: true,
        }
    }

    /// A required binding against the root store
    pub fn root(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            source: BindingSource::Root,
            required: true,
        }
    }

    /// Mark the binding optional
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }
}

/// Shader-input name -> binding. Ordered so signatures are deterministic.
pub type BindingMap = BTreeMap<String, Binding>;

/// A macro binding: defines a compile-time shader variant switch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroBinding {
    /// Property whose presence (or integer value) defines the macro
    pub property: String,
    /// Store to resolve against
    pub source: BindingSource,
    /// Default integer value when the property is a plain flag
    pub default: Option<i32>,
}

/// Macro name -> macro binding
pub type MacroBindingMap = BTreeMap<String, MacroBinding>;
