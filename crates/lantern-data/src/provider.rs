//! Named property bags

use crate::Value;
use std::collections::BTreeMap;

/// A named set of properties contributed to a [`crate::Store`].
///
/// Providers keep their entries sorted by name so that iteration order, and
/// anything derived from it (program signatures, serialized material files),
/// is deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Provider {
    name: String,
    properties: BTreeMap<String, Value>,
}

impl Provider {
    /// Create an empty provider
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: BTreeMap::new(),
        }
    }

    /// The provider's name ("material", "transform", "light", ...)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set a property, returning `self` for chaining
    pub fn with(mut self, property: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(property, value);
        self
    }

    /// Set a property
    pub fn set(&mut self, property: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.properties.insert(property.into(), value.into());
        self
    }

    /// Get a property
    pub fn get(&self, property: &str) -> Option<&Value> {
        self.properties.get(property)
    }

    /// Remove a property, returning its previous value
    pub fn unset(&mut self, property: &str) -> Option<Value> {
        self.properties.remove(property)
    }

    /// Check whether a property exists
    pub fn has(&self, property: &str) -> bool {
        self.properties.contains_key(property)
    }

    /// Iterate properties in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of properties
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// True when the provider holds no properties
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_unset() {
        let mut provider = Provider::new("material");
        provider.set("shininess", 32.0f32);

        assert!(provider.has("shininess"));
        assert_eq!(provider.get("shininess"), Some(&Value::Float(32.0)));
        assert_eq!(provider.unset("shininess"), Some(Value::Float(32.0)));
        assert!(!provider.has("shininess"));
    }

    #[test]
    fn test_iteration_is_sorted() {
        let provider = Provider::new("p").with("b", 1i32).with("a", 2i32);
        let names: Vec<&str> = provider.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
