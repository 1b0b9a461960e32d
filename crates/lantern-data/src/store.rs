//! Property stores
//!
//! A store aggregates providers. Lookup resolves to the provider added last,
//! so a surface's own material can shadow a default one, the way render
//! variables cascade in the effect system.

use crate::{Provider, Value};
use lantern_core::Signal;

/// Payload for store property signals
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyEvent {
    /// Name of the provider the property lives in
    pub provider: String,
    /// Property name
    pub property: String,
}

/// An ordered collection of [`Provider`]s with change signals.
#[derive(Default)]
pub struct Store {
    providers: Vec<Provider>,
    generation: u64,
    property_added: Signal<PropertyEvent>,
    property_changed: Signal<PropertyEvent>,
    property_removed: Signal<PropertyEvent>,
}

impl Store {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a provider. Emits `property_added` for each of its properties.
    pub fn add_provider(&mut self, provider: Provider) {
        let events: Vec<PropertyEvent> = provider
            .iter()
            .map(|(property, _)| PropertyEvent {
                provider: provider.name().to_string(),
                property: property.to_string(),
            })
            .collect();

        self.providers.push(provider);
        self.generation += 1;

        for event in &events {
            self.property_added.emit(event);
        }
    }

    /// Remove the first provider with the given name, emitting
    /// `property_removed` for each of its properties.
    pub fn remove_provider(&mut self, name: &str) -> Option<Provider> {
        let index = self.providers.iter().position(|p| p.name() == name)?;
        let provider = self.providers.remove(index);
        self.generation += 1;

        for (property, _) in provider.iter() {
            self.property_removed.emit(&PropertyEvent {
                provider: name.to_string(),
                property: property.to_string(),
            });
        }

        Some(provider)
    }

    /// Get a provider by name
    pub fn provider(&self, name: &str) -> Option<&Provider> {
        self.providers.iter().find(|p| p.name() == name)
    }

    /// Resolve a property. Later providers shadow earlier ones.
    pub fn get(&self, property: &str) -> Option<&Value> {
        self.providers
            .iter()
            .rev()
            .find_map(|p| p.get(property))
    }

    /// Check whether any provider declares the property
    pub fn has(&self, property: &str) -> bool {
        self.get(property).is_some()
    }

    /// Set a property.
    ///
    /// The value lands in the last provider already declaring the property.
    /// If none does, a provider named "default" is appended (created on
    /// first use) and receives it.
    pub fn set(&mut self, property: impl Into<String>, value: impl Into<Value>) {
        let property = property.into();
        let value = value.into();
        self.generation += 1;

        if let Some(provider) = self
            .providers
            .iter_mut()
            .rev()
            .find(|p| p.has(&property))
        {
            let changed = provider.get(&property) != Some(&value);
            let event = PropertyEvent {
                provider: provider.name().to_string(),
                property: property.clone(),
            };
            provider.set(property, value);
            if changed {
                self.property_changed.emit(&event);
            }
            return;
        }

        if self.providers.iter().all(|p| p.name() != "default") {
            self.providers.push(Provider::new("default"));
        }
        let provider = self
            .providers
            .iter_mut()
            .find(|p| p.name() == "default")
            .unwrap();
        provider.set(property.clone(), value);

        self.property_added.emit(&PropertyEvent {
            provider: "default".to_string(),
            property,
        });
    }

    /// Remove a property from every provider declaring it
    pub fn unset(&mut self, property: &str) {
        let mut events = Vec::new();
        for provider in &mut self.providers {
            if provider.unset(property).is_some() {
                events.push(PropertyEvent {
                    provider: provider.name().to_string(),
                    property: property.to_string(),
                });
            }
        }
        if !events.is_empty() {
            self.generation += 1;
            for event in &events {
                self.property_removed.emit(event);
            }
        }
    }

    /// Monotonic counter bumped on every mutation. Draw-call pools compare
    /// generations to decide whether macro signatures must be re-resolved.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Signal emitted when a property first appears
    pub fn property_added(&mut self) -> &mut Signal<PropertyEvent> {
        &mut self.property_added
    }

    /// Signal emitted when an existing property's value changes
    pub fn property_changed(&mut self) -> &mut Signal<PropertyEvent> {
        &mut self.property_changed
    }

    /// Signal emitted when a property disappears
    pub fn property_removed(&mut self) -> &mut Signal<PropertyEvent> {
        &mut self.property_removed
    }

    /// Iterate providers in insertion order
    pub fn providers(&self) -> impl Iterator<Item = &Provider> {
        self.providers.iter()
    }
}
