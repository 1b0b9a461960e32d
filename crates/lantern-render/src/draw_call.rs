//! A single assembled draw call

use crate::States;
use lantern_core::NodeId;
use lantern_data::{BindingMap, BindingSource, Store, Value};

/// One pass of one surface, with its program variant compiled and its
/// geometry uploaded. Uniform values are not baked in; they are pulled from
/// the stores at submission time so property changes flow into the next
/// frame without rebuilding the call.
#[derive(Debug, Clone)]
pub struct DrawCall {
    /// Node carrying the surface
    pub node: NodeId,
    pub pass_name: String,
    pub program: u32,
    pub uniform_bindings: BindingMap,
    pub states: States,
    pub geometry_id: u64,
    pub vertex_buffer: u32,
    pub index_buffer: u32,
    pub index_count: u32,
    pub triangle_count: usize,
}

impl DrawCall {
    /// Resolve uniform bindings against the three stores.
    ///
    /// Returns the resolved values and the names of required bindings that
    /// did not resolve; a non-empty missing list marks the call incomplete.
    pub fn resolve_uniforms(
        &self,
        target: &Store,
        renderer: &Store,
        root: &Store,
    ) -> (Vec<(String, Value)>, Vec<String>) {
        let mut uniforms = Vec::with_capacity(self.uniform_bindings.len());
        let mut missing = Vec::new();

        for (input, binding) in &self.uniform_bindings {
            let store = match binding.source {
                BindingSource::Target => target,
                BindingSource::Renderer => renderer,
                BindingSource::Root => root,
            };
            match store.get(&binding.property) {
                Some(value) => uniforms.push((input.clone(), value.clone())),
                None if binding.required => missing.push(input.clone()),
                None => {}
            }
        }

        (uniforms, missing)
    }
}
