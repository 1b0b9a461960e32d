//! Fixed-function render states
//!
//! States attach to passes and control the non-programmable half of a draw
//! call. Defaults describe plain opaque rendering; translucent passes opt
//! into blending and z-sorting in their effect files.

use serde::Deserialize;

/// Blend mode applied to the color output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Blending {
    /// Source overwrites destination
    #[default]
    Opaque,
    /// src_alpha / one_minus_src_alpha
    Alpha,
    /// src_alpha / one
    Additive,
}

/// Depth comparison function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompareMode {
    Always,
    Equal,
    Greater,
    GreaterEqual,
    #[default]
    Less,
    LessEqual,
    Never,
    NotEqual,
}

/// Which triangle winding gets culled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriangleCulling {
    None,
    Front,
    #[default]
    Back,
}

/// The complete fixed-function state block of a pass.
#[derive(Debug, Clone, PartialEq)]
pub struct States {
    /// Draw order priority; higher renders first (opaque before translucent)
    pub priority: f32,
    /// Sort matching draw calls back-to-front every frame
    pub z_sorted: bool,
    pub blending: Blending,
    /// Write color output
    pub color_mask: bool,
    /// Write depth output
    pub depth_mask: bool,
    pub depth_function: CompareMode,
    pub triangle_culling: TriangleCulling,
    /// Restrict rendering to an x/y/width/height rectangle
    pub scissor: Option<[u32; 4]>,
}

impl States {
    /// Priority used by opaque passes
    pub const DEFAULT_PRIORITY: f32 = 1000.0;
    /// Priority used by translucent passes
    pub const TRANSPARENT_PRIORITY: f32 = 500.0;
}

impl Default for States {
    fn default() -> Self {
        Self {
            priority: Self::DEFAULT_PRIORITY,
            z_sorted: false,
            blending: Blending::Opaque,
            color_mask: true,
            depth_mask: true,
            depth_function: CompareMode::Less,
            triangle_culling: TriangleCulling::Back,
            scissor: None,
        }
    }
}

impl States {
    /// States for a standard alpha-blended translucent pass
    pub fn translucent() -> Self {
        Self {
            priority: Self::TRANSPARENT_PRIORITY,
            z_sorted: true,
            blending: Blending::Alpha,
            depth_mask: false,
            ..Self::default()
        }
    }

    /// A stable hash of the whole block, used as part of pipeline cache keys
    pub fn cache_key(&self) -> u64 {
        use std::hash::{Hash, Hasher};
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        self.priority.to_bits().hash(&mut hasher);
        self.z_sorted.hash(&mut hasher);
        self.blending.hash(&mut hasher);
        self.color_mask.hash(&mut hasher);
        self.depth_mask.hash(&mut hasher);
        self.depth_function.hash(&mut hasher);
        self.triangle_culling.hash(&mut hasher);
        self.scissor.hash(&mut hasher);
        hasher.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_opaque() {
        let states = States::default();
        assert_eq!(states.blending, Blending::Opaque);
        assert!(states.depth_mask);
        assert_eq!(states.priority, States::DEFAULT_PRIORITY);
    }

    #[test]
    fn test_translucent_preset() {
        let states = States::translucent();
        assert!(states.z_sorted);
        assert!(!states.depth_mask);
        assert!(states.priority < States::DEFAULT_PRIORITY);
    }

    #[test]
    fn test_cache_key_differs() {
        assert_ne!(
            States::default().cache_key(),
            States::translucent().cache_key()
        );
    }
}
