//! Node layout bitmasks
//!
//! Every node carries a `Layout`; every renderer carries a layout mask. A
//! drawable is picked up by a renderer only when the two intersect, which is
//! how picking buffers, reflection passes and hidden helpers get filtered
//! without touching the scene topology.

use serde::{Deserialize, Serialize};
use std::ops::{BitAnd, BitOr};

/// A 32-bit layout group mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Layout(pub u32);

impl Layout {
    /// No groups; never drawn
    pub const NOTHING: Layout = Layout(0);
    /// The group every node starts in
    pub const DEFAULT: Layout = Layout(1);
    /// Members skip frustum culling (skyboxes, full-screen quads)
    pub const IGNORE_CULLING: Layout = Layout(1 << 1);
    /// Helpers drawn only by debug renderers
    pub const DEBUG: Layout = Layout(1 << 2);
    /// Members stay in the graph but outside every default render mask
    pub const HIDDEN: Layout = Layout(1 << 3);
    /// Every group
    pub const EVERYTHING: Layout = Layout(u32::MAX);

    /// True when no group is set
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// True when `self` and `other` share at least one group
    pub fn intersects(&self, other: Layout) -> bool {
        self.0 & other.0 != 0
    }

    /// True when every group of `other` is set in `self`
    pub fn contains(&self, other: Layout) -> bool {
        self.0 & other.0 == other.0
    }
}

impl Default for Layout {
    fn default() -> Self {
        Layout::DEFAULT
    }
}

impl BitOr for Layout {
    type Output = Layout;

    fn bitor(self, rhs: Layout) -> Layout {
        Layout(self.0 | rhs.0)
    }
}

impl BitAnd for Layout {
    type Output = Layout;

    fn bitand(self, rhs: Layout) -> Layout {
        Layout(self.0 & rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_intersects_everything() {
        assert!(Layout::DEFAULT.intersects(Layout::EVERYTHING));
        assert!(!Layout::DEFAULT.intersects(Layout::NOTHING));
    }

    #[test]
    fn test_combining_groups() {
        let layout = Layout::DEFAULT | Layout::IGNORE_CULLING;
        assert!(layout.contains(Layout::IGNORE_CULLING));
        assert!(layout.intersects(Layout::DEFAULT));
        assert!(!layout.contains(Layout::DEBUG));
    }
}
