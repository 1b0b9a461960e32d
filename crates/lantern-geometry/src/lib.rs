//! Lantern Geometry - CPU-side mesh data
//!
//! Geometries hold interleaved vertex attributes and a triangle index list;
//! GPU buffers are created lazily by the renderer, so this crate stays free
//! of graphics dependencies and usable from importers and tests.

mod bounds;
mod geometry;
mod primitives;

pub use bounds::BoundingBox;
pub use geometry::{Geometry, VertexAttribute};
pub use primitives::{cube, quad, sphere, standard_attributes};
