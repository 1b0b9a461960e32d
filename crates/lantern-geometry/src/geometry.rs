//! Interleaved vertex data

use crate::BoundingBox;
use glam::Vec3;
use lantern_core::{LanternError, Result};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_GEOMETRY_ID: AtomicU64 = AtomicU64::new(1);

/// Describes one attribute inside the interleaved vertex buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexAttribute {
    /// Attribute name ("position", "normal", "uv")
    pub name: String,
    /// Number of f32 components
    pub size: u32,
    /// Offset in f32s from the start of a vertex
    pub offset: u32,
}

/// A mesh: interleaved f32 vertex data plus a u32 triangle index list.
///
/// `position` (3 floats) is mandatory; other attributes are free-form and
/// matched against effect attribute bindings by name.
#[derive(Debug, Clone)]
pub struct Geometry {
    id: u64,
    attributes: Vec<VertexAttribute>,
    stride: u32,
    data: Vec<f32>,
    indices: Vec<u32>,
    bounds: BoundingBox,
}

impl Geometry {
    /// Build a geometry, validating attribute layout and index ranges.
    pub fn new(
        attributes: Vec<VertexAttribute>,
        data: Vec<f32>,
        indices: Vec<u32>,
    ) -> Result<Self> {
        let stride: u32 = attributes.iter().map(|a| a.size).sum();
        if stride == 0 {
            return Err(LanternError::GeometryError(
                "geometry has no vertex attributes".to_string(),
            ));
        }

        for attribute in &attributes {
            if attribute.offset + attribute.size > stride {
                return Err(LanternError::GeometryError(format!(
                    "attribute {} overflows the vertex stride",
                    attribute.name
                )));
            }
        }

        let position = attributes
            .iter()
            .find(|a| a.name == "position")
            .ok_or_else(|| {
                LanternError::GeometryError("geometry is missing a position attribute".to_string())
            })?;
        if position.size != 3 {
            return Err(LanternError::GeometryError(
                "position attribute must have 3 components".to_string(),
            ));
        }
        let position_offset = position.offset as usize;

        if data.len() % stride as usize != 0 {
            return Err(LanternError::GeometryError(format!(
                "vertex data length {} is not a multiple of the stride {}",
                data.len(),
                stride
            )));
        }
        let vertex_count = data.len() / stride as usize;

        if indices.len() % 3 != 0 {
            return Err(LanternError::GeometryError(
                "index count is not a multiple of 3".to_string(),
            ));
        }
        if let Some(max) = indices.iter().max() {
            if *max as usize >= vertex_count {
                return Err(LanternError::GeometryError(format!(
                    "index {} out of range for {} vertices",
                    max, vertex_count
                )));
            }
        }

        let bounds = BoundingBox::from_points(
            (0..vertex_count).map(|v| {
                let base = v * stride as usize + position_offset;
                Vec3::new(data[base], data[base + 1], data[base + 2])
            }),
        );

        Ok(Self {
            id: NEXT_GEOMETRY_ID.fetch_add(1, Ordering::Relaxed),
            attributes,
            stride,
            data,
            indices,
            bounds,
        })
    }

    /// Process-stable id, used as a batching sort key and GPU cache key
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Attribute layout
    pub fn attributes(&self) -> &[VertexAttribute] {
        &self.attributes
    }

    /// Look an attribute up by name
    pub fn attribute(&self, name: &str) -> Option<&VertexAttribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Floats per vertex
    pub fn stride(&self) -> u32 {
        self.stride
    }

    /// Interleaved vertex data
    pub fn vertex_data(&self) -> &[f32] {
        &self.data
    }

    /// Triangle indices
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.data.len() / self.stride as usize
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Object-space bounding box
    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }
}
