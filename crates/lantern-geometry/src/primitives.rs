//! Built-in geometries
//!
//! All primitives share the same layout: position (3), normal (3), uv (2),
//! which matches the attribute bindings of the stock effects.

use crate::{Geometry, VertexAttribute};

/// The position (3), normal (3), uv (2) attribute set used by the built-in
/// primitives and importers.
pub fn standard_attributes() -> Vec<VertexAttribute> {
    vec![
        VertexAttribute {
            name: "position".to_string(),
            size: 3,
            offset: 0,
        },
        VertexAttribute {
            name: "normal".to_string(),
            size: 3,
            offset: 3,
        },
        VertexAttribute {
            name: "uv".to_string(),
            size: 2,
            offset: 6,
        },
    ]
}

/// A unit cube centered on the origin, 24 vertices with per-face normals.
pub fn cube() -> Geometry {
    let h = 0.5f32;
    let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        // (normal, u axis, v axis)
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    ];

    let mut data = Vec::with_capacity(24 * 8);
    let mut indices = Vec::with_capacity(36);

    for (face, (normal, u_axis, v_axis)) in faces.iter().enumerate() {
        let base = (face * 4) as u32;
        for (u, v) in [(-1.0f32, -1.0f32), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            for i in 0..3 {
                data.push(h * (normal[i] + u * u_axis[i] + v * v_axis[i]));
            }
            data.extend_from_slice(normal);
            data.push(u * 0.5 + 0.5);
            data.push(v * 0.5 + 0.5);
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    Geometry::new(standard_attributes(), data, indices)
        .expect("cube generation produced invalid data")
}

/// A unit quad in the XY plane facing +Z.
pub fn quad() -> Geometry {
    let mut data = Vec::with_capacity(4 * 8);
    for (x, y, u, v) in [
        (-0.5f32, -0.5f32, 0.0f32, 0.0f32),
        (0.5, -0.5, 1.0, 0.0),
        (0.5, 0.5, 1.0, 1.0),
        (-0.5, 0.5, 0.0, 1.0),
    ] {
        data.extend_from_slice(&[x, y, 0.0, 0.0, 0.0, 1.0, u, v]);
    }

    Geometry::new(standard_attributes(), data, vec![0, 1, 2, 0, 2, 3])
        .expect("quad generation produced invalid data")
}

/// A unit-radius sphere from latitude/longitude subdivision.
///
/// `segments` is clamped to at least 3 rings and columns.
pub fn sphere(segments: u32) -> Geometry {
    let segments = segments.max(3);
    let rings = segments;
    let columns = segments;

    let mut data = Vec::new();
    let mut indices = Vec::new();

    for ring in 0..=rings {
        let phi = std::f32::consts::PI * ring as f32 / rings as f32;
        for column in 0..=columns {
            let theta = 2.0 * std::f32::consts::PI * column as f32 / columns as f32;
            let (x, y, z) = (
                phi.sin() * theta.cos(),
                phi.cos(),
                phi.sin() * theta.sin(),
            );
            data.extend_from_slice(&[x, y, z, x, y, z]);
            data.push(column as f32 / columns as f32);
            data.push(1.0 - ring as f32 / rings as f32);
        }
    }

    let row = columns + 1;
    for ring in 0..rings {
        for column in 0..columns {
            let a = ring * row + column;
            let b = a + row;
            indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
        }
    }

    Geometry::new(standard_attributes(), data, indices)
        .expect("sphere generation produced invalid data")
}
