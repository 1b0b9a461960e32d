//! View frustum extraction and AABB classification

use glam::{Mat4, Vec3, Vec4};
use lantern_geometry::BoundingBox;

/// Result of testing a volume against the frustum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Containment {
    Inside,
    Intersecting,
    Outside,
}

/// Six view-frustum planes extracted from a view-projection matrix.
///
/// Plane normals point inward; a point is inside when its signed distance to
/// every plane is non-negative.
#[derive(Debug, Clone, Copy)]
pub struct Frustum {
    planes: [Vec4; 6],
}

impl Frustum {
    /// Gribb/Hartmann extraction from a column-major view-projection matrix.
    pub fn from_matrix(view_projection: Mat4) -> Self {
        let row = |i| Vec4::new(
            view_projection.x_axis[i],
            view_projection.y_axis[i],
            view_projection.z_axis[i],
            view_projection.w_axis[i],
        );
        let (r0, r1, r2, r3) = (row(0), row(1), row(2), row(3));

        let normalize = |p: Vec4| {
            let len = Vec3::new(p.x, p.y, p.z).length();
            if len > 0.0 {
                p / len
            } else {
                p
            }
        };

        Self {
            planes: [
                normalize(r3 + r0), // left
                normalize(r3 - r0), // right
                normalize(r3 + r1), // bottom
                normalize(r3 - r1), // top
                normalize(r3 + r2), // near
                normalize(r3 - r2), // far
            ],
        }
    }

    /// Classify an axis-aligned box against the frustum
    pub fn contains_aabb(&self, bounds: &BoundingBox) -> Containment {
        if bounds.is_empty() {
            return Containment::Outside;
        }

        let mut intersecting = false;
        for plane in &self.planes {
            let normal = Vec3::new(plane.x, plane.y, plane.z);
            // Positive vertex: box corner furthest along the plane normal.
            let positive = Vec3::new(
                if normal.x >= 0.0 { bounds.max.x } else { bounds.min.x },
                if normal.y >= 0.0 { bounds.max.y } else { bounds.min.y },
                if normal.z >= 0.0 { bounds.max.z } else { bounds.min.z },
            );
            if normal.dot(positive) + plane.w < 0.0 {
                return Containment::Outside;
            }

            let negative = Vec3::new(
                if normal.x >= 0.0 { bounds.min.x } else { bounds.max.x },
                if normal.y >= 0.0 { bounds.min.y } else { bounds.max.y },
                if normal.z >= 0.0 { bounds.min.z } else { bounds.max.z },
            );
            if normal.dot(negative) + plane.w < 0.0 {
                intersecting = true;
            }
        }

        if intersecting {
            Containment::Intersecting
        } else {
            Containment::Inside
        }
    }

    /// True unless the box is fully outside
    pub fn is_visible(&self, bounds: &BoundingBox) -> bool {
        self.contains_aabb(bounds) != Containment::Outside
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn look_down_z() -> Frustum {
        let projection = Mat4::perspective_rh(60f32.to_radians(), 1.0, 0.1, 100.0);
        let view = Mat4::look_at_rh(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y);
        Frustum::from_matrix(projection * view)
    }

    fn unit_box_at(center: Vec3) -> BoundingBox {
        BoundingBox::from_points([center - Vec3::splat(0.5), center + Vec3::splat(0.5)])
    }

    #[test]
    fn test_box_in_front_is_inside() {
        let frustum = look_down_z();
        assert_eq!(
            frustum.contains_aabb(&unit_box_at(Vec3::new(0.0, 0.0, -10.0))),
            Containment::Inside
        );
    }

    #[test]
    fn test_box_behind_is_outside() {
        let frustum = look_down_z();
        assert_eq!(
            frustum.contains_aabb(&unit_box_at(Vec3::new(0.0, 0.0, 10.0))),
            Containment::Outside
        );
    }

    #[test]
    fn test_box_far_to_the_side_is_outside() {
        let frustum = look_down_z();
        assert_eq!(
            frustum.contains_aabb(&unit_box_at(Vec3::new(100.0, 0.0, -10.0))),
            Containment::Outside
        );
    }

    #[test]
    fn test_box_straddling_near_plane_intersects() {
        let frustum = look_down_z();
        assert_eq!(
            frustum.contains_aabb(&unit_box_at(Vec3::new(0.0, 0.0, -0.1))),
            Containment::Intersecting
        );
    }

    #[test]
    fn test_empty_box_is_outside() {
        let frustum = look_down_z();
        assert_eq!(
            frustum.contains_aabb(&BoundingBox::EMPTY),
            Containment::Outside
        );
    }
}
