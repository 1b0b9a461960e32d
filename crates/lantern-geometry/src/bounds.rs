//! Axis-aligned bounding boxes

use glam::{Mat4, Vec3};

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    /// An inverted box that absorbs the first merged point
    pub const EMPTY: BoundingBox = BoundingBox {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    /// Build from a point cloud. Empty input yields [`BoundingBox::EMPTY`].
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        let mut bounds = Self::EMPTY;
        for point in points {
            bounds.merge_point(point);
        }
        bounds
    }

    /// True when no point has been merged
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x
    }

    /// Grow to include a point
    pub fn merge_point(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// Grow to include another box
    pub fn merge(&mut self, other: &BoundingBox) {
        if !other.is_empty() {
            self.merge_point(other.min);
            self.merge_point(other.max);
        }
    }

    /// Box center
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Full extent along each axis
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// The eight corner points
    pub fn corners(&self) -> [Vec3; 8] {
        let (min, max) = (self.min, self.max);
        [
            Vec3::new(min.x, min.y, min.z),
            Vec3::new(max.x, min.y, min.z),
            Vec3::new(min.x, max.y, min.z),
            Vec3::new(max.x, max.y, min.z),
            Vec3::new(min.x, min.y, max.z),
            Vec3::new(max.x, min.y, max.z),
            Vec3::new(min.x, max.y, max.z),
            Vec3::new(max.x, max.y, max.z),
        ]
    }

    /// The axis-aligned box enclosing this box under `matrix`
    pub fn transformed(&self, matrix: &Mat4) -> BoundingBox {
        if self.is_empty() {
            return *self;
        }
        BoundingBox::from_points(
            self.corners()
                .iter()
                .map(|corner| matrix.transform_point3(*corner)),
        )
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points() {
        let bounds = BoundingBox::from_points([Vec3::new(1.0, 0.0, -1.0), Vec3::new(-1.0, 2.0, 3.0)]);
        assert_eq!(bounds.min, Vec3::new(-1.0, 0.0, -1.0));
        assert_eq!(bounds.max, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(bounds.center(), Vec3::new(0.0, 1.0, 1.0));
    }

    #[test]
    fn test_empty() {
        let bounds = BoundingBox::EMPTY;
        assert!(bounds.is_empty());
        assert!(!BoundingBox::from_points([Vec3::ZERO]).is_empty());
    }

    #[test]
    fn test_merge() {
        let mut a = BoundingBox::from_points([Vec3::ZERO, Vec3::ONE]);
        let b = BoundingBox::from_points([Vec3::splat(2.0)]);
        a.merge(&b);
        assert_eq!(a.max, Vec3::splat(2.0));

        let mut c = BoundingBox::from_points([Vec3::ZERO]);
        c.merge(&BoundingBox::EMPTY);
        assert_eq!(c.min, Vec3::ZERO);
    }

    #[test]
    fn test_transformed_translation() {
        let bounds = BoundingBox::from_points([Vec3::ZERO, Vec3::ONE]);
        let moved = bounds.transformed(&Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0)));
        assert_eq!(moved.min, Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(moved.max, Vec3::new(11.0, 1.0, 1.0));
    }

    #[test]
    fn test_transformed_rotation_stays_aligned() {
        let bounds = BoundingBox::from_points([Vec3::splat(-1.0), Vec3::splat(1.0)]);
        let rotated = bounds.transformed(&Mat4::from_rotation_y(std::f32::consts::FRAC_PI_4));
        // A rotated unit cube grows along x/z but the box stays axis-aligned.
        assert!(rotated.max.x > 1.0);
        assert!((rotated.max.y - 1.0).abs() < 1e-5);
    }
}
