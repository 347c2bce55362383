//! Axis-aligned bounding boxes.

use cgmath::{Point3, Vector3};

use super::{Position, VoxelIndex};

/// An axis-aligned box in world space.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb {
    pub min: Position,
    pub max: Position,
}

impl Aabb {
    /// Builds a box from two corners given in any order.
    pub fn from_bounds(a: Position, b: Position) -> Self {
        Aabb {
            min: Point3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Point3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Builds a box from a `[min_x, min_y, min_z, max_x, max_y, max_z]` array.
    pub fn from_array(bounds: [f64; 6]) -> Self {
        Aabb::from_bounds(
            Point3::new(bounds[0], bounds[1], bounds[2]),
            Point3::new(bounds[3], bounds[4], bounds[5]),
        )
    }

    /// The box occupied by an upright agent whose feet are centred on `feet`.
    pub fn agent_footprint(feet: Position, half_width: f64, height: f64) -> Self {
        Aabb {
            min: Point3::new(feet.x - half_width, feet.y, feet.z - half_width),
            max: Point3::new(feet.x + half_width, feet.y + height, feet.z + half_width),
        }
    }

    /// The box translated so that its local origin sits at block `voxel`.
    pub fn offset_to(&self, voxel: VoxelIndex) -> Self {
        let offset = Vector3::new(voxel.x as f64, voxel.y as f64, voxel.z as f64);
        Aabb {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Whether the two boxes overlap with non-zero volume. Touching faces do not count.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_boxes_do_not_intersect() {
        let a = Aabb::from_array([0.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
        let b = a.offset_to(Point3::new(1, 0, 0));
        assert!(!a.intersects(&b));
        let c = Aabb::from_array([0.5, 0.5, 0.5, 1.5, 1.5, 1.5]);
        assert!(a.intersects(&c));
    }

    #[test]
    fn footprint_dimensions() {
        let bb = Aabb::agent_footprint(Point3::new(0.5, 0.0, 0.5), 0.3, 1.9);
        assert!((bb.min.x - 0.2).abs() < 1e-9);
        assert!((bb.max.x - 0.8).abs() < 1e-9);
        assert_eq!(bb.min.y, 0.0);
        assert!((bb.max.y - 1.9).abs() < 1e-9);
    }

    #[test]
    fn from_bounds_normalises_corners() {
        let bb = Aabb::from_bounds(Point3::new(1.0, 2.0, 3.0), Point3::new(0.0, 0.0, 0.0));
        assert_eq!(bb.min, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(bb.max, Point3::new(1.0, 2.0, 3.0));
    }
}
