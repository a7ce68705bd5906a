//! Axis-aligned boxes for gaze hit testing

use serde::{Deserialize, Serialize};

use super::{Point3D, Ray};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Point3D,
    pub max: Point3D,
}

impl Aabb {
    /// Box spanning two corners in any order
    pub fn new(a: Point3D, b: Point3D) -> Self {
        Self {
            min: Point3D::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Point3D::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    pub fn contains(&self, point: Point3D) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Distance along `ray` to the first surface crossing (slab method).
    ///
    /// A ray starting inside the box reports distance 0.
    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        let origin = [ray.origin.x, ray.origin.y, ray.origin.z];
        let dir = [ray.direction.x, ray.direction.y, ray.direction.z];
        let min = [self.min.x, self.min.y, self.min.z];
        let max = [self.max.x, self.max.y, self.max.z];

        let mut t_near = f32::NEG_INFINITY;
        let mut t_far = f32::INFINITY;

        for axis in 0..3 {
            if dir[axis].abs() < f32::EPSILON {
                // Parallel to this slab: must already be between its planes
                if origin[axis] < min[axis] || origin[axis] > max[axis] {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / dir[axis];
            let mut t0 = (min[axis] - origin[axis]) * inv;
            let mut t1 = (max[axis] - origin[axis]) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_near = t_near.max(t0);
            t_far = t_far.min(t1);
            if t_near > t_far {
                return None;
            }
        }

        if t_far < 0.0 {
            return None;
        }
        Some(t_near.max(0.0))
    }
}
