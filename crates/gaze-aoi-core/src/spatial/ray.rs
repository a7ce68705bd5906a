use super::{Point3D, Vector3D};

/// A half-line with a unit direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Point3D,
    pub direction: Vector3D,
}

impl Ray {
    /// Build a ray; `direction` is normalized
    pub fn new(origin: Point3D, direction: Vector3D) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Ray starting at `from` and passing through `to`
    pub fn between(from: Point3D, to: Point3D) -> Self {
        Self::new(from, to - from)
    }

    /// Point at distance `t` along the ray
    pub fn at(&self, t: f32) -> Point3D {
        self.origin + self.direction * t
    }
}
