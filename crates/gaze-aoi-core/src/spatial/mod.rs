//! World-space primitives for gaze ray casting
//!
//! Right-handed coordinates:
//! - X: Right (+) / Left (-)
//! - Y: Up (+) / Down (-)
//! - Z: Forward (+) / Backward (-)

mod bounds;
mod camera;
mod point3d;
mod ray;
mod vector3d;

pub use bounds::Aabb;
pub use camera::Camera;
pub use point3d::Point3D;
pub use ray::Ray;
pub use vector3d::Vector3D;
