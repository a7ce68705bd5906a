//! Pinhole camera used to turn screen points into world-space rays

use serde::{Deserialize, Serialize};

use super::{Point3D, Ray, Vector3D};
use crate::types::{ScreenPoint, Viewport};

/// Perspective camera; screen pixel y grows downwards
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Camera {
    pub position: Point3D,
    /// Viewing direction
    pub forward: Vector3D,
    /// Approximate up direction, re-orthogonalized against `forward`
    pub up: Vector3D,
    /// Vertical field of view in degrees
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Point3D::ORIGIN,
            forward: Vector3D::FORWARD,
            up: Vector3D::UP,
            fov_y_degrees: 45.0,
            near: 1.0,
            far: 1000.0,
        }
    }
}

impl Camera {
    /// Check that the camera spans a usable view frustum.
    pub fn validate(&self) -> Result<(), String> {
        let values = [
            self.position.x,
            self.position.y,
            self.position.z,
            self.forward.x,
            self.forward.y,
            self.forward.z,
            self.up.x,
            self.up.y,
            self.up.z,
            self.fov_y_degrees,
            self.near,
            self.far,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err("camera values must be finite".to_string());
        }
        if self.forward.magnitude() <= f32::EPSILON {
            return Err("camera forward must be non-zero".to_string());
        }
        if self.up.magnitude() <= f32::EPSILON {
            return Err("camera up must be non-zero".to_string());
        }
        if self
            .up
            .normalize()
            .cross(&self.forward.normalize())
            .magnitude()
            <= 1e-4
        {
            return Err("camera up must not be parallel to forward".to_string());
        }
        if !(self.fov_y_degrees > 0.0 && self.fov_y_degrees < 180.0) {
            return Err(format!(
                "camera fov_y_degrees must be in (0, 180), got {}",
                self.fov_y_degrees
            ));
        }
        if !(self.near > 0.0 && self.far > self.near) {
            return Err(format!(
                "camera planes need 0 < near < far, got near {} far {}",
                self.near, self.far
            ));
        }
        Ok(())
    }

    /// Orthonormal (forward, right, up) basis
    fn basis(&self) -> (Vector3D, Vector3D, Vector3D) {
        let forward = self.forward.normalize();
        let up_hint = self.up.normalize();
        let right = up_hint.cross(&forward).normalize();
        let up = forward.cross(&right);
        (forward, right, up)
    }

    /// World position of `screen` on the plane at `depth` (0 = near, 1 = far)
    pub fn world_coordinates(&self, screen: ScreenPoint, viewport: Viewport, depth: f32) -> Point3D {
        let (forward, right, up) = self.basis();

        let width = viewport.width.max(1.0);
        let height = viewport.height.max(1.0);
        let ndc_x = (2.0 * screen.x / width - 1.0) as f32;
        let ndc_y = (1.0 - 2.0 * screen.y / height) as f32;
        let aspect = (width / height) as f32;

        let distance = self.near + (self.far - self.near) * depth;
        let half_h = distance * (self.fov_y_degrees.to_radians() / 2.0).tan();
        let half_w = half_h * aspect;

        self.position + forward * distance + right * (ndc_x * half_w) + up * (ndc_y * half_h)
    }

    /// Ray from the near plane through the far plane at `screen`
    pub fn screen_ray(&self, screen: ScreenPoint, viewport: Viewport) -> Ray {
        let near = self.world_coordinates(screen, viewport, 0.0);
        let far = self.world_coordinates(screen, viewport, 1.0);
        Ray::between(near, far)
    }
}
