//! Spatial resolution of a screen point to the object under the gaze
//!
//! The scene itself lives outside this crate. It is reached through
//! [`SpatialService`], which unprojects screen points, reports ray
//! intersections and owns highlight state. [`resolve`] is the only piece of
//! logic on this side: build the near-to-far ray and keep the closest hit.

use std::collections::BTreeSet;

use gaze_aoi_config::HighlightMode;

use crate::spatial::{Point3D, Ray, Vector3D};
use crate::types::{ObjectId, ResolvedHit, ScreenPoint, Viewport};

/// One ray/geometry intersection reported by the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct Intersection {
    pub object_id: ObjectId,
    pub contact_point: Point3D,
    /// Distance from the ray origin
    pub distance: f32,
}

/// Scene, camera and renderer as seen by the gaze pipeline.
pub trait SpatialService {
    /// Pixel size of the active viewport.
    fn viewport_size(&self) -> Viewport;

    /// World position of `screen` on the camera near plane.
    fn world_near(&self, screen: ScreenPoint) -> Point3D;

    /// World position of `screen` on the camera far plane.
    fn world_far(&self, screen: ScreenPoint) -> Point3D;

    /// Every geometry the ray crosses, in any order.
    fn intersections(&self, ray: &Ray) -> Vec<Intersection>;

    /// Closest geometry hit by the ray from `origin` along `direction`.
    fn cast_ray(&self, origin: Point3D, direction: Vector3D) -> Option<ResolvedHit> {
        closest_intersection(self.intersections(&Ray::new(origin, direction))).map(|hit| {
            ResolvedHit {
                object_id: hit.object_id,
                contact_point: hit.contact_point,
            }
        })
    }

    /// Mark one object as highlighted.
    fn highlight(&mut self, object_id: &str, mode: HighlightMode);

    /// Remove every highlight.
    fn clear_highlights(&mut self);

    /// Vehicle registry consulted by [`HighlightMode::MatchingCategoryOnly`].
    fn vehicle_registry(&self) -> Option<&dyn VehicleRegistry> {
        None
    }
}

/// Registry of composite vehicles (traffic and multi-driver cars).
pub trait VehicleRegistry {
    fn registered_vehicle_ids(&self) -> BTreeSet<String>;

    /// Object ids of every geometric part of `vehicle_id`.
    fn vehicle_subgeometries(&self, vehicle_id: &str) -> Vec<ObjectId>;
}

/// Pick the hit with the smallest distance.
///
/// Equal distances are broken by the lexicographically smallest object id so
/// the result does not depend on the order the scene reports hits in.
pub fn closest_intersection(hits: Vec<Intersection>) -> Option<Intersection> {
    hits.into_iter()
        .filter(|hit| hit.distance.is_finite())
        .min_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then_with(|| a.object_id.cmp(&b.object_id))
        })
}

/// Cast the gaze ray through `screen` and return the closest object, if any.
pub fn resolve(service: &dyn SpatialService, screen: ScreenPoint) -> Option<ResolvedHit> {
    let near = service.world_near(screen);
    let far = service.world_far(screen);
    let direction = far - near;
    if direction.magnitude() <= f32::EPSILON {
        return None;
    }
    service.cast_ray(near, direction)
}
