//! Box-based reference scene
//!
//! A minimal [`SpatialService`] for running the pipeline without a renderer:
//! every object is an axis-aligned box, and vehicles are named groups of
//! boxes. Scenes load from TOML:
//!
//! ```toml
//! [viewport]
//! width = 1920
//! height = 1080
//!
//! [camera]
//! position = { x = 0, y = 1.2, z = 0 }
//!
//! [[objects]]
//! id = "Root/car1/body"
//! min = { x = -1, y = 0, z = 10 }
//! max = { x = 1, y = 1.5, z = 14 }
//!
//! [[vehicles]]
//! id = "car1"
//! parts = ["Root/car1/body"]
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use gaze_aoi_config::HighlightMode;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{GazeError, Result};
use crate::resolver::{Intersection, SpatialService, VehicleRegistry};
use crate::spatial::{Aabb, Camera, Point3D, Ray};
use crate::types::{ObjectId, ScreenPoint, Viewport};

#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub id: ObjectId,
    pub bounds: Aabb,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VehicleEntry {
    pub id: String,
    #[serde(default)]
    pub parts: Vec<ObjectId>,
}

#[derive(Debug, Deserialize)]
struct ObjectEntry {
    id: ObjectId,
    min: Point3D,
    max: Point3D,
}

fn default_viewport() -> Viewport {
    Viewport::new(1920.0, 1080.0)
}

#[derive(Debug, Deserialize)]
struct SceneFile {
    #[serde(default)]
    camera: Camera,
    #[serde(default = "default_viewport")]
    viewport: Viewport,
    #[serde(default)]
    objects: Vec<ObjectEntry>,
    #[serde(default)]
    vehicles: Vec<VehicleEntry>,
}

#[derive(Debug, Clone)]
pub struct BoxScene {
    camera: Camera,
    viewport: Viewport,
    objects: Vec<SceneObject>,
    vehicles: Vec<VehicleEntry>,
    highlighted: BTreeMap<ObjectId, HighlightMode>,
}

impl Default for BoxScene {
    fn default() -> Self {
        Self::new(Camera::default(), default_viewport())
    }
}

impl BoxScene {
    pub fn new(camera: Camera, viewport: Viewport) -> Self {
        Self {
            camera,
            viewport,
            objects: Vec::new(),
            vehicles: Vec::new(),
            highlighted: BTreeMap::new(),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| GazeError::io(path, e))?;
        let scene = Self::from_toml_str(&contents)?;
        info!(
            "Loaded scene {} ({} objects, {} vehicles)",
            path.display(),
            scene.objects.len(),
            scene.vehicles.len()
        );
        Ok(scene)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let file: SceneFile =
            toml::from_str(contents).map_err(|e| GazeError::Scene(e.to_string()))?;

        if !(file.viewport.width > 0.0 && file.viewport.height > 0.0) {
            return Err(GazeError::Scene(format!(
                "viewport must be positive, got {}x{}",
                file.viewport.width, file.viewport.height
            )));
        }

        file.camera.validate().map_err(GazeError::Scene)?;

        let mut scene = Self::new(file.camera, file.viewport);
        for object in file.objects {
            scene.add_object(object.id, Aabb::new(object.min, object.max))?;
        }
        for vehicle in file.vehicles {
            scene.add_vehicle(vehicle.id, vehicle.parts)?;
        }
        Ok(scene)
    }

    /// Add a box; ids must be unique.
    pub fn add_object(&mut self, id: impl Into<ObjectId>, bounds: Aabb) -> Result<()> {
        let id = id.into();
        if self.objects.iter().any(|o| o.id == id) {
            return Err(GazeError::Scene(format!("duplicate object id '{}'", id)));
        }
        self.objects.push(SceneObject { id, bounds });
        Ok(())
    }

    /// Register a vehicle made of already added objects.
    pub fn add_vehicle(&mut self, id: impl Into<String>, parts: Vec<ObjectId>) -> Result<()> {
        let id = id.into();
        if self.vehicles.iter().any(|v| v.id == id) {
            return Err(GazeError::Scene(format!("duplicate vehicle id '{}'", id)));
        }
        if let Some(unknown) = parts.iter().find(|p| !self.objects.iter().any(|o| &o.id == *p)) {
            return Err(GazeError::Scene(format!(
                "vehicle '{}' references unknown object '{}'",
                id, unknown
            )));
        }
        self.vehicles.push(VehicleEntry { id, parts });
        Ok(())
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    /// Currently highlighted objects and the mode they were highlighted with
    pub fn highlighted(&self) -> &BTreeMap<ObjectId, HighlightMode> {
        &self.highlighted
    }
}

impl SpatialService for BoxScene {
    fn viewport_size(&self) -> Viewport {
        self.viewport
    }

    fn world_near(&self, screen: ScreenPoint) -> Point3D {
        self.camera.world_coordinates(screen, self.viewport, 0.0)
    }

    fn world_far(&self, screen: ScreenPoint) -> Point3D {
        self.camera.world_coordinates(screen, self.viewport, 1.0)
    }

    fn intersections(&self, ray: &Ray) -> Vec<Intersection> {
        self.objects
            .iter()
            .filter_map(|object| {
                object.bounds.intersect(ray).map(|t| Intersection {
                    object_id: object.id.clone(),
                    contact_point: ray.at(t),
                    distance: t,
                })
            })
            .collect()
    }

    fn highlight(&mut self, object_id: &str, mode: HighlightMode) {
        debug!("Highlight {} ({})", object_id, mode);
        self.highlighted.insert(object_id.to_string(), mode);
    }

    fn clear_highlights(&mut self) {
        self.highlighted.clear();
    }

    fn vehicle_registry(&self) -> Option<&dyn VehicleRegistry> {
        Some(self)
    }
}

impl VehicleRegistry for BoxScene {
    fn registered_vehicle_ids(&self) -> BTreeSet<String> {
        self.vehicles.iter().map(|v| v.id.clone()).collect()
    }

    fn vehicle_subgeometries(&self, vehicle_id: &str) -> Vec<ObjectId> {
        self.vehicles
            .iter()
            .find(|v| v.id == vehicle_id)
            .map(|v| v.parts.clone())
            .unwrap_or_default()
    }
}
