//! Common types shared across the gaze pipeline.

use serde::{Deserialize, Serialize};

use crate::spatial::Point3D;

/// Device timestamp in seconds.
pub type Timestamp = f64;

/// Scene path identifying a resolved object.
pub type ObjectId = String;

/// The only surface whose gaze is mapped to the screen and ray cast.
pub const SCREEN_SURFACE: &str = "screen";

/// Gaze position in device coordinates: `[0, 1]` on both axes, y grows upwards.
///
/// Samples may leave the unit square transiently.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NormalizedPosition {
    pub x: f64,
    pub y: f64,
}

impl NormalizedPosition {
    pub const CENTER: Self = Self { x: 0.5, y: 0.5 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Per-surface smoothed gaze, owned by the smoothing filter.
pub type SmoothedPosition = NormalizedPosition;

/// One decoded gaze sample.
#[derive(Debug, Clone, PartialEq)]
pub struct GazeSample {
    pub surface: String,
    pub timestamp: Timestamp,
    pub position: NormalizedPosition,
    pub confidence: f64,
}

/// All samples of one network packet.
///
/// Constructed only by the decoder, which guarantees at least one sample and
/// a single shared surface.
#[derive(Debug, Clone, PartialEq)]
pub struct GazeUpdate {
    surface: String,
    samples: Vec<GazeSample>,
}

impl GazeUpdate {
    pub(crate) fn new(surface: String, samples: Vec<GazeSample>) -> Self {
        debug_assert!(!samples.is_empty());
        Self { surface, samples }
    }

    pub fn surface(&self) -> &str {
        &self.surface
    }

    pub fn samples(&self) -> &[GazeSample] {
        &self.samples
    }

    pub fn is_screen(&self) -> bool {
        self.surface == SCREEN_SURFACE
    }

    /// Latest sample timestamp; samples inside a packet may be out of order.
    pub fn latest_timestamp(&self) -> Timestamp {
        self.samples
            .iter()
            .map(|s| s.timestamp)
            .fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn timestamps(&self) -> impl Iterator<Item = Timestamp> + '_ {
        self.samples.iter().map(|s| s.timestamp)
    }
}

/// Pixel size of the active viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Inclusive bounds check against `[0, width] x [0, height]`
    pub fn contains(&self, point: ScreenPoint) -> bool {
        point.x >= 0.0 && point.x <= self.width && point.y >= 0.0 && point.y <= self.height
    }
}

/// Screen position in pixels, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Closest object hit by a gaze ray.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedHit {
    pub object_id: ObjectId,
    pub contact_point: Point3D,
}

/// A maximal interval during which the resolved object did not change.
#[derive(Debug, Clone, PartialEq)]
pub struct FixationRecord {
    /// `None` while looking at nothing
    pub object_id: Option<ObjectId>,
    pub start_time: Timestamp,
    /// Set when the record is closed
    pub end_time: Option<Timestamp>,
    /// Contact point of the hit that opened the record
    pub contact_point: Option<Point3D>,
    pub screen_point: Option<ScreenPoint>,
    /// Sample timestamps of every update merged into this fixation
    pub sample_times: Vec<Timestamp>,
}

impl FixationRecord {
    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }

    /// Seconds between start and end; `None` while open
    pub fn duration(&self) -> Option<f64> {
        self.end_time.map(|end| end - self.start_time)
    }
}

/// One row of the session log.
#[derive(Debug, Clone, PartialEq)]
pub struct AttentionRow {
    pub surface: String,
    /// Empty when looking at nothing
    pub aoi: String,
    pub timestamps: Vec<Timestamp>,
}

impl AttentionRow {
    pub fn from_fixation(record: &FixationRecord) -> Self {
        Self {
            surface: SCREEN_SURFACE.to_string(),
            aoi: record.object_id.clone().unwrap_or_default(),
            timestamps: record.sample_times.clone(),
        }
    }

    pub fn from_update(update: &GazeUpdate) -> Self {
        Self {
            surface: update.surface().to_string(),
            aoi: String::new(),
            timestamps: update.timestamps().collect(),
        }
    }
}
