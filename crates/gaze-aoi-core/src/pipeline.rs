//! One gaze pipeline instance and its per-tick driver
//!
//! [`GazePipeline`] owns every piece of mutable state (smoothing, fixation,
//! warning, recorder). Each call to [`GazePipeline::tick`] runs one update
//! through decode, aggregate, smooth, map, resolve, highlight, fixation and
//! warning, synchronously. Nothing fails across the tick boundary: bad input
//! is dropped and recording problems disable recording.

use std::time::Duration;

use gaze_aoi_config::{HighlightMode, Settings, SmoothingMode, SmoothingSettings};
use tracing::{debug, error, warn};

use crate::aggregate::aggregate;
use crate::error::GazeError;
use crate::fixation::{FixationState, FixationTracker};
use crate::highlight::Highlighter;
use crate::mapper::map_to_screen;
use crate::offscreen::{OffScreenMonitor, WarningState, WarningStatus};
use crate::packet;
use crate::recorder::SessionRecorder;
use crate::resolver::{resolve, SpatialService};
use crate::smoothing::SmoothingFilter;
use crate::spatial::Point3D;
use crate::types::{
    AttentionRow, FixationRecord, NormalizedPosition, ResolvedHit, ScreenPoint, SmoothedPosition,
    Timestamp,
};

/// The subset of [`Settings`] the pipeline itself consumes.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    pub smoothing: SmoothingSettings,
    pub highlight: HighlightMode,
    pub show_warning: bool,
    pub warning_threshold: Duration,
    pub show_crosshairs: bool,
    pub show_gaze_sphere: bool,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            smoothing: SmoothingSettings {
                mode: SmoothingMode::Exponential,
                alpha: 0.35,
                window: 10,
            },
            highlight: HighlightMode::None,
            show_warning: true,
            warning_threshold: Duration::from_millis(3000),
            show_crosshairs: true,
            show_gaze_sphere: true,
        }
    }
}

impl From<&Settings> for PipelineSettings {
    fn from(settings: &Settings) -> Self {
        Self {
            smoothing: settings.smoothing.clone(),
            highlight: settings.highlight.mode,
            show_warning: settings.warning.show,
            warning_threshold: settings.warning.threshold,
            show_crosshairs: settings.display.show_crosshairs,
            show_gaze_sphere: settings.display.show_gaze_sphere,
        }
    }
}

/// What happened to one processed update.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub surface: String,
    /// Monotonic update time
    pub update_time: Timestamp,
    pub raw: NormalizedPosition,
    /// `None` for non-screen surfaces
    pub smoothed: Option<SmoothedPosition>,
    /// Clamped screen point used for ray casting
    pub screen_point: Option<ScreenPoint>,
    pub hit: Option<ResolvedHit>,
    /// Fixation closed by this update
    pub closed_fixation: Option<FixationRecord>,
    /// `None` when the warning is disabled or the update was not on `screen`
    pub warning: Option<WarningStatus>,
    /// Where to draw the crosshair, if shown
    pub crosshair: Option<ScreenPoint>,
    /// Where to draw the gaze sphere, if shown and something was hit
    pub gaze_marker: Option<Point3D>,
}

#[derive(Debug)]
pub enum TickOutcome {
    /// No new message since the previous tick
    NoData,
    /// The message could not be decoded; state is unchanged
    Dropped(GazeError),
    Processed(Box<TickReport>),
}

/// Reject updates whose position or time overflowed to a non-finite value.
fn check_finite(raw: NormalizedPosition, latest: Timestamp) -> Result<(), GazeError> {
    if !raw.is_finite() {
        return Err(GazeError::MalformedPacket(format!(
            "gaze position ({}, {}) is out of range",
            raw.x, raw.y
        )));
    }
    if !latest.is_finite() {
        return Err(GazeError::MalformedPacket(format!(
            "timestamp {} is out of range",
            latest
        )));
    }
    Ok(())
}

#[derive(Debug)]
pub struct GazePipeline {
    settings: PipelineSettings,
    smoothing: SmoothingFilter,
    tracker: FixationTracker,
    monitor: OffScreenMonitor,
    highlighter: Highlighter,
    recorder: Option<SessionRecorder>,
    last_update_time: Option<Timestamp>,
}

impl GazePipeline {
    pub fn new(settings: PipelineSettings, recorder: Option<SessionRecorder>) -> Self {
        Self {
            smoothing: SmoothingFilter::new(&settings.smoothing),
            tracker: FixationTracker::new(),
            monitor: OffScreenMonitor::new(settings.warning_threshold),
            highlighter: Highlighter::new(settings.highlight),
            recorder,
            last_update_time: None,
            settings,
        }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Run one tick with the newest message, if any.
    pub fn tick(&mut self, message: Option<&[u8]>, scene: &mut dyn SpatialService) -> TickOutcome {
        let Some(message) = message else {
            debug!("No gaze data available this tick");
            return TickOutcome::NoData;
        };

        let (update, raw) = match packet::decode(message).and_then(|update| {
            let raw = aggregate(&update);
            check_finite(raw, update.latest_timestamp())?;
            Ok((update, raw))
        }) {
            Ok(decoded) => decoded,
            Err(e) => {
                warn!("Dropping gaze update: {}", e);
                return TickOutcome::Dropped(e);
            }
        };

        let latest = update.latest_timestamp();
        let update_time = match self.last_update_time {
            Some(previous) if latest < previous => {
                debug!(
                    "Update time {} precedes previous {}, holding clock",
                    latest, previous
                );
                previous
            }
            _ => latest,
        };
        self.last_update_time = Some(update_time);

        if !update.is_screen() {
            self.record(&AttentionRow::from_update(&update));
            return TickOutcome::Processed(Box::new(TickReport {
                surface: update.surface().to_string(),
                update_time,
                raw,
                smoothed: None,
                screen_point: None,
                hit: None,
                closed_fixation: None,
                warning: None,
                crosshair: None,
                gaze_marker: None,
            }));
        }

        let smoothed = self.smoothing.apply(update.surface(), raw);
        let viewport = scene.viewport_size();
        let mapped = map_to_screen(smoothed, viewport);

        let hit = resolve(&*scene, mapped.clamped);
        self.highlighter.apply(scene, hit.as_ref());

        let closed_fixation =
            self.tracker
                .observe(hit.as_ref(), Some(mapped.clamped), update_time, update.timestamps());
        if let Some(closed) = &closed_fixation {
            self.record(&AttentionRow::from_fixation(closed));
        }

        let warning = self
            .settings
            .show_warning
            .then(|| self.monitor.update(mapped.projected, viewport, update_time));

        let crosshair = self.settings.show_crosshairs.then_some(mapped.clamped);
        let gaze_marker = if self.settings.show_gaze_sphere {
            hit.as_ref().map(|h| h.contact_point)
        } else {
            None
        };

        TickOutcome::Processed(Box::new(TickReport {
            surface: update.surface().to_string(),
            update_time,
            raw,
            smoothed: Some(smoothed),
            screen_point: Some(mapped.clamped),
            hit,
            closed_fixation,
            warning,
            crosshair,
            gaze_marker,
        }))
    }

    /// Close the open fixation, then the session log.
    ///
    /// Call before shutting the gaze source down so the tail of the log is
    /// written.
    pub fn shutdown(&mut self) -> Option<FixationRecord> {
        let closed = self
            .last_update_time
            .and_then(|time| self.tracker.finish(time));
        if let Some(record) = &closed {
            self.record(&AttentionRow::from_fixation(record));
        }

        if let Some(recorder) = self.recorder.take() {
            if let Err(e) = recorder.close() {
                error!("Failed to close session log: {}", e);
            }
        }
        closed
    }

    fn record(&mut self, row: &AttentionRow) {
        let Some(recorder) = self.recorder.as_mut() else {
            return;
        };
        if let Err(e) = recorder.record(row) {
            error!("Session recording failed, recording disabled: {}", e);
            self.recorder = None;
        }
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.is_some()
    }

    pub fn recorder(&self) -> Option<&SessionRecorder> {
        self.recorder.as_ref()
    }

    pub fn warning(&self) -> &WarningState {
        self.monitor.state()
    }

    pub fn smoothed(&self, surface: &str) -> Option<SmoothedPosition> {
        self.smoothing.current(surface)
    }

    pub fn fixation_state(&self) -> FixationState<'_> {
        self.tracker.state()
    }

    pub fn current_fixation(&self) -> Option<&FixationRecord> {
        self.tracker.current()
    }

    pub fn closed_fixations(&self) -> usize {
        self.tracker.closed_count()
    }

    pub fn last_update_time(&self) -> Option<Timestamp> {
        self.last_update_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Write};
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use crate::scene::BoxScene;
    use crate::spatial::Aabb;

    fn packet(surface: &str, x: f64, y: f64, ts: f64) -> Vec<u8> {
        format!(
            r#"{{"srf":"{}","data":[{{"norm_pos":[{},{}],"confidence":0.9,"timestamp":{}}}]}}"#,
            surface, x, y, ts
        )
        .into_bytes()
    }

    fn processed(outcome: TickOutcome) -> TickReport {
        match outcome {
            TickOutcome::Processed(report) => *report,
            other => panic!("expected a processed update, got {:?}", other),
        }
    }

    #[test]
    fn test_no_data_is_a_no_op() {
        let mut pipeline = GazePipeline::new(PipelineSettings::default(), None);
        let mut scene = BoxScene::default();
        assert!(matches!(pipeline.tick(None, &mut scene), TickOutcome::NoData));
        assert!(pipeline.last_update_time().is_none());
        assert_eq!(pipeline.fixation_state(), FixationState::NoFixation);
    }

    #[test]
    fn test_malformed_packet_leaves_state_unchanged() {
        let mut pipeline = GazePipeline::new(PipelineSettings::default(), None);
        let mut scene = BoxScene::default();
        processed(pipeline.tick(Some(&packet("screen", 0.9, 0.9, 1.0)), &mut scene));
        let smoothed = pipeline.smoothed("screen");

        let outcome = pipeline.tick(Some(br#"{"srf":"screen","data":[]}"#), &mut scene);
        assert!(matches!(
            outcome,
            TickOutcome::Dropped(GazeError::MalformedPacket(_))
        ));
        assert_eq!(pipeline.smoothed("screen"), smoothed);
        assert_eq!(pipeline.last_update_time(), Some(1.0));
        assert_eq!(pipeline.closed_fixations(), 0);
    }

    #[test]
    fn test_clock_never_runs_backwards() {
        let mut pipeline = GazePipeline::new(PipelineSettings::default(), None);
        let mut scene = BoxScene::default();
        processed(pipeline.tick(Some(&packet("screen", 0.5, 0.5, 5.0)), &mut scene));
        let report = processed(pipeline.tick(Some(&packet("screen", 0.5, 0.5, 4.0)), &mut scene));
        assert_eq!(report.update_time, 5.0);
    }

    #[test]
    fn test_other_surfaces_bypass_smoothing() {
        let mut pipeline = GazePipeline::new(PipelineSettings::default(), None);
        let mut scene = BoxScene::default();
        let report = processed(pipeline.tick(Some(&packet("dashboard", 0.2, 0.7, 1.0)), &mut scene));

        assert_eq!(report.raw, NormalizedPosition::new(0.2, 0.7));
        assert!(report.smoothed.is_none());
        assert!(report.hit.is_none());
        assert!(pipeline.smoothed("dashboard").is_none());
        assert_eq!(pipeline.fixation_state(), FixationState::NoFixation);
    }

    #[test]
    fn test_presentation_flags() {
        let settings = PipelineSettings {
            show_crosshairs: false,
            show_gaze_sphere: true,
            show_warning: false,
            ..PipelineSettings::default()
        };
        let mut pipeline = GazePipeline::new(settings, None);
        let mut scene = BoxScene::default();
        scene
            .add_object(
                "ahead",
                Aabb::new(Point3D::new(-5.0, -5.0, 20.0), Point3D::new(5.0, 5.0, 22.0)),
            )
            .unwrap();

        let report = processed(pipeline.tick(Some(&packet("screen", 0.5, 0.5, 1.0)), &mut scene));
        assert!(report.crosshair.is_none());
        assert!(report.warning.is_none());
        let marker = report.gaze_marker.expect("sphere shown on hit");
        assert!((marker.z - 20.0).abs() < 0.001);
    }

    /// Accepts writes until `broken` is set
    struct FlakyDisk {
        broken: Arc<AtomicBool>,
    }

    impl Write for FlakyDisk {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.broken.load(Ordering::SeqCst) {
                Err(io::Error::new(io::ErrorKind::Other, "no space left on device"))
            } else {
                Ok(buf.len())
            }
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_failure_disables_recording() {
        let broken = Arc::new(AtomicBool::new(false));
        let disk = FlakyDisk {
            broken: Arc::clone(&broken),
        };
        let recorder = SessionRecorder::with_sink(
            Path::new("session"),
            PathBuf::from("session/aoi_labels.csv"),
            Box::new(disk),
        )
        .unwrap();

        let settings = PipelineSettings {
            smoothing: SmoothingSettings {
                mode: SmoothingMode::Exponential,
                alpha: 1.0,
                window: 1,
            },
            ..PipelineSettings::default()
        };
        let mut pipeline = GazePipeline::new(settings, Some(recorder));
        let mut scene = BoxScene::default();
        scene
            .add_object(
                "ahead",
                Aabb::new(Point3D::new(-5.0, -5.0, 20.0), Point3D::new(5.0, 5.0, 22.0)),
            )
            .unwrap();

        processed(pipeline.tick(Some(&packet("screen", 0.5, 0.5, 1.0)), &mut scene));
        assert!(pipeline.is_recording());

        broken.store(true, Ordering::SeqCst);
        let report = processed(pipeline.tick(Some(&packet("screen", 0.95, 0.5, 2.0)), &mut scene));
        let closed = report.closed_fixation.expect("fixation on ahead closed");
        assert_eq!(closed.object_id.as_deref(), Some("ahead"));
        assert!(!pipeline.is_recording());

        // Later updates still run through the whole pipeline
        let report = processed(pipeline.tick(Some(&packet("screen", 0.5, 0.5, 3.0)), &mut scene));
        assert!(report.closed_fixation.is_some());
        assert_eq!(report.hit.map(|h| h.object_id), Some("ahead".to_string()));
        assert_eq!(pipeline.closed_fixations(), 2);
        assert_eq!(pipeline.fixation_state(), FixationState::FixatedOn(Some("ahead")));
    }

    #[test]
    fn test_shutdown_without_updates() {
        let mut pipeline = GazePipeline::new(PipelineSettings::default(), None);
        assert!(pipeline.shutdown().is_none());
    }
}
