//! Real-time driver: one pipeline tick per interval until Ctrl-C

use std::time::Duration;

use anyhow::{Context, Result};
use gaze_aoi_config::{DisplaySettings, Rgba, Settings, WarningSettings};
use gaze_aoi_core::spatial::Point3D;
use gaze_aoi_core::{
    BoxScene, GazePipeline, GazeSource, PipelineSettings, ScreenPoint, SessionRecorder,
    TickOutcome, TickReport, UdpGazeSource,
};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info, trace, warn};

/// Counters reported when the run ends
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    pub ticks: u64,
    pub processed: u64,
    pub dropped: u64,
    pub idle: u64,
    pub fixations: usize,
}

impl RunStats {
    fn count(&mut self, outcome: &TickOutcome) {
        self.ticks += 1;
        match outcome {
            TickOutcome::NoData => self.idle += 1,
            TickOutcome::Dropped(_) => self.dropped += 1,
            TickOutcome::Processed(_) => self.processed += 1,
        }
    }
}

/// Markers a renderer would draw for one processed update.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub crosshair: Option<(ScreenPoint, Rgba, f32)>,
    pub gaze_sphere: Option<(Point3D, Rgba)>,
    /// Warning frame visible in the current flash phase
    pub warning_frame: bool,
}

impl Overlay {
    pub fn from_report(report: &TickReport, display: &DisplaySettings, warning: &WarningSettings) -> Self {
        let warning_frame = report
            .warning
            .filter(|status| status.active)
            .and_then(|status| status.off_screen_for)
            .map(|elapsed| flash_visible(elapsed, warning.threshold, warning.flashing_interval))
            .unwrap_or(false);

        Self {
            crosshair: report
                .crosshair
                .map(|point| (point, display.crosshair_color.rgba(), display.crosshair_scale)),
            gaze_sphere: report
                .gaze_marker
                .map(|point| (point, display.sphere_color.rgba())),
            warning_frame,
        }
    }
}

/// Whether the warning frame is lit, alternating every `interval` after the
/// threshold was crossed.
pub fn flash_visible(off_screen_for: Duration, threshold: Duration, interval: Duration) -> bool {
    let since_raised = off_screen_for.saturating_sub(threshold).as_millis();
    let interval = interval.as_millis().max(1);
    (since_raised / interval) % 2 == 0
}

fn start_recorder(settings: &Settings) -> Option<SessionRecorder> {
    if !settings.recording.enabled {
        info!("Recording disabled");
        return None;
    }
    match SessionRecorder::start(&settings.recording.root) {
        Ok(recorder) => Some(recorder),
        Err(e) => {
            error!("Could not start session recording, continuing without it: {}", e);
            None
        }
    }
}

/// Bind the gaze socket and run until Ctrl-C.
pub async fn run(settings: Settings, mut scene: BoxScene, tick_hz: u32) -> Result<RunStats> {
    let mut source = UdpGazeSource::bind(settings.network.port, settings.network.packet_size)
        .await
        .context("Failed to open gaze source")?;

    let mut pipeline = GazePipeline::new(PipelineSettings::from(&settings), start_recorder(&settings));

    let mut interval = time::interval(Duration::from_secs_f64(1.0 / f64::from(tick_hz.max(1))));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut stats = RunStats::default();
    info!("Gaze pipeline running at {} Hz", tick_hz);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let message = source.latest_message();
                let outcome = pipeline.tick(message.as_deref(), &mut scene);
                stats.count(&outcome);

                if let TickOutcome::Processed(report) = &outcome {
                    let overlay = Overlay::from_report(report, &settings.display, &settings.warning);
                    trace!("{:?}", overlay);
                    if let Some(closed) = &report.closed_fixation {
                        debug!(
                            "Fixation on {} lasted {:.3}s",
                            closed.object_id.as_deref().unwrap_or("<nothing>"),
                            closed.duration().unwrap_or_default()
                        );
                    }
                }
            }
            result = &mut ctrl_c => {
                if let Err(e) = result {
                    warn!("Failed to listen for Ctrl-C: {}", e);
                }
                info!("Shutting down");
                break;
            }
        }
    }

    // Log tail first, then the network side
    pipeline.shutdown();
    source.close().await;

    stats.fixations = pipeline.closed_fixations();
    info!(
        "Processed {} of {} ticks ({} dropped, {} idle), {} fixations",
        stats.processed, stats.ticks, stats.dropped, stats.idle, stats.fixations
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gaze_aoi_config::{AppConfig, NamedColor};
    use gaze_aoi_core::{NormalizedPosition, WarningStatus};

    fn report(warning: Option<WarningStatus>) -> TickReport {
        TickReport {
            surface: "screen".to_string(),
            update_time: 1.0,
            raw: NormalizedPosition::CENTER,
            smoothed: Some(NormalizedPosition::CENTER),
            screen_point: Some(ScreenPoint::new(960.0, 540.0)),
            hit: None,
            closed_fixation: None,
            warning,
            crosshair: Some(ScreenPoint::new(960.0, 540.0)),
            gaze_marker: Some(Point3D::new(0.0, 0.0, 20.0)),
        }
    }

    #[test]
    fn test_flash_alternates_each_interval() {
        let threshold = Duration::from_millis(3000);
        let interval = Duration::from_millis(500);
        assert!(flash_visible(Duration::from_millis(3100), threshold, interval));
        assert!(!flash_visible(Duration::from_millis(3600), threshold, interval));
        assert!(flash_visible(Duration::from_millis(4050), threshold, interval));
    }

    #[test]
    fn test_overlay_uses_configured_colors() {
        let settings = AppConfig::default().validate().unwrap();
        let overlay = Overlay::from_report(&report(None), &settings.display, &settings.warning);

        let (point, color, scale) = overlay.crosshair.unwrap();
        assert_eq!(point, ScreenPoint::new(960.0, 540.0));
        assert_eq!(color, NamedColor::White.rgba());
        assert_eq!(scale, 2.0);
        assert_eq!(overlay.gaze_sphere.unwrap().1, NamedColor::Red.rgba());
        assert!(!overlay.warning_frame);
    }

    #[test]
    fn test_overlay_warning_frame() {
        let settings = AppConfig::default().validate().unwrap();
        let active = WarningStatus {
            active: true,
            off_screen_for: Some(Duration::from_millis(3200)),
            changed: true,
        };
        let overlay = Overlay::from_report(&report(Some(active)), &settings.display, &settings.warning);
        assert!(overlay.warning_frame);
    }

    #[test]
    fn test_stats_count_outcomes() {
        let mut stats = RunStats::default();
        stats.count(&TickOutcome::NoData);
        stats.count(&TickOutcome::Processed(Box::new(report(None))));
        assert_eq!(stats.ticks, 2);
        assert_eq!(stats.idle, 1);
        assert_eq!(stats.processed, 1);
    }
}
