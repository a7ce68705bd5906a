//! Off-screen gaze warning

use std::time::Duration;

use tracing::info;

use crate::types::{ScreenPoint, Timestamp, Viewport};

/// Warning condition owned by one pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WarningState {
    pub active: bool,
    /// Time of the last update whose gaze was inside the viewport
    pub last_in_screen_time: Option<Timestamp>,
}

/// Outcome of one monitor update, for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WarningStatus {
    pub active: bool,
    /// Time since the gaze was last on screen; `None` while on screen or
    /// before it has ever been on screen
    pub off_screen_for: Option<Duration>,
    /// Whether `active` flipped on this update
    pub changed: bool,
}

/// Seconds from `last` to `now` as a `Duration`, saturating at both ends
fn elapsed_since(last: Timestamp, now: Timestamp) -> Duration {
    Duration::try_from_secs_f64((now - last).max(0.0)).unwrap_or(Duration::MAX)
}

#[derive(Debug, Clone)]
pub struct OffScreenMonitor {
    threshold: Duration,
    state: WarningState,
}

impl OffScreenMonitor {
    pub fn new(threshold: Duration) -> Self {
        Self {
            threshold,
            state: WarningState::default(),
        }
    }

    pub fn state(&self) -> &WarningState {
        &self.state
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    /// Evaluate one update.
    ///
    /// The warning activates only once the gaze has stayed outside the
    /// viewport for strictly longer than the threshold; any in-bounds point
    /// clears it and restarts the timer.
    pub fn update(&mut self, point: ScreenPoint, viewport: Viewport, now: Timestamp) -> WarningStatus {
        let was_active = self.state.active;

        if viewport.contains(point) {
            self.state.last_in_screen_time = Some(now);
            self.state.active = false;
            if was_active {
                info!("Gaze back on screen, warning cleared");
            }
            return WarningStatus {
                active: false,
                off_screen_for: None,
                changed: was_active,
            };
        }

        let off_screen_for = self
            .state
            .last_in_screen_time
            .map(|last| elapsed_since(last, now));

        if let Some(elapsed) = off_screen_for {
            if elapsed > self.threshold && !was_active {
                self.state.active = true;
                info!(
                    "Gaze off screen for {} ms, raising warning",
                    elapsed.as_millis()
                );
            }
        }

        WarningStatus {
            active: self.state.active,
            off_screen_for,
            changed: self.state.active != was_active,
        }
    }
}
