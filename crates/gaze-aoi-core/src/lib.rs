//! Gaze-to-AOI pipeline
//!
//! Turns a stream of eye-tracker packets into "what was the user looking at,
//! and for how long":
//!
//! 1. [`packet`] decodes one message into a [`GazeUpdate`]
//! 2. [`aggregate`] averages its samples
//! 3. [`smoothing`] filters the position per surface
//! 4. [`mapper`] converts it to screen pixels
//! 5. [`resolver`] casts a ray into the scene and keeps the closest hit
//! 6. [`fixation`] merges runs of the same object into fixations
//! 7. [`offscreen`] raises a warning when the gaze leaves the screen
//! 8. [`recorder`] appends attention rows to the session log
//!
//! [`GazePipeline`] owns the state of all of these and runs them once per
//! tick. The scene is reached only through [`SpatialService`]; [`BoxScene`]
//! is a self-contained implementation built from axis-aligned boxes.

pub mod aggregate;
pub mod error;
pub mod fixation;
pub mod highlight;
pub mod mapper;
pub mod offscreen;
pub mod packet;
pub mod pipeline;
pub mod recorder;
pub mod resolver;
pub mod scene;
pub mod smoothing;
pub mod source;
pub mod spatial;
pub mod types;

pub use error::{GazeError, Result};
pub use fixation::{FixationState, FixationTracker};
pub use highlight::Highlighter;
pub use mapper::{map_to_screen, MappedPoint};
pub use offscreen::{OffScreenMonitor, WarningState, WarningStatus};
pub use pipeline::{GazePipeline, PipelineSettings, TickOutcome, TickReport};
pub use recorder::{latest_session_dir, read_session_log, SessionRecorder};
pub use resolver::{Intersection, SpatialService, VehicleRegistry};
pub use scene::BoxScene;
pub use smoothing::SmoothingFilter;
pub use source::{GazeMailbox, GazeSource, UdpGazeSource};
pub use types::{
    AttentionRow, FixationRecord, GazeSample, GazeUpdate, NormalizedPosition, ObjectId,
    ResolvedHit, ScreenPoint, SmoothedPosition, Timestamp, Viewport, SCREEN_SURFACE,
};
