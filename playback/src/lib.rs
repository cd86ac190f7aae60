//! Animates a marker along a trip, with a camera that follows it around.

#[macro_use]
extern crate log;

mod camera;
mod config;
mod driver;
mod geodesic;
mod route;
mod session;
#[cfg(test)]
mod tests;
mod timing;

pub use camera::{camera_directive, CameraPhase, Directive};
pub use config::{AnimationConfig, SPEED_SLIDER_RANGE};
pub use driver::{FrameDriver, MapSurface, Marker};
pub use geodesic::lerp;
pub use route::{Route, RoutePoint, Segment};
pub use session::{Frame, PlaybackState, Session, ZOOM_OUT_TO_BOTH_MS, ZOOM_TO_START_MS};
pub use timing::{
    live_duration_ms, segment_duration_ms, Timing, BASE_SPEED_METERS_PER_SECOND,
    MAX_SEGMENT_DURATION_MS, MIN_SEGMENT_DURATION_MS,
};
