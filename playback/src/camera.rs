use geom::LonLat;
use serde::{Deserialize, Serialize};

use crate::route::bounds;

pub const FIT_BOUNDS_PADDING_PX: f64 = 80.0;
pub const FIT_BOUNDS_DURATION_MS: f64 = 1000.0;
pub const FLY_TO_ZOOM: f64 = 14.0;
pub const FLY_TO_START_DURATION_MS: f64 = 1000.0;
pub const FLY_TO_DEST_DURATION_MS: f64 = 1500.0;

/// How the map viewport is framed right now. Within one segment, phases only move forward
/// (in the order listed, except for `ZoomToStart`, which only happens before the first segment).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CameraPhase {
    /// Looking at both ends of a segment that was just entered, or at the whole route once
    /// finished
    InitialZoomOut,
    ZoomToStart,
    ZoomOutToBoth,
    Maintain,
    ZoomToDest,
}

impl CameraPhase {
    /// The phase a moving marker calls for
    pub fn for_progress(progress: f64) -> CameraPhase {
        if progress < 0.33 {
            CameraPhase::ZoomOutToBoth
        } else if progress < 0.66 {
            CameraPhase::Maintain
        } else {
            CameraPhase::ZoomToDest
        }
    }

    // Used to keep phases from going backwards within a segment
    pub(crate) fn rank(self) -> usize {
        match self {
            CameraPhase::InitialZoomOut => 0,
            CameraPhase::ZoomToStart => 1,
            CameraPhase::ZoomOutToBoth => 2,
            CameraPhase::Maintain => 3,
            CameraPhase::ZoomToDest => 4,
        }
    }
}

/// A command for the map surface
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Directive {
    FitBounds {
        southwest: LonLat,
        northeast: LonLat,
        padding_px: f64,
        duration_ms: f64,
    },
    FlyTo {
        center: LonLat,
        zoom: f64,
        duration_ms: f64,
    },
}

impl Directive {
    /// Frames all of the points. None if there are none.
    pub fn fit(pts: impl Iterator<Item = LonLat>) -> Option<Directive> {
        let b = bounds(pts)?;
        Some(Directive::FitBounds {
            southwest: LonLat::new(b.min_lon, b.min_lat),
            northeast: LonLat::new(b.max_lon, b.max_lat),
            padding_px: FIT_BOUNDS_PADDING_PX,
            duration_ms: FIT_BOUNDS_DURATION_MS,
        })
    }

    pub fn describe(&self) -> String {
        match self {
            Directive::FitBounds {
                southwest,
                northeast,
                ..
            } => format!(
                "fit bounds ({:.5}, {:.5}) to ({:.5}, {:.5})",
                southwest.y(), southwest.x(), northeast.y(), northeast.x()
            ),
            Directive::FlyTo { center, zoom, .. } => format!(
                "fly to ({:.5}, {:.5}) at zoom {}",
                center.y(), center.x(), zoom
            ),
        }
    }
}

/// What the camera should do upon entering `phase` on the segment from `origin` to `dest`. No
/// side effects; callers decide when to issue it.
pub fn camera_directive(
    phase: CameraPhase,
    origin: LonLat,
    dest: LonLat,
) -> Option<Directive> {
    match phase {
        CameraPhase::InitialZoomOut | CameraPhase::ZoomOutToBoth => {
            Directive::fit(vec![origin, dest].into_iter())
        }
        CameraPhase::ZoomToStart => Some(Directive::FlyTo {
            center: origin,
            zoom: FLY_TO_ZOOM,
            duration_ms: FLY_TO_START_DURATION_MS,
        }),
        CameraPhase::ZoomToDest => Some(Directive::FlyTo {
            center: dest,
            zoom: FLY_TO_ZOOM,
            duration_ms: FLY_TO_DEST_DURATION_MS,
        }),
        CameraPhase::Maintain => None,
    }
}
