use geom::LonLat;
use playback::{Directive, MapSurface, Marker};

/// Stands in for a map by logging everything it's asked to draw.
#[derive(Default)]
pub struct ConsoleSurface {
    pub camera_moves: usize,
    pub arrivals: usize,
    pub frames: usize,

    label: Option<String>,
    // Progress is logged in steps of 10%
    last_decile: Option<usize>,
}

impl ConsoleSurface {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MapSurface for ConsoleSurface {
    fn draw_route(&mut self, pts: &[LonLat]) {
        info!("Drawing a route through {} points", pts.len());
        for pt in pts {
            trace!("  ({:.5}, {:.5})", pt.y(), pt.x());
        }
    }

    fn apply_camera(&mut self, directive: &Directive) {
        self.camera_moves += 1;
        info!("Camera: {}", directive.describe());
    }

    fn draw_marker(&mut self, marker: Option<&Marker>) {
        self.frames += 1;
        let marker = match marker {
            Some(marker) => marker,
            None => {
                trace!("Marker hidden");
                self.label = None;
                return;
            }
        };
        trace!(
            "Marker {} at ({:.5}, {:.5})",
            marker.icon,
            marker.pos.y(),
            marker.pos.x()
        );
        if marker.label != self.label {
            if let Some(ref label) = marker.label {
                self.arrivals += 1;
                info!("Showing {}", label);
            }
            self.label = marker.label.clone();
        }
    }

    fn set_progress(&mut self, percent: f64) {
        let decile = (percent / 10.0).floor() as usize;
        if self.last_decile != Some(decile) {
            self.last_decile = Some(decile);
            info!("{}% done", decile * 10);
        }
    }
}
