use geom::{Distance, GPSBounds, LonLat};
use serde::Serialize;
use trip::{AnimationOverride, TransportMode, Waypoint, WaypointID};

/// A waypoint that made it into the route, meaning it has a usable location.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RoutePoint {
    pub waypoint: WaypointID,
    pub name: Option<String>,
    pub pos: LonLat,
    /// How this point was reached from the previous one
    pub transport_mode: Option<TransportMode>,
    pub animation: AnimationOverride,
}

impl RoutePoint {
    pub fn describe(&self) -> String {
        match self.name {
            Some(ref name) => name.clone(),
            None => format!("{:?}", self.waypoint),
        }
    }
}

/// The straight leg between two consecutive route points
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    /// Indices into `Route::points`
    pub from: usize,
    pub to: usize,
    pub length: Distance,
}

impl Segment {
    /// Zero-length legs are skipped, never animated
    pub fn is_degenerate(&self) -> bool {
        !(self.length > Distance::ZERO)
    }
}

pub struct Route {
    points: Vec<RoutePoint>,
    segments: Vec<Segment>,
}

impl Route {
    /// Waypoints without a valid location are dropped, never an error.
    pub fn new(waypoints: &[Waypoint]) -> Self {
        let mut points = Vec::new();
        for wp in waypoints {
            match wp.valid_pos() {
                Some(pos) => points.push(RoutePoint {
                    waypoint: wp.id,
                    name: wp.name.clone(),
                    pos,
                    transport_mode: wp.transport_mode,
                    animation: wp.animation.clone(),
                }),
                None => {
                    debug!("Leaving {} out of the route", wp.describe());
                }
            }
        }
        if points.len() < waypoints.len() {
            warn!(
                "{} of {} waypoints have no usable location",
                waypoints.len() - points.len(),
                waypoints.len()
            );
        }

        let mut segments = Vec::new();
        for (idx, pair) in points.windows(2).enumerate() {
            segments.push(Segment {
                from: idx,
                to: idx + 1,
                length: pair[0].pos.gps_dist(pair[1].pos),
            });
        }

        Self { points, segments }
    }

    /// Fewer than 2 located points means there's nothing to animate
    pub fn is_playable(&self) -> bool {
        self.points.len() >= 2
    }

    pub fn points(&self) -> &Vec<RoutePoint> {
        &self.points
    }

    pub fn segments(&self) -> &Vec<Segment> {
        &self.segments
    }

    pub fn origin_of(&self, segment: &Segment) -> &RoutePoint {
        &self.points[segment.from]
    }

    pub fn dest_of(&self, segment: &Segment) -> &RoutePoint {
        &self.points[segment.to]
    }

    pub fn coordinates(&self) -> Vec<LonLat> {
        self.points.iter().map(|pt| pt.pos).collect()
    }

    pub fn total_length(&self) -> Distance {
        let mut total = Distance::ZERO;
        for segment in &self.segments {
            total += segment.length;
        }
        total
    }

    /// Covers every point. None for an empty route.
    pub fn bounds(&self) -> Option<GPSBounds> {
        bounds(self.points.iter().map(|pt| pt.pos))
    }
}

pub fn bounds(pts: impl Iterator<Item = LonLat>) -> Option<GPSBounds> {
    let mut gps_bounds = GPSBounds::new();
    let mut any = false;
    for pt in pts {
        gps_bounds.update(pt);
        any = true;
    }
    if any {
        Some(gps_bounds)
    } else {
        None
    }
}
