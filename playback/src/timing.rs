use geom::Duration;

use crate::config::AnimationConfig;
use crate::route::{Route, RoutePoint, Segment};

/// How fast the marker travels with every multiplier at 1. Tuned so a leg of a few hundred km
/// takes tens of seconds to watch.
pub const BASE_SPEED_METERS_PER_SECOND: f64 = 20_000.0;

/// No leg finishes faster than this, however short or fast it is.
pub const MIN_SEGMENT_DURATION_MS: f64 = 3000.0;

/// A day. Tiny speed multipliers would otherwise stretch a leg out to infinity.
pub const MAX_SEGMENT_DURATION_MS: f64 = 24.0 * 3600.0 * 1000.0;

/// Past this fraction of a leg, the marker starts to brake
const SLOWDOWN_START: f64 = 0.8;
/// ... reaching this fraction of its normal speed on arrival
const SLOWDOWN_FLOOR: f64 = 0.3;
/// How steeply the speed factor drops per unit of progress inside the slowdown zone
const SLOWDOWN_RATE: f64 = (1.0 - SLOWDOWN_FLOOR) / (1.0 - SLOWDOWN_START);

// Absorbs floating point error when a frame lands right on an arrival
const ARRIVAL_EPSILON_MS: f64 = 1e-6;

/// The nominal time to traverse a segment, ignoring the slowdown on arrival. Degenerate segments
/// take no time at all.
pub fn segment_duration_ms(segment: &Segment, origin: &RoutePoint, config: &AnimationConfig) -> f64 {
    if segment.is_degenerate() {
        return 0.0;
    }
    let speed = effective_speed(origin, config);
    let ms = 1000.0 * segment.length.inner_meters() / speed;
    if !(ms <= MAX_SEGMENT_DURATION_MS) {
        warn!(
            "Leg leaving {} would take {}ms at {} m/s, capping it",
            origin.describe(),
            ms,
            speed
        );
        return MAX_SEGMENT_DURATION_MS;
    }
    ms.max(MIN_SEGMENT_DURATION_MS)
}

/// Meters per second for the leg leaving `origin`
pub fn effective_speed(origin: &RoutePoint, config: &AnimationConfig) -> f64 {
    BASE_SPEED_METERS_PER_SECOND * config.speed_multiplier * config.item_speed(origin)
}

/// The fraction of nominal speed the marker moves at, given how far along a segment it is.
pub fn slowdown_factor(progress: f64) -> f64 {
    if progress <= SLOWDOWN_START {
        return 1.0;
    }
    1.0 - SLOWDOWN_RATE * (progress.min(1.0) - SLOWDOWN_START)
}

/// Moves `progress` forward by `dt_ms` on a segment with nominal duration `duration_ms`, honoring
/// the slowdown. Returns the new progress and any time left over after reaching the end.
///
/// Inside the slowdown zone, the speed factor `u` is linear in progress, so `du/dt = -k*u/D` and
/// `u` decays exponentially. Integrating exactly (instead of stepping with the speed at the start
/// of the frame) makes one big step land in the same place as many small ones.
pub fn step(progress: f64, dt_ms: f64, duration_ms: f64) -> (f64, f64) {
    if duration_ms <= 0.0 {
        return (1.0, dt_ms);
    }
    let mut progress = progress.clamp(0.0, 1.0);
    let mut dt = dt_ms.max(0.0);

    if progress < SLOWDOWN_START {
        let until_slowdown = (SLOWDOWN_START - progress) * duration_ms;
        if dt < until_slowdown {
            return (progress + dt / duration_ms, 0.0);
        }
        dt -= until_slowdown;
        progress = SLOWDOWN_START;
    }

    let u = slowdown_factor(progress);
    let until_arrival = duration_ms / SLOWDOWN_RATE * (u / SLOWDOWN_FLOOR).ln();
    if dt >= until_arrival - ARRIVAL_EPSILON_MS {
        return (1.0, (dt - until_arrival).max(0.0));
    }
    let u = u * (-SLOWDOWN_RATE * dt / duration_ms).exp();
    let progress = (1.0 + SLOWDOWN_RATE * SLOWDOWN_START - u) / SLOWDOWN_RATE;
    (progress.min(1.0), 0.0)
}

/// How long it really takes to watch a segment with nominal duration `duration_ms`, including the
/// slowdown.
pub fn live_duration_ms(duration_ms: f64) -> f64 {
    if duration_ms <= 0.0 {
        return 0.0;
    }
    duration_ms * (SLOWDOWN_START + (1.0 / SLOWDOWN_FLOOR).ln() / SLOWDOWN_RATE)
}

/// Expected durations for every segment of a route, precomputed once per session.
pub struct Timing {
    durations: Vec<f64>,
    // When each segment starts, in nominal time since the beginning of the route
    starts: Vec<f64>,
    total: f64,
}

impl Timing {
    pub fn new(route: &Route, config: &AnimationConfig) -> Self {
        let mut durations = Vec::new();
        let mut starts = Vec::new();
        let mut total = 0.0;
        for segment in route.segments() {
            let ms = segment_duration_ms(segment, route.origin_of(segment), config);
            starts.push(total);
            durations.push(ms);
            total += ms;
        }
        Self {
            durations,
            starts,
            total,
        }
    }

    pub fn duration_ms(&self, segment: usize) -> f64 {
        self.durations[segment]
    }

    pub fn total_ms(&self) -> f64 {
        self.total
    }

    pub fn total_duration(&self) -> Duration {
        Duration::seconds(self.total / 1000.0)
    }

    /// Nominal time elapsed at some point along some segment
    pub fn elapsed_ms(&self, segment: usize, progress: f64) -> f64 {
        self.starts[segment] + progress.clamp(0.0, 1.0) * self.durations[segment]
    }

    /// Finds the segment and progress along it for some nominal elapsed time. Degenerate segments
    /// are never returned unless every segment is degenerate. Times at or past the end land on
    /// the last segment, fully traversed.
    pub fn locate(&self, target_ms: f64) -> (usize, f64) {
        if self.durations.is_empty() {
            return (0, 0.0);
        }
        let last = self.durations.len() - 1;
        if !(self.total > 0.0) {
            return (0, 0.0);
        }
        if !(target_ms < self.total) {
            return (last, 1.0);
        }
        let target_ms = target_ms.max(0.0);
        for (idx, (start, duration)) in self.starts.iter().zip(&self.durations).enumerate() {
            if *duration > 0.0 && target_ms < start + duration {
                return (idx, ((target_ms - start) / duration).clamp(0.0, 1.0));
            }
        }
        (last, 1.0)
    }
}
