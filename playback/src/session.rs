use geom::LonLat;
use serde::Serialize;
use trip::Waypoint;

use crate::camera::{camera_directive, CameraPhase, Directive};
use crate::config::AnimationConfig;
use crate::geodesic::lerp;
use crate::route::{Route, RoutePoint, Segment};
use crate::timing::{self, Timing};

/// Before anything moves, the camera flies to the origin and lingers this long...
pub const ZOOM_TO_START_MS: f64 = 1000.0;
/// ... then frames both ends of the first segment for this long.
pub const ZOOM_OUT_TO_BOTH_MS: f64 = 2000.0;

/// Everything that changes while a trip plays
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlaybackState {
    pub current_segment: usize,
    /// In [0, 1]
    pub segment_progress: f64,
    /// Lingering at the waypoint just arrived at
    pub is_paused: bool,
    pub pause_elapsed_ms: f64,
    pub camera_phase: CameraPhase,
    /// Nothing moves until the start sequence is over
    pub initial_zoom_done: bool,
    pub start_sequence_elapsed_ms: f64,
    pub is_complete: bool,
}

impl PlaybackState {
    fn new() -> Self {
        Self {
            current_segment: 0,
            segment_progress: 0.0,
            is_paused: false,
            pause_elapsed_ms: 0.0,
            camera_phase: CameraPhase::InitialZoomOut,
            initial_zoom_done: false,
            start_sequence_elapsed_ms: 0.0,
            is_complete: false,
        }
    }
}

/// What the host should show after one step
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Frame {
    /// None if there's nothing to animate
    pub position: Option<LonLat>,
    /// Only set when a camera phase is entered
    pub camera: Option<Directive>,
    pub progress_percent: f64,
    pub is_complete: bool,
    pub is_paused: bool,
    /// A waypoint name to show next to the marker
    pub label: Option<String>,
    pub icon: Option<String>,
}

/// One playback of a trip. Build a new one to start over with different waypoints or settings.
///
/// `advance` and `seek` are the only mutators. Both take `&mut self` and finish before returning,
/// so a seek from the UI can't interleave with a frame.
pub struct Session {
    route: Route,
    timing: Timing,
    config: AnimationConfig,
    state: PlaybackState,

    // The phase whose directive was last considered; each phase entry issues at most once
    issued_phase: Option<CameraPhase>,
    last_directive: Option<Directive>,
}

impl Session {
    pub fn new(waypoints: &[Waypoint], config: AnimationConfig) -> Self {
        let config = config.sanitized();
        let route = Route::new(waypoints);
        let timing = Timing::new(&route, &config);
        if route.is_playable() {
            info!(
                "Animating {} points over {} segments, expecting {} of travel",
                route.points().len(),
                route.segments().len(),
                timing.total_duration()
            );
        } else {
            info!(
                "Nothing to animate, only {} waypoints have a location",
                route.points().len()
            );
        }

        let mut session = Self {
            route,
            timing,
            config,
            state: PlaybackState::new(),
            issued_phase: None,
            last_directive: None,
        };
        session.restart();
        session
    }

    /// Starts over from scratch, with the same route and settings
    pub fn restart(&mut self) {
        self.state = PlaybackState::new();
        self.issued_phase = None;
        self.last_directive = None;
        if !self.is_playable() {
            self.state.is_complete = true;
        }
    }

    pub fn is_playable(&self) -> bool {
        self.route.is_playable()
    }

    pub fn is_complete(&self) -> bool {
        self.state.is_complete
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    /// Moves playback forward by some real elapsed time. Negative or non-finite deltas count as
    /// zero.
    pub fn advance(&mut self, dt_ms: f64) -> Frame {
        if !self.is_playable() || self.state.is_complete {
            return self.frame(None);
        }
        let mut dt = if dt_ms.is_finite() && dt_ms >= 0.0 {
            dt_ms
        } else {
            trace!("Ignoring frame delta {}", dt_ms);
            0.0
        };

        if !self.state.initial_zoom_done {
            dt = self.run_start_sequence(dt);
        }
        if self.state.initial_zoom_done {
            self.run(dt);
        }

        let camera = self.take_directive();
        self.frame(camera)
    }

    /// Jumps to some percent of the total expected time, clamped to [0, 100]. Doesn't restart the
    /// camera choreography.
    pub fn seek(&mut self, percent: f64) -> Frame {
        if !self.is_playable() {
            return self.frame(None);
        }
        if percent.is_nan() {
            warn!("Ignoring seek to NaN");
            return self.frame(None);
        }
        let percent = percent.clamp(0.0, 100.0);

        self.state.is_paused = false;
        self.state.pause_elapsed_ms = 0.0;
        self.state.initial_zoom_done = true;
        self.state.start_sequence_elapsed_ms = ZOOM_TO_START_MS + ZOOM_OUT_TO_BOTH_MS;
        self.state.camera_phase = CameraPhase::Maintain;
        self.issued_phase = Some(CameraPhase::Maintain);

        if percent >= 100.0 {
            self.state.current_segment = self.route.segments().len() - 1;
            self.state.segment_progress = 1.0;
            self.state.is_complete = true;
        } else {
            let (segment, progress) = self
                .timing
                .locate(percent / 100.0 * self.timing.total_ms());
            self.state.current_segment = segment;
            self.state.segment_progress = progress;
            self.state.is_complete = false;
        }
        debug!(
            "Seeked to {}%, segment {} at {:.3}",
            percent, self.state.current_segment, self.state.segment_progress
        );
        self.frame(None)
    }

    /// Where the marker is, interpolated along the current segment
    pub fn current_position(&self) -> Option<LonLat> {
        let segment = self.current_segment()?;
        Some(lerp(
            self.route.origin_of(segment).pos,
            self.route.dest_of(segment).pos,
            self.state.segment_progress,
        ))
    }

    /// The fraction of expected time that's passed, from 0 to 100. Uses nominal segment durations
    /// (ignoring the slowdown on arrival), so it never goes backwards or jumps.
    pub fn overall_progress_percent(&self) -> f64 {
        if !self.is_playable() || self.state.is_complete {
            return 100.0;
        }
        let total = self.timing.total_ms();
        if !(total > 0.0) {
            return 0.0;
        }
        let elapsed = self
            .timing
            .elapsed_ms(self.state.current_segment, self.state.segment_progress);
        (100.0 * elapsed / total).clamp(0.0, 100.0)
    }

    /// The current frame, without advancing or issuing any camera directive
    pub fn snapshot(&self) -> Frame {
        self.frame(None)
    }

    /// Frames the whole route
    pub fn overview(&self) -> Option<Directive> {
        Directive::fit(self.route.coordinates().into_iter())
    }

    // Returns the time left over, once the sequence finishes
    fn run_start_sequence(&mut self, dt: f64) -> f64 {
        if !self.config.zoom_at_start {
            self.state.initial_zoom_done = true;
            return dt;
        }

        let total = ZOOM_TO_START_MS + ZOOM_OUT_TO_BOTH_MS;
        let elapsed = self.state.start_sequence_elapsed_ms + dt;
        if elapsed >= total {
            self.state.start_sequence_elapsed_ms = total;
            self.state.initial_zoom_done = true;
            self.state.camera_phase = CameraPhase::ZoomOutToBoth;
            debug!("Start sequence done");
            return elapsed - total;
        }
        self.state.start_sequence_elapsed_ms = elapsed;
        self.state.camera_phase = if elapsed >= ZOOM_TO_START_MS {
            CameraPhase::ZoomOutToBoth
        } else {
            CameraPhase::ZoomToStart
        };
        0.0
    }

    // Spends all of dt, possibly crossing several arrivals and pauses
    fn run(&mut self, mut dt: f64) {
        while !self.state.is_complete {
            let idx = self.state.current_segment;

            if self.state.is_paused {
                let remaining =
                    self.config.pause_ms(self.arrived_at()) - self.state.pause_elapsed_ms;
                if dt < remaining {
                    self.state.pause_elapsed_ms += dt;
                    return;
                }
                dt -= remaining.max(0.0);
                self.state.is_paused = false;
                self.state.pause_elapsed_ms = 0.0;
                self.enter_segment(idx + 1);
                continue;
            }

            let duration = self.timing.duration_ms(idx);
            if duration <= 0.0 {
                trace!("Skipping zero-length segment {}", idx);
                self.arrive();
                continue;
            }

            let (progress, leftover) = timing::step(self.state.segment_progress, dt, duration);
            self.state.segment_progress = progress;
            if progress < 1.0 {
                self.update_phase();
                return;
            }
            dt = leftover;
            // The frame might have jumped straight past the last third of the segment
            self.update_phase();
            self.arrive();
        }
    }

    fn arrive(&mut self) {
        let idx = self.state.current_segment;
        self.state.segment_progress = 1.0;
        if idx + 1 >= self.route.segments().len() {
            self.finish();
            return;
        }
        // Nobody needs to linger somewhere they never left
        if self.timing.duration_ms(idx) <= 0.0 {
            self.enter_segment(idx + 1);
            return;
        }
        debug!("Arrived at {}", self.arrived_at().describe());
        self.state.is_paused = true;
        self.state.pause_elapsed_ms = 0.0;
    }

    fn finish(&mut self) {
        self.state.segment_progress = 1.0;
        self.state.is_paused = false;
        self.state.pause_elapsed_ms = 0.0;
        self.state.is_complete = true;
        if self.config.zoom_out_at_end {
            self.state.camera_phase = CameraPhase::InitialZoomOut;
            self.issued_phase = None;
        }
        info!("Reached the end of the trip");
    }

    fn enter_segment(&mut self, idx: usize) {
        self.state.current_segment = idx;
        self.state.segment_progress = 0.0;
        self.state.camera_phase = CameraPhase::InitialZoomOut;
        self.issued_phase = None;
    }

    fn update_phase(&mut self) {
        let phase = CameraPhase::for_progress(self.state.segment_progress);
        if phase.rank() > self.state.camera_phase.rank() {
            self.state.camera_phase = phase;
        }
    }

    // Only returns something the first time a phase is seen, and never repeats the previous
    // directive
    fn take_directive(&mut self) -> Option<Directive> {
        let phase = self.state.camera_phase;
        if self.issued_phase == Some(phase) {
            return None;
        }
        self.issued_phase = Some(phase);

        let directive = if self.state.is_complete {
            if self.config.zoom_out_at_end {
                self.overview()
            } else {
                None
            }
        } else {
            let segment = self.framed_segment()?;
            camera_directive(
                phase,
                self.route.origin_of(segment).pos,
                self.route.dest_of(segment).pos,
            )
        };
        if directive.is_none() || directive == self.last_directive {
            return None;
        }
        self.last_directive = directive.clone();
        directive
    }

    fn current_segment(&self) -> Option<&Segment> {
        self.route.segments().get(self.state.current_segment)
    }

    // Zero-length legs at the start have nothing to zoom out to, so the start sequence frames
    // the first one that goes somewhere
    fn framed_segment(&self) -> Option<&Segment> {
        if !self.state.initial_zoom_done {
            let moving = self
                .route
                .segments()
                .get(self.state.current_segment..)
                .and_then(|rest| rest.iter().find(|segment| !segment.is_degenerate()));
            if moving.is_some() {
                return moving;
            }
        }
        self.current_segment()
    }

    // The destination of the current segment
    fn arrived_at(&self) -> &RoutePoint {
        let segment = &self.route.segments()[self.state.current_segment];
        self.route.dest_of(segment)
    }

    fn frame(&self, camera: Option<Directive>) -> Frame {
        Frame {
            position: self.current_position(),
            camera,
            progress_percent: self.overall_progress_percent(),
            is_complete: self.state.is_complete,
            is_paused: self.state.is_paused,
            label: self.label(),
            icon: self.icon(),
        }
    }

    fn label(&self) -> Option<String> {
        if !(self.state.is_paused || self.state.is_complete) || self.state.segment_progress < 1.0 {
            return None;
        }
        self.current_segment()?;
        self.config.label_on_arrival(self.arrived_at())
    }

    fn icon(&self) -> Option<String> {
        let segment = self.current_segment()?;
        Some(match self.route.dest_of(segment).transport_mode {
            Some(mode) => mode.icon().to_string(),
            None => self.config.default_travel_icon.clone(),
        })
    }
}
