use geom::LonLat;
use serde::Serialize;
use trip::Waypoint;

use crate::camera::Directive;
use crate::config::AnimationConfig;
use crate::session::{Frame, Session};

/// Whatever map the host draws on. The animation never reads anything back from it.
pub trait MapSurface {
    fn draw_route(&mut self, pts: &[LonLat]);
    fn apply_camera(&mut self, directive: &Directive);
    /// None hides the marker
    fn draw_marker(&mut self, marker: Option<&Marker>);
    fn set_progress(&mut self, percent: f64);
}

/// The moving icon
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Marker {
    pub pos: LonLat,
    pub icon: String,
    pub label: Option<String>,
}

impl Marker {
    fn from_frame(frame: &Frame) -> Option<Marker> {
        Some(Marker {
            pos: frame.position?,
            icon: frame.icon.clone()?,
            label: frame.label.clone(),
        })
    }
}

/// Calls `Session::advance` once per display frame and forwards everything to the surface.
pub struct FrameDriver<M: MapSurface> {
    session: Session,
    surface: M,
    playing: bool,
    // Timestamp of the previous tick, in ms. None right after starting or resuming.
    last_timestamp_ms: Option<f64>,
}

impl<M: MapSurface> FrameDriver<M> {
    pub fn new(waypoints: &[Waypoint], config: AnimationConfig, mut surface: M) -> Self {
        let session = Session::new(waypoints, config);
        surface.draw_route(&session.route().coordinates());
        if let Some(overview) = session.overview() {
            surface.apply_camera(&overview);
        }
        let mut driver = Self {
            session,
            surface,
            playing: false,
            last_timestamp_ms: None,
        };
        let frame = driver.session.snapshot();
        driver.render(&frame);
        driver
    }

    /// Call once per display frame with a monotonic timestamp. Returns None while stopped.
    pub fn tick(&mut self, timestamp_ms: f64) -> Option<Frame> {
        if !self.playing {
            return None;
        }
        let dt = match self.last_timestamp_ms {
            Some(last) => timestamp_ms - last,
            None => 0.0,
        };
        self.last_timestamp_ms = Some(timestamp_ms);

        let frame = self.session.advance(dt);
        self.render(&frame);
        if frame.is_complete {
            debug!("Playback finished, stopping the frame loop");
            self.playing = false;
            self.last_timestamp_ms = None;
        }
        Some(frame)
    }

    pub fn play(&mut self) {
        if self.playing {
            return;
        }
        if !self.session.is_playable() {
            warn!("Can't play a trip with fewer than 2 located waypoints");
            return;
        }
        if self.session.is_complete() {
            self.session.restart();
        }
        self.playing = true;
        self.last_timestamp_ms = None;
    }

    /// Wall time spent paused doesn't count towards the animation.
    pub fn pause(&mut self) {
        self.playing = false;
        self.last_timestamp_ms = None;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn seek(&mut self, percent: f64) -> Frame {
        let frame = self.session.seek(percent);
        self.render(&frame);
        if frame.is_complete {
            self.playing = false;
            self.last_timestamp_ms = None;
        }
        frame
    }

    pub fn restart(&mut self) {
        self.session.restart();
        self.last_timestamp_ms = None;
        if let Some(overview) = self.session.overview() {
            self.surface.apply_camera(&overview);
        }
        let frame = self.session.snapshot();
        self.render(&frame);
    }

    /// Drops the session and hands the surface back
    pub fn stop(mut self) -> M {
        self.surface.draw_marker(None);
        self.surface
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn surface(&self) -> &M {
        &self.surface
    }

    fn render(&mut self, frame: &Frame) {
        if let Some(ref directive) = frame.camera {
            self.surface.apply_camera(directive);
        }
        self.surface.draw_marker(Marker::from_frame(frame).as_ref());
        self.surface.set_progress(frame.progress_percent);
    }
}
