use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::route::RoutePoint;

/// What the global speed slider offers. The model itself accepts any positive multiplier.
pub const SPEED_SLIDER_RANGE: (f64, f64) = (0.5, 3.0);

/// Global animation settings. Each waypoint may override some of these.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// The global speed slider
    pub speed_multiplier: f64,
    /// The default for waypoints that don't set their own speed
    pub item_speed_multiplier: Option<f64>,
    pub pause_on_arrival_seconds: f64,
    pub zoom_at_start: bool,
    pub zoom_out_at_end: bool,
    pub show_name: bool,
    pub show_on_arrival: bool,
    pub default_travel_icon: String,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            speed_multiplier: 1.0,
            item_speed_multiplier: None,
            pause_on_arrival_seconds: 6.0,
            zoom_at_start: true,
            zoom_out_at_end: true,
            show_name: true,
            show_on_arrival: true,
            default_travel_icon: "car".to_string(),
        }
    }
}

impl AnimationConfig {
    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        Ok(config.sanitized())
    }

    /// Replaces values the animation can't use, so nothing downstream has to check again.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !valid_multiplier(self.speed_multiplier) {
            warn!(
                "Bad speed_multiplier {}, using {}",
                self.speed_multiplier, defaults.speed_multiplier
            );
            self.speed_multiplier = defaults.speed_multiplier;
        }
        if let Some(x) = self.item_speed_multiplier {
            if !valid_multiplier(x) {
                warn!("Bad item_speed_multiplier {}, ignoring it", x);
                self.item_speed_multiplier = None;
            }
        }
        if !self.pause_on_arrival_seconds.is_finite() {
            warn!(
                "Bad pause_on_arrival_seconds {}, using {}",
                self.pause_on_arrival_seconds, defaults.pause_on_arrival_seconds
            );
            self.pause_on_arrival_seconds = defaults.pause_on_arrival_seconds;
        } else if self.pause_on_arrival_seconds < 0.0 {
            self.pause_on_arrival_seconds = 0.0;
        }
        if self.default_travel_icon.is_empty() {
            self.default_travel_icon = defaults.default_travel_icon;
        }
        self
    }

    /// The speed factor for the leg leaving this point, before the global slider is applied
    pub fn item_speed(&self, origin: &RoutePoint) -> f64 {
        origin
            .animation
            .speed_multiplier
            .filter(|x| valid_multiplier(*x))
            .or(self.item_speed_multiplier)
            .unwrap_or(1.0)
    }

    pub fn pause_ms(&self, arrived_at: &RoutePoint) -> f64 {
        let seconds = arrived_at
            .animation
            .pause_on_arrival_seconds
            .filter(|x| x.is_finite())
            .unwrap_or(self.pause_on_arrival_seconds);
        1000.0 * seconds.max(0.0)
    }

    /// Should the name of this point be shown once the marker reaches it?
    pub fn label_on_arrival(&self, arrived_at: &RoutePoint) -> Option<String> {
        if !self.show_on_arrival || !arrived_at.animation.show_name.unwrap_or(self.show_name) {
            return None;
        }
        arrived_at.name.clone()
    }
}

fn valid_multiplier(x: f64) -> bool {
    x.is_finite() && x > 0.0
}
