use chrono::NaiveDateTime;
use geom::LonLat;
use serde::{Deserialize, Serialize};

use crate::{orig, WaypointID};

/// Only finite positions inside [-180, 180] x [-90, 90] can be placed on a map
pub fn is_valid_pos(pt: LonLat) -> bool {
    pt.x().is_finite() && pt.y().is_finite() && pt.x().abs() <= 180.0 && pt.y().abs() <= 90.0
}

/// How somebody travelled to a waypoint from the previous one
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    Walk,
    Bike,
    Car,
    Bus,
    Train,
    Boat,
    Plane,
}

impl TransportMode {
    pub fn all() -> Vec<TransportMode> {
        vec![
            TransportMode::Walk,
            TransportMode::Bike,
            TransportMode::Car,
            TransportMode::Bus,
            TransportMode::Train,
            TransportMode::Boat,
            TransportMode::Plane,
        ]
    }

    /// Case-insensitive, accepting a few common synonyms
    pub fn parse(x: &str) -> Option<TransportMode> {
        match x.trim().to_lowercase().as_str() {
            "walk" | "walking" | "foot" => Some(TransportMode::Walk),
            "bike" | "bicycle" | "cycling" => Some(TransportMode::Bike),
            "car" | "drive" | "driving" => Some(TransportMode::Car),
            "bus" => Some(TransportMode::Bus),
            "train" | "rail" => Some(TransportMode::Train),
            "boat" | "ferry" => Some(TransportMode::Boat),
            "plane" | "flight" | "fly" => Some(TransportMode::Plane),
            _ => None,
        }
    }

    pub fn ser(self) -> &'static str {
        match self {
            TransportMode::Walk => "walk",
            TransportMode::Bike => "bike",
            TransportMode::Car => "car",
            TransportMode::Bus => "bus",
            TransportMode::Train => "train",
            TransportMode::Boat => "boat",
            TransportMode::Plane => "plane",
        }
    }

    /// The symbolic icon for a marker travelling with this mode
    pub fn icon(self) -> &'static str {
        match self {
            TransportMode::Walk => "walking",
            TransportMode::Bike => "bicycle",
            TransportMode::Car => "car",
            TransportMode::Bus => "bus",
            TransportMode::Train => "train",
            TransportMode::Boat => "ship",
            TransportMode::Plane => "plane",
        }
    }
}

/// Per-waypoint animation settings. Anything unset falls back to the global config.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimationOverride {
    /// Applies to the leg leaving this waypoint
    pub speed_multiplier: Option<f64>,
    /// How long to linger after arriving here
    pub pause_on_arrival_seconds: Option<f64>,
    pub show_name: Option<bool>,
}

impl AnimationOverride {
    pub fn is_empty(&self) -> bool {
        self.speed_multiplier.is_none()
            && self.pause_on_arrival_seconds.is_none()
            && self.show_name.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub id: WaypointID,
    pub orig_id: orig::WaypointID,
    pub name: Option<String>,
    /// None if the input had no usable location. These stay in the trip, but can't be animated.
    pub pos: Option<LonLat>,
    pub transport_mode: Option<TransportMode>,
    pub animation: AnimationOverride,
    pub visited_at: Option<NaiveDateTime>,
}

impl Waypoint {
    pub fn new(id: WaypointID, orig_id: &str, pos: Option<LonLat>) -> Self {
        Self {
            id,
            orig_id: orig::WaypointID(orig_id.to_string()),
            name: None,
            pos,
            transport_mode: None,
            animation: AnimationOverride::default(),
            visited_at: None,
        }
    }

    /// Only returns a position that can actually be placed on a map
    pub fn valid_pos(&self) -> Option<LonLat> {
        self.pos.filter(|pos| is_valid_pos(*pos))
    }

    pub fn describe(&self) -> String {
        match self.name {
            Some(ref name) => format!("{} ({})", name, self.orig_id.0),
            None => self.orig_id.0.clone(),
        }
    }
}
