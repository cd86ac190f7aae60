#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod features;
mod ids;
mod itinerary;
mod waypoint;

use anyhow::Result;
use geojson::GeoJson;
use serde::{Deserialize, Serialize};

pub use ids::{orig, WaypointID};
pub use waypoint::{is_valid_pos, AnimationOverride, TransportMode, Waypoint};

/// An ordered list of places somebody visits
#[derive(Clone, Serialize, Deserialize)]
pub struct Trip {
    pub name: Option<String>,
    pub waypoints: Vec<Waypoint>,
}

impl Trip {
    /// If every waypoint has a visit time, they're put in that order. Otherwise the input order
    /// is the visit order.
    pub fn new(name: Option<String>, mut waypoints: Vec<Waypoint>) -> Self {
        if !waypoints.is_empty() && waypoints.iter().all(|wp| wp.visited_at.is_some()) {
            // Stable, so ties keep their input order
            waypoints.sort_by_key(|wp| wp.visited_at);
        }
        Self { name, waypoints }
    }

    pub fn load_csv<R: std::io::Read>(name: Option<String>, reader: R) -> Result<Self> {
        let trip = Self::new(name, itinerary::load(reader)?);
        trip.log_summary();
        Ok(trip)
    }

    pub fn load_geojson(name: Option<String>, raw: &str) -> Result<Self> {
        let trip = Self::new(name, features::load(raw)?);
        trip.log_summary();
        Ok(trip)
    }

    /// Located waypoints as points, plus one line for the whole route
    pub fn to_geojson(&self) -> GeoJson {
        features::export(self)
    }

    pub fn num_located(&self) -> usize {
        self.waypoints
            .iter()
            .filter(|wp| wp.valid_pos().is_some())
            .count()
    }

    fn log_summary(&self) {
        let located = self.num_located();
        info!(
            "Loaded {} waypoints, {} with a location",
            self.waypoints.len(),
            located
        );
        if located < self.waypoints.len() {
            for wp in &self.waypoints {
                if wp.valid_pos().is_none() {
                    warn!("{} has no usable location", wp.describe());
                }
            }
        }
    }
}
