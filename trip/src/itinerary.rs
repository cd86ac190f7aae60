use anyhow::Result;
use geom::LonLat;
use serde::Deserialize;

use crate::ids::IDMapping;
use crate::{orig, AnimationOverride, TransportMode, Waypoint};

/// Reads an itinerary CSV. Only the `id` column is required.
pub fn load<R: std::io::Read>(reader: R) -> Result<Vec<Waypoint>> {
    let mut ids = IDMapping::new();
    let mut waypoints = Vec::new();
    for rec in csv::Reader::from_reader(reader).deserialize() {
        let rec: Record = rec?;
        let id = ids.insert_new(rec.id.clone())?;
        let pos = match (rec.lat, rec.lon) {
            (Some(lat), Some(lon)) => Some(LonLat::new(lon, lat)),
            _ => None,
        };
        waypoints.push(Waypoint {
            id,
            transport_mode: parse_mode(&rec.id, rec.transport_mode.as_deref()),
            visited_at: parse_time(&rec.id, rec.visited_at.as_deref()),
            orig_id: rec.id,
            name: rec.name.filter(|x| !x.is_empty()),
            pos,
            animation: AnimationOverride {
                speed_multiplier: rec.speed_multiplier,
                pause_on_arrival_seconds: rec.pause_seconds,
                show_name: rec.show_name,
            },
        });
    }
    Ok(waypoints)
}

pub(crate) fn parse_mode(id: &orig::WaypointID, raw: Option<&str>) -> Option<TransportMode> {
    let raw = raw?;
    if raw.trim().is_empty() {
        return None;
    }
    let mode = TransportMode::parse(raw);
    if mode.is_none() {
        warn!("{:?} has unknown transport_mode {}, ignoring it", id, raw);
    }
    mode
}

pub(crate) fn parse_time(
    id: &orig::WaypointID,
    raw: Option<&str>,
) -> Option<chrono::NaiveDateTime> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(time) = chrono::NaiveDateTime::parse_from_str(raw, format) {
            return Some(time);
        }
    }
    if let Ok(date) = chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    warn!("{:?} has malformed visited_at {}, ignoring it", id, raw);
    None
}

#[derive(Deserialize)]
struct Record {
    id: orig::WaypointID,
    name: Option<String>,
    // Blank or garbage coordinates just mean the waypoint can't be animated
    #[serde(default, deserialize_with = "csv::invalid_option")]
    lat: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    lon: Option<f64>,
    transport_mode: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    speed_multiplier: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pause_seconds: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    show_name: Option<bool>,
    visited_at: Option<String>,
}
