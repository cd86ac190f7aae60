use anyhow::Result;
use geom::LonLat;
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject, JsonValue, Value};

use crate::ids::IDMapping;
use crate::itinerary::{parse_mode, parse_time};
use crate::{orig, AnimationOverride, Trip, Waypoint};

/// Reads Point features as waypoints, in file order. Other geometry is skipped, so an exported
/// route line doesn't turn into a waypoint.
pub fn load(raw: &str) -> Result<Vec<Waypoint>> {
    let features = match raw.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(fc) => fc.features,
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Geometry(_) => {
            bail!("Expected a Feature or FeatureCollection, not a bare Geometry")
        }
    };

    let mut ids = IDMapping::new();
    let mut waypoints = Vec::new();
    for (idx, feature) in features.into_iter().enumerate() {
        let pos = match feature.geometry {
            Some(ref geometry) => match geometry.value {
                Value::Point(ref pt) if pt.len() >= 2 => Some(LonLat::new(pt[0], pt[1])),
                Value::Point(_) => None,
                _ => {
                    debug!("Skipping non-point feature {}", idx);
                    continue;
                }
            },
            None => None,
        };

        let orig_id = orig::WaypointID(match feature.id {
            Some(geojson::feature::Id::String(ref x)) => x.clone(),
            Some(geojson::feature::Id::Number(ref x)) => x.to_string(),
            None => match get_string(&feature, "id") {
                Some(x) => x,
                None => format!("#{}", idx),
            },
        });
        let id = ids.insert_new(orig_id.clone())?;

        waypoints.push(Waypoint {
            id,
            name: get_string(&feature, "name"),
            pos,
            transport_mode: parse_mode(
                &orig_id,
                get_string(&feature, "transport_mode").as_deref(),
            ),
            animation: AnimationOverride {
                speed_multiplier: get_f64(&feature, "speed_multiplier"),
                pause_on_arrival_seconds: get_f64(&feature, "pause_seconds"),
                show_name: get_property(&feature, "show_name").and_then(|x| x.as_bool()),
            },
            visited_at: parse_time(&orig_id, get_string(&feature, "visited_at").as_deref()),
            orig_id,
        });
    }
    Ok(waypoints)
}

pub fn export(trip: &Trip) -> GeoJson {
    let mut features = Vec::new();
    let mut line = Vec::new();
    for waypoint in &trip.waypoints {
        let pos = match waypoint.valid_pos() {
            Some(pos) => pos,
            None => {
                continue;
            }
        };
        line.push(vec![pos.x(), pos.y()]);

        let mut properties = JsonObject::new();
        if let Some(ref name) = waypoint.name {
            properties.insert("name".to_string(), name.clone().into());
        }
        if let Some(mode) = waypoint.transport_mode {
            properties.insert("transport_mode".to_string(), mode.ser().into());
        }
        if let Some(x) = waypoint.animation.speed_multiplier {
            properties.insert("speed_multiplier".to_string(), x.into());
        }
        if let Some(x) = waypoint.animation.pause_on_arrival_seconds {
            properties.insert("pause_seconds".to_string(), x.into());
        }
        if let Some(x) = waypoint.animation.show_name {
            properties.insert("show_name".to_string(), x.into());
        }
        if let Some(time) = waypoint.visited_at {
            properties.insert(
                "visited_at".to_string(),
                time.format("%Y-%m-%d %H:%M:%S").to_string().into(),
            );
        }

        features.push(Feature {
            bbox: None,
            geometry: Some(Geometry::new(Value::Point(vec![pos.x(), pos.y()]))),
            id: Some(geojson::feature::Id::String(waypoint.orig_id.0.clone())),
            properties: Some(properties),
            foreign_members: None,
        });
    }

    if line.len() >= 2 {
        let mut properties = JsonObject::new();
        properties.insert("route".to_string(), true.into());
        if let Some(ref name) = trip.name {
            properties.insert("name".to_string(), name.clone().into());
        }
        features.push(Feature {
            bbox: None,
            geometry: Some(Geometry::new(Value::LineString(line))),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        });
    }

    GeoJson::FeatureCollection(FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    })
}

fn get_property<'a>(feature: &'a Feature, key: &str) -> Option<&'a JsonValue> {
    feature.properties.as_ref().and_then(|props| props.get(key))
}

fn get_string(feature: &Feature, key: &str) -> Option<String> {
    match get_property(feature, key)? {
        JsonValue::String(x) if !x.is_empty() => Some(x.clone()),
        JsonValue::Number(x) => Some(x.to_string()),
        _ => None,
    }
}

// Numbers are sometimes quoted by other tools
fn get_f64(feature: &Feature, key: &str) -> Option<f64> {
    match get_property(feature, key)? {
        JsonValue::Number(x) => x.as_f64(),
        JsonValue::String(x) => x.trim().parse().ok(),
        _ => None,
    }
}
