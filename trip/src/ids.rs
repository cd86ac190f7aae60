use std::collections::BTreeMap;

use anyhow::Result;
use serde::{Deserialize, Serialize};

pub mod orig {
    use serde::{Deserialize, Serialize};

    /// The ID a waypoint has in the input file
    #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
    pub struct WaypointID(pub String);
}

/// Assigned in load order, so it also indexes `Trip::waypoints` before any reordering
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WaypointID(pub usize);

pub struct IDMapping {
    orig_to_cheap: BTreeMap<orig::WaypointID, WaypointID>,
}

impl IDMapping {
    pub fn new() -> Self {
        Self {
            orig_to_cheap: BTreeMap::new(),
        }
    }

    pub fn insert_new(&mut self, orig: orig::WaypointID) -> Result<WaypointID> {
        let cheap = WaypointID(self.orig_to_cheap.len());
        if self.orig_to_cheap.contains_key(&orig) {
            bail!("Duplicate waypoint {:?}", orig);
        }
        self.orig_to_cheap.insert(orig, cheap);
        Ok(cheap)
    }
}
