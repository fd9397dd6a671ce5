//! Spatial + temporal extent of a collection.

use serde::{Deserialize, Serialize};

use super::bbox::Bbox;
use super::temporal::{TemporalInterval, TemporalValue};

/// The combined spatial and temporal extent of a collection, computed as
/// the union over member items.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub spatial: Bbox,
    pub temporal: TemporalInterval,
}

impl Extent {
    /// The extent of a single footprint.
    pub fn from_parts(bbox: Bbox, temporal: &TemporalValue) -> Self {
        Self {
            spatial: bbox,
            temporal: TemporalInterval::from_value(temporal),
        }
    }

    /// Returns the smallest extent containing both `self` and `other`.
    pub fn union(&self, other: &Extent) -> Extent {
        Extent {
            spatial: self.spatial.union(&other.spatial),
            temporal: self.temporal.union(&other.temporal),
        }
    }

    /// Returns true if the given footprint falls within this extent, both
    /// spatially and temporally.
    pub fn contains(&self, bbox: &Bbox, temporal: &TemporalValue) -> bool {
        self.spatial.contains(bbox) && self.temporal.contains(temporal)
    }
}
