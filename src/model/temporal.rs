//! Temporal values for items and collection extents.
//!
//! Items carry either a single acquisition instant or a start/end interval;
//! collection extents carry the min/max interval over their items. All
//! timestamps are UTC and serialize as ISO-8601 through chrono.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// The temporal footprint of a single item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TemporalValue {
    /// A single acquisition instant.
    Instant(DateTime<Utc>),
    /// A start/end interval, inclusive on both ends.
    Interval {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

impl TemporalValue {
    /// Builds an instant from a calendar date at midnight UTC.
    ///
    /// Returns `None` for out-of-range dates.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
            .single()
            .map(TemporalValue::Instant)
    }

    /// Earliest instant covered by this value.
    pub fn start(&self) -> DateTime<Utc> {
        match self {
            TemporalValue::Instant(t) => *t,
            TemporalValue::Interval { start, .. } => *start,
        }
    }

    /// Latest instant covered by this value.
    pub fn end(&self) -> DateTime<Utc> {
        match self {
            TemporalValue::Instant(t) => *t,
            TemporalValue::Interval { end, .. } => *end,
        }
    }

    /// Returns true if an interval's start does not precede its end.
    pub fn is_ordered(&self) -> bool {
        self.start() <= self.end()
    }
}

/// The temporal extent of a collection: the smallest interval containing
/// every member item's temporal value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporalInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TemporalInterval {
    /// The degenerate interval covering exactly one value.
    pub fn from_value(value: &TemporalValue) -> Self {
        Self {
            start: value.start(),
            end: value.end(),
        }
    }

    /// Returns the smallest interval containing both `self` and `other`.
    ///
    /// Min/max reduction: commutative and associative, so aggregation over
    /// items is insertion-order independent.
    pub fn union(&self, other: &TemporalInterval) -> TemporalInterval {
        TemporalInterval {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Returns true if `value` falls entirely within this interval.
    pub fn contains(&self, value: &TemporalValue) -> bool {
        self.start <= value.start() && value.end() <= self.end
    }
}
