//! Axis-aligned geographic bounding boxes in WGS84 degrees.
//!
//! Serialized as a 4-number array `[minx, miny, maxx, maxy]`, matching the
//! on-disk item and collection documents.

use serde::{Deserialize, Serialize};

/// Tolerance, in degrees, for comparing bounding boxes that should describe
/// the same footprint (declared vs. computed from geometry).
pub const BBOX_TOLERANCE: f64 = 1e-6;

/// An axis-aligned bounding box in WGS84 degrees.
///
/// Note: this type does NOT enforce that min <= max in the constructor,
/// allowing malformed boxes to exist in a loaded tree. This is intentional -
/// validation should catch and report these rather than preventing them from
/// being represented.
#[derive(Clone, Copy, PartialEq)]
pub struct Bbox {
    pub minx: f64,
    pub miny: f64,
    pub maxx: f64,
    pub maxy: f64,
}

impl Bbox {
    /// Creates a new bounding box from explicit coordinates.
    #[inline]
    pub fn new(minx: f64, miny: f64, maxx: f64, maxy: f64) -> Self {
        Self {
            minx,
            miny,
            maxx,
            maxy,
        }
    }

    /// Returns the width of the box in degrees of longitude.
    ///
    /// May be negative if the box is malformed (maxx < minx).
    #[inline]
    pub fn width(&self) -> f64 {
        self.maxx - self.minx
    }

    /// Returns the height of the box in degrees of latitude.
    #[inline]
    pub fn height(&self) -> f64 {
        self.maxy - self.miny
    }

    /// Returns true if all coordinates are finite (not NaN or infinite).
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.minx.is_finite()
            && self.miny.is_finite()
            && self.maxx.is_finite()
            && self.maxy.is_finite()
    }

    /// Returns true if the box is properly ordered (min <= max on both axes).
    #[inline]
    pub fn is_ordered(&self) -> bool {
        self.minx <= self.maxx && self.miny <= self.maxy
    }

    /// Returns the smallest box containing both `self` and `other`.
    ///
    /// Computed by pairwise min/max, so the operation is commutative and
    /// associative: reducing a set of boxes yields the same result in any
    /// order.
    #[inline]
    pub fn union(&self, other: &Bbox) -> Bbox {
        Bbox {
            minx: self.minx.min(other.minx),
            miny: self.miny.min(other.miny),
            maxx: self.maxx.max(other.maxx),
            maxy: self.maxy.max(other.maxy),
        }
    }

    /// Returns true if `other` lies entirely within `self`, allowing
    /// [`BBOX_TOLERANCE`] of slack on every edge.
    pub fn contains(&self, other: &Bbox) -> bool {
        other.minx >= self.minx - BBOX_TOLERANCE
            && other.miny >= self.miny - BBOX_TOLERANCE
            && other.maxx <= self.maxx + BBOX_TOLERANCE
            && other.maxy <= self.maxy + BBOX_TOLERANCE
    }

    /// Returns true if the two boxes agree within [`BBOX_TOLERANCE`] on
    /// every coordinate.
    pub fn approx_eq(&self, other: &Bbox) -> bool {
        (self.minx - other.minx).abs() <= BBOX_TOLERANCE
            && (self.miny - other.miny).abs() <= BBOX_TOLERANCE
            && (self.maxx - other.maxx).abs() <= BBOX_TOLERANCE
            && (self.maxy - other.maxy).abs() <= BBOX_TOLERANCE
    }

    /// Returns the coordinates as the `[minx, miny, maxx, maxy]` array used
    /// by the document format.
    #[inline]
    pub fn to_array(&self) -> [f64; 4] {
        [self.minx, self.miny, self.maxx, self.maxy]
    }
}

impl From<[f64; 4]> for Bbox {
    fn from(a: [f64; 4]) -> Self {
        Bbox::new(a[0], a[1], a[2], a[3])
    }
}

impl std::fmt::Debug for Bbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bbox")
            .field("minx", &self.minx)
            .field("miny", &self.miny)
            .field("maxx", &self.maxx)
            .field("maxy", &self.maxy)
            .finish()
    }
}

// Documents carry bboxes as bare 4-number arrays.
impl Serialize for Bbox {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_array().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Bbox {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let a = <[f64; 4]>::deserialize(deserializer)?;
        Ok(Bbox::from(a))
    }
}
