//! GeoJSON polygon geometry for item footprints.
//!
//! Footprints are stored the way the documents carry them: a `Polygon` with
//! an exterior ring and optional interior rings, coordinates in WGS84
//! longitude/latitude order. Construction is permissive; well-formedness is
//! checked explicitly so problems are reported instead of panicking.

use serde::{Deserialize, Serialize};

use super::bbox::Bbox;

/// A linear ring: a closed sequence of `[lon, lat]` positions.
pub type Ring = Vec<[f64; 2]>;

/// A GeoJSON geometry. Only polygons are modeled; footprints of raster
/// tiles and label extents are always polygonal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    /// A polygon with an exterior ring followed by zero or more holes.
    Polygon { coordinates: Vec<Ring> },
}

/// Why a polygon failed the well-formedness check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GeometryFault {
    /// The polygon has no rings at all.
    NoExteriorRing,
    /// A ring has fewer than 4 positions (triangle + closing vertex).
    TooFewPositions,
    /// A ring's first and last positions differ.
    RingNotClosed,
    /// A coordinate is NaN or infinite.
    NonFiniteCoordinate,
    /// The exterior ring has zero area.
    ZeroArea,
    /// Two non-adjacent edges of the exterior ring cross.
    SelfIntersection,
}

impl std::fmt::Display for GeometryFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeometryFault::NoExteriorRing => write!(f, "polygon has no exterior ring"),
            GeometryFault::TooFewPositions => write!(f, "ring has fewer than 4 positions"),
            GeometryFault::RingNotClosed => write!(f, "ring is not closed"),
            GeometryFault::NonFiniteCoordinate => write!(f, "coordinate is not finite"),
            GeometryFault::ZeroArea => write!(f, "exterior ring has zero area"),
            GeometryFault::SelfIntersection => write!(f, "exterior ring intersects itself"),
        }
    }
}

impl Geometry {
    /// Builds the rectangular polygon covering `bbox`, exterior ring wound
    /// counter-clockwise and closed.
    pub fn from_bbox(bbox: &Bbox) -> Self {
        Geometry::Polygon {
            coordinates: vec![vec![
                [bbox.minx, bbox.miny],
                [bbox.maxx, bbox.miny],
                [bbox.maxx, bbox.maxy],
                [bbox.minx, bbox.maxy],
                [bbox.minx, bbox.miny],
            ]],
        }
    }

    /// Returns the exterior ring, if any.
    pub fn exterior(&self) -> Option<&Ring> {
        match self {
            Geometry::Polygon { coordinates } => coordinates.first(),
        }
    }

    /// Computes the axis-aligned envelope of the exterior ring.
    ///
    /// Returns `None` for an empty polygon. The envelope is the canonical
    /// bbox of an item; any declared bbox must agree with it within
    /// [`super::bbox::BBOX_TOLERANCE`].
    pub fn envelope(&self) -> Option<Bbox> {
        let ring = self.exterior()?;
        let first = ring.first()?;
        let mut bbox = Bbox::new(first[0], first[1], first[0], first[1]);
        for pos in &ring[1..] {
            bbox.minx = bbox.minx.min(pos[0]);
            bbox.miny = bbox.miny.min(pos[1]);
            bbox.maxx = bbox.maxx.max(pos[0]);
            bbox.maxy = bbox.maxy.max(pos[1]);
        }
        Some(bbox)
    }

    /// Checks that the polygon is a well-formed simple polygon.
    ///
    /// Every ring must be closed, have at least 4 positions and only finite
    /// coordinates; the exterior ring must enclose nonzero area and must not
    /// cross itself. Holes are checked for closure and finiteness only.
    pub fn check_simple_polygon(&self) -> Result<(), GeometryFault> {
        let rings = match self {
            Geometry::Polygon { coordinates } => coordinates,
        };
        let exterior = rings.first().ok_or(GeometryFault::NoExteriorRing)?;

        for ring in rings {
            if ring.len() < 4 {
                return Err(GeometryFault::TooFewPositions);
            }
            if ring.iter().any(|p| !p[0].is_finite() || !p[1].is_finite()) {
                return Err(GeometryFault::NonFiniteCoordinate);
            }
            if ring.first() != ring.last() {
                return Err(GeometryFault::RingNotClosed);
            }
        }

        if shoelace_area(exterior).abs() == 0.0 {
            return Err(GeometryFault::ZeroArea);
        }
        if ring_self_intersects(exterior) {
            return Err(GeometryFault::SelfIntersection);
        }
        Ok(())
    }
}

/// Signed area of a closed ring (shoelace formula). Positive for
/// counter-clockwise winding.
fn shoelace_area(ring: &Ring) -> f64 {
    let mut sum = 0.0;
    for w in ring.windows(2) {
        sum += w[0][0] * w[1][1] - w[1][0] * w[0][1];
    }
    sum / 2.0
}

/// Tests whether any two non-adjacent edges of a closed ring properly
/// intersect. O(n^2) over the edge count; footprint rings are small.
fn ring_self_intersects(ring: &Ring) -> bool {
    // Edges i..i+1, excluding the duplicated closing vertex.
    let n = ring.len() - 1;
    for i in 0..n {
        for j in (i + 1)..n {
            // Skip adjacent edges (they share an endpoint by construction),
            // including the first/last pair which are adjacent in the cycle.
            if j == i + 1 || (i == 0 && j == n - 1) {
                continue;
            }
            if segments_intersect(ring[i], ring[i + 1], ring[j], ring[j + 1]) {
                return true;
            }
        }
    }
    false
}

/// Proper segment intersection test via orientation signs.
fn segments_intersect(a: [f64; 2], b: [f64; 2], c: [f64; 2], d: [f64; 2]) -> bool {
    fn orient(p: [f64; 2], q: [f64; 2], r: [f64; 2]) -> f64 {
        (q[0] - p[0]) * (r[1] - p[1]) - (q[1] - p[1]) * (r[0] - p[0])
    }
    fn on_segment(p: [f64; 2], q: [f64; 2], r: [f64; 2]) -> bool {
        r[0] >= p[0].min(q[0]) && r[0] <= p[0].max(q[0]) && r[1] >= p[1].min(q[1]) && r[1] <= p[1].max(q[1])
    }

    let o1 = orient(a, b, c);
    let o2 = orient(a, b, d);
    let o3 = orient(c, d, a);
    let o4 = orient(c, d, b);

    if o1 * o2 < 0.0 && o3 * o4 < 0.0 {
        return true;
    }
    // Collinear overlap counts as an intersection.
    (o1 == 0.0 && on_segment(a, b, c))
        || (o2 == 0.0 && on_segment(a, b, d))
        || (o3 == 0.0 && on_segment(c, d, a))
        || (o4 == 0.0 && on_segment(c, d, b))
}
