//! Cell boundary: an axis-aligned lat/long rectangle with an optional time range.
//!
//! Longitudes are kept in [-180, 180]. A boundary whose `long_min` is greater
//! than its `long_max` crosses the antimeridian: it covers
//! `[long_min, 180] ∪ [-180, long_max]`.

use serde::{Deserialize, Serialize};

use crate::error::{MeshError, MeshResult};
use crate::geometry::{self, BoundaryShape, Shape};
use crate::time::TimeRange;

/// Tolerance used when comparing edge coordinates.
pub const EDGE_EPSILON: f64 = 1e-9;

/// A geographic (and optionally temporal) rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Boundary {
    lat_range: [f64; 2],
    long_range: [f64; 2],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    time_range: Option<TimeRange>,
}

impl Boundary {
    /// Create a boundary from explicit ranges.
    ///
    /// `long_range[0] > long_range[1]` describes an antimeridian-crossing
    /// boundary. Latitude must be ordered.
    pub fn new(lat_range: [f64; 2], long_range: [f64; 2]) -> MeshResult<Self> {
        let [lat_min, lat_max] = lat_range;
        let [long_min, long_max] = long_range;

        if !(lat_min.is_finite() && lat_max.is_finite()) {
            return Err(MeshError::invalid_geometry("latitude must be finite"));
        }
        if !(long_min.is_finite() && long_max.is_finite()) {
            return Err(MeshError::invalid_geometry("longitude must be finite"));
        }
        if lat_min > lat_max {
            return Err(MeshError::invalid_geometry(format!(
                "lat_min {} is greater than lat_max {}",
                lat_min, lat_max
            )));
        }
        if lat_min < -90.0 || lat_max > 90.0 {
            return Err(MeshError::invalid_geometry(format!(
                "latitude range [{}, {}] outside [-90, 90]",
                lat_min, lat_max
            )));
        }
        if long_min < -180.0 || long_max > 180.0 || long_max < -180.0 || long_min > 180.0 {
            return Err(MeshError::invalid_geometry(format!(
                "longitude range [{}, {}] outside [-180, 180]",
                long_min, long_max
            )));
        }

        Ok(Self {
            lat_range,
            long_range,
            time_range: None,
        })
    }

    /// Create a boundary from a longitude range that may run past 180.
    ///
    /// `west <= east` must hold; edges beyond 180 are folded back so the
    /// result may cross the antimeridian.
    pub fn from_unwrapped(lat_range: [f64; 2], west: f64, east: f64) -> MeshResult<Self> {
        if west > east {
            return Err(MeshError::invalid_geometry(format!(
                "unwrapped west edge {} is east of {}",
                west, east
            )));
        }
        if east - west > 360.0 + EDGE_EPSILON {
            return Err(MeshError::invalid_geometry(format!(
                "longitude extent {} exceeds 360 degrees",
                east - west
            )));
        }
        Self::new(lat_range, [wrap_long_min(west), wrap_long_max(east)])
    }

    /// Attach a time range.
    pub fn with_time_range(mut self, time_range: TimeRange) -> Self {
        self.time_range = Some(time_range);
        self
    }

    /// Build a boundary from WKT polygon text.
    ///
    /// Handles a single `POLYGON` and the two-part antimeridian `MULTIPOLYGON`.
    pub fn from_wkt(wkt: &str) -> MeshResult<Self> {
        let shape = geometry::parse_wkt(wkt)?;
        Self::from_shape(&BoundaryShape::from_shape(&shape)?)
    }

    /// Build a boundary from a resolved outline.
    pub fn from_shape(shape: &BoundaryShape) -> MeshResult<Self> {
        let (lat_range, long_range) = shape.ranges()?;
        Self::new(lat_range, long_range)
    }

    pub fn lat_range(&self) -> [f64; 2] {
        self.lat_range
    }

    pub fn long_range(&self) -> [f64; 2] {
        self.long_range
    }

    pub fn time_range(&self) -> Option<&TimeRange> {
        self.time_range.as_ref()
    }

    pub fn lat_min(&self) -> f64 {
        self.lat_range[0]
    }

    pub fn lat_max(&self) -> f64 {
        self.lat_range[1]
    }

    pub fn long_min(&self) -> f64 {
        self.long_range[0]
    }

    pub fn long_max(&self) -> f64 {
        self.long_range[1]
    }

    /// Whether this boundary wraps through ±180°.
    pub fn crosses_antimeridian(&self) -> bool {
        self.long_range[0] > self.long_range[1]
    }

    /// Longitude range with the eastern edge shifted past 180 when the
    /// boundary crosses the antimeridian, so that `min <= max` always holds.
    pub fn unwrapped_long_range(&self) -> (f64, f64) {
        if self.crosses_antimeridian() {
            (self.long_range[0], self.long_range[1] + 360.0)
        } else {
            (self.long_range[0], self.long_range[1])
        }
    }

    /// Longitudinal extent in degrees.
    pub fn width(&self) -> f64 {
        let (min, max) = self.unwrapped_long_range();
        max - min
    }

    /// Latitudinal extent in degrees.
    pub fn height(&self) -> f64 {
        self.lat_range[1] - self.lat_range[0]
    }

    /// Longitude of the centre, normalised into [-180, 180].
    pub fn cx(&self) -> f64 {
        let (min, max) = self.unwrapped_long_range();
        wrap_long_max((min + max) / 2.0)
    }

    /// Latitude of the centre.
    pub fn cy(&self) -> f64 {
        (self.lat_range[0] + self.lat_range[1]) / 2.0
    }

    /// Half the longitudinal extent.
    pub fn dcx(&self) -> f64 {
        self.width() / 2.0
    }

    /// Half the latitudinal extent.
    pub fn dcy(&self) -> f64 {
        self.height() / 2.0
    }

    /// Split into four quadrants ordered NW, NE, SW, SE.
    ///
    /// Each child is half the parent's extent on both axes and all four share
    /// the parent's centre as a corner. The time range is inherited.
    pub fn split(&self) -> [Boundary; 4] {
        let (long_min, long_max) = self.unwrapped_long_range();
        let long_mid = (long_min + long_max) / 2.0;
        let [lat_min, lat_max] = self.lat_range;
        let lat_mid = (lat_min + lat_max) / 2.0;

        let west = [wrap_long_min(long_min), wrap_long_max(long_mid)];
        let east = [wrap_long_min(long_mid), wrap_long_max(long_max)];
        let north = [lat_mid, lat_max];
        let south = [lat_min, lat_mid];

        let child = |lat_range: [f64; 2], long_range: [f64; 2]| Boundary {
            lat_range,
            long_range,
            time_range: self.time_range,
        };

        [
            child(north, west),
            child(north, east),
            child(south, west),
            child(south, east),
        ]
    }

    /// Point containment with inclusive upper/right edges.
    ///
    /// A point on the northern or eastern edge belongs to this boundary; a
    /// point on the southern or western edge belongs to the neighbour, so
    /// adjacent cells never both claim a shared edge.
    ///
    /// Longitude -180 is the same meridian as 180, so it belongs to the cell
    /// whose eastern edge is 180.
    pub fn contains_point(&self, lat: f64, long: f64) -> bool {
        let [lat_min, lat_max] = self.lat_range;
        if !(lat > lat_min && lat <= lat_max) {
            return false;
        }
        let long = if long == -180.0 { 180.0 } else { long };

        let [long_min, long_max] = self.long_range;
        if self.crosses_antimeridian() {
            long > long_min || long <= long_max
        } else {
            long > long_min && long <= long_max
        }
    }

    /// Whether `other` lies entirely inside this boundary (edges inclusive).
    pub fn encloses(&self, other: &Boundary) -> bool {
        let (a_min, a_max) = self.unwrapped_long_range();
        let (mut b_min, mut b_max) = other.unwrapped_long_range();
        if b_max < a_min - EDGE_EPSILON {
            b_min += 360.0;
            b_max += 360.0;
        }
        other.lat_min() >= self.lat_min() - EDGE_EPSILON
            && other.lat_max() <= self.lat_max() + EDGE_EPSILON
            && b_min >= a_min - EDGE_EPSILON
            && b_max <= a_max + EDGE_EPSILON
    }

    /// Area in square degrees.
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Outline as a WKT shape: one ring, or two rings when crossing ±180°.
    pub fn to_shape(&self) -> Shape {
        let [lat_min, lat_max] = self.lat_range;
        let [long_min, long_max] = self.long_range;
        if self.crosses_antimeridian() {
            Shape::MultiPolygon(vec![
                geometry::rectangle_ring(long_min, lat_min, 180.0, lat_max),
                geometry::rectangle_ring(-180.0, lat_min, long_max, lat_max),
            ])
        } else {
            Shape::Polygon(geometry::rectangle_ring(long_min, lat_min, long_max, lat_max))
        }
    }

    /// WKT text of the outline, as persisted in mesh files.
    pub fn to_poly_string(&self) -> String {
        geometry::to_wkt(&self.to_shape())
    }
}

impl std::fmt::Display for Boundary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "lat[{}, {}] long[{}, {}]",
            self.lat_range[0], self.lat_range[1], self.long_range[0], self.long_range[1]
        )
    }
}

/// Normalise a western edge: 180 and beyond fold onto the negative side.
fn wrap_long_min(long: f64) -> f64 {
    if long >= 180.0 {
        long - 360.0
    } else {
        long
    }
}

/// Normalise an eastern edge: exactly 180 stays, beyond folds over.
fn wrap_long_max(long: f64) -> f64 {
    if long > 180.0 {
        long - 360.0
    } else {
        long
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centre_and_extents() {
        let b = Boundary::new([-65.0, -60.0], [-70.0, -60.0]).unwrap();
        assert_eq!(b.cx(), -65.0);
        assert_eq!(b.cy(), -62.5);
        assert_eq!(b.dcx(), 5.0);
        assert_eq!(b.dcy(), 2.5);
    }

    #[test]
    fn test_crossing_centre() {
        let b = Boundary::new([0.0, 10.0], [170.0, -170.0]).unwrap();
        assert!(b.crosses_antimeridian());
        assert_eq!(b.width(), 20.0);
        assert_eq!(b.cx(), 180.0);
    }

    #[test]
    fn test_inverted_latitude_rejected() {
        assert!(Boundary::new([10.0, 0.0], [0.0, 10.0]).is_err());
        assert!(Boundary::new([0.0, 95.0], [0.0, 10.0]).is_err());
    }
}
