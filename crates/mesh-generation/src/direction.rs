//! Compass directions between mesh cells.
//!
//! Directions carry a signed integer code; the opposite direction is the
//! arithmetic negation of the code:
//!
//! ```text
//!   NW(-3)   N(-4)   NE(1)
//!   W(-2)     .      E(2)
//!   SW(-1)   S(4)    SE(3)
//! ```

use mesh_common::boundary::EDGE_EPSILON;
use mesh_common::Boundary;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One of the eight compass directions.
///
/// Variant order is the canonical iteration and serialization order
/// (codes 1, 2, 3, 4, -1, -2, -3, -4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
    North,
}

impl Direction {
    /// All directions in canonical order.
    pub const ALL: [Direction; 8] = [
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
        Direction::North,
    ];

    /// Integer code of this direction.
    pub fn code(self) -> i8 {
        match self {
            Direction::NorthEast => 1,
            Direction::East => 2,
            Direction::SouthEast => 3,
            Direction::South => 4,
            Direction::SouthWest => -1,
            Direction::West => -2,
            Direction::NorthWest => -3,
            Direction::North => -4,
        }
    }

    pub fn from_code(code: i8) -> Option<Self> {
        Direction::ALL.into_iter().find(|d| d.code() == code)
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::NorthEast => Direction::SouthWest,
            Direction::East => Direction::West,
            Direction::SouthEast => Direction::NorthWest,
            Direction::South => Direction::North,
            Direction::SouthWest => Direction::NorthEast,
            Direction::West => Direction::East,
            Direction::NorthWest => Direction::SouthEast,
            Direction::North => Direction::South,
        }
    }

    /// Position in [`Direction::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Grid offset `(row, col)` with rows counted southwards.
    pub fn grid_offset(self) -> (i64, i64) {
        match self {
            Direction::NorthEast => (-1, 1),
            Direction::East => (0, 1),
            Direction::SouthEast => (1, 1),
            Direction::South => (1, 0),
            Direction::SouthWest => (1, -1),
            Direction::West => (0, -1),
            Direction::NorthWest => (-1, -1),
            Direction::North => (-1, 0),
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl Serialize for Direction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i8(self.code())
    }
}

impl<'de> Deserialize<'de> for Direction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = i8::deserialize(deserializer)?;
        Direction::from_code(code).ok_or_else(|| {
            serde::de::Error::custom(format!("invalid direction code {}", code))
        })
    }
}

/// How longitudes of a mesh are compared.
///
/// Cells west of `origin` are treated as lying 360° further east, which
/// makes a region crossing the antimeridian contiguous. When `periodic` is
/// set the longitude axis wraps, so cells on the eastern and western edges
/// of a global mesh touch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LongitudeFrame {
    pub origin: f64,
    pub periodic: bool,
}

impl LongitudeFrame {
    pub fn new(origin: f64, periodic: bool) -> Self {
        Self { origin, periodic }
    }

    /// Frame of a mesh covering `region`.
    pub fn for_region(region: &Boundary, periodic: bool) -> Self {
        Self::new(region.long_min(), periodic)
    }

    fn unwrap(&self, boundary: &Boundary) -> (f64, f64) {
        let (west, east) = boundary.unwrapped_long_range();
        if west < self.origin - EDGE_EPSILON {
            (west + 360.0, east + 360.0)
        } else {
            (west, east)
        }
    }
}

impl Default for LongitudeFrame {
    fn default() -> Self {
        Self::new(-180.0, false)
    }
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= EDGE_EPSILON * (1.0 + a.abs().max(b.abs()))
}

fn overlap(a_min: f64, a_max: f64, b_min: f64, b_max: f64) -> f64 {
    a_max.min(b_max) - a_min.max(b_min)
}

/// Direction in which `b` lies as seen from `a`, if the two touch.
///
/// Cells sharing part of an edge are cardinal neighbours; cells meeting at
/// a single corner are diagonal neighbours. When the pair touches on both
/// sides of a periodic frame the eastward relation is reported; use
/// [`neighbour_cases`] to get both.
pub fn neighbour_case(a: &Boundary, b: &Boundary, frame: &LongitudeFrame) -> Option<Direction> {
    neighbour_cases(a, b, frame).into_iter().next()
}

/// Every direction in which `b` lies as seen from `a`.
///
/// Outside a periodic frame this holds at most one direction. In a periodic
/// frame two cells whose widths add up to 360° touch on both their eastern
/// and western edges (the two columns of a global mesh), and both relations
/// are returned. The relation is antisymmetric: `d` is in
/// `neighbour_cases(a, b)` exactly when `d.opposite()` is in
/// `neighbour_cases(b, a)`.
pub fn neighbour_cases(a: &Boundary, b: &Boundary, frame: &LongitudeFrame) -> Vec<Direction> {
    let (a_west, a_east) = frame.unwrap(a);
    let (b_west, b_east) = frame.unwrap(b);

    let shifts: &[f64] = if frame.periodic {
        &[0.0, 360.0, -360.0]
    } else {
        &[0.0]
    };

    let mut cases = Vec::new();
    for shift in shifts {
        let case = case_between(
            (a.lat_min(), a.lat_max(), a_west, a_east),
            (b.lat_min(), b.lat_max(), b_west + shift, b_east + shift),
        );
        if let Some(direction) = case {
            if !cases.contains(&direction) {
                cases.push(direction);
            }
        }
    }
    cases
}

fn case_between(a: (f64, f64, f64, f64), b: (f64, f64, f64, f64)) -> Option<Direction> {
    let (a_south, a_north, a_west, a_east) = a;
    let (b_south, b_north, b_west, b_east) = b;

    let touches_east = close(a_east, b_west);
    let touches_west = close(a_west, b_east);
    let touches_north = close(a_north, b_south);
    let touches_south = close(a_south, b_north);

    let lat_overlap = overlap(a_south, a_north, b_south, b_north) > EDGE_EPSILON;
    let long_overlap = overlap(a_west, a_east, b_west, b_east) > EDGE_EPSILON;

    if touches_east && lat_overlap {
        Some(Direction::East)
    } else if touches_west && lat_overlap {
        Some(Direction::West)
    } else if touches_north && long_overlap {
        Some(Direction::North)
    } else if touches_south && long_overlap {
        Some(Direction::South)
    } else if touches_east && touches_north {
        Some(Direction::NorthEast)
    } else if touches_east && touches_south {
        Some(Direction::SouthEast)
    } else if touches_west && touches_north {
        Some(Direction::NorthWest)
    } else if touches_west && touches_south {
        Some(Direction::SouthWest)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(lat: [f64; 2], long: [f64; 2]) -> Boundary {
        Boundary::new(lat, long).unwrap()
    }

    #[test]
    fn test_opposite_is_negation() {
        for d in Direction::ALL {
            assert_eq!(d.opposite().code(), -d.code());
            assert_eq!(d.opposite().opposite(), d);
        }
    }

    #[test]
    fn test_code_roundtrip() {
        for d in Direction::ALL {
            assert_eq!(Direction::from_code(d.code()), Some(d));
        }
        assert_eq!(Direction::from_code(0), None);
        assert_eq!(Direction::from_code(5), None);
    }

    #[test]
    fn test_index_matches_canonical_order() {
        for (i, d) in Direction::ALL.iter().enumerate() {
            assert_eq!(d.index(), i);
        }
    }

    #[test]
    fn test_serialize_as_code() {
        assert_eq!(serde_json::to_string(&Direction::North).unwrap(), "-4");
        let d: Direction = serde_json::from_str("3").unwrap();
        assert_eq!(d, Direction::SouthEast);
        assert!(serde_json::from_str::<Direction>("9").is_err());
    }

    #[test]
    fn test_neighbour_case_quadrants() {
        let parent = cell([0.0, 10.0], [0.0, 10.0]);
        let [nw, ne, sw, se] = parent.split();
        let frame = LongitudeFrame::default();

        assert_eq!(neighbour_case(&nw, &ne, &frame), Some(Direction::East));
        assert_eq!(neighbour_case(&nw, &sw, &frame), Some(Direction::South));
        assert_eq!(neighbour_case(&nw, &se, &frame), Some(Direction::SouthEast));
        assert_eq!(neighbour_case(&se, &nw, &frame), Some(Direction::NorthWest));
        assert_eq!(neighbour_case(&sw, &ne, &frame), Some(Direction::NorthEast));
        assert_eq!(neighbour_case(&ne, &sw, &frame), Some(Direction::SouthWest));
        assert_eq!(neighbour_case(&nw, &nw, &frame), None);
    }

    #[test]
    fn test_neighbour_case_unequal_sizes() {
        let big = cell([0.0, 10.0], [0.0, 10.0]);
        let small = cell([10.0, 12.5], [2.5, 5.0]);
        let frame = LongitudeFrame::default();
        assert_eq!(neighbour_case(&big, &small, &frame), Some(Direction::North));
        assert_eq!(neighbour_case(&small, &big, &frame), Some(Direction::South));
    }

    #[test]
    fn test_neighbour_case_detached() {
        let a = cell([0.0, 10.0], [0.0, 10.0]);
        let b = cell([0.0, 10.0], [20.0, 30.0]);
        assert_eq!(neighbour_case(&a, &b, &LongitudeFrame::default()), None);
    }

    #[test]
    fn test_neighbour_case_global_wrap() {
        let west_edge = cell([0.0, 10.0], [-180.0, -170.0]);
        let east_edge = cell([0.0, 10.0], [170.0, 180.0]);

        let flat = LongitudeFrame::new(-180.0, false);
        assert_eq!(neighbour_case(&east_edge, &west_edge, &flat), None);

        let global = LongitudeFrame::new(-180.0, true);
        assert_eq!(
            neighbour_case(&east_edge, &west_edge, &global),
            Some(Direction::East)
        );
        assert_eq!(
            neighbour_case(&west_edge, &east_edge, &global),
            Some(Direction::West)
        );
    }

    #[test]
    fn test_neighbour_case_region_across_antimeridian() {
        let west_of_line = cell([0.0, 10.0], [170.0, 180.0]);
        let east_of_line = cell([0.0, 10.0], [-180.0, -170.0]);
        let frame = LongitudeFrame::new(160.0, false);
        assert_eq!(
            neighbour_case(&west_of_line, &east_of_line, &frame),
            Some(Direction::East)
        );
    }

    #[test]
    fn test_neighbour_cases_two_column_globe() {
        let west_half = cell([0.0, 90.0], [-180.0, 0.0]);
        let east_half = cell([0.0, 90.0], [0.0, 180.0]);
        let global = LongitudeFrame::new(-180.0, true);

        assert_eq!(
            neighbour_cases(&west_half, &east_half, &global),
            vec![Direction::East, Direction::West]
        );
        assert_eq!(
            neighbour_cases(&east_half, &west_half, &global),
            vec![Direction::West, Direction::East]
        );
        assert_eq!(
            neighbour_case(&west_half, &east_half, &global),
            Some(Direction::East)
        );

        let flat = LongitudeFrame::new(-180.0, false);
        assert_eq!(
            neighbour_cases(&west_half, &east_half, &flat),
            vec![Direction::East]
        );
    }

    #[test]
    fn test_neighbour_cases_diagonal_across_wrap() {
        let north_west = cell([45.0, 90.0], [-180.0, -90.0]);
        let south_east = cell([0.0, 45.0], [0.0, 180.0]);
        let global = LongitudeFrame::new(-180.0, true);

        assert_eq!(
            neighbour_cases(&north_west, &south_east, &global),
            vec![Direction::SouthWest]
        );
        assert_eq!(
            neighbour_cases(&south_east, &north_west, &global),
            vec![Direction::NorthEast]
        );
    }
}
