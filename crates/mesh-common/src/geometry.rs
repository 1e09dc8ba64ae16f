//! WKT polygon reading and writing.
//!
//! Cell geometries are persisted as WKT text. A normal cell is a single
//! `POLYGON`; a cell straddling the antimeridian is written as a two-part
//! `MULTIPOLYGON`, one part on each side of ±180°.

use crate::boundary::EDGE_EPSILON;
use crate::error::{MeshError, MeshResult};

/// Parsed WKT shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Single polygon (outer ring of points, `(lon, lat)`).
    Polygon(Vec<(f64, f64)>),
    /// Multiple polygons.
    MultiPolygon(Vec<Vec<(f64, f64)>>),
}

/// Axis-aligned extent of a ring: `(min_lon, min_lat, max_lon, max_lat)`.
pub type RingBounds = (f64, f64, f64, f64);

/// A cell outline resolved from a WKT shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoundaryShape {
    /// One rectangle.
    Simple {
        lat_range: [f64; 2],
        long_range: [f64; 2],
    },
    /// Two rectangles, one touching +180° and one touching -180°.
    ///
    /// Only checked when collapsed with [`BoundaryShape::ranges`].
    AntimeridianSplit {
        east: RingBounds,
        west: RingBounds,
    },
}

impl BoundaryShape {
    /// Resolve a parsed shape into a boundary outline.
    ///
    /// A multi-polygon must have exactly two parts; anything else is a
    /// configuration error.
    pub fn from_shape(shape: &Shape) -> MeshResult<Self> {
        match shape {
            Shape::Polygon(ring) => {
                let (min_lon, min_lat, max_lon, max_lat) = ring_bounds(ring)?;
                Ok(BoundaryShape::Simple {
                    lat_range: [min_lat, max_lat],
                    long_range: [min_lon, max_lon],
                })
            }
            Shape::MultiPolygon(parts) => {
                if parts.len() != 2 {
                    return Err(MeshError::invalid_geometry(format!(
                        "antimeridian boundary must have exactly two polygons, got {}",
                        parts.len()
                    )));
                }
                let a = ring_bounds(&parts[0])?;
                let b = ring_bounds(&parts[1])?;
                // The eastern half sits against +180, so it starts further east.
                let (east, west) = if a.0 >= b.0 { (a, b) } else { (b, a) };
                Ok(BoundaryShape::AntimeridianSplit { east, west })
            }
        }
    }

    /// Collapse the outline into a single `(lat_range, long_range)` pair.
    ///
    /// For the antimeridian case the longitude range wraps: its minimum is
    /// the western edge of the eastern part and its maximum the eastern edge
    /// of the western part, so `min > max`.
    pub fn ranges(&self) -> MeshResult<([f64; 2], [f64; 2])> {
        match *self {
            BoundaryShape::Simple {
                lat_range,
                long_range,
            } => Ok((lat_range, long_range)),
            BoundaryShape::AntimeridianSplit { east, west } => {
                if (east.1 - west.1).abs() > EDGE_EPSILON || (east.3 - west.3).abs() > EDGE_EPSILON {
                    return Err(MeshError::invalid_geometry(
                        "antimeridian polygons must share the same latitude range",
                    ));
                }
                if (east.2 - 180.0).abs() > EDGE_EPSILON || (west.0 + 180.0).abs() > EDGE_EPSILON {
                    return Err(MeshError::invalid_geometry(format!(
                        "antimeridian polygons must meet at ±180, got eastern part ending at {} and western part starting at {}",
                        east.2, west.0
                    )));
                }
                Ok(([east.1, east.3], [east.0, west.2]))
            }
        }
    }
}

/// Parse a WKT POLYGON or MULTIPOLYGON string.
///
/// Accepts formats:
/// - `POLYGON((lon1 lat1, lon2 lat2, lon3 lat3, lon1 lat1))`
/// - `MULTIPOLYGON(((ring1)),((ring2)))`
pub fn parse_wkt(wkt: &str) -> MeshResult<Shape> {
    let wkt = wkt.trim();
    let upper = wkt.to_uppercase();

    if upper.starts_with("MULTIPOLYGON") {
        return Ok(Shape::MultiPolygon(parse_multipolygon(wkt)?));
    }

    if upper.starts_with("POLYGON") {
        return Ok(Shape::Polygon(parse_polygon(wkt)?));
    }

    let kind = upper
        .split(|c: char| c == '(' || c.is_whitespace())
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or("<empty>");
    Err(MeshError::UnsupportedShape(kind.to_string()))
}

fn parse_polygon(wkt: &str) -> MeshResult<Vec<(f64, f64)>> {
    let start = wkt
        .find('(')
        .ok_or_else(|| MeshError::invalid_geometry("Missing opening parentheses"))?;
    let end = wkt
        .rfind(')')
        .ok_or_else(|| MeshError::invalid_geometry("Missing closing parentheses"))?;

    if end <= start {
        return Err(MeshError::invalid_geometry("Invalid parenthesis order"));
    }

    let inner = wkt[start + 1..end].trim();
    let ring = inner.trim_start_matches('(').trim_end_matches(')');
    parse_ring(ring)
}

fn parse_multipolygon(wkt: &str) -> MeshResult<Vec<Vec<(f64, f64)>>> {
    let start = wkt
        .find('(')
        .ok_or_else(|| MeshError::invalid_geometry("Missing opening parenthesis"))?;
    let end = wkt
        .rfind(')')
        .ok_or_else(|| MeshError::invalid_geometry("Missing closing parenthesis"))?;

    if end <= start {
        return Err(MeshError::invalid_geometry("Invalid parenthesis order"));
    }

    let inner = &wkt[start + 1..end];

    // Format: ((ring1)),((ring2))
    let mut polygons = Vec::new();
    let mut depth = 0;
    let mut current = String::new();

    for ch in inner.chars() {
        match ch {
            '(' => {
                depth += 1;
                if depth > 1 {
                    current.push(ch);
                }
            }
            ')' => {
                depth -= 1;
                if depth == 0 {
                    let ring_str = current.trim();
                    if !ring_str.is_empty() {
                        let ring_str = ring_str.trim_start_matches('(').trim_end_matches(')');
                        polygons.push(parse_ring(ring_str)?);
                    }
                    current.clear();
                } else {
                    current.push(ch);
                }
            }
            ',' if depth == 0 => {}
            _ => {
                if depth > 0 {
                    current.push(ch);
                }
            }
        }
    }

    if depth != 0 {
        return Err(MeshError::invalid_geometry("Unbalanced parentheses"));
    }

    if polygons.is_empty() {
        return Err(MeshError::invalid_geometry(
            "MULTIPOLYGON must contain at least one polygon",
        ));
    }

    Ok(polygons)
}

fn parse_ring(ring: &str) -> MeshResult<Vec<(f64, f64)>> {
    let points = ring
        .split(',')
        .map(|pair| {
            let pair = pair.trim();
            let parts: Vec<&str> = pair.split_whitespace().collect();
            if parts.len() != 2 {
                return Err(MeshError::invalid_geometry(format!(
                    "Expected 'lon lat' format, got '{}'",
                    pair
                )));
            }

            let lon: f64 = parts[0].parse().map_err(|_| {
                MeshError::invalid_geometry(format!("Invalid coordinate value: {}", parts[0]))
            })?;
            let lat: f64 = parts[1].parse().map_err(|_| {
                MeshError::invalid_geometry(format!("Invalid coordinate value: {}", parts[1]))
            })?;

            Ok((lon, lat))
        })
        .collect::<MeshResult<Vec<_>>>()?;

    if points.len() < 4 {
        return Err(MeshError::invalid_geometry(
            "Polygon must have at least 4 points (including closing point)",
        ));
    }

    Ok(points)
}

/// Extent of a ring of `(lon, lat)` points.
pub fn ring_bounds(ring: &[(f64, f64)]) -> MeshResult<RingBounds> {
    if ring.is_empty() {
        return Err(MeshError::invalid_geometry("empty polygon ring"));
    }

    let mut west = f64::MAX;
    let mut south = f64::MAX;
    let mut east = f64::MIN;
    let mut north = f64::MIN;

    for &(lon, lat) in ring {
        west = west.min(lon);
        south = south.min(lat);
        east = east.max(lon);
        north = north.max(lat);
    }

    Ok((west, south, east, north))
}

/// Closed rectangular ring, counter-clockwise from the south-west corner.
pub fn rectangle_ring(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Vec<(f64, f64)> {
    vec![
        (min_lon, min_lat),
        (max_lon, min_lat),
        (max_lon, max_lat),
        (min_lon, max_lat),
        (min_lon, min_lat),
    ]
}

fn format_ring(ring: &[(f64, f64)]) -> String {
    let coords: Vec<String> = ring
        .iter()
        .map(|(lon, lat)| format!("{} {}", lon, lat))
        .collect();
    format!("({})", coords.join(", "))
}

/// Format a shape as WKT text.
pub fn to_wkt(shape: &Shape) -> String {
    match shape {
        Shape::Polygon(ring) => format!("POLYGON ({})", format_ring(ring)),
        Shape::MultiPolygon(parts) => {
            let polys: Vec<String> = parts
                .iter()
                .map(|ring| format!("({})", format_ring(ring)))
                .collect();
            format!("MULTIPOLYGON ({})", polys.join(", "))
        }
    }
}
