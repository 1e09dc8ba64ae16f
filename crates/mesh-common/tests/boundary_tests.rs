//! Tests for Boundary construction, splitting, containment and WKT export.

use mesh_common::{Boundary, ErrorCategory, MeshError};

// ============================================================================
// Constructor tests
// ============================================================================

#[test]
fn test_boundary_new() {
    let b = Boundary::new([-90.0, 90.0], [-180.0, 180.0]).unwrap();
    assert_eq!(b.lat_range(), [-90.0, 90.0]);
    assert_eq!(b.long_range(), [-180.0, 180.0]);
    assert!(!b.crosses_antimeridian());
    assert!(b.time_range().is_none());
}

#[test]
fn test_boundary_out_of_range_longitude() {
    let err = Boundary::new([0.0, 1.0], [-190.0, 0.0]).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Configuration);
}

// ============================================================================
// WKT tests
// ============================================================================

#[test]
fn test_from_wkt_polygon() {
    let b = Boundary::from_wkt("POLYGON ((-70 -65, -60 -65, -60 -60, -70 -60, -70 -65))").unwrap();
    assert_eq!(b.lat_range(), [-65.0, -60.0]);
    assert_eq!(b.long_range(), [-70.0, -60.0]);
}

#[test]
fn test_from_wkt_antimeridian_multipolygon() {
    let wkt = "MULTIPOLYGON (((175 10, 180 10, 180 20, 175 20, 175 10)), ((-180 10, -175 10, -175 20, -180 20, -180 10)))";
    let b = Boundary::from_wkt(wkt).unwrap();
    assert!(b.crosses_antimeridian());
    assert_eq!(b.long_range(), [175.0, -175.0]);
    assert_eq!(b.lat_range(), [10.0, 20.0]);
    assert_eq!(b.width(), 10.0);
}

#[test]
fn test_from_wkt_antimeridian_part_order_irrelevant() {
    let wkt = "MULTIPOLYGON (((-180 10, -175 10, -175 20, -180 20, -180 10)), ((175 10, 180 10, 180 20, 175 20, 175 10)))";
    let b = Boundary::from_wkt(wkt).unwrap();
    assert_eq!(b.long_range(), [175.0, -175.0]);
}

#[test]
fn test_from_wkt_unsupported_shape() {
    let err = Boundary::from_wkt("LINESTRING (0 0, 1 1)").unwrap_err();
    assert!(matches!(err, MeshError::UnsupportedShape(_)));
    assert_eq!(err.category(), ErrorCategory::Configuration);
}

#[test]
fn test_from_wkt_single_part_multipolygon_rejected() {
    let err = Boundary::from_wkt("MULTIPOLYGON (((0 0, 1 0, 1 1, 0 1, 0 0)))").unwrap_err();
    assert!(matches!(err, MeshError::InvalidGeometry(_)));
}

#[test]
fn test_from_wkt_disjoint_multipolygon_rejected() {
    let wkt = "MULTIPOLYGON (((0 0, 1 0, 1 1, 0 1, 0 0)), ((5 0, 6 0, 6 1, 5 1, 5 0)))";
    let err = Boundary::from_wkt(wkt).unwrap_err();
    assert!(matches!(err, MeshError::InvalidGeometry(_)));
    assert_eq!(err.category(), ErrorCategory::Configuration);
}

#[test]
fn test_from_wkt_multipolygon_must_reach_both_sides_of_antimeridian() {
    // Eastern part stops short of 180.
    let wkt = "MULTIPOLYGON (((170 0, 179 0, 179 5, 170 5, 170 0)), ((-180 0, -170 0, -170 5, -180 5, -180 0)))";
    assert!(matches!(
        Boundary::from_wkt(wkt).unwrap_err(),
        MeshError::InvalidGeometry(_)
    ));

    // Western part starts east of -180.
    let wkt = "MULTIPOLYGON (((170 0, 180 0, 180 5, 170 5, 170 0)), ((-179 0, -170 0, -170 5, -179 5, -179 0)))";
    assert!(matches!(
        Boundary::from_wkt(wkt).unwrap_err(),
        MeshError::InvalidGeometry(_)
    ));
}

#[test]
fn test_poly_string_roundtrip() {
    let b = Boundary::new([-62.5, -60.0], [-65.0, -60.0]).unwrap();
    let text = b.to_poly_string();
    assert_eq!(
        text,
        "POLYGON ((-65 -62.5, -60 -62.5, -60 -60, -65 -60, -65 -62.5))"
    );
    assert_eq!(Boundary::from_wkt(&text).unwrap(), b);
}

#[test]
fn test_poly_string_antimeridian() {
    let b = Boundary::new([0.0, 5.0], [170.0, -170.0]).unwrap();
    let text = b.to_poly_string();
    assert!(text.starts_with("MULTIPOLYGON"));
    assert_eq!(Boundary::from_wkt(&text).unwrap(), b);
}

// ============================================================================
// Split tests
// ============================================================================

#[test]
fn test_split_quadrants() {
    let b = Boundary::new([0.0, 10.0], [0.0, 20.0]).unwrap();
    let [nw, ne, sw, se] = b.split();

    assert_eq!(nw.lat_range(), [5.0, 10.0]);
    assert_eq!(nw.long_range(), [0.0, 10.0]);
    assert_eq!(ne.lat_range(), [5.0, 10.0]);
    assert_eq!(ne.long_range(), [10.0, 20.0]);
    assert_eq!(sw.lat_range(), [0.0, 5.0]);
    assert_eq!(sw.long_range(), [0.0, 10.0]);
    assert_eq!(se.lat_range(), [0.0, 5.0]);
    assert_eq!(se.long_range(), [10.0, 20.0]);

    for child in [nw, ne, sw, se] {
        assert_eq!(child.width(), b.width() / 2.0);
        assert_eq!(child.height(), b.height() / 2.0);
    }
}

#[test]
fn test_split_preserves_area() {
    let b = Boundary::new([-80.0, -60.0], [-130.0, -100.0]).unwrap();
    let total: f64 = b.split().iter().map(|c| c.area()).sum();
    assert_eq!(total, b.area());
}

#[test]
fn test_split_across_antimeridian_at_centre() {
    let b = Boundary::new([0.0, 10.0], [170.0, -170.0]).unwrap();
    let [nw, ne, _sw, se] = b.split();
    assert_eq!(nw.long_range(), [170.0, 180.0]);
    assert_eq!(ne.long_range(), [-180.0, -170.0]);
    assert!(!nw.crosses_antimeridian());
    assert!(!se.crosses_antimeridian());
}

#[test]
fn test_split_across_antimeridian_off_centre() {
    let b = Boundary::new([0.0, 10.0], [160.0, -140.0]).unwrap();
    let [nw, ne, _, _] = b.split();
    assert_eq!(nw.long_range(), [160.0, -170.0]);
    assert!(nw.crosses_antimeridian());
    assert_eq!(ne.long_range(), [-170.0, -140.0]);
}

// ============================================================================
// Containment tests
// ============================================================================

#[test]
fn test_contains_interior_point() {
    let b = Boundary::new([0.0, 10.0], [0.0, 10.0]).unwrap();
    assert!(b.contains_point(5.0, 5.0));
    assert!(!b.contains_point(15.0, 5.0));
}

#[test]
fn test_contains_upper_right_edges_inclusive() {
    let b = Boundary::new([0.0, 10.0], [0.0, 10.0]).unwrap();
    assert!(b.contains_point(10.0, 5.0)); // top edge
    assert!(b.contains_point(5.0, 10.0)); // right edge
    assert!(b.contains_point(10.0, 10.0)); // top-right corner
}

#[test]
fn test_contains_lower_left_edges_exclusive() {
    let b = Boundary::new([0.0, 10.0], [0.0, 10.0]).unwrap();
    assert!(!b.contains_point(0.0, 5.0)); // bottom edge
    assert!(!b.contains_point(5.0, 0.0)); // left edge
}

#[test]
fn test_shared_edge_claimed_once() {
    let b = Boundary::new([0.0, 10.0], [0.0, 20.0]).unwrap();
    let children = b.split();
    let points = [(5.0, 10.0), (5.0, 5.0), (7.5, 10.0), (2.5, 15.0)];
    for (lat, long) in points {
        let owners = children.iter().filter(|c| c.contains_point(lat, long)).count();
        assert_eq!(owners, 1, "point ({}, {}) owned by {} cells", lat, long, owners);
    }
}

#[test]
fn test_contains_across_antimeridian() {
    let b = Boundary::new([0.0, 10.0], [170.0, -170.0]).unwrap();
    assert!(b.contains_point(5.0, 175.0));
    assert!(b.contains_point(5.0, -175.0));
    assert!(b.contains_point(5.0, 180.0));
    assert!(!b.contains_point(5.0, 0.0));
}

#[test]
fn test_minus_180_belongs_to_cell_ending_at_180() {
    let east = Boundary::new([0.0, 10.0], [170.0, 180.0]).unwrap();
    let west = Boundary::new([0.0, 10.0], [-180.0, -170.0]).unwrap();
    assert!(east.contains_point(5.0, -180.0));
    assert!(!west.contains_point(5.0, -180.0));

    let whole = Boundary::new([-90.0, 90.0], [-180.0, 180.0]).unwrap();
    assert!(whole.contains_point(0.0, -180.0));

    let regional = Boundary::new([0.0, 10.0], [-180.0, 0.0]).unwrap();
    assert!(!regional.contains_point(5.0, -180.0));
}

#[test]
fn test_encloses_children_after_split() {
    let parent = Boundary::new([0.0, 10.0], [170.0, -170.0]).unwrap();
    for child in parent.split() {
        assert!(parent.encloses(&child), "{} not inside {}", child, parent);
        assert!(!child.encloses(&parent));
    }
    let elsewhere = Boundary::new([0.0, 10.0], [0.0, 10.0]).unwrap();
    assert!(!parent.encloses(&elsewhere));
}
