//! End-to-end mesh construction tests over the synthetic configurations
//! in `test_utils::configs`.

use mesh_generation::{
    compare_meshes, AggregatedValue, Boundary, CellId, Direction, EnvironmentMesh, MeshBuilder, MeshConfig,
    MeshError,
};
use test_utils::{assert_approx_eq, assert_graph_symmetric, configs};

fn load(yaml: &str) -> MeshConfig {
    serde_yaml::from_str(yaml).expect("fixture config parses")
}

fn build(yaml: &str) -> EnvironmentMesh {
    MeshBuilder::new(load(yaml))
        .expect("config is valid")
        .build_environmental_mesh()
        .expect("mesh builds")
}

/// Every cellbox lies inside the region and every point of a lattice
/// strictly inside the region lies in exactly one cellbox.
fn assert_covers_region(mesh: &EnvironmentMesh, lat: [f64; 2], long: [f64; 2]) {
    let region = Boundary::new(lat, long).unwrap();
    for cellbox in mesh.cellboxes() {
        assert!(
            region.encloses(cellbox.boundary()),
            "cellbox {} at {} is outside the region",
            cellbox.id(),
            cellbox.boundary()
        );
    }

    let steps = 57;
    for i in 0..steps {
        for j in 0..steps {
            let y = lat[0] + (lat[1] - lat[0]) * (i as f64 + 0.5) / steps as f64;
            let x = long[0] + (long[1] - long[0]) * (j as f64 + 0.5) / steps as f64;
            let owners = mesh
                .cellboxes()
                .iter()
                .filter(|c| c.contains_point(y, x))
                .count();
            assert_eq!(owners, 1, "point ({}, {}) has {} owners", y, x, owners);
        }
    }
}

fn total_area(mesh: &EnvironmentMesh) -> f64 {
    mesh.cellboxes().iter().map(|c| c.boundary().area()).sum()
}

// =============================================================================
// Uniform field
// =============================================================================

#[test]
fn test_uniform_field_does_not_split() {
    let mesh = build(configs::UNIFORM_YAML);

    assert_eq!(mesh.cellboxes().len(), 8);
    let ids: Vec<u64> = mesh.cellboxes().iter().map(|c| c.id().value()).collect();
    assert_eq!(ids, (0..8).collect::<Vec<_>>());

    for cellbox in mesh.cellboxes() {
        assert_eq!(cellbox.get("dummy_data"), Some(&AggregatedValue::Scalar(0.5)));
    }
    assert_graph_symmetric!(mesh.neighbour_graph().to_json().unwrap());
}

#[test]
fn test_uniform_grid_neighbours() {
    let mesh = build(configs::UNIFORM_YAML);
    let graph = mesh.neighbour_graph();

    // 2 rows x 4 columns
    assert_eq!(
        graph.get_neighbours(CellId(1), Direction::South).unwrap(),
        &[CellId(5)]
    );
    assert_eq!(
        graph.get_neighbours(CellId(1), Direction::SouthWest).unwrap(),
        &[CellId(4)]
    );
    assert!(graph
        .get_neighbours(CellId(0), Direction::West)
        .unwrap()
        .is_empty());
    assert!(!graph.is_global_mesh());
}

#[test]
fn test_uniform_field_covers_region() {
    let mesh = build(configs::UNIFORM_YAML);
    assert_covers_region(&mesh, [-65.0, -60.0], [-70.0, -50.0]);
    assert_approx_eq!(total_area(&mesh), 100.0, 1e-9);
}

// =============================================================================
// Split behaviour
// =============================================================================

#[test]
fn test_circle_splits_rim_cells() {
    let mesh = build(configs::CIRCLE_YAML);

    assert!(mesh.cellboxes().len() > 8);
    assert_eq!(mesh.neighbour_graph().len(), mesh.cellboxes().len());
    assert_graph_symmetric!(mesh.neighbour_graph().to_json().unwrap());
    assert_covers_region(&mesh, [-65.0, -60.0], [-70.0, -50.0]);
    assert_approx_eq!(total_area(&mesh), 100.0, 1e-9);
}

#[test]
fn test_split_depth_bounds_cell_size() {
    let mesh = build(configs::CIRCLE_YAML);

    // Three splits of a 5 x 2.5 cell.
    let min_width = 5.0 / 8.0;
    let min_height = 2.5 / 8.0;
    for cellbox in mesh.cellboxes() {
        assert!(cellbox.boundary().width() >= min_width - 1e-9);
        assert!(cellbox.boundary().height() >= min_height - 1e-9);
    }
}

#[test]
fn test_checkerboard_splits_once_into_squares() {
    let mesh = build(configs::CHECKERBOARD_YAML);

    // Every initial cell straddles four squares and splits exactly once.
    assert_eq!(mesh.cellboxes().len(), 32);
    for cellbox in mesh.cellboxes() {
        assert_approx_eq!(cellbox.boundary().width(), 2.5, 1e-9);
        assert_approx_eq!(cellbox.boundary().height(), 1.25, 1e-9);
        let value = cellbox.get("dummy_data").and_then(AggregatedValue::as_f64);
        assert!(value == Some(0.0) || value == Some(1.0), "{:?}", value);
    }

    let graph = mesh.neighbour_graph();
    assert_graph_symmetric!(graph.to_json().unwrap());

    // The leaves form a regular 4 x 8 grid: only cells off the region
    // border have all eight directions populated.
    let full = graph
        .get_graph()
        .values()
        .filter(|map| map.populated_directions().len() == 8)
        .count();
    assert_eq!(full, 2 * 6);
}

#[test]
fn test_split_children_take_ids_after_initial_grid() {
    let mesh = build(configs::CHECKERBOARD_YAML);
    let ids: Vec<u64> = mesh.cellboxes().iter().map(|c| c.id().value()).collect();
    assert_eq!(ids, (8..40).collect::<Vec<_>>());
}

// =============================================================================
// Longitude wrapping
// =============================================================================

/// Cells on the western edge have western neighbours and cells on the
/// eastern edge have eastern neighbours.
fn assert_edges_wrap(mesh: &EnvironmentMesh) {
    let graph = mesh.neighbour_graph();
    for cellbox in mesh.cellboxes() {
        let [west, east] = cellbox.boundary().long_range();
        if west == -180.0 {
            assert!(
                !graph
                    .get_neighbours(cellbox.id(), Direction::West)
                    .unwrap()
                    .is_empty(),
                "cell {} on the western edge has no western neighbour",
                cellbox.id()
            );
        }
        if east == 180.0 {
            assert!(
                !graph
                    .get_neighbours(cellbox.id(), Direction::East)
                    .unwrap()
                    .is_empty(),
                "cell {} on the eastern edge has no eastern neighbour",
                cellbox.id()
            );
        }
    }
}

#[test]
fn test_global_mesh_wraps_at_antimeridian() {
    let mesh = build(configs::GLOBAL_GRADIENT_YAML);
    let graph = mesh.neighbour_graph();

    assert!(graph.is_global_mesh());
    assert_graph_symmetric!(graph.to_json().unwrap());
    assert_covers_region(&mesh, [-80.0, 80.0], [-180.0, 180.0]);
    assert_edges_wrap(&mesh);
}

#[test]
fn test_two_column_global_mesh_wraps() {
    // West column is all below the threshold, east column all above: no splits.
    let mut config = load(configs::GLOBAL_GRADIENT_YAML);
    config.region.cell_width = 180.0;
    let mesh = MeshBuilder::new(config)
        .unwrap()
        .build_environmental_mesh()
        .unwrap();
    let graph = mesh.neighbour_graph();

    assert_eq!(mesh.cellboxes().len(), 8);
    assert_graph_symmetric!(graph.to_json().unwrap());

    // Rows of two: 0 1 / 2 3 / 4 5 / 6 7
    for direction in [Direction::East, Direction::West] {
        assert_eq!(graph.get_neighbours(CellId(0), direction).unwrap(), &[CellId(1)]);
        assert_eq!(graph.get_neighbours(CellId(1), direction).unwrap(), &[CellId(0)]);
    }
    for direction in [Direction::SouthEast, Direction::SouthWest] {
        assert_eq!(graph.get_neighbours(CellId(2), direction).unwrap(), &[CellId(5)]);
    }
    assert_edges_wrap(&mesh);
}

#[test]
fn test_two_column_global_mesh_splits_across_wrap() {
    let yaml = configs::GLOBAL_GRADIENT_YAML
        .replace("loader: gradient", "loader: circle")
        .replace("vertical: false", "centre: [0, 0]\n      radius: 60");
    let mut config = load(&yaml);
    config.region.cell_width = 180.0;
    let mesh = MeshBuilder::new(config)
        .unwrap()
        .build_environmental_mesh()
        .unwrap();

    // The disc sits on the corner shared by the four middle cells.
    assert!(mesh.cellboxes().len() > 8);
    assert_graph_symmetric!(mesh.neighbour_graph().to_json().unwrap());
    assert_covers_region(&mesh, [-80.0, 80.0], [-180.0, 180.0]);
    assert_edges_wrap(&mesh);
}

#[test]
fn test_pacific_mesh_is_consistent() {
    let mesh = build(configs::PACIFIC_CIRCLE_YAML);

    assert!(mesh.cellboxes().len() > 8);
    assert_eq!(mesh.neighbour_graph().len(), mesh.cellboxes().len());
    assert_graph_symmetric!(mesh.neighbour_graph().to_json().unwrap());

    // The disc is centred on the antimeridian, so cells there hold data.
    let centre = mesh.cellbox_containing(0.5, 180.0).expect("point is covered");
    assert!(centre.get("dummy_data").and_then(AggregatedValue::as_f64).is_some());
    assert!(mesh.cellbox_containing(0.5, -179.5).is_some());
    assert!(mesh.cellbox_containing(0.5, 0.0).is_none());
}

// =============================================================================
// Determinism and validation
// =============================================================================

#[test]
fn test_builds_are_deterministic() {
    for yaml in [
        configs::CIRCLE_YAML,
        configs::GLOBAL_GRADIENT_YAML,
        configs::PACIFIC_CIRCLE_YAML,
    ] {
        let first = build(yaml);
        let second = build(yaml);
        let report = compare_meshes(&first, &second).unwrap();
        assert!(report.is_match(), "{}", report);
    }
}

#[test]
fn test_invalid_config_is_rejected() {
    let mut config = load(configs::UNIFORM_YAML);
    config.region.cell_width = 0.0;
    let err = MeshBuilder::new(config).unwrap_err();
    assert!(matches!(err, MeshError::InvalidConfig { .. }));

    let mut config = load(configs::UNIFORM_YAML);
    config.region.end_time = None;
    assert!(MeshBuilder::new(config).is_err());
}
