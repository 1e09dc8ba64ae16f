//! Common test fixtures for mesh tests.
//!
//! This module provides pre-defined regions, configurations and graphs
//! that represent common mesh construction scenarios.

/// Common regions as `(lat_min, lat_max, long_min, long_max)`.
pub mod region {
    /// Whole globe.
    pub const GLOBAL: (f64, f64, f64, f64) = (-80.0, 80.0, -180.0, 180.0);

    /// Antarctic Peninsula, the regression corpus region.
    pub const PENINSULA: (f64, f64, f64, f64) = (-65.0, -60.0, -70.0, -50.0);

    /// Crosses the antimeridian (Pacific-centric).
    pub const PACIFIC: (f64, f64, f64, f64) = (-10.0, 10.0, 160.0, -160.0);

    /// Unit square at the origin.
    pub const UNIT: (f64, f64, f64, f64) = (0.0, 1.0, 0.0, 1.0);
}

/// 3x3 uniform grid, ids "1".."9" row-major from the north-west corner.
///
/// ```text
///   1 2 3
///   4 5 6
///   7 8 9
/// ```
pub const GRAPH_3X3_JSON: &str = r#"{
  "1": { "1": [], "2": ["2"], "3": ["5"], "4": ["4"], "-1": [], "-2": [], "-3": [], "-4": [] },
  "2": { "1": [], "2": ["3"], "3": ["6"], "4": ["5"], "-1": ["4"], "-2": ["1"], "-3": [], "-4": [] },
  "3": { "1": [], "2": [], "3": [], "4": ["6"], "-1": ["5"], "-2": ["2"], "-3": [], "-4": [] },
  "4": { "1": ["2"], "2": ["5"], "3": ["8"], "4": ["7"], "-1": [], "-2": [], "-3": [], "-4": ["1"] },
  "5": { "1": ["3"], "2": ["6"], "3": ["9"], "4": ["8"], "-1": ["7"], "-2": ["4"], "-3": ["1"], "-4": ["2"] },
  "6": { "1": [], "2": [], "3": [], "4": ["9"], "-1": ["8"], "-2": ["5"], "-3": ["2"], "-4": ["3"] },
  "7": { "1": ["5"], "2": ["8"], "3": [], "4": [], "-1": [], "-2": [], "-3": [], "-4": ["4"] },
  "8": { "1": ["6"], "2": ["9"], "3": [], "4": [], "-1": [], "-2": ["7"], "-3": ["4"], "-4": ["5"] },
  "9": { "1": [], "2": [], "3": [], "4": [], "-1": [], "-2": ["8"], "-3": ["5"], "-4": ["6"] }
}"#;

/// Mesh configurations in YAML.
pub mod configs {
    /// Peninsula region, uniform field: nothing splits.
    pub const UNIFORM_YAML: &str = r#"
region:
  lat_min: -65
  lat_max: -60
  long_min: -70
  long_max: -50
  start_time: "2017-02-01"
  end_time: "2017-02-04"
  cell_width: 5
  cell_height: 2.5
data_sources:
  - loader: uniform
    params:
      data_name: dummy_data
      value: 0.5
      n: 20
      aggregate_type: MEAN
      value_fill_type: parent
      splitting_conditions:
        - threshold: 0.5
          upper_bound: 0.85
          lower_bound: 0.15
splitting:
  split_depth: 4
  minimum_datapoints: 5
"#;

    /// Peninsula region, disc of data near the centre: cells on the rim split.
    pub const CIRCLE_YAML: &str = r#"
region:
  lat_min: -65
  lat_max: -60
  long_min: -70
  long_max: -50
  cell_width: 5
  cell_height: 2.5
data_sources:
  - loader: circle
    params:
      data_name: dummy_data
      centre: [-62.5, -60]
      radius: 2
      n: 100
      aggregate_type: MEAN
      value_fill_type: parent
      splitting_conditions:
        - threshold: 0.5
          upper_bound: 0.85
          lower_bound: 0.15
splitting:
  split_depth: 3
  minimum_datapoints: 5
"#;

    /// Peninsula region, checkerboard with squares smaller than a cell.
    pub const CHECKERBOARD_YAML: &str = r#"
region:
  lat_min: -65
  lat_max: -60
  long_min: -70
  long_max: -50
  cell_width: 5
  cell_height: 2.5
data_sources:
  - loader: checkerboard
    params:
      data_name: dummy_data
      gridsize: [2.5, 1.25]
      n: 64
      aggregate_type: MAX
      splitting_conditions:
        - threshold: 0.5
          upper_bound: 0.85
          lower_bound: 0.15
splitting:
  split_depth: 2
  minimum_datapoints: 5
"#;

    /// Whole globe with a gradient field and wrapped longitude.
    pub const GLOBAL_GRADIENT_YAML: &str = r#"
region:
  lat_min: -80
  lat_max: 80
  long_min: -180
  long_max: 180
  cell_width: 40
  cell_height: 40
  global: true
data_sources:
  - loader: gradient
    params:
      data_name: dummy_data
      vertical: false
      n: 72
      splitting_conditions:
        - threshold: 0.5
          upper_bound: 0.85
          lower_bound: 0.15
splitting:
  split_depth: 3
  minimum_datapoints: 5
"#;

    /// Region straddling the antimeridian with a disc centred on it.
    pub const PACIFIC_CIRCLE_YAML: &str = r#"
region:
  lat_min: -10
  lat_max: 10
  long_min: 160
  long_max: -160
  cell_width: 10
  cell_height: 10
data_sources:
  - loader: circle
    params:
      data_name: dummy_data
      centre: [0, 180]
      radius: 6
      n: 80
      splitting_conditions:
        - threshold: 0.5
          upper_bound: 0.85
          lower_bound: 0.15
splitting:
  split_depth: 3
  minimum_datapoints: 5
"#;
}
