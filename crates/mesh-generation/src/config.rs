//! Configuration for mesh construction.
//!
//! The same structure is read from YAML or JSON and echoed verbatim into
//! the persisted mesh so that a mesh can be rebuilt from its own file.

use serde::{Deserialize, Serialize};

use mesh_common::{Boundary, MeshError, MeshResult, TimeRange};

use crate::aggregation::AggregationMethod;
use crate::metadata::{FillPolicy, SplitCondition};
use crate::sources::ShapePattern;

/// Full mesh configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshConfig {
    pub region: RegionConfig,

    #[serde(default)]
    pub data_sources: Vec<DataSourceConfig>,

    #[serde(default)]
    pub splitting: SplittingConfig,
}

/// Region covered by the mesh and the size of the initial grid cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionConfig {
    pub lat_min: f64,
    pub lat_max: f64,
    pub long_min: f64,
    pub long_max: f64,

    /// `YYYY-MM-DD` or `TODAY`, `TODAY-n`, `TODAY+n`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,

    /// Initial cell width in degrees of longitude.
    pub cell_width: f64,
    /// Initial cell height in degrees of latitude.
    pub cell_height: f64,

    /// Treat longitude as periodic; the region must span 360°.
    #[serde(default)]
    pub global: bool,
}

/// Recursion limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplittingConfig {
    /// Maximum number of times a top-level cell may be split.
    #[serde(default = "default_split_depth")]
    pub split_depth: u32,

    /// A condition is only evaluated on cells holding at least this many samples.
    #[serde(default = "default_minimum_datapoints")]
    pub minimum_datapoints: usize,
}

fn default_split_depth() -> u32 {
    4
}

fn default_minimum_datapoints() -> usize {
    5
}

impl Default for SplittingConfig {
    fn default() -> Self {
        Self {
            split_depth: default_split_depth(),
            minimum_datapoints: default_minimum_datapoints(),
        }
    }
}

/// One data source binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSourceConfig {
    /// Built-in generator (`uniform`, `gradient`, `checkerboard`, `circle`)
    /// or the name of a source registered with the factory.
    pub loader: String,

    #[serde(default)]
    pub params: DataSourceParams,
}

/// Parameters shared by every loader, plus the shape parameters of the
/// built-in generators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSourceParams {
    #[serde(default = "default_data_name")]
    pub data_name: String,

    /// Lattice size of the built-in generators.
    #[serde(default = "default_lattice_size")]
    pub n: usize,

    #[serde(default)]
    pub aggregate_type: AggregationMethod,

    #[serde(default, alias = "value_fill_types")]
    pub value_fill_type: FillPolicy,

    #[serde(default)]
    pub splitting_conditions: Vec<SplitCondition>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gridsize: Option<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub centre: Option<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
}

fn default_data_name() -> String {
    "dummy_data".to_string()
}

fn default_lattice_size() -> usize {
    100
}

impl Default for DataSourceParams {
    fn default() -> Self {
        Self {
            data_name: default_data_name(),
            n: default_lattice_size(),
            aggregate_type: AggregationMethod::default(),
            value_fill_type: FillPolicy::default(),
            splitting_conditions: Vec::new(),
            value: None,
            vertical: None,
            gridsize: None,
            centre: None,
            radius: None,
        }
    }
}

impl DataSourceConfig {
    /// Shape pattern of a built-in loader, or `None` for any other loader name.
    pub fn shape_pattern(&self) -> MeshResult<Option<ShapePattern>> {
        let params = &self.params;
        let pattern = match self.loader.to_lowercase().as_str() {
            "uniform" => ShapePattern::Uniform {
                value: params.value.unwrap_or(1.0),
            },
            "gradient" => ShapePattern::Gradient {
                vertical: params.vertical.unwrap_or(true),
            },
            "checkerboard" => ShapePattern::Checkerboard {
                gridsize: params
                    .gridsize
                    .ok_or_else(|| MeshError::invalid_config("gridsize", "required by checkerboard"))?,
            },
            "circle" => ShapePattern::Circle {
                centre: params
                    .centre
                    .ok_or_else(|| MeshError::invalid_config("centre", "required by circle"))?,
                radius: params
                    .radius
                    .ok_or_else(|| MeshError::invalid_config("radius", "required by circle"))?,
            },
            _ => return Ok(None),
        };
        Ok(Some(pattern))
    }
}

impl MeshConfig {
    /// Parse a configuration document.
    ///
    /// Documents wrapped in a top-level `mesh_info` object, as written by
    /// older tooling, are accepted as well.
    pub fn from_value(value: &serde_json::Value) -> MeshResult<Self> {
        let inner = value.get("mesh_info").unwrap_or(value);
        Ok(serde_json::from_value(inner.clone())?)
    }

    /// Load environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("MESH_SPLIT_DEPTH") {
            if let Ok(depth) = val.parse() {
                self.splitting.split_depth = depth;
            }
        }

        if let Ok(val) = std::env::var("MESH_MIN_DATAPOINTS") {
            if let Ok(count) = val.parse() {
                self.splitting.minimum_datapoints = count;
            }
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> MeshResult<()> {
        if self.splitting.split_depth == 0 {
            return Err(MeshError::invalid_config("split_depth", "must be > 0"));
        }

        let region = &self.region;
        if !(region.cell_width > 0.0) {
            return Err(MeshError::invalid_config("cell_width", "must be > 0"));
        }
        if !(region.cell_height > 0.0) {
            return Err(MeshError::invalid_config("cell_height", "must be > 0"));
        }
        if region.lat_min >= region.lat_max {
            return Err(MeshError::invalid_config(
                "lat_min",
                format!("{} must be less than lat_max {}", region.lat_min, region.lat_max),
            ));
        }
        if region.lat_min < -90.0 || region.lat_max > 90.0 {
            return Err(MeshError::invalid_config("lat_min", "latitude must lie in [-90, 90]"));
        }
        for (param, long) in [("long_min", region.long_min), ("long_max", region.long_max)] {
            if !(-180.0..=180.0).contains(&long) {
                return Err(MeshError::invalid_config(param, "longitude must lie in [-180, 180]"));
            }
        }
        if region.long_min == region.long_max {
            return Err(MeshError::invalid_config("long_max", "region has zero width"));
        }
        if region.global && (self.region_boundary()?.width() - 360.0).abs() > 1e-9 {
            return Err(MeshError::invalid_config(
                "global",
                "a global mesh must span 360 degrees of longitude",
            ));
        }

        self.time_range()?;

        for source in &self.data_sources {
            if source.loader.trim().is_empty() {
                return Err(MeshError::invalid_config("loader", "must not be empty"));
            }
            for condition in &source.params.splitting_conditions {
                let bounds_ok = (0.0..=1.0).contains(&condition.lower_bound)
                    && (0.0..=1.0).contains(&condition.upper_bound)
                    && condition.lower_bound <= condition.upper_bound;
                if !bounds_ok {
                    return Err(MeshError::invalid_config(
                        "splitting_conditions",
                        format!(
                            "bounds [{}, {}] of source '{}' must satisfy 0 <= lower <= upper <= 1",
                            condition.lower_bound, condition.upper_bound, source.loader
                        ),
                    ));
                }
            }
            source.shape_pattern()?;
        }

        Ok(())
    }

    /// Resolved time range, if both ends are configured.
    pub fn time_range(&self) -> MeshResult<Option<TimeRange>> {
        match (&self.region.start_time, &self.region.end_time) {
            (Some(start), Some(end)) => TimeRange::parse(start, end).map(Some),
            (None, None) => Ok(None),
            _ => Err(MeshError::invalid_config(
                "start_time",
                "start_time and end_time must be given together",
            )),
        }
    }

    /// The region as a boundary (with time range).
    pub fn region_boundary(&self) -> MeshResult<Boundary> {
        let region = &self.region;
        let boundary = Boundary::new(
            [region.lat_min, region.lat_max],
            [region.long_min, region.long_max],
        )?;
        Ok(match self.time_range()? {
            Some(range) => boundary.with_time_range(range),
            None => boundary,
        })
    }
}
