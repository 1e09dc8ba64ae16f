//! Synthetic sample fields.
//!
//! Each generator lays an `n x n` lattice of samples over a region (one
//! sample at the centre of each lattice cell, so none sits on a cell
//! edge) and assigns values from an analytic pattern. They are used for
//! regression meshes and tests where real data readers are not wanted.

use serde::{Deserialize, Serialize};

use mesh_common::{Boundary, MeshError, MeshResult};

use crate::data_source::{PointSource, Sample};

/// Analytic pattern of a synthetic field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum ShapePattern {
    /// Constant value everywhere.
    Uniform {
        #[serde(default = "default_uniform_value")]
        value: f64,
    },
    /// Linear ramp from 0 to 1, south to north when `vertical`, otherwise
    /// west to east.
    Gradient {
        #[serde(default = "default_true")]
        vertical: bool,
    },
    /// Alternating squares of 0 and 1, `gridsize` = `[width, height]` in degrees.
    Checkerboard { gridsize: [f64; 2] },
    /// 1 inside a disc of `radius` degrees around `centre` (`[lat, long]`), 0 outside.
    Circle { centre: [f64; 2], radius: f64 },
}

fn default_uniform_value() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}

impl ShapePattern {
    pub fn name(&self) -> &'static str {
        match self {
            ShapePattern::Uniform { .. } => "uniform",
            ShapePattern::Gradient { .. } => "gradient",
            ShapePattern::Checkerboard { .. } => "checkerboard",
            ShapePattern::Circle { .. } => "circle",
        }
    }

    fn validate(&self) -> MeshResult<()> {
        match self {
            ShapePattern::Checkerboard { gridsize } if gridsize[0] <= 0.0 || gridsize[1] <= 0.0 => {
                Err(MeshError::invalid_config(
                    "gridsize",
                    "checkerboard squares must have positive width and height",
                ))
            }
            ShapePattern::Circle { radius, .. } if *radius <= 0.0 => Err(
                MeshError::invalid_config("radius", "circle radius must be positive"),
            ),
            _ => Ok(()),
        }
    }

    /// Value of the pattern at an unwrapped longitude inside `region`.
    fn value_at(&self, region: &Boundary, lat: f64, long: f64) -> f64 {
        let (west, _) = region.unwrapped_long_range();
        match self {
            ShapePattern::Uniform { value } => *value,
            ShapePattern::Gradient { vertical: true } => {
                (lat - region.lat_min()) / region.height()
            }
            ShapePattern::Gradient { vertical: false } => (long - west) / region.width(),
            ShapePattern::Checkerboard { gridsize } => {
                let col = ((long - west) / gridsize[0]).floor() as i64;
                let row = ((lat - region.lat_min()) / gridsize[1]).floor() as i64;
                ((col + row).rem_euclid(2)) as f64
            }
            ShapePattern::Circle { centre, radius } => {
                let mut dlong = (long - centre[1]).rem_euclid(360.0);
                if dlong > 180.0 {
                    dlong -= 360.0;
                }
                let dlat = lat - centre[0];
                if (dlat * dlat + dlong * dlong).sqrt() <= *radius {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }

    /// Sample this pattern on an `n x n` lattice over `region`.
    pub fn generate(&self, region: &Boundary, n: usize, data_name: &str) -> MeshResult<PointSource> {
        self.validate()?;
        if n == 0 {
            return Err(MeshError::invalid_config("n", "lattice size must be > 0"));
        }

        let (west, _) = region.unwrapped_long_range();
        let dlat = region.height() / n as f64;
        let dlong = region.width() / n as f64;

        let mut samples = Vec::with_capacity(n * n);
        for row in 0..n {
            let lat = region.lat_min() + (row as f64 + 0.5) * dlat;
            for col in 0..n {
                let long = west + (col as f64 + 0.5) * dlong;
                let value = self.value_at(region, lat, long);
                samples.push(Sample::scalar(lat, wrap_longitude(long), value));
            }
        }

        PointSource::scalar(self.name(), data_name, samples)
    }
}

fn wrap_longitude(long: f64) -> f64 {
    if long > 180.0 {
        long - 360.0
    } else {
        long
    }
}
