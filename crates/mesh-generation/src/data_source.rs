//! The data-source contract consumed by the mesh builder.
//!
//! A source answers one question: which samples fall inside a boundary?
//! Readers for real gridded products live outside this crate; they hand
//! their data over as a [`PointSource`], the common in-memory form.

use std::fmt;

use mesh_common::{Boundary, MeshError, MeshResult};

/// One observation: a location and one value per data name.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub lat: f64,
    pub long: f64,
    pub values: Vec<f64>,
}

impl Sample {
    pub fn new(lat: f64, long: f64, values: Vec<f64>) -> Self {
        Self { lat, long, values }
    }

    pub fn scalar(lat: f64, long: f64, value: f64) -> Self {
        Self::new(lat, long, vec![value])
    }
}

/// Samples of one source restricted to a boundary, stored column-wise.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleSet {
    columns: Vec<Vec<f64>>,
}

impl SampleSet {
    /// An empty set with `width` value columns.
    pub fn with_width(width: usize) -> Self {
        Self {
            columns: vec![Vec::new(); width],
        }
    }

    pub fn push(&mut self, values: &[f64]) {
        for (column, value) in self.columns.iter_mut().zip(values) {
            column.push(*value);
        }
    }

    pub fn len(&self) -> usize {
        self.columns.first().map(Vec::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, index: usize) -> &[f64] {
        self.columns.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Per-sample Euclidean magnitude across all columns.
    ///
    /// A sample with any NaN component has a NaN magnitude.
    pub fn magnitudes(&self) -> Vec<f64> {
        (0..self.len())
            .map(|i| {
                self.columns
                    .iter()
                    .map(|c| c[i] * c[i])
                    .sum::<f64>()
                    .sqrt()
            })
            .collect()
    }

    /// Values that split conditions are evaluated on: the single column of
    /// a scalar source, or the magnitudes of a vector source.
    pub fn condition_values(&self) -> Vec<f64> {
        if self.width() == 1 {
            self.columns[0].clone()
        } else {
            self.magnitudes()
        }
    }

    /// Number of samples whose condition value is not NaN.
    pub fn valid_count(&self) -> usize {
        self.condition_values().iter().filter(|v| !v.is_nan()).count()
    }
}

/// A provider of environmental samples.
///
/// Implementations must be deterministic and free of side effects: the
/// builder queries them from several threads at once.
pub trait DataSource: Send + Sync + fmt::Debug {
    /// Identifier used in logs and in the factory.
    fn name(&self) -> &str;

    /// Names of the value columns. Two or more names make a vector source.
    fn data_names(&self) -> &[String];

    /// All samples that fall inside `bounds`.
    fn samples(&self, bounds: &Boundary) -> SampleSet;

    /// Value used by the `default` fill policy.
    fn default_value(&self) -> Option<f64> {
        None
    }

    fn is_vector(&self) -> bool {
        self.data_names().len() > 1
    }
}

/// Samples held in memory.
#[derive(Debug, Clone)]
pub struct PointSource {
    name: String,
    data_names: Vec<String>,
    samples: Vec<Sample>,
    default_value: Option<f64>,
}

impl PointSource {
    /// Create a source; every sample must carry one value per data name.
    pub fn new(
        name: impl Into<String>,
        data_names: Vec<String>,
        samples: Vec<Sample>,
    ) -> MeshResult<Self> {
        let name = name.into();
        if data_names.is_empty() {
            return Err(MeshError::invalid_config(
                "data_name",
                format!("source '{}' declares no data names", name),
            ));
        }
        if let Some(bad) = samples.iter().find(|s| s.values.len() != data_names.len()) {
            return Err(MeshError::invalid_config(
                "data_name",
                format!(
                    "source '{}' has {} data names but a sample at ({}, {}) carries {} values",
                    name,
                    data_names.len(),
                    bad.lat,
                    bad.long,
                    bad.values.len()
                ),
            ));
        }
        Ok(Self {
            name,
            data_names,
            samples,
            default_value: None,
        })
    }

    /// Single-column source.
    pub fn scalar(
        name: impl Into<String>,
        data_name: impl Into<String>,
        samples: Vec<Sample>,
    ) -> MeshResult<Self> {
        Self::new(name, vec![data_name.into()], samples)
    }

    pub fn with_default_value(mut self, value: f64) -> Self {
        self.default_value = Some(value);
        self
    }

    /// Keep only the samples inside `bounds`.
    pub fn restrict_to(&self, bounds: &Boundary) -> PointSource {
        PointSource {
            name: self.name.clone(),
            data_names: self.data_names.clone(),
            samples: self
                .samples
                .iter()
                .filter(|s| bounds.contains_point(s.lat, s.long))
                .cloned()
                .collect(),
            default_value: self.default_value,
        }
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    pub fn all_samples(&self) -> &[Sample] {
        &self.samples
    }
}

impl DataSource for PointSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn data_names(&self) -> &[String] {
        &self.data_names
    }

    fn samples(&self, bounds: &Boundary) -> SampleSet {
        let mut set = SampleSet::with_width(self.data_names.len());
        for sample in &self.samples {
            if bounds.contains_point(sample.lat, sample.long) {
                set.push(&sample.values);
            }
        }
        set
    }

    fn default_value(&self) -> Option<f64> {
        self.default_value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(lat: [f64; 2], long: [f64; 2]) -> Boundary {
        Boundary::new(lat, long).unwrap()
    }

    #[test]
    fn test_samples_restricted_to_boundary() {
        let source = PointSource::scalar(
            "sic",
            "SIC",
            vec![
                Sample::scalar(1.0, 1.0, 10.0),
                Sample::scalar(5.0, 5.0, 20.0),
                Sample::scalar(0.0, 5.0, 30.0), // on the southern edge
            ],
        )
        .unwrap();

        let set = source.samples(&bounds([0.0, 5.0], [0.0, 5.0]));
        assert_eq!(set.column(0), &[10.0, 20.0]);
        assert_eq!(source.restrict_to(&bounds([0.0, 2.0], [0.0, 2.0])).sample_count(), 1);
    }

    #[test]
    fn test_mismatched_sample_width_rejected() {
        let result = PointSource::new(
            "current",
            vec!["uC".into(), "vC".into()],
            vec![Sample::scalar(0.0, 0.0, 1.0)],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_vector_magnitudes() {
        let source = PointSource::new(
            "current",
            vec!["uC".into(), "vC".into()],
            vec![
                Sample::new(1.0, 1.0, vec![3.0, 4.0]),
                Sample::new(2.0, 2.0, vec![f64::NAN, 1.0]),
            ],
        )
        .unwrap();
        assert!(source.is_vector());

        let set = source.samples(&bounds([0.0, 5.0], [0.0, 5.0]));
        let magnitudes = set.condition_values();
        assert_eq!(magnitudes[0], 5.0);
        assert!(magnitudes[1].is_nan());
        assert_eq!(set.valid_count(), 1);
    }

    #[test]
    fn test_empty_set() {
        let set = SampleSet::with_width(2);
        assert!(set.is_empty());
        assert!(set.magnitudes().is_empty());
    }
}
