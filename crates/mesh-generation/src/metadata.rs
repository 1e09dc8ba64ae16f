//! Binding of a data source to a cell: split conditions, aggregation and
//! the fill policy used when the source has nothing inside the cell.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::aggregation::{fraction_above, AggregationMethod};
use crate::data_source::{DataSource, SampleSet};

/// Value assigned to a cell when its source has no valid samples inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FillPolicy {
    /// Inherit the parent cell's aggregated value.
    #[default]
    Parent,
    /// Use zero.
    Zero,
    /// Use the source's default value, or leave the value missing.
    #[serde(alias = "nan")]
    Default,
}

/// Rule deciding whether a cell's data is heterogeneous enough to split.
///
/// The fraction of samples strictly above `threshold` is compared against
/// the bounds: at or above `upper_bound` the cell is homogeneous, at or
/// below `lower_bound` it is clear, anything in between is heterogeneous.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitCondition {
    pub threshold: f64,
    pub upper_bound: f64,
    pub lower_bound: f64,
}

/// Outcome of evaluating one split condition on one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomogeneityCondition {
    Heterogeneous,
    Homogeneous,
    Clear,
    MinimumDatapoints,
}

impl HomogeneityCondition {
    pub fn requires_split(self) -> bool {
        self == HomogeneityCondition::Heterogeneous
    }
}

impl SplitCondition {
    /// Classify `values` (NaN entries ignored).
    pub fn evaluate(&self, values: &[f64], minimum_datapoints: usize) -> HomogeneityCondition {
        let valid = values.iter().filter(|v| !v.is_nan()).count();
        if valid < minimum_datapoints.max(1) {
            return HomogeneityCondition::MinimumDatapoints;
        }
        match fraction_above(values, self.threshold) {
            None => HomogeneityCondition::MinimumDatapoints,
            Some(fraction) if fraction >= self.upper_bound => HomogeneityCondition::Homogeneous,
            Some(fraction) if fraction <= self.lower_bound => HomogeneityCondition::Clear,
            Some(_) => HomogeneityCondition::Heterogeneous,
        }
    }
}

/// A data source together with how cells should treat it.
#[derive(Clone)]
pub struct Metadata {
    source: Arc<dyn DataSource>,
    splitting_conditions: Vec<SplitCondition>,
    aggregation: AggregationMethod,
    fill_policy: FillPolicy,
}

impl Metadata {
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        Self {
            source,
            splitting_conditions: Vec::new(),
            aggregation: AggregationMethod::default(),
            fill_policy: FillPolicy::default(),
        }
    }

    pub fn with_splitting_conditions(mut self, conditions: Vec<SplitCondition>) -> Self {
        self.splitting_conditions = conditions;
        self
    }

    pub fn with_aggregation(mut self, aggregation: AggregationMethod) -> Self {
        self.aggregation = aggregation;
        self
    }

    pub fn with_fill_policy(mut self, fill_policy: FillPolicy) -> Self {
        self.fill_policy = fill_policy;
        self
    }

    pub fn source(&self) -> &dyn DataSource {
        self.source.as_ref()
    }

    pub fn splitting_conditions(&self) -> &[SplitCondition] {
        &self.splitting_conditions
    }

    pub fn aggregation(&self) -> AggregationMethod {
        self.aggregation
    }

    pub fn fill_policy(&self) -> FillPolicy {
        self.fill_policy
    }

    /// Evaluate every split condition of this binding on `samples`.
    pub fn homogeneity(
        &self,
        samples: &SampleSet,
        minimum_datapoints: usize,
    ) -> Vec<HomogeneityCondition> {
        if self.splitting_conditions.is_empty() {
            return Vec::new();
        }
        let values = samples.condition_values();
        self.splitting_conditions
            .iter()
            .map(|c| c.evaluate(&values, minimum_datapoints))
            .collect()
    }
}

impl fmt::Debug for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Metadata")
            .field("source", &self.source.name())
            .field("splitting_conditions", &self.splitting_conditions)
            .field("aggregation", &self.aggregation)
            .field("fill_policy", &self.fill_policy)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONDITION: SplitCondition = SplitCondition {
        threshold: 0.5,
        upper_bound: 0.85,
        lower_bound: 0.15,
    };

    #[test]
    fn test_homogeneity_classification() {
        assert_eq!(
            CONDITION.evaluate(&[1.0; 10], 5),
            HomogeneityCondition::Homogeneous
        );
        assert_eq!(CONDITION.evaluate(&[0.0; 10], 5), HomogeneityCondition::Clear);

        let mixed = [0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 1.0];
        assert_eq!(
            CONDITION.evaluate(&mixed, 5),
            HomogeneityCondition::Heterogeneous
        );
        assert!(CONDITION.evaluate(&mixed, 5).requires_split());
    }

    #[test]
    fn test_too_few_datapoints() {
        assert_eq!(
            CONDITION.evaluate(&[0.0, 1.0, 1.0, 0.0], 5),
            HomogeneityCondition::MinimumDatapoints
        );
        assert_eq!(
            CONDITION.evaluate(&[f64::NAN; 10], 5),
            HomogeneityCondition::MinimumDatapoints
        );
        assert_eq!(CONDITION.evaluate(&[], 0), HomogeneityCondition::MinimumDatapoints);
    }

    #[test]
    fn test_fill_policy_names() {
        let p: FillPolicy = serde_json::from_str("\"nan\"").unwrap();
        assert_eq!(p, FillPolicy::Default);
        let p: FillPolicy = serde_json::from_str("\"parent\"").unwrap();
        assert_eq!(p, FillPolicy::Parent);
        assert_eq!(serde_json::to_string(&FillPolicy::Zero).unwrap(), "\"zero\"");
    }
}
