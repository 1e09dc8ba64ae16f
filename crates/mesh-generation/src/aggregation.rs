//! Aggregation of the samples that fall inside a cell.
//!
//! Every function here ignores NaN samples and returns `None` when no valid
//! sample remains, which the caller resolves through the fill policy.

use serde::{Deserialize, Serialize};

/// Method used to reduce a cell's samples to a single value.
///
/// The choice should be matched to the variable:
/// - **Mean**: continuous fields (temperature, current speed)
/// - **Max**/**Min**: thresholded fields (ice concentration peaks, depth)
/// - **Median**: noisy point observations
/// - **Std**: spread of the field inside the cell
/// - **Count**: number of valid samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AggregationMethod {
    #[default]
    #[serde(alias = "MEAN")]
    Mean,
    #[serde(alias = "MAX")]
    Max,
    #[serde(alias = "MIN")]
    Min,
    #[serde(alias = "MEDIAN")]
    Median,
    #[serde(alias = "STD")]
    Std,
    #[serde(alias = "COUNT")]
    Count,
}

impl AggregationMethod {
    /// Parse from string (case-insensitive), falling back to `Mean`.
    pub fn from_str_lossy(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "max" => Self::Max,
            "min" => Self::Min,
            "median" => Self::Median,
            "std" => Self::Std,
            "count" => Self::Count,
            _ => Self::Mean,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Max => "max",
            Self::Min => "min",
            Self::Median => "median",
            Self::Std => "std",
            Self::Count => "count",
        }
    }
}

impl std::fmt::Display for AggregationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reduce `values` with `method`.
///
/// Returns `None` when no valid value is left, except for `Count`, which
/// reports 0.
pub fn aggregate(values: &[f64], method: AggregationMethod) -> Option<f64> {
    let valid: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if valid.is_empty() {
        return match method {
            AggregationMethod::Count => Some(0.0),
            _ => None,
        };
    }

    let result = match method {
        AggregationMethod::Mean => mean(&valid),
        AggregationMethod::Max => valid.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        AggregationMethod::Min => valid.iter().copied().fold(f64::INFINITY, f64::min),
        AggregationMethod::Median => median(valid),
        AggregationMethod::Std => std_dev(&valid),
        AggregationMethod::Count => valid.len() as f64,
    };
    Some(result)
}

#[inline]
fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn median(mut values: Vec<f64>) -> f64 {
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

/// Population standard deviation.
fn std_dev(values: &[f64]) -> f64 {
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Fraction of valid values strictly greater than `threshold`.
///
/// Returns `None` when there are no valid values.
pub fn fraction_above(values: &[f64], threshold: f64) -> Option<f64> {
    let mut count = 0usize;
    let mut above = 0usize;
    for &v in values {
        if v.is_nan() {
            continue;
        }
        count += 1;
        if v > threshold {
            above += 1;
        }
    }
    if count == 0 {
        None
    } else {
        Some(above as f64 / count as f64)
    }
}
