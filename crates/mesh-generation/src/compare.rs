//! Regression comparison of two meshes.
//!
//! Checks, in order: cellbox count, cellbox ids, the attribute set of each
//! cellbox, each cellbox value (floats rounded to five decimal places,
//! also inside lists), neighbour graph node count, node ids and the
//! neighbours in every direction. Neighbour order within a direction slot
//! is not significant.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde_json::{Map, Value};

use mesh_common::MeshResult;

use crate::direction::Direction;
use crate::mesh::EnvironmentMesh;
use crate::neighbour_graph::CellId;

/// Decimal places kept when comparing floats.
pub const COMPARISON_PRECISION: i32 = 5;

/// One way in which two meshes differ.
#[derive(Debug, Clone, PartialEq)]
pub enum Difference {
    CellboxCount {
        expected: usize,
        actual: usize,
    },
    CellboxIds {
        missing: Vec<CellId>,
        unexpected: Vec<CellId>,
    },
    CellboxAttributes {
        id: CellId,
        missing: Vec<String>,
        unexpected: Vec<String>,
    },
    CellboxValue {
        id: CellId,
        attribute: String,
        expected: Value,
        actual: Value,
    },
    GraphCount {
        expected: usize,
        actual: usize,
    },
    GraphIds {
        missing: Vec<CellId>,
        unexpected: Vec<CellId>,
    },
    GraphNeighbours {
        id: CellId,
        direction: Direction,
        expected: Vec<CellId>,
        actual: Vec<CellId>,
    },
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difference::CellboxCount { expected, actual } => {
                write!(f, "cellbox count: expected {}, got {}", expected, actual)
            }
            Difference::CellboxIds {
                missing,
                unexpected,
            } => write!(
                f,
                "cellbox ids: missing {:?}, unexpected {:?}",
                ids(missing),
                ids(unexpected)
            ),
            Difference::CellboxAttributes {
                id,
                missing,
                unexpected,
            } => write!(
                f,
                "cellbox {} attributes: missing {:?}, unexpected {:?}",
                id, missing, unexpected
            ),
            Difference::CellboxValue {
                id,
                attribute,
                expected,
                actual,
            } => write!(
                f,
                "cellbox {} '{}': expected {}, got {}",
                id, attribute, expected, actual
            ),
            Difference::GraphCount { expected, actual } => {
                write!(f, "neighbour graph nodes: expected {}, got {}", expected, actual)
            }
            Difference::GraphIds {
                missing,
                unexpected,
            } => write!(
                f,
                "neighbour graph ids: missing {:?}, unexpected {:?}",
                ids(missing),
                ids(unexpected)
            ),
            Difference::GraphNeighbours {
                id,
                direction,
                expected,
                actual,
            } => write!(
                f,
                "node {} direction {}: expected {:?}, got {:?}",
                id,
                direction,
                ids(expected),
                ids(actual)
            ),
        }
    }
}

fn ids(list: &[CellId]) -> Vec<u64> {
    list.iter().map(|id| id.value()).collect()
}

/// Result of [`compare_meshes`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComparisonReport {
    pub differences: Vec<Difference>,
}

impl ComparisonReport {
    pub fn is_match(&self) -> bool {
        self.differences.is_empty()
    }
}

impl fmt::Display for ComparisonReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_match() {
            return write!(f, "meshes match");
        }
        writeln!(f, "{} difference(s):", self.differences.len())?;
        for difference in &self.differences {
            writeln!(f, "  - {}", difference)?;
        }
        Ok(())
    }
}

/// Round every number in `value` to [`COMPARISON_PRECISION`] decimal places.
///
/// Integers become floats so that `3` and `3.0` compare equal.
pub fn round_value(value: &Value) -> Value {
    match value {
        Value::Number(n) => match n.as_f64() {
            Some(v) => {
                let scale = 10f64.powi(COMPARISON_PRECISION);
                Value::from((v * scale).round() / scale)
            }
            None => value.clone(),
        },
        Value::Array(items) => Value::Array(items.iter().map(round_value).collect()),
        other => other.clone(),
    }
}

fn set_difference<T: Ord + Clone>(a: &BTreeSet<T>, b: &BTreeSet<T>) -> Vec<T> {
    a.difference(b).cloned().collect()
}

fn cellbox_documents(mesh: &EnvironmentMesh) -> MeshResult<BTreeMap<CellId, Map<String, Value>>> {
    let mut documents = BTreeMap::new();
    for cellbox in mesh.cellboxes() {
        if let Value::Object(object) = cellbox.to_json()? {
            documents.insert(cellbox.id(), object);
        }
    }
    Ok(documents)
}

/// Compare a freshly built mesh (`actual`) against a reference (`expected`).
pub fn compare_meshes(
    expected: &EnvironmentMesh,
    actual: &EnvironmentMesh,
) -> MeshResult<ComparisonReport> {
    let mut report = ComparisonReport::default();

    // ========================================================================
    // Cellboxes
    // ========================================================================
    if expected.cellboxes().len() != actual.cellboxes().len() {
        report.differences.push(Difference::CellboxCount {
            expected: expected.cellboxes().len(),
            actual: actual.cellboxes().len(),
        });
    }

    let expected_docs = cellbox_documents(expected)?;
    let actual_docs = cellbox_documents(actual)?;
    let expected_ids: BTreeSet<CellId> = expected_docs.keys().copied().collect();
    let actual_ids: BTreeSet<CellId> = actual_docs.keys().copied().collect();

    if expected_ids != actual_ids {
        report.differences.push(Difference::CellboxIds {
            missing: set_difference(&expected_ids, &actual_ids),
            unexpected: set_difference(&actual_ids, &expected_ids),
        });
    }

    for id in expected_ids.intersection(&actual_ids) {
        let (exp, act) = (&expected_docs[id], &actual_docs[id]);

        let exp_keys: BTreeSet<String> = exp.keys().cloned().collect();
        let act_keys: BTreeSet<String> = act.keys().cloned().collect();
        if exp_keys != act_keys {
            report.differences.push(Difference::CellboxAttributes {
                id: *id,
                missing: set_difference(&exp_keys, &act_keys),
                unexpected: set_difference(&act_keys, &exp_keys),
            });
        }

        for key in exp_keys.intersection(&act_keys) {
            let (e, a) = (round_value(&exp[key]), round_value(&act[key]));
            if e != a {
                report.differences.push(Difference::CellboxValue {
                    id: *id,
                    attribute: key.clone(),
                    expected: e,
                    actual: a,
                });
            }
        }
    }

    // ========================================================================
    // Neighbour graph
    // ========================================================================
    let expected_graph = expected.neighbour_graph().get_graph();
    let actual_graph = actual.neighbour_graph().get_graph();

    if expected_graph.len() != actual_graph.len() {
        report.differences.push(Difference::GraphCount {
            expected: expected_graph.len(),
            actual: actual_graph.len(),
        });
    }

    let expected_nodes: BTreeSet<CellId> = expected_graph.keys().copied().collect();
    let actual_nodes: BTreeSet<CellId> = actual_graph.keys().copied().collect();
    if expected_nodes != actual_nodes {
        report.differences.push(Difference::GraphIds {
            missing: set_difference(&expected_nodes, &actual_nodes),
            unexpected: set_difference(&actual_nodes, &expected_nodes),
        });
    }

    for id in expected_nodes.intersection(&actual_nodes) {
        let (exp, act) = (&expected_graph[id], &actual_graph[id]);
        for direction in Direction::ALL {
            let mut e = exp.get(direction).to_vec();
            let mut a = act.get(direction).to_vec();
            e.sort();
            a.sort();
            if e != a {
                report.differences.push(Difference::GraphNeighbours {
                    id: *id,
                    direction,
                    expected: e,
                    actual: a,
                });
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_round_value() {
        assert_eq!(round_value(&json!(0.123456789)), json!(0.12346));
        assert_eq!(round_value(&json!([1.000001, null, 3])), json!([1.0, null, 3.0]));
        assert_eq!(round_value(&json!("POLYGON")), json!("POLYGON"));
    }

    #[test]
    fn test_report_display() {
        let report = ComparisonReport {
            differences: vec![Difference::CellboxCount {
                expected: 4,
                actual: 7,
            }],
        };
        assert!(!report.is_match());
        assert!(report.to_string().contains("cellbox count: expected 4, got 7"));
        assert_eq!(ComparisonReport::default().to_string(), "meshes match");
    }
}
