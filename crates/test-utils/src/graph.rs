//! Structural checks on serialized neighbour graphs.
//!
//! Works on the persisted JSON form (`{ id: { code: [ids] } }`) so that
//! any crate can check a graph without sharing types with this one.

use serde_json::Value;

fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn neighbours(graph: &Value, id: &str, code: i64) -> Vec<String> {
    graph
        .get(id)
        .and_then(|node| node.get(code.to_string()))
        .and_then(Value::as_array)
        .map(|list| list.iter().filter_map(id_text).collect())
        .unwrap_or_default()
}

/// Every edge `a -[d]-> b` without the reverse edge `b -[-d]-> a`,
/// formatted for assertion messages.
pub fn asymmetric_edges(graph: &Value) -> Vec<String> {
    let mut violations = Vec::new();
    let Some(nodes) = graph.as_object() else {
        return vec!["graph is not a JSON object".to_string()];
    };

    for (id, slots) in nodes {
        let Some(slots) = slots.as_object() else {
            violations.push(format!("node {} is not a JSON object", id));
            continue;
        };
        for (code, list) in slots {
            let Ok(code) = code.parse::<i64>() else {
                violations.push(format!("node {} has bad direction key {}", id, code));
                continue;
            };
            for neighbour in list.as_array().into_iter().flatten().filter_map(id_text) {
                if !neighbours(graph, &neighbour, -code).contains(id) {
                    violations.push(format!("{} -[{}]-> {}", id, code, neighbour));
                }
            }
        }
    }
    violations
}

/// Number of non-empty direction slots of `id`.
pub fn populated_directions(graph: &Value, id: &str) -> usize {
    graph
        .get(id)
        .and_then(Value::as_object)
        .map(|slots| {
            slots
                .values()
                .filter(|list| list.as_array().map(|l| !l.is_empty()).unwrap_or(false))
                .count()
        })
        .unwrap_or(0)
}
