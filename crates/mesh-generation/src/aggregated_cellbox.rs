//! Finished cells and their persisted JSON form.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, SeqAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use mesh_common::{Boundary, MeshError, MeshResult};

use crate::neighbour_graph::CellId;

/// Keys written by [`AggregatedCellBox::to_json`] that are not attributes.
const RESERVED_KEYS: [&str; 6] = ["geometry", "cx", "cy", "dcx", "dcy", "id"];

/// One aggregated attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum AggregatedValue {
    Scalar(f64),
    /// Small ordered sequence; NaN entries persist as `null`.
    Sequence(Vec<f64>),
    Flag(bool),
    Text(String),
    /// No data and no fill value.
    Missing,
}

impl AggregatedValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AggregatedValue::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, AggregatedValue::Missing)
    }
}

impl From<f64> for AggregatedValue {
    fn from(v: f64) -> Self {
        AggregatedValue::Scalar(v)
    }
}

impl Serialize for AggregatedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AggregatedValue::Scalar(v) if v.is_finite() => serializer.serialize_f64(*v),
            AggregatedValue::Scalar(_) | AggregatedValue::Missing => serializer.serialize_unit(),
            AggregatedValue::Flag(b) => serializer.serialize_bool(*b),
            AggregatedValue::Text(s) => serializer.serialize_str(s),
            AggregatedValue::Sequence(values) => {
                let mut seq = serializer.serialize_seq(Some(values.len()))?;
                for v in values {
                    if v.is_finite() {
                        seq.serialize_element(v)?;
                    } else {
                        seq.serialize_element(&())?;
                    }
                }
                seq.end()
            }
        }
    }
}

struct AggregatedValueVisitor;

impl<'de> Visitor<'de> for AggregatedValueVisitor {
    type Value = AggregatedValue;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a number, boolean, string, null or list of numbers")
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(AggregatedValue::Scalar(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(AggregatedValue::Scalar(v as f64))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(AggregatedValue::Scalar(v as f64))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(AggregatedValue::Flag(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(AggregatedValue::Text(v.to_string()))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(AggregatedValue::Missing)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(AggregatedValue::Missing)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut values = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(v) = seq.next_element::<Option<f64>>()? {
            values.push(v.unwrap_or(f64::NAN));
        }
        Ok(AggregatedValue::Sequence(values))
    }
}

impl<'de> Deserialize<'de> for AggregatedValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(AggregatedValueVisitor)
    }
}

/// A cell that stopped splitting, with its aggregated data.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedCellBox {
    id: CellId,
    boundary: Boundary,
    agg_data: BTreeMap<String, AggregatedValue>,
}

impl AggregatedCellBox {
    pub fn new(id: CellId, boundary: Boundary, agg_data: BTreeMap<String, AggregatedValue>) -> Self {
        Self {
            id,
            boundary,
            agg_data,
        }
    }

    pub fn id(&self) -> CellId {
        self.id
    }

    pub fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    pub fn agg_data(&self) -> &BTreeMap<String, AggregatedValue> {
        &self.agg_data
    }

    pub fn get(&self, name: &str) -> Option<&AggregatedValue> {
        self.agg_data.get(name)
    }

    pub(crate) fn set_id(&mut self, id: CellId) {
        self.id = id;
    }

    pub fn contains_point(&self, lat: f64, long: f64) -> bool {
        self.boundary.contains_point(lat, long)
    }

    /// JSON object: geometry, centre, half extents, every attribute, then id.
    pub fn to_json(&self) -> MeshResult<Value> {
        let mut object = Map::new();
        object.insert("geometry".into(), Value::String(self.boundary.to_poly_string()));
        object.insert("cx".into(), Value::from(self.boundary.cx()));
        object.insert("cy".into(), Value::from(self.boundary.cy()));
        object.insert("dcx".into(), Value::from(self.boundary.dcx()));
        object.insert("dcy".into(), Value::from(self.boundary.dcy()));
        for (name, value) in &self.agg_data {
            object.insert(name.clone(), serde_json::to_value(value)?);
        }
        object.insert("id".into(), Value::String(self.id.to_string()));
        Ok(Value::Object(object))
    }

    /// Load from the persisted form.
    ///
    /// `geometry` and `id` are required; the derived centre and extent
    /// keys are ignored and every other key becomes an attribute.
    pub fn from_json(value: &Value) -> MeshResult<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| MeshError::invalid_field("cellbox", "expected a JSON object"))?;

        let geometry = object
            .get("geometry")
            .ok_or_else(|| MeshError::missing_field("geometry"))?
            .as_str()
            .ok_or_else(|| MeshError::invalid_field("geometry", "expected WKT text"))?;
        let boundary = Boundary::from_wkt(geometry)?;

        let id = object.get("id").ok_or_else(|| MeshError::missing_field("id"))?;
        let id: CellId = serde_json::from_value(id.clone())
            .map_err(|e| MeshError::invalid_field("id", e.to_string()))?;

        let mut agg_data = BTreeMap::new();
        for (key, value) in object {
            if RESERVED_KEYS.contains(&key.as_str()) {
                continue;
            }
            let value: AggregatedValue = serde_json::from_value(value.clone())
                .map_err(|e| MeshError::invalid_field(key.clone(), e.to_string()))?;
            agg_data.insert(key.clone(), value);
        }

        Ok(Self::new(id, boundary, agg_data))
    }
}

impl Serialize for AggregatedCellBox {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let json = self.to_json().map_err(serde::ser::Error::custom)?;
        match json {
            Value::Object(object) => {
                let mut map = serializer.serialize_map(Some(object.len()))?;
                for (k, v) in &object {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            other => other.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for AggregatedCellBox {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        AggregatedCellBox::from_json(&value).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cellbox() -> AggregatedCellBox {
        let mut agg = BTreeMap::new();
        agg.insert("SIC".to_string(), AggregatedValue::Scalar(42.0));
        agg.insert("land".to_string(), AggregatedValue::Flag(false));
        agg.insert("current".to_string(), AggregatedValue::Sequence(vec![0.5, f64::NAN]));
        agg.insert("elevation".to_string(), AggregatedValue::Missing);
        AggregatedCellBox::new(
            CellId(3),
            Boundary::new([-62.5, -60.0], [-65.0, -60.0]).unwrap(),
            agg,
        )
    }

    #[test]
    fn test_to_json_layout() {
        let json = cellbox().to_json().unwrap();
        assert_eq!(
            json["geometry"],
            "POLYGON ((-65 -62.5, -60 -62.5, -60 -60, -65 -60, -65 -62.5))"
        );
        assert_eq!(json["cx"], -62.5);
        assert_eq!(json["cy"], -61.25);
        assert_eq!(json["dcx"], 2.5);
        assert_eq!(json["dcy"], 1.25);
        assert_eq!(json["id"], "3");
        assert_eq!(json["SIC"], 42.0);
        assert_eq!(json["land"], false);
        assert_eq!(json["current"], json!([0.5, null]));
        assert!(json["elevation"].is_null());
    }

    #[test]
    fn test_from_json_ignores_derived_keys() {
        let loaded = AggregatedCellBox::from_json(&json!({
            "geometry": "POLYGON ((0 0, 1 0, 1 1, 0 1, 0 0))",
            "cx": 99.0,
            "id": 7,
            "speed": 3
        }))
        .unwrap();
        assert_eq!(loaded.id(), CellId(7));
        assert_eq!(loaded.boundary().long_range(), [0.0, 1.0]);
        assert_eq!(loaded.agg_data().len(), 1);
        assert_eq!(loaded.get("speed"), Some(&AggregatedValue::Scalar(3.0)));
    }

    #[test]
    fn test_from_json_missing_fields() {
        let err = AggregatedCellBox::from_json(&json!({ "id": "1" })).unwrap_err();
        assert!(matches!(err, MeshError::MissingField { ref field } if field == "geometry"));

        let err = AggregatedCellBox::from_json(&json!({
            "geometry": "POLYGON ((0 0, 1 0, 1 1, 0 1, 0 0))"
        }))
        .unwrap_err();
        assert!(matches!(err, MeshError::MissingField { ref field } if field == "id"));
    }

    #[test]
    fn test_serde_matches_to_json() {
        let original = cellbox();
        let text = serde_json::to_string(&original).unwrap();
        let loaded: AggregatedCellBox = serde_json::from_str(&text).unwrap();
        assert_eq!(loaded.id(), original.id());
        assert_eq!(loaded.boundary(), original.boundary());
        assert_eq!(loaded.get("SIC"), original.get("SIC"));
        assert!(loaded.get("elevation").unwrap().is_missing());
    }

    #[test]
    fn test_contains_point_uses_boundary_rule() {
        let cb = cellbox();
        assert!(cb.contains_point(-60.0, -60.0));
        assert!(!cb.contains_point(-62.5, -63.0));
    }
}
