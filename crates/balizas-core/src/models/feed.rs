//! Wire types for the DGT incident feed.
//!
//! The upstream is loose about types: identifiers and kilometer markers show
//! up as numbers or strings, and the geometry is usually a JSON document
//! serialized into a string field. Everything here accepts either form.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `fuente` tag carried by V16 beacon incidents; anything else is dropped.
pub const BEACON_SOURCE: &str = "DGT3.0";

/// Decoded feed body.
///
/// Entries stay untyped until they are known to be beacons: other sources
/// share the list and follow their own shapes.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedResponse {
    #[serde(rename = "situationsRecords")]
    pub situations_records: Vec<Value>,
}

impl FeedResponse {
    /// Keep the beacon entries and only then parse them into records.
    pub fn into_beacon_records(self) -> Result<Vec<SituationRecord>, serde_json::Error> {
        self.situations_records
            .into_iter()
            .filter(|entry| entry.get("fuente").and_then(Value::as_str) == Some(BEACON_SOURCE))
            .map(serde_json::from_value)
            .collect()
    }
}

/// One incident as the feed reports it.
#[derive(Debug, Clone, Deserialize)]
pub struct SituationRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(rename = "situationId", default, deserialize_with = "opt_string_or_number")]
    pub situation_id: Option<String>,
    #[serde(rename = "fuente", default)]
    pub source: Option<String>,
    #[serde(rename = "geometria", default)]
    pub geometry: Option<GeometryField>,
    #[serde(rename = "cAutonomaIni", default)]
    pub region: Option<String>,
    #[serde(rename = "provinciaIni", default)]
    pub province: Option<String>,
    #[serde(rename = "municipioIni", default)]
    pub municipality: Option<String>,
    #[serde(rename = "carretera", default)]
    pub road: Option<String>,
    #[serde(rename = "pkIni", default, deserialize_with = "opt_lenient_f64")]
    pub kilometer: Option<f64>,
    #[serde(rename = "sentido", default)]
    pub direction: Option<String>,
    #[serde(rename = "orientacion", default)]
    pub heading: Option<String>,
    #[serde(rename = "fechaInicio", default)]
    pub started_at: Option<String>,
}

impl SituationRecord {
    pub fn is_beacon(&self) -> bool {
        self.source.as_deref() == Some(BEACON_SOURCE)
    }
}

/// GeoJSON point, `[longitude, latitude]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointGeometry {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    pub coordinates: Vec<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum GeometryField {
    /// Geometry serialized into a string, as the live feed sends it
    Encoded(String),
    Inline(PointGeometry),
}

impl GeometryField {
    pub fn point(&self) -> Result<PointGeometry, serde_json::Error> {
        match self {
            GeometryField::Encoded(raw) => serde_json::from_str(raw),
            GeometryField::Inline(point) => Ok(point.clone()),
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!(
            "expected a string or number identifier, got {}",
            other
        ))),
    }
}

fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(de::Error::custom(format!(
            "expected a string or number identifier, got {}",
            other
        ))),
    }
}

/// Kilometer markers are informational; anything unreadable becomes `None`.
fn opt_lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', ".").parse().ok(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_full_record() {
        let value = json!({
            "id": 1234567,
            "situationId": "SIT-9",
            "fuente": "DGT3.0",
            "geometria": "{\"type\":\"Point\",\"coordinates\":[-3.7038,40.4168]}",
            "cAutonomaIni": "Madrid, Comunidad de",
            "provinciaIni": "Madrid",
            "municipioIni": "Madrid",
            "carretera": "M-30",
            "pkIni": "12,5",
            "sentido": "positive",
            "orientacion": "northBound",
            "fechaInicio": "2025-01-10T08:00:00Z",
            "causa": "Otras incidencias"
        });
        let record: SituationRecord = serde_json::from_value(value).unwrap();

        assert_eq!(record.id, "1234567");
        assert_eq!(record.situation_id.as_deref(), Some("SIT-9"));
        assert!(record.is_beacon());
        assert_eq!(record.kilometer, Some(12.5));
        let point = record.geometry.unwrap().point().unwrap();
        assert_eq!(point.coordinates, vec![-3.7038, 40.4168]);
        assert_eq!(point.kind.as_deref(), Some("Point"));
    }

    #[test]
    fn test_parse_minimal_record() {
        let record: SituationRecord = serde_json::from_value(json!({"id": "abc"})).unwrap();
        assert_eq!(record.id, "abc");
        assert!(record.situation_id.is_none());
        assert!(record.geometry.is_none());
        assert!(!record.is_beacon());
    }

    #[test]
    fn test_inline_geometry() {
        let record: SituationRecord = serde_json::from_value(json!({
            "id": "x",
            "geometria": {"type": "Point", "coordinates": [1.0, 2.0]},
            "pkIni": 7,
            "situationId": null
        }))
        .unwrap();
        assert_eq!(record.geometry.unwrap().point().unwrap().coordinates, vec![1.0, 2.0]);
        assert_eq!(record.kilometer, Some(7.0));
        assert!(record.situation_id.is_none());
    }

    #[test]
    fn test_unreadable_kilometer_is_none() {
        let record: SituationRecord =
            serde_json::from_value(json!({"id": "x", "pkIni": "n/a"})).unwrap();
        assert_eq!(record.kilometer, None);
    }

    #[test]
    fn test_numeric_ids_become_strings() {
        let record: SituationRecord =
            serde_json::from_value(json!({"id": 42, "situationId": 123, "pkIni": 3.25})).unwrap();
        assert_eq!(record.id, "42");
        assert_eq!(record.situation_id.as_deref(), Some("123"));
        assert_eq!(record.kilometer, Some(3.25));
    }

    #[test]
    fn test_object_id_rejected() {
        let result = serde_json::from_value::<SituationRecord>(json!({"id": {"nested": 1}}));
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_records_list() {
        assert!(serde_json::from_str::<FeedResponse>(r#"{"other": []}"#).is_err());
        let empty: FeedResponse = serde_json::from_str(r#"{"situationsRecords": []}"#).unwrap();
        assert!(empty.situations_records.is_empty());
    }
}
