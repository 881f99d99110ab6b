use chrono::{DateTime, Utc};

use crate::api::FeedError;
use crate::models::{
    Beacon, BeaconDates, BeaconIds, BeaconState, Coordinates, Direction, Heading, Locality,
    Location, Position, Road, SituationRecord,
};
use crate::utils::{format_region_name, parse_feed_timestamp};

/// Build the beacon for a record present in the current cycle's feed.
///
/// `existing` is the cached entry for the same id, if any; only its
/// `first_seen_at` carries over.
pub fn map_record(
    record: &SituationRecord,
    existing: Option<&Beacon>,
    cycle_at: DateTime<Utc>,
) -> Result<Beacon, FeedError> {
    let coordinates = resolve_coordinates(record)?;

    Ok(Beacon {
        ids: BeaconIds {
            incident_id: record.id.clone(),
            situation_id: record.situation_id.clone(),
        },
        state: BeaconState::Active,
        location: Location {
            coordinates,
            locality: Locality {
                region: format_region_name(record.region.as_deref()),
                province: record.province.clone(),
                municipality: record.municipality.clone(),
            },
            road: Road {
                name: record.road.clone(),
                kilometer: record.kilometer,
            },
        },
        position: Position {
            direction: Direction::from_code(record.direction.as_deref()),
            heading: Heading::from_code(record.heading.as_deref()),
        },
        dates: BeaconDates {
            activated_at: parse_feed_timestamp(record.started_at.as_deref()),
            first_seen_at: existing.map_or(cycle_at, |b| b.dates.first_seen_at),
            last_updated_at: cycle_at,
        },
    })
}

/// Geometry comes as `[longitude, latitude]`; the domain stores it the other way round.
fn resolve_coordinates(record: &SituationRecord) -> Result<Coordinates, FeedError> {
    let geometry = record
        .geometry
        .as_ref()
        .ok_or_else(|| FeedError::Malformed(format!("record {} has no geometry", record.id)))?;

    let point = geometry.point().map_err(|e| {
        FeedError::Malformed(format!("record {} has invalid geometry: {}", record.id, e))
    })?;

    match point.coordinates.as_slice() {
        [longitude, latitude, ..] => Ok(Coordinates {
            latitude: *latitude,
            longitude: *longitude,
        }),
        _ => Err(FeedError::Malformed(format!(
            "record {} geometry has {} coordinates, expected 2",
            record.id,
            point.coordinates.len()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    fn record(value: serde_json::Value) -> SituationRecord {
        serde_json::from_value(value).unwrap()
    }

    fn full_record() -> SituationRecord {
        record(json!({
            "id": "B1",
            "situationId": "S1",
            "fuente": "DGT3.0",
            "geometria": "{\"type\":\"Point\",\"coordinates\":[-8.4115,43.3623]}",
            "cAutonomaIni": "A Coruña, Galicia",
            "provinciaIni": "A Coruña",
            "municipioIni": "Arteixo",
            "carretera": "AC-552",
            "pkIni": 8.4,
            "sentido": "negative",
            "orientacion": "southWestBound",
            "fechaInicio": "2025-01-10T07:55:00Z"
        }))
    }

    #[test]
    fn test_map_new_record() {
        let now = Utc.with_ymd_and_hms(2025, 1, 10, 8, 0, 0).unwrap();
        let beacon = map_record(&full_record(), None, now).unwrap();

        assert_eq!(beacon.id(), "B1");
        assert_eq!(beacon.ids.situation_id.as_deref(), Some("S1"));
        assert!(beacon.is_active());
        assert_eq!(beacon.location.coordinates.latitude, 43.3623);
        assert_eq!(beacon.location.coordinates.longitude, -8.4115);
        assert_eq!(beacon.location.locality.region.as_deref(), Some("Galicia A Coruña"));
        assert_eq!(beacon.location.locality.municipality.as_deref(), Some("Arteixo"));
        assert_eq!(beacon.location.road.name.as_deref(), Some("AC-552"));
        assert_eq!(beacon.location.road.kilometer, Some(8.4));
        assert_eq!(beacon.position.direction, Some(Direction::Decreasing));
        assert_eq!(beacon.position.heading, Some(Heading::SouthWest));
        assert_eq!(
            beacon.dates.activated_at,
            Some(Utc.with_ymd_and_hms(2025, 1, 10, 7, 55, 0).unwrap())
        );
        assert_eq!(beacon.dates.first_seen_at, now);
        assert_eq!(beacon.dates.last_updated_at, now);
    }

    #[test]
    fn test_map_keeps_first_seen() {
        let first = Utc.with_ymd_and_hms(2025, 1, 10, 8, 0, 0).unwrap();
        let later = first + Duration::minutes(5);

        let mut existing = map_record(&full_record(), None, first).unwrap();
        existing.state = BeaconState::Inactive;
        let beacon = map_record(&full_record(), Some(&existing), later).unwrap();

        assert_eq!(beacon.dates.first_seen_at, first);
        assert_eq!(beacon.dates.last_updated_at, later);
        assert!(beacon.is_active());
    }

    #[test]
    fn test_unknown_codes_are_lenient() {
        let now = Utc::now();
        let r = record(json!({
            "id": "B2",
            "geometria": {"type": "Point", "coordinates": [0.5, 41.0]},
            "sentido": "both",
            "orientacion": "upBound",
            "fechaInicio": "not a date",
            "cAutonomaIni": ""
        }));
        let beacon = map_record(&r, None, now).unwrap();
        assert_eq!(beacon.position, Position::default());
        assert_eq!(beacon.dates.activated_at, None);
        assert_eq!(beacon.location.locality.region, None);
    }

    #[test]
    fn test_missing_geometry_is_malformed() {
        let r = record(json!({"id": "B3"}));
        assert!(matches!(map_record(&r, None, Utc::now()), Err(FeedError::Malformed(_))));
    }

    #[test]
    fn test_bad_geometry_is_malformed() {
        let r = record(json!({"id": "B4", "geometria": "{not json"}));
        assert!(matches!(map_record(&r, None, Utc::now()), Err(FeedError::Malformed(_))));

        let r = record(json!({"id": "B5", "geometria": {"type": "Point", "coordinates": [1.0]}}));
        assert!(matches!(map_record(&r, None, Utc::now()), Err(FeedError::Malformed(_))));
    }
}
