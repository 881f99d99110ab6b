//! Domain models for beacons and the cache snapshot.
//!
//! Field names on the wire are the Spanish ones the map front-end already
//! consumes; the Rust side uses English names and `serde(rename)`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BeaconState {
    #[serde(rename = "activa")]
    Active,
    #[serde(rename = "inactiva")]
    Inactive,
}

impl std::fmt::Display for BeaconState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BeaconState::Active => write!(f, "activa"),
            BeaconState::Inactive => write!(f, "inactiva"),
        }
    }
}

/// Direction of travel relative to the road's kilometer markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "creciente")]
    Increasing,
    #[serde(rename = "decreciente")]
    Decreasing,
}

impl Direction {
    /// Map a feed `sentido` code. Unknown codes are not an error.
    pub fn from_code(code: Option<&str>) -> Option<Self> {
        match code? {
            "positive" => Some(Direction::Increasing),
            "negative" => Some(Direction::Decreasing),
            _ => None,
        }
    }
}

/// Compass heading of the affected carriageway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Heading {
    #[serde(rename = "norte")]
    North,
    #[serde(rename = "noreste")]
    NorthEast,
    #[serde(rename = "este")]
    East,
    #[serde(rename = "sureste")]
    SouthEast,
    #[serde(rename = "sur")]
    South,
    #[serde(rename = "suroeste")]
    SouthWest,
    #[serde(rename = "oeste")]
    West,
    #[serde(rename = "noroeste")]
    NorthWest,
}

impl Heading {
    /// Map a feed `orientacion` code. Unknown codes are not an error.
    pub fn from_code(code: Option<&str>) -> Option<Self> {
        match code? {
            "northBound" => Some(Heading::North),
            "northEastBound" => Some(Heading::NorthEast),
            "eastBound" => Some(Heading::East),
            "southEastBound" => Some(Heading::SouthEast),
            "southBound" => Some(Heading::South),
            "southWestBound" => Some(Heading::SouthWest),
            "westBound" => Some(Heading::West),
            "northWestBound" => Some(Heading::NorthWest),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Beacon {
    #[serde(rename = "identificadores")]
    pub ids: BeaconIds,
    #[serde(rename = "estado")]
    pub state: BeaconState,
    #[serde(rename = "localizacion")]
    pub location: Location,
    #[serde(rename = "posicion")]
    pub position: Position,
    #[serde(rename = "fechas")]
    pub dates: BeaconDates,
}

impl Beacon {
    pub fn id(&self) -> &str {
        &self.ids.incident_id
    }

    pub fn is_active(&self) -> bool {
        self.state == BeaconState::Active
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeaconIds {
    #[serde(rename = "idIncidenciaDgt")]
    pub incident_id: String,
    #[serde(rename = "idSituacionDgt")]
    pub situation_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(rename = "coordenadas")]
    pub coordinates: Coordinates,
    #[serde(rename = "localidad")]
    pub locality: Locality,
    #[serde(rename = "via")]
    pub road: Road,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    #[serde(rename = "latitud")]
    pub latitude: f64,
    #[serde(rename = "longitud")]
    pub longitude: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locality {
    #[serde(rename = "comunidad")]
    pub region: Option<String>,
    #[serde(rename = "provincia")]
    pub province: Option<String>,
    #[serde(rename = "municipio")]
    pub municipality: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Road {
    #[serde(rename = "nombre")]
    pub name: Option<String>,
    #[serde(rename = "kilometro")]
    pub kilometer: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    #[serde(rename = "sentido")]
    pub direction: Option<Direction>,
    #[serde(rename = "orientacion")]
    pub heading: Option<Heading>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeaconDates {
    /// Activation time reported by the feed
    #[serde(rename = "activadaEn")]
    pub activated_at: Option<DateTime<Utc>>,
    /// Cycle at which this id was first seen; never changes afterwards
    #[serde(rename = "primeraVezVistaEn")]
    pub first_seen_at: DateTime<Utc>,
    #[serde(rename = "ultimaActualizacionEn")]
    pub last_updated_at: DateTime<Utc>,
}

// ============================================================================
// Snapshot
// ============================================================================

/// The whole cache as consumers see it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(rename = "fechas")]
    pub dates: SnapshotDates,
    #[serde(rename = "contadoresBalizas")]
    pub counters: Counters,
    #[serde(rename = "balizas")]
    pub beacons: HashMap<String, Beacon>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotDates {
    /// Last cycle that reached the merge step; absent until the first one
    #[serde(rename = "realizadaPeticionEn", default, skip_serializing_if = "Option::is_none")]
    pub last_request_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    #[serde(rename = "numeroBalizasActivas")]
    pub active: usize,
    #[serde(rename = "numeroBalizasInactivas")]
    pub inactive: usize,
}

impl Counters {
    /// Full tally by state; counters are never adjusted incrementally.
    pub fn tally<'a>(beacons: impl IntoIterator<Item = &'a Beacon>) -> Self {
        beacons
            .into_iter()
            .fold(Counters::default(), |mut counters, beacon| {
                match beacon.state {
                    BeaconState::Active => counters.active += 1,
                    BeaconState::Inactive => counters.inactive += 1,
                }
                counters
            })
    }

    pub fn total(&self) -> usize {
        self.active + self.inactive
    }
}

impl Snapshot {
    /// Cache state before the first refresh cycle.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn beacon(&self, id: &str) -> Option<&Beacon> {
        self.beacons.get(id)
    }

    pub fn len(&self) -> usize {
        self.beacons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.beacons.is_empty()
    }

    pub(crate) fn recount(&mut self) {
        self.counters = Counters::tally(self.beacons.values());
    }
}
