//! Data models for the beacon cache.
//!
//! - `feed`: records as the DGT incident feed sends them
//! - `beacon`: the domain `Beacon` and the `Snapshot` served to consumers

pub mod beacon;
pub mod feed;

pub use beacon::{
    Beacon, BeaconDates, BeaconIds, BeaconState, Coordinates, Counters, Direction, Heading,
    Locality, Location, Position, Road, Snapshot, SnapshotDates,
};
pub use feed::{FeedResponse, GeometryField, PointGeometry, SituationRecord, BEACON_SOURCE};
