//! In-memory beacon cache.
//!
//! This module provides the `BeaconCache`, which owns the published
//! `Snapshot` and runs refresh cycles against a `FeedSource`:
//!
//! - `mapper`: one feed record to one `Beacon`
//! - `sync`: the per-cycle merge, deactivation and eviction rules
//! - `store`: atomic publication of snapshots to readers
//! - `manager`: fetch, decode, merge, publish
//!
//! A beacon missing from a cycle's feed turns inactive and is evicted once
//! it has gone `EVICTION_WINDOW_MINUTES` without an update.

pub mod manager;
pub mod mapper;
pub mod store;
pub mod sync;

pub use manager::BeaconCache;
pub use mapper::map_record;
pub use store::SnapshotStore;
pub use sync::{merge_cycle, parse_feed, CycleReport, EVICTION_WINDOW_MINUTES};
