//! One refresh cycle over the cached snapshot.
//!
//! Per beacon and cycle the lifecycle is: active (present in this feed),
//! inactive (absent, still cached), evicted (removed). Inactivity is only
//! ever inferred from absence; the feed never says a beacon went away.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::api::FeedError;
use crate::models::{Beacon, BeaconState, FeedResponse, SituationRecord, Snapshot};

use super::mapper::map_record;

/// How long an inactive beacon survives without updates.
/// One hour separates a beacon that skipped a poll from one that is gone.
pub const EVICTION_WINDOW_MINUTES: i64 = 60;

/// What a cycle did, for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Distinct ids present in the feed
    pub seen: usize,
    /// Ids not cached before this cycle
    pub new: usize,
    /// Beacons that went from active to inactive
    pub deactivated: usize,
    pub evicted: usize,
}

/// Parse decoded feed text and keep only beacon records.
pub fn parse_feed(text: &str) -> Result<Vec<SituationRecord>, FeedError> {
    let response: FeedResponse = serde_json::from_str(text)?;
    let total = response.situations_records.len();

    let records = response.into_beacon_records()?;

    debug!(total, beacons = records.len(), "Parsed incident feed");
    Ok(records)
}

/// Merge one cycle's records into `snapshot` at cycle time `now`.
///
/// On error `snapshot` may be half-merged; callers run this on a private
/// copy and discard it on failure.
pub fn merge_cycle(
    snapshot: &mut Snapshot,
    records: &[SituationRecord],
    now: DateTime<Utc>,
) -> Result<CycleReport, FeedError> {
    let mut report = CycleReport::default();
    snapshot.dates.last_request_at = Some(now);

    let mut active_ids: HashSet<&str> = HashSet::with_capacity(records.len());
    for record in records {
        let existing = snapshot.beacons.get(&record.id);
        if existing.is_none() {
            report.new += 1;
        }
        let beacon = map_record(record, existing, now)?;
        snapshot.beacons.insert(record.id.clone(), beacon);
        active_ids.insert(record.id.as_str());
    }
    report.seen = active_ids.len();

    // Scan first, remove after: the map is not touched while iterating it
    let cutoff = now - Duration::minutes(EVICTION_WINDOW_MINUTES);
    let mut expired = Vec::new();
    for (id, beacon) in snapshot.beacons.iter_mut() {
        if !active_ids.contains(id.as_str()) && beacon.is_active() {
            beacon.state = BeaconState::Inactive;
            report.deactivated += 1;
        }
        if is_expired(beacon, cutoff) {
            expired.push(id.clone());
        }
    }

    for id in &expired {
        snapshot.beacons.remove(id);
    }
    report.evicted = expired.len();

    snapshot.recount();
    Ok(report)
}

fn is_expired(beacon: &Beacon, cutoff: DateTime<Utc>) -> bool {
    beacon.state == BeaconState::Inactive && beacon.dates.last_updated_at <= cutoff
}
