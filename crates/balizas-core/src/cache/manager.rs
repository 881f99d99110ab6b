use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::api::{decode, FeedClient, FeedError, FeedSource};
use crate::config::Config;
use crate::models::{SituationRecord, Snapshot};

use super::store::SnapshotStore;
use super::sync::{merge_cycle, parse_feed};

/// The beacon cache: a snapshot store plus the refresh path that feeds it.
///
/// Overlapping `refresh` calls may fetch concurrently, but their merges run
/// one at a time under `merge_lock`. Each merge works on a copy of the
/// published snapshot and publishes only if the whole cycle succeeds.
pub struct BeaconCache<S = FeedClient> {
    source: S,
    store: SnapshotStore,
    merge_lock: Mutex<()>,
}

impl BeaconCache<FeedClient> {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(FeedClient::from_config(config)?))
    }
}

impl<S: FeedSource> BeaconCache<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            store: SnapshotStore::new(),
            merge_lock: Mutex::new(()),
        }
    }

    /// Latest published snapshot, without refreshing.
    pub async fn snapshot(&self) -> Arc<Snapshot> {
        self.store.snapshot().await
    }

    /// Run one full cycle against the feed and return the new snapshot.
    ///
    /// On any error the published snapshot is left as it was.
    pub async fn refresh(&self) -> Result<Arc<Snapshot>, FeedError> {
        let result: Result<Arc<Snapshot>, FeedError> = async {
            let raw = self.source.fetch_raw_feed().await?;
            let records = decode_records(&raw)?;
            self.commit(&records, Utc::now).await
        }
        .await;

        if let Err(ref e) = result {
            warn!(kind = e.kind(), error = %e, "Beacon refresh failed, keeping previous snapshot");
        }
        result
    }

    /// Decode and merge an already fetched payload with an explicit cycle time.
    pub async fn apply_feed_at(
        &self,
        raw: &str,
        now: DateTime<Utc>,
    ) -> Result<Arc<Snapshot>, FeedError> {
        let records = decode_records(raw)?;
        self.commit(&records, move || now).await
    }

    /// Merge already parsed records with an explicit cycle time.
    pub async fn apply_records_at(
        &self,
        records: &[SituationRecord],
        now: DateTime<Utc>,
    ) -> Result<Arc<Snapshot>, FeedError> {
        self.commit(records, move || now).await
    }

    async fn commit(
        &self,
        records: &[SituationRecord],
        clock: impl FnOnce() -> DateTime<Utc>,
    ) -> Result<Arc<Snapshot>, FeedError> {
        let _guard = self.merge_lock.lock().await;
        // Read the clock under the lock so cycle times follow merge order
        let now = clock();

        let mut working = Snapshot::clone(&*self.store.snapshot().await);
        let report = merge_cycle(&mut working, records, now)?;

        info!(
            seen = report.seen,
            new = report.new,
            deactivated = report.deactivated,
            evicted = report.evicted,
            active = working.counters.active,
            inactive = working.counters.inactive,
            "Beacon cache refreshed"
        );

        Ok(self.store.publish(working).await)
    }
}

fn decode_records(raw: &str) -> Result<Vec<SituationRecord>, FeedError> {
    let text = decode(raw)?;
    debug!(bytes = text.len(), "Decoded feed payload");
    parse_feed(&text)
}
