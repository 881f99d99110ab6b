use std::sync::Arc;

use tokio::sync::RwLock;

use crate::models::Snapshot;

/// Holds the currently published snapshot.
///
/// Readers get an `Arc` to an immutable snapshot; publishing swaps in a new
/// one, so a reader never observes a half-applied cycle.
#[derive(Debug)]
pub struct SnapshotStore {
    current: RwLock<Arc<Snapshot>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(Snapshot::empty())),
        }
    }

    pub async fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&*self.current.read().await)
    }

    pub(crate) async fn publish(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let published = Arc::new(snapshot);
        *self.current.write().await = Arc::clone(&published);
        published
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}
