use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::store::DatasetStore;
use crate::domain::records::{Record, Table};
use crate::seed;
use crate::{Cache, ChangeFeed, CoreError, SnapshotSource};

/// Durable cache key holding the last successfully loaded snapshot.
const DATASET_MIRROR_KEY: &str = "dataset:last_known";

/// Where the bootstrap data came from. Anything but `Live` is the §7(b)
/// "non-fatal notice" feature pages surface to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapSource {
    /// Fresh snapshot from the backend.
    Live,
    /// Last-known dataset mirrored into durable storage.
    Mirror,
    /// Bundled seed dataset; renderable but not live.
    Seed,
}

#[derive(Debug, Clone, Copy)]
pub struct SyncReport {
    pub source: BootstrapSource,
    pub tables: usize,
}

/// Per-table subscription owned by the controller while a session is active.
struct SubscriptionHandle {
    table: Table,
    task: JoinHandle<()>,
}

/// Ties the realtime subscriptions to the session lifetime: one receiver task
/// per table while a session is active, all of them torn down on logout or
/// session replacement. Also performs the initial bulk load with the
/// mirror/seed fallback chain so the UI always has something to render.
pub struct SyncController {
    feed: Arc<dyn ChangeFeed>,
    snapshots: Arc<dyn SnapshotSource>,
    cache: Arc<dyn Cache>,
    store: Arc<DatasetStore>,
    subscriptions: Mutex<Vec<SubscriptionHandle>>,
}

impl SyncController {
    pub fn new(
        feed: Arc<dyn ChangeFeed>,
        snapshots: Arc<dyn SnapshotSource>,
        cache: Arc<dyn Cache>,
        store: Arc<DatasetStore>,
    ) -> Self {
        Self {
            feed,
            snapshots,
            cache,
            store,
            subscriptions: Mutex::new(Vec::new()),
        }
    }

    /// Bulk-load the dataset and open one subscription per table. Restarting
    /// (a different user logging in) tears the previous subscriptions down
    /// first so no event can land in the new user's collections via an old
    /// receiver.
    pub async fn start(&self) -> Result<SyncReport, CoreError> {
        self.stop().await;

        let source = self.bootstrap().await;
        let mut handles = self.subscriptions.lock().await;
        for table in Table::ALL {
            let mut receiver = self.feed.subscribe(table);
            let store = Arc::clone(&self.store);
            let task = tokio::spawn(async move {
                loop {
                    match receiver.recv().await {
                        Ok(event) => store.apply(&event),
                        Err(RecvError::Lagged(missed)) => {
                            // Dropped notifications are tolerable: UPDATE
                            // self-heals and the next bulk load resyncs.
                            warn!(table = table.as_str(), missed, "change feed lagged");
                        }
                        Err(RecvError::Closed) => {
                            debug!(table = table.as_str(), "change feed closed");
                            break;
                        }
                    }
                }
            });
            handles.push(SubscriptionHandle { table, task });
        }

        info!(?source, tables = handles.len(), "sync controller started");
        Ok(SyncReport {
            source,
            tables: handles.len(),
        })
    }

    /// Abort every subscription task. Safe to call repeatedly; a no-op when
    /// nothing is running.
    pub async fn stop(&self) {
        let mut handles = self.subscriptions.lock().await;
        if handles.is_empty() {
            return;
        }
        for handle in handles.drain(..) {
            handle.task.abort();
            debug!(table = handle.table.as_str(), "subscription closed");
        }
        info!("sync controller stopped");
    }

    pub async fn is_running(&self) -> bool {
        !self.subscriptions.lock().await.is_empty()
    }

    /// Fill the dataset store: live snapshot, else durable mirror, else the
    /// bundled seed. Never blocks the UI on a dead backend.
    async fn bootstrap(&self) -> BootstrapSource {
        match self.snapshots.load_all().await {
            Ok(snapshot) if !snapshot.is_empty() => {
                self.mirror(&snapshot).await;
                self.store.replace_all(snapshot);
                return BootstrapSource::Live;
            }
            Ok(_) => warn!("bulk load returned an empty snapshot"),
            Err(e) => warn!("bulk load failed: {e}"),
        }

        if let Some(mirrored) = self.load_mirror().await {
            self.store.replace_all(mirrored);
            return BootstrapSource::Mirror;
        }

        self.store.replace_all(seed::dataset());
        BootstrapSource::Seed
    }

    async fn mirror(&self, snapshot: &HashMap<Table, Vec<Record>>) {
        match serde_json::to_vec(snapshot) {
            Ok(bytes) => {
                if let Err(e) = self.cache.set(DATASET_MIRROR_KEY, &bytes, None).await {
                    warn!("could not mirror dataset snapshot: {e}");
                }
            }
            Err(e) => warn!("could not serialize dataset mirror: {e}"),
        }
    }

    async fn load_mirror(&self) -> Option<HashMap<Table, Vec<Record>>> {
        let bytes = match self.cache.get(DATASET_MIRROR_KEY).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                warn!("could not read dataset mirror: {e}");
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(snapshot) => {
                info!("bootstrapped from mirrored dataset");
                Some(snapshot)
            }
            Err(e) => {
                warn!("mirrored dataset was unreadable: {e}");
                None
            }
        }
    }
}
