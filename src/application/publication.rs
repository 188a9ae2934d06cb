// Snapshot publication - single-writer latest cell plus per-tick subscriptions
use crate::domain::snapshot::Snapshot;
use futures::stream::Stream;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tokio::sync::watch;

pub type SnapshotCallback = Arc<dyn Fn(&Arc<Snapshot>) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Write side of the latest-snapshot cell. Owned by the scheduler.
pub struct SnapshotPublisher {
    latest: watch::Sender<Option<Arc<Snapshot>>>,
    subscribers: Vec<(SubscriptionId, SnapshotCallback)>,
    next_id: u64,
}

impl SnapshotPublisher {
    pub fn new() -> Self {
        let (latest, _) = watch::channel(None);
        Self {
            latest,
            subscribers: Vec::new(),
            next_id: 0,
        }
    }

    pub fn reader(&self) -> SnapshotReader {
        SnapshotReader {
            rx: self.latest.subscribe(),
        }
    }

    pub fn subscribe(&mut self, callback: SnapshotCallback) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.subscribers.push((id, callback));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Swap in `snapshot` as the latest value, then notify subscribers in
    /// subscription order while `still_open` holds. A panicking callback is
    /// logged and the remaining subscribers still run.
    pub fn publish(&self, snapshot: Snapshot, still_open: impl Fn() -> bool) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        self.latest.send_replace(Some(Arc::clone(&snapshot)));

        for (id, callback) in &self.subscribers {
            if !still_open() {
                break;
            }
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| callback(&snapshot))) {
                tracing::error!(
                    subscription = id.0,
                    generation = snapshot.generation(),
                    panic = panic_message(payload.as_ref()),
                    "snapshot subscriber panicked"
                );
            }
        }
        snapshot
    }

    /// Drop every subscription. The latest value stays readable.
    pub fn close(&mut self) {
        self.subscribers.clear();
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}

impl Default for SnapshotPublisher {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only handle on the latest published snapshot.
#[derive(Clone)]
pub struct SnapshotReader {
    rx: watch::Receiver<Option<Arc<Snapshot>>>,
}

impl SnapshotReader {
    /// `None` until the first successful tick.
    pub fn latest(&self) -> Option<Arc<Snapshot>> {
        self.rx.borrow().clone()
    }

    /// The current snapshot (if any), then every newer one. Intermediate
    /// snapshots are skipped when the consumer falls behind.
    pub fn into_changes(self) -> impl Stream<Item = Arc<Snapshot>> + Send + 'static {
        let mut rx = self.rx;
        async_stream::stream! {
            let current = rx.borrow_and_update().clone();
            if let Some(snapshot) = current {
                yield snapshot;
            }
            while rx.changed().await.is_ok() {
                let next = rx.borrow_and_update().clone();
                if let Some(snapshot) = next {
                    yield snapshot;
                }
            }
        }
    }
}
