// Refresh scheduler - drives ticks and owns the snapshot lifecycle
use crate::application::publication::{SnapshotPublisher, SnapshotReader, SubscriptionId};
use crate::application::snapshot_engine::SnapshotEngine;
use crate::domain::error::{EngineError, EngineResult};
use crate::domain::snapshot::Snapshot;
use std::cell::Cell;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, TryLockError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

const IDLE: u8 = 0;
const TICKING: u8 = 1;
const STOPPED: u8 = 2;

thread_local! {
    // Address of the scheduler whose subscriber callbacks run on this thread, 0 if none.
    static PUBLISHING: Cell<usize> = const { Cell::new(0) };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Ticking,
    Stopped,
}

impl SchedulerState {
    fn from_raw(raw: u8) -> Self {
        match raw {
            IDLE => SchedulerState::Idle,
            TICKING => SchedulerState::Ticking,
            _ => SchedulerState::Stopped,
        }
    }
}

struct Shared {
    period: Duration,
    state: AtomicU8,
    generation: AtomicU64,
    // try_lock doubles as the busy flag: a second caller skips instead of queueing
    engine: Mutex<SnapshotEngine>,
    // held for the whole swap-and-notify sequence
    publisher: Mutex<SnapshotPublisher>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Shared {
    fn state(&self) -> SchedulerState {
        SchedulerState::from_raw(self.state.load(Ordering::SeqCst))
    }

    fn is_ticking(&self) -> bool {
        self.state.load(Ordering::SeqCst) == TICKING
    }

    fn id(&self) -> usize {
        self as *const Shared as usize
    }

    fn is_publishing_here(&self) -> bool {
        PUBLISHING.with(Cell::get) == self.id()
    }

    fn tick(&self) {
        let mut engine = match self.engine.try_lock() {
            Ok(engine) => engine,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => {
                tracing::debug!("previous tick still running, skipping");
                return;
            }
        };
        if !self.is_ticking() {
            return;
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        match engine.produce(generation) {
            Ok(snapshot) => self.publish(snapshot),
            Err(e) => {
                tracing::error!(generation, error = %e, "tick aborted, keeping previous snapshot");
            }
        }
    }

    fn publish(&self, snapshot: Snapshot) {
        let publisher = self.publisher.lock().unwrap_or_else(PoisonError::into_inner);
        if !self.is_ticking() {
            tracing::debug!(
                generation = snapshot.generation(),
                "scheduler stopped, discarding snapshot"
            );
            return;
        }

        let _guard = PublishGuard::enter(self.id());
        let published = publisher.publish(snapshot, || self.is_ticking());
        tracing::debug!(generation = published.generation(), "snapshot published");
    }
}

/// Marks this thread as publishing for one scheduler; restores the outer
/// marker on drop, since a callback may start another scheduler inline.
struct PublishGuard {
    outer: usize,
}

impl PublishGuard {
    fn enter(id: usize) -> Self {
        PublishGuard {
            outer: PUBLISHING.with(|current| current.replace(id)),
        }
    }
}

impl Drop for PublishGuard {
    fn drop(&mut self) {
        PUBLISHING.with(|current| current.set(self.outer));
    }
}

/// Periodic snapshot producer. Clones share one scheduler.
#[derive(Clone)]
pub struct RefreshScheduler {
    shared: Arc<Shared>,
}

impl RefreshScheduler {
    pub fn new(engine: SnapshotEngine, period: Duration) -> Self {
        Self {
            shared: Arc::new(Shared {
                period,
                state: AtomicU8::new(IDLE),
                generation: AtomicU64::new(0),
                engine: Mutex::new(engine),
                publisher: Mutex::new(SnapshotPublisher::new()),
                task: Mutex::new(None),
            }),
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.shared.state()
    }

    pub fn reader(&self) -> SnapshotReader {
        self.shared
            .publisher
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .reader()
    }

    /// Register a callback invoked once per successful tick, on the ticking
    /// thread. From inside a callback only `stop()` may be called on the
    /// scheduler; everything else takes the publisher lock.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Arc<Snapshot>) + Send + Sync + 'static,
    {
        self.shared
            .publisher
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .subscribe(Arc::new(callback))
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.shared
            .publisher
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .unsubscribe(id)
    }

    /// Idle -> Ticking. Runs the first tick before returning, then one per
    /// period on the current tokio runtime.
    pub fn start(&self) -> EngineResult<()> {
        let runtime = Handle::try_current().map_err(|e| EngineError::Runtime(e.to_string()))?;

        if let Err(current) =
            self.shared
                .state
                .compare_exchange(IDLE, TICKING, Ordering::SeqCst, Ordering::SeqCst)
        {
            let misuse = if current == TICKING {
                EngineError::SchedulerMisuse("start() called while already ticking")
            } else {
                EngineError::SchedulerMisuse("start() called after stop()")
            };
            tracing::warn!("{}", misuse);
            return Ok(());
        }

        tracing::info!(period_ms = self.shared.period.as_millis() as u64, "refresh scheduler started");
        self.shared.tick();

        let shared = Arc::clone(&self.shared);
        let period = self.shared.period;
        let handle = runtime.spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                if !shared.is_ticking() {
                    break;
                }
                shared.tick();
            }
        });

        let mut task = self.shared.task.lock().unwrap_or_else(PoisonError::into_inner);
        if self.shared.is_ticking() {
            *task = Some(handle);
        } else {
            // stop() won the race before the handle was stored
            handle.abort();
        }
        Ok(())
    }

    /// -> Stopped. Idempotent. Once this returns no snapshot is published,
    /// including from a tick that was already in flight.
    pub fn stop(&self) {
        if self.shared.state.swap(STOPPED, Ordering::SeqCst) == STOPPED {
            tracing::debug!("refresh scheduler already stopped");
            return;
        }

        if let Some(handle) = self
            .shared
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }

        // Inside one of this scheduler's own callbacks the publisher lock is
        // already held by this thread; the publish loop checks the state
        // before each callback.
        if !self.shared.is_publishing_here() {
            self.shared
                .publisher
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .close();
        }
        tracing::info!("refresh scheduler stopped");
    }
}
