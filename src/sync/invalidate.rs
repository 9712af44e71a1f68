//! Run-coalescing scheduler
//!
//! `InvalidateSync` decouples "new data arrived" from "process the data".
//! Callers signal with [`InvalidateSync::invalidate`]; the scheduler runs the
//! wrapped task on the Tokio runtime so that:
//!
//! - at most one run is active at any time
//! - every invalidation is followed by a run that starts after it
//! - any number of invalidations during a run collapse into one more run
//!
//! ```text
//! invalidate ──► dirty=true ──► running? ──no──► spawn drive loop
//!                                  │
//!                                 yes (picked up when the run finishes)
//!
//! drive loop: while dirty { dirty=false; run().await }  running=false
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::watch;

type BoxTask = Box<dyn Fn() -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

#[derive(Debug, Default)]
struct SyncState {
    running: bool,
    dirty: bool,
    stopped: bool,
}

struct Inner {
    task: BoxTask,
    state: Mutex<SyncState>,
    /// Mirrors `running || dirty` for waiters
    busy: watch::Sender<bool>,
    runs: AtomicU64,
}

/// Single-flight, coalescing task runner
///
/// Cloning is cheap; clones share the same task and state.
#[derive(Clone)]
pub struct InvalidateSync {
    inner: Arc<Inner>,
}

impl InvalidateSync {
    /// Wrap an async task
    pub fn new<F, Fut>(task: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (busy, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                task: Box::new(move || Box::pin(task())),
                state: Mutex::new(SyncState::default()),
                busy,
                runs: AtomicU64::new(0),
            }),
        }
    }

    /// Request a run
    ///
    /// Returns immediately. Must be called from within a Tokio runtime.
    pub fn invalidate(&self) {
        let spawn = {
            let mut state = self.lock();
            if state.stopped {
                return;
            }
            state.dirty = true;
            // Set under the lock; the drive loop clears it under the same lock
            self.inner.busy.send_replace(true);
            if state.running {
                false
            } else {
                state.running = true;
                true
            }
        };

        if spawn {
            let inner = Arc::clone(&self.inner);
            tokio::spawn(drive(inner));
        }
    }

    /// Request a run and wait until the scheduler goes idle
    pub async fn invalidate_and_wait(&self) {
        self.invalidate();
        self.wait_idle().await;
    }

    /// Wait until no run is active or pending
    pub async fn wait_idle(&self) {
        let mut rx = self.inner.busy.subscribe();
        // The sender lives in `inner`, so the channel cannot close here
        let _ = rx.wait_for(|busy| !*busy).await;
    }

    /// Stop scheduling runs
    ///
    /// A run already in progress completes; pending and future invalidations
    /// are ignored.
    pub fn stop(&self) {
        let mut state = self.lock();
        state.stopped = true;
        state.dirty = false;
        if !state.running {
            self.inner.busy.send_replace(false);
        }
    }

    /// Check if a run is currently active
    pub fn is_running(&self) -> bool {
        self.lock().running
    }

    /// Number of completed runs
    pub fn runs(&self) -> u64 {
        self.inner.runs.load(Ordering::Relaxed)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SyncState> {
        lock_state(&self.inner)
    }
}

impl std::fmt::Debug for InvalidateSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvalidateSync")
            .field("state", &*self.lock())
            .field("runs", &self.runs())
            .finish()
    }
}

fn lock_state(inner: &Inner) -> std::sync::MutexGuard<'_, SyncState> {
    // State is plain flags; a poisoned lock still holds usable values
    inner.state.lock().unwrap_or_else(|e| e.into_inner())
}

async fn drive(inner: Arc<Inner>) {
    loop {
        {
            let mut state = lock_state(&inner);
            if !state.dirty || state.stopped {
                state.running = false;
                state.dirty = false;
                inner.busy.send_replace(false);
                return;
            }
            state.dirty = false;
        }

        // Run in a child task so a panicking run cannot wedge the scheduler
        let run = (inner.task)();
        if let Err(e) = tokio::spawn(run).await {
            tracing::error!(error = %e, "Invalidate-sync run failed");
        }

        let runs = inner.runs.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::trace!(runs = runs, "Invalidate-sync run complete");
    }
}
