use futures::future::{BoxFuture, FutureExt, Shared};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::RefreshFailure;

pub(crate) type RefreshOutcome = Result<String, RefreshFailure>;
pub(crate) type SharedRefresh = Shared<BoxFuture<'static, RefreshOutcome>>;

/// Single-flight slot for token refreshes.
///
/// At most one refresh is in flight; every caller that arrives while it is
/// pending gets a clone of the same shared future. The slot is cleared when
/// the refresh settles, and only by the refresh that filled it.
#[derive(Default)]
pub(crate) struct RefreshGate {
    slot: Mutex<Option<InFlight>>,
    generation: AtomicU64,
}

struct InFlight {
    generation: u64,
    future: SharedRefresh,
}

impl RefreshGate {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Join the pending refresh, or start one with `start`.
    ///
    /// Check and set happen under one lock with no await in between. The
    /// started refresh is spawned onto the runtime so it settles even if
    /// every caller stops waiting. Returns the shared future and whether
    /// this call started it.
    pub(crate) fn join_or_start<F>(self: &Arc<Self>, start: F) -> (SharedRefresh, bool)
    where
        F: FnOnce() -> BoxFuture<'static, RefreshOutcome>,
    {
        let mut slot = self.lock();
        if let Some(in_flight) = slot.as_ref() {
            return (in_flight.future.clone(), false);
        }

        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        let gate = Arc::clone(self);
        let work = start();
        let future = async move {
            let outcome = work.await;
            gate.settle(generation);
            outcome
        }
        .boxed()
        .shared();

        *slot = Some(InFlight {
            generation,
            future: future.clone(),
        });
        drop(slot);

        tokio::spawn(future.clone());
        (future, true)
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.lock().is_some()
    }

    fn settle(&self, generation: u64) {
        let mut slot = self.lock();
        if slot.as_ref().map(|f| f.generation) == Some(generation) {
            *slot = None;
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<InFlight>> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
