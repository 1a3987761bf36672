//! Per-key debounced task scheduling.
//!
//! [`KeyedDebouncer`] keeps at most one pending action per key. Scheduling
//! a key that already has a pending action cancels the earlier one through
//! its [`CancellationToken`]; actions under different keys are independent.
//!
//! Once an action's delay has elapsed it runs to completion. Cancellation
//! only affects actions that are still waiting.

use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// A waiting action registered under one key.
struct PendingAction {
    generation: u64,
    cancel: CancellationToken,
}

struct Slots<K> {
    next_generation: u64,
    pending: HashMap<K, PendingAction>,
}

/// Debounces actions per key on the current tokio runtime.
///
/// Dropping the debouncer does not cancel waiting actions; use
/// [`cancel_all`](Self::cancel_all) for that.
pub struct KeyedDebouncer<K> {
    slots: Arc<Mutex<Slots<K>>>,
    tasks: TaskTracker,
}

impl<K> KeyedDebouncer<K>
where
    K: Eq + Hash + Clone + Debug + Send + 'static,
{
    pub fn new() -> Self {
        Self {
            slots: Arc::new(Mutex::new(Slots {
                next_generation: 0,
                pending: HashMap::new(),
            })),
            tasks: TaskTracker::new(),
        }
    }

    /// Run `action` after `delay` unless `key` is rescheduled or cancelled first.
    ///
    /// Any action still waiting under `key` is cancelled.
    pub fn schedule<F>(&self, key: K, delay: Duration, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let generation = {
            let mut slots = lock(&self.slots);
            slots.next_generation += 1;
            let generation = slots.next_generation;
            let previous = slots.pending.insert(
                key.clone(),
                PendingAction {
                    generation,
                    cancel: cancel.clone(),
                },
            );
            if let Some(previous) = previous {
                previous.cancel.cancel();
                tracing::debug!(?key, "Superseded pending action");
            }
            generation
        };

        tracing::debug!(?key, delay_ms = delay.as_millis() as u64, "Scheduled action");

        let slots = Arc::clone(&self.slots);
        self.tasks.spawn(async move {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }

            {
                let mut slots = lock(&slots);
                // A reschedule may have landed between the timer and this lock.
                if cancel.is_cancelled() {
                    return;
                }
                if slots
                    .pending
                    .get(&key)
                    .is_some_and(|p| p.generation == generation)
                {
                    slots.pending.remove(&key);
                }
            }

            action.await;
        });
    }

    pub fn is_pending(&self, key: &K) -> bool {
        lock(&self.slots).pending.contains_key(key)
    }

    /// Number of keys with an action still waiting.
    pub fn pending_count(&self) -> usize {
        lock(&self.slots).pending.len()
    }

    /// Cancel the waiting action for `key`. Returns `false` if none was waiting.
    pub fn cancel(&self, key: &K) -> bool {
        match lock(&self.slots).pending.remove(key) {
            Some(pending) => {
                pending.cancel.cancel();
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&self) {
        for (_, pending) in lock(&self.slots).pending.drain() {
            pending.cancel.cancel();
        }
    }

    /// Wait until every waiting action has fired or been cancelled and
    /// every started action has finished.
    pub async fn flush(&self) {
        self.tasks.close();
        self.tasks.wait().await;
        self.tasks.reopen();
    }
}

impl<K> Default for KeyedDebouncer<K>
where
    K: Eq + Hash + Clone + Debug + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
