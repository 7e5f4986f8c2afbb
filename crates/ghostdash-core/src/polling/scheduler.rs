use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::policy::PollPolicy;
use crate::cache::{CacheChange, CacheKey, EntityCache, SubscriptionId};

/// One shared timer per polled key.
struct Timer {
    subscribers: usize,
    /// Bumped every time a loop is armed, so a finished loop never clears a newer one.
    generation: u64,
    running: bool,
    cancel: CancellationToken,
    /// Woken when the cache invalidates or evicts the key, so a mutation
    /// shows up without waiting out the interval.
    wake: Arc<Notify>,
    cache_subscription: SubscriptionId,
}

#[derive(Default)]
struct SchedulerState {
    timers: HashMap<CacheKey, Timer>,
    next_generation: u64,
}

type SharedState = Arc<Mutex<SchedulerState>>;

fn lock(state: &SharedState) -> MutexGuard<'_, SchedulerState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Keeps subscribed cache keys fresh.
///
/// Every subscriber to a key shares one polling loop; the loop is cancelled
/// when the last [`PollHandle`] for the key is dropped, and stops on its own
/// once a session detail reaches a terminal state. Must be used from within
/// a tokio runtime.
#[derive(Clone)]
pub struct PollingScheduler {
    cache: EntityCache,
    policy: PollPolicy,
    state: SharedState,
}

impl PollingScheduler {
    pub fn new(cache: EntityCache, policy: PollPolicy) -> Self {
        Self {
            cache,
            policy,
            state: Arc::new(Mutex::new(SchedulerState::default())),
        }
    }

    pub fn cache(&self) -> &EntityCache {
        &self.cache
    }

    /// Start (or join) polling of `key`.
    ///
    /// A stopped loop is re-armed by a new subscription; its first step
    /// reads through the cache, so a terminal detail that is still cached
    /// does not hit the remote system again.
    pub fn subscribe(&self, key: CacheKey) -> PollHandle {
        let mut state = lock(&self.state);
        state.next_generation += 1;
        let generation = state.next_generation;

        let cache = &self.cache;
        let timer = state
            .timers
            .entry(key.clone())
            .or_insert_with(|| new_timer(cache, &key));
        timer.subscribers += 1;

        if timer.running {
            debug!(
                event = "core.poll.subscriber_joined",
                key = %key,
                subscribers = timer.subscribers
            );
            drop(state);
            return self.handle(key);
        }

        timer.running = true;
        timer.generation = generation;
        info!(
            event = "core.poll.timer_armed",
            key = %key,
            subscribers = timer.subscribers
        );

        tokio::spawn(run_loop(
            self.cache.clone(),
            self.policy,
            Arc::clone(&self.state),
            key.clone(),
            timer.cancel.clone(),
            Arc::clone(&timer.wake),
            generation,
        ));

        drop(state);
        self.handle(key)
    }

    fn handle(&self, key: CacheKey) -> PollHandle {
        PollHandle {
            key,
            cache: self.cache.clone(),
            state: Arc::clone(&self.state),
            released: false,
        }
    }

    /// Whether a polling loop is currently scheduled for `key`.
    pub fn is_polling(&self, key: &CacheKey) -> bool {
        lock(&self.state)
            .timers
            .get(key)
            .is_some_and(|timer| timer.running)
    }

    pub fn subscriber_count(&self, key: &CacheKey) -> usize {
        lock(&self.state)
            .timers
            .get(key)
            .map_or(0, |timer| timer.subscribers)
    }
}

/// A subscription to a polled key. Dropping it unsubscribes.
pub struct PollHandle {
    key: CacheKey,
    cache: EntityCache,
    state: SharedState,
    released: bool,
}

impl PollHandle {
    pub fn key(&self) -> &CacheKey {
        &self.key
    }

    /// Explicit form of dropping the handle.
    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        let mut state = lock(&self.state);
        let Some(timer) = state.timers.get_mut(&self.key) else {
            return;
        };
        timer.subscribers = timer.subscribers.saturating_sub(1);
        if timer.subscribers > 0 {
            return;
        }

        if let Some(timer) = state.timers.remove(&self.key) {
            // In-flight reads are left to finish; only the timer stops
            timer.cancel.cancel();
            self.cache.unsubscribe(&self.key, timer.cache_subscription);
            info!(event = "core.poll.timer_cancelled", key = %self.key);
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.release();
    }
}

fn new_timer(cache: &EntityCache, key: &CacheKey) -> Timer {
    let wake = Arc::new(Notify::new());
    let waker = Arc::clone(&wake);
    let cache_subscription = cache.subscribe(
        key,
        Arc::new(move |_key: &CacheKey, change: CacheChange| {
            if matches!(change, CacheChange::Invalidated | CacheChange::Evicted) {
                waker.notify_one();
            }
        }),
    );

    Timer {
        subscribers: 0,
        generation: 0,
        running: false,
        cancel: CancellationToken::new(),
        wake,
        cache_subscription,
    }
}

fn is_deleted(cache: &EntityCache, key: &CacheKey) -> bool {
    key.session_id().is_some_and(|id| cache.is_deleted(id))
}

async fn run_loop(
    cache: EntityCache,
    policy: PollPolicy,
    state: SharedState,
    key: CacheKey,
    cancel: CancellationToken,
    wake: Arc<Notify>,
    generation: u64,
) {
    let mut snapshot = cache.read(&key).await;

    loop {
        // A result that lands after cancellation is cached but never re-arms
        if cancel.is_cancelled() {
            return;
        }

        if is_deleted(&cache, &key) {
            info!(event = "core.poll.timer_stopped", key = %key, reason = "deleted");
            break;
        }

        let Some(delay) = policy.next_delay(&key, &snapshot) else {
            info!(event = "core.poll.timer_stopped", key = %key, reason = "terminal_status");
            break;
        };

        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(delay) => {}
            _ = wake.notified() => {
                debug!(event = "core.poll.invalidation_wakeup", key = %key);
            }
        }

        if is_deleted(&cache, &key) {
            info!(event = "core.poll.timer_stopped", key = %key, reason = "deleted");
            break;
        }
        snapshot = cache.refresh(&key).await;
    }

    let mut state = lock(&state);
    if let Some(timer) = state.timers.get_mut(&key)
        && timer.generation == generation
    {
        timer.running = false;
    }
}
