use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt, Shared};
use tracing::{debug, error, info, warn};

use super::types::{
    CacheChange, CacheKey, CacheSnapshot, CachedValue, ChangeCallback, StaleDataWarning,
    SubscriptionId,
};
use crate::client::{ClientError, RemoteClient};
use crate::sessions::types::{Session, SessionStatus};

type SharedFetch = Shared<BoxFuture<'static, CacheSnapshot>>;

#[derive(Debug, Default)]
struct CacheEntry {
    value: Option<CachedValue>,
    fetched_at: Option<DateTime<Utc>>,
    stale: bool,
    warning: Option<StaleDataWarning>,
}

impl CacheEntry {
    fn snapshot(&self) -> CacheSnapshot {
        CacheSnapshot {
            value: self.value.clone(),
            is_stale: self.stale || self.value.is_none(),
            fetched_at: self.fetched_at,
            warning: self.warning.clone(),
        }
    }
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<CacheKey, CacheEntry>,
    in_flight: HashMap<CacheKey, SharedFetch>,
    subscribers: HashMap<CacheKey, Vec<(SubscriptionId, ChangeCallback)>>,
    /// Ids whose server-side deletion was confirmed, with the sequence
    /// number at which that happened. An id is dropped once a list fetch
    /// started after the delete no longer contains it.
    deleted: HashMap<String, u64>,
    /// Orders deletes against fetch starts.
    sequence: u64,
    next_subscription: u64,
}

impl CacheState {
    fn callbacks(&self, key: &CacheKey) -> Vec<ChangeCallback> {
        self.subscribers
            .get(key)
            .map(|subs| subs.iter().map(|(_, cb)| Arc::clone(cb)).collect())
            .unwrap_or_default()
    }

    fn next_sequence(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }

    fn is_deleted(&self, key: &CacheKey) -> bool {
        key.session_id()
            .is_some_and(|id| self.deleted.contains_key(id))
    }

    /// Forget tombstones the server has caught up with: the delete happened
    /// before this list fetch started and the list no longer has the id.
    fn prune_deleted(&mut self, started: u64, sessions: &[Session]) {
        let listed: HashSet<&str> = sessions.iter().map(|s| s.id.as_str()).collect();
        let in_flight = &self.in_flight;
        self.deleted.retain(|id, deleted_at| {
            *deleted_at >= started
                || listed.contains(id.as_str())
                || in_flight.contains_key(&CacheKey::session(id.as_str()))
        });
    }

    /// Replace an entry with a fresh server value.
    ///
    /// `started` is the sequence number of the fetch that produced the
    /// value, if it came from one. Returns false if the value was dropped
    /// because it belongs to a deleted session.
    fn store(&mut self, key: &CacheKey, value: CachedValue, started: Option<u64>) -> bool {
        let value = match value {
            CachedValue::Sessions(mut sessions) => {
                if let Some(started) = started {
                    self.prune_deleted(started, &sessions);
                }
                sessions.retain(|s| !self.deleted.contains_key(&s.id));
                CachedValue::Sessions(sessions)
            }
            CachedValue::Detail(detail) => {
                if self.deleted.contains_key(detail.id()) {
                    debug!(
                        event = "core.cache.deleted_detail_dropped",
                        key = %key
                    );
                    return false;
                }
                CachedValue::Detail(detail)
            }
        };

        let entry = self.entries.entry(key.clone()).or_default();
        warn_on_progress_regression(key, entry.value.as_ref(), &value);
        entry.value = Some(value);
        entry.fetched_at = Some(Utc::now());
        entry.stale = false;
        entry.warning = None;
        true
    }
}

struct CacheInner {
    client: Arc<dyn RemoteClient>,
    state: Mutex<CacheState>,
}

impl CacheInner {
    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Clear the in-flight marker of a fetch task that never finished.
    fn abandon_fetch(&self, key: &CacheKey, err: &tokio::task::JoinError) -> CacheSnapshot {
        let mut state = self.lock();
        state.in_flight.remove(key);
        error!(event = "core.cache.fetch_aborted", key = %key, error = %err);
        state
            .entries
            .get(key)
            .map(CacheEntry::snapshot)
            .unwrap_or_else(|| CacheSnapshot {
                is_stale: true,
                ..CacheSnapshot::default()
            })
    }

    /// Apply the result of a remote read and wake subscribers.
    fn complete_fetch(
        &self,
        key: &CacheKey,
        started: u64,
        result: Result<CachedValue, ClientError>,
    ) -> CacheSnapshot {
        let (snapshot, change, callbacks) = {
            let mut state = self.lock();
            state.in_flight.remove(key);

            let change = match result {
                Ok(value) => {
                    if state.store(key, value, Some(started)) {
                        info!(event = "core.cache.fetch_completed", key = %key);
                        Some(CacheChange::Updated)
                    } else {
                        None
                    }
                }
                Err(e) if state.is_deleted(key) => {
                    debug!(
                        event = "core.cache.deleted_failure_dropped",
                        key = %key,
                        error = %e
                    );
                    None
                }
                Err(e) => {
                    warn!(
                        event = "core.cache.fetch_failed",
                        key = %key,
                        error = %e,
                        error_code = crate::errors::GhostdashError::error_code(&e)
                    );
                    // Stale-while-error: keep the previous value in place
                    let entry = state.entries.entry(key.clone()).or_default();
                    entry.stale = true;
                    entry.warning = Some(StaleDataWarning {
                        reason: e.to_string(),
                        failed_at: Utc::now(),
                    });
                    Some(CacheChange::FetchFailed)
                }
            };

            let snapshot = state
                .entries
                .get(key)
                .map(CacheEntry::snapshot)
                .unwrap_or_else(|| CacheSnapshot {
                    is_stale: true,
                    ..CacheSnapshot::default()
                });
            let callbacks = if change.is_some() {
                state.callbacks(key)
            } else {
                Vec::new()
            };
            (snapshot, change, callbacks)
        };

        if let Some(change) = change {
            for callback in callbacks {
                callback(key, change);
            }
        }
        snapshot
    }
}

/// Client-local store of last-known sessions and session details.
///
/// Cheap to clone; clones share the same entries. The cache is the only
/// component that mutates stored entities.
#[derive(Clone)]
pub struct EntityCache {
    inner: Arc<CacheInner>,
}

impl EntityCache {
    pub fn new(client: Arc<dyn RemoteClient>) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                client,
                state: Mutex::new(CacheState::default()),
            }),
        }
    }

    /// Last known value of a key, without contacting the remote system.
    pub fn get(&self, key: &CacheKey) -> Option<CacheSnapshot> {
        self.inner.lock().entries.get(key).map(CacheEntry::snapshot)
    }

    /// Replace an entry and stamp it with the current time.
    pub fn put(&self, key: &CacheKey, value: CachedValue) {
        let callbacks = {
            let mut state = self.inner.lock();
            if !state.store(key, value, None) {
                return;
            }
            state.callbacks(key)
        };
        notify(key, CacheChange::Updated, callbacks);
    }

    /// Mark an entry stale so the next read refetches it.
    ///
    /// Safe to call repeatedly and for keys that hold nothing yet.
    pub fn invalidate(&self, key: &CacheKey) {
        let callbacks = {
            let mut state = self.inner.lock();
            if let Some(entry) = state.entries.get_mut(key) {
                entry.stale = true;
            }
            state.callbacks(key)
        };
        debug!(event = "core.cache.invalidated", key = %key);
        notify(key, CacheChange::Invalidated, callbacks);
    }

    /// Drop an entry entirely.
    pub fn evict(&self, key: &CacheKey) {
        let (removed, callbacks) = {
            let mut state = self.inner.lock();
            let removed = state.entries.remove(key).is_some();
            (removed, state.callbacks(key))
        };
        if removed {
            debug!(event = "core.cache.evicted", key = %key);
            notify(key, CacheChange::Evicted, callbacks);
        }
    }

    /// Forget a session whose deletion the server confirmed.
    ///
    /// Evicts its detail, removes it from the cached list and marks the list
    /// stale. The id is remembered so results of reads that were already in
    /// flight cannot bring it back; it is forgotten once a list fetch started
    /// after the delete comes back without it.
    pub fn remove_session(&self, id: &str) {
        let list_changed = {
            let mut state = self.inner.lock();
            let deleted_at = state.next_sequence();
            state.deleted.insert(id.to_string(), deleted_at);
            match state.entries.get_mut(&CacheKey::Sessions) {
                Some(entry) => {
                    if let Some(CachedValue::Sessions(sessions)) = entry.value.as_mut() {
                        sessions.retain(|s| s.id != id);
                    }
                    entry.stale = true;
                    true
                }
                None => false,
            }
        };

        self.evict(&CacheKey::session(id));
        if list_changed {
            self.invalidate(&CacheKey::Sessions);
        }
    }

    /// Whether the server confirmed deleting this session and the cache is
    /// still keeping it out of results.
    pub fn is_deleted(&self, id: &str) -> bool {
        self.inner.lock().deleted.contains_key(id)
    }

    /// Whether a remote read for this key is outstanding.
    pub fn is_in_flight(&self, key: &CacheKey) -> bool {
        self.inner.lock().in_flight.contains_key(key)
    }

    /// Serve a fresh cached value, or fetch it if missing or stale.
    pub async fn read(&self, key: &CacheKey) -> CacheSnapshot {
        if let Some(snapshot) = self.get(key)
            && !snapshot.is_stale
        {
            return snapshot;
        }
        self.refresh(key).await
    }

    /// Fetch a key from the remote system.
    ///
    /// A call for a key that is already being fetched waits on the
    /// outstanding request instead of issuing another. Never fails: a remote
    /// error leaves the previous value in place with a warning attached.
    ///
    /// The request runs on its own tokio task, so its result is applied even
    /// if every caller stops waiting for it.
    pub async fn refresh(&self, key: &CacheKey) -> CacheSnapshot {
        let fetch = {
            let mut state = self.inner.lock();
            match state.in_flight.get(key) {
                Some(fetch) => {
                    debug!(event = "core.cache.fetch_deduplicated", key = %key);
                    fetch.clone()
                }
                None => {
                    let started = state.next_sequence();
                    let inner = Arc::clone(&self.inner);
                    let fetch_key = key.clone();
                    // Runs to completion even if every reader stops waiting
                    let task = tokio::spawn(async move {
                        let result = fetch_value(inner.client.as_ref(), &fetch_key).await;
                        inner.complete_fetch(&fetch_key, started, result)
                    });

                    let inner = Arc::clone(&self.inner);
                    let join_key = key.clone();
                    let fetch = async move {
                        match task.await {
                            Ok(snapshot) => snapshot,
                            Err(e) => inner.abandon_fetch(&join_key, &e),
                        }
                    }
                    .boxed()
                    .shared();
                    state.in_flight.insert(key.clone(), fetch.clone());
                    debug!(event = "core.cache.fetch_started", key = %key);
                    fetch
                }
            }
        };
        fetch.await
    }

    /// Register a callback run whenever `key` changes.
    pub fn subscribe(&self, key: &CacheKey, callback: ChangeCallback) -> SubscriptionId {
        let mut state = self.inner.lock();
        state.next_subscription += 1;
        let id = SubscriptionId(state.next_subscription);
        state
            .subscribers
            .entry(key.clone())
            .or_default()
            .push((id, callback));
        id
    }

    pub fn unsubscribe(&self, key: &CacheKey, id: SubscriptionId) {
        let mut state = self.inner.lock();
        if let Some(subs) = state.subscribers.get_mut(key) {
            subs.retain(|(sub_id, _)| *sub_id != id);
            if subs.is_empty() {
                state.subscribers.remove(key);
            }
        }
    }
}

async fn fetch_value(
    client: &dyn RemoteClient,
    key: &CacheKey,
) -> Result<CachedValue, ClientError> {
    match key {
        CacheKey::Sessions => client.list_sessions().await.map(CachedValue::Sessions),
        CacheKey::Session(id) => client
            .get_session(id)
            .await
            .map(|detail| CachedValue::Detail(Box::new(detail))),
    }
}

fn notify(key: &CacheKey, change: CacheChange, callbacks: Vec<ChangeCallback>) {
    for callback in callbacks {
        callback(key, change);
    }
}

/// Progress only moves forward while a session runs; log when the server
/// says otherwise. The server value still wins.
fn warn_on_progress_regression(key: &CacheKey, old: Option<&CachedValue>, new: &CachedValue) {
    let (Some(old), Some(new)) = (old.and_then(CachedValue::as_detail), new.as_detail()) else {
        return;
    };
    if old.status() == SessionStatus::InProgress
        && new.status() == SessionStatus::InProgress
        && new.progress < old.progress
    {
        warn!(
            event = "core.cache.progress_regressed",
            key = %key,
            previous = old.progress,
            current = new.progress
        );
    }
}
