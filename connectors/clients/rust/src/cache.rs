// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! Keyed query cache shared by the approval workflow and audit-log views.
//!
//! Entries are stored as JSON values under a [`QueryKey`] made of ordered
//! string segments. The cache provides:
//!
//! - **Fresh hits**: a successful, non-stale entry is returned without
//!   calling the fetcher.
//! - **Shared fetches**: while a fetch for a key is in flight, other readers
//!   of that key wait for its outcome instead of starting their own.
//! - **Prefix invalidation**: [`QueryCache::invalidate_prefix`] marks every
//!   entry under a key prefix stale, so the next read refetches. A fetch
//!   already in flight when the invalidation lands still completes, but its
//!   result is stored stale and is never joined by later readers.
//! - **Fetch tickets**: every fetch takes a ticket; its result is committed
//!   only if the ticket is still the latest for the key. A result that lost
//!   the race (to [`QueryCache::cancel`] or to a fetch started after an
//!   invalidation) comes back as [`ClientError::Superseded`] and leaves
//!   state untouched.
//! - **Hit/miss statistics** via atomic counters.
//!
//! The map lock is never held across the fetcher's `.await`.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::{watch, RwLock};
use tracing::{debug, warn};

use crate::error::{ClientError, Result};
use crate::retry::RetryPolicy;

pub const PENDING_APPROVALS: &str = "pending-approvals";
pub const AUDIT_LOGS: &str = "audit-logs";
pub const REPORTS: &str = "reports";

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

/// Hierarchical cache key, e.g. `["audit-logs", "42"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Prefix covering every pending-approvals page.
    pub fn pending_approvals() -> Self {
        Self::new([PENDING_APPROVALS])
    }

    pub fn pending_approvals_page(limit: usize) -> Self {
        Self::new([PENDING_APPROVALS.to_string(), limit.to_string()])
    }

    pub fn audit_logs(report_id: &str) -> Self {
        Self::new([AUDIT_LOGS, report_id])
    }

    pub fn report(report_id: &str) -> Self {
        Self::new([REPORTS, report_id])
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// True if `prefix`'s segments are a leading run of this key's.
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QueryStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

/// Snapshot of one query as a view would render it.
///
/// `data` survives a failed refetch, so a list stays visible next to the
/// error that replaced its last refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryState<T> {
    pub status: QueryStatus,
    pub data: Option<T>,
    pub error: Option<String>,
    pub is_stale: bool,
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self {
            status: QueryStatus::Idle,
            data: None,
            error: None,
            is_stale: false,
        }
    }
}

impl<T> QueryState<T> {
    pub fn is_loading(&self) -> bool {
        self.status == QueryStatus::Loading
    }

    pub fn is_error(&self) -> bool {
        self.status == QueryStatus::Error
    }
}

/// Outcome published to readers sharing a fetch. `None` until it lands.
type SharedOutcome = Option<Arc<Result<Value>>>;

/// Reader side of a fetch in flight, kept on the entry.
#[derive(Debug, Clone)]
struct InFlight {
    /// Invalidation generation the fetch started under.
    generation: u64,
    outcome: watch::Receiver<SharedOutcome>,
}

/// Leader side of a fetch in flight.
struct Flight {
    ticket: u64,
    generation: u64,
    outcome: watch::Sender<SharedOutcome>,
}

impl Flight {
    fn publish(&self, outcome: Result<Value>) {
        self.outcome.send_replace(Some(Arc::new(outcome)));
    }
}

enum Plan {
    Join(watch::Receiver<SharedOutcome>),
    Lead(Flight),
}

#[derive(Debug, Default)]
struct CacheEntry {
    data: Option<Value>,
    status: QueryStatus,
    error: Option<String>,
    stale: bool,
    ticket: u64,
    /// Bumped by every invalidation that covers this key.
    generation: u64,
    in_flight: Option<InFlight>,
}

impl CacheEntry {
    fn is_fresh(&self) -> bool {
        self.status == QueryStatus::Success && !self.stale && self.data.is_some()
    }

    /// A fetch another reader may wait on: started since the last
    /// invalidation and whose leader is still alive.
    fn joinable(&self) -> Option<watch::Receiver<SharedOutcome>> {
        self.in_flight
            .as_ref()
            .filter(|f| f.generation == self.generation && f.outcome.has_changed().is_ok())
            .map(|f| f.outcome.clone())
    }
}

/// Aggregate statistics about cache performance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub total_entries: usize,
    pub hit_count: u64,
    pub miss_count: u64,
    /// Reads that waited on a fetch already in flight.
    pub joined_count: u64,
    /// Fetch results dropped because a newer ticket existed.
    pub superseded_count: u64,
}

// ---------------------------------------------------------------------------
// QueryCache
// ---------------------------------------------------------------------------

/// Shared query cache.
///
/// # Example
///
/// ```rust
/// use cleanlink_client::cache::{QueryCache, QueryKey};
/// use cleanlink_client::retry::RetryPolicy;
///
/// # tokio_test::block_on(async {
/// let cache = QueryCache::new();
/// let key = QueryKey::audit_logs("42");
/// let logs: Vec<String> = cache
///     .fetch(&key, &RetryPolicy::none(), || async { Ok(vec!["created".to_string()]) })
///     .await
///     .unwrap();
/// assert_eq!(logs.len(), 1);
/// assert_eq!(cache.invalidate_prefix(&QueryKey::new(["audit-logs"])).await, 1);
/// # });
/// ```
#[derive(Debug, Default)]
pub struct QueryCache {
    entries: RwLock<HashMap<QueryKey, CacheEntry>>,
    next_ticket: AtomicU64,
    hit_count: AtomicU64,
    miss_count: AtomicU64,
    joined_count: AtomicU64,
    superseded_count: AtomicU64,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return fresh cached data for `key`, or fetch it.
    ///
    /// Joins a fetch already in flight for `key` rather than starting a
    /// second one.
    pub async fn fetch<T, F, Fut>(&self, key: &QueryKey, retry: &RetryPolicy, fetcher: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        {
            let entries = self.entries.read().await;
            if let Some(value) = entries.get(key).filter(|e| e.is_fresh()).and_then(|e| e.data.clone()) {
                if let Ok(data) = serde_json::from_value(value) {
                    self.hit_count.fetch_add(1, Ordering::Relaxed);
                    debug!(%key, "query cache hit");
                    return Ok(data);
                }
            }
        }
        self.miss_count.fetch_add(1, Ordering::Relaxed);
        self.load(key, retry, fetcher).await
    }

    /// Fetch ignoring any fresh data.
    ///
    /// A fetch in flight that started after the last invalidation already
    /// reflects the server, so it is joined rather than replaced.
    pub async fn refetch<T, F, Fut>(&self, key: &QueryKey, retry: &RetryPolicy, fetcher: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.load(key, retry, fetcher).await
    }

    async fn load<T, F, Fut>(&self, key: &QueryKey, retry: &RetryPolicy, fetcher: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let flight = loop {
            match self.plan(key).await {
                Plan::Lead(flight) => break flight,
                Plan::Join(outcome) => {
                    self.joined_count.fetch_add(1, Ordering::Relaxed);
                    debug!(%key, "joining fetch in flight");
                    if let Some(shared) = wait_for_outcome(outcome).await {
                        return match &*shared {
                            Ok(value) => Ok(serde_json::from_value(value.clone())?),
                            Err(err) => Err(err.replicate()),
                        };
                    }
                    // The leader was dropped before finishing; take over.
                }
            }
        };
        let outcome = retry.run(fetcher).await;
        self.commit(key, flight, outcome).await
    }

    /// Join the current fetch for `key`, or register a new one.
    async fn plan(&self, key: &QueryKey) -> Plan {
        let mut entries = self.entries.write().await;
        let entry = entries.entry(key.clone()).or_default();
        if let Some(outcome) = entry.joinable() {
            return Plan::Join(outcome);
        }

        let ticket = self.next_ticket.fetch_add(1, Ordering::SeqCst) + 1;
        let (sender, receiver) = watch::channel(None);
        entry.ticket = ticket;
        entry.status = QueryStatus::Loading;
        entry.in_flight = Some(InFlight {
            generation: entry.generation,
            outcome: receiver,
        });
        Plan::Lead(Flight {
            ticket,
            generation: entry.generation,
            outcome: sender,
        })
    }

    async fn commit<T: Serialize>(&self, key: &QueryKey, flight: Flight, outcome: Result<T>) -> Result<T> {
        let mut entries = self.entries.write().await;
        let entry = match entries.get_mut(key) {
            Some(entry) if entry.ticket == flight.ticket => entry,
            _ => {
                self.superseded_count.fetch_add(1, Ordering::Relaxed);
                debug!(%key, ticket = flight.ticket, "discarding superseded fetch");
                let err = ClientError::Superseded(key.to_string());
                flight.publish(Err(err.replicate()));
                return Err(err);
            }
        };
        entry.in_flight = None;

        let outcome = outcome.and_then(|data| Ok((serde_json::to_value(&data)?, data)));
        match outcome {
            Ok((value, data)) => {
                entry.data = Some(value.clone());
                entry.status = QueryStatus::Success;
                entry.error = None;
                // An invalidation after the fetch began means the server
                // may have moved on; keep the entry due for a refetch.
                entry.stale = entry.generation != flight.generation;
                if entry.stale {
                    debug!(%key, "fetch overlapped an invalidation; stored stale");
                }
                flight.publish(Ok(value));
                Ok(data)
            }
            Err(err) => {
                warn!(%key, error = %err, "query failed");
                entry.status = QueryStatus::Error;
                entry.error = Some(err.to_string());
                flight.publish(Err(err.replicate()));
                Err(err)
            }
        }
    }

    /// Mark every entry under `prefix` stale. Returns how many were marked.
    pub async fn invalidate_prefix(&self, prefix: &QueryKey) -> usize {
        let mut entries = self.entries.write().await;
        let mut marked = 0;
        for (key, entry) in entries.iter_mut() {
            if key.starts_with(prefix) {
                entry.stale = true;
                entry.generation += 1;
                marked += 1;
            }
        }
        debug!(%prefix, marked, "invalidated queries");
        marked
    }

    /// Abandon any fetch in flight for `key`; its result will be discarded.
    pub async fn cancel(&self, key: &QueryKey) {
        let ticket = self.next_ticket.fetch_add(1, Ordering::SeqCst) + 1;
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get_mut(key) {
            entry.ticket = ticket;
            entry.in_flight = None;
            if entry.status == QueryStatus::Loading {
                entry.status = if entry.data.is_some() {
                    QueryStatus::Success
                } else {
                    QueryStatus::Idle
                };
            }
        }
    }

    /// Current state of `key`; `Idle` if it was never fetched.
    pub async fn state<T: DeserializeOwned>(&self, key: &QueryKey) -> QueryState<T> {
        let entries = self.entries.read().await;
        match entries.get(key) {
            Some(entry) => QueryState {
                status: entry.status,
                data: entry
                    .data
                    .clone()
                    .and_then(|v| serde_json::from_value(v).ok()),
                error: entry.error.clone(),
                is_stale: entry.stale,
            },
            None => QueryState::default(),
        }
    }

    pub async fn is_stale(&self, key: &QueryKey) -> bool {
        let entries = self.entries.read().await;
        entries.get(key).is_some_and(|e| e.stale)
    }

    pub async fn remove(&self, key: &QueryKey) -> bool {
        self.entries.write().await.remove(key).is_some()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            total_entries: self.entries.read().await.len(),
            hit_count: self.hit_count.load(Ordering::Relaxed),
            miss_count: self.miss_count.load(Ordering::Relaxed),
            joined_count: self.joined_count.load(Ordering::Relaxed),
            superseded_count: self.superseded_count.load(Ordering::Relaxed),
        }
    }
}

/// Wait for the leader's outcome. `None` if it went away without one.
async fn wait_for_outcome(mut outcome: watch::Receiver<SharedOutcome>) -> Option<Arc<Result<Value>>> {
    loop {
        let ready = outcome.borrow_and_update().clone();
        if ready.is_some() {
            return ready;
        }
        if outcome.changed().await.is_err() {
            return outcome.borrow().clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;
    use std::time::Duration;

    fn no_retry() -> RetryPolicy {
        RetryPolicy::none()
    }

    #[test]
    fn test_key_prefixes() {
        let page = QueryKey::pending_approvals_page(50);
        assert!(page.starts_with(&QueryKey::pending_approvals()));
        assert!(!QueryKey::audit_logs("1").starts_with(&QueryKey::pending_approvals()));
        assert!(!QueryKey::audit_logs("1").starts_with(&QueryKey::audit_logs("12")));
        assert_eq!(page.to_string(), "[pending-approvals, 50]");
    }

    #[tokio::test]
    async fn test_fresh_hit_skips_fetcher() {
        let cache = QueryCache::new();
        let key = QueryKey::audit_logs("7");
        let calls = AtomicU32::new(0);

        for _ in 0..3 {
            let value: Vec<u32> = cache
                .fetch(&key, &no_retry(), || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Ok(vec![1, 2]) }
                })
                .await
                .unwrap();
            assert_eq!(value, vec![1, 2]);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let stats = cache.stats().await;
        assert_eq!(stats.hit_count, 2);
        assert_eq!(stats.miss_count, 1);
    }

    #[tokio::test]
    async fn test_invalidate_prefix_forces_refetch() {
        let cache = QueryCache::new();
        let page = QueryKey::pending_approvals_page(50);
        let audit = QueryKey::audit_logs("7");
        let _: u32 = cache.fetch(&page, &no_retry(), || async { Ok(1) }).await.unwrap();
        let _: u32 = cache.fetch(&audit, &no_retry(), || async { Ok(1) }).await.unwrap();

        assert_eq!(cache.invalidate_prefix(&QueryKey::pending_approvals()).await, 1);
        assert!(cache.is_stale(&page).await);
        assert!(!cache.is_stale(&audit).await);

        let refreshed: u32 = cache.fetch(&page, &no_retry(), || async { Ok(2) }).await.unwrap();
        assert_eq!(refreshed, 2);
        assert!(!cache.is_stale(&page).await);
    }

    #[tokio::test]
    async fn test_failed_refetch_keeps_previous_data() {
        let cache = QueryCache::new();
        let key = QueryKey::pending_approvals_page(10);
        let _: Vec<u32> = cache.fetch(&key, &no_retry(), || async { Ok(vec![5]) }).await.unwrap();
        cache.invalidate_prefix(&key).await;

        let result: Result<Vec<u32>> = cache
            .fetch(&key, &no_retry(), || async { Err(ClientError::from_status(500, None)) })
            .await;
        assert!(result.is_err());

        let state: QueryState<Vec<u32>> = cache.state(&key).await;
        assert!(state.is_error());
        assert_eq!(state.data, Some(vec![5]));
        assert!(state.error.unwrap().contains("500"));
    }

    fn slow<T>(value: T, secs: u64) -> impl Future<Output = Result<T>> {
        async move {
            tokio::time::sleep(Duration::from_secs(secs)).await;
            Ok(value)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_readers_share_one_fetch() {
        let cache = Arc::new(QueryCache::new());
        let key = QueryKey::pending_approvals_page(50);
        let calls = Arc::new(AtomicU32::new(0));

        let first = {
            let cache = Arc::clone(&cache);
            let key = key.clone();
            let calls = Arc::clone(&calls);
            tokio::spawn(async move {
                cache
                    .fetch(&key, &RetryPolicy::none(), || {
                        calls.fetch_add(1, Ordering::SeqCst);
                        slow(vec![1u32, 2], 1)
                    })
                    .await
            })
        };
        tokio::task::yield_now().await;

        let second: Vec<u32> = cache
            .fetch(&key, &no_retry(), || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(vec![9]) }
            })
            .await
            .unwrap();
        let refreshed: Vec<u32> = cache
            .refetch(&key, &no_retry(), || async { Ok(vec![9]) })
            .await
            .unwrap();

        assert_eq!(first.await.unwrap().unwrap(), vec![1, 2]);
        assert_eq!(second, vec![1, 2]);
        assert_eq!(refreshed, vec![1, 2]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let stats = cache.stats().await;
        assert_eq!(stats.joined_count, 2);
        assert_eq!(stats.superseded_count, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_readers_share_a_failed_fetch() {
        let cache = Arc::new(QueryCache::new());
        let key = QueryKey::audit_logs("4");

        let first = {
            let cache = Arc::clone(&cache);
            let key = key.clone();
            tokio::spawn(async move {
                cache
                    .fetch(&key, &RetryPolicy::none(), || async {
                        tokio::time::sleep(Duration::from_secs(1)).await;
                        Err::<u32, _>(ClientError::from_status(502, Some("bad gateway".into())))
                    })
                    .await
            })
        };
        tokio::task::yield_now().await;

        let second: Result<u32> = cache.fetch(&key, &no_retry(), || async { Ok(4) }).await;
        let err = second.unwrap_err();
        assert!(matches!(err, ClientError::Server { status: 502, .. }));
        assert_eq!(err.server_message(), Some("bad gateway"));
        assert!(first.await.unwrap().is_err());
        assert!(cache.state::<u32>(&key).await.is_error());
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidation_during_fetch_keeps_entry_stale() {
        let cache = Arc::new(QueryCache::new());
        let key = QueryKey::pending_approvals_page(50);

        let before = {
            let cache = Arc::clone(&cache);
            let key = key.clone();
            tokio::spawn(async move {
                cache
                    .fetch(&key, &RetryPolicy::none(), || slow("before".to_string(), 1))
                    .await
            })
        };
        tokio::task::yield_now().await;

        cache.invalidate_prefix(&QueryKey::pending_approvals()).await;
        assert_eq!(before.await.unwrap().unwrap(), "before");
        assert!(cache.is_stale(&key).await);

        let after: String = cache
            .fetch(&key, &no_retry(), || async { Ok("after".to_string()) })
            .await
            .unwrap();
        assert_eq!(after, "after");
        assert!(!cache.is_stale(&key).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_after_invalidation_supersedes_older_fetch() {
        let cache = Arc::new(QueryCache::new());
        let key = QueryKey::audit_logs("3");

        let old = {
            let cache = Arc::clone(&cache);
            let key = key.clone();
            tokio::spawn(async move {
                cache
                    .fetch(&key, &RetryPolicy::none(), || slow("old".to_string(), 5))
                    .await
            })
        };
        tokio::task::yield_now().await;
        cache.invalidate_prefix(&QueryKey::audit_logs("3")).await;

        // Started after the invalidation, so it must not join the old fetch.
        let fresh: String = cache
            .fetch(&key, &no_retry(), || async { Ok("new".to_string()) })
            .await
            .unwrap();
        assert_eq!(fresh, "new");

        assert!(matches!(old.await.unwrap(), Err(ClientError::Superseded(_))));
        let state: QueryState<String> = cache.state(&key).await;
        assert_eq!(state.data.as_deref(), Some("new"));
        assert!(!state.is_stale);
        assert_eq!(cache.stats().await.superseded_count, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_leader_hands_over_to_waiting_reader() {
        let cache = Arc::new(QueryCache::new());
        let key = QueryKey::report("8");

        let leader = {
            let cache = Arc::clone(&cache);
            let key = key.clone();
            tokio::spawn(async move {
                cache
                    .fetch(&key, &RetryPolicy::none(), || slow(1u32, 60))
                    .await
            })
        };
        tokio::task::yield_now().await;

        let follower = {
            let cache = Arc::clone(&cache);
            let key = key.clone();
            tokio::spawn(async move {
                cache
                    .fetch(&key, &RetryPolicy::none(), || slow(2u32, 1))
                    .await
            })
        };
        tokio::task::yield_now().await;

        leader.abort();
        assert_eq!(follower.await.unwrap().unwrap(), 2);
        assert_eq!(cache.state::<u32>(&key).await.data, Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_discards_in_flight_result() {
        let cache = Arc::new(QueryCache::new());
        let key = QueryKey::report("9");

        let pending = {
            let cache = Arc::clone(&cache);
            let key = key.clone();
            tokio::spawn(async move {
                cache
                    .fetch(&key, &RetryPolicy::none(), || async {
                        tokio::time::sleep(Duration::from_secs(1)).await;
                        Ok::<_, ClientError>(9u32)
                    })
                    .await
            })
        };
        tokio::task::yield_now().await;
        assert!(cache.state::<u32>(&key).await.is_loading());

        cache.cancel(&key).await;
        assert!(matches!(pending.await.unwrap(), Err(ClientError::Superseded(_))));

        let state: QueryState<u32> = cache.state(&key).await;
        assert_eq!(state.status, QueryStatus::Idle);
        assert!(state.data.is_none());
    }

    #[tokio::test]
    async fn test_unknown_key_is_idle() {
        let cache = QueryCache::new();
        let state: QueryState<u32> = cache.state(&QueryKey::report("none")).await;
        assert_eq!(state, QueryState::default());
        assert!(!cache.remove(&QueryKey::report("none")).await);
    }
}
