//! Keyed stores for API resources.
//!
//! A store owns the load state of every key and is the only place that
//! mutates it. Consumers read snapshots through [`ResourceStore::state`] and
//! learn about changes from [`ResourceStore::subscribe`].
//!
//! Concurrent fetches of one key share a single request. Every load carries
//! a [`FetchId`]; a result is committed only while its id is still the
//! active one, so results that arrive after a `reset` are dropped.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use evx_types::{Release, Repository};
use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use tokio::sync::broadcast;

use crate::api::{ApiClient, fetch_all_pages};

const CHANGE_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FetchId(u64);

/// Load state of one key.
#[derive(Debug, PartialEq)]
pub enum ResourceState<T> {
    Idle,
    Loading,
    Loaded(Arc<T>),
    Failed(String),
}

impl<T> Clone for ResourceState<T> {
    fn clone(&self) -> Self {
        match self {
            ResourceState::Idle => ResourceState::Idle,
            ResourceState::Loading => ResourceState::Loading,
            ResourceState::Loaded(value) => ResourceState::Loaded(Arc::clone(value)),
            ResourceState::Failed(message) => ResourceState::Failed(message.clone()),
        }
    }
}

impl<T> ResourceState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, ResourceState::Loading)
    }

    pub fn loaded(&self) -> Option<&Arc<T>> {
        match self {
            ResourceState::Loaded(value) => Some(value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    LoadStarted,
    Loaded,
    Failed,
    Reset,
}

/// Notification sent to subscribers after a key's state changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreChange {
    pub key: String,
    pub kind: ChangeKind,
}

type SharedLoad<T> = Shared<BoxFuture<'static, Result<Arc<T>, String>>>;

struct Slot<T> {
    state: ResourceState<T>,
    active: Option<FetchId>,
    in_flight: Option<SharedLoad<T>>,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self {
            state: ResourceState::Idle,
            active: None,
            in_flight: None,
        }
    }
}

struct Inner<T> {
    slots: HashMap<String, Slot<T>>,
    next_id: u64,
}

pub struct ResourceStore<T> {
    inner: Mutex<Inner<T>>,
    changes: broadcast::Sender<StoreChange>,
}

impl<T> fmt::Debug for ResourceStore<T>
where
    T: Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceStore")
            .field("keys", &self.lock().slots.len())
            .finish_non_exhaustive()
    }
}

impl<T> Default for ResourceStore<T>
where
    T: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ResourceStore<T>
where
    T: Send + Sync + 'static,
{
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            inner: Mutex::new(Inner {
                slots: HashMap::new(),
                next_id: 0,
            }),
            changes,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self, key: &str, kind: ChangeKind) {
        // No subscribers is fine.
        let _ = self.changes.send(StoreChange {
            key: key.to_string(),
            kind,
        });
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.changes.subscribe()
    }

    /// Snapshot of the state of `key`.
    pub fn state(&self, key: &str) -> ResourceState<T> {
        self.lock()
            .slots
            .get(key)
            .map_or(ResourceState::Idle, |slot| slot.state.clone())
    }

    /// Loads `key` with `loader` unless a load is already in flight, in
    /// which case this call waits for that one instead.
    ///
    /// Returns the state of `key` after the load settled.
    pub async fn fetch<F, Fut, E>(&self, key: &str, loader: F) -> ResourceState<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: fmt::Display,
    {
        let (id, load) = {
            let mut inner = self.lock();
            let id = FetchId(inner.next_id);
            let slot = inner.slots.entry(key.to_string()).or_default();

            if let (Some(load), Some(active)) = (slot.in_flight.clone(), slot.active) {
                tracing::debug!(key, "joining in-flight fetch");
                (active, load)
            } else {
                let load = loader()
                    .map(|result| result.map(Arc::new).map_err(|e| e.to_string()))
                    .boxed()
                    .shared();
                slot.state = ResourceState::Loading;
                slot.active = Some(id);
                slot.in_flight = Some(load.clone());
                inner.next_id += 1;
                drop(inner);
                self.notify(key, ChangeKind::LoadStarted);
                (id, load)
            }
        };

        let result = load.await;
        self.finish(key, id, result)
    }

    /// Commits a load result if `id` is still the active fetch for `key`.
    fn finish(&self, key: &str, id: FetchId, result: Result<Arc<T>, String>) -> ResourceState<T> {
        let mut inner = self.lock();
        let Some(slot) = inner.slots.get_mut(key) else {
            tracing::debug!(key, "dropping result for reset key");
            return ResourceState::Idle;
        };

        if slot.active != Some(id) {
            return slot.state.clone();
        }

        slot.active = None;
        slot.in_flight = None;
        let kind = match result {
            Ok(value) => {
                slot.state = ResourceState::Loaded(value);
                ChangeKind::Loaded
            }
            Err(message) => {
                tracing::warn!(key, error = %message, "fetch failed");
                slot.state = ResourceState::Failed(message);
                ChangeKind::Failed
            }
        };
        let state = slot.state.clone();
        drop(inner);

        self.notify(key, kind);
        state
    }

    /// Forgets `key`. A fetch still in flight for it will not be committed.
    pub fn reset(&self, key: &str) {
        let removed = self.lock().slots.remove(key).is_some();
        if removed {
            self.notify(key, ChangeKind::Reset);
        }
    }

    pub fn reset_all(&self) {
        let keys: Vec<String> = self.lock().slots.drain().map(|(key, _)| key).collect();
        for key in keys {
            self.notify(&key, ChangeKind::Reset);
        }
    }
}

/// Repositories keyed by organization slug.
pub type RepositoryStore = ResourceStore<Vec<Repository>>;

/// Releases keyed by `org` or `org/project`.
pub type ReleaseStore = ResourceStore<Vec<Release>>;

impl RepositoryStore {
    /// Loads every repository of `org`, following pagination.
    pub async fn load(&self, client: &ApiClient, org: &str) -> ResourceState<Vec<Repository>> {
        let client = client.clone();
        let org_owned = org.to_string();
        self.fetch(org, move || async move {
            fetch_all_pages(|cursor| {
                let client = client.clone();
                let org = org_owned.clone();
                async move { client.list_repositories(&org, cursor.as_deref()).await }
            })
            .await
        })
        .await
    }
}

impl ReleaseStore {
    pub fn key(org: &str, project: Option<&str>) -> String {
        match project {
            Some(project) => format!("{org}/{project}"),
            None => org.to_string(),
        }
    }

    /// Loads every release of `org`, or of one of its projects.
    pub async fn load(
        &self,
        client: &ApiClient,
        org: &str,
        project: Option<&str>,
    ) -> ResourceState<Vec<Release>> {
        let client = client.clone();
        let org = org.to_string();
        let project = project.map(str::to_string);
        let key = Self::key(&org, project.as_deref());
        self.fetch(&key, move || async move {
            fetch_all_pages(|cursor| {
                let client = client.clone();
                let org = org.clone();
                let project = project.clone();
                async move {
                    client
                        .list_releases(&org, project.as_deref(), cursor.as_deref())
                        .await
                }
            })
            .await
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use tokio::sync::oneshot;

    use super::*;

    #[tokio::test]
    async fn test_fetch_loads_and_notifies() {
        let store: ResourceStore<u32> = ResourceStore::new();
        let mut changes = store.subscribe();

        let state = store.fetch("k", || async { Ok::<_, String>(7) }).await;

        assert_eq!(state, ResourceState::Loaded(Arc::new(7)));
        assert_eq!(store.state("k"), state);
        assert_eq!(changes.recv().await.unwrap().kind, ChangeKind::LoadStarted);
        assert_eq!(
            changes.recv().await.unwrap(),
            StoreChange {
                key: "k".to_string(),
                kind: ChangeKind::Loaded
            }
        );
    }

    #[tokio::test]
    async fn test_failed_fetch_records_message() {
        let store: ResourceStore<u32> = ResourceStore::new();
        let state = store
            .fetch("k", || async { Err::<u32, _>("HTTP 500") })
            .await;
        assert_eq!(state, ResourceState::Failed("HTTP 500".to_string()));
        assert_eq!(store.state("other"), ResourceState::Idle);
    }

    #[tokio::test]
    async fn test_concurrent_fetches_are_coalesced() {
        let store: ResourceStore<u32> = ResourceStore::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let loader = |calls: Arc<AtomicUsize>| {
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                Ok::<_, String>(1)
            }
        };

        let (a, b) = tokio::join!(
            store.fetch("k", loader(Arc::clone(&calls))),
            store.fetch("k", loader(Arc::clone(&calls)))
        );

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(a, ResourceState::Loaded(Arc::new(1)));
        assert_eq!(b, a);
    }

    #[tokio::test]
    async fn test_result_after_reset_is_ignored() {
        let store: Arc<ResourceStore<u32>> = Arc::new(ResourceStore::new());
        let (release, gate) = oneshot::channel::<()>();

        let task = tokio::spawn({
            let store = Arc::clone(&store);
            async move {
                store
                    .fetch("k", || async move {
                        let _ = gate.await;
                        Ok::<_, String>(42)
                    })
                    .await
            }
        });

        while !store.state("k").is_loading() {
            tokio::task::yield_now().await;
        }
        store.reset("k");
        release.send(()).unwrap();

        assert_eq!(task.await.unwrap(), ResourceState::Idle);
        assert_eq!(store.state("k"), ResourceState::Idle);
    }

    #[tokio::test]
    async fn test_refetch_after_load_issues_new_request() {
        let store: ResourceStore<usize> = ResourceStore::new();
        let calls = Arc::new(AtomicUsize::new(0));

        for expected in 1..=2 {
            let calls = Arc::clone(&calls);
            let state = store
                .fetch("k", move || async move {
                    Ok::<_, String>(calls.fetch_add(1, Ordering::SeqCst) + 1)
                })
                .await;
            assert_eq!(state.loaded().map(|v| **v), Some(expected));
        }
    }

    #[tokio::test]
    async fn test_reset_all_notifies_each_key() {
        let store: ResourceStore<u32> = ResourceStore::new();
        store.fetch("a", || async { Ok::<_, String>(1) }).await;
        store.fetch("b", || async { Ok::<_, String>(2) }).await;

        let mut changes = store.subscribe();
        store.reset_all();

        let mut reset: Vec<String> = Vec::new();
        for _ in 0..2 {
            let change = changes.recv().await.unwrap();
            assert_eq!(change.kind, ChangeKind::Reset);
            reset.push(change.key);
        }
        reset.sort();
        assert_eq!(reset, ["a", "b"]);
        assert_eq!(store.state("a"), ResourceState::Idle);
    }

    #[test]
    fn test_release_store_keys() {
        assert_eq!(ReleaseStore::key("acme", None), "acme");
        assert_eq!(ReleaseStore::key("acme", Some("web")), "acme/web");
    }
}
