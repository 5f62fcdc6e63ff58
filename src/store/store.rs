use super::engine::{CommitOptions, Disposer, KeyScope, MutationEvent, StoreEngine};
use crate::error::{Result as WrapResult, StoreError};
use crate::wrap::{HandlerMap, NAMESPACE_SEPARATOR};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, trace, warn};

/// A mutation handler: changes state in place given an optional payload.
pub type MutationFn<S, P> = Arc<dyn Fn(&mut S, Option<&P>) + Send + Sync>;

/// A getter handler: derives a value from state.
pub type GetterFn<S, V> = Arc<dyn Fn(&S) -> V + Send + Sync>;

type Subscriber<P> = Arc<dyn Fn(&MutationEvent<P>) + Send + Sync>;
type Subscribers<P> = RwLock<Vec<(usize, Subscriber<P>)>>;

fn read_lock<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write_lock<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// A thread-safe in-memory store keyed by mutation and getter names.
///
/// State only changes through registered mutations dispatched with
/// [`commit`](StoreEngine::commit). Getters are evaluated against the current
/// state on every read. Clones share everything; [`scoped`](Self::scoped)
/// handles differ only in how relative commit keys resolve.
pub struct Store<S, P = (), V = ()> {
    state: Arc<RwLock<S>>,
    mutations: Arc<RwLock<HashMap<String, MutationFn<S, P>>>>,
    getters: Arc<RwLock<HashMap<String, GetterFn<S, V>>>>,
    subscribers: Arc<Subscribers<P>>,
    next_id: Arc<AtomicUsize>,
    namespace: Arc<str>,
}

impl<S, P, V> Store<S, P, V> {
    /// Create a new store with the given initial state.
    pub fn new(initial: S) -> Self {
        Self {
            state: Arc::new(RwLock::new(initial)),
            mutations: Arc::new(RwLock::new(HashMap::new())),
            getters: Arc::new(RwLock::new(HashMap::new())),
            subscribers: Arc::new(RwLock::new(Vec::new())),
            next_id: Arc::new(AtomicUsize::new(0)),
            namespace: Arc::from(""),
        }
    }

    /// Get a clone of the current state.
    pub fn get(&self) -> S
    where
        S: Clone,
    {
        read_lock(&self.state).clone()
    }

    /// Read state without cloning.
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&S) -> R,
    {
        let state = read_lock(&self.state);
        f(&*state)
    }

    /// Swap in a whole new state. Subscribers are not notified.
    pub fn replace_state(&self, new_state: S) {
        *write_lock(&self.state) = new_state;
    }

    /// Namespace that relative commits on this handle resolve against.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// A handle sharing this store whose relative commits resolve under
    /// `namespace`.
    ///
    /// `namespace` is taken as a full path, not appended to this handle's own.
    pub fn scoped(&self, namespace: &str) -> Self {
        Self {
            namespace: Arc::from(namespace),
            ..self.clone()
        }
    }

    /// Register `handler` under `key`, replacing any previous handler.
    pub fn register_mutation(&self, key: impl Into<String>, handler: MutationFn<S, P>) {
        write_lock(&self.mutations).insert(key.into(), handler);
    }

    /// Register `getter` under `key`, replacing any previous getter.
    pub fn register_getter(&self, key: impl Into<String>, getter: GetterFn<S, V>) {
        write_lock(&self.getters).insert(key.into(), getter);
    }

    /// Remove the getter under `key`. Returns whether one was registered.
    pub fn unregister_getter(&self, key: &str) -> bool {
        write_lock(&self.getters).remove(key).is_some()
    }

    pub fn has_mutation(&self, key: &str) -> bool {
        read_lock(&self.mutations).contains_key(key)
    }

    /// Register every handler in `handlers` under its qualified key.
    ///
    /// The map is validated as a whole before anything is installed.
    pub fn register_mutations(
        &self,
        namespace: &str,
        handlers: &HandlerMap<MutationFn<S, P>>,
    ) -> WrapResult<()> {
        let entries = handlers.qualified(namespace)?;
        let mut mutations = write_lock(&self.mutations);
        for (_, key, handler) in entries {
            mutations.insert(key.to_string(), Arc::clone(handler));
        }
        debug!(namespace, count = handlers.len(), "registered mutations");
        Ok(())
    }

    /// Register every getter in `handlers` under its qualified key.
    pub fn register_getters(
        &self,
        namespace: &str,
        handlers: &HandlerMap<GetterFn<S, V>>,
    ) -> WrapResult<()> {
        let entries = handlers.qualified(namespace)?;
        let mut getters = write_lock(&self.getters);
        for (_, key, getter) in entries {
            getters.insert(key.to_string(), Arc::clone(getter));
        }
        debug!(namespace, count = handlers.len(), "registered getters");
        Ok(())
    }

    fn resolve(&self, key: &str, options: CommitOptions) -> String {
        match options.scope {
            KeyScope::Relative if !self.namespace.is_empty() => {
                format!("{}{NAMESPACE_SEPARATOR}{key}", self.namespace)
            }
            _ => key.to_string(),
        }
    }

    /// Notify a snapshot of subscribers; no lock is held while they run.
    fn notify(&self, event: &MutationEvent<P>) {
        let subscribers: Vec<Subscriber<P>> = read_lock(&self.subscribers)
            .iter()
            .map(|(_, subscriber)| Arc::clone(subscriber))
            .collect();
        for subscriber in subscribers {
            subscriber(event);
        }
    }
}

impl<S, P, V> StoreEngine for Store<S, P, V>
where
    P: 'static,
{
    type Payload = P;
    type Value = V;
    type Error = StoreError;

    fn commit(
        &self,
        key: &str,
        payload: Option<P>,
        options: CommitOptions,
    ) -> Result<(), StoreError> {
        let key = self.resolve(key, options);
        let handler = read_lock(&self.mutations).get(&key).cloned();
        let Some(handler) = handler else {
            warn!(%key, "commit of unknown mutation");
            return Err(StoreError::UnknownMutation { key });
        };

        trace!(%key, "commit");
        {
            let mut state = write_lock(&self.state);
            handler(&mut *state, payload.as_ref());
        }
        self.notify(&MutationEvent { key, payload });
        Ok(())
    }

    fn subscribe<F>(&self, callback: F) -> Disposer
    where
        F: Fn(&MutationEvent<P>) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let subscriber: Subscriber<P> = Arc::new(callback);
        write_lock(&self.subscribers).push((id, subscriber));
        debug!(id, "subscribed");

        let subscribers = Arc::downgrade(&self.subscribers);
        Disposer::new(move || {
            if let Some(subscribers) = subscribers.upgrade() {
                write_lock(&subscribers).retain(|(sid, _)| *sid != id);
                debug!(id, "unsubscribed");
            }
        })
    }

    fn getter(&self, key: &str) -> Option<V> {
        let getter = read_lock(&self.getters).get(key).cloned()?;
        trace!(key, "getter read");
        let state = read_lock(&self.state);
        Some(getter(&*state))
    }
}

impl<S, P, V> Clone for Store<S, P, V> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            mutations: Arc::clone(&self.mutations),
            getters: Arc::clone(&self.getters),
            subscribers: Arc::clone(&self.subscribers),
            next_id: Arc::clone(&self.next_id),
            namespace: Arc::clone(&self.namespace),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Clone, Debug, PartialEq)]
    struct AppState {
        count: i32,
        name: String,
    }

    fn app_store() -> Store<AppState, i32, i32> {
        let store = Store::new(AppState {
            count: 0,
            name: "test".to_string(),
        });
        store.register_mutation(
            "add",
            Arc::new(|state: &mut AppState, by: Option<&i32>| {
                state.count += by.copied().unwrap_or(1);
            }),
        );
        store.register_getter("doubled", Arc::new(|state: &AppState| state.count * 2));
        store
    }

    #[test]
    fn commit_runs_handler() {
        let store = app_store();
        store.commit("add", Some(41), CommitOptions::root()).unwrap();
        store.commit("add", None, CommitOptions::root()).unwrap();

        assert_eq!(store.get().count, 42);
        assert_eq!(store.read(|s| s.name.clone()), "test");
    }

    #[test]
    fn unknown_mutation_is_an_error() {
        let store = app_store();
        assert_eq!(
            store.commit("missing", None, CommitOptions::root()),
            Err(StoreError::UnknownMutation {
                key: "missing".into()
            })
        );
    }

    #[test]
    fn relative_commit_uses_handle_namespace() {
        let store = app_store();
        store.register_mutation(
            "counter/reset",
            Arc::new(|state: &mut AppState, _: Option<&i32>| state.count = 0),
        );
        store.commit("add", Some(5), CommitOptions::root()).unwrap();

        let scoped = store.scoped("counter");
        scoped.commit("reset", None, CommitOptions::relative()).unwrap();
        assert_eq!(store.get().count, 0);

        // absolute keys ignore the handle's namespace
        scoped.commit("add", Some(3), CommitOptions::root()).unwrap();
        assert_eq!(store.get().count, 3);
    }

    #[test]
    fn store_subscribe() {
        let store = app_store();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();

        let disposer = store.subscribe(move |event| {
            seen_clone
                .lock()
                .unwrap()
                .push((event.key.clone(), event.payload));
        });

        store.commit("add", Some(2), CommitOptions::root()).unwrap();
        store.commit("add", None, CommitOptions::root()).unwrap();
        disposer.dispose();
        store.commit("add", Some(9), CommitOptions::root()).unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![("add".to_string(), Some(2)), ("add".to_string(), None)]
        );
    }

    #[test]
    fn dispose_removes_only_its_subscription() {
        let store = app_store();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let first_clone = first.clone();
        let d1 = store.subscribe(move |_| {
            first_clone.fetch_add(1, Ordering::SeqCst);
        });
        let second_clone = second.clone();
        let _d2 = store.subscribe(move |_| {
            second_clone.fetch_add(1, Ordering::SeqCst);
        });

        d1.dispose();
        store.commit("add", None, CommitOptions::root()).unwrap();

        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn subscriber_may_commit_reentrantly() {
        let store = app_store();
        store.register_mutation(
            "rename",
            Arc::new(|state: &mut AppState, _: Option<&i32>| state.name = "renamed".into()),
        );

        let inner = store.clone();
        let _d = store.subscribe(move |event| {
            if event.key == "add" {
                inner.commit("rename", None, CommitOptions::root()).unwrap();
            }
        });

        store.commit("add", None, CommitOptions::root()).unwrap();
        assert_eq!(store.get().name, "renamed");
    }

    #[test]
    fn store_recovers_after_handler_panic() {
        let store = app_store();
        store.register_mutation(
            "boom",
            Arc::new(|_: &mut AppState, _: Option<&i32>| panic!("boom")),
        );

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            store.commit("boom", None, CommitOptions::root())
        }));
        assert!(result.is_err());

        store.commit("add", Some(2), CommitOptions::root()).unwrap();
        assert_eq!(store.get().count, 2);
        assert_eq!(store.getter("doubled"), Some(4));
    }

    #[test]
    fn subscriber_may_dispose_itself() {
        let store = app_store();
        let hits = Arc::new(AtomicUsize::new(0));
        let slot: Arc<Mutex<Option<Disposer>>> = Arc::new(Mutex::new(None));

        let hits_clone = hits.clone();
        let slot_clone = slot.clone();
        let disposer = store.subscribe(move |_| {
            hits_clone.fetch_add(1, Ordering::SeqCst);
            if let Some(disposer) = slot_clone.lock().unwrap().take() {
                disposer.dispose();
            }
        });
        *slot.lock().unwrap() = Some(disposer);

        store.commit("add", None, CommitOptions::root()).unwrap();
        store.commit("add", None, CommitOptions::root()).unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(store.get().count, 2);
    }

    #[test]
    fn getters_are_evaluated_per_read() {
        let store = app_store();
        assert_eq!(store.getter("doubled"), Some(0));

        store.commit("add", Some(4), CommitOptions::root()).unwrap();
        assert_eq!(store.getter("doubled"), Some(8));

        assert!(store.unregister_getter("doubled"));
        assert_eq!(store.getter("doubled"), None);
    }

    #[test]
    fn replace_state_does_not_notify() {
        let store = app_store();
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();
        let _d = store.subscribe(move |_| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        });

        store.replace_state(AppState {
            count: 7,
            name: "new".into(),
        });

        assert_eq!(store.get().count, 7);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn register_mutations_qualifies_keys() {
        let store: Store<AppState, i32, i32> = Store::new(AppState {
            count: 0,
            name: String::new(),
        });
        let handlers = HandlerMap::new().with(
            "inc",
            Arc::new(|state: &mut AppState, _: Option<&i32>| state.count += 1) as MutationFn<_, _>,
        );

        store.register_mutations("counter", &handlers).unwrap();
        assert!(store.has_mutation("counter/inc"));
        assert!(!store.has_mutation("inc"));
    }

    #[test]
    fn register_getters_rejects_duplicates_atomically() {
        let store: Store<AppState, i32, i32> = Store::new(AppState {
            count: 1,
            name: String::new(),
        });
        let count: GetterFn<AppState, i32> = Arc::new(|state| state.count);
        let handlers = HandlerMap::new()
            .with("count", Arc::clone(&count))
            .with("count", count);

        assert!(store.register_getters("", &handlers).is_err());
        assert_eq!(store.getter("count"), None);
    }
}
