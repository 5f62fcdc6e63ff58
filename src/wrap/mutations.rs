use super::handlers::HandlerMap;
use super::key::QualifiedKey;
use crate::error::Result;
use crate::store::{CommitOptions, Disposer, MutationEvent, StoreEngine};
use std::collections::HashMap;
use std::fmt;
use std::ops::Index;
use tracing::{debug, trace};

/// A payload-only call site for one mutation.
///
/// Every call dispatches at root level under the accessor's qualified key,
/// so the handle it was built from does not affect where it lands.
#[derive(Clone)]
pub struct MutationAccessor<E> {
    key: QualifiedKey,
    store: E,
}

impl<E: StoreEngine> MutationAccessor<E> {
    /// The key this accessor dispatches under.
    pub fn key(&self) -> &QualifiedKey {
        &self.key
    }

    /// Commit the mutation with an optional payload.
    ///
    /// Store failures are returned unchanged.
    pub fn call(&self, payload: Option<E::Payload>) -> std::result::Result<(), E::Error> {
        trace!(key = %self.key, "dispatch");
        self.store.commit(self.key.as_str(), payload, CommitOptions::root())
    }

    /// Shorthand for `call(Some(payload))`.
    pub fn commit(&self, payload: E::Payload) -> std::result::Result<(), E::Error> {
        self.call(Some(payload))
    }

    /// Observe commits of this mutation.
    ///
    /// `handler` receives the payload of every commit whose key equals this
    /// accessor's key, whoever issued it. Commits under other keys are
    /// filtered out. The subscription stays until the returned [`Disposer`]
    /// is invoked.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::{Arc, Mutex};
    /// use storewrap::{wrap_mutations, HandlerMap, MutationFn, Store};
    ///
    /// let store: Store<i32, i32> = Store::new(0);
    /// let add: MutationFn<i32, i32> = Arc::new(|n, by| *n += by.copied().unwrap_or(1));
    /// let handlers = HandlerMap::new().with("add", add);
    /// store.register_mutations("counter", &handlers).unwrap();
    ///
    /// let counter = wrap_mutations("counter", &store, &handlers).unwrap();
    /// let seen = Arc::new(Mutex::new(Vec::new()));
    /// let sink = seen.clone();
    /// let disposer = counter["add"].listen(move |by| sink.lock().unwrap().push(by.copied()));
    ///
    /// counter["add"].commit(5).unwrap();
    /// disposer.dispose();
    /// counter["add"].commit(5).unwrap();
    ///
    /// assert_eq!(*seen.lock().unwrap(), vec![Some(5)]);
    /// assert_eq!(store.get(), 10);
    /// ```
    pub fn listen<F>(&self, handler: F) -> Disposer
    where
        F: Fn(Option<&E::Payload>) + Send + Sync + 'static,
        E::Payload: 'static,
    {
        let key = self.key.clone();
        self.store.subscribe(move |event: &MutationEvent<E::Payload>| {
            if event.key == key.as_str() {
                handler(event.payload.as_ref());
            }
        })
    }
}

impl<E> fmt::Debug for MutationAccessor<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutationAccessor")
            .field("key", &self.key)
            .finish()
    }
}

/// The result of [`wrap_mutations`].
///
/// Acts as a passthrough to the store's own [`commit`](Self::commit) and
/// holds one [`MutationAccessor`] per wrapped identifier.
pub struct Committer<E> {
    store: E,
    namespace: String,
    accessors: Vec<(String, MutationAccessor<E>)>,
    index: HashMap<String, usize>,
}

impl<E> Committer<E> {
    /// The accessor wrapped under `name`. Repeated lookups return the same
    /// instance.
    pub fn get(&self, name: &str) -> Option<&MutationAccessor<E>> {
        self.index.get(name).map(|&i| &self.accessors[i].1)
    }

    /// Wrapped identifiers in handler-map order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.accessors.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MutationAccessor<E>)> {
        self.accessors.iter().map(|(name, a)| (name.as_str(), a))
    }

    pub fn len(&self) -> usize {
        self.accessors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accessors.is_empty()
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

impl<E: StoreEngine> Committer<E> {
    /// Forward a raw commit to the store as-is.
    pub fn commit(
        &self,
        key: &str,
        payload: Option<E::Payload>,
        options: CommitOptions,
    ) -> std::result::Result<(), E::Error> {
        self.store.commit(key, payload, options)
    }
}

impl<E> Index<&str> for Committer<E> {
    type Output = MutationAccessor<E>;

    /// # Panics
    ///
    /// Panics if no accessor was wrapped under `name`.
    fn index(&self, name: &str) -> &Self::Output {
        match self.get(name) {
            Some(accessor) => accessor,
            None => panic!("no mutation accessor named {name:?}"),
        }
    }
}

impl<E> fmt::Debug for Committer<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Committer")
            .field("namespace", &self.namespace)
            .field("accessors", &self.names().collect::<Vec<_>>())
            .finish()
    }
}

/// Build one [`MutationAccessor`] per entry of `handlers`.
///
/// Keys are qualified with `namespace` and checked eagerly: a blank
/// identifier or two entries sharing a key fail here, before anything is
/// committed. Handler bodies are never called by the wrapper; they are
/// expected to be registered on the store under the same keys.
pub fn wrap_mutations<E, H>(
    namespace: &str,
    store: &E,
    handlers: &HandlerMap<H>,
) -> Result<Committer<E>>
where
    E: StoreEngine + Clone,
{
    let entries = handlers.qualified(namespace)?;

    let mut accessors = Vec::with_capacity(entries.len());
    let mut index = HashMap::with_capacity(entries.len());
    for (identifier, key, _) in entries {
        index.insert(identifier.to_string(), accessors.len());
        accessors.push((
            identifier.to_string(),
            MutationAccessor {
                key,
                store: store.clone(),
            },
        ));
    }

    debug!(namespace, count = accessors.len(), "wrapped mutations");
    Ok(Committer {
        store: store.clone(),
        namespace: namespace.to_string(),
        accessors,
        index,
    })
}
