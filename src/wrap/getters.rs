use super::handlers::HandlerMap;
use super::key::QualifiedKey;
use crate::error::{Result, WrapError};
use crate::store::StoreEngine;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// A read-only view of one getter in the store's registry.
///
/// Nothing is cached: each [`get`](Self::get) asks the store again.
#[derive(Clone)]
pub struct GetterAccessor<E> {
    name: String,
    key: QualifiedKey,
    store: E,
}

impl<E: StoreEngine> GetterAccessor<E> {
    pub fn key(&self) -> &QualifiedKey {
        &self.key
    }

    /// Current value, or `None` if the store has no getter under this key.
    pub fn get(&self) -> Option<E::Value> {
        self.store.getter(self.key.as_str())
    }

    /// Getters cannot be written; this always fails.
    pub fn set(&self, _value: E::Value) -> Result<()> {
        Err(WrapError::ReadOnlyProperty {
            name: self.name.clone(),
        })
    }
}

impl<E> fmt::Debug for GetterAccessor<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GetterAccessor")
            .field("key", &self.key)
            .finish()
    }
}

/// The result of [`wrap_getters`]: one live accessor per identifier.
pub struct Getters<E> {
    accessors: HashMap<String, GetterAccessor<E>>,
    names: Vec<String>,
}

impl<E> Getters<E> {
    pub fn get(&self, name: &str) -> Option<&GetterAccessor<E>> {
        self.accessors.get(name)
    }

    /// Wrapped identifiers in handler-map order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<E: StoreEngine> Getters<E> {
    /// Current value of the getter wrapped under `name`.
    ///
    /// `None` both for unknown names and for keys the store does not
    /// currently define.
    pub fn value(&self, name: &str) -> Option<E::Value> {
        self.accessors.get(name)?.get()
    }

    /// Getters cannot be written; this always fails.
    ///
    /// Names that were never wrapped get the same error: no entry can be
    /// added to a wrapped getter set either.
    pub fn set(&self, name: &str, _value: E::Value) -> Result<()> {
        Err(WrapError::ReadOnlyProperty {
            name: name.to_string(),
        })
    }
}

impl<E> fmt::Debug for Getters<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Getters")
            .field("names", &self.names)
            .finish()
    }
}

/// Build one [`GetterAccessor`] per entry of `handlers`.
///
/// Each accessor reads `store.getter(qualify(name, namespace))` on every
/// access. Identifier problems are reported here, not on first read.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use storewrap::{wrap_getters, GetterFn, HandlerMap, Store};
///
/// #[derive(Clone)]
/// struct Totals {
///     sum: i64,
/// }
///
/// let store: Store<Totals, (), i64> = Store::new(Totals { sum: 3 });
/// let total: GetterFn<Totals, i64> = Arc::new(|state| state.sum);
/// let handlers = HandlerMap::new().with("total", total);
/// store.register_getters("", &handlers).unwrap();
///
/// let getters = wrap_getters(&store, &handlers, "").unwrap();
/// assert_eq!(getters.value("total"), Some(3));
///
/// store.replace_state(Totals { sum: 8 });
/// assert_eq!(getters.value("total"), Some(8));
/// ```
pub fn wrap_getters<E, H>(
    store: &E,
    handlers: &HandlerMap<H>,
    namespace: &str,
) -> Result<Getters<E>>
where
    E: StoreEngine + Clone,
{
    let entries = handlers.qualified(namespace)?;

    let mut accessors = HashMap::with_capacity(entries.len());
    let mut names = Vec::with_capacity(entries.len());
    for (identifier, key, _) in entries {
        names.push(identifier.to_string());
        accessors.insert(
            identifier.to_string(),
            GetterAccessor {
                name: identifier.to_string(),
                key,
                store: store.clone(),
            },
        );
    }

    debug!(namespace, count = names.len(), "wrapped getters");
    Ok(Getters { accessors, names })
}
