use std::fmt;

/// A committed mutation as seen by subscribers.
#[derive(Clone, Debug, PartialEq)]
pub struct MutationEvent<P> {
    /// The resolved key the mutation was dispatched under.
    pub key: String,
    pub payload: Option<P>,
}

/// How a commit key is interpreted by the store.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeyScope {
    /// The key already carries its full namespace path.
    Absolute,
    /// The key is resolved against the committing handle's namespace.
    #[default]
    Relative,
}

/// Options accepted by [`StoreEngine::commit`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CommitOptions {
    pub scope: KeyScope,
}

impl CommitOptions {
    /// Dispatch at root level, bypassing any handle-local namespace.
    pub const fn root() -> Self {
        Self {
            scope: KeyScope::Absolute,
        }
    }

    /// Dispatch relative to the committing handle's namespace.
    pub const fn relative() -> Self {
        Self {
            scope: KeyScope::Relative,
        }
    }
}

/// Removes exactly the subscription that produced it.
///
/// Subscriptions outlive a dropped `Disposer`; only [`dispose`](Self::dispose)
/// tears one down.
#[must_use = "dropping a Disposer leaves its subscription registered"]
pub struct Disposer {
    dispose: Box<dyn FnOnce() + Send>,
}

impl Disposer {
    /// Wrap the teardown closure of a subscription.
    pub fn new<F>(dispose: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            dispose: Box::new(dispose),
        }
    }

    /// Remove the subscription.
    pub fn dispose(self) {
        (self.dispose)();
    }
}

impl fmt::Debug for Disposer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Disposer").finish_non_exhaustive()
    }
}

/// The primitives a store must provide for accessors to be built over it.
///
/// Implementors own state, handler bodies and derived values; accessors only
/// ever route through these three calls.
pub trait StoreEngine {
    /// Payload carried by a commit.
    type Payload;
    /// Value produced by a getter.
    type Value;
    /// Failure reported by [`commit`](Self::commit).
    type Error;

    /// Dispatch the mutation registered under `key`.
    fn commit(
        &self,
        key: &str,
        payload: Option<Self::Payload>,
        options: CommitOptions,
    ) -> Result<(), Self::Error>;

    /// Register a callback invoked synchronously on every commit.
    fn subscribe<F>(&self, callback: F) -> Disposer
    where
        F: Fn(&MutationEvent<Self::Payload>) + Send + Sync + 'static;

    /// Current value of the getter registered under `key`, if any.
    fn getter(&self, key: &str) -> Option<Self::Value>;
}
