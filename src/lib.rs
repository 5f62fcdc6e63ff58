//! # Storewrap
//!
//! Namespaced accessors over a shared mutable-state store.
//!
//! A store owns state, mutation handlers and getters, all addressed by string
//! keys. Storewrap turns a map of handlers into ergonomic call sites for them:
//!
//! ## Mutations
//!
//! [`wrap_mutations`] produces a [`Committer`] holding one
//! [`MutationAccessor`] per handler:
//! - `accessor.commit(payload)` dispatches `namespace/identifier` at root level
//! - `accessor.listen(f)` observes only commits of that key and returns a
//!   [`Disposer`]
//!
//! ## Getters
//!
//! [`wrap_getters`] produces [`Getters`], read-only views that re-read the
//! store's getter registry on every access. Nothing is cached here.
//!
//! ## Store
//!
//! Wrappers work over any [`StoreEngine`]. [`Store`] is a thread-safe
//! in-memory implementation suitable for applications and tests.

pub mod error;
pub mod store;
pub mod wrap;

// Re-export main types for convenience
pub use error::{StoreError, WrapError};
pub use store::{
    CommitOptions, Disposer, GetterFn, KeyScope, MutationEvent, MutationFn, Store, StoreEngine,
};
pub use wrap::{
    qualify, wrap_getters, wrap_mutations, Committer, GetterAccessor, Getters, HandlerMap,
    MutationAccessor, QualifiedKey, NAMESPACE_SEPARATOR,
};
