//! The store contract accessors are built over, plus an in-memory store.
//!
//! [`StoreEngine`] is the seam: anything that can commit a keyed mutation,
//! fan commits out to subscribers and answer live getter reads can be
//! wrapped. [`Store`] is a thread-safe implementation of it.

mod engine;
mod store;

pub use engine::{CommitOptions, Disposer, KeyScope, MutationEvent, StoreEngine};
pub use store::{GetterFn, MutationFn, Store};
