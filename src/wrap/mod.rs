//! Accessor generation over a [`StoreEngine`](crate::store::StoreEngine).
//!
//! Given a namespace and a [`HandlerMap`], the wrappers derive one qualified
//! key per identifier and expose it through a small accessor:
//! - [`wrap_mutations`] - payload-only call sites with per-key `listen`
//! - [`wrap_getters`] - live, read-only views of the store's getters

mod getters;
mod handlers;
mod key;
mod mutations;

pub use getters::{wrap_getters, GetterAccessor, Getters};
pub use handlers::HandlerMap;
pub use key::{qualify, QualifiedKey, NAMESPACE_SEPARATOR};
pub use mutations::{wrap_mutations, Committer, MutationAccessor};
