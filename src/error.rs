//! Error types for wrapping and dispatch.

use thiserror::Error;

/// Errors raised while building or using wrapped accessors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WrapError {
    /// A handler was supplied without a usable identifier.
    #[error("handler in namespace {namespace:?} has no identifier")]
    InvalidHandlerIdentity { namespace: String },

    /// Two handlers in one map qualify to the same key.
    #[error("duplicate key: {key}")]
    DuplicateKey { key: String },

    /// A write was attempted on a getter accessor.
    #[error("getter is read-only: {name}")]
    ReadOnlyProperty { name: String },
}

/// Errors raised by the bundled in-memory [`Store`](crate::Store).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No mutation handler is registered under the resolved key.
    #[error("unknown mutation: {key}")]
    UnknownMutation { key: String },
}

/// Convenience type alias for wrapping operations.
pub type Result<T> = std::result::Result<T, WrapError>;
