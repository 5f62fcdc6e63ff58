use crate::error::{Result, WrapError};
use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Separator placed between a namespace and a handler identifier.
pub const NAMESPACE_SEPARATOR: &str = "/";

/// A fully resolved dispatch key.
///
/// Cloning is cheap; the text is shared.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedKey(Arc<str>);

impl QualifiedKey {
    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QualifiedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for QualifiedKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for QualifiedKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for QualifiedKey {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for QualifiedKey {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

/// Derive the dispatch key for `identifier` inside `namespace`.
///
/// An empty namespace leaves the identifier untouched; otherwise the result is
/// `namespace/identifier`. Identifiers that are empty or only whitespace
/// cannot name a handler and are rejected.
///
/// # Examples
///
/// ```
/// use storewrap::qualify;
///
/// assert_eq!(qualify("addItem", "cart").unwrap(), "cart/addItem");
/// assert_eq!(qualify("total", "").unwrap(), "total");
/// assert!(qualify("", "cart").is_err());
/// ```
pub fn qualify(identifier: &str, namespace: &str) -> Result<QualifiedKey> {
    if identifier.trim().is_empty() {
        return Err(WrapError::InvalidHandlerIdentity {
            namespace: namespace.to_string(),
        });
    }

    let key = if namespace.is_empty() {
        identifier.to_string()
    } else {
        format!("{namespace}{NAMESPACE_SEPARATOR}{identifier}")
    };
    Ok(QualifiedKey(key.into()))
}
