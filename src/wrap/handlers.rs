use super::key::{qualify, QualifiedKey};
use crate::error::{Result, WrapError};
use std::collections::HashSet;

/// An ordered list of `(identifier, handler)` pairs.
///
/// Identifiers are supplied explicitly rather than read off the handler.
/// Insertion never fails; duplicates are rejected when the map is wrapped
/// or registered on a store.
#[derive(Clone)]
pub struct HandlerMap<H> {
    entries: Vec<(String, H)>,
}

impl<H> HandlerMap<H> {
    /// Create an empty map.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, identifier: impl Into<String>, handler: H) -> Self {
        self.insert(identifier, handler);
        self
    }

    /// Append a handler under `identifier`.
    pub fn insert(&mut self, identifier: impl Into<String>, handler: H) {
        self.entries.push((identifier.into(), handler));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate identifiers and handlers in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &H)> {
        self.entries.iter().map(|(id, h)| (id.as_str(), h))
    }

    /// Qualify every identifier under `namespace`.
    ///
    /// Fails on the first identifier that cannot be qualified or whose key
    /// was already produced by an earlier entry.
    pub(crate) fn qualified(&self, namespace: &str) -> Result<Vec<(&str, QualifiedKey, &H)>> {
        let mut seen = HashSet::with_capacity(self.entries.len());
        let mut out = Vec::with_capacity(self.entries.len());

        for (identifier, handler) in &self.entries {
            let key = qualify(identifier, namespace)?;
            if !seen.insert(key.clone()) {
                return Err(WrapError::DuplicateKey {
                    key: key.to_string(),
                });
            }
            out.push((identifier.as_str(), key, handler));
        }
        Ok(out)
    }
}

impl<H> Default for HandlerMap<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H, S: Into<String>> FromIterator<(S, H)> for HandlerMap<H> {
    fn from_iter<I: IntoIterator<Item = (S, H)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(id, h)| (id.into(), h)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualified_preserves_order() {
        let map = HandlerMap::new().with("b", 2).with("a", 1);
        let keys: Vec<String> = map
            .qualified("ns")
            .unwrap()
            .into_iter()
            .map(|(_, key, _)| key.to_string())
            .collect();
        assert_eq!(keys, vec!["ns/b", "ns/a"]);
    }

    #[test]
    fn duplicate_identifier_rejected() {
        let map: HandlerMap<u8> = [("add", 1), ("add", 2)].into_iter().collect();
        assert_eq!(
            map.qualified("cart").err(),
            Some(WrapError::DuplicateKey {
                key: "cart/add".into()
            })
        );
    }

    #[test]
    fn blank_identifier_rejected() {
        let map = HandlerMap::new().with("ok", ()).with("", ());
        assert!(matches!(
            map.qualified(""),
            Err(WrapError::InvalidHandlerIdentity { .. })
        ));
    }
}
