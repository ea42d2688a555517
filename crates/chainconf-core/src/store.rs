//! Read-only key store
//!
//! [`KeyStore`] is the immutable result of a load. Keys are addressed by
//! ordered path segments joined with `/`; enumeration is always in sorted
//! key order. The type has no mutating methods, so a store can be shared
//! freely once built.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Serialize, Serializer};

use crate::error::{Error, Result};
use crate::resolver::Resolution;

/// Separator between key segments (e.g., "padding/horizontal")
pub const KEY_SEPARATOR: char = '/';

/// Join key segments into a single lookup key
pub fn join_key<S: AsRef<str>>(segments: &[S]) -> String {
    let mut key = String::new();
    for (i, segment) in segments.iter().enumerate() {
        if i > 0 {
            key.push(KEY_SEPARATOR);
        }
        key.push_str(segment.as_ref());
    }
    key
}

/// Immutable mapping of resolved configuration keys to string values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyStore {
    data: BTreeMap<String, String>,
    sources: BTreeMap<String, PathBuf>,
}

impl KeyStore {
    /// Get the value at a key, failing if it is absent
    ///
    /// ```
    /// use chainconf_core::KeyStore;
    ///
    /// let store: KeyStore = [("padding/horizontal", "40")].into_iter().collect();
    /// assert_eq!(store.get(&["padding", "horizontal"]).unwrap(), "40");
    /// assert!(store.get(&["padding", "vertical"]).is_err());
    /// ```
    pub fn get<S: AsRef<str>>(&self, segments: &[S]) -> Result<&str> {
        let key = join_key(segments);
        match self.data.get(&key) {
            Some(value) => Ok(value.as_str()),
            None => Err(Error::key_not_found(key)),
        }
    }

    /// Get the value at a key, naming what the caller needed if it is absent
    pub fn require<S: AsRef<str>>(&self, what: &str, segments: &[S]) -> Result<&str> {
        self.get(segments).map_err(|e| {
            let key = e.key.clone().unwrap_or_default();
            e.with_help(format!("Specify {} with an entry for '{}'", what, key))
        })
    }

    /// Get the value at a key, or `fallback` if it is absent
    pub fn get_or_default<'s, S: AsRef<str>>(
        &'s self,
        fallback: &'s str,
        segments: &[S],
    ) -> &'s str {
        self.try_get(segments).unwrap_or(fallback)
    }

    /// Get the value at a key, if present
    pub fn try_get<S: AsRef<str>>(&self, segments: &[S]) -> Option<&str> {
        self.data.get(&join_key(segments)).map(|s| s.as_str())
    }

    /// Check whether a full key is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Check whether `key` is present with exactly `value`
    pub fn contains(&self, key: &str, value: &str) -> bool {
        self.data.get(key).is_some_and(|v| v == value)
    }

    /// Get the document that supplied the value at a key
    ///
    /// Returns `None` for absent keys and for stores built from memory.
    pub fn source_of<S: AsRef<str>>(&self, segments: &[S]) -> Option<&Path> {
        self.sources.get(&join_key(segments)).map(|p| p.as_path())
    }

    /// Get all source mappings, sorted by key
    pub fn sources(&self) -> &BTreeMap<String, PathBuf> {
        &self.sources
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Keys in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(|k| k.as_str())
    }

    /// Values in sorted key order
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.data.values().map(|v| v.as_str())
    }

    /// Key/value pairs in sorted key order
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.data.iter(),
        }
    }
}

impl From<Resolution> for KeyStore {
    fn from(resolution: Resolution) -> Self {
        let (data, sources) = resolution.into_parts();
        Self { data, sources }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for KeyStore {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            data: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            sources: BTreeMap::new(),
        }
    }
}

impl Serialize for KeyStore {
    fn serialize<Ser: Serializer>(
        &self,
        serializer: Ser,
    ) -> std::result::Result<Ser::Ok, Ser::Error> {
        self.data.serialize(serializer)
    }
}

/// Iterator over key/value pairs of a [`KeyStore`]
pub struct Iter<'a> {
    inner: btree_map::Iter<'a, String, String>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a KeyStore {
    type Item = (&'a str, &'a str);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;

    fn sample() -> KeyStore {
        [
            ("text/font", "fonts/title.ttf"),
            ("logo", "img/logo.png"),
            ("padding/horizontal", "40"),
            ("background", "img/bg.png"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_get_joins_segments() {
        let store = sample();
        assert_eq!(store.get(&["padding", "horizontal"]).unwrap(), "40");
        assert_eq!(store.get(&["padding/horizontal"]).unwrap(), "40");
        assert_eq!(store.get(&["logo"]).unwrap(), "img/logo.png");
    }

    #[test]
    fn test_get_missing_key() {
        let err = sample().get(&["missing", "key"]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::KeyNotFound);
        assert_eq!(err.key, Some("missing/key".into()));
    }

    #[test]
    fn test_try_get_and_default() {
        let store = sample();
        let before = store.clone();

        assert_eq!(store.try_get(&["missing", "key"]), None);
        assert_eq!(store.try_get(&["text", "font"]), Some("fonts/title.ttf"));
        assert_eq!(store.get_or_default("fallback", &["missing", "key"]), "fallback");
        assert_eq!(store.get_or_default("fallback", &["logo"]), "img/logo.png");
        assert_eq!(store, before);
    }

    #[test]
    fn test_require_names_what_was_needed() {
        let err = sample()
            .require("the game logo", &["text", "logo"])
            .unwrap_err();
        let display = err.to_string();

        assert_eq!(err.kind, ErrorKind::KeyNotFound);
        assert!(display.contains("Specify the game logo with an entry for 'text/logo'"));
    }

    #[test]
    fn test_enumeration_is_sorted() {
        let store = sample();
        let keys: Vec<_> = store.keys().collect();
        assert_eq!(
            keys,
            vec!["background", "logo", "padding/horizontal", "text/font"]
        );

        let values: Vec<_> = store.values().collect();
        assert_eq!(
            values,
            vec!["img/bg.png", "img/logo.png", "40", "fonts/title.ttf"]
        );

        let pairs: Vec<_> = (&store).into_iter().collect();
        assert_eq!(pairs[0], ("background", "img/bg.png"));
        assert_eq!(store.iter().len(), 4);
    }

    #[test]
    fn test_containment() {
        let store = sample();
        assert_eq!(store.len(), 4);
        assert!(!store.is_empty());
        assert!(store.contains_key("padding/horizontal"));
        assert!(!store.contains_key("padding"));
        assert!(store.contains("logo", "img/logo.png"));
        assert!(!store.contains("logo", "img/other.png"));
        assert!(KeyStore::default().is_empty());
    }

    #[test]
    fn test_join_key() {
        assert_eq!(join_key(&["a", "b", "c"]), "a/b/c");
        assert_eq!(join_key(&[String::from("only")]), "only");
        assert_eq!(join_key::<&str>(&[]), "");
    }

    #[test]
    fn test_serialize_as_flat_map() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert_eq!(
            json,
            r#"{"background":"img/bg.png","logo":"img/logo.png","padding/horizontal":"40","text/font":"fonts/title.ttf"}"#
        );
    }

    #[test]
    fn test_store_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<KeyStore>();
    }
}
