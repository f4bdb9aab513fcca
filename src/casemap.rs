//! IRC case-mapping functions and a case-insensitive map.
//!
//! IRC compares nicknames and channel names case-insensitively, with a
//! twist inherited from RFC 1459: some ASCII punctuation pairs are
//! considered upper/lower case of each other. This engine folds the pairs
//! it actually compares: `{`/`[` and `}`/`]`. Back-tick and pipe are left
//! untouched.

use std::collections::hash_map;
use std::collections::HashMap;

/// Convert a string to IRC lowercase.
///
/// In addition to ASCII lowercase conversion, this maps:
/// - `{` → `[`
/// - `}` → `]`
pub fn irc_to_lower(s: &str) -> String {
    s.chars().map(fold_char).collect()
}

/// Compare two strings using IRC case-insensitive comparison.
pub fn irc_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.chars()
        .zip(b.chars())
        .all(|(ca, cb)| fold_char(ca) == fold_char(cb))
}

fn fold_char(c: char) -> char {
    match c {
        '{' => '[',
        '}' => ']',

        'A'..='Z' => c.to_ascii_lowercase(),

        _ => c,
    }
}

/// A map whose keys are compared under [`irc_to_lower`].
///
/// Every key passed to an operation is folded before it touches the
/// underlying map, so `map.get("Nick")` and `map.get("nick")` address the
/// same entry. Values that need to remember the display-cased spelling
/// (channel names, nicknames) carry it themselves.
#[derive(Clone, Debug, Default)]
pub struct CaseFoldMap<V> {
    inner: HashMap<String, V>,
}

impl<V> CaseFoldMap<V> {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: HashMap::new(),
        }
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Insert a value under the folded key, returning the previous value.
    pub fn insert(&mut self, key: &str, value: V) -> Option<V> {
        self.inner.insert(irc_to_lower(key), value)
    }

    /// Look up a value by folded key.
    pub fn get(&self, key: &str) -> Option<&V> {
        self.inner.get(&irc_to_lower(key))
    }

    /// Look up a value mutably by folded key.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        self.inner.get_mut(&irc_to_lower(key))
    }

    /// Remove an entry, returning its value if it was present.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        self.inner.remove(&irc_to_lower(key))
    }

    /// Whether the folded key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.contains_key(&irc_to_lower(key))
    }

    /// Iterate over `(folded_key, value)` pairs.
    pub fn iter(&self) -> hash_map::Iter<'_, String, V> {
        self.inner.iter()
    }

    /// Iterate over values.
    pub fn values(&self) -> hash_map::Values<'_, String, V> {
        self.inner.values()
    }

    /// Iterate over values mutably.
    pub fn values_mut(&mut self) -> hash_map::ValuesMut<'_, String, V> {
        self.inner.values_mut()
    }

    /// Iterate over folded keys.
    pub fn keys(&self) -> hash_map::Keys<'_, String, V> {
        self.inner.keys()
    }

    /// Remove all entries.
    pub fn clear(&mut self) {
        self.inner.clear();
    }
}

impl<'a, V> IntoIterator for &'a CaseFoldMap<V> {
    type Item = (&'a String, &'a V);
    type IntoIter = hash_map::Iter<'a, String, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}
