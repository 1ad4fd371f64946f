//! Insertion-ordered, string-keyed map used for attributes, events and objects
use std::{
    borrow::Cow,
    collections::HashMap,
    fmt,
    hash::{Hash, Hasher},
    marker::PhantomData,
};

use schemars::{json_schema, JsonSchema, Schema, SchemaGenerator};
use serde::{
    de::{MapAccess, Visitor},
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize, Serializer,
};

///
/// String-keyed map which remembers the order in which keys were first inserted
///
/// Entries are stored in a [`Vec`], with an additional [`HashMap`] from key to position,
/// so lookups are O(1) while iteration follows insertion order.
///
/// _Note_: Equality and hashing do __not__ depend on the insertion order.
/// Two maps are equal if they contain the same set of key/value pairs.
///
/// ```rust
/// use ocel::core::event_data::object_centric::IndexedMap;
/// let mut m: IndexedMap<i64> = IndexedMap::new();
/// m.insert("b", 2);
/// m.insert("a", 1);
/// assert_eq!(m.keys().collect::<Vec<_>>(), vec!["b", "a"]);
/// assert_eq!(m.get("a"), Some(&1));
/// ```
#[derive(Clone)]
pub struct IndexedMap<V> {
    entries: Vec<(String, V)>,
    index: HashMap<String, usize>,
}

impl<V> Default for IndexedMap<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<V> IndexedMap<V> {
    /// Create a new, empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new, empty map with space for at least `capacity` entries
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the map contains no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the value stored for `key`
    pub fn get(&self, key: &str) -> Option<&V> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    /// Get the value stored for `key` as mutable
    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        match self.index.get(key) {
            Some(&i) => Some(&mut self.entries[i].1),
            None => None,
        }
    }

    /// Returns `true` if the map contains `key`
    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    ///
    /// Insert a value for `key`
    ///
    /// If the key was already present, its value is replaced in place (keeping its position)
    /// and the previous value is returned.
    ///
    pub fn insert(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        let key = key.into();
        match self.index.get(&key) {
            Some(&i) => Some(std::mem::replace(&mut self.entries[i].1, value)),
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
                None
            }
        }
    }

    ///
    /// Remove `key` from the map, returning its value
    ///
    /// Keeps the relative order of all remaining entries (O(n))
    ///
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let pos = self.index.remove(key)?;
        let (_, value) = self.entries.remove(pos);
        for (k, _) in &self.entries[pos..] {
            if let Some(i) = self.index.get_mut(k) {
                *i -= 1;
            }
        }
        Some(value)
    }

    /// Iterate over all entries in insertion order
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&String, &V)> + ExactSizeIterator {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// Iterate over all entries in insertion order, with mutable values
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&String, &mut V)> {
        self.entries.iter_mut().map(|(k, v)| (&*k, v))
    }

    /// Iterate over all keys in insertion order
    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &String> + ExactSizeIterator {
        self.entries.iter().map(|(k, _)| k)
    }

    /// Iterate over all values in insertion order
    pub fn values(&self) -> impl DoubleEndedIterator<Item = &V> + ExactSizeIterator {
        self.entries.iter().map(|(_, v)| v)
    }

    /// Retain only the entries for which `f` returns `true`
    pub fn retain(&mut self, mut f: impl FnMut(&str, &V) -> bool) {
        self.entries.retain(|(k, v)| f(k, v));
        self.index = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, (k, _))| (k.clone(), i))
            .collect();
    }
}

impl<V: PartialEq> PartialEq for IndexedMap<V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(k, v)| other.get(k).is_some_and(|other_v| v == other_v))
    }
}

impl<V: Eq> Eq for IndexedMap<V> {}

impl<V: Hash> Hash for IndexedMap<V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Canonical order, so that equal maps hash equally regardless of insertion order
        let mut sorted: Vec<&(String, V)> = self.entries.iter().collect();
        sorted.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        state.write_usize(sorted.len());
        for (k, v) in sorted {
            k.hash(state);
            v.hash(state);
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for IndexedMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for IndexedMap<V> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut m = IndexedMap::new();
        m.extend(iter);
        m
    }
}

impl<K: Into<String>, V> Extend<(K, V)> for IndexedMap<V> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<V> IntoIterator for IndexedMap<V> {
    type Item = (String, V);
    type IntoIter = std::vec::IntoIter<(String, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a, V> IntoIterator for &'a IndexedMap<V> {
    type Item = (&'a String, &'a V);
    type IntoIter = std::iter::Map<std::slice::Iter<'a, (String, V)>, fn(&'a (String, V)) -> (&'a String, &'a V)>;

    fn into_iter(self) -> Self::IntoIter {
        fn entry_refs<V>((k, v): &(String, V)) -> (&String, &V) {
            (k, v)
        }
        self.entries
            .iter()
            .map(entry_refs::<V> as fn(&'a (String, V)) -> (&'a String, &'a V))
    }
}

impl<V: Serialize> Serialize for IndexedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self.iter() {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

struct IndexedMapVisitor<V>(PhantomData<V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for IndexedMapVisitor<V> {
    type Value = IndexedMap<V>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a map with string keys")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut m = IndexedMap::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((k, v)) = access.next_entry::<String, V>()? {
            m.insert(k, v);
        }
        Ok(m)
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for IndexedMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(IndexedMapVisitor(PhantomData))
    }
}

impl<V: JsonSchema> JsonSchema for IndexedMap<V> {
    fn inline_schema() -> bool {
        true
    }

    fn schema_name() -> Cow<'static, str> {
        format!("Map_of_{}", V::schema_name()).into()
    }

    fn json_schema(generator: &mut SchemaGenerator) -> Schema {
        json_schema!({
            "type": "object",
            "additionalProperties": generator.subschema_for::<V>(),
        })
    }
}
