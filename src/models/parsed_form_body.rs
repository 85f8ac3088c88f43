use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;

use super::field_value::FieldValue;

/// Flat mapping of form field names to values, in first-arrival order.
///
/// A body is built for exactly one request and handed to the caller once the
/// decoder finishes. Keys are never removed.
#[derive(Debug, Clone, Default)]
pub struct ParsedFormBody {
    entries: Vec<(String, FieldValue)>,
    index: HashMap<String, usize>,
}

impl ParsedFormBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.index.get(name).map(|&i| &self.entries[i].1)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Field names in first-arrival order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Record one occurrence of `name`: absent names get a single value,
    /// present names are promoted to (or extended as) a sequence.
    pub fn append(&mut self, name: &str, value: String) {
        match self.index.get(name) {
            Some(&i) => self.entries[i].1.push(value),
            None => {
                self.index.insert(name.to_string(), self.entries.len());
                self.entries.push((name.to_string(), FieldValue::One(value)));
            }
        }
    }

    /// Set `name` to `value`, replacing whatever was stored under it.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        let name = name.into();
        let value = value.into();
        match self.index.get(&name) {
            Some(&i) => self.entries[i].1 = value,
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push((name, value));
            }
        }
    }
}

impl PartialEq for ParsedFormBody {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for ParsedFormBody {}

impl<K, V> FromIterator<(K, V)> for ParsedFormBody
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut body = ParsedFormBody::new();
        for (k, v) in iter {
            body.insert(k, v);
        }
        body
    }
}

impl IntoIterator for ParsedFormBody {
    type Item = (String, FieldValue);
    type IntoIter = std::vec::IntoIter<(String, FieldValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for ParsedFormBody {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}
