//! Dictionaries.

use crate::object::{Name, Object};

/// A PDF dictionary.
///
/// Entries keep the order in which they were inserted, so that writing a dictionary is
/// stable. Equality does not depend on that order.
#[derive(Clone, Debug, Default)]
pub struct Dict(Vec<(Name, Object)>);

impl Dict {
    /// Create an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the dictionary has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Look up the value for `key`.
    pub fn get(&self, key: &[u8]) -> Option<&Object> {
        self.0
            .iter()
            .find(|(k, _)| k.as_bytes() == key)
            .map(|(_, v)| v)
    }

    /// Whether the dictionary has an entry for `key`.
    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.get(key).is_some()
    }

    /// Set the value for `key`, returning the previous value.
    ///
    /// Setting a key to `null` removes it, since the two are equivalent in PDF.
    pub fn insert(&mut self, key: Name, value: Object) -> Option<Object> {
        if value == Object::Null {
            return self.remove(&key);
        }

        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => Some(core::mem::replace(v, value)),
            None => {
                self.0.push((key, value));
                None
            }
        }
    }

    /// Remove the entry for `key`.
    pub fn remove(&mut self, key: &[u8]) -> Option<Object> {
        let pos = self.0.iter().position(|(k, _)| k.as_bytes() == key)?;

        Some(self.0.remove(pos).1)
    }

    /// Iterate over the entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Name, &Object)> {
        self.0.iter().map(|(k, v)| (k, v))
    }

    /// Write the dictionary in PDF syntax, one entry per line.
    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(b"<<\n");

        for (k, v) in self.iter() {
            k.write_to(out);
            out.push(b' ');
            v.write_to(out);
            out.push(b'\n');
        }

        out.extend_from_slice(b">>");
    }

    /// Iterate over the keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &Name> {
        self.0.iter().map(|(k, _)| k)
    }
}

impl PartialEq for Dict {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl FromIterator<(Name, Object)> for Dict {
    fn from_iter<T: IntoIterator<Item = (Name, Object)>>(iter: T) -> Self {
        let mut dict = Self::new();

        for (k, v) in iter {
            dict.insert(k, v);
        }

        dict
    }
}
