use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A set of `(type_name, source_document)` pairs attached to an index, type names unique.
///
/// `source_document` is opaque textual payload; this crate never interprets it beyond
/// layering and overlay rules — parsing is the external mapper service's job (§6).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mappings(BTreeMap<String, String>);

impl Mappings {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn from_map(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, type_name: &str) -> Option<&str> {
        self.0.get(type_name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }

    /// Inserts `source` for `type_name` only if that type is not already present.
    ///
    /// Used by the mapping loader (§4.3) when merging files within a single directory:
    /// "first-read wins per directory".
    pub fn insert_if_absent(&mut self, type_name: impl Into<String>, source: impl Into<String>) {
        self.0.entry(type_name.into()).or_insert_with(|| source.into());
    }

    /// Unconditionally sets `source` for `type_name`, overwriting any prior value.
    ///
    /// Used across layers, where a later layer overwrites an earlier one, and for the
    /// request's own mappings, which always take precedence (§4.3).
    pub fn set(&mut self, type_name: impl Into<String>, source: impl Into<String>) {
        self.0.insert(type_name.into(), source.into());
    }

    /// Overlays `other` on top of `self`: every key in `other` overwrites `self`'s value.
    pub fn overlay(&self, other: &Mappings) -> Mappings {
        let mut merged = self.clone();
        for (type_name, source) in other.iter() {
            merged.set(type_name.clone(), source.clone());
        }
        merged
    }
}

impl FromIterator<(String, String)> for Mappings {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
