use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::index_name::IndexName;
use crate::mapping::Mappings;
use crate::settings::Settings;

/// `(name, settings, mappings)`, immutable once built (§3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexMetaData {
    name: IndexName,
    settings: Settings,
    mappings: Mappings,
}

impl IndexMetaData {
    pub fn new(name: IndexName, settings: Settings, mappings: Mappings) -> Self {
        Self { name, settings, mappings }
    }

    pub fn name(&self) -> &IndexName {
        &self.name
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn mappings(&self) -> &Mappings {
        &self.mappings
    }

    pub fn number_of_shards(&self) -> i64 {
        self.settings.number_of_shards()
    }

    pub fn number_of_replicas(&self) -> i64 {
        self.settings.number_of_replicas()
    }
}

/// Indices and their [`IndexMetaData`], plus the alias set, disjoint from index names (§3).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetaData {
    indices: BTreeMap<String, IndexMetaData>,
    aliases: BTreeSet<String>,
}

impl MetaData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains_index(&self, name: &str) -> bool {
        self.indices.contains_key(name)
    }

    pub fn contains_alias(&self, name: &str) -> bool {
        self.aliases.contains(name)
    }

    pub fn index(&self, name: &str) -> Option<&IndexMetaData> {
        self.indices.get(name)
    }

    pub fn indices(&self) -> impl Iterator<Item = &IndexMetaData> {
        self.indices.values()
    }

    pub fn aliases(&self) -> impl Iterator<Item = &String> {
        self.aliases.iter()
    }

    /// Returns a new `MetaData` with `index` added.
    ///
    /// Per §3's invariant, at most one `IndexMetaData` per name; callers are expected to have
    /// already rejected a pre-existing name via §4.6 step 1 before calling this.
    pub fn with_index(&self, index: IndexMetaData) -> Self {
        let mut indices = self.indices.clone();
        indices.insert(index.name().as_str().to_owned(), index);
        Self { indices, aliases: self.aliases.clone() }
    }

    pub fn with_alias(&self, alias: impl Into<String>) -> Self {
        let mut aliases = self.aliases.clone();
        aliases.insert(alias.into());
        Self { indices: self.indices.clone(), aliases }
    }
}
