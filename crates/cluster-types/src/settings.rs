use std::collections::BTreeMap;

use byte_unit::Byte;
use serde::{Deserialize, Serialize};
use time::Duration;

/// The default primary shard count for an index whose request omits `index.number_of_shards`.
pub const DEFAULT_NUMBER_OF_SHARDS: i64 = 5;
/// The default replica count for an index whose request omits `index.number_of_replicas`.
pub const DEFAULT_NUMBER_OF_REPLICAS: i64 = 1;

const KEY_NUMBER_OF_SHARDS: &str = "index.number_of_shards";
const KEY_NUMBER_OF_REPLICAS: &str = "index.number_of_replicas";

/// A single typed scalar, as recognized by the settings layer.
///
/// Settings are otherwise opaque to the core: any key this crate does not special-case
/// (§6's `number_of_shards`/`number_of_replicas`) is carried through unchanged into
/// `IndexMetaData.settings`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    String(String),
    Integer(i64),
    ByteSize(Byte),
    /// Milliseconds; kept as a plain integer rather than `time::Duration` to avoid pulling in
    /// a human-readable duration format at this layer.
    DurationMillis(i64),
    Bool(bool),
}

impl SettingValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SettingValue::Integer(v) => Some(*v),
            SettingValue::String(s) => s.parse().ok(),
            _ => None,
        }
    }
}

/// An immutable, dotted-key mapping of settings.
///
/// Built by layering a request's settings over the cluster defaults (§4.6 step 3): once
/// constructed, a `Settings` value never mutates in place; overlay produces a new value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings(BTreeMap<String, SettingValue>);

impl Settings {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn from_map(map: BTreeMap<String, SettingValue>) -> Self {
        Self(map)
    }

    pub fn get(&self, key: &str) -> Option<&SettingValue> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: SettingValue) {
        self.0.insert(key.into(), value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SettingValue)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Resolves `index.number_of_shards`, falling back to [`DEFAULT_NUMBER_OF_SHARDS`].
    ///
    /// This fallback only applies to a `Settings` value nobody has resolved against a
    /// [`ClusterDefaults`] yet (e.g. in a test fixture); the coordinator always calls
    /// [`Settings::resolved`] before settings are stored in an `IndexMetaData`, so the
    /// configured cluster default wins in the real request path.
    pub fn number_of_shards(&self) -> i64 {
        self.get(KEY_NUMBER_OF_SHARDS)
            .and_then(SettingValue::as_i64)
            .unwrap_or(DEFAULT_NUMBER_OF_SHARDS)
    }

    /// Resolves `index.number_of_replicas`, falling back to [`DEFAULT_NUMBER_OF_REPLICAS`].
    /// See [`Settings::number_of_shards`] for why this fallback is rarely the operative path.
    pub fn number_of_replicas(&self) -> i64 {
        self.get(KEY_NUMBER_OF_REPLICAS)
            .and_then(SettingValue::as_i64)
            .unwrap_or(DEFAULT_NUMBER_OF_REPLICAS)
    }

    /// Overlays `other` on top of `self`: keys in `other` win.
    pub fn overlay(&self, other: &Settings) -> Settings {
        let mut merged = self.0.clone();
        for (key, value) in other.0.iter() {
            merged.insert(key.clone(), value.clone());
        }
        Settings(merged)
    }

    /// Settings resolution (§4.6 step 3): returns a new `Settings` with
    /// `index.number_of_shards`/`index.number_of_replicas` set explicitly from `defaults`
    /// wherever the request left them unset. A key already present is left untouched, since
    /// the request's own value always wins over the cluster default.
    pub fn resolved(&self, defaults: ClusterDefaults) -> Settings {
        let mut resolved = self.clone();
        if resolved.get(KEY_NUMBER_OF_SHARDS).is_none() {
            resolved.insert(KEY_NUMBER_OF_SHARDS, SettingValue::Integer(defaults.number_of_shards));
        }
        if resolved.get(KEY_NUMBER_OF_REPLICAS).is_none() {
            resolved.insert(KEY_NUMBER_OF_REPLICAS, SettingValue::Integer(defaults.number_of_replicas));
        }
        resolved
    }
}

/// The cluster-wide defaults applied when a request omits `number_of_shards`/
/// `number_of_replicas` (§4.6 step 3), sourced from the operator-configured
/// `CLUSTER_DEFAULT_NUMBER_OF_SHARDS`/`CLUSTER_DEFAULT_NUMBER_OF_REPLICAS` knobs (§A2) rather
/// than hardcoded, so an operator override actually takes effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClusterDefaults {
    pub number_of_shards: i64,
    pub number_of_replicas: i64,
}

impl ClusterDefaults {
    pub fn new(number_of_shards: i64, number_of_replicas: i64) -> Self {
        Self { number_of_shards, number_of_replicas }
    }
}

impl Default for ClusterDefaults {
    fn default() -> Self {
        Self { number_of_shards: DEFAULT_NUMBER_OF_SHARDS, number_of_replicas: DEFAULT_NUMBER_OF_REPLICAS }
    }
}

/// A request timeout, defaulting to 5 seconds per §3's `CreateIndexRequest`.
pub fn default_request_timeout() -> Duration {
    Duration::seconds(5)
}
