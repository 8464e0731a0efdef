use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::nodes::NodeId;

/// The lifecycle phase of a single shard copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShardState {
    /// Allocated but not yet confirmed started by its hosting node.
    Initializing,
    /// Confirmed serving traffic.
    Started,
    /// No node currently hosts this copy.
    Unassigned,
}

/// A single shard copy: its role (primary index implicit in its slot), phase, and host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardCopy {
    pub node: Option<NodeId>,
    pub state: ShardState,
    pub primary: bool,
}

impl ShardCopy {
    pub fn unassigned_primary() -> Self {
        Self { node: None, state: ShardState::Unassigned, primary: true }
    }

    pub fn unassigned_replica() -> Self {
        Self { node: None, state: ShardState::Unassigned, primary: false }
    }
}

/// One shard's full set of copies: exactly one primary, `number_of_replicas` replicas.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShardRoutingTable {
    copies: Vec<ShardCopy>,
}

impl ShardRoutingTable {
    pub fn new(copies: Vec<ShardCopy>) -> Self {
        Self { copies }
    }

    pub fn copies(&self) -> &[ShardCopy] {
        &self.copies
    }
}

/// The routing table for a single index: one [`ShardRoutingTable`] per primary shard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexRoutingTable {
    shards: Vec<ShardRoutingTable>,
}

impl IndexRoutingTable {
    /// An empty routing table, initialized against a committed `IndexMetaData` but with no
    /// shard placements yet — the state §4.7 produces before the routing strategy runs.
    pub fn empty(number_of_shards: i64, number_of_replicas: i64) -> Self {
        let shards = (0..number_of_shards.max(0))
            .map(|_| {
                let mut copies = vec![ShardCopy::unassigned_primary()];
                copies.extend((0..number_of_replicas.max(0)).map(|_| ShardCopy::unassigned_replica()));
                ShardRoutingTable::new(copies)
            })
            .collect();
        Self { shards }
    }

    pub fn shards(&self) -> &[ShardRoutingTable] {
        &self.shards
    }

    pub fn with_shards(shards: Vec<ShardRoutingTable>) -> Self {
        Self { shards }
    }
}

/// The per-index shard placements portion of cluster state (§3).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoutingTable {
    indices: BTreeMap<String, IndexRoutingTable>,
}

impl RoutingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains_index(&self, name: &str) -> bool {
        self.indices.contains_key(name)
    }

    pub fn index(&self, name: &str) -> Option<&IndexRoutingTable> {
        self.indices.get(name)
    }

    pub fn indices(&self) -> impl Iterator<Item = (&String, &IndexRoutingTable)> {
        self.indices.iter()
    }

    /// Returns a new table with every existing index's routing copied and `name`'s table added.
    ///
    /// Mirrors §4.7: "Rebuild the routing table by copying every existing index's routing and
    /// appending a new `IndexRoutingTable`".
    pub fn with_index(&self, name: impl Into<String>, table: IndexRoutingTable) -> Self {
        let mut indices = self.indices.clone();
        indices.insert(name.into(), table);
        Self { indices }
    }
}
