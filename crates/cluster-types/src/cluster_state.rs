use serde::{Deserialize, Serialize};

use crate::metadata::MetaData;
use crate::nodes::Nodes;
use crate::routing::RoutingTable;

/// A versioned immutable snapshot of everything the master knows (§3).
///
/// Every mutation produces a new `ClusterState` with a strictly greater `version`; nothing
/// in this type is ever mutated in place, matching §4.1's "a task is a function
/// `ClusterState -> ClusterState`".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterState {
    version: u64,
    metadata: MetaData,
    routing_table: RoutingTable,
    nodes: Nodes,
}

impl ClusterState {
    pub fn initial(nodes: Nodes) -> Self {
        Self { version: 0, metadata: MetaData::new(), routing_table: RoutingTable::new(), nodes }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn metadata(&self) -> &MetaData {
        &self.metadata
    }

    pub fn routing_table(&self) -> &RoutingTable {
        &self.routing_table
    }

    pub fn nodes(&self) -> &Nodes {
        &self.nodes
    }

    /// Returns a new state bumping the version and replacing metadata.
    pub fn with_metadata(&self, metadata: MetaData) -> Self {
        Self {
            version: self.version + 1,
            metadata,
            routing_table: self.routing_table.clone(),
            nodes: self.nodes.clone(),
        }
    }

    /// Returns a new state bumping the version and replacing the routing table.
    pub fn with_routing_table(&self, routing_table: RoutingTable) -> Self {
        Self {
            version: self.version + 1,
            metadata: self.metadata.clone(),
            routing_table,
            nodes: self.nodes.clone(),
        }
    }
}
