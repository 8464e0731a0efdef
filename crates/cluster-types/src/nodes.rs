use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The identifier of a cluster member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(Uuid);

impl NodeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The set of live peer identifiers known to the local node, one distinguished as local.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nodes {
    local: NodeId,
    members: BTreeSet<NodeId>,
}

impl Nodes {
    pub fn single_node(local: NodeId) -> Self {
        let mut members = BTreeSet::new();
        members.insert(local);
        Self { local, members }
    }

    pub fn new(local: NodeId, members: BTreeSet<NodeId>) -> Self {
        let mut members = members;
        members.insert(local);
        Self { local, members }
    }

    pub fn local(&self) -> NodeId {
        self.local
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.members.contains(&node)
    }

    /// The count of peers other than the local node — the quorum denominator in §4.6 step 7.
    pub fn peer_count(&self) -> usize {
        self.members.len().saturating_sub(1)
    }

    pub fn peers(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.members.iter().copied().filter(move |id| *id != self.local)
    }

    pub fn with_member(&self, node: NodeId) -> Self {
        let mut members = self.members.clone();
        members.insert(node);
        Self { local: self.local, members }
    }
}
