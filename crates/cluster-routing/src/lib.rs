//! A concrete, intentionally simple [`RoutingStrategy`]: round-robin primary/replica placement
//! over live nodes. Ships so the control plane is runnable and testable end-to-end without a
//! production shard allocator (§6). Production deployments are expected to supply their own.

use cluster_core::RoutingStrategy;
use cluster_types::{ClusterState, IndexRoutingTable, NodeId, RoutingTable, ShardCopy, ShardRoutingTable, ShardState};

pub struct RoundRobinRoutingStrategy;

impl RoutingStrategy for RoundRobinRoutingStrategy {
    fn reroute(&self, state: &ClusterState) -> RoutingTable {
        let nodes: Vec<NodeId> = std::iter::once(state.nodes().local()).chain(state.nodes().peers()).collect();
        let mut next_node = 0usize;
        let mut table = RoutingTable::new();

        for (index_name, index_routing) in state.routing_table().indices() {
            let shards = index_routing
                .shards()
                .iter()
                .map(|shard| {
                    let copies = shard
                        .copies()
                        .iter()
                        .map(|copy| {
                            if copy.state != ShardState::Unassigned || nodes.is_empty() {
                                return *copy;
                            }
                            let node = nodes[next_node % nodes.len()];
                            next_node += 1;
                            ShardCopy { node: Some(node), state: ShardState::Initializing, primary: copy.primary }
                        })
                        .collect();
                    ShardRoutingTable::new(copies)
                })
                .collect();
            table = table.with_index(index_name.clone(), IndexRoutingTable::with_shards(shards));
        }

        table
    }
}

#[cfg(test)]
mod tests {
    use cluster_types::{MetaData, Nodes, Settings};

    use super::*;

    #[test]
    fn assigns_every_unassigned_copy_round_robin_over_live_nodes() {
        let local = NodeId::new();
        let peer_a = NodeId::new();
        let peer_b = NodeId::new();
        let nodes = Nodes::new(local, [peer_a, peer_b].into_iter().collect());

        let metadata = MetaData::new().with_index(cluster_types::IndexMetaData::new(
            cluster_types::IndexName::parse("logs").unwrap(),
            Settings::new(),
            cluster_types::Mappings::new(),
        ));
        let state = ClusterState::initial(nodes).with_metadata(metadata);
        let placeholder = IndexRoutingTable::empty(3, 1);
        let state = state.with_routing_table(state.routing_table().with_index("logs", placeholder));

        let strategy = RoundRobinRoutingStrategy;
        let routed = strategy.reroute(&state);

        let index_routing = routed.index("logs").unwrap();
        assert_eq!(index_routing.shards().len(), 3);
        for shard in index_routing.shards() {
            for copy in shard.copies() {
                assert!(copy.node.is_some());
                assert_eq!(copy.state, ShardState::Initializing);
            }
        }
    }

    #[test]
    fn leaves_already_assigned_copies_untouched() {
        let local = NodeId::new();
        let nodes = Nodes::single_node(local);
        let state = ClusterState::initial(nodes);
        let assigned = ShardRoutingTable::new(vec![ShardCopy { node: Some(local), state: ShardState::Started, primary: true }]);
        let routing = RoutingTable::new().with_index("logs", IndexRoutingTable::with_shards(vec![assigned]));
        let state = state.with_routing_table(routing);

        let strategy = RoundRobinRoutingStrategy;
        let routed = strategy.reroute(&state);

        let copy = routed.index("logs").unwrap().shards()[0].copies()[0];
        assert_eq!(copy.state, ShardState::Started);
    }
}
