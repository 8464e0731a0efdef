use cluster_types::{ClusterState, RoutingTable};

/// Consumed by the post-acknowledgment routing commit (§4.7, §6): a pure function from a
/// cluster state whose metadata and empty routing placeholder already include the new index
/// to a populated `RoutingTable`. Must not mutate its input or have other side effects.
///
/// The expansion ships one concrete implementation, a round-robin placement strategy, in the
/// `cluster-routing` crate, to keep this crate runnable end-to-end; production deployments are
/// expected to supply their own allocator.
pub trait RoutingStrategy: Send + Sync {
    fn reroute(&self, state: &ClusterState) -> RoutingTable;
}
