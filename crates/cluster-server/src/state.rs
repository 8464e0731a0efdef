use std::sync::Arc;

use cluster_core::{Coordinator, ListenerRegistry, UpdateQueue};
use cluster_types::{ClusterDefaults, ClusterState, NodeId, Nodes};
use tokio::runtime::Handle;

use crate::config::Opt;
use crate::local_index_store::FileSystemIndexStore;

/// Everything an HTTP handler needs to drive a create-index request: the coordinator plus the
/// startup configuration it was built from (for the settings/timeout defaults in §6.1).
pub struct AppState {
    pub coordinator: Coordinator,
    pub opt: Opt,
}

impl AppState {
    /// Wires up a single-node cluster: the queue, the listener registry, the filesystem-backed
    /// local index store, and the round-robin routing strategy, then builds the coordinator
    /// (C6) on top of them — the composition root for the binary, analogous to the reference
    /// stack's `setup_meilisearch`.
    pub fn bootstrap(opt: Opt) -> anyhow::Result<Self> {
        let local = NodeId::new();
        let nodes = Nodes::single_node(local);
        let queue = UpdateQueue::spawn(ClusterState::initial(nodes));
        let registry = Arc::new(ListenerRegistry::new());
        let local_store = Arc::new(FileSystemIndexStore::new(opt.data_path.clone())?);
        let mapping_loader = cluster_core::MappingLoader::new(opt.config_path.clone());
        let routing_strategy = Arc::new(cluster_routing::RoundRobinRoutingStrategy);
        let cluster_defaults =
            ClusterDefaults::new(opt.default_number_of_shards, opt.default_number_of_replicas);

        let coordinator = Coordinator::new(
            queue,
            registry,
            Handle::current(),
            local_store,
            mapping_loader,
            routing_strategy,
            cluster_defaults,
        );

        Ok(Self { coordinator, opt })
    }
}
