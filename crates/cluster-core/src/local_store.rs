use cluster_types::{NodeId, Settings};

/// Consumed, not implemented, by this crate (§6): materializes an index locally on disk/memory
/// and exposes the per-index services the coordinator drives during materialization.
///
/// Out of scope: the physical storage layout, the shard files, and anything below
/// `IndexService` belong to the local store's own implementation, not this control plane.
pub trait LocalIndexStore: Send + Sync {
    fn create(&self, name: &str, settings: &Settings, local_node_id: NodeId) -> anyhow::Result<()>;
    fn delete(&self, name: &str) -> anyhow::Result<()>;
    fn index_service(&self, name: &str) -> anyhow::Result<Box<dyn IndexService>>;
}

/// The per-index surface a `LocalIndexStore` exposes once an index has been created.
pub trait IndexService {
    fn mapper_service(&self) -> Box<dyn MapperService + '_>;
}

/// Consumed by the coordinator during mapping assembly (§4.6 step 4): accepts `(type, source)`
/// pairs and, once parsed, yields back the canonical, parser-normalized sources (§4.6 step 5).
pub trait MapperService {
    fn add(&mut self, type_name: &str, source: &str) -> anyhow::Result<()>;
    fn canonical_mappings(&self) -> Vec<(String, String)>;
}
