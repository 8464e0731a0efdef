use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use cluster_types::{
    ClusterDefaults, ClusterState, CreateIndexRequest, Error, IndexMetaData, IndexRoutingTable, Mappings, Response,
};
use tokio::runtime::Handle;

use crate::ack_tracker::AckTracker;
use crate::listener_registry::ListenerRegistry;
use crate::local_store::LocalIndexStore;
use crate::mapping_loader::MappingLoader;
use crate::queue::UpdateQueue;
use crate::routing_strategy::RoutingStrategy;
use crate::validator::validate_name;

#[cfg(test)]
mod tests;

/// Notified exactly once per `create_index` call, either with the settled [`Response`] or
/// with the [`Error`] that aborted the operation before any state changed (§4.6 step 9, §4.7).
pub trait CreateIndexListener: Send + Sync {
    fn on_response(&self, response: Response);
    fn on_failure(&self, error: Error);
}

/// Wraps a `CreateIndexListener` with the single-bit latch the design notes call for: the
/// source mixed early returns and exceptions freely, this re-expresses the same "first of
/// {success, failure, timeout} wins" rule as one atomic compare-and-set.
struct Settlement<L: CreateIndexListener + ?Sized> {
    inner: Arc<L>,
    fired: AtomicBool,
}

impl<L: CreateIndexListener + ?Sized> Settlement<L> {
    fn new(inner: Arc<L>) -> Self {
        Self { inner, fired: AtomicBool::new(false) }
    }

    fn settle_response(&self, response: Response) {
        if self.fired.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst).is_ok() {
            self.inner.on_response(response);
        }
    }

    fn settle_failure(&self, error: Error) {
        if self.fired.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst).is_ok() {
            self.inner.on_failure(error);
        }
    }
}

struct MetadataPhaseOutcome {
    next_state: ClusterState,
    index_name: String,
    expected_acks: i64,
}

/// Orchestrates validation, mapping assembly, local materialization, metadata commit, peer
/// wait, and routing commit for a single index creation (C6, §4.6-§4.7).
pub struct Coordinator {
    queue: Arc<UpdateQueue>,
    registry: Arc<ListenerRegistry>,
    runtime: Handle,
    local_store: Arc<dyn LocalIndexStore>,
    mapping_loader: MappingLoader,
    routing_strategy: Arc<dyn RoutingStrategy>,
    cluster_defaults: ClusterDefaults,
}

impl Coordinator {
    pub fn new(
        queue: Arc<UpdateQueue>,
        registry: Arc<ListenerRegistry>,
        runtime: Handle,
        local_store: Arc<dyn LocalIndexStore>,
        mapping_loader: MappingLoader,
        routing_strategy: Arc<dyn RoutingStrategy>,
        cluster_defaults: ClusterDefaults,
    ) -> Self {
        Self { queue, registry, runtime, local_store, mapping_loader, routing_strategy, cluster_defaults }
    }

    pub fn current_state(&self) -> ClusterState {
        self.queue.current()
    }

    /// Entry point (§4.6). Non-blocking: enqueues one task and returns immediately. The
    /// caller is notified asynchronously via `user_listener`.
    pub fn create_index(&self, request: CreateIndexRequest, user_listener: Arc<dyn CreateIndexListener>) {
        let settlement = Arc::new(Settlement::new(user_listener));
        let local_store = self.local_store.clone();
        let mapping_loader = self.mapping_loader.clone();
        let registry = self.registry.clone();
        let runtime = self.runtime.clone();
        let queue_for_routing = self.queue.clone();
        let routing_strategy = self.routing_strategy.clone();
        let timeout = request.timeout_duration();
        let settlement_for_task = settlement.clone();
        let cluster_defaults = self.cluster_defaults;

        self.queue.submit(format!("create-index {}", request.index_name()), move |state| {
            match Self::run_metadata_phase(state, &request, local_store.as_ref(), &mapping_loader, cluster_defaults) {
                Ok(outcome) => {
                    let MetadataPhaseOutcome { next_state, index_name, expected_acks } = outcome;
                    let settlement_for_settle = settlement_for_task.clone();
                    let queue_for_settle = queue_for_routing.clone();
                    let routing_strategy_for_settle = routing_strategy.clone();
                    let index_name_for_settle = index_name.clone();
                    let on_settle = move |acknowledged: bool| {
                        Self::schedule_routing_commit(
                            &queue_for_settle,
                            &routing_strategy_for_settle,
                            &index_name_for_settle,
                            acknowledged,
                            &settlement_for_settle,
                        );
                    };
                    if expected_acks <= 0 {
                        on_settle(true);
                    } else {
                        AckTracker::spawn(&runtime, index_name, expected_acks, registry.clone(), timeout, on_settle);
                    }
                    next_state
                }
                Err(error) => {
                    settlement_for_task.settle_failure(error);
                    state.clone()
                }
            }
        });
    }

    /// §4.6 steps 1-7, minus arming the peer wait (the caller does that, since it needs the
    /// `registry`/`runtime` this pure-ish step doesn't).
    fn run_metadata_phase(
        state: &ClusterState,
        request: &CreateIndexRequest,
        local_store: &dyn LocalIndexStore,
        mapping_loader: &MappingLoader,
        cluster_defaults: ClusterDefaults,
    ) -> Result<MetadataPhaseOutcome, Error> {
        let candidate = request.index_name();

        // Step 1: pre-flight validation, first failure wins.
        if state.routing_table().contains_index(candidate) || state.metadata().contains_index(candidate) {
            return Err(Error::IndexAlreadyExists(candidate.to_owned()));
        }
        let name = validate_name(candidate)?;
        if state.metadata().contains_alias(name.as_str()) {
            return Err(Error::CollidesWithAlias { index_uid: name.into_inner() });
        }

        // Step 2: mapping assembly, overlaid with the request's own mappings.
        let assembled = mapping_loader.load(name.as_str(), request.mappings_ref());

        // Step 3: settings resolution, against the configured cluster defaults, not a
        // hardcoded fallback, so an operator override of `CLUSTER_DEFAULT_NUMBER_OF_SHARDS`/
        // `_REPLICAS` actually takes effect.
        let settings = request.settings_ref().resolved(cluster_defaults);

        // Step 4: local materialization.
        local_store.create(name.as_str(), &settings, state.nodes().local()).map_err(|source| {
            Error::DirectoryCreationFailed { index_uid: name.as_str().to_owned(), source: source.to_string() }
        })?;

        let index_service = local_store.index_service(name.as_str()).map_err(|source| {
            let _ = local_store.delete(name.as_str());
            Error::DirectoryCreationFailed { index_uid: name.as_str().to_owned(), source: source.to_string() }
        })?;

        let mut mapper = index_service.mapper_service();
        for (type_name, source) in assembled.iter() {
            if let Err(cause) = mapper.add(type_name, source) {
                let _ = local_store.delete(name.as_str());
                return Err(Error::MapperParsing {
                    index_uid: name.as_str().to_owned(),
                    type_name: type_name.clone(),
                    cause: cause.to_string(),
                });
            }
        }

        // Step 5: canonicalize mappings with what the mapper service produced.
        let canonical: Mappings = mapper.canonical_mappings().into_iter().collect();

        // Step 6: build the new IndexMetaData and MetaData.
        let index_meta = IndexMetaData::new(name.clone(), settings, canonical);
        let new_metadata = state.metadata().with_index(index_meta);
        let next_state = state.with_metadata(new_metadata);

        let expected_acks = state.nodes().peer_count() as i64;

        Ok(MetadataPhaseOutcome { next_state, index_name: name.into_inner(), expected_acks })
    }

    /// §4.7: the second task, submitted once the peer wait settles by either path.
    fn schedule_routing_commit(
        queue: &Arc<UpdateQueue>,
        routing_strategy: &Arc<dyn RoutingStrategy>,
        index_name: &str,
        acknowledged: bool,
        settlement: &Arc<Settlement<dyn CreateIndexListener>>,
    ) {
        let index_name = index_name.to_owned();
        let routing_strategy = routing_strategy.clone();
        let settlement = settlement.clone();

        queue.submit_processed(
            format!("route {index_name}"),
            move |state| {
                let index_meta = state
                    .metadata()
                    .index(&index_name)
                    .expect("routing commit runs only after its index's metadata commit has been observed");
                let placeholder =
                    IndexRoutingTable::empty(index_meta.number_of_shards(), index_meta.number_of_replicas());
                let provisional_routing = state.routing_table().with_index(index_name.clone(), placeholder);
                let provisional_state = state.with_routing_table(provisional_routing);
                let populated = routing_strategy.reroute(&provisional_state);
                state.with_routing_table(populated)
            },
            Some(Box::new(move |_state: &ClusterState| {
                let response = if acknowledged { Response::acknowledged() } else { Response::timed_out() };
                settlement.settle_response(response);
            })),
        );
    }
}
