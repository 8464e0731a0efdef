use std::collections::BTreeSet;
use std::fs;
use std::sync::mpsc;
use std::sync::Mutex as StdMutex;
use std::time::Duration as StdDuration;

use cluster_types::{
    ClusterState, CreateIndexRequest, NodeId, Nodes, RoutingTable, SettingValue, Settings, ShardCopy, ShardRoutingTable,
    ShardState,
};
use tokio::runtime::Handle;

use super::*;
use crate::local_store::{IndexService, MapperService};

struct FakeLocalIndexStore {
    log: StdMutex<Vec<String>>,
}

impl FakeLocalIndexStore {
    fn new() -> Arc<Self> {
        Arc::new(Self { log: StdMutex::new(Vec::new()) })
    }

    fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

impl LocalIndexStore for FakeLocalIndexStore {
    fn create(&self, name: &str, _settings: &Settings, _local_node_id: NodeId) -> anyhow::Result<()> {
        self.log.lock().unwrap().push(format!("create:{name}"));
        Ok(())
    }

    fn delete(&self, name: &str) -> anyhow::Result<()> {
        self.log.lock().unwrap().push(format!("delete:{name}"));
        Ok(())
    }

    fn index_service(&self, name: &str) -> anyhow::Result<Box<dyn IndexService>> {
        Ok(Box::new(FakeIndexService { _name: name.to_owned() }))
    }
}

struct FakeIndexService {
    _name: String,
}

impl IndexService for FakeIndexService {
    fn mapper_service(&self) -> Box<dyn MapperService + '_> {
        Box::new(FakeMapperService { accepted: Vec::new() })
    }
}

struct FakeMapperService {
    accepted: Vec<(String, String)>,
}

impl MapperService for FakeMapperService {
    fn add(&mut self, type_name: &str, source: &str) -> anyhow::Result<()> {
        if type_name == "bad" {
            anyhow::bail!("the mapper rejects type `{type_name}`");
        }
        self.accepted.push((type_name.to_owned(), format!("canonical({source})")));
        Ok(())
    }

    fn canonical_mappings(&self) -> Vec<(String, String)> {
        self.accepted.clone()
    }
}

struct FakeRoutingStrategy;

impl RoutingStrategy for FakeRoutingStrategy {
    fn reroute(&self, state: &ClusterState) -> RoutingTable {
        let local = state.nodes().local();
        let mut table = RoutingTable::new();
        for (name, routing) in state.routing_table().indices() {
            let shards = routing
                .shards()
                .iter()
                .map(|shard| {
                    let copies = shard
                        .copies()
                        .iter()
                        .map(|copy| {
                            if copy.primary {
                                ShardCopy { node: Some(local), state: ShardState::Initializing, primary: true }
                            } else {
                                *copy
                            }
                        })
                        .collect();
                    ShardRoutingTable::new(copies)
                })
                .collect();
            table = table.with_index(name.clone(), cluster_types::IndexRoutingTable::with_shards(shards));
        }
        table
    }
}

enum Outcome {
    Response(Response),
    Failure(Error),
}

struct ChannelListener {
    tx: mpsc::Sender<Outcome>,
}

impl CreateIndexListener for ChannelListener {
    fn on_response(&self, response: Response) {
        let _ = self.tx.send(Outcome::Response(response));
    }

    fn on_failure(&self, error: Error) {
        let _ = self.tx.send(Outcome::Failure(error));
    }
}

fn three_node_coordinator(local_store: Arc<FakeLocalIndexStore>, config_root: &std::path::Path) -> (Coordinator, NodeId, BTreeSet<NodeId>) {
    let local = NodeId::new();
    let peers: BTreeSet<NodeId> = (0..2).map(|_| NodeId::new()).collect();
    let nodes = Nodes::new(local, peers.clone());
    let queue = UpdateQueue::spawn(ClusterState::initial(nodes));
    let registry = Arc::new(ListenerRegistry::new());
    let coordinator = Coordinator::new(
        queue,
        registry,
        Handle::current(),
        local_store,
        MappingLoader::new(config_root),
        Arc::new(FakeRoutingStrategy),
        cluster_types::ClusterDefaults::default(),
    );
    (coordinator, local, peers)
}

fn single_node_coordinator(local_store: Arc<FakeLocalIndexStore>, config_root: &std::path::Path) -> Coordinator {
    let local = NodeId::new();
    let queue = UpdateQueue::spawn(ClusterState::initial(Nodes::single_node(local)));
    let registry = Arc::new(ListenerRegistry::new());
    Coordinator::new(
        queue,
        registry,
        Handle::current(),
        local_store,
        MappingLoader::new(config_root),
        Arc::new(FakeRoutingStrategy),
        cluster_types::ClusterDefaults::default(),
    )
}

fn recv(rx: &mpsc::Receiver<Outcome>) -> Outcome {
    rx.recv_timeout(StdDuration::from_secs(5)).expect("listener was never notified")
}

// S1 — happy path, 3 nodes: two peers acknowledge, response is acknowledged=true, and the
// final state has the expected shard count and routing.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn happy_path_three_nodes_acknowledges_and_routes() {
    let config_root = tempfile::tempdir().unwrap();
    let store = FakeLocalIndexStore::new();
    let (coordinator, _local, peers) = three_node_coordinator(store.clone(), config_root.path());

    let mut settings = Settings::new();
    settings.insert("index.number_of_shards", SettingValue::Integer(3));
    let request = CreateIndexRequest::new("logs-2024").cause("test").settings(settings);

    let (tx, rx) = mpsc::channel();
    coordinator.create_index(request, Arc::new(ChannelListener { tx }));

    for peer in peers {
        coordinator.registry.notify("logs-2024", peer);
    }

    match recv(&rx) {
        Outcome::Response(response) => assert!(response.acknowledged),
        Outcome::Failure(error) => panic!("unexpected failure: {error}"),
    }

    let state = wait_for_routed(&coordinator, "logs-2024");
    let meta = state.metadata().index("logs-2024").unwrap();
    assert_eq!(meta.number_of_shards(), 3);
    assert_eq!(meta.number_of_replicas(), 1);
    let routing = state.routing_table().index("logs-2024").unwrap();
    assert_eq!(routing.shards().len(), 3);
    for shard in routing.shards() {
        let primary = shard.copies().iter().find(|c| c.primary).unwrap();
        assert_eq!(primary.state, ShardState::Initializing);
    }
}

// S3 — uppercase name is rejected before any state mutation.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn uppercase_name_is_rejected() {
    let config_root = tempfile::tempdir().unwrap();
    let store = FakeLocalIndexStore::new();
    let coordinator = single_node_coordinator(store.clone(), config_root.path());

    let before = coordinator.current_state();
    let (tx, rx) = mpsc::channel();
    coordinator.create_index(CreateIndexRequest::new("LOGS"), Arc::new(ChannelListener { tx }));

    match recv(&rx) {
        Outcome::Failure(error) => assert_eq!(error.to_string(), "LOGS is not a valid index uid: must be lowercase"),
        Outcome::Response(_) => panic!("expected a failure"),
    }
    assert!(store.log().is_empty());
    assert_eq!(coordinator.current_state(), before);
}

// S2 — a name colliding with an existing alias is rejected.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn alias_collision_is_rejected() {
    let config_root = tempfile::tempdir().unwrap();
    let store = FakeLocalIndexStore::new();
    let local = NodeId::new();
    let queue = UpdateQueue::spawn(ClusterState::initial(Nodes::single_node(local)).with_metadata(
        cluster_types::MetaData::new().with_alias("events"),
    ));
    let registry = Arc::new(ListenerRegistry::new());
    let coordinator = Coordinator::new(
        queue,
        registry,
        Handle::current(),
        store.clone(),
        MappingLoader::new(config_root.path()),
        Arc::new(FakeRoutingStrategy),
        cluster_types::ClusterDefaults::default(),
    );

    let (tx, rx) = mpsc::channel();
    coordinator.create_index(CreateIndexRequest::new("events"), Arc::new(ChannelListener { tx }));

    match recv(&rx) {
        Outcome::Failure(error) => assert!(error.to_string().contains("collides with an existing alias")),
        Outcome::Response(_) => panic!("expected a failure"),
    }
    assert!(store.log().is_empty());
}

// S5 — request mappings win over per-index overrides, which win over defaults.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn mapping_layering_request_wins() {
    let config_root = tempfile::tempdir().unwrap();
    let default_dir = config_root.path().join("mappings/_default");
    let index_dir = config_root.path().join("mappings/logs");
    fs::create_dir_all(&default_dir).unwrap();
    fs::create_dir_all(&index_dir).unwrap();
    fs::write(default_dir.join("doc.json"), "A").unwrap();
    fs::write(index_dir.join("doc.json"), "B").unwrap();

    let store = FakeLocalIndexStore::new();
    let coordinator = single_node_coordinator(store.clone(), config_root.path());

    let mut request_mappings = cluster_types::Mappings::new();
    request_mappings.set("doc", "C");
    let request = CreateIndexRequest::new("logs").mappings(request_mappings);

    let (tx, rx) = mpsc::channel();
    coordinator.create_index(request, Arc::new(ChannelListener { tx }));
    match recv(&rx) {
        Outcome::Response(response) => assert!(response.acknowledged),
        Outcome::Failure(error) => panic!("unexpected failure: {error}"),
    }

    let state = wait_for_routed(&coordinator, "logs");
    let meta = state.metadata().index("logs").unwrap();
    assert_eq!(meta.mappings().get("doc"), Some("canonical(C)"));
}

// S6 — a mapping the mapper rejects deletes the partially-created local index and fails the
// request; cluster state is left unchanged.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn mapper_parse_failure_deletes_the_local_index() {
    let config_root = tempfile::tempdir().unwrap();
    let store = FakeLocalIndexStore::new();
    let coordinator = single_node_coordinator(store.clone(), config_root.path());

    let before = coordinator.current_state();
    let mut request_mappings = cluster_types::Mappings::new();
    request_mappings.set("bad", "!!!");
    let request = CreateIndexRequest::new("logs-2024").mappings(request_mappings);

    let (tx, rx) = mpsc::channel();
    coordinator.create_index(request, Arc::new(ChannelListener { tx }));

    match recv(&rx) {
        Outcome::Failure(error) => assert!(error.to_string().contains("bad")),
        Outcome::Response(_) => panic!("expected a failure"),
    }
    assert_eq!(store.log(), vec!["create:logs-2024".to_string(), "delete:logs-2024".to_string()]);
    assert_eq!(coordinator.current_state(), before);
}

// Single-node cluster: acknowledgment fires synchronously, no peer wait needed.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn single_node_cluster_acknowledges_without_peers() {
    let config_root = tempfile::tempdir().unwrap();
    let store = FakeLocalIndexStore::new();
    let coordinator = single_node_coordinator(store.clone(), config_root.path());

    let (tx, rx) = mpsc::channel();
    coordinator.create_index(CreateIndexRequest::new("logs"), Arc::new(ChannelListener { tx }));

    match recv(&rx) {
        Outcome::Response(response) => assert!(response.acknowledged),
        Outcome::Failure(error) => panic!("unexpected failure: {error}"),
    }
}

// A request that omits number_of_shards/number_of_replicas picks up the coordinator's
// configured cluster defaults, not the hardcoded fallback constants.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn an_unset_shard_or_replica_count_resolves_against_the_configured_cluster_defaults() {
    let config_root = tempfile::tempdir().unwrap();
    let store = FakeLocalIndexStore::new();
    let local = NodeId::new();
    let queue = UpdateQueue::spawn(ClusterState::initial(Nodes::single_node(local)));
    let registry = Arc::new(ListenerRegistry::new());
    let coordinator = Coordinator::new(
        queue,
        registry,
        Handle::current(),
        store,
        MappingLoader::new(config_root.path()),
        Arc::new(FakeRoutingStrategy),
        cluster_types::ClusterDefaults::new(3, 2),
    );

    let (tx, rx) = mpsc::channel();
    coordinator.create_index(CreateIndexRequest::new("logs"), Arc::new(ChannelListener { tx }));

    match recv(&rx) {
        Outcome::Response(response) => assert!(response.acknowledged),
        Outcome::Failure(error) => panic!("unexpected failure: {error}"),
    }

    let state = coordinator.current_state();
    let meta = state.metadata().index("logs").unwrap();
    assert_eq!(meta.number_of_shards(), 3);
    assert_eq!(meta.number_of_replicas(), 2);
}

// S4 (abridged) — a short timeout with no peer acknowledgments still settles, with
// acknowledged=false, and still routes the index.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn timeout_without_any_acknowledgment_still_routes() {
    let config_root = tempfile::tempdir().unwrap();
    let store = FakeLocalIndexStore::new();
    let (coordinator, _local, _peers) = three_node_coordinator(store.clone(), config_root.path());

    let request = CreateIndexRequest::new("logs").timeout(time::Duration::milliseconds(50));
    let (tx, rx) = mpsc::channel();
    coordinator.create_index(request, Arc::new(ChannelListener { tx }));

    match recv(&rx) {
        Outcome::Response(response) => assert!(!response.acknowledged),
        Outcome::Failure(error) => panic!("unexpected failure: {error}"),
    }
    let state = wait_for_routed(&coordinator, "logs");
    assert!(state.metadata().contains_index("logs"));
    assert!(state.routing_table().contains_index("logs"));
}

fn wait_for_routed(coordinator: &Coordinator, index_name: &str) -> ClusterState {
    let deadline = std::time::Instant::now() + StdDuration::from_secs(5);
    loop {
        let state = coordinator.current_state();
        if state.routing_table().contains_index(index_name) {
            return state;
        }
        if std::time::Instant::now() > deadline {
            panic!("routing commit for `{index_name}` never observed");
        }
        std::thread::sleep(StdDuration::from_millis(10));
    }
}
