use std::path::PathBuf;

use clap::Parser;

const CLUSTER_HTTP_ADDR: &str = "CLUSTER_HTTP_ADDR";
const CLUSTER_DATA_PATH: &str = "CLUSTER_DATA_PATH";
const CLUSTER_CONFIG_PATH: &str = "CLUSTER_CONFIG_PATH";
const CLUSTER_LOG_LEVEL: &str = "CLUSTER_LOG_LEVEL";
const CLUSTER_DEFAULT_NUMBER_OF_SHARDS: &str = "CLUSTER_DEFAULT_NUMBER_OF_SHARDS";
const CLUSTER_DEFAULT_NUMBER_OF_REPLICAS: &str = "CLUSTER_DEFAULT_NUMBER_OF_REPLICAS";
const CLUSTER_DEFAULT_TIMEOUT_MS: &str = "CLUSTER_DEFAULT_TIMEOUT_MS";

fn default_http_addr() -> String {
    "127.0.0.1:7700".to_owned()
}

fn default_data_path() -> PathBuf {
    PathBuf::from("./data.cluster")
}

fn default_config_path() -> PathBuf {
    PathBuf::from("./config")
}

fn default_log_level() -> String {
    "info".to_owned()
}

/// Startup configuration for the create-index control plane (A2, expansion).
///
/// Mirrors the reference stack's `Opt`: a `clap`-derived struct, every field overridable by an
/// `env` variable of the same shape, with typed defaults matching §6's recognized settings keys.
#[derive(Debug, Clone, Parser)]
#[command(name = "cluster-server", about = "Create-index control plane for a distributed search cluster")]
pub struct Opt {
    /// Sets the HTTP address and port this node will bind to.
    #[clap(long, env = CLUSTER_HTTP_ADDR, default_value_t = default_http_addr())]
    pub http_addr: String,

    /// Designates the location where index data will be materialized on disk.
    #[clap(long, env = CLUSTER_DATA_PATH, default_value_os_t = default_data_path())]
    pub data_path: PathBuf,

    /// The configuration root the mapping loader (§4.3) reads `mappings/` from.
    #[clap(long, env = CLUSTER_CONFIG_PATH, default_value_os_t = default_config_path())]
    pub config_path: PathBuf,

    /// The default `index.number_of_shards` applied when a request omits it (§6).
    #[clap(long, env = CLUSTER_DEFAULT_NUMBER_OF_SHARDS, default_value_t = cluster_types::settings::DEFAULT_NUMBER_OF_SHARDS)]
    pub default_number_of_shards: i64,

    /// The default `index.number_of_replicas` applied when a request omits it (§6).
    #[clap(long, env = CLUSTER_DEFAULT_NUMBER_OF_REPLICAS, default_value_t = cluster_types::settings::DEFAULT_NUMBER_OF_REPLICAS)]
    pub default_number_of_replicas: i64,

    /// The default peer-acknowledgment timeout, in milliseconds, applied when a request omits
    /// `timeoutMs` (§3's `CreateIndexRequest.timeout` default of 5s).
    #[clap(long, env = CLUSTER_DEFAULT_TIMEOUT_MS, default_value_t = 5_000)]
    pub default_timeout_ms: i64,

    /// Sets the verbosity of the tracing subscriber installed at startup.
    #[clap(long, env = CLUSTER_LOG_LEVEL, default_value_t = default_log_level())]
    pub log_level: String,
}
