//! Data model for the create-index control plane: cluster state, metadata, routing,
//! settings, mappings, and the error taxonomy shared by `cluster-core` and `cluster-server`.

pub mod cluster_state;
pub mod error;
pub mod index_name;
pub mod mapping;
pub mod metadata;
pub mod nodes;
pub mod request;
pub mod routing;
pub mod settings;

pub use cluster_state::ClusterState;
pub use error::{Code, Error, ErrorCode, NameErrorReason, ResponseError};
pub use index_name::IndexName;
pub use mapping::Mappings;
pub use metadata::{IndexMetaData, MetaData};
pub use nodes::{NodeId, Nodes};
pub use request::{CreateIndexRequest, Response};
pub use routing::{IndexRoutingTable, RoutingTable, ShardCopy, ShardRoutingTable, ShardState};
pub use settings::{ClusterDefaults, SettingValue, Settings};
