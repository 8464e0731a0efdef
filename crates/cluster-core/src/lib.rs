//! Validation, queueing, acknowledgment tracking, and coordination for index creation: the
//! core of the create-index control plane (C1-C7).

pub mod ack_tracker;
pub mod coordinator;
pub mod listener_registry;
pub mod local_store;
pub mod mapping_loader;
pub mod queue;
pub mod routing_strategy;
pub mod timer;
pub mod validator;

pub use ack_tracker::AckTracker;
pub use coordinator::{Coordinator, CreateIndexListener};
pub use listener_registry::{ListenerRegistry, NodeIndexCreatedListener, RegistrationToken};
pub use local_store::{IndexService, LocalIndexStore, MapperService};
pub use mapping_loader::MappingLoader;
pub use queue::UpdateQueue;
pub use routing_strategy::RoutingStrategy;
pub use timer::Timer;
pub use validator::validate_name;
