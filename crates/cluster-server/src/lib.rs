//! The binary and HTTP front door for the create-index control plane (A4, expansion): wires
//! the `cluster-core` coordinator to a filesystem-backed local index store and a concrete
//! routing strategy, and exposes them over a small `actix-web` surface.

pub mod config;
pub mod local_index_store;
pub mod routes;
pub mod state;

pub use config::Opt;
pub use local_index_store::FileSystemIndexStore;
pub use state::AppState;
