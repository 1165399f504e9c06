//! `shipflow` — transport-flow classification and shipment identity
//! clustering engine.
//!
//! Pure engine crate: receives pre-loaded logistics records, returns
//! flow-coded records, cluster assignments and a linkset ready for graph
//! serialization. No CLI or HTTP dependencies; CSV ingestion is the only
//! IO boundary.

pub mod classify;
pub mod cluster;
pub mod config;
pub mod engine;
pub mod error;
pub mod ident;
pub mod identity;
pub mod linkset;
pub mod model;
pub mod summary;
pub mod validate;

pub use config::FlowConfig;
pub use engine::run;
pub use error::FlowError;
pub use model::{ClusterAssignment, FlowInput, FlowRecord, FlowResult};
