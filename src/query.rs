//! Query construction: neighbor requests, scoring expressions, and the
//! engine-dialect rendering.
//!
//! # Module Structure
//!
//! - `request`: the backend-agnostic [`NeighborRequest`] description
//! - `builder`: fluent construction with validation
//! - `script`: declarative per-candidate scoring expressions
//! - `elastic`: rendering to the Elasticsearch/OpenSearch JSON dialect

pub mod builder;
pub mod elastic;
pub mod request;
pub mod script;

pub use builder::NeighborRequestBuilder;
pub use request::NeighborRequest;
pub use script::ScoreExpr;
