//! # Vecina
//!
//! Query construction and result normalization for vector similarity
//! search. Vecina sits in front of an external nearest-neighbor engine:
//! it builds the search request (knn clause plus an explicit per-candidate
//! cosine similarity as a computed field) and normalizes the raw hit list
//! the engine returns (sort by similarity, optional linear rescaling into
//! a caller-chosen range, projected-field passthrough). Executing the
//! search and everything around it (transport, auth, retries) belongs to
//! the engine collaborator behind the [`engine::SearchEngine`] trait.
//!
//! ## Features
//!
//! - Backend-agnostic neighbor request description with a fluent builder
//! - Declarative scoring expressions rendered to the engine's script dialect
//! - Local similarity fallback for engines without inline scripting
//! - Descending sort independent of engine ordering
//! - Linear rescaling with observed-min/max sentinels and integer-preserving
//!   output

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod normalize;
pub mod query;
pub mod scale;
pub mod service;
pub mod vector;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
