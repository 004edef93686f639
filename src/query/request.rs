//! The backend-agnostic nearest-neighbor request description.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::vector::QueryVector;

pub(crate) fn default_k() -> usize {
    25
}

pub(crate) fn default_size() -> usize {
    100
}

pub(crate) fn default_vector_field() -> String {
    "vector".to_string()
}

/// A nearest-neighbor search request.
///
/// Describes what to ask the engine for: the top `k` candidates by vector
/// proximity on `vector_field`, up to `size` returned results, an explicit
/// per-candidate cosine similarity as a computed field, plus any projected
/// fields and exact-match filters. The description carries no engine
/// specifics; rendering to a concrete dialect lives in
/// [`crate::query::elastic`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeighborRequest {
    /// The query vector.
    pub vector: QueryVector,
    /// Candidate pool size for the nearest-neighbor stage.
    #[serde(default = "default_k")]
    pub k: usize,
    /// Number of results to return.
    #[serde(default = "default_size")]
    pub size: usize,
    /// Pagination start offset.
    #[serde(default)]
    pub offset: Option<usize>,
    /// Extra fields to project as computed fields, deduplicated and trimmed.
    #[serde(default)]
    pub fields: Vec<String>,
    /// Exact-match constraints, field name to value. Semantics beyond exact
    /// match belong to the engine.
    #[serde(default)]
    pub filters: BTreeMap<String, String>,
    /// The indexed field holding each candidate's embedding.
    #[serde(default = "default_vector_field")]
    pub vector_field: String,
}

impl NeighborRequest {
    /// Start building a request for the given query vector.
    pub fn builder(vector: QueryVector) -> super::NeighborRequestBuilder {
        super::NeighborRequestBuilder::new(vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_partial_json() {
        let request: NeighborRequest = serde_json::from_str(r#"{"vector": [0.1, 0.2]}"#).unwrap();
        assert_eq!(request.k, 25);
        assert_eq!(request.size, 100);
        assert_eq!(request.offset, None);
        assert!(request.fields.is_empty());
        assert!(request.filters.is_empty());
        assert_eq!(request.vector_field, "vector");
    }
}
