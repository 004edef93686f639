//! Declarative per-candidate scoring expressions.
//!
//! A [`ScoreExpr`] describes a computed field the engine evaluates for every
//! candidate: either the cosine similarity between the candidate's stored
//! vector and the query vector, or a plain passthrough of a stored field.
//! Keeping the expression declarative means the request builder never deals
//! in script strings, and backends without inline scripting can skip
//! rendering entirely and let the service compute similarity locally from
//! raw vectors.

use serde::{Deserialize, Serialize};

/// A computed field evaluated per candidate by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScoreExpr {
    /// Cosine similarity between the candidate's vector in `vector_field`
    /// and the query vector supplied as a script parameter.
    CosineSimilarity { vector_field: String },
    /// Direct passthrough of a stored field's value.
    FieldValue { field: String },
}

impl ScoreExpr {
    /// The name the computed similarity field is exposed under.
    pub const SIMILARITY_FIELD: &'static str = "similarity";

    /// Render this expression to the engine's scripting dialect (painless).
    ///
    /// The cosine script iterates the dimensions once, accumulating the dot
    /// product and both norms, and expects the query vector under the
    /// `vector` script parameter.
    pub fn render(&self) -> String {
        match self {
            ScoreExpr::CosineSimilarity { vector_field } => format!(
                "double dotProduct = 0.0; double normA = 0.0; double normB = 0.0; \
                 for (int i = 0; i < params['_source']['{vector_field}'].length; i++) {{ \
                 dotProduct += params['_source']['{vector_field}'][i] * params['vector'][i]; \
                 normA += Math.pow(params['_source']['{vector_field}'][i], 2); \
                 normB += Math.pow(params['vector'][i], 2); }} \
                 return dotProduct / (Math.sqrt(normA) * Math.sqrt(normB));"
            ),
            ScoreExpr::FieldValue { field } => format!("params['_source']['{field}']"),
        }
    }
}
