//! Query vector type and the similarity arithmetic shared by the query
//! builder and the local scoring fallback.
//!
//! The engine-side scoring script and [`QueryVector::cosine_similarity`]
//! implement the same formula; whichever path computes it, callers see the
//! identical similarity value.

use serde::{Deserialize, Serialize};

use crate::error::{Result, VecinaError};

/// A validated query vector.
///
/// Invariants enforced at construction: non-empty, every element finite.
/// Dimensionality is whatever the index schema agreed on; it is not checked
/// here because the engine owns the schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct QueryVector(Vec<f64>);

impl QueryVector {
    /// Create a query vector, rejecting empty or non-finite input.
    pub fn new(data: Vec<f64>) -> Result<Self> {
        if data.is_empty() {
            return Err(VecinaError::malformed_input("query vector is empty"));
        }
        if let Some(pos) = data.iter().position(|x| !x.is_finite()) {
            return Err(VecinaError::malformed_input(format!(
                "query vector element {pos} is not finite"
            )));
        }
        Ok(QueryVector(data))
    }

    /// Number of dimensions.
    pub fn dimension(&self) -> usize {
        self.0.len()
    }

    /// The raw components.
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Cosine similarity between this vector and a candidate's stored vector.
    ///
    /// One pass over the dimensions: `dot(a, b) / (||a|| * ||b||)`. Zero-norm
    /// operands yield 0.0 rather than NaN.
    pub fn cosine_similarity(&self, candidate: &[f64]) -> Result<f64> {
        if candidate.len() != self.0.len() {
            return Err(VecinaError::malformed_input(format!(
                "dimension mismatch: query has {}, candidate has {}",
                self.0.len(),
                candidate.len()
            )));
        }

        let mut dot_product = 0.0f64;
        let mut norm_a = 0.0f64;
        let mut norm_b = 0.0f64;
        for (x, y) in candidate.iter().zip(self.0.iter()) {
            dot_product += x * y;
            norm_a += x * x;
            norm_b += y * y;
        }

        if norm_a == 0.0 || norm_b == 0.0 {
            return Ok(0.0);
        }
        Ok(dot_product / (norm_a.sqrt() * norm_b.sqrt()))
    }
}

impl TryFrom<Vec<f64>> for QueryVector {
    type Error = VecinaError;

    fn try_from(data: Vec<f64>) -> Result<Self> {
        QueryVector::new(data)
    }
}

impl From<QueryVector> for Vec<f64> {
    fn from(vector: QueryVector) -> Self {
        vector.0
    }
}
