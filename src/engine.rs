//! The search-engine collaborator seam.
//!
//! Everything network-shaped lives behind [`SearchEngine`]: the service
//! hands it a rendered request body and gets back the engine's raw hit
//! list. Transport, authentication, retries and timeouts are the engine
//! adapter's business. Response parsing from the engine's wire shape into
//! [`crate::normalize::ScoredHit`] also lives here, so the normalizer only
//! ever sees clean hits.
//!
//! # Module Structure
//!
//! - `http`: reqwest-based adapter for Elasticsearch/OpenSearch-compatible
//!   endpoints

pub mod http;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, VecinaError};
use crate::normalize::ScoredHit;
use crate::query::script::ScoreExpr;

/// An external engine that can execute a rendered search body.
pub trait SearchEngine {
    /// Execute one `_search` round trip against an index.
    fn search(
        &self,
        index: &str,
        body: &Value,
    ) -> impl Future<Output = Result<SearchResponse>> + Send;

    /// Whether the engine can evaluate per-candidate scripted fields.
    ///
    /// Engines without inline scripting return false; the service then
    /// requests raw vectors and computes similarity locally.
    fn supports_scripted_fields(&self) -> bool {
        true
    }
}

/// The engine's response to a search, restricted to what this crate reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub hits: HitsEnvelope,
}

/// The nested hits envelope of the engine wire format.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HitsEnvelope {
    #[serde(default)]
    pub hits: Vec<RawHit>,
}

/// One hit as the engine returns it, before normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawHit {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_index", default, skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
    #[serde(rename = "_source", default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Value>,
    /// Computed fields; the engine wraps each value in a one-element array.
    #[serde(default)]
    pub fields: Map<String, Value>,
}

/// Computed-field values arrive as one-element arrays; unwrap those and
/// leave anything else as-is.
fn unwrap_computed(value: Value) -> Value {
    match value {
        Value::Array(mut items) if items.len() == 1 => items.remove(0),
        other => other,
    }
}

impl RawHit {
    /// The stored vector under `field` in the document source, if present.
    pub fn source_vector(&self, field: &str) -> Option<Vec<f64>> {
        let values = self.source.as_ref()?.get(field)?.as_array()?;
        values.iter().map(Value::as_f64).collect()
    }

    /// Convert into a [`ScoredHit`] using the engine-computed similarity.
    ///
    /// Fails when the computed `similarity` field is missing or not a
    /// number, which indicates the request body and the engine disagree.
    pub fn into_scored(mut self) -> Result<ScoredHit> {
        let similarity = self
            .fields
            .remove(ScoreExpr::SIMILARITY_FIELD)
            .map(unwrap_computed)
            .and_then(|v| v.as_f64())
            .ok_or_else(|| {
                VecinaError::response(format!(
                    "hit {} has no numeric similarity field",
                    self.id
                ))
            })?;
        Ok(self.into_scored_with(similarity))
    }

    /// Convert into a [`ScoredHit`] with a locally computed similarity.
    pub fn into_scored_with(mut self, similarity: f64) -> ScoredHit {
        self.fields.remove(ScoreExpr::SIMILARITY_FIELD);
        let fields = self
            .fields
            .into_iter()
            .map(|(name, value)| (name, unwrap_computed(value)))
            .collect();
        ScoredHit {
            id: self.id,
            index: self.index,
            similarity,
            scaled: None,
            fields,
            source: self.source,
        }
    }
}
