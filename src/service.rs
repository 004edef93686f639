//! Similarity search orchestration.
//!
//! One call runs the whole pipeline: resolve the query vector (directly or
//! through a field/value lookup), build the neighbor request, make the
//! single engine round trip, then normalize the returned batch. All
//! post-processing is pure in-memory work; nothing is shared across calls.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::engine::{RawHit, SearchEngine};
use crate::error::{Result, VecinaError};
use crate::normalize::{self, NormalizeOptions, ScoredHit};
use crate::query::{NeighborRequestBuilder, elastic, request};
use crate::vector::QueryVector;

/// How the query vector is obtained.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QueryTarget {
    /// The caller supplies the vector directly.
    Vector { vector: QueryVector },
    /// Resolve a field/value pair to the stored vector of the matching
    /// document. A miss is [`VecinaError::NotFound`].
    Lookup { field: String, value: String },
}

/// Whether the top hit is treated as the query's own document and dropped.
///
/// When the vector was resolved by looking up an indexed document, its
/// nearest neighbor is assumed to be itself. That assumption does not hold
/// for arbitrary caller-supplied vectors, so the behavior is an explicit
/// parameter rather than an unconditional slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelfMatch {
    /// Exclude after a lookup, keep for a direct vector.
    #[default]
    Auto,
    /// Always drop the top hit.
    Exclude,
    /// Never drop the top hit.
    Keep,
}

/// Tunables for one similarity search call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Nearest-neighbor candidate pool size.
    #[serde(default = "request::default_k")]
    pub k: usize,
    /// Number of results to return.
    #[serde(default = "request::default_size")]
    pub size: usize,
    /// Pagination start offset.
    #[serde(default)]
    pub offset: Option<usize>,
    /// Extra fields to project.
    #[serde(default)]
    pub fields: Vec<String>,
    /// Exact-match filters.
    #[serde(default)]
    pub filters: BTreeMap<String, String>,
    /// The indexed field holding document embeddings.
    #[serde(default = "request::default_vector_field")]
    pub vector_field: String,
    /// Self-match handling.
    #[serde(default)]
    pub self_match: SelfMatch,
    /// Sort is always applied; rescaling per these options.
    #[serde(flatten)]
    pub normalize: NormalizeOptions,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            k: request::default_k(),
            size: request::default_size(),
            offset: None,
            fields: Vec::new(),
            filters: BTreeMap::new(),
            vector_field: request::default_vector_field(),
            self_match: SelfMatch::default(),
            normalize: NormalizeOptions::default(),
        }
    }
}

/// The similarity search pipeline over an engine collaborator.
#[derive(Debug, Clone)]
pub struct SimilarityService<E> {
    engine: E,
}

impl<E: SearchEngine> SimilarityService<E> {
    /// Create a service over the given engine.
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    /// Run one similarity search and return the normalized hit list.
    pub async fn search(
        &self,
        index: &str,
        target: QueryTarget,
        options: &SearchOptions,
    ) -> Result<Vec<ScoredHit>> {
        let (vector, resolved_by_lookup) = match target {
            QueryTarget::Vector { vector } => (vector, false),
            QueryTarget::Lookup { field, value } => {
                let vector = self
                    .resolve_vector(index, &field, &value, &options.vector_field)
                    .await?;
                (vector, true)
            }
        };

        let exclude_self = match options.self_match {
            SelfMatch::Auto => resolved_by_lookup,
            SelfMatch::Exclude => true,
            SelfMatch::Keep => false,
        };

        // The self-match ranks first, so a non-zero offset has already
        // skipped past it on the engine side; the positional drop and its
        // one-extra fetch only apply to the first page.
        let drop_self = exclude_self && options.offset.is_none_or(|offset| offset == 0);
        let fetch_size = options.size + usize::from(drop_self);
        let request = NeighborRequestBuilder::new(vector.clone())
            .k(options.k)
            .size(fetch_size)
            .fields(options.fields.iter())
            .vector_field(options.vector_field.as_str());
        let request = options
            .filters
            .iter()
            .fold(request, |builder, (field, value)| {
                builder.filter(field.clone(), value.clone())
            });
        let request = match options.offset {
            Some(offset) => request.offset(offset),
            None => request,
        }
        .build()?;

        let mut hits = if self.engine.supports_scripted_fields() {
            let body = elastic::neighbor_body(&request);
            let response = self.engine.search(index, &body).await?;
            log::debug!("engine returned {} hits", response.hits.hits.len());
            response
                .hits
                .hits
                .into_iter()
                .map(RawHit::into_scored)
                .collect::<Result<Vec<_>>>()?
        } else {
            let body = elastic::neighbor_body_unscored(&request);
            let response = self.engine.search(index, &body).await?;
            log::debug!(
                "engine returned {} hits, scoring locally",
                response.hits.hits.len()
            );
            self.score_locally(response.hits.hits, &vector, &request.vector_field, &request.fields)?
        };

        normalize::sort_by_similarity(&mut hits);
        if drop_self && !hits.is_empty() {
            hits.remove(0);
        }
        hits.truncate(options.size);

        if let Some(to) = &options.normalize.scale_to {
            normalize::scale_hits(&mut hits, to, options.normalize.scale_from.as_ref())?;
        }
        Ok(hits)
    }

    /// Fetch a random sample of documents, optionally projecting only the
    /// named source fields.
    pub async fn random(
        &self,
        index: &str,
        size: usize,
        fields: &[String],
    ) -> Result<Vec<RawHit>> {
        if size < 1 {
            return Err(VecinaError::malformed_input("size must be >= 1"));
        }
        let body = elastic::random_body(size, fields);
        let response = self.engine.search(index, &body).await?;
        Ok(response.hits.hits)
    }

    /// Resolve a field/value pair to the stored vector of the matching
    /// document through a one-shot exact-match query.
    async fn resolve_vector(
        &self,
        index: &str,
        field: &str,
        value: &str,
        vector_field: &str,
    ) -> Result<QueryVector> {
        let body = elastic::lookup_body(field, value, vector_field);
        let response = self.engine.search(index, &body).await?;
        let hit = response
            .hits
            .hits
            .into_iter()
            .next()
            .ok_or_else(|| VecinaError::not_found(format!("{field}={value} on {index}")))?;
        let components = hit.source_vector(vector_field).ok_or_else(|| {
            VecinaError::response(format!(
                "document {} has no vector under field {vector_field}",
                hit.id
            ))
        })?;
        QueryVector::new(components)
    }

    /// Compute similarities locally from raw vectors when the engine cannot
    /// evaluate scripted fields. Projected fields are copied out of the
    /// document source instead.
    fn score_locally(
        &self,
        raw_hits: Vec<RawHit>,
        vector: &QueryVector,
        vector_field: &str,
        fields: &[String],
    ) -> Result<Vec<ScoredHit>> {
        raw_hits
            .into_iter()
            .map(|hit| {
                let candidate = hit.source_vector(vector_field).ok_or_else(|| {
                    VecinaError::response(format!(
                        "document {} has no vector under field {vector_field}",
                        hit.id
                    ))
                })?;
                let similarity = vector.cosine_similarity(&candidate)?;
                let mut scored = hit.into_scored_with(similarity);
                if let Some(source) = &scored.source {
                    for field in fields {
                        if let Some(value) = source.get(field) {
                            scored.fields.insert(field.clone(), value.clone());
                        }
                    }
                }
                Ok(scored)
            })
            .collect()
    }
}
