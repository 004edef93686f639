//! Result normalization: sorting, rescaling, and projection passthrough.
//!
//! The normalizer owns the client-facing shape of a hit batch. Hits are
//! always re-sorted descending by the computed `similarity` value; the
//! engine's own ordering is never trusted, since the computed score is not
//! the engine's ranking key and the two silently diverge. Rescaling, when
//! requested, attaches a `scaled` value to every hit and leaves the
//! original similarity untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, VecinaError};
use crate::scale::{ScaledValue, SourceRange, TargetRange};

/// A single hit after scoring, as returned to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredHit {
    /// Document identifier.
    pub id: String,
    /// The index the document came from, when the engine reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
    /// The computed similarity, retained unchanged through rescaling.
    pub similarity: f64,
    /// The rescaled similarity, present only when rescaling was requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaled: Option<ScaledValue>,
    /// Projected fields, passed through keyed by field name.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub fields: Map<String, Value>,
    /// The document's source blob, when the engine returned one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Value>,
}

/// How to post-process a hit batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NormalizeOptions {
    /// Target range for rescaling. None disables rescaling.
    #[serde(default)]
    pub scale_to: Option<TargetRange>,
    /// Source range for rescaling. None means the observed min/max of the
    /// batch.
    #[serde(default)]
    pub scale_from: Option<SourceRange>,
}

/// Sort hits descending by similarity.
pub fn sort_by_similarity(hits: &mut [ScoredHit]) {
    hits.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Rescale every hit's similarity into the target range.
///
/// The source range defaults to the observed min/max of the batch; sentinel
/// endpoints resolve against the batch independently. An empty batch has no
/// observable range and fails with [`VecinaError::InvalidRange`].
pub fn scale_hits(
    hits: &mut [ScoredHit],
    to: &TargetRange,
    from: Option<&SourceRange>,
) -> Result<()> {
    if hits.is_empty() {
        return Err(VecinaError::invalid_range(
            "cannot rescale an empty hit batch",
        ));
    }

    let similarities: Vec<f64> = hits.iter().map(|hit| hit.similarity).collect();
    let source = from.copied().unwrap_or_else(SourceRange::observed);
    let resolved = source.resolve(&similarities)?;

    for hit in hits.iter_mut() {
        hit.scaled = Some(to.scale(hit.similarity, &resolved));
    }
    Ok(())
}

/// Apply the full normalization pipeline: sort, then rescale if requested.
pub fn normalize(hits: &mut [ScoredHit], options: &NormalizeOptions) -> Result<()> {
    sort_by_similarity(hits);
    if let Some(to) = &options.scale_to {
        scale_hits(hits, to, options.scale_from.as_ref())?;
    }
    Ok(())
}
