//! Linear rescaling of similarity values into a caller-chosen range.
//!
//! A rescale maps similarities from a source range onto a target range.
//! Source endpoints may be literals or sentinels resolved against the
//! observed min/max of the current batch; the target range decides the
//! output type: an all-integer target truncates the scaled value to an
//! integer, any other target keeps it floating-point.

use serde::{Deserialize, Serialize};

use crate::error::{Result, VecinaError};

/// One endpoint of a source range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum RangeBound {
    /// A concrete number.
    Literal(f64),
    /// The minimum similarity observed in the current batch.
    ObservedMin,
    /// The maximum similarity observed in the current batch.
    ObservedMax,
}

impl RangeBound {
    fn resolve(&self, observed_min: f64, observed_max: f64) -> f64 {
        match self {
            RangeBound::Literal(value) => *value,
            RangeBound::ObservedMin => observed_min,
            RangeBound::ObservedMax => observed_max,
        }
    }
}

/// The range similarity values are mapped from.
///
/// Each endpoint resolves independently, so a literal low bound can be
/// combined with an observed high bound and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SourceRange {
    pub low: RangeBound,
    pub high: RangeBound,
}

impl SourceRange {
    /// A source range with both endpoints taken from the observed batch.
    pub fn observed() -> Self {
        SourceRange {
            low: RangeBound::ObservedMin,
            high: RangeBound::ObservedMax,
        }
    }

    /// A source range with two literal endpoints.
    pub fn literal(low: f64, high: f64) -> Self {
        SourceRange {
            low: RangeBound::Literal(low),
            high: RangeBound::Literal(high),
        }
    }

    /// Resolve sentinels against a batch of similarity values.
    ///
    /// Fails with [`VecinaError::InvalidRange`] when the batch is empty,
    /// since no observed min/max exists. A resolved range with equal
    /// endpoints is legal; the map handles it as the degenerate case.
    pub fn resolve(&self, similarities: &[f64]) -> Result<ResolvedRange> {
        let needs_batch = matches!(self.low, RangeBound::ObservedMin | RangeBound::ObservedMax)
            || matches!(self.high, RangeBound::ObservedMin | RangeBound::ObservedMax);
        if needs_batch && similarities.is_empty() {
            return Err(VecinaError::invalid_range(
                "cannot derive a source range from an empty batch",
            ));
        }

        let observed_min = similarities.iter().copied().fold(f64::INFINITY, f64::min);
        let observed_max = similarities
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);

        Ok(ResolvedRange {
            low: self.low.resolve(observed_min, observed_max),
            high: self.high.resolve(observed_min, observed_max),
        })
    }
}

/// A source range after sentinel resolution; both endpoints concrete.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedRange {
    pub low: f64,
    pub high: f64,
}

impl ResolvedRange {
    /// Whether low and high coincide (all similarities identical).
    pub fn is_degenerate(&self) -> bool {
        self.low == self.high
    }
}

/// The range similarity values are mapped to.
///
/// Callers supplying both endpoints as integers get truncated integer
/// output; any floating-point endpoint keeps the output floating-point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TargetRange {
    /// Integer target: scaled values are truncated to integers.
    Int { low: i64, high: i64 },
    /// Floating-point target: scaled values stay floating-point.
    Float { low: f64, high: f64 },
}

impl TargetRange {
    fn low(&self) -> f64 {
        match self {
            TargetRange::Int { low, .. } => *low as f64,
            TargetRange::Float { low, .. } => *low,
        }
    }

    fn high(&self) -> f64 {
        match self {
            TargetRange::Int { high, .. } => *high as f64,
            TargetRange::Float { high, .. } => *high,
        }
    }

    fn wrap(&self, value: f64) -> ScaledValue {
        match self {
            TargetRange::Int { .. } => ScaledValue::Int(trunc_stable(value)),
            TargetRange::Float { .. } => ScaledValue::Float(value),
        }
    }

    /// Map a similarity value into this range.
    ///
    /// The value is clamped to the resolved source range first, then mapped
    /// linearly. A degenerate source range sends every value to the target's
    /// low endpoint.
    pub fn scale(&self, value: f64, from: &ResolvedRange) -> ScaledValue {
        if from.is_degenerate() {
            return self.wrap(self.low());
        }
        let clamped = value.clamp(from.low.min(from.high), from.low.max(from.high));
        let scaled =
            (clamped - from.low) * (self.high() - self.low()) / (from.high - from.low) + self.low();
        self.wrap(scaled)
    }
}

// The linear map accumulates rounding error, e.g. mapping 0.5 from
// (0.2, 0.8) onto (0, 10) yields 4.999999999999999. Snap to the nearest
// integer when within noise distance, then truncate.
fn trunc_stable(value: f64) -> i64 {
    const EPSILON: f64 = 1e-9;
    let nearest = value.round();
    if (value - nearest).abs() < EPSILON {
        nearest as i64
    } else {
        value.trunc() as i64
    }
}

/// A rescaled similarity, typed per the target range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScaledValue {
    Int(i64),
    Float(f64),
}

impl ScaledValue {
    /// The numeric value regardless of representation.
    pub fn as_f64(&self) -> f64 {
        match self {
            ScaledValue::Int(value) => *value as f64,
            ScaledValue::Float(value) => *value,
        }
    }
}
