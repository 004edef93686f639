//! Builder for [`NeighborRequest`].
//!
//! This module provides a fluent API for constructing neighbor requests.

use std::collections::BTreeMap;

use crate::error::{Result, VecinaError};
use crate::query::request::{self, NeighborRequest};
use crate::vector::QueryVector;

/// Builder for constructing [`NeighborRequest`].
///
/// # Example
///
/// ```
/// use vecina::query::NeighborRequestBuilder;
/// use vecina::vector::QueryVector;
///
/// # fn example() -> vecina::error::Result<()> {
/// let vector = QueryVector::new(vec![0.1, 0.2, 0.3])?;
/// let request = NeighborRequestBuilder::new(vector)
///     .k(10)
///     .size(20)
///     .field("title")
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct NeighborRequestBuilder {
    vector: QueryVector,
    k: usize,
    size: usize,
    offset: Option<usize>,
    fields: Vec<String>,
    filters: BTreeMap<String, String>,
    vector_field: String,
}

impl NeighborRequestBuilder {
    /// Create a builder with the default k, size and vector field.
    pub fn new(vector: QueryVector) -> Self {
        Self {
            vector,
            k: request::default_k(),
            size: request::default_size(),
            offset: None,
            fields: Vec::new(),
            filters: BTreeMap::new(),
            vector_field: request::default_vector_field(),
        }
    }

    /// Set the nearest-neighbor candidate pool size.
    pub fn k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    /// Set the number of results to return.
    pub fn size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    /// Set the pagination start offset.
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Add one field to project as a computed field.
    ///
    /// Surrounding whitespace is trimmed; duplicates and empty names are
    /// dropped.
    pub fn field(mut self, name: impl AsRef<str>) -> Self {
        let trimmed = name.as_ref().trim();
        if !trimmed.is_empty() && !self.fields.iter().any(|f| f == trimmed) {
            self.fields.push(trimmed.to_string());
        }
        self
    }

    /// Add multiple fields to project.
    pub fn fields<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            self = self.field(name);
        }
        self
    }

    /// Add an exact-match filter on a field.
    pub fn filter(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(field.into(), value.into());
        self
    }

    /// Set the indexed field holding each candidate's embedding.
    pub fn vector_field(mut self, name: impl Into<String>) -> Self {
        self.vector_field = name.into();
        self
    }

    /// Validate and produce the request.
    ///
    /// `k` and `size` must be at least 1. The vector was already validated
    /// at construction.
    pub fn build(self) -> Result<NeighborRequest> {
        if self.k < 1 {
            return Err(VecinaError::malformed_input("k must be >= 1"));
        }
        if self.size < 1 {
            return Err(VecinaError::malformed_input("size must be >= 1"));
        }
        Ok(NeighborRequest {
            vector: self.vector,
            k: self.k,
            size: self.size,
            offset: self.offset,
            fields: self.fields,
            filters: self.filters,
            vector_field: self.vector_field,
        })
    }
}
