//! Parts search service: query builder, catalogue and formatter in one pass.
//!
//! Everything here is synchronous. The MCP layer calls it from
//! `spawn_blocking`, one request at a time per call.

use crate::db::Catalogue;
use crate::error::{DbError, Result};
use crate::format::PartRecord;
use crate::query::{self, SearchRequest};
use crate::types::LcscId;
use std::sync::Arc;

/// Knobs that change the result shape but not which rows match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// Run the companion `COUNT(*)` query.
    pub with_total: bool,
    /// Read the `extra` column for parametric attributes.
    pub with_attributes: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            with_total: false,
            with_attributes: true,
        }
    }
}

/// One page of matching records.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPage {
    /// At most `limit` records, in request order.
    pub records: Vec<PartRecord>,
    /// Whether at least one more row exists past this page.
    pub has_more: bool,
    /// Total matching rows, when requested.
    pub total: Option<u64>,
}

/// Search and lookup over a shared catalogue handle.
pub struct PartsService {
    catalogue: Arc<Catalogue>,
}

impl PartsService {
    #[must_use]
    pub fn new(catalogue: Arc<Catalogue>) -> Self {
        Self { catalogue }
    }

    /// Returns a reference to the underlying catalogue.
    #[must_use]
    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    /// Runs a search and returns one page.
    ///
    /// An offset past the last match yields an empty page.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Database` if the catalogue cannot run the
    /// statement and `ServerError::Format` for rows of the wrong shape.
    pub fn search(&self, req: &SearchRequest, opts: SearchOptions) -> Result<SearchPage> {
        let built = query::build_search(req, opts.with_attributes);
        tracing::debug!(sql = %built.sql, params = built.params.len(), "search_parts");

        let mut records = self.catalogue.fetch_parts(&built)?;

        let limit = req.page.limit() as usize;
        let has_more = records.len() > limit;
        records.truncate(limit);

        let total = if opts.with_total {
            Some(self.catalogue.count(&query::build_count(req))?)
        } else {
            None
        };

        Ok(SearchPage {
            records,
            has_more,
            total,
        })
    }

    /// Fetches a single part with all columns.
    ///
    /// # Errors
    ///
    /// Returns `DbError::NotFound` (as `ServerError::Database`) when the
    /// catalogue has no such part.
    pub fn part(&self, id: LcscId) -> Result<PartRecord> {
        let mut records = self.catalogue.fetch_parts(&query::build_part_lookup(id))?;
        match records.pop() {
            Some(rec) => Ok(rec),
            None => Err(DbError::NotFound {
                what: "Part",
                id: id.to_string(),
            }
            .into()),
        }
    }
}
