//! The `search_parts` tool.

use crate::error::{QueryError, QueryResult, Result};
use crate::format::{self, PartEntry};
use crate::query::{self, CategoryFilter, Pagination, SearchRequest};
use crate::security;
use crate::services::{PartsService, SearchOptions};
use crate::types::{PartType, SortOrder};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Input for the search_parts tool. All filters are AND-ed.
#[derive(Debug, Default, Clone, Deserialize, JsonSchema)]
pub struct SearchPartsInput {
    /// ASCII case-insensitive substring of the manufacturer part number or description, e.g. "0603"
    pub keyword: Option<String>,
    /// Category id from list_categories
    pub category_id: Option<i64>,
    /// Category or subcategory name (ASCII case-insensitive substring), e.g. "Ferrite Bead"
    pub category: Option<String>,
    /// Manufacturer id from list_manufacturers
    pub manufacturer_id: Option<i64>,
    /// Manufacturer part number as a SQLite LIKE pattern, e.g. "RC0603%"
    pub manufacturer_pn: Option<String>,
    /// Description as a SQLite LIKE pattern, e.g. "%10k%"
    pub description: Option<String>,
    /// Exact package name, e.g. "0603" or "SOT-23-3"
    pub package: Option<String>,
    /// basic, extended or any (default: any)
    pub part_type: Option<PartType>,
    /// Only preferred (true) or only non-preferred (false) parts
    pub preferred: Option<bool>,
    /// Minimum stock quantity (inclusive)
    pub min_stock: Option<i64>,
    /// Maximum unit price in USD at the smallest quantity (inclusive)
    pub max_price: Option<f64>,
    /// stock (default, highest first), price (cheapest first) or lcsc
    pub sort: Option<SortOrder>,
    /// Rows to skip (default: 0)
    pub offset: Option<i64>,
    /// Page size, clamped to 1..=50 (default: 20)
    pub limit: Option<i64>,
    /// Also count all matches (slower on broad searches)
    pub include_total: Option<bool>,
    /// Include parametric attributes (default: true)
    pub include_attributes: Option<bool>,
}

impl SearchPartsInput {
    /// Validates raw input into a request and its options.
    ///
    /// # Errors
    ///
    /// Returns `QueryError` for negative offset or numeric filters, bad
    /// text, or both category forms at once.
    pub fn into_request(self) -> QueryResult<(SearchRequest, SearchOptions)> {
        let category_name = security::clean_text("category", self.category.as_deref())?;
        let category = match (self.category_id, category_name) {
            (Some(_), Some(_)) => {
                return Err(QueryError::Invalid {
                    field: "category",
                    reason: "give either category_id or category, not both".to_string(),
                })
            }
            (Some(id), None) => Some(CategoryFilter::Id(id)),
            (None, Some(name)) => Some(CategoryFilter::Name(name)),
            (None, None) => None,
        };

        let request = SearchRequest {
            keyword: security::clean_text("keyword", self.keyword.as_deref())?,
            category,
            manufacturer_id: self.manufacturer_id,
            mfr_pattern: security::clean_text("manufacturer_pn", self.manufacturer_pn.as_deref())?,
            description_pattern: security::clean_text("description", self.description.as_deref())?,
            package: security::clean_text("package", self.package.as_deref())?,
            part_type: self.part_type.unwrap_or_default(),
            preferred: self.preferred,
            min_stock: query::non_negative("min_stock", self.min_stock)?,
            max_price: query::non_negative_price("max_price", self.max_price)?,
            sort: self.sort.unwrap_or_default(),
            page: Pagination::new(self.offset, self.limit)?,
        };

        let options = SearchOptions {
            with_total: self.include_total.unwrap_or(false),
            with_attributes: self.include_attributes.unwrap_or(true),
        };

        Ok((request, options))
    }
}

/// Output for the search_parts tool.
#[derive(Debug, Serialize, JsonSchema)]
pub struct SearchOutput {
    /// Matching parts in result order
    pub parts: Vec<PartEntry>,
    /// Number of parts in this page
    pub total_returned: usize,
    /// Whether more matches exist past this page
    pub has_more: bool,
    /// Total matches, present when include_total was set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    /// Offset used for this page
    pub offset: i64,
    /// Page size after clamping
    pub limit: u32,
    /// Offset of the next page, when there is one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_offset: Option<i64>,
}

/// Executes the search_parts tool.
///
/// # Errors
///
/// Returns `ServerError::Query` for rejected input, otherwise whatever the
/// catalogue or formatter reported. No partial results are returned.
pub fn execute_search_parts(
    service: &Arc<PartsService>,
    input: SearchPartsInput,
) -> Result<SearchOutput> {
    let (request, options) = input.into_request()?;
    let page = service.search(&request, options)?;

    let parts = format::format_records(&page.records, options.with_attributes);
    let offset = request.page.offset();
    let limit = request.page.limit();

    Ok(SearchOutput {
        total_returned: parts.len(),
        has_more: page.has_more,
        total: page.total,
        offset,
        limit,
        next_offset: page
            .has_more
            .then(|| offset.saturating_add(i64::from(limit))),
        parts,
    })
}
