//! Query builder: structured search requests to parameterized SQL.
//!
//! Every user-supplied value travels as a bound parameter. Each active
//! filter is an independent [`Predicate`] that contributes one SQL fragment
//! and its own values; the fragments are joined with `AND`. Filters that are
//! not set contribute nothing, so an empty request has no `WHERE` clause.

use crate::error::{QueryError, QueryResult};
use crate::security;
use crate::types::{LcscId, PartType, SortOrder};
use rusqlite::types::Value;

/// Upper bound for a page of results.
pub const MAX_LIMIT: u32 = 50;

/// Page size used when the caller does not give one.
pub const DEFAULT_LIMIT: u32 = 20;

/// Unit price of the first (lowest quantity) price break.
///
/// Guarded with `json_valid` so a malformed price cell reads as NULL
/// instead of failing the whole statement.
const FIRST_BREAK_PRICE: &str =
    "(CASE WHEN json_valid(c.price) THEN json_extract(c.price, '$[0].price') END)";

/// Projection shared by every part query. Column order is what
/// [`crate::format`] reads by name, not by position.
const PART_COLUMNS: &str = "\
    c.lcsc, c.category_id, cat.category, cat.subcategory, \
    c.manufacturer_id, m.name AS manufacturer, c.mfr, c.description, \
    c.package, c.stock, c.price, c.basic, c.preferred, c.datasheet";

const PART_FROM: &str = "\
    FROM components c \
    LEFT JOIN categories cat ON cat.id = c.category_id \
    LEFT JOIN manufacturers m ON m.id = c.manufacturer_id";

/// Validated offset/limit pair.
///
/// Invariant: `1 <= limit <= MAX_LIMIT` and `offset >= 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    offset: i64,
    limit: u32,
}

impl Pagination {
    /// Builds a page from raw caller input.
    ///
    /// The limit is clamped into `[1, MAX_LIMIT]` (absent means
    /// `DEFAULT_LIMIT`). A negative offset is rejected.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::Negative` for a negative offset.
    pub fn new(offset: Option<i64>, limit: Option<i64>) -> QueryResult<Self> {
        let offset = offset.unwrap_or(0);
        if offset < 0 {
            return Err(QueryError::Negative {
                field: "offset",
                value: offset.to_string(),
            });
        }

        Ok(Self {
            offset,
            limit: clamp_limit(limit),
        })
    }

    #[must_use]
    pub const fn offset(self) -> i64 {
        self.offset
    }

    #[must_use]
    pub const fn limit(self) -> u32 {
        self.limit
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Clamps a raw limit into `[1, MAX_LIMIT]`.
#[must_use]
pub fn clamp_limit(limit: Option<i64>) -> u32 {
    match limit {
        None => DEFAULT_LIMIT,
        Some(n) => n.clamp(1, i64::from(MAX_LIMIT)) as u32,
    }
}

/// Checks an integer filter that must be zero or more.
///
/// # Errors
///
/// Returns `QueryError::Negative` when `value < 0`.
pub fn non_negative(field: &'static str, value: Option<i64>) -> QueryResult<Option<i64>> {
    match value {
        Some(v) if v < 0 => Err(QueryError::Negative {
            field,
            value: v.to_string(),
        }),
        other => Ok(other),
    }
}

/// Checks a price filter: finite and zero or more.
///
/// # Errors
///
/// Returns `QueryError::NotFinite` or `QueryError::Negative`.
pub fn non_negative_price(field: &'static str, value: Option<f64>) -> QueryResult<Option<f64>> {
    match value {
        Some(v) if !v.is_finite() => Err(QueryError::NotFinite { field }),
        Some(v) if v < 0.0 => Err(QueryError::Negative {
            field,
            value: v.to_string(),
        }),
        other => Ok(other),
    }
}

/// How a category is selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryFilter {
    /// Exact catalogue category id.
    Id(i64),
    /// Case-insensitive substring of the category or subcategory name.
    Name(String),
}

/// A validated search request.
///
/// Text fields hold trimmed, non-empty values; numeric fields have passed
/// their range checks. Build one through the `tools` layer or directly in
/// tests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchRequest {
    /// Substring matched against part number and description.
    pub keyword: Option<String>,
    pub category: Option<CategoryFilter>,
    pub manufacturer_id: Option<i64>,
    /// Raw `LIKE` pattern for the manufacturer part number.
    pub mfr_pattern: Option<String>,
    /// Raw `LIKE` pattern for the description.
    pub description_pattern: Option<String>,
    /// Exact package name, e.g. `0603`.
    pub package: Option<String>,
    pub part_type: PartType,
    pub preferred: Option<bool>,
    /// Inclusive lower bound on stock.
    pub min_stock: Option<i64>,
    /// Inclusive upper bound on the first price break.
    pub max_price: Option<f64>,
    pub sort: SortOrder,
    pub page: Pagination,
}

impl SearchRequest {
    /// Active filters, in a fixed order.
    #[must_use]
    pub fn predicates(&self) -> Vec<Predicate> {
        let mut preds = Vec::new();

        if let Some(kw) = &self.keyword {
            preds.push(Predicate::Keyword(kw.clone()));
        }
        match &self.category {
            Some(CategoryFilter::Id(id)) => preds.push(Predicate::CategoryId(*id)),
            Some(CategoryFilter::Name(name)) => preds.push(Predicate::CategoryName(name.clone())),
            None => {}
        }
        if let Some(id) = self.manufacturer_id {
            preds.push(Predicate::ManufacturerId(id));
        }
        if let Some(p) = &self.mfr_pattern {
            preds.push(Predicate::MfrLike(p.clone()));
        }
        if let Some(p) = &self.description_pattern {
            preds.push(Predicate::DescriptionLike(p.clone()));
        }
        if let Some(p) = &self.package {
            preds.push(Predicate::Package(p.clone()));
        }
        if let Some(flag) = self.part_type.basic_flag() {
            preds.push(Predicate::Basic(flag == 1));
        }
        if let Some(p) = self.preferred {
            preds.push(Predicate::Preferred(p));
        }
        if let Some(n) = self.min_stock {
            preds.push(Predicate::MinStock(n));
        }
        if let Some(p) = self.max_price {
            preds.push(Predicate::MaxPrice(p));
        }

        preds
    }
}

/// One independently togglable filter.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Keyword(String),
    CategoryId(i64),
    CategoryName(String),
    ManufacturerId(i64),
    MfrLike(String),
    DescriptionLike(String),
    Package(String),
    Basic(bool),
    Preferred(bool),
    MinStock(i64),
    MaxPrice(f64),
}

impl Predicate {
    /// SQL fragment with `?` placeholders. Never contains caller data.
    #[must_use]
    pub fn sql(&self) -> String {
        match self {
            Self::Keyword(_) => {
                "(c.mfr LIKE ? ESCAPE '\\' OR c.description LIKE ? ESCAPE '\\')".to_string()
            }
            Self::CategoryId(_) => "c.category_id = ?".to_string(),
            Self::CategoryName(_) => "c.category_id IN (SELECT id FROM categories \
                 WHERE category LIKE ? ESCAPE '\\' OR subcategory LIKE ? ESCAPE '\\')"
                .to_string(),
            Self::ManufacturerId(_) => "c.manufacturer_id = ?".to_string(),
            Self::MfrLike(_) => "c.mfr LIKE ?".to_string(),
            Self::DescriptionLike(_) => "c.description LIKE ?".to_string(),
            Self::Package(_) => "c.package = ?".to_string(),
            Self::Basic(_) => "c.basic = ?".to_string(),
            Self::Preferred(_) => "c.preferred = ?".to_string(),
            Self::MinStock(_) => "c.stock >= ?".to_string(),
            Self::MaxPrice(_) => format!("{FIRST_BREAK_PRICE} <= ?"),
        }
    }

    /// Values bound to this fragment's placeholders, in order.
    #[must_use]
    pub fn params(&self) -> Vec<Value> {
        match self {
            Self::Keyword(kw) => {
                let pattern = security::contains_pattern(kw);
                vec![Value::Text(pattern.clone()), Value::Text(pattern)]
            }
            Self::CategoryName(name) => {
                let pattern = security::contains_pattern(name);
                vec![Value::Text(pattern.clone()), Value::Text(pattern)]
            }
            Self::CategoryId(id) | Self::ManufacturerId(id) | Self::MinStock(id) => {
                vec![Value::Integer(*id)]
            }
            Self::MfrLike(p) | Self::DescriptionLike(p) | Self::Package(p) => {
                vec![Value::Text(p.clone())]
            }
            Self::Basic(b) | Self::Preferred(b) => vec![Value::Integer(i64::from(*b))],
            Self::MaxPrice(p) => vec![Value::Real(*p)],
        }
    }
}

/// A statement and its positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

/// `WHERE` clause (with leading space) plus its values. Empty when no
/// predicate is active.
fn where_clause(preds: &[Predicate]) -> (String, Vec<Value>) {
    if preds.is_empty() {
        return (String::new(), Vec::new());
    }

    let fragments: Vec<String> = preds.iter().map(Predicate::sql).collect();
    let params = preds.iter().flat_map(Predicate::params).collect();
    (format!(" WHERE {}", fragments.join(" AND ")), params)
}

/// ORDER BY body for a sort order. Every order ends on `c.lcsc ASC`.
#[must_use]
pub fn order_clause(sort: SortOrder) -> String {
    match sort {
        SortOrder::Stock => "c.stock DESC, c.lcsc ASC".to_string(),
        SortOrder::Price => {
            format!("{FIRST_BREAK_PRICE} IS NULL, {FIRST_BREAK_PRICE} ASC, c.lcsc ASC")
        }
        SortOrder::Lcsc => "c.lcsc ASC".to_string(),
    }
}

/// Builds the page query for a request.
///
/// Fetches one row past the limit so the caller can tell whether another
/// page exists without a separate count.
#[must_use]
pub fn build_search(req: &SearchRequest, with_attributes: bool) -> BuiltQuery {
    let (where_sql, mut params) = where_clause(&req.predicates());
    let extra = if with_attributes {
        "c.extra"
    } else {
        "NULL AS extra"
    };

    let sql = format!(
        "SELECT {PART_COLUMNS}, {extra} {PART_FROM}{where_sql} ORDER BY {} LIMIT ? OFFSET ?",
        order_clause(req.sort)
    );

    params.push(Value::Integer(i64::from(req.page.limit()) + 1));
    params.push(Value::Integer(req.page.offset()));

    BuiltQuery { sql, params }
}

/// Builds the `COUNT(*)` companion of [`build_search`] over the same filters.
#[must_use]
pub fn build_count(req: &SearchRequest) -> BuiltQuery {
    let (where_sql, params) = where_clause(&req.predicates());
    BuiltQuery {
        sql: format!("SELECT COUNT(*) FROM components c{where_sql}"),
        params,
    }
}

/// Builds a single-part lookup by catalogue number.
#[must_use]
pub fn build_part_lookup(id: LcscId) -> BuiltQuery {
    BuiltQuery {
        sql: format!("SELECT {PART_COLUMNS}, c.extra {PART_FROM} WHERE c.lcsc = ?"),
        params: vec![Value::Integer(id.as_i64())],
    }
}
