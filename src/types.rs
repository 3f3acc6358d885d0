//! Type-safe newtypes for jlcparts-mcp.
//!
//! These newtypes provide compile-time safety and semantic clarity
//! for core domain concepts.

use crate::error::QueryError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Catalogue part number (the `lcsc` column).
///
/// Stored as a bare integer in the catalogue and displayed with the
/// customary `C` prefix, e.g. `C25804`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct LcscId(pub i64);

impl LcscId {
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn as_i64(self) -> i64 {
        self.0
    }
}

impl fmt::Display for LcscId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = self.0;
        write!(f, "C{id}")
    }
}

impl FromStr for LcscId {
    type Err = QueryError;

    /// Accepts `C25804`, `c25804` or `25804`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix('C')
            .or_else(|| trimmed.strip_prefix('c'))
            .unwrap_or(trimmed);

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(QueryError::InvalidPartNumber(s.to_string()));
        }

        digits
            .parse::<i64>()
            .map(Self)
            .map_err(|_| QueryError::InvalidPartNumber(s.to_string()))
    }
}

/// JLCPCB assembly tier filter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PartType {
    /// Basic parts (no feeder loading fee)
    Basic,
    /// Extended parts
    Extended,
    /// No restriction
    #[default]
    Any,
}

impl PartType {
    /// Value of the catalogue's `basic` column this type selects, if any.
    #[must_use]
    pub const fn basic_flag(self) -> Option<i64> {
        match self {
            Self::Basic => Some(1),
            Self::Extended => Some(0),
            Self::Any => None,
        }
    }
}

impl fmt::Display for PartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic => write!(f, "basic"),
            Self::Extended => write!(f, "extended"),
            Self::Any => write!(f, "any"),
        }
    }
}

impl FromStr for PartType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "basic" => Ok(Self::Basic),
            "extended" => Ok(Self::Extended),
            "any" => Ok(Self::Any),
            other => Err(format!(
                "Invalid part type: '{}'. Valid types: basic, extended, any",
                other
            )),
        }
    }
}

/// Result ordering. Every order ends with `lcsc ASC` so pages are stable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Highest stock first
    #[default]
    Stock,
    /// Cheapest first-break unit price first
    Price,
    /// Ascending part number
    Lcsc,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stock => write!(f, "stock"),
            Self::Price => write!(f, "price"),
            Self::Lcsc => write!(f, "lcsc"),
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stock" => Ok(Self::Stock),
            "price" => Ok(Self::Price),
            "lcsc" => Ok(Self::Lcsc),
            other => Err(format!(
                "Invalid sort order: '{}'. Valid orders: stock, price, lcsc",
                other
            )),
        }
    }
}
