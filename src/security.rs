//! Input hardening for text that reaches the catalogue.
//!
//! Values are always bound as SQL parameters, so nothing here is about
//! quoting. What remains is keeping inputs bounded and making substring
//! searches literal:
//! - Length limits on free text
//! - NUL rejection (SQLite truncates bound text at NUL)
//! - `LIKE` wildcard escaping for substring matches

use crate::error::{QueryError, QueryResult};

/// Maximum accepted length of any free-text search field, in characters.
pub const MAX_TEXT_LEN: usize = 200;

/// Escape character used in every `LIKE ... ESCAPE` clause we emit.
pub const LIKE_ESCAPE: char = '\\';

/// Normalizes an optional free-text input.
///
/// Surrounding whitespace is trimmed and an empty result is treated as
/// "filter not given".
///
/// # Errors
///
/// Returns `QueryError::TooLong` or `QueryError::ControlChar` for inputs
/// that cannot be searched for.
///
/// # Example
///
/// ```
/// use jlcparts_mcp::security::clean_text;
///
/// assert_eq!(clean_text("keyword", Some("  0603 ")).unwrap().as_deref(), Some("0603"));
/// assert_eq!(clean_text("keyword", Some("   ")).unwrap(), None);
/// assert!(clean_text("keyword", Some("a\0b")).is_err());
/// ```
pub fn clean_text(field: &'static str, value: Option<&str>) -> QueryResult<Option<String>> {
    let Some(raw) = value else {
        return Ok(None);
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    if trimmed.contains('\0') {
        return Err(QueryError::ControlChar { field });
    }

    let len = trimmed.chars().count();
    if len > MAX_TEXT_LEN {
        return Err(QueryError::TooLong {
            field,
            len,
            max: MAX_TEXT_LEN,
        });
    }

    Ok(Some(trimmed.to_string()))
}

/// Escapes `LIKE` metacharacters so `value` matches literally.
///
/// Pair the result with `ESCAPE '\'` in the statement.
#[must_use]
pub fn escape_like(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 4);
    for c in value.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            out.push(LIKE_ESCAPE);
        }
        out.push(c);
    }
    out
}

/// Wraps an escaped value in `%...%` for a substring match.
#[must_use]
pub fn contains_pattern(value: &str) -> String {
    format!("%{}%", escape_like(value))
}
