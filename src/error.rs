//! Error types for jlcparts-mcp.
//!
//! Uses thiserror for ergonomic error handling with proper
//! error chain propagation.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level server error.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Catalogue error: {0}")]
    Database(#[from] DbError),

    #[error("Invalid request: {0}")]
    Query(#[from] QueryError),

    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    #[error("Image error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Catalogue access errors.
///
/// Every variant is fatal for the request that hit it. The catalogue is
/// static and local, so nothing here is retried.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Catalogue schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("Catalogue file not found: {}", path.display())]
    FileMissing { path: PathBuf },

    #[error("{what} not found: {id}")]
    NotFound { what: &'static str, id: String },
}

/// Rejected search input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("{field} must not be negative (got {value})")]
    Negative { field: &'static str, value: String },

    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },

    #[error("{field} is too long ({len} chars, max {max})")]
    TooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("{field} contains a NUL character")]
    ControlChar { field: &'static str },

    #[error("Invalid part number '{0}': expected C<digits> or <digits>")]
    InvalidPartNumber(String),

    #[error("Invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Product photo download failures.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("could not download {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unsupported image type: {0}")]
    UnsupportedType(String),
}

/// Row shape did not match what the formatter expects.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("row is missing mandatory column '{0}'")]
    MissingColumn(&'static str),

    #[error("mandatory column '{0}' is NULL")]
    NullColumn(&'static str),

    #[error("column '{column}' has an unexpected type: {reason}")]
    BadType { column: &'static str, reason: String },
}

/// Result type alias for server operations.
pub type Result<T> = std::result::Result<T, ServerError>;

/// Result type alias for catalogue operations.
pub type DbResult<T> = std::result::Result<T, DbError>;

/// Result type alias for request validation.
pub type QueryResult<T> = std::result::Result<T, QueryError>;

// Error code implementations for machine-readable error responses
impl ServerError {
    /// Returns a machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Database(e) => e.code(),
            Self::Query(e) => e.code(),
            Self::Format(e) => e.code(),
            Self::Fetch(e) => e.code(),
            Self::Config(_) => "CONFIG_ERROR",
        }
    }
}

impl DbError {
    /// Returns a machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Sqlite(_) | Self::Pool(_) => "QUERY_EXECUTION_ERROR",
            Self::SchemaMismatch(_) => "SCHEMA_MISMATCH",
            Self::FileMissing { .. } => "CATALOGUE_MISSING",
            Self::NotFound { .. } => "NOT_FOUND",
        }
    }
}

impl QueryError {
    /// Returns a machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        "INVALID_REQUEST"
    }
}

impl FormatError {
    /// Returns a machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingColumn(_) => "MISSING_COLUMN",
            Self::NullColumn(_) => "NULL_COLUMN",
            Self::BadType { .. } => "BAD_COLUMN_TYPE",
        }
    }
}

impl FetchError {
    /// Returns a machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Http { .. } => "IMAGE_FETCH_ERROR",
            Self::UnsupportedType(_) => "UNSUPPORTED_IMAGE",
        }
    }
}

// Conversion to rmcp protocol errors
impl From<ServerError> for rmcp::ErrorData {
    fn from(err: ServerError) -> Self {
        match err {
            ServerError::Query(e) => rmcp::ErrorData::invalid_params(e.to_string(), None),
            other => rmcp::ErrorData::internal_error(other.to_string(), None),
        }
    }
}
