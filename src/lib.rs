//! jlcparts-mcp: MCP server for the JLCPCB assembly parts catalogue.
//!
//! This library exposes a pre-built jlcparts SQLite catalogue to AI
//! assistants:
//! - Structured search requests translated into bound-parameter SQL
//! - Deterministic ordering and clamped pagination
//! - Compact part entries with explicit "unknown" markers
//! - Read-only access, verified schema
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │              MCP Server (rmcp)              │
//! │         JSON-RPC over stdin/stdout          │
//! └─────────────────┬───────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────┐
//! │               Tool Router                    │
//! │  search_parts, get_part, list_categories... │
//! └─────────────────┬───────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────┐
//! │             Parts Service                    │
//! │     (spawn_blocking for async bridge)       │
//! └───────┬─────────────────────┬───────────────┘
//!         │                     │
//!    ┌────▼─────┐         ┌─────▼─────┐
//!    │  Query   │         │  Result   │
//!    │ Builder  │         │ Formatter │
//!    └────┬─────┘         └─────▲─────┘
//!         │                     │
//!    ┌────▼─────────────────────┴──┐
//!    │  SQLite catalogue (read-only)│
//!    │   (r2d2 connection pool)     │
//!    └──────────────────────────────┘
//! ```

pub mod db;
pub mod error;
pub mod fmt;
pub mod format;
pub mod query;
pub mod security;
pub mod server;
pub mod services;
pub mod tools;
pub mod types;

pub use error::{Result, ServerError};
pub use types::{LcscId, PartType, SortOrder};

use std::path::PathBuf;

/// Environment variable holding the catalogue path.
pub const DB_PATH_ENV: &str = "JLCPCB_DB_PATH";

/// Computes the fallback catalogue path.
///
/// The path is `<data dir>/jlcparts/cache.sqlite3`, where the jlcparts
/// tooling leaves its reassembled database.
#[must_use]
pub fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("jlcparts")
        .join("cache.sqlite3")
}

/// Resolves the catalogue path: explicit value first, then the fallback.
///
/// The explicit value already covers `--db` and `JLCPCB_DB_PATH` (clap
/// reads the variable).
///
/// # Errors
///
/// Returns `ServerError::Config` if the resolved path is not a file.
pub fn resolve_db_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
    let path = explicit.unwrap_or_else(default_db_path);
    if !path.is_file() {
        return Err(ServerError::Config(format!(
            "catalogue not found at {}. Pass --db or set {}",
            path.display(),
            DB_PATH_ENV
        )));
    }
    Ok(path)
}
