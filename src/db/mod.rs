//! Read-only catalogue access with connection pooling.

mod pragmas;
mod schema;

pub use pragmas::apply_read_only_pragmas;
pub use schema::{create_catalogue_schema, verify_schema, REQUIRED_COLUMNS};

use crate::error::{DbError, DbResult, ServerError};
use crate::format::PartRecord;
use crate::query::BuiltQuery;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OpenFlags;
use schemars::JsonSchema;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// A row of the `categories` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct Category {
    pub id: i64,
    pub category: String,
    pub subcategory: String,
}

/// A row of the `manufacturers` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct Manufacturer {
    pub id: i64,
    pub name: String,
}

/// Row counts of the catalogue tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
pub struct CatalogueCounts {
    pub parts: u64,
    pub parts_in_stock: u64,
    pub basic_parts: u64,
    pub categories: u64,
    pub manufacturers: u64,
}

/// Handle to the parts catalogue.
///
/// Uses r2d2 because `rusqlite::Connection` is NOT Sync. Every pooled
/// connection is opened read-only with `query_only` set, so nothing issued
/// through this handle can modify the file.
pub struct Catalogue {
    pool: Pool<SqliteConnectionManager>,
    path: PathBuf,
}

impl Catalogue {
    /// Opens an existing catalogue file read-only and checks its schema.
    ///
    /// # Errors
    ///
    /// Returns `DbError::FileMissing` if `path` is not a file.
    /// Returns `DbError::Pool` if connection pool creation fails.
    /// Returns `DbError::SchemaMismatch` if a required table or column is absent.
    pub fn open(path: &Path) -> DbResult<Self> {
        if !path.is_file() {
            return Err(DbError::FileMissing {
                path: path.to_path_buf(),
            });
        }

        let manager = SqliteConnectionManager::file(path)
            .with_flags(
                OpenFlags::SQLITE_OPEN_READ_ONLY
                    | OpenFlags::SQLITE_OPEN_NO_MUTEX
                    | OpenFlags::SQLITE_OPEN_URI,
            )
            .with_init(|conn| apply_read_only_pragmas(conn));
        let pool = Pool::builder()
            .max_size(4)
            .min_idle(Some(1))
            .build(manager)?;

        {
            let conn = pool.get()?;
            verify_schema(&conn)?;
        }

        tracing::info!("Opened catalogue {}", path.display());

        Ok(Self {
            pool,
            path: path.to_path_buf(),
        })
    }

    /// Path the catalogue was opened from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets a connection from the pool.
    ///
    /// # Errors
    ///
    /// Returns `DbError::Pool` if no connection is available within the timeout.
    pub fn conn(&self) -> DbResult<PooledConnection<SqliteConnectionManager>> {
        self.pool.get().map_err(DbError::from)
    }

    /// Runs a part query and reads every row into a [`PartRecord`].
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Database` if the statement cannot run and
    /// `ServerError::Format` if a row does not have the expected shape.
    pub fn fetch_parts(&self, query: &BuiltQuery) -> Result<Vec<PartRecord>, ServerError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(&query.sql).map_err(DbError::from)?;
        let mut rows = stmt
            .query(rusqlite::params_from_iter(query.params.iter()))
            .map_err(DbError::from)?;

        let mut records = Vec::new();
        while let Some(row) = rows.next().map_err(DbError::from)? {
            records.push(PartRecord::from_row(row)?);
        }

        Ok(records)
    }

    /// Runs a single-value `COUNT(*)` query.
    ///
    /// # Errors
    ///
    /// Returns `DbError::Pool` if no connection is available.
    /// Returns `DbError::Sqlite` if the query execution fails.
    pub fn count(&self, query: &BuiltQuery) -> DbResult<u64> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(&query.sql)?;
        let n: i64 = stmt.query_row(rusqlite::params_from_iter(query.params.iter()), |row| {
            row.get(0)
        })?;
        Ok(n.max(0) as u64)
    }

    /// Lists categories, optionally narrowed to names containing `filter`.
    ///
    /// # Errors
    ///
    /// Returns `DbError::Pool` if no connection is available.
    /// Returns `DbError::Sqlite` if the query execution fails.
    pub fn categories(&self, filter: Option<&str>) -> DbResult<Vec<Category>> {
        let conn = self.conn()?;
        let pattern = crate::security::contains_pattern(filter.unwrap_or(""));
        let mut stmt = conn.prepare_cached(
            r"
            SELECT id, category, subcategory FROM categories
            WHERE category LIKE ?1 ESCAPE '\' OR subcategory LIKE ?1 ESCAPE '\'
            ORDER BY category, subcategory, id
            ",
        )?;

        let results = stmt
            .query_map([pattern], |row| {
                Ok(Category {
                    id: row.get(0)?,
                    category: row.get(1)?,
                    subcategory: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(results)
    }

    /// Looks up one category by id.
    ///
    /// # Errors
    ///
    /// Returns `DbError::Pool` if no connection is available.
    /// Returns `DbError::Sqlite` if the query fails (other than no rows).
    pub fn category(&self, id: i64) -> DbResult<Option<Category>> {
        let conn = self.conn()?;
        let result = conn.query_row(
            "SELECT id, category, subcategory FROM categories WHERE id = ?1",
            [id],
            |row| {
                Ok(Category {
                    id: row.get(0)?,
                    category: row.get(1)?,
                    subcategory: row.get(2)?,
                })
            },
        );

        match result {
            Ok(data) => Ok(Some(data)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DbError::Sqlite(e)),
        }
    }

    /// Lists manufacturers whose name contains `filter`, alphabetically.
    ///
    /// # Errors
    ///
    /// Returns `DbError::Pool` if no connection is available.
    /// Returns `DbError::Sqlite` if the query execution fails.
    pub fn manufacturers(&self, filter: Option<&str>, limit: u32) -> DbResult<Vec<Manufacturer>> {
        let conn = self.conn()?;
        let pattern = crate::security::contains_pattern(filter.unwrap_or(""));
        let mut stmt = conn.prepare_cached(
            r"
            SELECT id, name FROM manufacturers
            WHERE name LIKE ?1 ESCAPE '\'
            ORDER BY name, id
            LIMIT ?2
            ",
        )?;

        let results = stmt
            .query_map(rusqlite::params![pattern, i64::from(limit)], |row| {
                Ok(Manufacturer {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(results)
    }

    /// Looks up one manufacturer by id.
    ///
    /// # Errors
    ///
    /// Returns `DbError::Pool` if no connection is available.
    /// Returns `DbError::Sqlite` if the query fails (other than no rows).
    pub fn manufacturer(&self, id: i64) -> DbResult<Option<Manufacturer>> {
        let conn = self.conn()?;
        let result = conn.query_row(
            "SELECT id, name FROM manufacturers WHERE id = ?1",
            [id],
            |row| {
                Ok(Manufacturer {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            },
        );

        match result {
            Ok(data) => Ok(Some(data)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DbError::Sqlite(e)),
        }
    }

    /// Gets table row counts.
    ///
    /// # Errors
    ///
    /// Returns `DbError::Pool` if no connection is available.
    /// Returns `DbError::Sqlite` if the query execution fails.
    pub fn counts(&self) -> DbResult<CatalogueCounts> {
        let conn = self.conn()?;
        let counts = conn.query_row(
            r"
            SELECT
                (SELECT COUNT(*) FROM components),
                (SELECT COUNT(*) FROM components WHERE stock > 0),
                (SELECT COUNT(*) FROM components WHERE basic = 1),
                (SELECT COUNT(*) FROM categories),
                (SELECT COUNT(*) FROM manufacturers)
            ",
            [],
            |row| {
                let get = |i: usize| row.get::<_, i64>(i).map(|n| n.max(0) as u64);
                Ok(CatalogueCounts {
                    parts: get(0)?,
                    parts_in_stock: get(1)?,
                    basic_parts: get(2)?,
                    categories: get(3)?,
                    manufacturers: get(4)?,
                })
            },
        )?;

        Ok(counts)
    }
}
