//! Catalogue schema contract.
//!
//! The catalogue is produced by the jlcparts project; this crate never
//! creates or migrates it. What it does own is the list of tables and
//! columns its queries rely on, checked once when the catalogue opens.

use crate::error::{DbError, DbResult};
use rusqlite::Connection;

/// Tables and the columns every query in this crate may touch.
pub const REQUIRED_COLUMNS: &[(&str, &[&str])] = &[
    (
        "components",
        &[
            "lcsc",
            "category_id",
            "mfr",
            "package",
            "manufacturer_id",
            "basic",
            "preferred",
            "description",
            "datasheet",
            "stock",
            "price",
            "extra",
        ],
    ),
    ("categories", &["id", "category", "subcategory"]),
    ("manufacturers", &["id", "name"]),
];

/// Checks that every required table and column exists.
///
/// # Errors
///
/// Returns `DbError::SchemaMismatch` naming the first missing table or
/// column, or `DbError::Sqlite` if the schema cannot be read.
pub fn verify_schema(conn: &Connection) -> DbResult<()> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1)")?;

    for (table, columns) in REQUIRED_COLUMNS {
        let present: Vec<String> = stmt
            .query_map([table], |row| row.get(0))?
            .collect::<Result<_, _>>()?;

        if present.is_empty() {
            return Err(DbError::SchemaMismatch(format!("missing table '{table}'")));
        }

        if let Some(col) = columns.iter().find(|c| !present.iter().any(|p| p == **c)) {
            return Err(DbError::SchemaMismatch(format!(
                "table '{table}' has no column '{col}'"
            )));
        }
    }

    Ok(())
}

/// Creates an empty catalogue with the jlcparts layout.
///
/// Only fixtures and benchmarks use this; production catalogues come
/// pre-built. Value columns are nullable so fixtures can model gaps.
#[doc(hidden)]
pub fn create_catalogue_schema(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS categories (
            id INTEGER PRIMARY KEY NOT NULL,
            category TEXT NOT NULL,
            subcategory TEXT NOT NULL,
            UNIQUE (category, subcategory)
        );

        CREATE TABLE IF NOT EXISTS manufacturers (
            id INTEGER PRIMARY KEY NOT NULL,
            name TEXT NOT NULL,
            UNIQUE (id, name)
        );

        CREATE TABLE IF NOT EXISTS components (
            lcsc INTEGER PRIMARY KEY NOT NULL,
            category_id INTEGER,
            mfr TEXT,
            package TEXT,
            joints INTEGER,
            manufacturer_id INTEGER,
            basic INTEGER NOT NULL DEFAULT 0,
            preferred INTEGER NOT NULL DEFAULT 0,
            description TEXT,
            datasheet TEXT,
            stock INTEGER,
            price TEXT,
            last_update INTEGER,
            extra TEXT
        );

        CREATE INDEX IF NOT EXISTS components_category ON components (category_id);
        CREATE INDEX IF NOT EXISTS components_manufacturer ON components (manufacturer_id);
        "#,
    )?;

    Ok(())
}
