//! `SQLite` PRAGMA configuration for a read-only catalogue.

use rusqlite::Connection;

/// Executes a single SQL statement that may return rows (PRAGMAs).
fn exec_stmt(conn: &Connection, sql: &str) -> rusqlite::Result<()> {
    conn.prepare(sql)?.query([])?.next()?;
    Ok(())
}

/// Applies read-tuned PRAGMA settings.
///
/// Runs as the r2d2 init hook on every pooled connection, hence the plain
/// `rusqlite::Result`.
///
/// # Errors
///
/// Returns the first failing PRAGMA's error.
pub fn apply_read_only_pragmas(conn: &Connection) -> rusqlite::Result<()> {
    // Refuse writes even if the file itself is writable
    exec_stmt(conn, "PRAGMA query_only = ON")?;
    // 16MB page cache; the catalogue is several hundred MB
    exec_stmt(conn, "PRAGMA cache_size = -16000")?;
    // 256MB memory-mapped I/O for faster reads
    exec_stmt(conn, "PRAGMA mmap_size = 268435456")?;
    // 5 second busy timeout in case an updater holds a lock
    exec_stmt(conn, "PRAGMA busy_timeout = 5000")?;
    // Sorting scratch space in memory
    exec_stmt(conn, "PRAGMA temp_store = MEMORY")?;

    Ok(())
}
