//! `SQLite` schema bootstrap logic.
//!
//! Uses `CREATE TABLE IF NOT EXISTS`; safe to re-run on every startup.

use sqlx::SqlitePool;

use crate::Result;

/// Apply the key-value blob table to the connected database.
///
/// # Errors
///
/// Returns `AppError::Storage` if the DDL statement fails.
pub async fn bootstrap_schema(pool: &SqlitePool) -> Result<()> {
    let ddl = r"
CREATE TABLE IF NOT EXISTS kv_blob (
    key         TEXT PRIMARY KEY NOT NULL,
    value       TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);
";
    sqlx::raw_sql(ddl).execute(pool).await?;
    Ok(())
}
