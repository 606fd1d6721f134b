//! Connection readiness checks and row decoding helpers shared by the
//! SQLite repositories.

use super::{RepoError, RepoResult};
use crate::db::migrations::{current_user_version, latest_version};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use uuid::Uuid;

/// Table name plus the columns a repository reads or writes.
pub(crate) type TableSpec = (&'static str, &'static [&'static str]);

pub(crate) const USERS_TABLE: TableSpec = (
    "users",
    &[
        "id",
        "created_at",
        "updated_at",
        "deleted_at",
        "email",
        "first_name",
        "last_name",
        "password",
        "is_email_verified",
        "phone_number",
        "date_of_birth",
    ],
);

pub(crate) const REPORTS_TABLE: TableSpec = (
    "reports",
    &[
        "id",
        "created_at",
        "updated_at",
        "deleted_at",
        "make",
        "model",
        "year",
        "mileage",
        "price_cents",
        "longitude",
        "latitude",
        "description",
        "is_approved",
        "user_id",
    ],
);

/// Rejects connections that were not opened through `db::open_*` or whose
/// schema lacks the tables/columns a repository depends on.
pub(crate) fn ensure_connection_ready(conn: &Connection, tables: &[TableSpec]) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &(table, columns) in tables {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}

/// Runs `sql` with positional `binds` and decodes every row with `parse`.
pub(crate) fn query_all<T>(
    conn: &Connection,
    sql: &str,
    binds: Vec<Value>,
    parse: impl Fn(&Row<'_>) -> RepoResult<T>,
) -> RepoResult<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params_from_iter(binds))?;
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        items.push(parse(row)?);
    }
    Ok(items)
}

pub(crate) fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

pub(crate) fn read_bool(row: &Row<'_>, column: &str) -> RepoResult<bool> {
    match row.get::<_, i64>(column)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
