//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for users and reports.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Every read applies an explicit [`conditions::Visibility`]; the default
//!   hides soft-deleted rows.
//! - Writes validate records before any SQL mutation.
//! - Lookups report absence as `None`/`false`, never as an error.

use crate::db::DbError;
use crate::model::validation::ValidationError;
use rusqlite::ffi;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod conditions;
pub mod report_repo;
mod schema;
pub mod user_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for user/report persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Record failed model validation before reaching the store.
    Validation(ValidationError),
    /// Store failure (connectivity, malformed query, unexpected constraint).
    Db(DbError),
    /// Persisted row could not be decoded.
    InvalidData(String),
    /// Insert/update collided with a unique index.
    UniqueViolation {
        table: &'static str,
        column: &'static str,
    },
    /// Write referenced a row that is missing or soft-deleted.
    MissingReference {
        table: &'static str,
        id: Uuid,
    },
    /// Connection schema version does not match this binary.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UniqueViolation { table, column } => {
                write!(f, "unique constraint violated on {table}.{column}")
            }
            Self::MissingReference { table, id } => {
                write!(f, "referenced row not found: {table}.id = {id}")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table missing: {table}"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column missing: {table}.{column}")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Returns the SQLite extended result code when `err` is a constraint
/// failure.
fn constraint_code(err: &rusqlite::Error) -> Option<i32> {
    match err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Some(failure.extended_code)
        }
        _ => None,
    }
}

pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    constraint_code(err) == Some(ffi::SQLITE_CONSTRAINT_UNIQUE)
}

pub(crate) fn is_foreign_key_violation(err: &rusqlite::Error) -> bool {
    constraint_code(err) == Some(ffi::SQLITE_CONSTRAINT_FOREIGNKEY)
}
