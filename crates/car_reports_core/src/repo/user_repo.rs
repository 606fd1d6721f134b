//! User repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD, relation loading and aggregate queries over `users`.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Every query goes through [`Conditions`] with active visibility.
//! - `create` performs no duplicate check; the partial unique index on
//!   active emails is surfaced as [`RepoError::UniqueViolation`].
//! - `update` and `soft_delete` only touch rows with `deleted_at IS NULL`.

use super::conditions::{Conditions, Visibility};
use super::report_repo::{parse_report_row, REPORT_COLUMNS};
use super::schema::{
    bool_to_int, ensure_connection_ready, parse_uuid, query_all, read_bool, REPORTS_TABLE,
    USERS_TABLE,
};
use super::{is_unique_violation, RepoError, RepoResult};
use crate::model::report::Report;
use crate::model::stamp::now_epoch_ms;
use crate::model::user::{NewUser, User, UserId, UserPatch, UserReportCount, UserWithReports};
use rusqlite::{params, Connection, Row};

/// User columns selected through alias `u`, prefixed with `u_`.
pub(crate) const USER_COLUMNS: &str = "u.id AS u_id,
    u.created_at AS u_created_at,
    u.updated_at AS u_updated_at,
    u.deleted_at AS u_deleted_at,
    u.email AS u_email,
    u.first_name AS u_first_name,
    u.last_name AS u_last_name,
    u.password AS u_password,
    u.is_email_verified AS u_is_email_verified,
    u.phone_number AS u_phone_number,
    u.date_of_birth AS u_date_of_birth";

const NEWEST_FIRST: &str = " ORDER BY u.created_at DESC, u.id ASC";

/// Repository interface for user persistence and queries.
pub trait UserRepository {
    /// Stamps and inserts a new user, returning the stored record.
    fn create(&self, new_user: NewUser) -> RepoResult<User>;
    /// All active users with their active reports, newest first.
    fn find_all(&self) -> RepoResult<Vec<UserWithReports>>;
    /// One active user with its active reports.
    fn find_one(&self, id: UserId) -> RepoResult<Option<UserWithReports>>;
    /// Exact, case-sensitive email lookup among active users.
    fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;
    /// Merges `patch` into the active user; `None` when there is none.
    fn update(&self, id: UserId, patch: &UserPatch) -> RepoResult<Option<User>>;
    /// Tombstones the active user; `false` when there was nothing to affect.
    fn soft_delete(&self, id: UserId) -> RepoResult<bool>;
    /// Active users with their active report count, zero included.
    fn find_users_with_reports_count(&self) -> RepoResult<Vec<UserReportCount>>;
    /// Active users whose email ends exactly in `@{domain}`.
    fn find_users_by_email_domain(&self, domain: &str) -> RepoResult<Vec<User>>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &[USERS_TABLE, REPORTS_TABLE])?;
        Ok(Self { conn })
    }

    fn query_users(&self, conditions: Conditions) -> RepoResult<Vec<User>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users u{}{NEWEST_FIRST};",
            conditions.where_sql()
        );
        query_all(self.conn, &sql, conditions.into_binds(), |row| {
            parse_user_row(row)?.ok_or_else(|| {
                RepoError::InvalidData("users.id must not be null".to_string())
            })
        })
    }

    fn with_reports(&self, user: User) -> RepoResult<UserWithReports> {
        let reports = load_reports_for_user(self.conn, user.id)?;
        Ok(UserWithReports { user, reports })
    }

    fn find_active(&self, id: UserId) -> RepoResult<Option<User>> {
        let users = self.query_users(Conditions::active("u").eq_text("id", id.to_string()))?;
        Ok(users.into_iter().next())
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create(&self, new_user: NewUser) -> RepoResult<User> {
        let user = User::from_new(new_user)?;

        let inserted = self.conn.execute(
            "INSERT INTO users (
                id,
                created_at,
                updated_at,
                deleted_at,
                email,
                first_name,
                last_name,
                password,
                is_email_verified,
                phone_number,
                date_of_birth
            ) VALUES (?1, ?2, ?3, NULL, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                user.id.to_string(),
                user.created_at,
                user.updated_at,
                user.email.as_str(),
                user.first_name.as_str(),
                user.last_name.as_str(),
                user.password.as_str(),
                bool_to_int(user.is_email_verified),
                user.phone_number.as_deref(),
                user.date_of_birth,
            ],
        );

        match inserted {
            Ok(_) => Ok(user),
            Err(err) if is_unique_violation(&err) => Err(RepoError::UniqueViolation {
                table: "users",
                column: "email",
            }),
            Err(err) => Err(err.into()),
        }
    }

    fn find_all(&self) -> RepoResult<Vec<UserWithReports>> {
        self.query_users(Conditions::active("u"))?
            .into_iter()
            .map(|user| self.with_reports(user))
            .collect()
    }

    fn find_one(&self, id: UserId) -> RepoResult<Option<UserWithReports>> {
        self.find_active(id)?
            .map(|user| self.with_reports(user))
            .transpose()
    }

    fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let users = self.query_users(Conditions::active("u").eq_text("email", email))?;
        Ok(users.into_iter().next())
    }

    fn update(&self, id: UserId, patch: &UserPatch) -> RepoResult<Option<User>> {
        let Some(mut user) = self.find_active(id)? else {
            return Ok(None);
        };
        user.apply_patch(patch);
        user.validate()?;

        let changed = self.conn.execute(
            "UPDATE users
             SET
                email = ?2,
                first_name = ?3,
                last_name = ?4,
                password = ?5,
                is_email_verified = ?6,
                phone_number = ?7,
                date_of_birth = ?8,
                updated_at = ?9
             WHERE id = ?1
               AND deleted_at IS NULL;",
            params![
                user.id.to_string(),
                user.email.as_str(),
                user.first_name.as_str(),
                user.last_name.as_str(),
                user.password.as_str(),
                bool_to_int(user.is_email_verified),
                user.phone_number.as_deref(),
                user.date_of_birth,
                user.updated_at,
            ],
        );

        match changed {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(user)),
            Err(err) if is_unique_violation(&err) => Err(RepoError::UniqueViolation {
                table: "users",
                column: "email",
            }),
            Err(err) => Err(err.into()),
        }
    }

    fn soft_delete(&self, id: UserId) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE users
             SET
                deleted_at = ?2,
                updated_at = max(updated_at + 1, ?2)
             WHERE id = ?1
               AND deleted_at IS NULL;",
            params![id.to_string(), now_epoch_ms()],
        )?;
        Ok(changed > 0)
    }

    fn find_users_with_reports_count(&self) -> RepoResult<Vec<UserReportCount>> {
        let conditions = Conditions::active("u");
        let report_visibility = Visibility::Active
            .predicate("r")
            .map(|predicate| format!(" AND {predicate}"))
            .unwrap_or_default();
        let sql = format!(
            "SELECT
                u.id AS u_id,
                u.email AS u_email,
                u.first_name AS u_first_name,
                u.last_name AS u_last_name,
                COUNT(r.id) AS report_count
             FROM users u
             LEFT JOIN reports r
               ON r.user_id = u.id{report_visibility}{}
             GROUP BY u.id{NEWEST_FIRST};",
            conditions.where_sql()
        );

        query_all(self.conn, &sql, conditions.into_binds(), |row| {
            let id_text: String = row.get("u_id")?;
            Ok(UserReportCount {
                id: parse_uuid(&id_text, "users.id")?,
                email: row.get("u_email")?,
                first_name: row.get("u_first_name")?,
                last_name: row.get("u_last_name")?,
                report_count: row.get("report_count")?,
            })
        })
    }

    fn find_users_by_email_domain(&self, domain: &str) -> RepoResult<Vec<User>> {
        let suffix = format!("@{domain}");
        self.query_users(Conditions::active("u").ends_with("email", suffix))
    }
}

/// Decodes the `u_`-prefixed user columns of `row`.
///
/// Returns `None` when the user side of a LEFT JOIN matched nothing.
pub(crate) fn parse_user_row(row: &Row<'_>) -> RepoResult<Option<User>> {
    let Some(id_text) = row.get::<_, Option<String>>("u_id")? else {
        return Ok(None);
    };

    Ok(Some(User {
        id: parse_uuid(&id_text, "users.id")?,
        email: row.get("u_email")?,
        first_name: row.get("u_first_name")?,
        last_name: row.get("u_last_name")?,
        password: row.get("u_password")?,
        is_email_verified: read_bool(row, "u_is_email_verified")?,
        phone_number: row.get("u_phone_number")?,
        date_of_birth: row.get("u_date_of_birth")?,
        created_at: row.get("u_created_at")?,
        updated_at: row.get("u_updated_at")?,
        deleted_at: row.get("u_deleted_at")?,
    }))
}

fn load_reports_for_user(conn: &Connection, user_id: UserId) -> RepoResult<Vec<Report>> {
    let conditions = Conditions::active("r").eq_text("user_id", user_id.to_string());
    let sql = format!(
        "SELECT {REPORT_COLUMNS} FROM reports r{} ORDER BY r.created_at DESC, r.id ASC;",
        conditions.where_sql()
    );
    query_all(conn, &sql, conditions.into_binds(), parse_report_row)
}
