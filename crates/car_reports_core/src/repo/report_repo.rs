//! Report repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD, owner relation loading and filter/aggregate queries over
//!   `reports`.
//!
//! # Invariants
//! - Every query goes through [`Conditions`] with active visibility; the
//!   owner join only matches active users.
//! - Public listings (`find_by_make_and_model`, `find_by_year_range`,
//!   `find_approved`, `find_average_price`) only see approved reports.
//! - `create` refuses owners that are missing or soft-deleted.

use super::conditions::{Conditions, Visibility};
use super::schema::{
    bool_to_int, ensure_connection_ready, parse_uuid, query_all, read_bool, REPORTS_TABLE,
    USERS_TABLE,
};
use super::user_repo::{parse_user_row, USER_COLUMNS};
use super::{is_foreign_key_violation, RepoError, RepoResult};
use crate::model::price::Price;
use crate::model::report::{NewReport, Report, ReportId, ReportPatch, ReportWithUser};
use crate::model::stamp::now_epoch_ms;
use crate::model::user::UserId;
use rusqlite::{params, Connection, Row};

/// Report columns selected through alias `r`, prefixed with `r_`.
pub(crate) const REPORT_COLUMNS: &str = "r.id AS r_id,
    r.created_at AS r_created_at,
    r.updated_at AS r_updated_at,
    r.deleted_at AS r_deleted_at,
    r.make AS r_make,
    r.model AS r_model,
    r.year AS r_year,
    r.mileage AS r_mileage,
    r.price_cents AS r_price_cents,
    r.longitude AS r_longitude,
    r.latitude AS r_latitude,
    r.description AS r_description,
    r.is_approved AS r_is_approved,
    r.user_id AS r_user_id";

const NEWEST_FIRST: &str = " ORDER BY r.created_at DESC, r.id ASC";
const YEAR_DESC: &str = " ORDER BY r.year DESC, r.created_at DESC, r.id ASC";

/// Repository interface for report persistence and queries.
pub trait ReportRepository {
    /// Stamps and inserts a new report for an active owner.
    fn create(&self, new_report: NewReport) -> RepoResult<Report>;
    /// All active reports with their owner, newest first.
    fn find_all(&self) -> RepoResult<Vec<ReportWithUser>>;
    /// One active report with its owner.
    fn find_one(&self, id: ReportId) -> RepoResult<Option<ReportWithUser>>;
    /// Active reports of one user, newest first.
    fn find_by_user(&self, user_id: UserId) -> RepoResult<Vec<Report>>;
    /// Merges `patch` into the active report; `None` when there is none.
    fn update(&self, id: ReportId, patch: &ReportPatch) -> RepoResult<Option<Report>>;
    /// Tombstones the active report; `false` when there was nothing to affect.
    fn soft_delete(&self, id: ReportId) -> RepoResult<bool>;
    /// Approved reports matching make and model exactly, newest first.
    fn find_by_make_and_model(&self, make: &str, model: &str) -> RepoResult<Vec<ReportWithUser>>;
    /// Approved reports with `min_year <= year <= max_year`, year descending.
    fn find_by_year_range(&self, min_year: i32, max_year: i32) -> RepoResult<Vec<ReportWithUser>>;
    /// All approved reports, newest first.
    fn find_approved(&self) -> RepoResult<Vec<ReportWithUser>>;
    /// Mean price of approved matching reports; `0.0` when none match.
    fn find_average_price(&self, make: &str, model: &str, year: Option<i32>) -> RepoResult<f64>;
}

/// SQLite-backed report repository.
pub struct SqliteReportRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteReportRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &[USERS_TABLE, REPORTS_TABLE])?;
        Ok(Self { conn })
    }

    fn query_reports(&self, conditions: Conditions, order_by: &str) -> RepoResult<Vec<Report>> {
        let sql = format!(
            "SELECT {REPORT_COLUMNS} FROM reports r{}{order_by};",
            conditions.where_sql()
        );
        query_all(self.conn, &sql, conditions.into_binds(), parse_report_row)
    }

    fn query_with_owner(
        &self,
        conditions: Conditions,
        order_by: &str,
    ) -> RepoResult<Vec<ReportWithUser>> {
        let owner_visibility = Visibility::Active
            .predicate("u")
            .map(|predicate| format!(" AND {predicate}"))
            .unwrap_or_default();
        let sql = format!(
            "SELECT {REPORT_COLUMNS}, {USER_COLUMNS}
             FROM reports r
             LEFT JOIN users u
               ON u.id = r.user_id{owner_visibility}{}{order_by};",
            conditions.where_sql()
        );
        query_all(self.conn, &sql, conditions.into_binds(), |row| {
            Ok(ReportWithUser {
                report: parse_report_row(row)?,
                user: parse_user_row(row)?,
            })
        })
    }

    fn find_active(&self, id: ReportId) -> RepoResult<Option<Report>> {
        let reports = self.query_reports(
            Conditions::active("r").eq_text("id", id.to_string()),
            NEWEST_FIRST,
        )?;
        Ok(reports.into_iter().next())
    }

    fn approved() -> Conditions {
        Conditions::active("r").eq_bool("is_approved", true)
    }
}

impl ReportRepository for SqliteReportRepository<'_> {
    fn create(&self, new_report: NewReport) -> RepoResult<Report> {
        let report = Report::from_new(new_report)?;

        let inserted = self.conn.execute(
            "INSERT INTO reports (
                id,
                created_at,
                updated_at,
                deleted_at,
                make,
                model,
                year,
                mileage,
                price_cents,
                longitude,
                latitude,
                description,
                is_approved,
                user_id
            )
            SELECT ?1, ?2, ?3, NULL, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13
            WHERE EXISTS (
                SELECT 1
                FROM users
                WHERE id = ?13
                  AND deleted_at IS NULL
            );",
            params![
                report.id.to_string(),
                report.created_at,
                report.updated_at,
                report.make.as_str(),
                report.model.as_str(),
                report.year,
                report.mileage,
                report.price.cents(),
                report.longitude,
                report.latitude,
                report.description.as_deref(),
                bool_to_int(report.is_approved),
                report.user_id.to_string(),
            ],
        );

        let missing_owner = RepoError::MissingReference {
            table: "users",
            id: report.user_id,
        };
        match inserted {
            Ok(0) => Err(missing_owner),
            Ok(_) => Ok(report),
            Err(err) if is_foreign_key_violation(&err) => Err(missing_owner),
            Err(err) => Err(err.into()),
        }
    }

    fn find_all(&self) -> RepoResult<Vec<ReportWithUser>> {
        self.query_with_owner(Conditions::active("r"), NEWEST_FIRST)
    }

    fn find_one(&self, id: ReportId) -> RepoResult<Option<ReportWithUser>> {
        let reports = self.query_with_owner(
            Conditions::active("r").eq_text("id", id.to_string()),
            NEWEST_FIRST,
        )?;
        Ok(reports.into_iter().next())
    }

    fn find_by_user(&self, user_id: UserId) -> RepoResult<Vec<Report>> {
        self.query_reports(
            Conditions::active("r").eq_text("user_id", user_id.to_string()),
            NEWEST_FIRST,
        )
    }

    fn update(&self, id: ReportId, patch: &ReportPatch) -> RepoResult<Option<Report>> {
        let Some(mut report) = self.find_active(id)? else {
            return Ok(None);
        };
        report.apply_patch(patch);
        report.validate()?;

        let changed = self.conn.execute(
            "UPDATE reports
             SET
                make = ?2,
                model = ?3,
                year = ?4,
                mileage = ?5,
                price_cents = ?6,
                longitude = ?7,
                latitude = ?8,
                description = ?9,
                is_approved = ?10,
                updated_at = ?11
             WHERE id = ?1
               AND deleted_at IS NULL;",
            params![
                report.id.to_string(),
                report.make.as_str(),
                report.model.as_str(),
                report.year,
                report.mileage,
                report.price.cents(),
                report.longitude,
                report.latitude,
                report.description.as_deref(),
                bool_to_int(report.is_approved),
                report.updated_at,
            ],
        )?;

        if changed == 0 {
            return Ok(None);
        }
        Ok(Some(report))
    }

    fn soft_delete(&self, id: ReportId) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE reports
             SET
                deleted_at = ?2,
                updated_at = max(updated_at + 1, ?2)
             WHERE id = ?1
               AND deleted_at IS NULL;",
            params![id.to_string(), now_epoch_ms()],
        )?;
        Ok(changed > 0)
    }

    fn find_by_make_and_model(&self, make: &str, model: &str) -> RepoResult<Vec<ReportWithUser>> {
        self.query_with_owner(
            Self::approved()
                .eq_text("make", make)
                .eq_text("model", model),
            NEWEST_FIRST,
        )
    }

    fn find_by_year_range(&self, min_year: i32, max_year: i32) -> RepoResult<Vec<ReportWithUser>> {
        self.query_with_owner(
            Self::approved()
                .between("year", i64::from(min_year), i64::from(max_year)),
            YEAR_DESC,
        )
    }

    fn find_approved(&self) -> RepoResult<Vec<ReportWithUser>> {
        self.query_with_owner(Self::approved(), NEWEST_FIRST)
    }

    fn find_average_price(&self, make: &str, model: &str, year: Option<i32>) -> RepoResult<f64> {
        let mut conditions = Self::approved()
            .eq_text("make", make)
            .eq_text("model", model);
        if let Some(year) = year {
            conditions = conditions.eq_int("year", i64::from(year));
        }

        let sql = format!(
            "SELECT AVG(r.price_cents) FROM reports r{};",
            conditions.where_sql()
        );
        let average_cents: Option<f64> = self.conn.query_row(
            &sql,
            rusqlite::params_from_iter(conditions.into_binds()),
            |row| row.get(0),
        )?;

        Ok(average_cents.map_or(0.0, |cents| cents / 100.0))
    }
}

/// Decodes the `r_`-prefixed report columns of `row`.
pub(crate) fn parse_report_row(row: &Row<'_>) -> RepoResult<Report> {
    let id_text: String = row.get("r_id")?;
    let user_id_text: String = row.get("r_user_id")?;

    Ok(Report {
        id: parse_uuid(&id_text, "reports.id")?,
        make: row.get("r_make")?,
        model: row.get("r_model")?,
        year: row.get("r_year")?,
        mileage: row.get("r_mileage")?,
        price: Price::from_cents(row.get("r_price_cents")?),
        longitude: row.get("r_longitude")?,
        latitude: row.get("r_latitude")?,
        description: row.get("r_description")?,
        is_approved: read_bool(row, "r_is_approved")?,
        user_id: parse_uuid(&user_id_text, "reports.user_id")?,
        created_at: row.get("r_created_at")?,
        updated_at: row.get("r_updated_at")?,
        deleted_at: row.get("r_deleted_at")?,
    })
}
