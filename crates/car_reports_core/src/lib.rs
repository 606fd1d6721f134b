//! Core persistence and domain services for users and vehicle condition
//! reports.
//! This crate is the single source of truth for record invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, CoreConfig};
pub use db::{open_db, open_db_in_memory, schema_version, DbError, DbResult};
pub use logging::{default_log_level, init_from_config, init_logging, logging_status};
pub use model::price::Price;
pub use model::report::{NewReport, Report, ReportId, ReportPatch, ReportWithUser};
pub use model::user::{NewUser, User, UserId, UserPatch, UserReportCount, UserWithReports};
pub use model::validation::ValidationError;
pub use repo::conditions::Visibility;
pub use repo::report_repo::{ReportRepository, SqliteReportRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{RepoError, RepoResult};
pub use service::report_service::ReportService;
pub use service::user_service::UserService;
pub use service::{Entity, ServiceError, ServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
