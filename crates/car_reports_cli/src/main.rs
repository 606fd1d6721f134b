//! CLI smoke entry point.
//!
//! # Responsibility
//! - Open the configured report store and print a deterministic summary.
//! - Exercise config, logging, migrations and both services end to end.

use car_reports_core::{
    core_version, init_from_config, open_db, schema_version, CoreConfig, ReportService,
    SqliteReportRepository, SqliteUserRepository, UserService,
};
use log::info;
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("car_reports error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = CoreConfig::from_env()?;
    init_from_config(&config)?;

    let conn = open_db(&config.db_path)?;
    let users = UserService::new(SqliteUserRepository::try_new(&conn)?);
    let reports = ReportService::new(SqliteReportRepository::try_new(&conn)?);

    let user_count = users.find_all()?.len();
    let report_count = reports.find_all()?.len();
    let approved_count = reports.find_approved()?.len();

    println!("car_reports_core version={}", core_version());
    println!("db_path={}", config.db_path.display());
    println!("schema_version={}", schema_version(&conn)?);
    println!("active_users={user_count}");
    println!("active_reports={report_count}");
    println!("approved_reports={approved_count}");

    info!(
        "event=cli_summary module=cli status=ok users={user_count} reports={report_count} approved={approved_count}"
    );
    Ok(())
}
