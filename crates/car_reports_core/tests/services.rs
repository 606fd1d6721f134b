use car_reports_core::db::open_db_in_memory;
use car_reports_core::{
    Entity, NewReport, NewUser, Price, ReportId, ReportPatch, ReportService, ServiceError,
    SqliteReportRepository, SqliteUserRepository, UserId, UserPatch, UserService,
    ValidationError,
};
use rusqlite::Connection;

fn user_service(conn: &Connection) -> UserService<SqliteUserRepository<'_>> {
    UserService::new(SqliteUserRepository::try_new(conn).unwrap())
}

fn report_service(conn: &Connection) -> ReportService<SqliteReportRepository<'_>> {
    ReportService::new(SqliteReportRepository::try_new(conn).unwrap())
}

fn alice() -> NewUser {
    NewUser::new("alice@x.com", "Alice", "Smith", "opaque-secret")
}

fn assert_not_found(err: ServiceError, expected_entity: Entity, expected_key: &str) {
    match err {
        ServiceError::NotFound { entity, key } => {
            assert_eq!(entity, expected_entity);
            assert_eq!(key, expected_key);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn duplicate_email_conflicts_until_original_is_removed() {
    let conn = open_db_in_memory().unwrap();
    let users = user_service(&conn);

    let original = users.create(alice()).unwrap();
    let err = users.create(alice()).unwrap_err();
    match err {
        ServiceError::Conflict(message) => {
            assert_eq!(message, "user with this email already exists")
        }
        other => panic!("unexpected error: {other}"),
    }

    users.remove(original.id).unwrap();
    let replacement = users.create(alice()).unwrap();
    assert_ne!(replacement.id, original.id);
}

#[test]
fn lookups_report_not_found() {
    let conn = open_db_in_memory().unwrap();
    let users = user_service(&conn);
    let reports = report_service(&conn);
    let missing_user = UserId::new_v4();
    let missing_report = ReportId::new_v4();

    assert_not_found(
        users.find_one(missing_user).unwrap_err(),
        Entity::User,
        &missing_user.to_string(),
    );
    assert_not_found(
        users.find_by_email("nobody@x.com").unwrap_err(),
        Entity::User,
        "nobody@x.com",
    );
    assert_not_found(
        users
            .update(missing_user, &UserPatch::default())
            .unwrap_err(),
        Entity::User,
        &missing_user.to_string(),
    );
    assert_not_found(
        users.remove(missing_user).unwrap_err(),
        Entity::User,
        &missing_user.to_string(),
    );
    assert_not_found(
        reports.find_one(missing_report).unwrap_err(),
        Entity::Report,
        &missing_report.to_string(),
    );
    assert_not_found(
        reports.approve_report(missing_report).unwrap_err(),
        Entity::Report,
        &missing_report.to_string(),
    );
    assert_not_found(
        reports.remove(missing_report).unwrap_err(),
        Entity::Report,
        &missing_report.to_string(),
    );
}

#[test]
fn remove_twice_reports_not_found() {
    let conn = open_db_in_memory().unwrap();
    let users = user_service(&conn);

    let user = users.create(alice()).unwrap();
    users.remove(user.id).unwrap();
    assert!(matches!(
        users.remove(user.id).unwrap_err(),
        ServiceError::NotFound {
            entity: Entity::User,
            ..
        }
    ));
}

#[test]
fn invalid_input_is_a_validation_error() {
    let conn = open_db_in_memory().unwrap();
    let users = user_service(&conn);

    let mut input = alice();
    input.email = "alice.example.com".to_string();
    assert!(matches!(
        users.create(input).unwrap_err(),
        ServiceError::Validation(ValidationError::InvalidEmail)
    ));
}

#[test]
fn report_for_missing_or_removed_user_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let users = user_service(&conn);
    let reports = report_service(&conn);

    let missing = UserId::new_v4();
    let err = reports
        .create(NewReport::new(
            missing,
            "Toyota",
            "Camry",
            2020,
            1,
            Price::from_cents(100),
        ))
        .unwrap_err();
    assert_not_found(err, Entity::User, &missing.to_string());

    let owner = users.create(alice()).unwrap();
    users.remove(owner.id).unwrap();
    let err = reports
        .create(NewReport::new(
            owner.id,
            "Toyota",
            "Camry",
            2020,
            1,
            Price::from_cents(100),
        ))
        .unwrap_err();
    assert_not_found(err, Entity::User, &owner.id.to_string());
}

#[test]
fn approval_scenario_publishes_report_unchanged() {
    let conn = open_db_in_memory().unwrap();
    let users = user_service(&conn);
    let reports = report_service(&conn);

    let owner = users.create(alice()).unwrap();
    let draft = reports
        .create(NewReport::new(
            owner.id,
            "Honda",
            "Accord",
            2019,
            42_000,
            Price::from_major(18500.00).unwrap(),
        ))
        .unwrap();
    assert!(!draft.is_approved);
    assert!(reports.find_approved().unwrap().is_empty());

    let approved = reports.approve_report(draft.id).unwrap();
    assert!(approved.is_approved);
    assert!(approved.updated_at > draft.updated_at);

    let published = reports.find_approved().unwrap();
    assert_eq!(published.len(), 1);
    let mut expected = draft.clone();
    expected.is_approved = true;
    expected.updated_at = approved.updated_at;
    assert_eq!(published[0].report, expected);
    assert_eq!(
        published[0].user.as_ref().map(|user| user.id),
        Some(owner.id)
    );
}

#[test]
fn user_views_include_reports_and_counts() {
    let conn = open_db_in_memory().unwrap();
    let users = user_service(&conn);
    let reports = report_service(&conn);

    let owner = users.create(alice()).unwrap();
    let report = reports
        .create(NewReport::new(
            owner.id,
            "Toyota",
            "Camry",
            2020,
            30_000,
            Price::from_major(22000.0).unwrap(),
        ))
        .unwrap();

    let loaded = users.find_one(owner.id).unwrap();
    assert_eq!(loaded.reports.len(), 1);
    assert_eq!(loaded.reports[0].id, report.id);
    assert_eq!(users.find_all().unwrap().len(), 1);
    assert_eq!(users.find_by_email("alice@x.com").unwrap().id, owner.id);
    assert_eq!(reports.find_by_user(owner.id).unwrap().len(), 1);

    let counts = users.get_users_with_reports_count().unwrap();
    assert_eq!(counts.len(), 1);
    assert_eq!(counts[0].report_count, 1);

    assert_eq!(users.get_users_by_email_domain("x.com").unwrap().len(), 1);
    assert!(users.get_users_by_email_domain("y.com").unwrap().is_empty());
}

#[test]
fn public_queries_pass_through_empty_results() {
    let conn = open_db_in_memory().unwrap();
    let reports = report_service(&conn);

    assert!(reports.find_all().unwrap().is_empty());
    assert!(reports
        .find_by_make_and_model("Toyota", "Camry")
        .unwrap()
        .is_empty());
    assert!(reports.find_by_year_range(2019, 2020).unwrap().is_empty());
    assert_eq!(
        reports.get_average_price("Toyota", "Camry", None).unwrap(),
        0.0
    );
}

#[test]
fn update_and_remove_report_through_service() {
    let conn = open_db_in_memory().unwrap();
    let users = user_service(&conn);
    let reports = report_service(&conn);

    let owner = users.create(alice()).unwrap();
    let created = reports
        .create(NewReport::new(
            owner.id,
            "Toyota",
            "Camry",
            2020,
            30_000,
            Price::from_major(22000.0).unwrap(),
        ))
        .unwrap();

    let updated = reports
        .update(
            created.id,
            &ReportPatch {
                price: Some(Price::from_major(21500.5).unwrap()),
                ..ReportPatch::default()
            },
        )
        .unwrap();
    assert_eq!(updated.price.cents(), 2_150_050);

    let invalid = reports
        .update(
            created.id,
            &ReportPatch {
                make: Some(String::new()),
                ..ReportPatch::default()
            },
        )
        .unwrap_err();
    assert!(matches!(
        invalid,
        ServiceError::Validation(ValidationError::BlankField("make"))
    ));

    reports.remove(created.id).unwrap();
    assert!(reports.find_one(created.id).is_err());
    assert!(reports.update(created.id, &ReportPatch::approve()).is_err());
}
