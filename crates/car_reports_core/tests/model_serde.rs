use car_reports_core::db::open_db_in_memory;
use car_reports_core::{
    NewReport, NewUser, Price, ReportRepository, SqliteReportRepository, SqliteUserRepository,
    UserRepository,
};
use chrono::NaiveDate;
use serde_json::{json, Value};

#[test]
fn user_serializes_camel_case_without_password() {
    let conn = open_db_in_memory().unwrap();
    let users = SqliteUserRepository::try_new(&conn).unwrap();

    let mut input = NewUser::new("alice@x.com", "Alice", "Smith", "opaque-secret");
    input.date_of_birth = NaiveDate::from_ymd_opt(1990, 4, 12);
    let user = users.create(input).unwrap();

    let value = serde_json::to_value(&user).unwrap();
    assert_eq!(value["email"], "alice@x.com");
    assert_eq!(value["firstName"], "Alice");
    assert_eq!(value["isEmailVerified"], false);
    assert_eq!(value["dateOfBirth"], "1990-04-12");
    assert_eq!(value["phoneNumber"], Value::Null);
    assert_eq!(value["deletedAt"], Value::Null);
    assert!(value.get("password").is_none());
    assert!(value.get("first_name").is_none());
}

#[test]
fn report_relations_flatten_the_record() {
    let conn = open_db_in_memory().unwrap();
    let users = SqliteUserRepository::try_new(&conn).unwrap();
    let reports = SqliteReportRepository::try_new(&conn).unwrap();

    let owner = users
        .create(NewUser::new("alice@x.com", "Alice", "Smith", "opaque-secret"))
        .unwrap();
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

    let with_user = reports.find_one(report.id).unwrap().unwrap();
    let value = serde_json::to_value(&with_user).unwrap();
    assert_eq!(value["id"], report.id.to_string());
    assert_eq!(value["price"], 22000.0);
    assert_eq!(value["isApproved"], false);
    assert_eq!(value["userId"], owner.id.to_string());
    assert_eq!(value["user"]["email"], "alice@x.com");
    assert!(value["user"].get("password").is_none());

    let with_reports = users.find_one(owner.id).unwrap().unwrap();
    let value = serde_json::to_value(&with_reports).unwrap();
    assert_eq!(value["lastName"], "Smith");
    assert_eq!(value["reports"][0]["make"], "Toyota");
}

#[test]
fn creation_inputs_deserialize_from_camel_case() {
    let owner = uuid::Uuid::new_v4();
    let input: NewReport = serde_json::from_value(json!({
        "make": "Toyota",
        "model": "Camry",
        "year": 2020,
        "mileage": 30000,
        "price": 18500.5,
        "latitude": 37.7749,
        "userId": owner,
    }))
    .unwrap();

    assert_eq!(input.user_id, owner);
    assert_eq!(input.price.cents(), 1_850_050);
    assert_eq!(input.latitude, Some(37.7749));
    assert_eq!(input.longitude, None);
    assert!(!input.is_approved);
    assert!(input.id.is_none());

    let user: NewUser = serde_json::from_value(json!({
        "email": "bob@x.com",
        "firstName": "Bob",
        "lastName": "Jones",
        "password": "opaque",
        "dateOfBirth": "1985-01-31",
    }))
    .unwrap();
    assert_eq!(user.first_name, "Bob");
    assert_eq!(user.date_of_birth, NaiveDate::from_ymd_opt(1985, 1, 31));
    assert!(!user.is_email_verified);

    let negative: Result<NewReport, _> = serde_json::from_value(json!({
        "make": "Toyota",
        "model": "Camry",
        "year": 2020,
        "mileage": -5,
        "price": 1.0,
        "userId": owner,
    }));
    assert!(negative.is_err());
}
