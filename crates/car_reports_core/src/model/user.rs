//! User domain model.
//!
//! # Responsibility
//! - Define the canonical user record plus its creation input and patch.
//! - Provide explicit stamping (`from_new`) and merge (`apply_patch`) helpers.
//!
//! # Invariants
//! - `id` is stable and never reused.
//! - `email` is unique among active users; the store enforces it with a
//!   partial unique index.
//! - `password` is opaque. Hashing belongs to the caller and the value is
//!   never serialized outward.

use super::report::Report;
use super::stamp::{creation_stamp, next_update_stamp, resolve_id, EpochMs};
use super::validation::{check_email, limit_text, require_text, ValidationError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type UserId = Uuid;

pub const EMAIL_MAX_CHARS: usize = 255;
pub const NAME_MAX_CHARS: usize = 100;
pub const PASSWORD_MAX_CHARS: usize = 255;
pub const PHONE_MAX_CHARS: usize = 50;

/// Canonical user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub is_email_verified: bool,
    pub phone_number: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub created_at: EpochMs,
    pub updated_at: EpochMs,
    /// Soft delete tombstone; `Some` hides the row from every default read.
    pub deleted_at: Option<EpochMs>,
}

/// Input for creating a user. `id` is generated when absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    #[serde(default)]
    pub id: Option<UserId>,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    #[serde(default)]
    pub is_email_verified: bool,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
}

impl NewUser {
    pub fn new(
        email: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            password: password.into(),
            ..Self::default()
        }
    }
}

/// Partial update for a user.
///
/// `None` leaves a field untouched. For nullable columns the inner option
/// distinguishes "set to null" (`Some(None)`) from "leave as is" (`None`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: Option<String>,
    pub is_email_verified: Option<bool>,
    pub phone_number: Option<Option<String>>,
    pub date_of_birth: Option<Option<NaiveDate>>,
}

/// A user together with its active reports, newest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserWithReports {
    #[serde(flatten)]
    pub user: User,
    pub reports: Vec<Report>,
}

/// Typed projection of the per-user report count aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserReportCount {
    pub id: UserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub report_count: i64,
}

impl User {
    /// Builds a new active user, stamping id and timestamps.
    ///
    /// # Errors
    /// - Returns a validation error when any field violates record limits.
    pub fn from_new(new_user: NewUser) -> Result<Self, ValidationError> {
        let id = resolve_id(new_user.id)?;
        let stamp = creation_stamp();
        let user = Self {
            id,
            email: new_user.email,
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            password: new_user.password,
            is_email_verified: new_user.is_email_verified,
            phone_number: new_user.phone_number,
            date_of_birth: new_user.date_of_birth,
            created_at: stamp.created_at,
            updated_at: stamp.updated_at,
            deleted_at: None,
        };
        user.validate()?;
        Ok(user)
    }

    /// Merges present patch fields and refreshes `updated_at`.
    ///
    /// Does not validate; callers validate before persisting.
    pub fn apply_patch(&mut self, patch: &UserPatch) {
        if let Some(email) = &patch.email {
            self.email = email.clone();
        }
        if let Some(first_name) = &patch.first_name {
            self.first_name = first_name.clone();
        }
        if let Some(last_name) = &patch.last_name {
            self.last_name = last_name.clone();
        }
        if let Some(password) = &patch.password {
            self.password = password.clone();
        }
        if let Some(verified) = patch.is_email_verified {
            self.is_email_verified = verified;
        }
        if let Some(phone_number) = &patch.phone_number {
            self.phone_number = phone_number.clone();
        }
        if let Some(date_of_birth) = patch.date_of_birth {
            self.date_of_birth = date_of_birth;
        }
        self.updated_at = next_update_stamp(self.updated_at);
    }

    /// Checks record-level invariants.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_nil() {
            return Err(ValidationError::NilId);
        }
        check_email(&self.email, EMAIL_MAX_CHARS)?;
        require_text("first_name", &self.first_name, NAME_MAX_CHARS)?;
        require_text("last_name", &self.last_name, NAME_MAX_CHARS)?;
        require_text("password", &self.password, PASSWORD_MAX_CHARS)?;
        if let Some(phone) = &self.phone_number {
            limit_text("phone_number", phone, PHONE_MAX_CHARS)?;
        }
        Ok(())
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::{NewUser, User, UserPatch};
    use crate::model::validation::ValidationError;
    use chrono::NaiveDate;

    fn alice() -> NewUser {
        NewUser::new("alice@x.com", "Alice", "Smith", "opaque-secret")
    }

    #[test]
    fn from_new_stamps_identity_and_defaults() {
        let user = User::from_new(alice()).unwrap();
        assert!(!user.id.is_nil());
        assert_eq!(user.created_at, user.updated_at);
        assert!(!user.is_email_verified);
        assert!(user.is_active());
        assert_eq!(user.full_name(), "Alice Smith");
    }

    #[test]
    fn from_new_rejects_invalid_fields() {
        let mut input = alice();
        input.first_name = " ".to_string();
        assert_eq!(
            User::from_new(input).unwrap_err(),
            ValidationError::BlankField("first_name")
        );

        let mut input = alice();
        input.email = "not-an-email".to_string();
        assert_eq!(
            User::from_new(input).unwrap_err(),
            ValidationError::InvalidEmail
        );
    }

    #[test]
    fn apply_patch_touches_only_present_fields() {
        let mut user = User::from_new(alice()).unwrap();
        user.phone_number = Some("+1 555 0100".to_string());
        let before = user.clone();

        let patch = UserPatch {
            last_name: Some("Jones".to_string()),
            date_of_birth: Some(NaiveDate::from_ymd_opt(1990, 4, 2)),
            phone_number: Some(None),
            ..UserPatch::default()
        };
        user.apply_patch(&patch);

        assert_eq!(user.last_name, "Jones");
        assert_eq!(user.first_name, before.first_name);
        assert_eq!(user.email, before.email);
        assert_eq!(user.phone_number, None);
        assert_eq!(user.date_of_birth, NaiveDate::from_ymd_opt(1990, 4, 2));
        assert_eq!(user.created_at, before.created_at);
        assert!(user.updated_at > before.updated_at);
    }
}
