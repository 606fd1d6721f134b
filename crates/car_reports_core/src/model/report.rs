//! Vehicle condition report model.
//!
//! # Invariants
//! - `user_id` references an existing user at write time; the relation is
//!   not cascaded, so reports may outlive a soft-deleted owner.
//! - `price` carries exactly two decimal digits.
//! - `year` stays within `MIN_REPORT_YEAR..=current year + 1`.

use super::price::Price;
use super::stamp::{creation_stamp, current_year, next_update_stamp, resolve_id, EpochMs};
use super::user::{User, UserId};
use super::validation::{
    check_latitude, check_longitude, limit_text, require_text, ValidationError,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ReportId = Uuid;

pub const MIN_REPORT_YEAR: i32 = 1900;
pub const MAKE_MAX_CHARS: usize = 100;
pub const MODEL_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MAX_CHARS: usize = 255;

/// Canonical report record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: ReportId,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub mileage: u32,
    pub price: Price,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub description: Option<String>,
    pub is_approved: bool,
    pub user_id: UserId,
    pub created_at: EpochMs,
    pub updated_at: EpochMs,
    pub deleted_at: Option<EpochMs>,
}

/// Input for creating a report. `id` is generated when absent.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReport {
    #[serde(default)]
    pub id: Option<ReportId>,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub mileage: u32,
    pub price: Price,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_approved: bool,
    pub user_id: UserId,
}

impl NewReport {
    /// Creates an unapproved report input without location or description.
    pub fn new(
        user_id: UserId,
        make: impl Into<String>,
        model: impl Into<String>,
        year: i32,
        mileage: u32,
        price: Price,
    ) -> Self {
        Self {
            id: None,
            make: make.into(),
            model: model.into(),
            year,
            mileage,
            price,
            longitude: None,
            latitude: None,
            description: None,
            is_approved: false,
            user_id,
        }
    }
}

/// Partial update for a report. Same `None`/`Some(None)` rules as
/// [`crate::model::user::UserPatch`]. The owner cannot be changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportPatch {
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub mileage: Option<u32>,
    pub price: Option<Price>,
    pub longitude: Option<Option<f64>>,
    pub latitude: Option<Option<f64>>,
    pub description: Option<Option<String>>,
    pub is_approved: Option<bool>,
}

impl ReportPatch {
    /// Patch that only flips `is_approved` to `true`.
    pub fn approve() -> Self {
        Self {
            is_approved: Some(true),
            ..Self::default()
        }
    }
}

/// A report together with its owner. `user` is `None` when the owner has
/// been soft-deleted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportWithUser {
    #[serde(flatten)]
    pub report: Report,
    pub user: Option<User>,
}

impl Report {
    /// Builds a new active report, stamping id and timestamps.
    pub fn from_new(new_report: NewReport) -> Result<Self, ValidationError> {
        let id = resolve_id(new_report.id)?;
        let stamp = creation_stamp();
        let report = Self {
            id,
            make: new_report.make,
            model: new_report.model,
            year: new_report.year,
            mileage: new_report.mileage,
            price: new_report.price,
            longitude: new_report.longitude,
            latitude: new_report.latitude,
            description: new_report.description,
            is_approved: new_report.is_approved,
            user_id: new_report.user_id,
            created_at: stamp.created_at,
            updated_at: stamp.updated_at,
            deleted_at: None,
        };
        report.validate()?;
        Ok(report)
    }

    /// Merges present patch fields and refreshes `updated_at`.
    pub fn apply_patch(&mut self, patch: &ReportPatch) {
        if let Some(make) = &patch.make {
            self.make = make.clone();
        }
        if let Some(model) = &patch.model {
            self.model = model.clone();
        }
        if let Some(year) = patch.year {
            self.year = year;
        }
        if let Some(mileage) = patch.mileage {
            self.mileage = mileage;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(longitude) = patch.longitude {
            self.longitude = longitude;
        }
        if let Some(latitude) = patch.latitude {
            self.latitude = latitude;
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(approved) = patch.is_approved {
            self.is_approved = approved;
        }
        self.updated_at = next_update_stamp(self.updated_at);
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_nil() || self.user_id.is_nil() {
            return Err(ValidationError::NilId);
        }
        require_text("make", &self.make, MAKE_MAX_CHARS)?;
        require_text("model", &self.model, MODEL_MAX_CHARS)?;

        let max_year = current_year() + 1;
        if !(MIN_REPORT_YEAR..=max_year).contains(&self.year) {
            return Err(ValidationError::YearOutOfRange {
                year: self.year,
                min: MIN_REPORT_YEAR,
                max: max_year,
            });
        }
        self.price.check()?;
        check_longitude(self.longitude)?;
        check_latitude(self.latitude)?;
        if let Some(description) = &self.description {
            limit_text("description", description, DESCRIPTION_MAX_CHARS)?;
        }
        Ok(())
    }

    /// `"{year} {make} {model}"`, e.g. `"2020 Toyota Camry"`.
    pub fn car_identifier(&self) -> String {
        format!("{} {} {}", self.year, self.make, self.model)
    }

    /// `"{latitude}, {longitude}"` when both are known.
    pub fn location(&self) -> String {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => format!("{lat}, {lon}"),
            _ => "Location not provided".to_string(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}
