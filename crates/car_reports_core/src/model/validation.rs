//! Record-level invariant checks shared by users and reports.
//!
//! These mirror the store schema constraints so that invalid records are
//! rejected before any SQL runs. Messages never echo user-supplied text.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static EMAIL_SHAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+$").expect("valid email shape regex"));

/// Invariant violation detected on a user or report record.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Caller-provided id is the nil UUID.
    NilId,
    /// Required text field is empty or whitespace only.
    BlankField(&'static str),
    /// Text field exceeds its maximum length in characters.
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },
    /// Email is not of the `local@domain` shape.
    InvalidEmail,
    /// Model year outside the plausible window.
    YearOutOfRange {
        year: i32,
        min: i32,
        max: i32,
    },
    /// Price below zero, in cents.
    NegativePrice(i64),
    /// Price above [`crate::model::price::Price::MAX`], in cents.
    PriceTooLarge(i64),
    /// Major-unit price is NaN or infinite.
    PriceNotFinite,
    /// Major-unit price carries more than two decimal digits.
    PriceTooPrecise,
    /// Longitude outside `[-180, 180]` or not finite.
    LongitudeOutOfRange(f64),
    /// Latitude outside `[-90, 90]` or not finite.
    LatitudeOutOfRange(f64),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "id must not be the nil uuid"),
            Self::BlankField(field) => write!(f, "{field} must not be blank"),
            Self::TooLong { field, max, actual } => {
                write!(f, "{field} must be at most {max} characters, got {actual}")
            }
            Self::InvalidEmail => write!(f, "email must have the form local@domain"),
            Self::YearOutOfRange { year, min, max } => {
                write!(f, "year {year} must be within {min}..={max}")
            }
            Self::NegativePrice(cents) => write!(f, "price must be >= 0, got {cents} cents"),
            Self::PriceTooLarge(cents) => {
                write!(f, "price must be at most 99999999.99, got {cents} cents")
            }
            Self::PriceNotFinite => write!(f, "price must be a finite number"),
            Self::PriceTooPrecise => write!(f, "price must have at most two decimal digits"),
            Self::LongitudeOutOfRange(value) => {
                write!(f, "longitude {value} must be within -180..=180")
            }
            Self::LatitudeOutOfRange(value) => {
                write!(f, "latitude {value} must be within -90..=90")
            }
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require_text(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::BlankField(field));
    }
    limit_text(field, value, max)
}

pub(crate) fn limit_text(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<(), ValidationError> {
    let actual = value.chars().count();
    if actual > max {
        return Err(ValidationError::TooLong { field, max, actual });
    }
    Ok(())
}

pub(crate) fn check_email(value: &str, max: usize) -> Result<(), ValidationError> {
    limit_text("email", value, max)?;
    if !EMAIL_SHAPE_RE.is_match(value) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

pub(crate) fn check_longitude(value: Option<f64>) -> Result<(), ValidationError> {
    match value {
        Some(lon) if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) => {
            Err(ValidationError::LongitudeOutOfRange(lon))
        }
        _ => Ok(()),
    }
}

pub(crate) fn check_latitude(value: Option<f64>) -> Result<(), ValidationError> {
    match value {
        Some(lat) if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) => {
            Err(ValidationError::LatitudeOutOfRange(lat))
        }
        _ => Ok(()),
    }
}
