//! Fixed two-decimal price.

use super::validation::ValidationError;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};

/// Sub-cent residue tolerated when scaling a binary float to cents.
const CENT_EPSILON: f64 = 1e-4;

/// Monetary amount with exactly two decimal digits, stored as whole cents.
///
/// Serialized as a JSON number (`22000.0`), persisted as an integer
/// `price_cents` column so averages and comparisons stay exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(i64);

impl Price {
    /// Largest storable price, `99999999.99`.
    pub const MAX: Price = Price(9_999_999_999);

    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Converts a major-unit amount (e.g. `18500.0`) to cents.
    ///
    /// # Errors
    /// - [`ValidationError::PriceNotFinite`] for NaN or infinities.
    /// - [`ValidationError::PriceTooPrecise`] for sub-cent digits.
    /// - [`ValidationError::NegativePrice`] / [`ValidationError::PriceTooLarge`]
    ///   outside `0..=Price::MAX`.
    pub fn from_major(amount: f64) -> Result<Self, ValidationError> {
        if !amount.is_finite() {
            return Err(ValidationError::PriceNotFinite);
        }
        let scaled = amount * 100.0;
        let rounded = scaled.round();
        if (scaled - rounded).abs() > CENT_EPSILON {
            return Err(ValidationError::PriceTooPrecise);
        }
        // Saturating cast; out-of-range magnitudes are rejected by `check`.
        let price = Self(rounded as i64);
        price.check()?;
        Ok(price)
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    pub fn as_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Checks `0 <= self <= Price::MAX`.
    pub fn check(self) -> Result<(), ValidationError> {
        if self.is_negative() {
            return Err(ValidationError::NegativePrice(self.0));
        }
        if self > Self::MAX {
            return Err(ValidationError::PriceTooLarge(self.0));
        }
        Ok(())
    }
}

impl Display for Price {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = f64::deserialize(deserializer)?;
        Self::from_major(amount).map_err(D::Error::custom)
    }
}
