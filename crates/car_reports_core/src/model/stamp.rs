//! Identity and timestamp stamping helpers.
//!
//! Records never stamp themselves implicitly: constructors call
//! [`resolve_id`] and [`creation_stamp`], and every mutation path calls
//! [`next_update_stamp`].

use super::validation::ValidationError;
use chrono::{Datelike, Utc};
use uuid::Uuid;

/// Unix epoch milliseconds.
pub type EpochMs = i64;

/// Server-assigned timestamps for a freshly created record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreationStamp {
    pub created_at: EpochMs,
    pub updated_at: EpochMs,
}

/// Returns the current wall-clock time in epoch milliseconds.
pub fn now_epoch_ms() -> EpochMs {
    Utc::now().timestamp_millis()
}

/// Returns matching `created_at`/`updated_at` values for a new record.
pub fn creation_stamp() -> CreationStamp {
    let now = now_epoch_ms();
    CreationStamp {
        created_at: now,
        updated_at: now,
    }
}

/// Returns the `updated_at` value for a mutation of a record last stamped at
/// `previous`.
///
/// Never returns a value `<= previous`, even when two writes land in the
/// same millisecond or the wall clock steps backwards.
pub fn next_update_stamp(previous: EpochMs) -> EpochMs {
    now_epoch_ms().max(previous.saturating_add(1))
}

/// Uses the caller-provided id or generates a fresh v4 UUID.
///
/// # Errors
/// - Returns [`ValidationError::NilId`] for `Some(Uuid::nil())`.
pub fn resolve_id(id: Option<Uuid>) -> Result<Uuid, ValidationError> {
    match id {
        Some(id) if id.is_nil() => Err(ValidationError::NilId),
        Some(id) => Ok(id),
        None => Ok(Uuid::new_v4()),
    }
}

/// Current calendar year (UTC).
pub fn current_year() -> i32 {
    Utc::now().year()
}

#[cfg(test)]
mod tests {
    use super::{creation_stamp, next_update_stamp, resolve_id};
    use crate::model::validation::ValidationError;
    use uuid::Uuid;

    #[test]
    fn creation_stamp_sets_equal_timestamps() {
        let stamp = creation_stamp();
        assert_eq!(stamp.created_at, stamp.updated_at);
        assert!(stamp.created_at > 0);
    }

    #[test]
    fn next_update_stamp_is_strictly_greater_than_previous() {
        let far_future = i64::MAX / 2;
        assert_eq!(next_update_stamp(far_future), far_future + 1);

        let stamp = creation_stamp();
        assert!(next_update_stamp(stamp.updated_at) > stamp.updated_at);
    }

    #[test]
    fn resolve_id_generates_or_keeps_ids() {
        let generated = resolve_id(None).unwrap();
        assert!(!generated.is_nil());

        let fixed = Uuid::parse_str("11111111-2222-4333-8444-555555555555").unwrap();
        assert_eq!(resolve_id(Some(fixed)).unwrap(), fixed);

        assert_eq!(
            resolve_id(Some(Uuid::nil())).unwrap_err(),
            ValidationError::NilId
        );
    }
}
