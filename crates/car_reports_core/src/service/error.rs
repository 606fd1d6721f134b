//! Service-level error taxonomy shared by user and report use-cases.

use crate::model::validation::ValidationError;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Entity kind named by [`ServiceError::NotFound`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    User,
    Report,
}

impl Display for Entity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => f.write_str("user"),
            Self::Report => f.write_str("report"),
        }
    }
}

/// Service error for user/report use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// No active record matched `key` (an id or an email).
    NotFound {
        entity: Entity,
        key: String,
    },
    /// Write collided with an existing active record.
    Conflict(String),
    /// Input failed model validation.
    Validation(ValidationError),
    /// Store failure, carried unchanged.
    Store(RepoError),
}

impl ServiceError {
    pub(crate) fn not_found(entity: Entity, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { entity, key } => write!(f, "{entity} not found: {key}"),
            Self::Conflict(message) => write!(f, "conflict: {message}"),
            Self::Validation(err) => write!(f, "validation failed: {err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::UniqueViolation { table, column } => {
                Self::Conflict(format!("{table}.{column} already in use"))
            }
            RepoError::MissingReference { table: "users", id } => {
                Self::not_found(Entity::User, id)
            }
            other => Self::Store(other),
        }
    }
}
