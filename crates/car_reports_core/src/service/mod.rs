//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Map repository absence and constraint failures to [`ServiceError`].
//!
//! # Invariants
//! - Services never issue SQL; every store access goes through a repository
//!   trait.

pub mod error;
pub mod report_service;
pub mod user_service;

pub use error::{Entity, ServiceError, ServiceResult};
