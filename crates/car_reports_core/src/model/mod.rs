//! Domain model for users and vehicle condition reports.
//!
//! # Responsibility
//! - Define canonical record shapes, creation inputs and partial patches.
//! - Own the explicit id/timestamp stamping helpers used at write time.
//!
//! # Invariants
//! - Every record is identified by a stable, non-nil UUID.
//! - Deletion is represented by a `deleted_at` tombstone, never a hard delete.
//! - `updated_at` strictly increases on every mutation; `created_at` is fixed.

pub mod price;
pub mod report;
pub mod stamp;
pub mod user;
pub mod validation;
