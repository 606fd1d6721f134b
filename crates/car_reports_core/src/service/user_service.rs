//! User use-case service.
//!
//! # Responsibility
//! - Enforce email uniqueness among active users before insertion.
//! - Turn repository absence (`None`/`false`) into [`ServiceError::NotFound`].
//!
//! # Invariants
//! - The email check is check-then-act; a racing insert that loses on the
//!   store unique index still surfaces as [`ServiceError::Conflict`].
//! - Log lines carry ids and counts only, never emails or names.

use super::error::{Entity, ServiceError, ServiceResult};
use crate::model::user::{NewUser, User, UserId, UserPatch, UserReportCount, UserWithReports};
use crate::repo::user_repo::UserRepository;
use log::{debug, info, warn};

const EMAIL_TAKEN: &str = "user with this email already exists";

/// User service facade over repository implementations.
pub struct UserService<R: UserRepository> {
    repo: R,
}

impl<R: UserRepository> UserService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates one user, rejecting an email already held by an active user.
    pub fn create(&self, new_user: NewUser) -> ServiceResult<User> {
        if self.repo.find_by_email(&new_user.email)?.is_some() {
            warn!("event=user_create module=service status=conflict reason=email_taken");
            return Err(ServiceError::Conflict(EMAIL_TAKEN.to_string()));
        }

        let user = self.repo.create(new_user).map_err(|err| {
            let err = ServiceError::from(err);
            if let ServiceError::Conflict(_) = err {
                warn!("event=user_create module=service status=conflict reason=unique_index");
                return ServiceError::Conflict(EMAIL_TAKEN.to_string());
            }
            err
        })?;

        info!(
            "event=user_create module=service status=ok user_id={}",
            user.id
        );
        Ok(user)
    }

    /// Lists active users with their active reports.
    pub fn find_all(&self) -> ServiceResult<Vec<UserWithReports>> {
        let users = self.repo.find_all()?;
        debug!(
            "event=user_list module=service status=ok count={}",
            users.len()
        );
        Ok(users)
    }

    /// Gets one active user with its active reports.
    pub fn find_one(&self, id: UserId) -> ServiceResult<UserWithReports> {
        self.repo
            .find_one(id)?
            .ok_or_else(|| ServiceError::not_found(Entity::User, id))
    }

    /// Gets one active user by exact email.
    pub fn find_by_email(&self, email: &str) -> ServiceResult<User> {
        self.repo
            .find_by_email(email)?
            .ok_or_else(|| ServiceError::not_found(Entity::User, email))
    }

    /// Applies a partial update to one active user.
    pub fn update(&self, id: UserId, patch: &UserPatch) -> ServiceResult<User> {
        let user = self
            .repo
            .update(id, patch)?
            .ok_or_else(|| ServiceError::not_found(Entity::User, id))?;
        info!("event=user_update module=service status=ok user_id={id}");
        Ok(user)
    }

    /// Soft-deletes one active user. Its reports are left untouched.
    pub fn remove(&self, id: UserId) -> ServiceResult<()> {
        if !self.repo.soft_delete(id)? {
            return Err(ServiceError::not_found(Entity::User, id));
        }
        info!("event=user_remove module=service status=ok user_id={id}");
        Ok(())
    }

    /// Active users with the number of their active reports.
    pub fn get_users_with_reports_count(&self) -> ServiceResult<Vec<UserReportCount>> {
        Ok(self.repo.find_users_with_reports_count()?)
    }

    /// Active users whose email ends in `@{domain}`.
    pub fn get_users_by_email_domain(&self, domain: &str) -> ServiceResult<Vec<User>> {
        let users = self.repo.find_users_by_email_domain(domain)?;
        debug!(
            "event=user_domain_lookup module=service status=ok count={}",
            users.len()
        );
        Ok(users)
    }
}
