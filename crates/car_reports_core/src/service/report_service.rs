//! Report use-case service.
//!
//! # Responsibility
//! - Create reports for active owners and manage their lifecycle.
//! - Expose the approved-only public listings and the price aggregate.
//!
//! # Invariants
//! - A report whose owner is missing or soft-deleted is rejected with
//!   `NotFound` for the user.
//! - Listing and aggregate calls never fail on empty results.

use super::error::{Entity, ServiceError, ServiceResult};
use crate::model::report::{NewReport, Report, ReportId, ReportPatch, ReportWithUser};
use crate::model::user::UserId;
use crate::repo::report_repo::ReportRepository;
use log::{debug, info};

/// Report service facade over repository implementations.
pub struct ReportService<R: ReportRepository> {
    repo: R,
}

impl<R: ReportRepository> ReportService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates one report for an active user.
    pub fn create(&self, new_report: NewReport) -> ServiceResult<Report> {
        let report = self.repo.create(new_report)?;
        info!(
            "event=report_create module=service status=ok report_id={} user_id={}",
            report.id, report.user_id
        );
        Ok(report)
    }

    /// Lists active reports with their owner.
    pub fn find_all(&self) -> ServiceResult<Vec<ReportWithUser>> {
        let reports = self.repo.find_all()?;
        debug!(
            "event=report_list module=service status=ok count={}",
            reports.len()
        );
        Ok(reports)
    }

    /// Gets one active report with its owner.
    pub fn find_one(&self, id: ReportId) -> ServiceResult<ReportWithUser> {
        self.repo
            .find_one(id)?
            .ok_or_else(|| ServiceError::not_found(Entity::Report, id))
    }

    /// Lists the active reports of one user, newest first.
    pub fn find_by_user(&self, user_id: UserId) -> ServiceResult<Vec<Report>> {
        Ok(self.repo.find_by_user(user_id)?)
    }

    /// Applies a partial update to one active report.
    pub fn update(&self, id: ReportId, patch: &ReportPatch) -> ServiceResult<Report> {
        let report = self
            .repo
            .update(id, patch)?
            .ok_or_else(|| ServiceError::not_found(Entity::Report, id))?;
        info!("event=report_update module=service status=ok report_id={id}");
        Ok(report)
    }

    /// Soft-deletes one active report.
    pub fn remove(&self, id: ReportId) -> ServiceResult<()> {
        if !self.repo.soft_delete(id)? {
            return Err(ServiceError::not_found(Entity::Report, id));
        }
        info!("event=report_remove module=service status=ok report_id={id}");
        Ok(())
    }

    /// Marks one active report as approved.
    pub fn approve_report(&self, id: ReportId) -> ServiceResult<Report> {
        let report = self
            .repo
            .update(id, &ReportPatch::approve())?
            .ok_or_else(|| ServiceError::not_found(Entity::Report, id))?;
        info!("event=report_approve module=service status=ok report_id={id}");
        Ok(report)
    }

    pub fn find_by_make_and_model(
        &self,
        make: &str,
        model: &str,
    ) -> ServiceResult<Vec<ReportWithUser>> {
        Ok(self.repo.find_by_make_and_model(make, model)?)
    }

    /// Approved reports in `[min_year, max_year]`; empty when `min_year > max_year`.
    pub fn find_by_year_range(
        &self,
        min_year: i32,
        max_year: i32,
    ) -> ServiceResult<Vec<ReportWithUser>> {
        Ok(self.repo.find_by_year_range(min_year, max_year)?)
    }

    pub fn find_approved(&self) -> ServiceResult<Vec<ReportWithUser>> {
        Ok(self.repo.find_approved()?)
    }

    /// Mean price of approved reports for make/model (and year); `0.0` if none.
    pub fn get_average_price(
        &self,
        make: &str,
        model: &str,
        year: Option<i32>,
    ) -> ServiceResult<f64> {
        let average = self.repo.find_average_price(make, model, year)?;
        debug!(
            "event=report_average_price module=service status=ok year_filter={}",
            year.is_some()
        );
        Ok(average)
    }
}
