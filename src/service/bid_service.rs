// services/bid_service.rs
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    db::db::DBClient,
    db::jobdb::{BidAcceptance, JobExt},
    dtos::jobdtos::SubmitBidDto,
    models::jobmodel::*,
    models::usermodel::User,
    service::{error::ServiceError, notification_service::NotificationService},
    utils::currency::bid_amount_from_rate,
};

/// Orchestrates the bid lifecycle: submission, acceptance with cascade
/// rejection, explicit rejection, and poster-driven job status changes.
#[derive(Debug, Clone)]
pub struct BidService {
    db_client: Arc<DBClient>,
    notification_service: Arc<NotificationService>,
}

impl BidService {
    pub fn new(db_client: Arc<DBClient>, notification_service: Arc<NotificationService>) -> Self {
        Self {
            db_client,
            notification_service,
        }
    }

    /// The single authority for job ownership. Clients may duplicate this
    /// check as a UX fast-path, but only this predicate gates writes.
    pub fn is_job_poster(job: &Job, user_id: Uuid) -> bool {
        job.poster_id == user_id
    }

    /// A bid amount arrives either directly or as rate × hours. Exactly one
    /// form must be present; the derived form is exact integer arithmetic,
    /// so equal inputs always store the identical amount.
    pub fn resolve_amount_cents(dto: &SubmitBidDto) -> Result<i64, ServiceError> {
        match (dto.amount_cents, dto.hourly_rate_cents, dto.estimated_hours) {
            (Some(amount), None, None) => Ok(amount),
            (None, Some(rate), Some(hours)) => Ok(bid_amount_from_rate(rate, hours)),
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => Err(ServiceError::Validation(
                "Provide either an amount or an hourly rate with estimated hours, not both"
                    .to_string(),
            )),
            _ => Err(ServiceError::Validation(
                "An amount or an hourly rate with estimated hours is required".to_string(),
            )),
        }
    }

    pub async fn submit_bid(
        &self,
        professional: &User,
        job_id: Uuid,
        bid_data: SubmitBidDto,
    ) -> Result<Bid, ServiceError> {
        let job = self
            .db_client
            .get_job_by_id(job_id)
            .await?
            .ok_or(ServiceError::JobNotFound(job_id))?;

        if Self::is_job_poster(&job, professional.id) {
            return Err(ServiceError::OwnJobBid(professional.id, job_id));
        }

        if job.status != Some(JobStatus::Open) {
            return Err(ServiceError::InvalidJobStatus(
                job_id,
                job.status.unwrap_or(JobStatus::Open),
            ));
        }

        let amount_cents = Self::resolve_amount_cents(&bid_data)?;

        let bid = self
            .db_client
            .create_bid(
                job_id,
                professional.id,
                bid_data.contact_name,
                bid_data.contact_email,
                bid_data.contact_phone,
                amount_cents,
                bid_data.message,
            )
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                    ServiceError::DuplicateBid(professional.id, job_id)
                }
                _ => ServiceError::Database(e),
            })?;

        tracing::info!(
            "New bid {} on job {} by professional {}",
            bid.id,
            job_id,
            professional.id
        );

        let _ = self
            .notification_service
            .notify_new_bid(job.poster_id, &job, &bid)
            .await;

        Ok(bid)
    }

    /// Accept one bid, reject the rest, and move the job to in-progress as
    /// a single database transaction, so no reader ever observes a
    /// partially applied cascade.
    pub async fn accept_bid(
        &self,
        poster_id: Uuid,
        job_id: Uuid,
        bid_id: Uuid,
    ) -> Result<BidAcceptance, ServiceError> {
        let job = self
            .db_client
            .get_job_by_id(job_id)
            .await?
            .ok_or(ServiceError::JobNotFound(job_id))?;

        if !Self::is_job_poster(&job, poster_id) {
            return Err(ServiceError::UnauthorizedJobAccess(poster_id, job_id));
        }

        let acceptance = self
            .db_client
            .accept_bid(job_id, bid_id)
            .await
            .map_err(|e| match &e {
                sqlx::Error::RowNotFound => ServiceError::BidNotFound(bid_id),
                sqlx::Error::Protocol(msg) if msg == "job_not_open" => {
                    ServiceError::InvalidJobStatus(job_id, job.status.unwrap_or(JobStatus::Open))
                }
                sqlx::Error::Protocol(msg) if msg == "bid_not_pending" => {
                    ServiceError::InvalidBidStatus(bid_id, BidStatus::Pending)
                }
                _ => ServiceError::Database(e),
            })?;

        tracing::info!(
            "Bid {} accepted on job {}; {} sibling bid(s) rejected",
            bid_id,
            job_id,
            acceptance.rejected_professionals.len()
        );

        // Notifications happen after commit; a failure here never unwinds
        // the cascade
        let _ = self
            .notification_service
            .notify_bid_accepted(acceptance.bid.professional_id, &acceptance.job)
            .await;

        for professional_id in &acceptance.rejected_professionals {
            let _ = self
                .notification_service
                .notify_bid_rejected(*professional_id, &acceptance.job)
                .await;
        }

        Ok(acceptance)
    }

    /// Reject a single bid. No cascade, no job-status change, and
    /// rejecting an already-rejected bid is a harmless no-op update.
    pub async fn reject_bid(
        &self,
        poster_id: Uuid,
        job_id: Uuid,
        bid_id: Uuid,
    ) -> Result<Bid, ServiceError> {
        let job = self
            .db_client
            .get_job_by_id(job_id)
            .await?
            .ok_or(ServiceError::JobNotFound(job_id))?;

        if !Self::is_job_poster(&job, poster_id) {
            return Err(ServiceError::UnauthorizedJobAccess(poster_id, job_id));
        }

        let bid = self
            .db_client
            .get_bid_by_id(bid_id)
            .await?
            .filter(|b| b.job_id == job_id)
            .ok_or(ServiceError::BidNotFound(bid_id))?;

        let already_rejected = bid.status == Some(BidStatus::Rejected);

        let updated = self
            .db_client
            .update_bid_status(bid_id, BidStatus::Rejected)
            .await?;

        if !already_rejected {
            tracing::info!("Bid {} on job {} rejected", bid_id, job_id);
            let _ = self
                .notification_service
                .notify_bid_rejected(updated.professional_id, &job)
                .await;
        }

        Ok(updated)
    }

    /// Poster-driven status change. Enum membership is the only validation;
    /// the transition graph is deliberately unrestricted.
    pub async fn change_job_status(
        &self,
        poster_id: Uuid,
        job_id: Uuid,
        status: JobStatus,
    ) -> Result<Job, ServiceError> {
        let job = self
            .db_client
            .get_job_by_id(job_id)
            .await?
            .ok_or(ServiceError::JobNotFound(job_id))?;

        if !Self::is_job_poster(&job, poster_id) {
            return Err(ServiceError::UnauthorizedJobAccess(poster_id, job_id));
        }

        let updated = self.db_client.update_job_status(job_id, status).await?;

        tracing::info!("Job {} status changed to {:?}", job_id, status);

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtos::jobdtos::SubmitBidDto;

    fn bid_dto(
        amount_cents: Option<i64>,
        hourly_rate_cents: Option<i64>,
        estimated_hours: Option<i64>,
    ) -> SubmitBidDto {
        SubmitBidDto {
            contact_name: "Joe Pro".to_string(),
            contact_email: "joe@example.com".to_string(),
            contact_phone: None,
            amount_cents,
            hourly_rate_cents,
            estimated_hours,
            message: None,
        }
    }

    fn job_owned_by(poster_id: Uuid) -> Job {
        Job {
            id: Uuid::new_v4(),
            poster_id,
            poster_name: "Pat Poster".to_string(),
            poster_verified: false,
            title: "Repaint the fence".to_string(),
            description: "Two coats, weatherproof paint, roughly 30 meters".to_string(),
            category: JobCategory::Painting,
            location: "Denver, CO".to_string(),
            budget_min_cents: Some(20_000),
            budget_max_cents: Some(60_000),
            budget_type: BudgetType::Range,
            timeline: None,
            status: Some(JobStatus::Open),
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn direct_amount_is_used_verbatim() {
        let amount = BidService::resolve_amount_cents(&bid_dto(Some(102_000), None, None)).unwrap();
        assert_eq!(amount, 102_000);
    }

    #[test]
    fn derived_amount_equals_exact_rate_times_hours() {
        let derived =
            BidService::resolve_amount_cents(&bid_dto(None, Some(8_500), Some(12))).unwrap();
        let direct =
            BidService::resolve_amount_cents(&bid_dto(Some(8_500 * 12), None, None)).unwrap();
        assert_eq!(derived, 102_000);
        assert_eq!(derived, direct);
    }

    #[test]
    fn supplying_both_amount_forms_is_rejected() {
        let result = BidService::resolve_amount_cents(&bid_dto(Some(1_000), Some(500), Some(2)));
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[test]
    fn supplying_no_amount_form_is_rejected() {
        let result = BidService::resolve_amount_cents(&bid_dto(None, None, None));
        assert!(matches!(result, Err(ServiceError::Validation(_))));

        // rate without hours is just as incomplete
        let result = BidService::resolve_amount_cents(&bid_dto(None, Some(8_500), None));
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[test]
    fn ownership_predicate_only_matches_the_poster() {
        let poster = Uuid::new_v4();
        let job = job_owned_by(poster);

        assert!(BidService::is_job_poster(&job, poster));
        assert!(!BidService::is_job_poster(&job, Uuid::new_v4()));
    }
}
