use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::jobmodel::*;

//Job DTOs
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct CreateJobDto {
    #[validate(length(min = 1, max = 100, message = "Title must be between 1 and 100 characters"))]
    pub title: String,

    #[validate(length(
        min = 20,
        max = 2000,
        message = "Description must be between 20 and 2000 characters"
    ))]
    pub description: String,

    pub category: JobCategory,

    #[validate(length(min = 1, message = "Location is required"))]
    pub location: String,

    #[validate(range(min = 0, message = "Minimum budget must not be negative"))]
    pub budget_min_cents: Option<i64>,

    #[validate(range(min = 0, message = "Maximum budget must not be negative"))]
    pub budget_max_cents: Option<i64>,

    pub budget_type: BudgetType,

    #[validate(length(max = 200, message = "Timeline must be at most 200 characters"))]
    pub timeline: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateJobStatusDto {
    // Any member of the enum is accepted; no transition graph is enforced
    pub status: JobStatus,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct SearchJobsQueryDto {
    pub category: Option<JobCategory>,
    pub location: Option<String>,
    pub status: Option<JobStatus>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

//Bid DTOs
/// The amount is supplied either directly in `amount_cents` or as the pair
/// (`hourly_rate_cents`, `estimated_hours`), never both.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct SubmitBidDto {
    #[validate(length(min = 1, max = 100, message = "Contact name is required"))]
    pub contact_name: String,

    #[validate(
        length(min = 1, message = "Contact email is required"),
        email(message = "Contact email is invalid")
    )]
    pub contact_email: String,

    pub contact_phone: Option<String>,

    #[validate(range(min = 1, message = "Amount must be positive"))]
    pub amount_cents: Option<i64>,

    #[validate(range(min = 1, message = "Hourly rate must be positive"))]
    pub hourly_rate_cents: Option<i64>,

    #[validate(range(min = 1, max = 10000, message = "Estimated hours must be between 1 and 10000"))]
    pub estimated_hours: Option<i64>,

    #[validate(length(max = 2000, message = "Message must be at most 2000 characters"))]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BidAcceptanceResponse {
    pub job: Job,
    pub accepted_bid: Bid,
    pub rejected_bids: usize,
}

//Response wrappers
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    pub message: String,
    pub data: Option<T>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub status: String,
    pub data: Vec<T>,
    pub page: u32,
    pub limit: u32,
}

impl<T> ApiResponse<T> {
    pub fn success(message: &str, data: T) -> Self {
        Self {
            status: "success".to_string(),
            message: message.to_string(),
            data: Some(data),
        }
    }
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, page: u32, limit: u32) -> Self {
        Self {
            status: "success".to_string(),
            data,
            page,
            limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_bid_accepts_direct_amount() {
        let dto = SubmitBidDto {
            contact_name: "Joe Pro".to_string(),
            contact_email: "joe@example.com".to_string(),
            contact_phone: None,
            amount_cents: Some(50_000),
            hourly_rate_cents: None,
            estimated_hours: None,
            message: None,
        };
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn submit_bid_rejects_invalid_email() {
        let dto = SubmitBidDto {
            contact_name: "Joe Pro".to_string(),
            contact_email: "not-an-email".to_string(),
            contact_phone: None,
            amount_cents: Some(50_000),
            hourly_rate_cents: None,
            estimated_hours: None,
            message: None,
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn create_job_rejects_short_description() {
        let dto = CreateJobDto {
            title: "Fix sink".to_string(),
            description: "too short".to_string(),
            category: JobCategory::Plumbing,
            location: "Austin, TX".to_string(),
            budget_min_cents: Some(10_000),
            budget_max_cents: Some(25_000),
            budget_type: BudgetType::Range,
            timeline: None,
        };
        assert!(dto.validate().is_err());
    }
}
