use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "job_category", rename_all = "snake_case")]
pub enum JobCategory {
    Plumbing,
    Electrical,
    Carpentry,
    Painting,
    Roofing,
    Hvac,
    Landscaping,
    Cleaning,
    Flooring,
    Moving,
    Handyman,
    Other,
}

impl JobCategory {
    pub fn to_str(&self) -> &str {
        match self {
            JobCategory::Plumbing => "plumbing",
            JobCategory::Electrical => "electrical",
            JobCategory::Carpentry => "carpentry",
            JobCategory::Painting => "painting",
            JobCategory::Roofing => "roofing",
            JobCategory::Hvac => "hvac",
            JobCategory::Landscaping => "landscaping",
            JobCategory::Cleaning => "cleaning",
            JobCategory::Flooring => "flooring",
            JobCategory::Moving => "moving",
            JobCategory::Handyman => "handyman",
            JobCategory::Other => "other",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "budget_type", rename_all = "snake_case")]
pub enum BudgetType {
    Range,
    Fixed,
    Hourly,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "job_status", rename_all = "snake_case")]
pub enum JobStatus {
    Open,
    InProgress,
    Completed,
    Cancelled,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "bid_status", rename_all = "snake_case")]
pub enum BidStatus {
    Pending,
    Accepted,
    Rejected,
}

/// A homeowner-posted task seeking bids. `poster_name` and
/// `poster_verified` are a display cache captured at insert time; the
/// `poster_id` foreign key is the authoritative owner reference.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Job {
    pub id: Uuid,
    pub poster_id: Uuid,
    pub poster_name: String,
    pub poster_verified: bool,
    pub title: String,
    pub description: String,
    pub category: JobCategory,
    pub location: String,
    pub budget_min_cents: Option<i64>,
    pub budget_max_cents: Option<i64>,
    pub budget_type: BudgetType,
    pub timeline: Option<String>,
    pub status: Option<JobStatus>,         // Database has DEFAULT 'open', can be NULL
    pub created_at: Option<DateTime<Utc>>, // Database has DEFAULT NOW(), can be NULL
    pub updated_at: Option<DateTime<Utc>>, // Database has DEFAULT NOW(), can be NULL
}

/// A professional's priced offer against a Job. `professional_id` is the
/// single authoritative bidder reference; the contact_* columns are a
/// display cache captured at submission time.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Bid {
    pub id: Uuid,
    pub job_id: Uuid,
    pub professional_id: Uuid,
    pub contact_name: String,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    pub amount_cents: i64,
    pub message: Option<String>,
    pub status: Option<BidStatus>,         // Database has DEFAULT 'pending', can be NULL
    pub created_at: Option<DateTime<Utc>>, // Database has DEFAULT NOW(), can be NULL
    pub updated_at: Option<DateTime<Utc>>, // Database has DEFAULT NOW(), can be NULL
}
