// db/jobdb.rs
use async_trait::async_trait;
use sqlx::Error as SqlxError;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::jobmodel::*;
use crate::models::usermodel::User;

/// Everything the acceptance transaction produced, read back in one place
/// so callers never observe a half-applied cascade.
#[derive(Debug)]
pub struct BidAcceptance {
    pub job: Job,
    pub bid: Bid,
    pub rejected_professionals: Vec<Uuid>,
}

#[async_trait]
pub trait JobExt {
    async fn create_job(
        &self,
        poster: &User,
        title: String,
        description: String,
        category: JobCategory,
        location: String,
        budget_min_cents: Option<i64>,
        budget_max_cents: Option<i64>,
        budget_type: BudgetType,
        timeline: Option<String>,
    ) -> Result<Job, SqlxError>;

    async fn get_job_by_id(&self, job_id: Uuid) -> Result<Option<Job>, SqlxError>;

    async fn search_jobs(
        &self,
        category: Option<JobCategory>,
        location: Option<&str>,
        status: Option<JobStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Job>, SqlxError>;

    async fn get_poster_jobs(&self, poster_id: Uuid) -> Result<Vec<Job>, SqlxError>;

    async fn update_job_status(&self, job_id: Uuid, status: JobStatus) -> Result<Job, SqlxError>;

    async fn create_bid(
        &self,
        job_id: Uuid,
        professional_id: Uuid,
        contact_name: String,
        contact_email: String,
        contact_phone: Option<String>,
        amount_cents: i64,
        message: Option<String>,
    ) -> Result<Bid, SqlxError>;

    async fn get_bid_by_id(&self, bid_id: Uuid) -> Result<Option<Bid>, SqlxError>;

    async fn get_job_bids(&self, job_id: Uuid) -> Result<Vec<Bid>, SqlxError>;

    async fn get_job_bid_for_professional(
        &self,
        job_id: Uuid,
        professional_id: Uuid,
    ) -> Result<Option<Bid>, SqlxError>;

    async fn get_professional_bids(&self, professional_id: Uuid) -> Result<Vec<Bid>, SqlxError>;

    async fn update_bid_status(&self, bid_id: Uuid, status: BidStatus) -> Result<Bid, SqlxError>;

    /// Accept one bid and reject every sibling in a single transaction.
    /// The job row is locked first so two concurrent acceptances serialize
    /// and the loser sees "job_not_open" instead of a second winner.
    async fn accept_bid(&self, job_id: Uuid, bid_id: Uuid) -> Result<BidAcceptance, SqlxError>;
}

#[async_trait]
impl JobExt for DBClient {
    async fn create_job(
        &self,
        poster: &User,
        title: String,
        description: String,
        category: JobCategory,
        location: String,
        budget_min_cents: Option<i64>,
        budget_max_cents: Option<i64>,
        budget_type: BudgetType,
        timeline: Option<String>,
    ) -> Result<Job, SqlxError> {
        sqlx::query_as::<_, Job>(
            r#"
            INSERT INTO jobs
            (poster_id, poster_name, poster_verified, title, description, category, location,
            budget_min_cents, budget_max_cents, budget_type, timeline)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING
                id, poster_id, poster_name, poster_verified,
                title, description, category, location,
                budget_min_cents, budget_max_cents, budget_type,
                timeline, status, created_at, updated_at
            "#,
        )
        .bind(poster.id)
        .bind(&poster.name)
        .bind(poster.verified)
        .bind(title)
        .bind(description)
        .bind(category)
        .bind(location)
        .bind(budget_min_cents)
        .bind(budget_max_cents)
        .bind(budget_type)
        .bind(timeline)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_job_by_id(&self, job_id: Uuid) -> Result<Option<Job>, SqlxError> {
        sqlx::query_as::<_, Job>(
            r#"
            SELECT
                id, poster_id, poster_name, poster_verified,
                title, description, category, location,
                budget_min_cents, budget_max_cents, budget_type,
                timeline, status, created_at, updated_at
            FROM jobs WHERE id = $1
            "#,
        )
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn search_jobs(
        &self,
        category: Option<JobCategory>,
        location: Option<&str>,
        status: Option<JobStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Job>, SqlxError> {
        sqlx::query_as::<_, Job>(
            r#"
            SELECT
                id, poster_id, poster_name, poster_verified,
                title, description, category, location,
                budget_min_cents, budget_max_cents, budget_type,
                timeline, status, created_at, updated_at
            FROM jobs
            WHERE ($1::job_category IS NULL OR category = $1)
              AND ($2::text IS NULL OR location ILIKE '%' || $2 || '%')
              AND ($3::job_status IS NULL OR status = $3)
            ORDER BY created_at DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(category)
        .bind(location)
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_poster_jobs(&self, poster_id: Uuid) -> Result<Vec<Job>, SqlxError> {
        sqlx::query_as::<_, Job>(
            r#"
            SELECT
                id, poster_id, poster_name, poster_verified,
                title, description, category, location,
                budget_min_cents, budget_max_cents, budget_type,
                timeline, status, created_at, updated_at
            FROM jobs
            WHERE poster_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(poster_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn update_job_status(&self, job_id: Uuid, status: JobStatus) -> Result<Job, SqlxError> {
        sqlx::query_as::<_, Job>(
            r#"
            UPDATE jobs
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING
                id, poster_id, poster_name, poster_verified,
                title, description, category, location,
                budget_min_cents, budget_max_cents, budget_type,
                timeline, status, created_at, updated_at
            "#,
        )
        .bind(job_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await
    }

    async fn create_bid(
        &self,
        job_id: Uuid,
        professional_id: Uuid,
        contact_name: String,
        contact_email: String,
        contact_phone: Option<String>,
        amount_cents: i64,
        message: Option<String>,
    ) -> Result<Bid, SqlxError> {
        sqlx::query_as::<_, Bid>(
            r#"
            INSERT INTO bids
            (job_id, professional_id, contact_name, contact_email, contact_phone,
            amount_cents, message)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING
                id, job_id, professional_id, contact_name, contact_email, contact_phone,
                amount_cents, message, status, created_at, updated_at
            "#,
        )
        .bind(job_id)
        .bind(professional_id)
        .bind(contact_name)
        .bind(contact_email)
        .bind(contact_phone)
        .bind(amount_cents)
        .bind(message)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_bid_by_id(&self, bid_id: Uuid) -> Result<Option<Bid>, SqlxError> {
        sqlx::query_as::<_, Bid>(
            r#"
            SELECT
                id, job_id, professional_id, contact_name, contact_email, contact_phone,
                amount_cents, message, status, created_at, updated_at
            FROM bids WHERE id = $1
            "#,
        )
        .bind(bid_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_job_bids(&self, job_id: Uuid) -> Result<Vec<Bid>, SqlxError> {
        sqlx::query_as::<_, Bid>(
            r#"
            SELECT
                id, job_id, professional_id, contact_name, contact_email, contact_phone,
                amount_cents, message, status, created_at, updated_at
            FROM bids
            WHERE job_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_job_bid_for_professional(
        &self,
        job_id: Uuid,
        professional_id: Uuid,
    ) -> Result<Option<Bid>, SqlxError> {
        sqlx::query_as::<_, Bid>(
            r#"
            SELECT
                id, job_id, professional_id, contact_name, contact_email, contact_phone,
                amount_cents, message, status, created_at, updated_at
            FROM bids
            WHERE job_id = $1 AND professional_id = $2
            "#,
        )
        .bind(job_id)
        .bind(professional_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_professional_bids(&self, professional_id: Uuid) -> Result<Vec<Bid>, SqlxError> {
        sqlx::query_as::<_, Bid>(
            r#"
            SELECT
                id, job_id, professional_id, contact_name, contact_email, contact_phone,
                amount_cents, message, status, created_at, updated_at
            FROM bids
            WHERE professional_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(professional_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn update_bid_status(&self, bid_id: Uuid, status: BidStatus) -> Result<Bid, SqlxError> {
        sqlx::query_as::<_, Bid>(
            r#"
            UPDATE bids
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING
                id, job_id, professional_id, contact_name, contact_email, contact_phone,
                amount_cents, message, status, created_at, updated_at
            "#,
        )
        .bind(bid_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await
    }

    async fn accept_bid(&self, job_id: Uuid, bid_id: Uuid) -> Result<BidAcceptance, SqlxError> {
        let mut tx = self.pool.begin().await?;

        // 1. Lock the job row; only an open job can accept a bid
        let job = sqlx::query_as::<_, Job>(
            r#"
            SELECT
                id, poster_id, poster_name, poster_verified,
                title, description, category, location,
                budget_min_cents, budget_max_cents, budget_type,
                timeline, status, created_at, updated_at
            FROM jobs
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(job_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(SqlxError::RowNotFound)?;

        if job.status != Some(JobStatus::Open) {
            return Err(SqlxError::Protocol("job_not_open".into()));
        }

        // 2. The target bid must belong to this job and still be pending
        let bid = sqlx::query_as::<_, Bid>(
            r#"
            SELECT
                id, job_id, professional_id, contact_name, contact_email, contact_phone,
                amount_cents, message, status, created_at, updated_at
            FROM bids
            WHERE id = $1 AND job_id = $2
            FOR UPDATE
            "#,
        )
        .bind(bid_id)
        .bind(job_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(SqlxError::RowNotFound)?;

        if bid.status != Some(BidStatus::Pending) {
            return Err(SqlxError::Protocol("bid_not_pending".into()));
        }

        // 3. Accept the target
        let accepted = sqlx::query_as::<_, Bid>(
            r#"
            UPDATE bids
            SET status = 'accepted'::bid_status, updated_at = NOW()
            WHERE id = $1
            RETURNING
                id, job_id, professional_id, contact_name, contact_email, contact_phone,
                amount_cents, message, status, created_at, updated_at
            "#,
        )
        .bind(bid_id)
        .fetch_one(&mut *tx)
        .await?;

        // 4. Cascade-reject every sibling bid on the same job
        let rejected_professionals: Vec<Uuid> = sqlx::query_scalar::<_, Uuid>(
            r#"
            UPDATE bids
            SET status = 'rejected'::bid_status, updated_at = NOW()
            WHERE job_id = $1 AND id <> $2 AND status <> 'rejected'::bid_status
            RETURNING professional_id
            "#,
        )
        .bind(job_id)
        .bind(bid_id)
        .fetch_all(&mut *tx)
        .await?;

        // 5. The job moves to in_progress automatically
        let updated_job = sqlx::query_as::<_, Job>(
            r#"
            UPDATE jobs
            SET status = 'in_progress'::job_status, updated_at = NOW()
            WHERE id = $1
            RETURNING
                id, poster_id, poster_name, poster_verified,
                title, description, category, location,
                budget_min_cents, budget_max_cents, budget_type,
                timeline, status, created_at, updated_at
            "#,
        )
        .bind(job_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(BidAcceptance {
            job: updated_job,
            bid: accepted,
            rejected_professionals,
        })
    }
}
