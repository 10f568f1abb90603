// handlers/jobs.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::jobdb::JobExt,
    dtos::jobdtos::*,
    error::HttpError,
    middleware::{require_role, JWTAuthMiddleware},
    models::usermodel::UserRole,
    service::bid_service::BidService,
    AppState,
};

pub fn jobs_handler() -> Router {
    Router::new()
        // Job management routes
        .route("/", post(create_job).get(search_jobs))
        .route("/mine", get(get_my_jobs))
        .route("/:job_id", get(get_job_details))
        .route("/:job_id/status", put(update_job_status))
        // Bid routes
        .route("/:job_id/bids", post(submit_bid).get(get_job_bids))
        .route("/:job_id/bids/:bid_id/accept", put(accept_bid))
        .route("/:job_id/bids/:bid_id/reject", put(reject_bid))
}

pub fn bids_handler() -> Router {
    Router::new().route("/mine", get(get_my_bids))
}

// Job Handlers
pub async fn create_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    Json(body): Json<CreateJobDto>,
) -> Result<impl IntoResponse, HttpError> {
    require_role(&auth.user, UserRole::JobPoster)?;

    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    if let (Some(min), Some(max)) = (body.budget_min_cents, body.budget_max_cents) {
        if min > max {
            return Err(HttpError::bad_request(
                "Minimum budget cannot exceed maximum budget",
            ));
        }
    }

    let job = app_state
        .db_client
        .create_job(
            &auth.user,
            body.title,
            body.description,
            body.category,
            body.location,
            body.budget_min_cents,
            body.budget_max_cents,
            body.budget_type,
            body.timeline,
        )
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::success("Job created successfully", job)))
}

pub async fn search_jobs(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query): Query<SearchJobsQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).min(50) as i64;
    let offset = ((page - 1) * limit as u32) as i64;

    let jobs = app_state
        .db_client
        .search_jobs(
            query.category,
            query.location.as_deref(),
            query.status,
            limit,
            offset,
        )
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(PaginatedResponse::new(jobs, page, limit as u32)))
}

pub async fn get_my_jobs(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
) -> Result<impl IntoResponse, HttpError> {
    require_role(&auth.user, UserRole::JobPoster)?;

    let jobs = app_state
        .db_client
        .get_poster_jobs(auth.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::success(
        "Jobs retrieved successfully",
        jobs,
    )))
}

pub async fn get_job_details(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let job = app_state
        .db_client
        .get_job_by_id(job_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Job not found"))?;

    Ok(Json(ApiResponse::success(
        "Job retrieved successfully",
        job,
    )))
}

pub async fn update_job_status(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    Path(job_id): Path<Uuid>,
    Json(body): Json<UpdateJobStatusDto>,
) -> Result<impl IntoResponse, HttpError> {
    require_role(&auth.user, UserRole::JobPoster)?;

    let job = app_state
        .bid_service
        .change_job_status(auth.user.id, job_id, body.status)
        .await?;

    Ok(Json(ApiResponse::success(
        "Job status updated successfully",
        job,
    )))
}

// Bid Handlers
pub async fn submit_bid(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    Path(job_id): Path<Uuid>,
    Json(body): Json<SubmitBidDto>,
) -> Result<impl IntoResponse, HttpError> {
    require_role(&auth.user, UserRole::Professional)?;

    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let bid = app_state
        .bid_service
        .submit_bid(&auth.user, job_id, body)
        .await?;

    Ok(Json(ApiResponse::success(
        "Bid submitted successfully",
        bid,
    )))
}

/// The job's poster sees every bid; a bidder sees only their own. Anyone
/// else gets an authorization error, mirroring the row policy of the
/// original store.
pub async fn get_job_bids(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let job = app_state
        .db_client
        .get_job_by_id(job_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Job not found"))?;

    if BidService::is_job_poster(&job, auth.user.id) {
        let bids = app_state
            .db_client
            .get_job_bids(job_id)
            .await
            .map_err(|e| HttpError::server_error(e.to_string()))?;

        return Ok(Json(ApiResponse::success(
            "Bids retrieved successfully",
            bids,
        )));
    }

    let own_bid = app_state
        .db_client
        .get_job_bid_for_professional(job_id, auth.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    match own_bid {
        Some(bid) => Ok(Json(ApiResponse::success(
            "Bids retrieved successfully",
            vec![bid],
        ))),
        None => Err(HttpError::unauthorized(
            "Not authorized to view bids for this job",
        )),
    }
}

pub async fn accept_bid(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    Path((job_id, bid_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, HttpError> {
    require_role(&auth.user, UserRole::JobPoster)?;

    let acceptance = app_state
        .bid_service
        .accept_bid(auth.user.id, job_id, bid_id)
        .await?;

    Ok(Json(ApiResponse::success(
        "Bid accepted successfully",
        BidAcceptanceResponse {
            job: acceptance.job,
            accepted_bid: acceptance.bid,
            rejected_bids: acceptance.rejected_professionals.len(),
        },
    )))
}

pub async fn reject_bid(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    Path((job_id, bid_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, HttpError> {
    require_role(&auth.user, UserRole::JobPoster)?;

    let bid = app_state
        .bid_service
        .reject_bid(auth.user.id, job_id, bid_id)
        .await?;

    Ok(Json(ApiResponse::success("Bid rejected", bid)))
}

pub async fn get_my_bids(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
) -> Result<impl IntoResponse, HttpError> {
    require_role(&auth.user, UserRole::Professional)?;

    let bids = app_state
        .db_client
        .get_professional_bids(auth.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::success(
        "Bids retrieved successfully",
        bids,
    )))
}
