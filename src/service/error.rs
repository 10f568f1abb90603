use crate::{error::HttpError, models::jobmodel::*};
use axum::http::StatusCode;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Job {0} not found")]
    JobNotFound(Uuid),

    #[error("Bid {0} not found")]
    BidNotFound(Uuid),

    #[error("Conversation {0} not found")]
    ConversationNotFound(Uuid),

    #[error("Job {0} is not in status {1:?}")]
    InvalidJobStatus(Uuid, JobStatus),

    #[error("Bid {0} is not in status {1:?}")]
    InvalidBidStatus(Uuid, BidStatus),

    #[error("User {0} is not authorized to perform this action on job {1}")]
    UnauthorizedJobAccess(Uuid, Uuid),

    #[error("User {0} cannot bid on their own job {1}")]
    OwnJobBid(Uuid, Uuid),

    #[error("User {0} has already placed a bid on job {1}")]
    DuplicateBid(Uuid, Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Notification error: {0}")]
    Notification(String),
}

impl From<ServiceError> for HttpError {
    fn from(error: ServiceError) -> Self {
        match error {
            ServiceError::JobNotFound(_)
            | ServiceError::BidNotFound(_)
            | ServiceError::ConversationNotFound(_) => HttpError::not_found(error.to_string()),

            ServiceError::InvalidJobStatus(_, _)
            | ServiceError::InvalidBidStatus(_, _)
            | ServiceError::OwnJobBid(_, _)
            | ServiceError::Validation(_) => HttpError::bad_request(error.to_string()),

            ServiceError::DuplicateBid(_, _) => HttpError::conflict(error.to_string()),

            ServiceError::UnauthorizedJobAccess(_, _) => HttpError::unauthorized(error.to_string()),

            _ => HttpError::server_error(error.to_string()),
        }
    }
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::JobNotFound(_)
            | ServiceError::BidNotFound(_)
            | ServiceError::ConversationNotFound(_) => StatusCode::NOT_FOUND,

            ServiceError::InvalidJobStatus(_, _)
            | ServiceError::InvalidBidStatus(_, _)
            | ServiceError::OwnJobBid(_, _)
            | ServiceError::Validation(_) => StatusCode::BAD_REQUEST,

            ServiceError::DuplicateBid(_, _) => StatusCode::CONFLICT,

            ServiceError::UnauthorizedJobAccess(_, _) => StatusCode::UNAUTHORIZED,

            ServiceError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,

            ServiceError::Notification(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_variants_map_to_404() {
        let id = Uuid::new_v4();
        assert_eq!(
            ServiceError::JobNotFound(id).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::BidNotFound(id).status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn duplicate_bid_maps_to_conflict() {
        let err = ServiceError::DuplicateBid(Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(HttpError::from(err).status, StatusCode::CONFLICT);
    }

    #[test]
    fn own_job_bid_is_a_bad_request_with_a_specific_message() {
        let err = ServiceError::OwnJobBid(Uuid::new_v4(), Uuid::new_v4());
        let http: HttpError = err.into();
        assert_eq!(http.status, StatusCode::BAD_REQUEST);
        assert!(http.message.contains("own job"));
    }
}
