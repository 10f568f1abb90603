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
    db::{
        cache::{unread_cache_key, CacheHelper, UNREAD_CACHE_TTL},
        chatdb::ChatExt,
        jobdb::JobExt,
        userdb::UserExt,
    },
    dtos::chatdtos::*,
    error::HttpError,
    middleware::JWTAuthMiddleware,
    models::chatmodel::Conversation,
    service::message_events::{publish_message_event, MessageEvent},
    AppState,
};

pub fn chat_handler() -> Router {
    Router::new()
        .route(
            "/conversations",
            get(get_my_conversations).post(start_conversation),
        )
        .route(
            "/conversations/:conversation_id/messages",
            get(get_messages).post(send_message),
        )
        .route("/conversations/:conversation_id/read", put(mark_conversation_as_read))
        .route("/unread-count", get(get_unread_count))
}

/// Conversations are created lazily, on the first chat attempt for a
/// (job, poster, professional) triple; accepting a bid never creates one.
pub async fn start_conversation(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    Json(body): Json<StartConversationDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let job = app_state
        .db_client
        .get_job_by_id(body.job_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Job not found"))?;

    // Resolve the triple from the caller's side of the table
    let professional_id = if auth.user.id == job.poster_id {
        body.professional_id
            .ok_or_else(|| HttpError::bad_request("professional_id is required"))?
    } else {
        auth.user.id
    };

    if professional_id == job.poster_id {
        return Err(HttpError::bad_request(
            "A job poster cannot open a conversation with themselves",
        ));
    }

    let other_user_id = if auth.user.id == job.poster_id {
        professional_id
    } else {
        job.poster_id
    };

    let other_user = app_state
        .db_client
        .get_user(Some(other_user_id), None)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("User not found"))?;

    let conversation = app_state
        .db_client
        .create_or_get_conversation(job.id, job.poster_id, professional_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let response = ConversationWithDetails {
        conversation,
        other_user: ConversationParticipant {
            id: other_user.id,
            name: other_user.name,
            verified: other_user.verified,
        },
        last_message: None,
        unread_count: 0,
    };

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": response
    })))
}

pub async fn get_my_conversations(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let page = pagination.page.unwrap_or(1).max(1);
    let limit = pagination.limit.unwrap_or(20) as i64;
    let offset = ((page - 1) * limit as u32) as i64;

    let conversations = app_state
        .db_client
        .get_user_conversations(auth.user.id, limit, offset)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let mut conversation_details = Vec::new();

    for conversation in conversations {
        let other_user_id = conversation
            .other_participant(auth.user.id)
            .ok_or_else(|| HttpError::server_error("Conversation participant mismatch"))?;

        let other_user = app_state
            .db_client
            .get_user(Some(other_user_id), None)
            .await
            .map_err(|e| HttpError::server_error(e.to_string()))?
            .ok_or_else(|| HttpError::not_found("User not found"))?;

        let messages = app_state
            .db_client
            .get_conversation_messages(conversation.id, 1, 0)
            .await
            .map_err(|e| HttpError::server_error(e.to_string()))?;

        let last_message = messages.first().cloned();

        let unread_count = app_state
            .db_client
            .unread_count_for_conversation(conversation.id, auth.user.id)
            .await
            .unwrap_or(0);

        conversation_details.push(ConversationWithDetails {
            conversation,
            other_user: ConversationParticipant {
                id: other_user.id,
                name: other_user.name,
                verified: other_user.verified,
            },
            last_message,
            unread_count,
        });
    }

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": conversation_details
    })))
}

pub async fn get_messages(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    Path(conversation_id): Path<Uuid>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let conversation = fetch_participant_conversation(&app_state, conversation_id, auth.user.id).await?;

    let page = pagination.page.unwrap_or(1).max(1);
    let limit = pagination.limit.unwrap_or(50) as i64;
    let offset = ((page - 1) * limit as u32) as i64;

    let messages = app_state
        .db_client
        .get_conversation_messages(conversation.id, limit, offset)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": messages
    })))
}

pub async fn send_message(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    Path(conversation_id): Path<Uuid>,
    Json(body): Json<SendMessageDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let conversation = fetch_participant_conversation(&app_state, conversation_id, auth.user.id).await?;

    let recipient_id = conversation
        .other_participant(auth.user.id)
        .ok_or_else(|| HttpError::server_error("Conversation participant mismatch"))?;

    let message = app_state
        .db_client
        .send_message(conversation_id, auth.user.id, recipient_id, body.content)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    // Best-effort: the worker refreshes the recipient's cached unread count
    publish_message_event(
        &app_state.db_client,
        &MessageEvent {
            conversation_id,
            recipient_id,
        },
    )
    .await;

    let _ = app_state
        .notification_service
        .notify_new_message(recipient_id, &auth.user.name, &message)
        .await;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": message
    })))
}

pub async fn mark_conversation_as_read(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    Path(conversation_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let conversation = fetch_participant_conversation(&app_state, conversation_id, auth.user.id).await?;

    let marked = app_state
        .db_client
        .mark_messages_as_read(conversation.id, auth.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    // Drop the cached count so the next read reflects zero immediately
    if let Some(redis_client) = &app_state.db_client.redis_client {
        let key = unread_cache_key(conversation.id, auth.user.id);
        let _ = CacheHelper::delete(redis_client, &key).await;
    }

    Ok(Json(serde_json::json!({
        "status": "success",
        "message": "Messages marked as read",
        "data": { "marked": marked }
    })))
}

/// Unread count for the conversation identified by a (job, poster,
/// professional) triple. A triple with no conversation yet reports 0; that
/// is a normal state, not an error.
pub async fn get_unread_count(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    Query(query): Query<UnreadCountQuery>,
) -> Result<impl IntoResponse, HttpError> {
    if auth.user.id != query.poster_id && auth.user.id != query.professional_id {
        return Err(HttpError::unauthorized(
            "Not authorized to view this conversation",
        ));
    }

    let conversation = app_state
        .db_client
        .get_conversation_for_job(query.job_id, query.poster_id, query.professional_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let Some(conversation) = conversation else {
        return Ok(Json(serde_json::json!({
            "status": "success",
            "data": { "unread_count": 0 }
        })));
    };

    // Serve the worker-maintained cache entry when present; fall back to
    // the authoritative count and refill
    if let Some(redis_client) = &app_state.db_client.redis_client {
        let key = unread_cache_key(conversation.id, auth.user.id);
        if let Ok(Some(count)) = CacheHelper::get::<i64>(redis_client, &key).await {
            return Ok(Json(serde_json::json!({
                "status": "success",
                "data": { "unread_count": count }
            })));
        }
    }

    let count = app_state
        .db_client
        .unread_count_for_conversation(conversation.id, auth.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    if let Some(redis_client) = &app_state.db_client.redis_client {
        let key = unread_cache_key(conversation.id, auth.user.id);
        let _ = CacheHelper::set(redis_client, &key, &count, UNREAD_CACHE_TTL).await;
    }

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": { "unread_count": count }
    })))
}

async fn fetch_participant_conversation(
    app_state: &Arc<AppState>,
    conversation_id: Uuid,
    user_id: Uuid,
) -> Result<Conversation, HttpError> {
    let conversation = app_state
        .db_client
        .get_conversation_by_id(conversation_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Conversation not found"))?;

    if !conversation.is_participant(user_id) {
        return Err(HttpError::unauthorized(
            "Not authorized to view this conversation",
        ));
    }

    Ok(conversation)
}
