// services/notification_service.rs
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    db::db::DBClient,
    models::chatmodel::Message,
    models::jobmodel::*,
    service::error::ServiceError,
    utils::currency::format_cents_as_dollars,
};

#[derive(Debug, Clone)]
pub struct NotificationService {
    db_client: Arc<DBClient>,
}

impl NotificationService {
    pub fn new(db_client: Arc<DBClient>) -> Self {
        Self { db_client }
    }

    pub async fn notify_new_bid(
        &self,
        poster_id: Uuid,
        job: &Job,
        bid: &Bid,
    ) -> Result<(), ServiceError> {
        tracing::info!(
            "New bid notification: poster {} received a bid on job {}",
            poster_id,
            job.id
        );

        self.store_notification(
            poster_id,
            "new_bid".to_string(),
            Some(job.id),
            Some(serde_json::json!({
                "bid_id": bid.id,
                "job_title": job.title,
                "category": job.category.to_str(),
                "bidder_name": bid.contact_name,
                "amount": format_cents_as_dollars(bid.amount_cents),
            })),
            format!("New bid received on your job: {}", job.title),
        )
        .await
    }

    pub async fn notify_bid_accepted(
        &self,
        professional_id: Uuid,
        job: &Job,
    ) -> Result<(), ServiceError> {
        tracing::info!(
            "Bid acceptance notification: professional {} accepted for job {}",
            professional_id,
            job.id
        );

        self.store_notification(
            professional_id,
            "bid_accepted".to_string(),
            Some(job.id),
            Some(serde_json::json!({
                "job_title": job.title,
                "poster_id": job.poster_id,
            })),
            format!("Your bid was accepted: {}", job.title),
        )
        .await
    }

    pub async fn notify_bid_rejected(
        &self,
        professional_id: Uuid,
        job: &Job,
    ) -> Result<(), ServiceError> {
        self.store_notification(
            professional_id,
            "bid_rejected".to_string(),
            Some(job.id),
            Some(serde_json::json!({
                "job_title": job.title,
            })),
            format!("Your bid was not selected: {}", job.title),
        )
        .await
    }

    pub async fn notify_new_message(
        &self,
        recipient_id: Uuid,
        sender_name: &str,
        message: &Message,
    ) -> Result<(), ServiceError> {
        self.store_notification(
            recipient_id,
            "new_message".to_string(),
            None,
            Some(serde_json::json!({
                "conversation_id": message.conversation_id,
                "sender_name": sender_name,
            })),
            format!("New message from {}", sender_name),
        )
        .await
    }

    async fn store_notification(
        &self,
        user_id: Uuid,
        notification_type: String,
        job_id: Option<Uuid>,
        metadata: Option<serde_json::Value>,
        message: String,
    ) -> Result<(), ServiceError> {
        sqlx::query(
            r#"
            INSERT INTO notifications
            (user_id, type, job_id, metadata, message, created_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            "#,
        )
        .bind(user_id)
        .bind(notification_type)
        .bind(job_id)
        .bind(metadata)
        .bind(message)
        .execute(&self.db_client.pool)
        .await?;

        Ok(())
    }

    pub async fn get_user_notifications(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<UserNotification>, ServiceError> {
        let notifications = sqlx::query_as::<_, UserNotification>(
            r#"
            SELECT id, user_id, type, job_id, metadata, message, is_read, created_at
            FROM notifications
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db_client.pool)
        .await?;

        Ok(notifications)
    }

    pub async fn mark_notification_read(
        &self,
        notification_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), ServiceError> {
        sqlx::query(
            r#"
            UPDATE notifications
            SET is_read = true
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(notification_id)
        .bind(user_id)
        .execute(&self.db_client.pool)
        .await?;

        Ok(())
    }

    pub async fn mark_all_notifications_read(&self, user_id: Uuid) -> Result<(), ServiceError> {
        sqlx::query(
            r#"
            UPDATE notifications
            SET is_read = true
            WHERE user_id = $1 AND is_read = false
            "#,
        )
        .bind(user_id)
        .execute(&self.db_client.pool)
        .await?;

        Ok(())
    }
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct UserNotification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub r#type: String,
    pub job_id: Option<Uuid>,
    pub metadata: Option<serde_json::Value>,
    pub message: String,
    pub is_read: Option<bool>,
    pub created_at: Option<DateTime<Utc>>,
}
