use crate::db::cache::{unread_cache_key, CacheHelper, UNREAD_CACHE_TTL};
use crate::db::chatdb::ChatExt;
use crate::db::db::DBClient;
use redis::{aio::ConnectionManager, AsyncCommands};
use serde::{Deserialize, Serialize};
use serde_json::from_str;
use std::sync::Arc;
use tokio::time::{sleep, Duration};
use uuid::Uuid;

/// Redis list that carries new-message events from the send path to the
/// unread-count worker.
pub const MESSAGE_EVENTS_QUEUE: &str = "chat:message_events";

/// The minimal event a message send produces. The worker only needs the
/// conversation and the recipient to refresh one unread count, so the
/// subscription stays filtered by conversation instead of fanning out over
/// every message addressed to a user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageEvent {
    pub conversation_id: Uuid,
    pub recipient_id: Uuid,
}

/// Best-effort publish; delivery is not guaranteed and the database count
/// stays authoritative, so a Redis failure only delays cache refreshes.
pub async fn publish_message_event(db_client: &DBClient, event: &MessageEvent) {
    let Some(redis_client) = &db_client.redis_client else {
        return;
    };

    let payload = match serde_json::to_string(event) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::error!("MessageEvents: failed to serialize event: {}", e);
            return;
        }
    };

    let mut conn = ConnectionManager::clone(redis_client);
    if let Err(e) = conn.lpush::<_, _, ()>(MESSAGE_EVENTS_QUEUE, &payload).await {
        tracing::warn!("MessageEvents: failed to publish event: {}", e);
    }
}

/// Unread-count refresh worker
///
/// This is a simple, resilient worker that reads new-message events from a
/// Redis list using `BRPOP`, recomputes the affected conversation's unread
/// count for the recipient from Postgres, and refreshes the cache entry the
/// unread-count endpoint serves from. Events are consumed per conversation,
/// so one busy thread never forces recounts for unrelated ones.
#[derive(Clone)]
pub struct MessageEventWorker {
    db_client: Arc<DBClient>,
    /// Redis list key to pop events from
    pub queue_key: String,
    /// Poll/backoff settings
    pub idle_sleep: Duration,
}

impl MessageEventWorker {
    pub fn new(db_client: Arc<DBClient>, queue_key: &str) -> Self {
        Self {
            db_client,
            queue_key: queue_key.to_string(),
            idle_sleep: Duration::from_secs(2),
        }
    }

    /// Run the worker loop until the provided shutdown signal triggers.
    /// This will block the current task while polling Redis with BRPOP.
    pub async fn run_forever(&self, shutdown: impl std::future::Future<Output = ()>) {
        let mut shutdown = Box::pin(shutdown);

        loop {
            // Check shutdown first
            if futures::future::poll_immediate(&mut shutdown).await.is_some() {
                tracing::info!("MessageEventWorker: shutdown requested, exiting loop");
                break;
            }

            // If Redis isn't configured, sleep and retry
            if self.db_client.redis_client.is_none() {
                tracing::warn!("MessageEventWorker: Redis not configured; sleeping before retrying");
                sleep(self.idle_sleep).await;
                continue;
            }

            // Try to pop an event from the list with a small timeout
            if let Some(rc) = &self.db_client.redis_client {
                let mut conn = ConnectionManager::clone(rc);
                // Use explicit BRPOP and map to Option<(String, String)> so nil (timeout) is handled
                match redis::cmd("BRPOP")
                    .arg(&self.queue_key)
                    .arg(5)
                    .query_async::<_, Option<(String, String)>>(&mut conn)
                    .await
                {
                    Ok(Some((_key, payload))) => match from_str::<MessageEvent>(&payload) {
                        Ok(event) => {
                            if let Err(e) = self.refresh_unread_count(&event).await {
                                tracing::error!(
                                    "MessageEventWorker: failed to refresh unread count: {} ; payload: {}",
                                    e,
                                    payload
                                );
                            }
                        }
                        Err(e) => {
                            // Include raw payload when deserialization fails to make debugging easier
                            tracing::error!(
                                "MessageEventWorker: invalid event payload: {} ; payload: {}",
                                e,
                                payload
                            );
                            let _: Result<(), _> = conn.lpush("chat:bad_payloads", &payload).await;
                        }
                    },
                    Ok(None) => {
                        // timeout, no data
                    }
                    Err(e) => {
                        tracing::error!("MessageEventWorker: redis brpop error: {}", e);
                        // backoff a bit to avoid tight error loop
                        sleep(self.idle_sleep).await;
                    }
                }
            }
        }

        tracing::info!("MessageEventWorker: stopped");
    }

    async fn refresh_unread_count(&self, event: &MessageEvent) -> Result<(), String> {
        let count = self
            .db_client
            .unread_count_for_conversation(event.conversation_id, event.recipient_id)
            .await
            .map_err(|e| e.to_string())?;

        if let Some(redis_client) = &self.db_client.redis_client {
            let key = unread_cache_key(event.conversation_id, event.recipient_id);
            CacheHelper::set(redis_client, &key, &count, UNREAD_CACHE_TTL)
                .await
                .map_err(|e| e.to_string())?;
        }

        tracing::debug!(
            "MessageEventWorker: conversation {} has {} unread for {}",
            event.conversation_id,
            count,
            event.recipient_id
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::db::DBClient;
    use sqlx::PgPool;

    #[test]
    fn message_event_round_trips_through_json() {
        let event = MessageEvent {
            conversation_id: Uuid::new_v4(),
            recipient_id: Uuid::new_v4(),
        };

        let payload = serde_json::to_string(&event).unwrap();
        let decoded: MessageEvent = serde_json::from_str(&payload).unwrap();
        assert_eq!(decoded, event);
    }

    #[tokio::test]
    async fn message_event_worker_compiles() {
        let pool = PgPool::connect_lazy("postgres://localhost/bidnest").unwrap();
        let db_client = Arc::new(DBClient::new(pool));
        let worker = MessageEventWorker::new(db_client, MESSAGE_EVENTS_QUEUE);

        // Ensure the API is callable
        let _ = worker.idle_sleep;
    }
}
