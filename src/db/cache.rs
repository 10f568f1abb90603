// db/cache.rs
use redis::{aio::ConnectionManager, AsyncCommands};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Cache TTL constants (in seconds)
pub const UNREAD_CACHE_TTL: usize = 300; // 5 minutes

/// Key for the cached unread count of one (conversation, viewer) pair. The
/// message-event worker refreshes these; mark-read drops them.
pub fn unread_cache_key(conversation_id: Uuid, user_id: Uuid) -> String {
    format!("unread:{}:{}", conversation_id, user_id)
}

pub struct CacheHelper;

impl CacheHelper {
    /// Generic get from cache
    pub async fn get<T: DeserializeOwned>(
        redis: &Arc<ConnectionManager>,
        key: &str,
    ) -> Result<Option<T>, redis::RedisError> {
        let mut redis = ConnectionManager::clone(redis);
        let cached: Result<String, redis::RedisError> = redis.get(key).await;

        match cached {
            Ok(data) => {
                if let Ok(value) = serde_json::from_str::<T>(&data) {
                    tracing::debug!("Cache HIT: {}", key);
                    Ok(Some(value))
                } else {
                    tracing::warn!("Cache deserialization failed for: {}", key);
                    Ok(None)
                }
            }
            Err(_) => {
                tracing::debug!("Cache MISS: {}", key);
                Ok(None)
            }
        }
    }

    /// Generic set to cache with TTL
    pub async fn set<T: Serialize>(
        redis: &Arc<ConnectionManager>,
        key: &str,
        value: &T,
        ttl_seconds: usize,
    ) -> Result<(), redis::RedisError> {
        if let Ok(json) = serde_json::to_string(value) {
            let mut conn = ConnectionManager::clone(redis);
            let _: () = conn.set_ex(key, json, ttl_seconds).await?;
            tracing::debug!("Cache SET: {} (TTL: {}s)", key, ttl_seconds);
        }
        Ok(())
    }

    /// Delete a cache key
    pub async fn delete(
        redis: &Arc<ConnectionManager>,
        key: &str,
    ) -> Result<(), redis::RedisError> {
        let mut conn = ConnectionManager::clone(redis);
        let _: () = redis::AsyncCommands::del(&mut conn, key).await?;
        tracing::debug!("Cache DELETE: {}", key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unread_cache_key_is_scoped_to_conversation_and_viewer() {
        let conversation = Uuid::new_v4();
        let viewer = Uuid::new_v4();
        let other_viewer = Uuid::new_v4();

        let key = unread_cache_key(conversation, viewer);
        assert!(key.starts_with("unread:"));
        assert_ne!(key, unread_cache_key(conversation, other_viewer));
    }
}
