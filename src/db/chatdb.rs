// db/chatdb.rs
use async_trait::async_trait;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::chatmodel::*;

#[async_trait]
pub trait ChatExt {
    // Conversation management
    async fn create_or_get_conversation(
        &self,
        job_id: Uuid,
        poster_id: Uuid,
        professional_id: Uuid,
    ) -> Result<Conversation, Error>;

    async fn get_conversation_by_id(
        &self,
        conversation_id: Uuid,
    ) -> Result<Option<Conversation>, Error>;

    async fn get_conversation_for_job(
        &self,
        job_id: Uuid,
        poster_id: Uuid,
        professional_id: Uuid,
    ) -> Result<Option<Conversation>, Error>;

    async fn get_user_conversations(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Conversation>, Error>;

    // Message management
    async fn send_message(
        &self,
        conversation_id: Uuid,
        sender_id: Uuid,
        recipient_id: Uuid,
        content: String,
    ) -> Result<Message, Error>;

    async fn get_conversation_messages(
        &self,
        conversation_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Message>, Error>;

    async fn mark_messages_as_read(
        &self,
        conversation_id: Uuid,
        user_id: Uuid,
    ) -> Result<u64, Error>;

    async fn unread_count_for_conversation(
        &self,
        conversation_id: Uuid,
        user_id: Uuid,
    ) -> Result<i64, Error>;

    async fn unread_count_for_user(&self, user_id: Uuid) -> Result<i64, Error>;
}

#[async_trait]
impl ChatExt for DBClient {
    async fn create_or_get_conversation(
        &self,
        job_id: Uuid,
        poster_id: Uuid,
        professional_id: Uuid,
    ) -> Result<Conversation, Error> {
        // Try to find the existing thread for this triple first
        let existing = self
            .get_conversation_for_job(job_id, poster_id, professional_id)
            .await?;

        if let Some(conversation) = existing {
            return Ok(conversation);
        }

        // Create new conversation; a concurrent creator loses to the unique
        // index and we fall back to the row it inserted
        let inserted = sqlx::query_as::<_, Conversation>(
            r#"
            INSERT INTO conversations (job_id, poster_id, professional_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (job_id, poster_id, professional_id) DO NOTHING
            RETURNING id, job_id, poster_id, professional_id, last_message_at, created_at
            "#,
        )
        .bind(job_id)
        .bind(poster_id)
        .bind(professional_id)
        .fetch_optional(&self.pool)
        .await?;

        match inserted {
            Some(conversation) => Ok(conversation),
            None => self
                .get_conversation_for_job(job_id, poster_id, professional_id)
                .await?
                .ok_or(Error::RowNotFound),
        }
    }

    async fn get_conversation_by_id(
        &self,
        conversation_id: Uuid,
    ) -> Result<Option<Conversation>, Error> {
        sqlx::query_as::<_, Conversation>(
            r#"
            SELECT id, job_id, poster_id, professional_id, last_message_at, created_at
            FROM conversations
            WHERE id = $1
            "#,
        )
        .bind(conversation_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_conversation_for_job(
        &self,
        job_id: Uuid,
        poster_id: Uuid,
        professional_id: Uuid,
    ) -> Result<Option<Conversation>, Error> {
        sqlx::query_as::<_, Conversation>(
            r#"
            SELECT id, job_id, poster_id, professional_id, last_message_at, created_at
            FROM conversations
            WHERE job_id = $1 AND poster_id = $2 AND professional_id = $3
            "#,
        )
        .bind(job_id)
        .bind(poster_id)
        .bind(professional_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_user_conversations(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Conversation>, Error> {
        sqlx::query_as::<_, Conversation>(
            r#"
            SELECT id, job_id, poster_id, professional_id, last_message_at, created_at
            FROM conversations
            WHERE poster_id = $1 OR professional_id = $1
            ORDER BY last_message_at DESC NULLS LAST, created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    async fn send_message(
        &self,
        conversation_id: Uuid,
        sender_id: Uuid,
        recipient_id: Uuid,
        content: String,
    ) -> Result<Message, Error> {
        let mut tx = self.pool.begin().await?;

        // Insert message
        let message = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (conversation_id, sender_id, recipient_id, content)
            VALUES ($1, $2, $3, $4)
            RETURNING id, conversation_id, sender_id, recipient_id, content, read_at, created_at
            "#,
        )
        .bind(conversation_id)
        .bind(sender_id)
        .bind(recipient_id)
        .bind(content)
        .fetch_one(&mut *tx)
        .await?;

        // Update conversation's last_message_at
        sqlx::query(
            r#"
            UPDATE conversations
            SET last_message_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(conversation_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(message)
    }

    async fn get_conversation_messages(
        &self,
        conversation_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Message>, Error> {
        sqlx::query_as::<_, Message>(
            r#"
            SELECT id, conversation_id, sender_id, recipient_id, content, read_at, created_at
            FROM messages
            WHERE conversation_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(conversation_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    async fn mark_messages_as_read(
        &self,
        conversation_id: Uuid,
        user_id: Uuid,
    ) -> Result<u64, Error> {
        let result = sqlx::query(
            r#"
            UPDATE messages
            SET read_at = NOW()
            WHERE conversation_id = $1
              AND recipient_id = $2
              AND read_at IS NULL
            "#,
        )
        .bind(conversation_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn unread_count_for_conversation(
        &self,
        conversation_id: Uuid,
        user_id: Uuid,
    ) -> Result<i64, Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM messages
            WHERE conversation_id = $1
              AND recipient_id = $2
              AND read_at IS NULL
            "#,
        )
        .bind(conversation_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn unread_count_for_user(&self, user_id: Uuid) -> Result<i64, Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM messages
            WHERE recipient_id = $1
              AND read_at IS NULL
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
    }
}
