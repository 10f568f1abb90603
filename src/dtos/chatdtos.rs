use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::chatmodel::{Conversation, Message};

#[derive(Debug, Deserialize, Validate)]
pub struct StartConversationDto {
    pub job_id: Uuid,
    /// Required when a job poster opens the thread; a professional's own id
    /// is used when they start the conversation themselves.
    pub professional_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SendMessageDto {
    #[validate(length(min = 1, max = 5000, message = "Message must be between 1 and 5000 characters"))]
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct PaginationQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// The (job, poster, professional) triple identifying one conversation.
#[derive(Debug, Deserialize)]
pub struct UnreadCountQuery {
    pub job_id: Uuid,
    pub poster_id: Uuid,
    pub professional_id: Uuid,
}

#[derive(Debug, Serialize, Clone)]
pub struct ConversationParticipant {
    pub id: Uuid,
    pub name: String,
    pub verified: bool,
}

#[derive(Debug, Serialize)]
pub struct ConversationWithDetails {
    pub conversation: Conversation,
    pub other_user: ConversationParticipant,
    pub last_message: Option<Message>,
    pub unread_count: i64,
}
