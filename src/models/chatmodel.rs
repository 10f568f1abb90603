// models/chatmodel.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A chat thread scoped to one job and its two participants. There is at
/// most one row per (job_id, poster_id, professional_id) triple; rows are
/// created lazily on the first chat attempt, never on bid acceptance.
#[derive(Debug, Serialize, Clone, Deserialize, sqlx::FromRow)]
pub struct Conversation {
    pub id: Uuid,
    pub job_id: Uuid,
    pub poster_id: Uuid,
    pub professional_id: Uuid,
    pub last_message_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Conversation {
    pub fn is_participant(&self, user_id: Uuid) -> bool {
        self.poster_id == user_id || self.professional_id == user_id
    }

    /// The other side of the thread, or None when `user_id` is not a
    /// participant at all.
    pub fn other_participant(&self, user_id: Uuid) -> Option<Uuid> {
        if self.poster_id == user_id {
            Some(self.professional_id)
        } else if self.professional_id == user_id {
            Some(self.poster_id)
        } else {
            None
        }
    }
}

/// `read_at` doubles as the unread marker: NULL means unread.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub content: String,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conversation(poster: Uuid, professional: Uuid) -> Conversation {
        Conversation {
            id: Uuid::new_v4(),
            job_id: Uuid::new_v4(),
            poster_id: poster,
            professional_id: professional,
            last_message_at: None,
            created_at: None,
        }
    }

    #[test]
    fn other_participant_flips_between_the_two_sides() {
        let poster = Uuid::new_v4();
        let professional = Uuid::new_v4();
        let conv = conversation(poster, professional);

        assert_eq!(conv.other_participant(poster), Some(professional));
        assert_eq!(conv.other_participant(professional), Some(poster));
    }

    #[test]
    fn outsider_is_not_a_participant() {
        let conv = conversation(Uuid::new_v4(), Uuid::new_v4());
        let outsider = Uuid::new_v4();

        assert!(!conv.is_participant(outsider));
        assert_eq!(conv.other_participant(outsider), None);
    }
}
