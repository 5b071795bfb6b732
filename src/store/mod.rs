//! Persistent store boundary.
//!
//! The store is the source of truth for sessions, messages, assessments and
//! mood entries; the session cache in `chat::cache` is only a latency
//! optimization layered on top of it. Records are immutable once created and
//! keyed by integer ids assigned by the store.

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One coaching conversation, owned by a user.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ChatSession {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub created_at: i64,
}

/// One turn in a session. `is_user` distinguishes user-authored from
/// assistant-authored turns; ordering follows creation time.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ChatMessage {
    pub id: i64,
    pub session_id: i64,
    pub content: String,
    pub is_user: bool,
    pub created_at: i64,
}

/// Persisted questionnaire submission: the raw answers plus the structured
/// analysis produced by the scorer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    pub id: i64,
    pub user_id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub results: serde_json::Value,
    pub score: i64,
    pub summary: Option<String>,
    pub recommendations: Vec<String>,
    pub created_at: i64,
}

/// One mood journal entry. Append-only, listed most recent first.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MoodEntry {
    pub id: i64,
    pub user_id: i64,
    pub rating: i64,
    pub notes: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Clone)]
pub struct NewChatMessage {
    pub session_id: i64,
    pub content: String,
    pub is_user: bool,
}

#[derive(Debug, Clone)]
pub struct NewAssessment {
    pub user_id: i64,
    pub kind: String,
    pub results: serde_json::Value,
    pub score: i64,
    pub summary: Option<String>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct NewMoodEntry {
    pub user_id: i64,
    pub rating: i64,
    pub notes: Option<String>,
}

/// Create/read operations the coaching core consumes. Reads return
/// `Ok(None)`/empty lists for missing data; writes return the created record
/// with its assigned id and timestamp. Failures surface as `Error::Storage`
/// and are never retried here.
#[async_trait]
pub trait Store: Send + Sync {
    async fn get_chat_session(&self, id: i64) -> Result<Option<ChatSession>>;

    /// All messages of a session in creation order.
    async fn get_chat_messages_by_session(&self, session_id: i64) -> Result<Vec<ChatMessage>>;

    async fn create_chat_session(&self, user_id: i64, title: &str) -> Result<ChatSession>;

    async fn get_chat_sessions_by_user(&self, user_id: i64) -> Result<Vec<ChatSession>>;

    async fn create_chat_message(&self, message: NewChatMessage) -> Result<ChatMessage>;

    async fn create_assessment(&self, assessment: NewAssessment) -> Result<Assessment>;

    /// Assessments for a user, most recent first.
    async fn get_assessments_by_user(&self, user_id: i64) -> Result<Vec<Assessment>>;

    async fn create_mood_entry(&self, entry: NewMoodEntry) -> Result<MoodEntry>;

    /// Mood entries for a user, most recent first, optionally truncated.
    async fn get_mood_entries_by_user(
        &self,
        user_id: i64,
        limit: Option<usize>,
    ) -> Result<Vec<MoodEntry>>;
}
