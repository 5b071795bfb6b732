//! In-memory store.
//!
//! Backs tests and database-free development. Ids are assigned from
//! per-table monotonic counters starting at 1, matching the SQLite store's
//! rowid behavior closely enough for the core's ordering guarantees.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use super::{
    Assessment, ChatMessage, ChatSession, MoodEntry, NewAssessment, NewChatMessage, NewMoodEntry,
    Store,
};
use crate::error::Result;

#[derive(Default)]
struct Inner {
    chat_sessions: BTreeMap<i64, ChatSession>,
    chat_messages: BTreeMap<i64, ChatMessage>,
    assessments: BTreeMap<i64, Assessment>,
    mood_entries: BTreeMap<i64, MoodEntry>,
    next_chat_session_id: i64,
    next_chat_message_id: i64,
    next_assessment_id: i64,
    next_mood_entry_id: i64,
}

#[derive(Default)]
pub struct MemStore {
    inner: Mutex<Inner>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemStore {
    async fn get_chat_session(&self, id: i64) -> Result<Option<ChatSession>> {
        let inner = self.inner.lock().await;
        Ok(inner.chat_sessions.get(&id).cloned())
    }

    async fn get_chat_messages_by_session(&self, session_id: i64) -> Result<Vec<ChatMessage>> {
        let inner = self.inner.lock().await;
        // BTreeMap iterates in id order, which is creation order
        Ok(inner
            .chat_messages
            .values()
            .filter(|m| m.session_id == session_id)
            .cloned()
            .collect())
    }

    async fn create_chat_session(&self, user_id: i64, title: &str) -> Result<ChatSession> {
        let mut inner = self.inner.lock().await;
        inner.next_chat_session_id += 1;
        let session = ChatSession {
            id: inner.next_chat_session_id,
            user_id,
            title: title.to_string(),
            created_at: Utc::now().timestamp(),
        };
        inner.chat_sessions.insert(session.id, session.clone());
        Ok(session)
    }

    async fn get_chat_sessions_by_user(&self, user_id: i64) -> Result<Vec<ChatSession>> {
        let inner = self.inner.lock().await;
        let mut sessions: Vec<ChatSession> = inner
            .chat_sessions
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        sessions.reverse();
        Ok(sessions)
    }

    async fn create_chat_message(&self, message: NewChatMessage) -> Result<ChatMessage> {
        let mut inner = self.inner.lock().await;
        inner.next_chat_message_id += 1;
        let message = ChatMessage {
            id: inner.next_chat_message_id,
            session_id: message.session_id,
            content: message.content,
            is_user: message.is_user,
            created_at: Utc::now().timestamp(),
        };
        inner.chat_messages.insert(message.id, message.clone());
        Ok(message)
    }

    async fn create_assessment(&self, assessment: NewAssessment) -> Result<Assessment> {
        let mut inner = self.inner.lock().await;
        inner.next_assessment_id += 1;
        let assessment = Assessment {
            id: inner.next_assessment_id,
            user_id: assessment.user_id,
            kind: assessment.kind,
            results: assessment.results,
            score: assessment.score,
            summary: assessment.summary,
            recommendations: assessment.recommendations,
            created_at: Utc::now().timestamp(),
        };
        inner.assessments.insert(assessment.id, assessment.clone());
        Ok(assessment)
    }

    async fn get_assessments_by_user(&self, user_id: i64) -> Result<Vec<Assessment>> {
        let inner = self.inner.lock().await;
        let mut assessments: Vec<Assessment> = inner
            .assessments
            .values()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        assessments.reverse();
        Ok(assessments)
    }

    async fn create_mood_entry(&self, entry: NewMoodEntry) -> Result<MoodEntry> {
        let mut inner = self.inner.lock().await;
        inner.next_mood_entry_id += 1;
        let entry = MoodEntry {
            id: inner.next_mood_entry_id,
            user_id: entry.user_id,
            rating: entry.rating,
            notes: entry.notes,
            created_at: Utc::now().timestamp(),
        };
        inner.mood_entries.insert(entry.id, entry.clone());
        Ok(entry)
    }

    async fn get_mood_entries_by_user(
        &self,
        user_id: i64,
        limit: Option<usize>,
    ) -> Result<Vec<MoodEntry>> {
        let inner = self.inner.lock().await;
        let mut entries: Vec<MoodEntry> = inner
            .mood_entries
            .values()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        entries.reverse();
        if let Some(limit) = limit {
            entries.truncate(limit);
        }
        Ok(entries)
    }
}
