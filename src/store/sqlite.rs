//! SQLite-backed store.
//!
//! Schema bootstrap runs at startup and is idempotent; timestamps are stored
//! as epoch seconds. Message ordering uses `(created_at, id)` so turns created
//! within the same second still replay in insertion order.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqlitePool;
use sqlx::{Executor, Row};

use super::{
    Assessment, ChatMessage, ChatSession, MoodEntry, NewAssessment, NewChatMessage, NewMoodEntry,
    Store,
};
use crate::error::Result;

const CREATE_CHAT_SESSIONS: &str = r#"
CREATE TABLE IF NOT EXISTS chat_sessions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    title TEXT NOT NULL,
    created_at INTEGER NOT NULL
);
"#;

const CREATE_CHAT_MESSAGES: &str = r#"
CREATE TABLE IF NOT EXISTS chat_messages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id INTEGER NOT NULL,
    content TEXT NOT NULL,
    is_user BOOLEAN NOT NULL,
    created_at INTEGER NOT NULL
);
"#;

/// `results` holds the raw answer map and `recommendations` the analysis list,
/// both as JSON text.
const CREATE_ASSESSMENTS: &str = r#"
CREATE TABLE IF NOT EXISTS assessments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    type TEXT NOT NULL,
    results TEXT NOT NULL,
    score INTEGER NOT NULL,
    summary TEXT,
    recommendations TEXT NOT NULL,
    created_at INTEGER NOT NULL
);
"#;

const CREATE_MOOD_ENTRIES: &str = r#"
CREATE TABLE IF NOT EXISTS mood_entries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    rating INTEGER NOT NULL,
    notes TEXT,
    created_at INTEGER NOT NULL
);
"#;

const CREATE_INDICES: &str = r#"
CREATE INDEX IF NOT EXISTS idx_chat_sessions_user_id ON chat_sessions(user_id);
CREATE INDEX IF NOT EXISTS idx_chat_messages_session_id ON chat_messages(session_id);
CREATE INDEX IF NOT EXISTS idx_assessments_user_id ON assessments(user_id);
CREATE INDEX IF NOT EXISTS idx_mood_entries_user_id ON mood_entries(user_id);
"#;

/// Ensure all tables exist. Run once at startup.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    pool.execute(CREATE_CHAT_SESSIONS).await?;
    pool.execute(CREATE_CHAT_MESSAGES).await?;
    pool.execute(CREATE_ASSESSMENTS).await?;
    pool.execute(CREATE_MOOD_ENTRIES).await?;
    pool.execute(CREATE_INDICES).await?;
    Ok(())
}

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn get_chat_session(&self, id: i64) -> Result<Option<ChatSession>> {
        let session = sqlx::query_as::<_, ChatSession>(
            "SELECT id, user_id, title, created_at FROM chat_sessions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(session)
    }

    async fn get_chat_messages_by_session(&self, session_id: i64) -> Result<Vec<ChatMessage>> {
        let messages = sqlx::query_as::<_, ChatMessage>(
            r#"
            SELECT id, session_id, content, is_user, created_at
            FROM chat_messages
            WHERE session_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(messages)
    }

    async fn create_chat_session(&self, user_id: i64, title: &str) -> Result<ChatSession> {
        let now = Utc::now().timestamp();
        let result = sqlx::query(
            "INSERT INTO chat_sessions (user_id, title, created_at) VALUES ($1, $2, $3)",
        )
        .bind(user_id)
        .bind(title)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(ChatSession {
            id: result.last_insert_rowid(),
            user_id,
            title: title.to_string(),
            created_at: now,
        })
    }

    async fn get_chat_sessions_by_user(&self, user_id: i64) -> Result<Vec<ChatSession>> {
        let sessions = sqlx::query_as::<_, ChatSession>(
            r#"
            SELECT id, user_id, title, created_at
            FROM chat_sessions
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(sessions)
    }

    async fn create_chat_message(&self, message: NewChatMessage) -> Result<ChatMessage> {
        let now = Utc::now().timestamp();
        let result = sqlx::query(
            r#"
            INSERT INTO chat_messages (session_id, content, is_user, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(message.session_id)
        .bind(&message.content)
        .bind(message.is_user)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(ChatMessage {
            id: result.last_insert_rowid(),
            session_id: message.session_id,
            content: message.content,
            is_user: message.is_user,
            created_at: now,
        })
    }

    async fn create_assessment(&self, assessment: NewAssessment) -> Result<Assessment> {
        let now = Utc::now().timestamp();
        let results_json = assessment.results.to_string();
        let recommendations_json =
            serde_json::to_string(&assessment.recommendations).unwrap_or_else(|_| "[]".to_string());

        let result = sqlx::query(
            r#"
            INSERT INTO assessments (user_id, type, results, score, summary, recommendations, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(assessment.user_id)
        .bind(&assessment.kind)
        .bind(&results_json)
        .bind(assessment.score)
        .bind(&assessment.summary)
        .bind(&recommendations_json)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Assessment {
            id: result.last_insert_rowid(),
            user_id: assessment.user_id,
            kind: assessment.kind,
            results: assessment.results,
            score: assessment.score,
            summary: assessment.summary,
            recommendations: assessment.recommendations,
            created_at: now,
        })
    }

    async fn get_assessments_by_user(&self, user_id: i64) -> Result<Vec<Assessment>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, type, results, score, summary, recommendations, created_at
            FROM assessments
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let assessments = rows
            .into_iter()
            .map(|row| {
                let results_json: String = row.get("results");
                let recommendations_json: String = row.get("recommendations");
                Assessment {
                    id: row.get("id"),
                    user_id: row.get("user_id"),
                    kind: row.get("type"),
                    results: serde_json::from_str(&results_json)
                        .unwrap_or(serde_json::Value::Null),
                    score: row.get("score"),
                    summary: row.get("summary"),
                    recommendations: serde_json::from_str(&recommendations_json)
                        .unwrap_or_default(),
                    created_at: row.get("created_at"),
                }
            })
            .collect();
        Ok(assessments)
    }

    async fn create_mood_entry(&self, entry: NewMoodEntry) -> Result<MoodEntry> {
        let now = Utc::now().timestamp();
        let result = sqlx::query(
            "INSERT INTO mood_entries (user_id, rating, notes, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(entry.user_id)
        .bind(entry.rating)
        .bind(&entry.notes)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(MoodEntry {
            id: result.last_insert_rowid(),
            user_id: entry.user_id,
            rating: entry.rating,
            notes: entry.notes,
            created_at: now,
        })
    }

    async fn get_mood_entries_by_user(
        &self,
        user_id: i64,
        limit: Option<usize>,
    ) -> Result<Vec<MoodEntry>> {
        // LIMIT -1 means unlimited in SQLite
        let limit = limit.map(|n| n as i64).unwrap_or(-1);
        let entries = sqlx::query_as::<_, MoodEntry>(
            r#"
            SELECT id, user_id, rating, notes, created_at
            FROM mood_entries
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }
}
