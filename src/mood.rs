//! Mood journal.
//!
//! Ratings are a 1-10 scale with optional free-text notes. Each recorded
//! entry can be paired with a short model-generated insight; the insight is
//! best-effort and never blocks recording.

use std::sync::Arc;

use tracing::warn;

use crate::error::{Error, Result};
use crate::llm::TextGenerator;
use crate::store::{MoodEntry, NewMoodEntry, Store};

pub const FALLBACK_INSIGHT: &str = "気分の分析中にエラーが発生しました。";

pub struct MoodService {
    store: Arc<dyn Store>,
    llm: Arc<dyn TextGenerator>,
}

impl MoodService {
    pub fn new(store: Arc<dyn Store>, llm: Arc<dyn TextGenerator>) -> Self {
        Self { store, llm }
    }

    pub async fn record(
        &self,
        user_id: i64,
        rating: i64,
        notes: Option<String>,
    ) -> Result<MoodEntry> {
        if !(1..=10).contains(&rating) {
            return Err(Error::InvalidInput(format!(
                "mood rating must be between 1 and 10, got {rating}"
            )));
        }
        self.store
            .create_mood_entry(NewMoodEntry {
                user_id,
                rating,
                notes: notes.filter(|n| !n.trim().is_empty()),
            })
            .await
    }

    pub async fn recent(&self, user_id: i64, limit: Option<usize>) -> Result<Vec<MoodEntry>> {
        self.store.get_mood_entries_by_user(user_id, limit).await
    }

    /// Short insight for a rating and its notes. Infallible by design:
    /// a gateway failure produces the fallback string.
    pub async fn insight(&self, rating: i64, notes: Option<&str>) -> String {
        let notes_part = match notes.filter(|n| !n.trim().is_empty()) {
            Some(n) => format!("ユーザーのメモ: {n}"),
            None => "メモはありません。".to_string(),
        };
        let prompt = format!(
            "あなたはメンタルヘルスの専門家です。ユーザーの気分評価とメモに基づいて、簡潔な（50語以内）洞察を提供してください。\n\nユーザーの気分評価: {rating}/10。{notes_part}"
        );

        match self.llm.generate(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!("mood insight generation failed: {}", e);
                FALLBACK_INSIGHT.to_string()
            }
        }
    }
}
