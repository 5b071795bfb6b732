//! Chat coaching orchestration.
//!
//! Turns one inbound user message into one persisted, model-generated reply:
//! cache lookup, user-message persistence, prompt assembly from the ordered
//! turns, a single gateway call, reply persistence. Within one call the steps
//! are strictly ordered; across concurrent calls on the same session nothing
//! is coordinated (see `cache`).

pub mod cache;

use std::sync::Arc;

use tracing::debug;

use crate::error::Result;
use crate::llm::TextGenerator;
use crate::store::{ChatSession, NewChatMessage, Store};

pub use cache::{Role, SessionCache, SessionContext, Turn};

pub const DEFAULT_SESSION_TITLE: &str = "新しいセッション";

/// Fixed system instruction for the coaching conversation.
const SYSTEM_PROMPT: &str = "あなたはメンタルヘルスのAIコーチです。ユーザーの心理的な健康をサポートし、ストレス、不安、気分の落ち込みなどに対処するためのガイダンスを提供します。

以下の原則に従ってください：
1. 共感的に対応し、ユーザーの感情を認識して受け止める
2. オープンな質問を通じてユーザーが自己理解を深められるよう促す
3. 具体的で実行可能なアドバイスを提供する
4. 科学的根拠に基づいた情報を提供する
5. 深刻な状態には必ず専門家への相談を勧める

重要：あなたは医療アドバイスを提供できません。診断や投薬に関する具体的なアドバイスを求められた場合は、必ず医療専門家に相談するよう促してください。";

pub struct ChatService {
    store: Arc<dyn Store>,
    llm: Arc<dyn TextGenerator>,
    cache: Arc<SessionCache>,
}

impl ChatService {
    pub fn new(
        store: Arc<dyn Store>,
        llm: Arc<dyn TextGenerator>,
        cache: Arc<SessionCache>,
    ) -> Self {
        Self { store, llm, cache }
    }

    pub async fn create_session(&self, user_id: i64, title: Option<String>) -> Result<ChatSession> {
        let title = title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SESSION_TITLE.to_string());
        self.store.create_chat_session(user_id, &title).await
    }

    pub async fn list_sessions(&self, user_id: i64) -> Result<Vec<ChatSession>> {
        self.store.get_chat_sessions_by_user(user_id).await
    }

    /// The session's conversation as role-tagged turns, enforcing ownership.
    pub async fn history(&self, session_id: i64, user_id: i64) -> Result<SessionContext> {
        self.cache.get_or_create(session_id, user_id).await
    }

    /// Send one user message and return the model's reply.
    ///
    /// `SessionNotFound` and `Forbidden` from the cache propagate unchanged.
    /// A gateway failure propagates as `Generation` after the user message has
    /// already been persisted; the HTTP boundary substitutes the user-facing
    /// apology, not this method.
    pub async fn send_message(&self, session_id: i64, user_id: i64, text: &str) -> Result<String> {
        let context = self.cache.get_or_create(session_id, user_id).await?;

        self.store
            .create_chat_message(NewChatMessage {
                session_id,
                content: text.to_string(),
                is_user: true,
            })
            .await?;
        self.cache.append(session_id, Role::User, text).await;

        let mut turns = context.turns;
        turns.push(Turn {
            role: Role::User,
            content: text.to_string(),
        });
        let prompt = build_prompt(&turns);
        debug!(
            "chat prompt for session {}: {} turn(s), {} chars",
            session_id,
            turns.len(),
            prompt.len()
        );

        let reply = self.llm.generate(&prompt).await?;

        self.store
            .create_chat_message(NewChatMessage {
                session_id,
                content: reply.clone(),
                is_user: false,
            })
            .await?;
        self.cache.append(session_id, Role::Assistant, &reply).await;

        Ok(reply)
    }
}

/// Render the system instruction followed by the ordered turns as
/// `role: content` lines.
pub fn build_prompt(turns: &[Turn]) -> String {
    let mut prompt = String::from(SYSTEM_PROMPT);
    prompt.push_str("\n\n");
    for turn in turns {
        prompt.push_str(turn.role.as_str());
        prompt.push_str(": ");
        prompt.push_str(&turn.content);
        prompt.push('\n');
    }
    prompt
}
