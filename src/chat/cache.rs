//! In-memory session context cache.
//!
//! Avoids re-fetching and re-formatting a session's full message history from
//! the store on every chat turn. Each entry mirrors the persisted messages at
//! hydration time plus anything appended since, and carries an idle deadline
//! that is re-armed on every access. The store stays the source of truth; the
//! cache is never authoritative, and each process holds its own copy.
//!
//! There is no per-session lock across store or gateway awaits: two concurrent
//! `send_message` calls on one session may interleave their appends. That is a
//! documented limitation of the design, not something this module coordinates.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::{Error, Result};
use crate::store::Store;

/// Idle expiry for cached session contexts (1 hour).
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One role-tagged turn of a cached conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

/// Snapshot of a session's conversation as the cache knows it. The owner id
/// is kept for authorization re-checks on cache hits.
#[derive(Debug, Clone, Serialize)]
pub struct SessionContext {
    pub session_id: i64,
    pub user_id: i64,
    pub turns: Vec<Turn>,
}

/// Time source for entry deadlines. Tests inject a manual clock so expiry is
/// deterministic instead of waiting on real timers.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

struct Entry {
    context: SessionContext,
    deadline: Instant,
}

pub struct SessionCache {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    entries: RwLock<HashMap<i64, Entry>>,
}

impl SessionCache {
    pub fn new(store: Arc<dyn Store>, ttl: Duration) -> Self {
        Self::with_clock(store, ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<dyn Store>, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Return the cached context for a session, hydrating it from the store on
    /// a miss. A hit re-arms the idle deadline and never touches the store.
    ///
    /// Fails with `SessionNotFound` if the session record does not exist and
    /// with `Forbidden` if `user_id` is not the session owner; ownership is
    /// also re-checked against the cached owner id on hits. Store failures
    /// during hydration propagate unretried.
    pub async fn get_or_create(&self, session_id: i64, user_id: i64) -> Result<SessionContext> {
        let now = self.clock.now();
        {
            let mut entries = self.entries.write().await;
            match entries.get_mut(&session_id) {
                Some(entry) if entry.deadline > now => {
                    if entry.context.user_id != user_id {
                        return Err(Error::Forbidden(session_id));
                    }
                    entry.deadline = now + self.ttl;
                    return Ok(entry.context.clone());
                }
                Some(_) => {
                    entries.remove(&session_id);
                }
                None => {}
            }
        }

        // Miss: hydrate from the store. The lock is not held across these
        // awaits, so another task hydrating the same session may race us; the
        // later insert wins and both see a store-consistent snapshot.
        let session = self
            .store
            .get_chat_session(session_id)
            .await?
            .ok_or(Error::SessionNotFound(session_id))?;
        if session.user_id != user_id {
            return Err(Error::Forbidden(session_id));
        }

        let messages = self.store.get_chat_messages_by_session(session_id).await?;
        let context = SessionContext {
            session_id,
            user_id: session.user_id,
            turns: messages
                .into_iter()
                .map(|message| Turn {
                    role: if message.is_user {
                        Role::User
                    } else {
                        Role::Assistant
                    },
                    content: message.content,
                })
                .collect(),
        };

        let mut entries = self.entries.write().await;
        entries.insert(
            session_id,
            Entry {
                context: context.clone(),
                deadline: self.clock.now() + self.ttl,
            },
        );
        Ok(context)
    }

    /// Append a turn to an existing cached entry. Persistence is the
    /// orchestrator's job; a missing entry (already evicted) is a no-op since
    /// the next hydration reloads the turn from the store anyway.
    pub async fn append(&self, session_id: i64, role: Role, content: &str) {
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get_mut(&session_id) {
            entry.context.turns.push(Turn {
                role,
                content: content.to_string(),
            });
        }
    }

    /// Evict a session's entry ahead of its idle deadline.
    pub async fn invalidate(&self, session_id: i64) {
        self.entries.write().await.remove(&session_id);
    }

    /// Whether a live (non-expired) entry exists for the session.
    pub async fn contains(&self, session_id: i64) -> bool {
        let now = self.clock.now();
        self.entries
            .read()
            .await
            .get(&session_id)
            .map(|entry| entry.deadline > now)
            .unwrap_or(false)
    }

    /// Current cached turns for a session, if a live entry exists.
    pub async fn turns(&self, session_id: i64) -> Option<Vec<Turn>> {
        let now = self.clock.now();
        self.entries
            .read()
            .await
            .get(&session_id)
            .filter(|entry| entry.deadline > now)
            .map(|entry| entry.context.turns.clone())
    }

    /// Drop all entries whose idle deadline has passed; returns the count.
    pub async fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.deadline > now);
        before - entries.len()
    }
}

/// Periodically purge expired entries. Expiry is already enforced lazily on
/// access; the sweeper only bounds memory held by fully idle sessions.
pub fn spawn_sweeper(cache: Arc<SessionCache>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            let purged = cache.purge_expired().await;
            if purged > 0 {
                debug!("Purged {} expired session context(s)", purged);
            }
        }
    })
}
