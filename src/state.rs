// src/state.rs
// Shared application state wiring the services to one store and one gateway

use std::sync::Arc;
use std::time::Duration;

use crate::assessment::AssessmentScorer;
use crate::chat::{ChatService, SessionCache};
use crate::llm::TextGenerator;
use crate::mood::MoodService;
use crate::store::Store;

pub struct AppState {
    pub store: Arc<dyn Store>,
    pub cache: Arc<SessionCache>,
    pub chat: ChatService,
    pub scorer: AssessmentScorer,
    pub mood: MoodService,
}

/// Build the full service graph over one store and one text gateway.
pub fn create_app_state(
    store: Arc<dyn Store>,
    llm: Arc<dyn TextGenerator>,
    session_ttl: Duration,
) -> Arc<AppState> {
    let cache = Arc::new(SessionCache::new(store.clone(), session_ttl));
    let chat = ChatService::new(store.clone(), llm.clone(), cache.clone());
    let scorer = AssessmentScorer::new(llm.clone());
    let mood = MoodService::new(store.clone(), llm);

    Arc::new(AppState {
        store,
        cache,
        chat,
        scorer,
        mood,
    })
}
