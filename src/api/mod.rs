// src/api/mod.rs
// HTTP boundary: routing, request/response types, error mapping

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::assessment::{AnswerMap, AssessmentKind};
use crate::error::Error;
use crate::state::AppState;

/// Substituted for the model's reply when generation fails mid-chat; the
/// user's message is already persisted by then, so the request still
/// succeeds.
pub const CHAT_APOLOGY: &str =
    "申し訳ありません。エラーが発生しました。しばらくしてからもう一度お試しください。";

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Error::SessionNotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            Error::Forbidden(_) => (StatusCode::FORBIDDEN, self.to_string()),
            Error::InvalidInput(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            Error::Storage(e) => {
                error!("storage error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "内部エラーが発生しました".to_string(),
                )
            }
            Error::Generation(e) => {
                error!("generation error: {}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    "AI応答の生成に失敗しました".to_string(),
                )
            }
        };
        (status, Json(json!({ "message": message }))).into_response()
    }
}

/// Main API router, nested under /api by the caller.
pub fn router(app_state: Arc<AppState>) -> Router {
    Router::new()
        // Chat
        .route(
            "/chat/sessions",
            post(create_chat_session).get(list_chat_sessions),
        )
        .route(
            "/chat/sessions/{id}/messages",
            get(get_chat_history).post(send_chat_message),
        )
        // Assessments
        .route("/assessment/questions", get(get_assessment_questions))
        .route("/assessment/submit", post(submit_assessment))
        .route("/assessment/history", get(get_assessment_history))
        // Mood journal
        .route("/mood", post(record_mood).get(get_mood_entries))
        .with_state(app_state)
}

#[derive(Deserialize)]
struct UserQuery {
    user_id: i64,
}

#[derive(Deserialize)]
struct CreateSessionRequest {
    user_id: i64,
    title: Option<String>,
}

#[derive(Deserialize)]
struct SendMessageRequest {
    user_id: i64,
    content: String,
}

#[derive(Deserialize)]
struct SubmitAssessmentRequest {
    user_id: i64,
    #[serde(rename = "type")]
    kind: Option<String>,
    answers: AnswerMap,
}

#[derive(Deserialize)]
struct AssessmentQuestionsQuery {
    #[serde(rename = "type")]
    kind: Option<String>,
}

#[derive(Deserialize)]
struct MoodRequest {
    user_id: i64,
    rating: i64,
    notes: Option<String>,
}

#[derive(Deserialize)]
struct MoodQuery {
    user_id: i64,
    limit: Option<usize>,
}

async fn create_chat_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateSessionRequest>,
) -> Result<impl IntoResponse, Error> {
    let session = state.chat.create_session(req.user_id, req.title).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

async fn list_chat_sessions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserQuery>,
) -> Result<impl IntoResponse, Error> {
    let sessions = state.chat.list_sessions(query.user_id).await?;
    Ok(Json(sessions))
}

async fn get_chat_history(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<i64>,
    Query(query): Query<UserQuery>,
) -> Result<impl IntoResponse, Error> {
    let context = state.chat.history(session_id, query.user_id).await?;
    Ok(Json(json!({ "messages": context.turns })))
}

async fn send_chat_message(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<i64>,
    Json(req): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, Error> {
    match state
        .chat
        .send_message(session_id, req.user_id, &req.content)
        .await
    {
        Ok(reply) => Ok(Json(json!({ "reply": reply }))),
        Err(Error::Generation(e)) => {
            error!("chat generation failed for session {}: {}", session_id, e);
            Ok(Json(json!({ "reply": CHAT_APOLOGY })))
        }
        Err(other) => Err(other),
    }
}

async fn get_assessment_questions(
    Query(query): Query<AssessmentQuestionsQuery>,
) -> impl IntoResponse {
    let kind = AssessmentKind::parse(query.kind.as_deref());
    Json(json!({
        "type": kind.as_str(),
        "title": kind.title(),
        "questions": kind.questions(),
    }))
}

async fn submit_assessment(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SubmitAssessmentRequest>,
) -> Result<impl IntoResponse, Error> {
    let kind = AssessmentKind::parse(req.kind.as_deref());
    let analysis = state.scorer.analyze(&req.answers, kind).await?;

    let assessment = state
        .store
        .create_assessment(crate::store::NewAssessment {
            user_id: req.user_id,
            kind: kind.as_str().to_string(),
            results: serde_json::to_value(&req.answers).unwrap_or(serde_json::Value::Null),
            score: analysis.score,
            summary: Some(analysis.summary.clone()),
            recommendations: analysis.recommendations.clone(),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "assessment": assessment, "analysis": analysis })),
    ))
}

async fn get_assessment_history(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserQuery>,
) -> Result<impl IntoResponse, Error> {
    let assessments = state.store.get_assessments_by_user(query.user_id).await?;
    Ok(Json(assessments))
}

async fn record_mood(
    State(state): State<Arc<AppState>>,
    Json(req): Json<MoodRequest>,
) -> Result<impl IntoResponse, Error> {
    let entry = state
        .mood
        .record(req.user_id, req.rating, req.notes)
        .await?;
    let insight = state.mood.insight(entry.rating, entry.notes.as_deref()).await;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "entry": entry, "insight": insight })),
    ))
}

async fn get_mood_entries(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MoodQuery>,
) -> Result<impl IntoResponse, Error> {
    let entries = state.mood.recent(query.user_id, query.limit).await?;
    Ok(Json(entries))
}
