// tests/assessment_flow.rs
// Assessment scoring and persistence against the SQLite store


use std::time::Duration;

use kokoro::assessment::{
    Answer, AnswerMap, AssessmentKind, AssessmentResult, ERROR_SUMMARY, FALLBACK_RECOMMENDATION,
};
use kokoro::state::create_app_state;
use kokoro::store::{NewAssessment, NewMoodEntry, Store};

use test_helpers::{sqlite_store, ScriptedGenerator};

const TTL: Duration = Duration::from_secs(3600);

fn phq9_answers() -> AnswerMap {
    let mut answers = AnswerMap::new();
    answers.insert("d1".to_string(), Answer::Select("数日".to_string()));
    answers.insert("d2".to_string(), Answer::Scale(2));
    answers.insert("d3".to_string(), Answer::Select("ほぼ毎日".to_string()));
    answers
}

#[tokio::test]
async fn analysis_is_scored_and_persisted() {
    let store = sqlite_store().await;
    let llm = ScriptedGenerator::new(&[
        "分析しました。{\"score\": 12, \"summary\": \"中等度の症状が見られます\", \
         \"recommendations\": [\"専門家に相談\", \"睡眠リズムを整える\", \"軽い運動\"]}",
    ]);
    let state = create_app_state(store.clone(), llm.clone(), TTL);

    let answers = phq9_answers();
    let analysis = state
        .scorer
        .analyze(&answers, AssessmentKind::Depression)
        .await
        .unwrap();
    assert_eq!(analysis.score, 12);
    assert_eq!(analysis.recommendations.len(), 3);

    // the prompt carried the bank and the raw answers
    let prompt = llm.last_prompt();
    assert!(prompt.contains("うつ病スクリーニング (PHQ-9)"));
    assert!(prompt.contains("数日"));

    let saved = store
        .create_assessment(NewAssessment {
            user_id: 7,
            kind: AssessmentKind::Depression.as_str().to_string(),
            results: serde_json::to_value(&answers).unwrap(),
            score: analysis.score,
            summary: Some(analysis.summary.clone()),
            recommendations: analysis.recommendations.clone(),
        })
        .await
        .unwrap();
    assert_eq!(saved.kind, "depression");

    // round-trips through the TEXT columns intact
    let history = store.get_assessments_by_user(7).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].score, 12);
    assert_eq!(history[0].recommendations, analysis.recommendations);
    assert_eq!(history[0].results["d2"], 2);
    assert_eq!(history[0].results["d1"], "数日");
}

#[tokio::test]
async fn gateway_outage_still_records_a_result() {
    let store = sqlite_store().await;
    let state = create_app_state(store.clone(), ScriptedGenerator::failing(), TTL);

    let analysis = state
        .scorer
        .analyze(&phq9_answers(), AssessmentKind::Depression)
        .await
        .unwrap();
    assert_eq!(analysis, AssessmentResult::fallback());
    assert_eq!(analysis.summary, ERROR_SUMMARY);
    assert_eq!(analysis.recommendations, vec![FALLBACK_RECOMMENDATION]);
}

#[tokio::test]
async fn history_is_newest_first_and_per_user() {
    let store = sqlite_store().await;

    for (user, score) in [(1, 5), (1, 9), (2, 3)] {
        store
            .create_assessment(NewAssessment {
                user_id: user,
                kind: "general".to_string(),
                results: serde_json::json!({}),
                score,
                summary: None,
                recommendations: vec![],
            })
            .await
            .unwrap();
    }

    let history = store.get_assessments_by_user(1).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].score, 9);
    assert_eq!(history[1].score, 5);
}

#[tokio::test]
async fn mood_entries_round_trip_with_limit() {
    let store = sqlite_store().await;

    for rating in [3, 6, 8] {
        store
            .create_mood_entry(NewMoodEntry {
                user_id: 1,
                rating,
                notes: (rating == 6).then(|| "少し良くなった".to_string()),
            })
            .await
            .unwrap();
    }

    let recent = store.get_mood_entries_by_user(1, Some(2)).await.unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].rating, 8);
    assert_eq!(recent[1].rating, 6);
    assert_eq!(recent[1].notes.as_deref(), Some("少し良くなった"));

    let all = store.get_mood_entries_by_user(1, None).await.unwrap();
    assert_eq!(all.len(), 3);
}
