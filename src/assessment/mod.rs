//! Assessment scoring.
//!
//! A submitted answer map is validated against the selected question bank,
//! handed to the model with a JSON-only instruction, and the reply is parsed
//! leniently: the first brace-delimited object wins and each missing or
//! mistyped field falls back individually. Past validation this path never
//! errors out; a gateway failure degrades to a sentinel result instead.

mod parse;
pub mod questions;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;

use crate::error::{Error, Result};
use crate::llm::TextGenerator;

pub use parse::extract_json_object;
pub use questions::{Question, QuestionKind};

/// Shown when the model's output carried no usable summary.
pub const FALLBACK_SUMMARY: &str = "分析を完了できませんでした。";
/// Shown when the gateway call itself failed.
pub const ERROR_SUMMARY: &str = "エラーが発生しました。後でもう一度お試しください。";
pub const FALLBACK_RECOMMENDATION: &str = "しばらく時間をおいて再度お試しください。";

/// One submitted answer. Select questions take the option string or its
/// zero-based index; scale questions take the integer position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Scale(i64),
    Select(String),
}

pub type AnswerMap = BTreeMap<String, Answer>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssessmentKind {
    General,
    Depression,
    Anxiety,
    Stress,
    Burnout,
}

impl AssessmentKind {
    /// Unrecognized or missing kinds fall back to the general assessment.
    pub fn parse(kind: Option<&str>) -> Self {
        match kind {
            Some("depression") => Self::Depression,
            Some("anxiety") => Self::Anxiety,
            Some("stress") => Self::Stress,
            Some("burnout") => Self::Burnout,
            _ => Self::General,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Depression => "depression",
            Self::Anxiety => "anxiety",
            Self::Stress => "stress",
            Self::Burnout => "burnout",
        }
    }

    pub fn questions(&self) -> &'static [Question] {
        match self {
            Self::General => questions::GENERAL,
            Self::Depression => questions::DEPRESSION,
            Self::Anxiety => questions::ANXIETY,
            Self::Stress => questions::STRESS,
            Self::Burnout => questions::BURNOUT,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::General => "一般的なメンタルヘルス評価",
            Self::Depression => "うつ病スクリーニング (PHQ-9)",
            Self::Anxiety => "不安障害スクリーニング (GAD-7)",
            Self::Stress => "ストレスチェック",
            Self::Burnout => "バーンアウト評価",
        }
    }

    fn scoring(&self) -> &'static str {
        match self {
            Self::General => "総合スコア（0-100点、高いほど良好な状態）",
            Self::Depression => "PHQ-9スコア（0-27点、高いほど症状が重い）",
            Self::Anxiety => "GAD-7スコア（0-21点、高いほど症状が重い）",
            Self::Stress => "ストレススコア（0-40点、高いほどストレスが高い）",
            Self::Burnout => "バーンアウトスコア（0-100点、高いほど燃え尽き状態が深刻）",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentResult {
    pub score: i64,
    pub summary: String,
    pub recommendations: Vec<String>,
}

impl AssessmentResult {
    /// Sentinel returned when the gateway call fails outright.
    pub fn fallback() -> Self {
        Self {
            score: 0,
            summary: ERROR_SUMMARY.to_string(),
            recommendations: vec![FALLBACK_RECOMMENDATION.to_string()],
        }
    }
}

pub struct AssessmentScorer {
    llm: Arc<dyn TextGenerator>,
}

impl AssessmentScorer {
    pub fn new(llm: Arc<dyn TextGenerator>) -> Self {
        Self { llm }
    }

    /// Score an answer map against the bank for `kind`.
    ///
    /// Only validation can fail; everything after it degrades to a usable
    /// result so the submission is always persisted.
    pub async fn analyze(&self, answers: &AnswerMap, kind: AssessmentKind) -> Result<AssessmentResult> {
        validate_answers(answers, kind)?;

        let prompt = build_prompt(answers, kind);
        match self.llm.generate(&prompt).await {
            Ok(raw) => Ok(parse_result(&raw)),
            Err(e) => {
                warn!("assessment analysis failed, returning fallback: {}", e);
                Ok(AssessmentResult::fallback())
            }
        }
    }
}

fn build_prompt(answers: &AnswerMap, kind: AssessmentKind) -> String {
    let title = kind.title();
    let scoring = kind.scoring();
    let payload = json!({
        "title": title,
        "assessmentType": kind.as_str(),
        "questions": kind.questions(),
        "answers": answers,
    });

    format!(
        "あなたはメンタルヘルスの専門家です。ユーザーの回答に基づいて、{title}を行い、{scoring}、総合的な分析、および改善のための3つの推奨事項を提供してください。\n\n以下はユーザーの{title}への回答です。この回答を分析し、{scoring}、全体的な状態の要約、および改善のための具体的な推奨事項を3つ提供してください。必ずJSON形式で回答してください。必要なフィールドは score (数値), summary (文字列), recommendations (文字列の配列) です。回答データ: {payload}"
    )
}

/// Lenient field-by-field extraction; whatever is missing gets its default.
fn parse_result(raw: &str) -> AssessmentResult {
    let value = match extract_json_object(raw) {
        Some(value) => value,
        None => {
            return AssessmentResult {
                score: 0,
                summary: FALLBACK_SUMMARY.to_string(),
                recommendations: vec![FALLBACK_RECOMMENDATION.to_string()],
            }
        }
    };

    let score = value["score"]
        .as_i64()
        .or_else(|| value["score"].as_f64().map(|f| f as i64))
        .unwrap_or(0);

    let summary = value["summary"]
        .as_str()
        .filter(|s| !s.is_empty())
        .unwrap_or(FALLBACK_SUMMARY)
        .to_string();

    let recommendations = value["recommendations"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .filter(|list| !list.is_empty())
        .unwrap_or_else(|| vec![FALLBACK_RECOMMENDATION.to_string()]);

    AssessmentResult {
        score,
        summary,
        recommendations,
    }
}

/// Every answer must reference a question in the bank and fit its kind.
/// Unanswered questions are allowed; the model notes the gaps.
fn validate_answers(answers: &AnswerMap, kind: AssessmentKind) -> Result<()> {
    if answers.is_empty() {
        return Err(Error::InvalidInput("no answers submitted".to_string()));
    }
    let bank = kind.questions();
    for (id, answer) in answers {
        let question = bank
            .iter()
            .find(|q| q.id == id)
            .ok_or_else(|| Error::InvalidInput(format!("unknown question id: {id}")))?;
        match (question.kind, answer) {
            (QuestionKind::Scale, Answer::Scale(_)) => {}
            (QuestionKind::Scale, Answer::Select(_)) => {
                return Err(Error::InvalidInput(format!(
                    "question {id} expects a numeric answer"
                )));
            }
            (QuestionKind::Select, Answer::Select(choice)) => {
                let options = question.options.unwrap_or_default();
                if !options.contains(&choice.as_str()) {
                    return Err(Error::InvalidInput(format!(
                        "question {id} has no option \"{choice}\""
                    )));
                }
            }
            // selects also accept the option's zero-based index
            (QuestionKind::Select, Answer::Scale(n)) => {
                let count = question.options.unwrap_or_default().len() as i64;
                if *n < 0 || *n >= count {
                    return Err(Error::InvalidInput(format!(
                        "question {id} option index {n} is out of range"
                    )));
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;

    struct FixedGenerator(String);

    #[async_trait]
    impl TextGenerator for FixedGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            Ok(self.0.clone())
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl TextGenerator for FailingGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            Err(Error::Generation("quota exceeded".to_string()))
        }
    }

    fn scorer(reply: &str) -> AssessmentScorer {
        AssessmentScorer::new(Arc::new(FixedGenerator(reply.to_string())))
    }

    fn depression_answers() -> AnswerMap {
        let mut answers = AnswerMap::new();
        answers.insert("d1".to_string(), Answer::Select("数日".to_string()));
        answers.insert("d2".to_string(), Answer::Scale(2));
        answers
    }

    #[tokio::test]
    async fn prose_wrapped_json_is_extracted() {
        let scorer = scorer(
            "ご回答ありがとうございます。分析結果：\n\
             {\"score\": 12, \"summary\": \"中等度の抑うつ症状\", \
             \"recommendations\": [\"専門家に相談する\", \"睡眠を整える\", \"運動する\"]}",
        );
        let result = scorer
            .analyze(&depression_answers(), AssessmentKind::Depression)
            .await
            .unwrap();
        assert_eq!(result.score, 12);
        assert_eq!(result.summary, "中等度の抑うつ症状");
        assert_eq!(result.recommendations.len(), 3);
    }

    #[tokio::test]
    async fn reply_without_json_yields_the_parse_fallback() {
        let scorer = scorer("申し訳ありませんが、JSON形式での回答はできません。");
        let result = scorer
            .analyze(&depression_answers(), AssessmentKind::Depression)
            .await
            .unwrap();
        assert_eq!(result.score, 0);
        assert_eq!(result.summary, FALLBACK_SUMMARY);
        assert_eq!(result.recommendations, vec![FALLBACK_RECOMMENDATION]);
    }

    #[tokio::test]
    async fn missing_fields_default_individually() {
        let scorer = scorer("{\"score\": 42}");
        let result = scorer
            .analyze(&depression_answers(), AssessmentKind::Depression)
            .await
            .unwrap();
        assert_eq!(result.score, 42);
        assert_eq!(result.summary, FALLBACK_SUMMARY);
        assert_eq!(result.recommendations, vec![FALLBACK_RECOMMENDATION]);
    }

    #[tokio::test]
    async fn fractional_scores_truncate() {
        let scorer = scorer("{\"score\": 12.7, \"summary\": \"ok\", \"recommendations\": [\"a\"]}");
        let result = scorer
            .analyze(&depression_answers(), AssessmentKind::Depression)
            .await
            .unwrap();
        assert_eq!(result.score, 12);
    }

    #[tokio::test]
    async fn gateway_failure_degrades_to_the_sentinel() {
        let scorer = AssessmentScorer::new(Arc::new(FailingGenerator));
        let result = scorer
            .analyze(&depression_answers(), AssessmentKind::Depression)
            .await
            .unwrap();
        assert_eq!(result, AssessmentResult::fallback());
        assert_eq!(result.summary, ERROR_SUMMARY);
    }

    #[tokio::test]
    async fn validation_rejects_bad_answers() {
        let scorer = scorer("{}");

        let empty = AnswerMap::new();
        assert!(matches!(
            scorer.analyze(&empty, AssessmentKind::General).await,
            Err(Error::InvalidInput(_))
        ));

        let mut unknown = AnswerMap::new();
        unknown.insert("zz".to_string(), Answer::Scale(1));
        assert!(matches!(
            scorer.analyze(&unknown, AssessmentKind::General).await,
            Err(Error::InvalidInput(_))
        ));

        // d1 is a select question with four options
        let mut bad_option = AnswerMap::new();
        bad_option.insert("d1".to_string(), Answer::Select("はい".to_string()));
        assert!(matches!(
            scorer.analyze(&bad_option, AssessmentKind::Depression).await,
            Err(Error::InvalidInput(_))
        ));

        let mut out_of_range = AnswerMap::new();
        out_of_range.insert("d1".to_string(), Answer::Scale(4));
        assert!(matches!(
            scorer
                .analyze(&out_of_range, AssessmentKind::Depression)
                .await,
            Err(Error::InvalidInput(_))
        ));

        // q2 is a scale question
        let mut text_for_scale = AnswerMap::new();
        text_for_scale.insert("q2".to_string(), Answer::Select("数日".to_string()));
        assert!(matches!(
            scorer.analyze(&text_for_scale, AssessmentKind::General).await,
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn unknown_kind_falls_back_to_general() {
        assert_eq!(AssessmentKind::parse(Some("depression")), AssessmentKind::Depression);
        assert_eq!(AssessmentKind::parse(Some("karoshi")), AssessmentKind::General);
        assert_eq!(AssessmentKind::parse(None), AssessmentKind::General);
    }

    #[test]
    fn prompt_embeds_title_questions_and_answers() {
        let prompt = build_prompt(&depression_answers(), AssessmentKind::Depression);
        assert!(prompt.contains("うつ病スクリーニング (PHQ-9)"));
        assert!(prompt.contains("PHQ-9スコア（0-27点、高いほど症状が重い）"));
        assert!(prompt.contains("\"d1\""));
        assert!(prompt.contains("数日"));
    }
}
