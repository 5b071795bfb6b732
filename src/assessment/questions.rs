//! Static assessment question banks.
//!
//! Five banks mirroring the clinical instruments the app is modeled on
//! (PHQ-9, GAD-7, PSS-10, an MBI-style burnout scale and a general check).
//! All question text is served to clients verbatim, so the banks live here as
//! `'static` data rather than in the database.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    /// Answered with one of a fixed list of options.
    Select,
    /// Answered with an integer position between two labeled extremes.
    Scale,
}

#[derive(Debug, Clone, Serialize)]
pub struct Question {
    pub id: &'static str,
    pub text: &'static str,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<&'static [&'static str]>,
    #[serde(rename = "minLabel", skip_serializing_if = "Option::is_none")]
    pub min_label: Option<&'static str>,
    #[serde(rename = "maxLabel", skip_serializing_if = "Option::is_none")]
    pub max_label: Option<&'static str>,
    pub category: &'static str,
}

const fn select(
    id: &'static str,
    text: &'static str,
    options: &'static [&'static str],
    category: &'static str,
) -> Question {
    Question {
        id,
        text,
        kind: QuestionKind::Select,
        options: Some(options),
        min_label: None,
        max_label: None,
        category,
    }
}

const fn scale(
    id: &'static str,
    text: &'static str,
    min_label: &'static str,
    max_label: &'static str,
    category: &'static str,
) -> Question {
    Question {
        id,
        text,
        kind: QuestionKind::Scale,
        options: None,
        min_label: Some(min_label),
        max_label: Some(max_label),
        category,
    }
}

const FREQUENCY_GENERAL: &[&str] = &["まったくない", "数日", "半分以上の日", "ほぼ毎日"];
const FREQUENCY_SCREEN: &[&str] = &["全くない", "数日", "半分以上", "ほぼ毎日"];
const FREQUENCY_STRESS: &[&str] = &[
    "全くない",
    "ほとんどない",
    "時々ある",
    "かなりある",
    "非常に頻繁",
];
const COPING: &[&str] = &[
    "積極的に解決策を探す",
    "誰かに相談する",
    "避けるようにしている",
    "対処法がわからない",
];

/// 一般的なメンタルヘルス評価
pub const GENERAL: &[Question] = &[
    select(
        "q1",
        "最近、気分が落ち込んだり、憂鬱な気持ちになることがありますか？",
        FREQUENCY_GENERAL,
        "general",
    ),
    scale(
        "q2",
        "物事に対する興味や楽しみが減少したと感じますか？",
        "まったくない",
        "ほぼ毎日",
        "general",
    ),
    select(
        "q3",
        "睡眠に問題がありますか？（寝つきが悪い、途中で目が覚める、または逆に眠りすぎる）",
        FREQUENCY_GENERAL,
        "general",
    ),
    scale(
        "q4",
        "疲れていると感じたり、エネルギーが減少していると感じますか？",
        "まったくない",
        "ほぼ毎日",
        "general",
    ),
    select(
        "q5",
        "食欲不振や過食がありますか？",
        FREQUENCY_GENERAL,
        "general",
    ),
    scale(
        "q6",
        "自分自身に対して悪く思ったり、自分が失敗者だと感じたり、自分や家族を落胆させたと感じることがありますか？",
        "まったくない",
        "ほぼ毎日",
        "general",
    ),
    select(
        "q7",
        "新聞を読んだりテレビを見たりなど、物事に集中することが難しいと感じますか？",
        FREQUENCY_GENERAL,
        "general",
    ),
    scale(
        "q8",
        "他人が気づくほど動きや話し方が遅くなったり、反対に落ち着きがなく、普段よりもそわそわと動き回ることがありますか？",
        "まったくない",
        "ほぼ毎日",
        "general",
    ),
    select(
        "q9",
        "ストレスを感じる状況に直面したとき、どのように対処していますか？",
        COPING,
        "general",
    ),
    scale(
        "q10",
        "自分自身をケアするための時間を定期的に取っていますか？",
        "まったくとっていない",
        "毎日取っている",
        "general",
    ),
];

/// PHQ-9 うつ病スクリーニング
pub const DEPRESSION: &[Question] = &[
    select(
        "d1",
        "物事に対してほとんど興味がない、または楽しめない",
        FREQUENCY_SCREEN,
        "depression",
    ),
    select(
        "d2",
        "気分が落ち込む、憂鬱になる、または絶望的な気持ちになる",
        FREQUENCY_SCREEN,
        "depression",
    ),
    select(
        "d3",
        "寝付きが悪い、途中で目が覚める、または逆に眠り過ぎる",
        FREQUENCY_SCREEN,
        "depression",
    ),
    select(
        "d4",
        "疲れた感じがする、または気力がない",
        FREQUENCY_SCREEN,
        "depression",
    ),
    select(
        "d5",
        "食欲がない、または食べ過ぎる",
        FREQUENCY_SCREEN,
        "depression",
    ),
    select(
        "d6",
        "自分自身に対して否定的に考える — 自分が失敗者だと思ったり、自分や家族に申し訳ないと感じたりする",
        FREQUENCY_SCREEN,
        "depression",
    ),
    select(
        "d7",
        "新聞を読んだりテレビを見たりするときに、集中することが難しい",
        FREQUENCY_SCREEN,
        "depression",
    ),
    select(
        "d8",
        "動きや話し方が他の人が気づくほど遅くなったり、逆に落ち着きがなく、いつもよりソワソワと動き回ったりする",
        FREQUENCY_SCREEN,
        "depression",
    ),
    select(
        "d9",
        "自分が死んだ方がましだ、または自分を何らかの方法で傷つけようと考えたことがある",
        FREQUENCY_SCREEN,
        "depression",
    ),
];

/// GAD-7 不安障害スクリーニング
pub const ANXIETY: &[Question] = &[
    select(
        "a1",
        "神経質になったり、不安になったり、または緊張したりすることがある",
        FREQUENCY_SCREEN,
        "anxiety",
    ),
    select(
        "a2",
        "心配することをやめられない、またはコントロールできない",
        FREQUENCY_SCREEN,
        "anxiety",
    ),
    select(
        "a3",
        "様々なことについて過度に心配する",
        FREQUENCY_SCREEN,
        "anxiety",
    ),
    select(
        "a4",
        "リラックスすることが難しい",
        FREQUENCY_SCREEN,
        "anxiety",
    ),
    select(
        "a5",
        "じっとしていられないほど落ち着かない",
        FREQUENCY_SCREEN,
        "anxiety",
    ),
    select(
        "a6",
        "簡単にイライラしたり、怒りっぽくなったりする",
        FREQUENCY_SCREEN,
        "anxiety",
    ),
    select(
        "a7",
        "何か恐ろしいことが起こるのではないかと恐れを感じる",
        FREQUENCY_SCREEN,
        "anxiety",
    ),
];

/// ストレスチェック
pub const STRESS: &[Question] = &[
    select(
        "s1",
        "予期せぬことが起きて動揺することがありましたか？",
        FREQUENCY_STRESS,
        "stress",
    ),
    select(
        "s2",
        "人生の重要なことをコントロールできないと感じましたか？",
        FREQUENCY_STRESS,
        "stress",
    ),
    select(
        "s3",
        "神経質になったりストレスを感じましたか？",
        FREQUENCY_STRESS,
        "stress",
    ),
    select(
        "s4",
        "個人的な問題を効果的に処理する自信がありましたか？",
        FREQUENCY_STRESS,
        "stress",
    ),
    select(
        "s5",
        "物事があなたの思い通りに進んでいると感じましたか？",
        FREQUENCY_STRESS,
        "stress",
    ),
    select(
        "s6",
        "やらなければならないことすべてを処理できないと感じましたか？",
        FREQUENCY_STRESS,
        "stress",
    ),
    select(
        "s7",
        "イライラを効果的にコントロールできましたか？",
        FREQUENCY_STRESS,
        "stress",
    ),
    select(
        "s8",
        "すべてをうまく乗り切っていると感じましたか？",
        FREQUENCY_STRESS,
        "stress",
    ),
    select(
        "s9",
        "コントロールできないことに怒りを感じましたか？",
        FREQUENCY_STRESS,
        "stress",
    ),
    select(
        "s10",
        "困難が多すぎて乗り越えられないと感じましたか？",
        FREQUENCY_STRESS,
        "stress",
    ),
];

/// バーンアウト（燃え尽き症候群）評価
pub const BURNOUT: &[Question] = &[
    scale(
        "b1",
        "仕事や日常の活動で感情的に疲れ果てていると感じる",
        "全くない",
        "毎日",
        "burnout",
    ),
    scale(
        "b2",
        "一日の終わりに使い果たされた感じがする",
        "全くない",
        "毎日",
        "burnout",
    ),
    scale(
        "b3",
        "朝起きたとき、また一日仕事をすると思うと疲れを感じる",
        "全くない",
        "毎日",
        "burnout",
    ),
    scale(
        "b4",
        "他の人々と一緒に働くことは実際に負担である",
        "全くない",
        "毎日",
        "burnout",
    ),
    scale(
        "b5",
        "私の仕事/日常の活動で燃え尽きていると感じる",
        "全くない",
        "毎日",
        "burnout",
    ),
    scale(
        "b6",
        "仕事/日常の活動で欲求不満を感じる",
        "全くない",
        "毎日",
        "burnout",
    ),
    scale(
        "b7",
        "仕事/日常の活動に熱心に取り組んでいると感じる",
        "全くない",
        "毎日",
        "burnout",
    ),
    scale("b8", "達成感を感じる", "全くない", "毎日", "burnout"),
    scale(
        "b9",
        "以前は楽しんでいた活動への関心を失った",
        "全くない",
        "毎日",
        "burnout",
    ),
    scale(
        "b10",
        "人間関係や個人的なつながりから孤立していると感じる",
        "全くない",
        "毎日",
        "burnout",
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bank_sizes_match_the_instruments() {
        assert_eq!(GENERAL.len(), 10);
        assert_eq!(DEPRESSION.len(), 9);
        assert_eq!(ANXIETY.len(), 7);
        assert_eq!(STRESS.len(), 10);
        assert_eq!(BURNOUT.len(), 10);
    }

    #[test]
    fn ids_are_unique_within_each_bank() {
        for bank in [GENERAL, DEPRESSION, ANXIETY, STRESS, BURNOUT] {
            let mut ids: Vec<&str> = bank.iter().map(|q| q.id).collect();
            ids.sort_unstable();
            ids.dedup();
            assert_eq!(ids.len(), bank.len());
        }
    }

    #[test]
    fn select_questions_carry_options_and_scale_questions_carry_labels() {
        for bank in [GENERAL, DEPRESSION, ANXIETY, STRESS, BURNOUT] {
            for q in bank {
                match q.kind {
                    QuestionKind::Select => {
                        assert!(q.options.is_some(), "{} has no options", q.id)
                    }
                    QuestionKind::Scale => assert!(
                        q.min_label.is_some() && q.max_label.is_some(),
                        "{} has no scale labels",
                        q.id
                    ),
                }
            }
        }
    }

    #[test]
    fn serialization_uses_client_field_names() {
        let json = serde_json::to_value(&GENERAL[0]).unwrap();
        assert_eq!(json["type"], "select");
        assert!(json["options"].is_array());
        assert!(json.get("minLabel").is_none());

        let json = serde_json::to_value(&GENERAL[1]).unwrap();
        assert_eq!(json["type"], "scale");
        assert_eq!(json["minLabel"], "まったくない");
        assert!(json.get("options").is_none());
    }
}
