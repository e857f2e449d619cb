//! Onboarding questionnaire: answer values, key naming, the fixed answer
//! vocabularies, and per-step completeness checks.

use crate::error::{Result, SkinRoutineError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Skin feel an hour after washing (step 1, question 0).
pub const SKIN_DRY: &str = "A bit tight, dry, or even flaky.";
pub const SKIN_NORMAL: &str = "Comfortable and smooth.";
pub const SKIN_COMBINATION: &str = "Shiny T-zone, normal cheeks.";
pub const SKIN_OILY: &str = "Shiny or greasy all over.";

pub const SKIN_TYPE_OPTIONS: &[&str] = &[SKIN_DRY, SKIN_NORMAL, SKIN_COMBINATION, SKIN_OILY];

pub const SENSITIVITY_OPTIONS: &[&str] = &[
    "Almost never reacts.",
    "Sometimes reacts.",
    "Often reacts.",
];

pub const CONCERN_BREAKOUTS: &str = "Pimples & Breakouts";
pub const CONCERN_FINE_LINES: &str = "Fine Lines";
/// Not offered by the questionnaire itself, but recognized by the PM treatment rule.
pub const CONCERN_DULLNESS: &str = "Dullness";

pub const CONCERN_OPTIONS: &[&str] = &[
    CONCERN_BREAKOUTS,
    "Clogged Pores",
    CONCERN_FINE_LINES,
    "Redness",
    "Dark Spots",
    "Uneven Texture",
];

pub const GOAL_CLEAR: &str = "Achieve a clear, blemish-free complexion.";
pub const GOAL_GLOW: &str = "Get that bright, radiant 'glow'.";

pub const GOAL_OPTIONS: &[&str] = &[
    GOAL_CLEAR,
    GOAL_GLOW,
    "Keep my skin looking youthful and smooth.",
    "Hydrate and plump my skin.",
    "Soothe and calm my sensitive skin.",
];

pub const CLIMATE_OPTIONS: &[&str] = &["Humid & Warm", "Dry & Hot", "Cold & Dry", "Balanced & Mild"];

pub const SUN_EXPOSURE_OPTIONS: &[&str] = &["Hardly Any", "A Little Bit", "Moderate", "A Lot"];

/// One answer in the questionnaire map.
///
/// Serialized untagged so the map round-trips the questionnaire's own JSON
/// shape: a bare string for single-choice questions, an array for multi-choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuizAnswer {
    Single(String),
    Multi(Vec<String>),
}

impl QuizAnswer {
    /// An empty string or an empty selection counts as unanswered.
    pub fn is_empty(&self) -> bool {
        match self {
            QuizAnswer::Single(s) => s.is_empty(),
            QuizAnswer::Multi(v) => v.is_empty(),
        }
    }

    pub fn as_single(&self) -> Option<&str> {
        match self {
            QuizAnswer::Single(s) => Some(s.as_str()),
            QuizAnswer::Multi(_) => None,
        }
    }
}

impl From<&str> for QuizAnswer {
    fn from(s: &str) -> Self {
        QuizAnswer::Single(s.to_string())
    }
}

impl From<Vec<&str>> for QuizAnswer {
    fn from(v: Vec<&str>) -> Self {
        QuizAnswer::Multi(v.into_iter().map(str::to_string).collect())
    }
}

/// Flat map from `step<N>_q<M>` keys to answers.
pub type QuizAnswerMap = BTreeMap<String, QuizAnswer>;

/// Build the synthetic key for question `question` (0-based) of step `step` (1-based).
pub fn answer_key(step: usize, question: usize) -> String {
    format!("step{}_q{}", step, question)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionKind {
    SingleChoice,
    MultiChoiceGrid,
    Pills,
}

#[derive(Debug, Clone, Copy)]
pub struct Question {
    pub title: &'static str,
    pub kind: QuestionKind,
    pub options: &'static [&'static str],
}

#[derive(Debug, Clone, Copy)]
pub struct QuizStep {
    pub step: usize,
    pub headline: &'static str,
    pub questions: &'static [Question],
}

pub static QUIZ_STEPS: &[QuizStep] = &[
    QuizStep {
        step: 1,
        headline: "Let's start with the basics.",
        questions: &[
            Question {
                title: "How does your face feel an hour after washing?",
                kind: QuestionKind::SingleChoice,
                options: SKIN_TYPE_OPTIONS,
            },
            Question {
                title: "How sensitive is your skin?",
                kind: QuestionKind::SingleChoice,
                options: SENSITIVITY_OPTIONS,
            },
        ],
    },
    QuizStep {
        step: 2,
        headline: "What are your main skin concerns?",
        questions: &[Question {
            title: "Select your concerns",
            kind: QuestionKind::MultiChoiceGrid,
            options: CONCERN_OPTIONS,
        }],
    },
    QuizStep {
        step: 3,
        headline: "What are your ultimate skin goals?",
        questions: &[Question {
            title: "Select your primary goal",
            kind: QuestionKind::SingleChoice,
            options: GOAL_OPTIONS,
        }],
    },
    QuizStep {
        step: 4,
        headline: "A bit about your lifestyle.",
        questions: &[
            Question {
                title: "Which of these best describes your climate?",
                kind: QuestionKind::Pills,
                options: CLIMATE_OPTIONS,
            },
            Question {
                title: "How much sun exposure do you get?",
                kind: QuestionKind::Pills,
                options: SUN_EXPOSURE_OPTIONS,
            },
        ],
    },
];

/// Keys of the given step's questions that have no usable answer.
pub fn missing_answers(step: usize, answers: &QuizAnswerMap) -> Result<Vec<String>> {
    let quiz_step = QUIZ_STEPS
        .iter()
        .find(|s| s.step == step)
        .ok_or_else(|| SkinRoutineError::Validation {
            message: format!("unknown quiz step {} (expected 1..={})", step, QUIZ_STEPS.len()),
        })?;

    Ok((0..quiz_step.questions.len())
        .map(|q| answer_key(step, q))
        .filter(|key| answers.get(key).is_none_or(QuizAnswer::is_empty))
        .collect())
}

/// Check that every question of `step` has been answered.
pub fn validate_step(step: usize, answers: &QuizAnswerMap) -> Result<()> {
    let missing = missing_answers(step, answers)?;
    if missing.is_empty() {
        Ok(())
    } else {
        Err(SkinRoutineError::Validation {
            message: format!(
                "Please answer all questions before continuing (missing: {})",
                missing.join(", ")
            ),
        })
    }
}

/// Validate every step in order, stopping at the first incomplete one.
pub fn validate_all(answers: &QuizAnswerMap) -> Result<()> {
    for step in QUIZ_STEPS {
        validate_step(step.step, answers)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_answers() -> QuizAnswerMap {
        let mut m = QuizAnswerMap::new();
        m.insert(answer_key(1, 0), SKIN_OILY.into());
        m.insert(answer_key(1, 1), "Sometimes reacts.".into());
        m.insert(answer_key(2, 0), vec![CONCERN_BREAKOUTS, "Redness"].into());
        m.insert(answer_key(3, 0), GOAL_CLEAR.into());
        m.insert(answer_key(4, 0), "Humid & Warm".into());
        m.insert(answer_key(4, 1), "A Lot".into());
        m
    }

    #[test]
    fn test_answer_key_format() {
        assert_eq!(answer_key(1, 0), "step1_q0");
        assert_eq!(answer_key(4, 1), "step4_q1");
    }

    #[test]
    fn test_untagged_json_shape() {
        let json = r#"{"step1_q0":"Comfortable and smooth.","step2_q0":["Fine Lines"]}"#;
        let map: QuizAnswerMap = serde_json::from_str(json).unwrap();
        assert_eq!(map["step1_q0"], QuizAnswer::Single(SKIN_NORMAL.to_string()));
        assert_eq!(
            map["step2_q0"],
            QuizAnswer::Multi(vec![CONCERN_FINE_LINES.to_string()])
        );
        assert_eq!(serde_json::to_string(&map).unwrap(), json);
    }

    #[test]
    fn test_complete_answers_validate() {
        let answers = complete_answers();
        assert!(validate_all(&answers).is_ok());
    }

    #[test]
    fn test_empty_selection_counts_as_missing() {
        let mut answers = complete_answers();
        answers.insert(answer_key(2, 0), QuizAnswer::Multi(vec![]));
        let err = validate_step(2, &answers).unwrap_err();
        assert!(err.to_string().contains("step2_q0"));
    }

    #[test]
    fn test_missing_second_question_reported() {
        let mut answers = complete_answers();
        answers.remove("step4_q1");
        answers.insert(answer_key(4, 0), QuizAnswer::Single(String::new()));
        let missing = missing_answers(4, &answers).unwrap();
        assert_eq!(missing, vec!["step4_q0".to_string(), "step4_q1".to_string()]);
    }

    #[test]
    fn test_unknown_step_rejected() {
        let answers = complete_answers();
        assert!(validate_step(0, &answers).is_err());
        assert!(validate_step(5, &answers).is_err());
    }

    #[test]
    fn test_validate_all_stops_at_first_gap() {
        let mut answers = complete_answers();
        answers.remove("step1_q1");
        answers.remove("step3_q0");
        let err = validate_all(&answers).unwrap_err().to_string();
        assert!(err.contains("step1_q1"));
        assert!(!err.contains("step3_q0"));
    }
}
