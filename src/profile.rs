//! Skin profile normalization.
//!
//! Pulls the three answers the routine rules read out of the raw questionnaire
//! map. Values are passed through verbatim; anything missing, empty or of the
//! wrong shape is simply absent from the profile.

use crate::quiz::{QuizAnswer, QuizAnswerMap, answer_key};
use serde::{Deserialize, Serialize};

/// Normalized subset of the quiz answers the routine rules depend on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkinProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skin_type_answer: Option<String>,
    #[serde(default)]
    pub primary_concerns: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_goal: Option<String>,
}

impl SkinProfile {
    /// True when no field carries an answer, i.e. the quiz has not been taken.
    pub fn is_empty(&self) -> bool {
        self.skin_type_answer.is_none()
            && self.primary_concerns.is_empty()
            && self.primary_goal.is_none()
    }

    pub fn skin_type(&self) -> &str {
        self.skin_type_answer.as_deref().unwrap_or("")
    }

    pub fn goal(&self) -> &str {
        self.primary_goal.as_deref().unwrap_or("")
    }

    pub fn has_concern(&self, concern: &str) -> bool {
        self.primary_concerns.iter().any(|c| c == concern)
    }
}

pub fn skin_type_key() -> String {
    answer_key(1, 0)
}

pub fn concerns_key() -> String {
    answer_key(2, 0)
}

pub fn goal_key() -> String {
    answer_key(3, 0)
}

fn single(answers: &QuizAnswerMap, key: &str) -> Option<String> {
    answers
        .get(key)
        .and_then(QuizAnswer::as_single)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn list(answers: &QuizAnswerMap, key: &str) -> Vec<String> {
    match answers.get(key) {
        Some(QuizAnswer::Multi(items)) => items.clone(),
        Some(QuizAnswer::Single(s)) if !s.is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}

/// Convert a raw answer map into a [`SkinProfile`].
///
/// `None` means no quiz has been taken yet and yields the empty profile.
/// Never fails.
pub fn normalize(answers: Option<&QuizAnswerMap>) -> SkinProfile {
    let Some(answers) = answers else {
        return SkinProfile::default();
    };

    SkinProfile {
        skin_type_answer: single(answers, &skin_type_key()),
        primary_concerns: list(answers, &concerns_key()),
        primary_goal: single(answers, &goal_key()),
    }
}
