//! Headline/body coherence.
//!
//! `coherence = 0.6 × jaccard(canonical(headline), canonical(body)) + 0.4 × answerBonus`,
//! where the bonus rewards a body that opens with a direct answer to a question headline.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::hygiene::headline::is_interrogative;
use crate::hygiene::text::{canonical_tokens, jaccard};
use crate::tunables::{ANSWER_SHAPE_ADJ, COHERENCE_ANSWER_WEIGHT, COHERENCE_JACCARD_WEIGHT};

fn answer_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)^\s*(use|let|let's|here's how|here’s how|here is how|try|get|start|meet|just|simply|switch|skip)\b",
        )
        .expect("valid regex")
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerShape {
    /// Question headline, body opens with an answer pattern.
    Answered,
    /// Question headline, body does not answer it.
    Unanswered,
    NotAQuestion,
}

impl AnswerShape {
    pub fn coherence_bonus(&self) -> f32 {
        match self {
            AnswerShape::Answered => 1.0,
            AnswerShape::Unanswered => 0.0,
            AnswerShape::NotAQuestion => 0.5,
        }
    }

    /// Adjustment applied to a bundle's aggregate score.
    pub fn aggregate_adjustment(&self) -> f32 {
        match self {
            AnswerShape::Answered => ANSWER_SHAPE_ADJ,
            AnswerShape::Unanswered => -ANSWER_SHAPE_ADJ,
            AnswerShape::NotAQuestion => 0.0,
        }
    }
}

pub fn answer_shape(headline: &str, body: &str) -> AnswerShape {
    let is_question = is_interrogative(headline) || headline.trim_end().ends_with('?');
    if !is_question {
        AnswerShape::NotAQuestion
    } else if answer_re().is_match(body) {
        AnswerShape::Answered
    } else {
        AnswerShape::Unanswered
    }
}

/// Coherence in `[0, 1]` between a headline and its body copy.
pub fn coherence_score(headline: &str, body: &str) -> f32 {
    let overlap = jaccard(&canonical_tokens(headline), &canonical_tokens(body));
    let bonus = answer_shape(headline, body).coherence_bonus();
    (COHERENCE_JACCARD_WEIGHT * overlap + COHERENCE_ANSWER_WEIGHT * bonus).clamp(0.0, 1.0)
}
