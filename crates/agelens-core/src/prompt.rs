//! # Advice Prompt Policy
//!
//! Chooses and renders the instruction text sent to the generative backend.
//!
//! The choice depends only on how the two ages compare:
//!
//! | Condition | Tone |
//! |-----------|------|
//! | predicted > actual | [`AdviceTone::Improvement`] |
//! | predicted <= actual | [`AdviceTone::Celebration`] |
//!
//! Both branches demand the same JSON schema, so the response parser does not
//! need to know which one was used.

use serde::{Deserialize, Serialize};

/// Tone branch of the advice prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdviceTone {
    /// Encouraging, improvement-oriented. Predicted age exceeds actual age.
    Improvement,
    /// Celebratory, maintenance-oriented. Predicted age at or below actual age.
    Celebration,
}

impl AdviceTone {
    /// Pick the branch for a comparison.
    #[must_use]
    pub fn select(predicted: f64, actual: u32) -> Self {
        if predicted > f64::from(actual) {
            AdviceTone::Improvement
        } else {
            AdviceTone::Celebration
        }
    }
}

/// A rendered prompt and the branch it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvicePrompt {
    pub tone: AdviceTone,
    pub text: String,
}

/// Render the prompt for a comparison.
///
/// The predicted age is written with one decimal place, the actual age as a
/// plain integer.
#[must_use]
pub fn build_prompt(predicted: f64, actual: u32) -> AdvicePrompt {
    let tone = AdviceTone::select(predicted, actual);
    let text = match tone {
        AdviceTone::Improvement => format!(
            "You are an encouraging and motivational health & skincare coach. \
             A user's AI-predicted age is {predicted:.1}, which is higher than their actual age of {actual}. \
             This is a great opportunity for improvement! Provide actionable tips on how they can \
             enhance their health and potentially \"reverse\" their biological age to appear younger \
             and fitter. The tone should be positive and empowering, not critical. \
             Return ONLY a valid JSON object following this exact schema: {schema}",
            schema = schema_example(tone),
        ),
        AdviceTone::Celebration => format!(
            "You are an encouraging and celebratory health & skincare coach. \
             A user's AI-predicted age is {predicted:.1}, which is younger than or equal to their actual age of {actual}. \
             Congratulations to them on their excellent health and appearance! Provide useful tips on \
             how they can maintain their fitness and youthful vitality. \
             The tone should be positive and reinforcing. \
             Return ONLY a valid JSON object following this exact schema: {schema}",
            schema = schema_example(tone),
        ),
    };
    AdvicePrompt { tone, text }
}

/// Schema illustration embedded in the prompt, phrased for the branch.
fn schema_example(tone: AdviceTone) -> &'static str {
    match tone {
        AdviceTone::Improvement => {
            r#"{"summary": "A short, motivating summary about the opportunity to improve.", "healthTips": ["A specific health tip for improvement.", "Another specific health tip.", "A third specific health tip."], "skincareTips": ["A specific skincare tip for a more youthful appearance.", "Another specific skincare tip.", "A third specific skincare tip."], "lifestyleTips": ["A key lifestyle change to feel younger.", "Another key lifestyle change."]}"#
        }
        AdviceTone::Celebration => {
            r#"{"summary": "A short, congratulatory summary on looking young and fit.", "healthTips": ["A specific health tip for maintenance.", "Another specific health tip.", "A third specific health tip."], "skincareTips": ["A specific skincare tip to maintain skin health.", "Another specific skincare tip.", "A third specific skincare tip."], "lifestyleTips": ["A key lifestyle tip for continued well-being.", "Another key lifestyle tip."]}"#
        }
    }
}
