// Moderation domain models - data structures for the content moderation gate.
//
// These are pure domain types with no HTTP or provider dependencies.
// The infra layer talks to the classifier, the core turns its answer into these.

use serde::{Deserialize, Serialize};

/// Scores at or above this value are considered safe to publish.
pub const APPROVAL_THRESHOLD: u8 = 61;

/// Score reported when the classifier could not be reached or understood.
pub const FALLBACK_SCORE: u8 = 50;

/// Reason reported alongside the fallback score.
pub const FALLBACK_REASON: &str = "service unavailable";

/// Flag attached to every fallback result.
pub const MODERATION_ERROR_FLAG: &str = "moderation_error";

/// The free-text part of a startup submission that gets moderated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartupContent {
    pub name: String,
    pub tagline: String,
    #[serde(default)]
    pub problem: Option<String>,
    #[serde(default)]
    pub solution: Option<String>,
    #[serde(default)]
    pub value_proposition: Option<String>,
    #[serde(default)]
    pub business_model: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
}

/// Outcome of moderating a submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerationResult {
    /// `true` when `score >= APPROVAL_THRESHOLD`
    pub approved: bool,
    /// 0-100, higher = safer
    pub score: u8,
    /// Short human-readable explanation
    pub reason: String,
    /// Problem categories reported by the classifier
    pub flags: Vec<String>,
}

impl ModerationResult {
    /// Build a result from an already clamped score. `approved` is always
    /// derived here so it can never disagree with the score.
    pub fn from_score(score: u8, reason: String, flags: Vec<String>) -> Self {
        let score = score.min(100);
        Self {
            approved: passes_threshold(score),
            score,
            reason,
            flags,
        }
    }

    /// The result used whenever moderation fails. It never approves, so the
    /// submission waits for a human.
    pub fn fallback() -> Self {
        Self {
            approved: false,
            score: FALLBACK_SCORE,
            reason: FALLBACK_REASON.to_string(),
            flags: vec![MODERATION_ERROR_FLAG.to_string()],
        }
    }
}

/// Whether a score clears the approval threshold.
pub fn passes_threshold(score: u8) -> bool {
    score >= APPROVAL_THRESHOLD
}

/// Clamp an arbitrary upstream score into `[0, 100]`.
///
/// Fractional scores are floored, so 60.9 stays below the 61 threshold.
/// Returns `None` for
/// NaN or infinite input, which callers treat as a malformed response.
pub fn clamp_score(raw: f64) -> Option<u8> {
    if !raw.is_finite() {
        return None;
    }
    Some(raw.floor().clamp(0.0, 100.0) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_score_bounds() {
        assert_eq!(clamp_score(-10.0), Some(0));
        assert_eq!(clamp_score(150.0), Some(100));
        assert_eq!(clamp_score(75.0), Some(75));
        assert_eq!(clamp_score(60.6), Some(60));
        assert_eq!(clamp_score(60.99), Some(60));
        assert_eq!(clamp_score(61.2), Some(61));
        assert_eq!(clamp_score(f64::NAN), None);
        assert_eq!(clamp_score(f64::INFINITY), None);
    }

    #[test]
    fn test_approved_matches_threshold_for_every_score() {
        for score in 0..=100u8 {
            let result = ModerationResult::from_score(score, String::new(), Vec::new());
            assert_eq!(result.approved, score >= 61, "score {}", score);
        }
    }

    #[test]
    fn test_fallback_forces_review() {
        let result = ModerationResult::fallback();
        assert!(!result.approved);
        assert_eq!(result.score, 50);
        assert_eq!(result.reason, "service unavailable");
        assert_eq!(result.flags, vec!["moderation_error".to_string()]);
    }
}
