// Moderation gate - core business logic for scoring startup submissions.
//
// This service handles:
// - Building the rubric prompt from the submission text
// - Delegating the scoring to an external classifier
// - Parsing the classifier's answer (tolerating markdown wrapping)
// - Falling back to a "needs human review" result on any failure
//
// NO provider dependencies here - the classifier is injected through a trait.

use super::moderation_models::{clamp_score, ModerationResult, StartupContent};
use async_trait::async_trait;
use serde::Deserialize;
use std::error::Error;
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum ModerationError {
    #[error("Classifier error: {0}")]
    Classifier(String),

    #[error("Malformed classifier response: {0}")]
    MalformedResponse(String),
}

// ============================================================================
// CLASSIFIER TRAIT (PORT)
// ============================================================================

/// An external text classifier (an LLM in production).
///
/// Implementations return the raw text the model produced. They are
/// untrusted: the answer may be wrapped, truncated or missing entirely.
#[async_trait]
pub trait ContentClassifier: Send + Sync {
    async fn classify(&self, prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>>;
}

// Lets the service hold a trait object so the provider can be picked at startup.
#[async_trait]
impl ContentClassifier for Box<dyn ContentClassifier> {
    async fn classify(&self, prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
        (**self).classify(prompt).await
    }
}

// ============================================================================
// CORE SERVICE
// ============================================================================

pub struct ModerationService<C: ContentClassifier> {
    classifier: C,
}

impl<C: ContentClassifier> ModerationService<C> {
    pub fn new(classifier: C) -> Self {
        Self { classifier }
    }

    /// Moderate a submission. Never fails: any classifier or parsing problem
    /// yields `ModerationResult::fallback()`.
    pub async fn moderate(&self, content: &StartupContent) -> ModerationResult {
        match self.try_moderate(content).await {
            Ok(result) => {
                tracing::debug!(
                    score = result.score,
                    approved = result.approved,
                    flags = ?result.flags,
                    "Moderation completed"
                );
                result
            }
            Err(err) => {
                tracing::error!("Moderation failed, queuing for manual review: {}", err);
                ModerationResult::fallback()
            }
        }
    }

    async fn try_moderate(
        &self,
        content: &StartupContent,
    ) -> Result<ModerationResult, ModerationError> {
        let prompt = build_prompt(content);
        let text = self
            .classifier
            .classify(&prompt)
            .await
            .map_err(|e| ModerationError::Classifier(e.to_string()))?;
        parse_response(&text)
    }
}

// ============================================================================
// PROMPT
// ============================================================================

/// Labelled text block of every non-empty field, one per line.
pub fn content_text(content: &StartupContent) -> String {
    let optional = [
        ("Problem", &content.problem),
        ("Solution", &content.solution),
        ("Value Proposition", &content.value_proposition),
        ("Business Model", &content.business_model),
        ("Industry", &content.industry),
    ];

    let mut lines = vec![
        format!("Startup Name: {}", content.name),
        format!("Tagline: {}", content.tagline),
    ];
    for (label, value) in optional {
        if let Some(value) = value.as_deref().filter(|v| !v.trim().is_empty()) {
            lines.push(format!("{}: {}", label, value));
        }
    }
    lines.join("\n")
}

pub fn build_prompt(content: &StartupContent) -> String {
    format!(
        r#"You are a content moderation system for a startup investment platform. Analyze the following startup submission for inappropriate, harmful, fraudulent, or misleading content.

Rate the content on a scale of 0-100 where:
- 0-30: Clearly inappropriate, fraudulent, or harmful - should be rejected
- 31-60: Questionable content that needs human review
- 61-80: Mostly fine but may have minor issues
- 81-100: Clean, legitimate startup content

Check for:
1. Hate speech, discrimination, or offensive language
2. Fraudulent or scam-like claims (e.g. "guaranteed 1000x returns")
3. Illegal activities or products
4. Spam or meaningless content
5. Misleading financial claims
6. Adult or explicit content
7. Violence or threats

Content to analyze:
{}

Respond ONLY with valid JSON in this exact format (no markdown, no code blocks):
{{"score": <number>, "approved": <boolean>, "reason": "<brief explanation>", "flags": ["<flag1>", "<flag2>"]}}

Where "approved" is true if score >= 61, false otherwise.
If the content is completely clean, use an empty flags array."#,
        content_text(content)
    )
}

// ============================================================================
// RESPONSE PARSING
// ============================================================================

/// The classifier's verdict as it arrives. Only `score` is mandatory; the
/// other fields are loosely typed because the model does not always comply.
#[derive(Debug, Deserialize)]
struct RawVerdict {
    score: f64,
    #[serde(default)]
    reason: Option<serde_json::Value>,
    #[serde(default)]
    flags: Option<serde_json::Value>,
}

/// Remove markdown code fences the model sometimes wraps its JSON in.
fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "")
        .replace("```JSON", "")
        .replace("```", "")
        .trim()
        .to_string()
}

/// Parse the classifier's raw text into a `ModerationResult`.
///
/// Tries the fence-stripped text first, then the outermost `{...}` span in
/// case the model added prose around the object.
pub fn parse_response(text: &str) -> Result<ModerationResult, ModerationError> {
    let stripped = strip_code_fences(text);

    let verdict = match serde_json::from_str::<RawVerdict>(&stripped) {
        Ok(verdict) => verdict,
        Err(first_err) => {
            let start = stripped.find('{');
            let end = stripped.rfind('}');
            match (start, end) {
                (Some(start), Some(end)) if end > start => {
                    serde_json::from_str::<RawVerdict>(&stripped[start..=end])
                        .map_err(|e| ModerationError::MalformedResponse(e.to_string()))?
                }
                _ => return Err(ModerationError::MalformedResponse(first_err.to_string())),
            }
        }
    };

    let score = clamp_score(verdict.score).ok_or_else(|| {
        ModerationError::MalformedResponse(format!("non-finite score {}", verdict.score))
    })?;

    let reason = verdict
        .reason
        .as_ref()
        .and_then(|r| r.as_str())
        .unwrap_or_default()
        .to_string();

    let flags = match verdict.flags {
        Some(serde_json::Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    };

    Ok(ModerationResult::from_score(score, reason, flags))
}

// ============================================================================
// TESTS
// ============================================================================
