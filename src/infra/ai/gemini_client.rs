// Gemini generateContent client used as the moderation classifier.
//
// The API key travels in the `x-goog-api-key` header, never in the URL.
// Transport errors have their URL stripped before they are returned.

use crate::core::moderation::ContentClassifier;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

// =============================================================================
// GEMINI API DATA STRUCTURES
// =============================================================================

/// A single part of content. Only text parts are used here.
#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(default)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(default)]
struct Content {
    /// Role: "user" or "model"
    #[serde(skip_serializing_if = "String::is_empty")]
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    /// Scoring should be as repeatable as the model allows.
    temperature: f32,
}

/// The request body sent to the Gemini generateContent endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Content,

    /// Why the model stopped generating (e.g., "STOP", "SAFETY").
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

/// Error response from the Gemini API.
#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    message: String,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiErrorDetail,
}

// =============================================================================
// GEMINI CLIENT IMPLEMENTATION
// =============================================================================

/// Client for Google's Gemini API, used as the moderation classifier.
///
/// # Example
/// ```ignore
/// let client = GeminiClient::new(api_key, "gemini-2.0-flash".into(), Duration::from_secs(20))?;
/// let service = ModerationService::new(client);
/// ```
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    /// Creates a client. Every request is bounded by `timeout`, so a hung
    /// provider turns into an error instead of a stuck submission.
    pub fn new(api_key: String, model: String, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key,
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Point the client at another host, e.g. a proxy.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

/// Concatenate the text parts of the first candidate.
fn extract_text(response: &GenerateContentResponse) -> Result<String, String> {
    let candidate = response
        .candidates
        .as_ref()
        .and_then(|c| c.first())
        .ok_or("No content in Gemini response - the prompt may have been blocked")?;

    let text: String = candidate
        .content
        .parts
        .iter()
        .filter_map(|p| p.text.as_deref())
        .collect();

    if text.trim().is_empty() {
        return Err(format!(
            "Empty Gemini response (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        ));
    }
    Ok(text)
}

#[async_trait]
impl ContentClassifier for GeminiClient {
    async fn classify(&self, prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
            generation_config: GenerationConfig { temperature: 0.0 },
        };

        tracing::debug!("Gemini request to model {}: {} chars", self.model, prompt.len());

        let response = self
            .client
            .post(self.endpoint())
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .map_err(reqwest::Error::without_url)?;

            if let Ok(error_response) = serde_json::from_str::<GeminiErrorResponse>(&error_text) {
                return Err(format!(
                    "Gemini API error ({}): {}",
                    status, error_response.error.message
                )
                .into());
            }

            return Err(format!("Gemini API error: {} - {}", status, error_text).into());
        }

        let response_json: GenerateContentResponse = response
            .json()
            .await
            .map_err(reqwest::Error::without_url)?;
        let text = extract_text(&response_json)?;

        tracing::debug!("Gemini response received: {} chars", text.len());
        Ok(text)
    }
}

// =============================================================================
// TESTS
// =============================================================================
