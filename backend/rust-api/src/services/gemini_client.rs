use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use crate::config::GeminiSettings;
use crate::error::GenerationError;

/// One structured-output call against the hosted model.
#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub api_key: String,
    pub model: String,
    pub prompt: String,
    pub schema: Value,
}

/// Seam between the proxy and the hosted model, so tests can script upstream behaviour.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Returns the model's raw JSON text.
    async fn generate_content(&self, request: ModelRequest) -> Result<String, GenerationError>;
}

pub struct GeminiClient {
    http_client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    code: Option<u16>,
    #[serde(default)]
    message: String,
    status: Option<String>,
}

impl GeminiClient {
    pub fn new(settings: &GeminiSettings) -> anyhow::Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            http_client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }
}

#[async_trait]
impl ContentGenerator for GeminiClient {
    async fn generate_content(&self, request: ModelRequest) -> Result<String, GenerationError> {
        let body = json!({
            "contents": [
                { "role": "user", "parts": [{ "text": request.prompt }] }
            ],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": request.schema,
            }
        });

        tracing::debug!(model = %request.model, "Calling generateContent");

        let response = self
            .http_client
            .post(self.endpoint(&request.model))
            .header("x-goog-api-key", &request.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let message = describe_error(status.as_u16(), &error_text);
            tracing::warn!(status = status.as_u16(), "Model returned error: {}", message);
            return Err(GenerationError::from_status(status.as_u16(), message));
        }

        let payload: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::malformed(format!("unreadable model response: {}", e)))?;

        extract_text(payload)
    }
}

fn describe_error(status: u16, body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => {
            let code = envelope.error.code.unwrap_or(status);
            match envelope.error.status {
                Some(kind) => format!("{} {}: {}", code, kind, envelope.error.message),
                None => format!("{}: {}", code, envelope.error.message),
            }
        }
        Err(_) if body.trim().is_empty() => format!("Model request failed with status {}", status),
        Err(_) => format!("{}: {}", status, body.trim()),
    }
}

fn extract_text(payload: GenerateContentResponse) -> Result<String, GenerationError> {
    let candidate = payload
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| GenerationError::malformed("model returned no candidates"))?;

    let text: String = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(GenerationError::malformed(format!(
            "model returned no text (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        )));
    }

    Ok(text)
}
