use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use super::generation_service::GenerationService;
use crate::{
    error::GenerationError,
    models::{AcademicPassage, ErrorBody, GenerateRequest, GenerationTask, QuizQuestion},
    utils::retry::{retry_with_policy, RetryPolicy},
};

pub const GENERATE_PATH: &str = "/api/generate";

/// Set on a proxy error response when the proxy already ran the backoff policy
/// itself; the client must not retry such an answer again.
pub const RETRY_OWNER_HEADER: &str = "x-retry-owner";
pub const RETRY_OWNER_PROXY: &str = "proxy";

/// Typed access to generated content. Implementors only fetch the raw JSON text;
/// parsing, validation and id backfilling are shared.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    async fn fetch_raw(&self, task: GenerationTask) -> Result<String, GenerationError>;

    async fn request_quiz(&self) -> Result<QuizQuestion, GenerationError> {
        let raw = self.fetch_raw(GenerationTask::Quiz).await?;
        QuizQuestion::from_json(&raw)
    }

    async fn request_passage(&self) -> Result<AcademicPassage, GenerationError> {
        let raw = self.fetch_raw(GenerationTask::Scramble).await?;
        AcademicPassage::from_json(&raw)
    }
}

/// Calls the same-origin proxy. The credential never leaves the server.
pub struct ProxyClient {
    http_client: Client,
    endpoint: String,
    retry: RetryPolicy<GenerationError>,
}

impl ProxyClient {
    pub fn new(base_url: &str) -> Result<Self, GenerationError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), GENERATE_PATH),
            retry: RetryPolicy::rate_limit_backoff(),
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy<GenerationError>) -> Self {
        self.retry = retry;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post_task(&self, task: GenerationTask) -> Result<String, GenerationError> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&GenerateRequest::for_task(task))
            .send()
            .await?;

        let status = response.status();
        let retried_by_proxy = response
            .headers()
            .get(RETRY_OWNER_HEADER)
            .and_then(|v| v.to_str().ok())
            == Some(RETRY_OWNER_PROXY);
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.message)
                .unwrap_or_else(|_| format!("Request failed with status {}", status.as_u16()));
            return Err(match GenerationError::from_status(status.as_u16(), message) {
                GenerationError::RateLimited(message) if retried_by_proxy => {
                    tracing::debug!("Proxy already backed off, not retrying");
                    GenerationError::RateLimitExhausted(message)
                }
                other => other,
            });
        }

        Ok(body)
    }
}

#[async_trait]
impl GenerationClient for ProxyClient {
    async fn fetch_raw(&self, task: GenerationTask) -> Result<String, GenerationError> {
        tracing::debug!(task = %task, endpoint = %self.endpoint, "Requesting generation from proxy");
        retry_with_policy(&self.retry, || self.post_task(task)).await
    }
}

/// Calls the model directly with a locally held credential, retrying on rate limits.
pub struct DirectClient {
    service: GenerationService,
}

impl DirectClient {
    pub fn new(service: GenerationService) -> Self {
        Self {
            service: service.with_retry(RetryPolicy::rate_limit_backoff()),
        }
    }

    pub fn with_retry(service: GenerationService, retry: RetryPolicy<GenerationError>) -> Self {
        Self {
            service: service.with_retry(retry),
        }
    }
}

#[async_trait]
impl GenerationClient for DirectClient {
    async fn fetch_raw(&self, task: GenerationTask) -> Result<String, GenerationError> {
        self.service.generate(task).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_base_without_double_slash() {
        let client = ProxyClient::new("http://localhost:8081/").unwrap();
        assert_eq!(client.endpoint(), "http://localhost:8081/api/generate");
    }
}
