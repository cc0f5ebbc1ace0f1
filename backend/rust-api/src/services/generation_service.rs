use std::sync::Arc;
use std::time::Instant;

use super::gemini_client::ContentGenerator;
use super::prompts;
use crate::{
    config::Config, error::GenerationError, metrics, models::GenerationTask,
    utils::retry::{retry_with_policy_notify, RetryPolicy},
};

/// Core of `POST /api/generate`: credential check, prompt + schema selection and
/// the upstream call, relaying the model's raw JSON text.
#[derive(Clone)]
pub struct GenerationService {
    generator: Arc<dyn ContentGenerator>,
    api_key: Option<String>,
    model: String,
    retry: RetryPolicy<GenerationError>,
}

impl GenerationService {
    pub fn new(
        generator: Arc<dyn ContentGenerator>,
        api_key: Option<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            generator,
            api_key,
            model: model.into(),
            retry: RetryPolicy::none(),
        }
    }

    /// Proxy-side service; retries only when `generation.proxy_retry` is on.
    pub fn from_config(config: &Config, generator: Arc<dyn ContentGenerator>) -> Self {
        let service = Self::new(
            generator,
            config.gemini.api_key.clone(),
            config.gemini.model.clone(),
        );
        if config.generation.proxy_retry {
            service.with_retry(RetryPolicy::from_settings(&config.retry))
        } else {
            service
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy<GenerationError>) -> Self {
        self.retry = retry;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Whether this service runs the rate-limit backoff itself.
    pub fn retries_rate_limits(&self) -> bool {
        self.retry.max_retries > 0
    }

    pub async fn generate(&self, task: GenerationTask) -> Result<String, GenerationError> {
        let api_key = match self.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => key,
            _ => {
                tracing::error!(task = %task, "Generation refused: API_KEY is not configured");
                metrics::record_generation(task.as_str(), "unconfigured", 0.0);
                return Err(GenerationError::MissingCredential);
            }
        };

        let request = prompts::model_request(task, api_key, &self.model);
        let start = Instant::now();

        let result = retry_with_policy_notify(
            &self.retry,
            |_, _, _| metrics::record_generation_retry(task.as_str()),
            || self.generator.generate_content(request.clone()),
        )
        .await;

        let elapsed = start.elapsed();
        metrics::record_generation(
            task.as_str(),
            metrics::generation_status(&result),
            elapsed.as_secs_f64(),
        );

        match &result {
            Ok(text) => tracing::info!(
                task = %task,
                bytes = text.len(),
                elapsed_ms = elapsed.as_millis() as u64,
                "Generation succeeded"
            ),
            Err(e) => tracing::error!(task = %task, "Generation failed: {}", e),
        }

        result
    }
}
