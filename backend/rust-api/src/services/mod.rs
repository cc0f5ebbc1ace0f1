use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::config::Config;
use gemini_client::{ContentGenerator, GeminiClient};
use generation_service::GenerationService;

pub struct AppState {
    pub config: Config,
    pub generation: GenerationService,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let generator = GeminiClient::new(&config.gemini)?;
        tracing::info!(
            model = %config.gemini.model,
            base_url = %config.gemini.base_url,
            proxy_retry = config.generation.proxy_retry,
            "Gemini client initialized"
        );
        Ok(Self::with_generator(config, Arc::new(generator)))
    }

    /// State over any upstream, used by tests to stand in for the hosted model.
    pub fn with_generator(config: Config, generator: Arc<dyn ContentGenerator>) -> Self {
        let generation = GenerationService::from_config(&config, generator);
        Self {
            config,
            generation,
            started_at: Utc::now(),
        }
    }
}

pub mod gemini_client;
pub mod generation_client;
pub mod generation_service;
pub mod prompts;
pub mod scramble_service;
pub mod share;
pub mod stats_service;
pub mod storage;
