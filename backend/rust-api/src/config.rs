use serde::Deserialize;
use std::env;

pub const DEFAULT_MODEL: &str = "gemini-3-pro-preview";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub bind_addr: String,
    pub gemini: GeminiSettings,
    pub generation: GenerationSettings,
    pub retry: RetrySettings,
    /// `username:password` guarding `/metrics`; open when unset.
    pub metrics_auth: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerationSettings {
    /// Wrap the single upstream call of the proxy in the rate-limit backoff policy.
    pub proxy_retry: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetrySettings {
    pub max_retries: usize,
    pub base_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8081".to_string(),
            gemini: GeminiSettings {
                api_key: None,
                model: DEFAULT_MODEL.to_string(),
                base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
                timeout_secs: 60,
            },
            generation: GenerationSettings { proxy_retry: false },
            retry: RetrySettings {
                max_retries: 3,
                base_delay_ms: 2000,
            },
            metrics_auth: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        // Root .env first, then the crate-local one
        let skip_root_env = env::var("SKIP_ROOT_ENV").is_ok();
        if skip_root_env {
            dotenvy::dotenv().ok();
        } else if dotenvy::from_path("../../.env").is_err() {
            dotenvy::dotenv().ok();
        }

        let app_env = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());

        // config/*.toml + APP__ overrides
        let settings = config::Config::builder()
            .add_source(config::File::with_name(&format!("config/{}", app_env)).required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        Self::from_settings(&settings)
    }

    fn from_settings(settings: &config::Config) -> Result<Self, config::ConfigError> {
        let defaults = Config::default();

        let bind_addr = settings
            .get_string("server.bind_addr")
            .or_else(|_| env::var("BIND_ADDR"))
            .unwrap_or(defaults.bind_addr);

        let api_key = settings
            .get_string("gemini.api_key")
            .or_else(|_| env::var("API_KEY"))
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());
        if api_key.is_none() {
            tracing::warn!("API_KEY is not set, /api/generate will answer 500 until configured");
        }

        let model = settings
            .get_string("gemini.model")
            .or_else(|_| env::var("GEMINI_MODEL"))
            .unwrap_or(defaults.gemini.model);

        let base_url = settings
            .get_string("gemini.base_url")
            .or_else(|_| env::var("GEMINI_BASE_URL"))
            .unwrap_or(defaults.gemini.base_url);
        url::Url::parse(&base_url).map_err(|e| {
            config::ConfigError::Message(format!("Invalid gemini.base_url '{}': {}", base_url, e))
        })?;

        let timeout_secs = settings
            .get_int("gemini.timeout_secs")
            .ok()
            .and_then(|v| u64::try_from(v).ok())
            .unwrap_or(defaults.gemini.timeout_secs);

        let proxy_retry = settings
            .get_bool("generation.proxy_retry")
            .unwrap_or(defaults.generation.proxy_retry);

        let max_retries = settings
            .get_int("retry.max_retries")
            .ok()
            .and_then(|v| usize::try_from(v).ok())
            .unwrap_or(defaults.retry.max_retries);

        let base_delay_ms = settings
            .get_int("retry.base_delay_ms")
            .ok()
            .and_then(|v| u64::try_from(v).ok())
            .unwrap_or(defaults.retry.base_delay_ms);

        let metrics_auth = settings
            .get_string("metrics.auth")
            .or_else(|_| env::var("METRICS_AUTH"))
            .ok();

        Ok(Config {
            bind_addr,
            gemini: GeminiSettings {
                api_key,
                model,
                base_url: base_url.trim_end_matches('/').to_string(),
                timeout_secs,
            },
            generation: GenerationSettings { proxy_retry },
            retry: RetrySettings {
                max_retries,
                base_delay_ms,
            },
            metrics_auth,
        })
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.gemini.api_key = Some(api_key.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn settings(pairs: &[(&str, &str)]) -> config::Config {
        let mut builder = config::Config::builder();
        for (key, value) in pairs {
            builder = builder.set_override(*key, *value).unwrap();
        }
        builder.build().unwrap()
    }

    #[test]
    #[serial]
    fn defaults_apply_when_nothing_is_set() {
        env::remove_var("API_KEY");
        env::remove_var("GEMINI_MODEL");
        env::remove_var("GEMINI_BASE_URL");
        env::remove_var("BIND_ADDR");
        env::remove_var("METRICS_AUTH");

        let config = Config::from_settings(&settings(&[])).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8081");
        assert_eq!(config.gemini.api_key, None);
        assert_eq!(config.gemini.model, DEFAULT_MODEL);
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(config.retry.base_delay_ms, 2000);
        assert!(!config.generation.proxy_retry);
        assert!(config.metrics_auth.is_none());
    }

    #[test]
    #[serial]
    fn api_key_falls_back_to_env() {
        env::set_var("API_KEY", "  secret-key  ");
        let config = Config::from_settings(&settings(&[])).unwrap();
        env::remove_var("API_KEY");
        assert_eq!(config.gemini.api_key.as_deref(), Some("secret-key"));
    }

    #[test]
    #[serial]
    fn blank_api_key_counts_as_missing() {
        env::remove_var("API_KEY");
        let config = Config::from_settings(&settings(&[("gemini.api_key", "   ")])).unwrap();
        assert_eq!(config.gemini.api_key, None);
    }

    #[test]
    #[serial]
    fn file_settings_override_defaults() {
        let config = Config::from_settings(&settings(&[
            ("gemini.model", "gemini-3-flash-preview"),
            ("gemini.base_url", "http://127.0.0.1:9999/"),
            ("generation.proxy_retry", "true"),
            ("retry.max_retries", "5"),
        ]))
        .unwrap();
        assert_eq!(config.gemini.model, "gemini-3-flash-preview");
        assert_eq!(config.gemini.base_url, "http://127.0.0.1:9999");
        assert!(config.generation.proxy_retry);
        assert_eq!(config.retry.max_retries, 5);
    }

    #[test]
    #[serial]
    fn invalid_base_url_is_rejected() {
        let result = Config::from_settings(&settings(&[("gemini.base_url", "not a url")]));
        assert!(result.is_err());
    }
}
