use thiserror::Error;

/// Substrings that mark an upstream throttling response.
pub const RESOURCE_EXHAUSTED: &str = "RESOURCE_EXHAUSTED";
pub const TOO_MANY_REQUESTS: &str = "429 Too Many Requests";

pub const MISSING_CREDENTIAL_MESSAGE: &str = "API_KEY is not configured on the server.";

const RATE_LIMIT_USER_MESSAGE: &str =
    "APIの利用制限に達しました。しばらく待ってから再度お試しください。";
const GENERIC_USER_MESSAGE: &str =
    "コンテンツの取得中にエラーが発生しました。接続を確認してください。";

/// Every way a quiz or passage generation can fail, from either side of the proxy.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    #[error("{}", MISSING_CREDENTIAL_MESSAGE)]
    MissingCredential,

    #[error("Invalid task")]
    InvalidTask,

    #[error("{0}")]
    RateLimited(String),

    /// Rate limit still in force after the server already ran its own backoff.
    /// Reported like any rate limit but never retried again.
    #[error("{0}")]
    RateLimitExhausted(String),

    #[error("{message}")]
    Upstream { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed upstream response: {0}")]
    MalformedResponse(String),
}

impl GenerationError {
    /// Classifies a non-success HTTP answer. A 429 status or a rate-limit marker
    /// anywhere in the message turns it into [`GenerationError::RateLimited`].
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        if status == 429 {
            if contains_rate_limit_marker(&message) {
                GenerationError::RateLimited(message)
            } else {
                GenerationError::RateLimited(format!("{}: {}", TOO_MANY_REQUESTS, message))
            }
        } else if contains_rate_limit_marker(&message) {
            GenerationError::RateLimited(message)
        } else {
            GenerationError::Upstream { status, message }
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        GenerationError::MalformedResponse(message.into())
    }

    pub fn is_rate_limited(&self) -> bool {
        match self {
            GenerationError::RateLimited(_) | GenerationError::RateLimitExhausted(_) => true,
            GenerationError::Upstream { status, message } => {
                *status == 429 || contains_rate_limit_marker(message)
            }
            _ => false,
        }
    }

    /// Retry predicate for backoff policies: rate limits nobody has retried yet.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, GenerationError::RateLimitExhausted(_)) && self.is_rate_limited()
    }

    /// Display string for the view layer.
    pub fn user_message(&self) -> &'static str {
        if self.is_rate_limited() {
            RATE_LIMIT_USER_MESSAGE
        } else {
            GENERIC_USER_MESSAGE
        }
    }
}

/// `RESOURCE_EXHAUSTED` anywhere, `429 Too Many Requests` anywhere, or a message
/// that leads with a bare `429` status token. A `429` inside other text (a
/// column number, a port) does not count.
pub fn contains_rate_limit_marker(message: &str) -> bool {
    message.contains(RESOURCE_EXHAUSTED)
        || message.contains(TOO_MANY_REQUESTS)
        || message
            .trim_start()
            .strip_prefix("429")
            .is_some_and(|rest| !rest.starts_with(|c: char| c.is_ascii_alphanumeric()))
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            GenerationError::from_status(status.as_u16(), err.to_string())
        } else {
            GenerationError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for GenerationError {
    fn from(err: serde_json::Error) -> Self {
        GenerationError::MalformedResponse(err.to_string())
    }
}

impl From<validator::ValidationErrors> for GenerationError {
    fn from(err: validator::ValidationErrors) -> Self {
        GenerationError::MalformedResponse(err.to_string())
    }
}
