#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use lingophilia_api::{
    config::Config,
    create_router,
    error::GenerationError,
    services::{
        gemini_client::{ContentGenerator, ModelRequest},
        AppState,
    },
};
use serde_json::json;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Stand-in for the hosted model: answers from a script, then repeats `fallback`.
pub struct FakeGenerator {
    responses: Mutex<VecDeque<Result<String, GenerationError>>>,
    fallback: String,
    requests: Mutex<Vec<ModelRequest>>,
}

impl FakeGenerator {
    pub fn scripted(responses: Vec<Result<String, GenerationError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            fallback: sample_quiz().to_string(),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn always(text: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(VecDeque::new()),
            fallback: text.into(),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ModelRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContentGenerator for FakeGenerator {
    async fn generate_content(&self, request: ModelRequest) -> Result<String, GenerationError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(self.fallback.clone()))
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

pub fn test_config(api_key: Option<&str>) -> Config {
    let config = Config::default();
    match api_key {
        Some(key) => config.with_api_key(key),
        None => config,
    }
}

pub fn create_test_app_with_config(config: Config, generator: Arc<FakeGenerator>) -> Router {
    init_tracing();
    let app_state = Arc::new(AppState::with_generator(config, generator));
    create_router(app_state)
}

pub fn create_test_app(generator: Arc<FakeGenerator>, api_key: Option<&str>) -> Router {
    create_test_app_with_config(test_config(api_key), generator)
}

/// Serves the router on an ephemeral local port and returns its base URL.
pub async fn spawn_server(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

pub fn rate_limited() -> Result<String, GenerationError> {
    Err(GenerationError::from_status(
        429,
        "429 RESOURCE_EXHAUSTED: Resource has been exhausted (e.g. check quota).",
    ))
}

pub fn sample_quiz() -> serde_json::Value {
    json!({
        "word": "circumspect",
        "options": [
            "wary and unwilling to take risks (慎重な)",
            "openly boastful (自慢げな)",
            "moving in circles (回転する)",
            "carelessly generous (気前の良すぎる)"
        ],
        "correctAnswer": "wary and unwilling to take risks (慎重な)",
        "etymology": {
            "prefix": "circum-",
            "root": "spect",
            "explanation": "ラテン語 circum（周りを）と specere（見る）から、周囲をよく見ることを表します。"
        },
        "familyWords": [
            { "word": "circumference", "meaning": "円周" },
            { "word": "inspect", "meaning": "検査する" },
            { "word": "spectator", "meaning": "観客" }
        ]
    })
}

pub fn sample_passage() -> serde_json::Value {
    json!({
        "topic": "Behavioral Economics",
        "fullText": "Classical models assume rational agents. However, observed choices deviate systematically. Consequently, economists now model bounded rationality.",
        "parts": [
            { "text": "Classical models assume rational agents." },
            { "text": "However, observed choices deviate systematically." },
            { "text": "Consequently, economists now model bounded rationality." }
        ],
        "explanation": "前提、反証、結論の順に論理が展開します。",
        "translation": "古典的モデルは合理的な主体を仮定する。しかし観察される選択は体系的に逸脱する。その結果、経済学者は限定合理性をモデル化している。"
    })
}
