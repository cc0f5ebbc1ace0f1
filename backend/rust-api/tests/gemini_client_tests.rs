mod common;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode, Uri},
    routing::post,
    Json, Router,
};
use lingophilia_api::{
    config::GeminiSettings,
    error::GenerationError,
    models::{GenerationTask, QuizQuestion},
    services::{
        gemini_client::{ContentGenerator, GeminiClient},
        prompts,
    },
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Recorded {
    path: Option<String>,
    api_key: Option<String>,
    body: Option<Value>,
}

#[derive(Clone)]
struct Upstream {
    status: StatusCode,
    reply: Value,
    recorded: Arc<Mutex<Recorded>>,
}

async fn generate_content(
    State(upstream): State<Upstream>,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut recorded = upstream.recorded.lock().unwrap();
    recorded.path = Some(uri.path().to_string());
    recorded.api_key = headers
        .get("x-goog-api-key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    recorded.body = Some(body);
    (upstream.status, Json(upstream.reply.clone()))
}

async fn fake_gemini(status: StatusCode, reply: Value) -> (GeminiClient, Arc<Mutex<Recorded>>) {
    let recorded = Arc::new(Mutex::new(Recorded::default()));
    let app = Router::new()
        .route("/v1beta/models/{*rest}", post(generate_content))
        .with_state(Upstream {
            status,
            reply,
            recorded: recorded.clone(),
        });
    let base_url = common::spawn_server(app).await;

    let client = GeminiClient::new(&GeminiSettings {
        api_key: None,
        model: "gemini-3-pro-preview".to_string(),
        base_url,
        timeout_secs: 5,
    })
    .unwrap();
    (client, recorded)
}

fn candidate_text(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    })
}

#[tokio::test]
async fn test_structured_output_request_and_text_extraction() {
    let quiz = common::sample_quiz().to_string();
    let (client, recorded) = fake_gemini(StatusCode::OK, candidate_text(&quiz)).await;

    let request = prompts::model_request(GenerationTask::Quiz, "test-key", "gemini-3-pro-preview");
    let text = client.generate_content(request).await.unwrap();

    assert!(QuizQuestion::from_json(&text).is_ok());

    let recorded = recorded.lock().unwrap();
    assert_eq!(
        recorded.path.as_deref(),
        Some("/v1beta/models/gemini-3-pro-preview:generateContent")
    );
    assert_eq!(recorded.api_key.as_deref(), Some("test-key"));
    let body = recorded.body.as_ref().unwrap();
    assert_eq!(
        body["generationConfig"]["responseMimeType"],
        "application/json"
    );
    assert_eq!(body["generationConfig"]["responseSchema"]["type"], "OBJECT");
    assert!(body["contents"][0]["parts"][0]["text"]
        .as_str()
        .unwrap()
        .contains("etymology"));
}

#[tokio::test]
async fn test_quota_error_is_rate_limited() {
    let (client, _) = fake_gemini(
        StatusCode::TOO_MANY_REQUESTS,
        json!({
            "error": {
                "code": 429,
                "message": "Resource has been exhausted (e.g. check quota).",
                "status": "RESOURCE_EXHAUSTED"
            }
        }),
    )
    .await;

    let request = prompts::model_request(GenerationTask::Scramble, "k", "gemini-3-pro-preview");
    let err = client.generate_content(request).await.unwrap_err();

    assert!(err.is_rate_limited());
    assert!(err.to_string().contains("429 RESOURCE_EXHAUSTED"));
}

#[tokio::test]
async fn test_invalid_argument_is_not_rate_limited() {
    let (client, _) = fake_gemini(
        StatusCode::BAD_REQUEST,
        json!({
            "error": {
                "code": 400,
                "message": "API key not valid. Please pass a valid API key.",
                "status": "INVALID_ARGUMENT"
            }
        }),
    )
    .await;

    let request = prompts::model_request(GenerationTask::Quiz, "bad", "gemini-3-pro-preview");
    let err = client.generate_content(request).await.unwrap_err();

    assert!(!err.is_rate_limited());
    assert!(matches!(err, GenerationError::Upstream { status: 400, .. }));
    assert!(err.to_string().contains("API key not valid"));
}

#[tokio::test]
async fn test_missing_candidates_are_malformed() {
    let (client, _) = fake_gemini(StatusCode::OK, json!({ "candidates": [] })).await;

    let request = prompts::model_request(GenerationTask::Quiz, "k", "gemini-3-pro-preview");
    let err = client.generate_content(request).await.unwrap_err();

    assert!(matches!(err, GenerationError::MalformedResponse(_)));
}
