use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose, Engine as _};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;

use crate::error::GenerationError;
use crate::metrics;
use crate::models::ErrorBody;
use crate::services::AppState;

pub mod generate;

pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let uptime = (Utc::now() - state.started_at).num_seconds().max(0);

    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "lingophilia-api",
            "version": env!("CARGO_PKG_VERSION"),
            "model": state.generation.model(),
            "credential_configured": state.generation.is_configured(),
            "uptime_seconds": uptime,
        })),
    )
}

pub async fn metrics_handler() -> impl IntoResponse {
    match metrics::render_metrics() {
        Ok(metrics_text) => (StatusCode::OK, metrics_text),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to render metrics: {}", e),
        ),
    }
}

/// HTTP Basic Auth in front of `/metrics` when `metrics_auth` is configured.
pub async fn metrics_auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(expected) = state.config.metrics_auth.as_deref() else {
        return Ok(next.run(request).await);
    };

    let encoded = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Basic "))
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let decoded = general_purpose::STANDARD
        .decode(encoded)
        .map_err(|_| StatusCode::UNAUTHORIZED)?;
    let credentials = String::from_utf8(decoded).map_err(|_| StatusCode::UNAUTHORIZED)?;

    if credentials != expected {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(next.run(request).await)
}

/// Error response of the HTTP surface, always rendered as `{ "message": ... }`.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    MethodNotAllowed,
    Internal(String),
}

impl ApiError {
    pub fn invalid_task() -> Self {
        ApiError::BadRequest(GenerationError::InvalidTask.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<GenerationError> for ApiError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::InvalidTask => ApiError::invalid_task(),
            other => {
                let message = other.to_string();
                if message.trim().is_empty() {
                    ApiError::Internal("Internal Server Error".to_string())
                } else {
                    ApiError::Internal(message)
                }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::BadRequest(message) | ApiError::Internal(message) => message,
            ApiError::MethodNotAllowed => "Method not allowed".to_string(),
        };
        (status, Json(ErrorBody { message })).into_response()
    }
}
