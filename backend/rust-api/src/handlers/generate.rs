use axum::{
    extract::State,
    http::{header, HeaderName, HeaderValue},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::ApiError;
use crate::{
    extractors::TaskPayload,
    services::{
        generation_client::{RETRY_OWNER_HEADER, RETRY_OWNER_PROXY},
        AppState,
    },
};

/// `POST /api/generate`: relays the model's JSON text verbatim.
pub async fn generate_content(
    State(state): State<Arc<AppState>>,
    TaskPayload(task): TaskPayload,
) -> Response {
    tracing::info!(task = %task, "Generation requested");

    match state.generation.generate(task).await {
        Ok(raw) => ([(header::CONTENT_TYPE, "application/json")], raw).into_response(),
        Err(err) => {
            // Backoff already spent here; tell the client not to start another round
            let retried = err.is_rate_limited() && state.generation.retries_rate_limits();
            let mut response = ApiError::from(err).into_response();
            if retried {
                response.headers_mut().insert(
                    HeaderName::from_static(RETRY_OWNER_HEADER),
                    HeaderValue::from_static(RETRY_OWNER_PROXY),
                );
            }
            response
        }
    }
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
