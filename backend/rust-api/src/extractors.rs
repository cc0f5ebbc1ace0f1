use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};

use crate::{handlers::ApiError, models::GenerateRequest, models::GenerationTask};

/// Task discriminator from a `{ "task": ... }` body. The body is parsed as JSON
/// whatever the Content-Type says; a missing body, malformed JSON and an
/// unknown task all reject with 400 `Invalid task`.
pub struct TaskPayload(pub GenerationTask);

impl<S> FromRequest<S> for TaskPayload
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state).await.map_err(|rejection| {
            tracing::warn!("Failed to read generation request body: {}", rejection);
            ApiError::invalid_task()
        })?;

        let payload = serde_json::from_slice::<GenerateRequest>(&body).map_err(|e| {
            tracing::warn!("Rejected generation request body: {}", e);
            ApiError::invalid_task()
        })?;

        match payload.parse_task() {
            Ok(task) => Ok(TaskPayload(task)),
            Err(_) => {
                tracing::warn!(task = ?payload.task, "Rejected unknown generation task");
                Err(ApiError::invalid_task())
            }
        }
    }
}
